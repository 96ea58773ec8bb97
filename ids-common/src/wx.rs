//! Weather text sources and departure flow detection
//!
//! The D-ATIS and METAR fetchers are thin reqwest clients with a bounded
//! timeout. Flow detection pattern-matches the departure advisory text
//! against the configured runway flow map; the text matching itself is a
//! pure function so it can be exercised without the network.

use crate::config::{FlowMap, FlowRule};
use crate::normalize::normalize_airport;
use crate::{Error, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;

/// Outcome of a departure flow evaluation.
///
/// Fetch or parse failures are reported as `Err`; every caller treats
/// those the same as `Unknown` and never fails the surrounding request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowResult {
    /// A configured flow direction matched the current departure ATIS
    Direction(String),
    /// No flow configured for the airport, or nothing matched
    Unknown,
}

impl FlowResult {
    /// The matched direction label, if any
    pub fn direction(&self) -> Option<&str> {
        match self {
            FlowResult::Direction(d) => Some(d),
            FlowResult::Unknown => None,
        }
    }
}

/// One D-ATIS advisory as served by the datis API
#[derive(Debug, Clone, Deserialize)]
pub struct DatisAdvisory {
    #[serde(default)]
    pub airport: String,
    /// "combined", "arr", or "dep"
    #[serde(rename = "type", default)]
    pub advisory_type: String,
    /// Information letter
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub datis: String,
}

/// Client for the D-ATIS and METAR text sources
#[derive(Debug, Clone)]
pub struct WxClient {
    http: reqwest::Client,
    datis_base_url: String,
    metar_base_url: String,
}

impl WxClient {
    pub fn new(
        datis_base_url: impl Into<String>,
        metar_base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            datis_base_url: datis_base_url.into(),
            metar_base_url: metar_base_url.into(),
        })
    }

    /// Fetch the current D-ATIS advisories for an ICAO identifier
    /// (one combined advisory, or separate arrival/departure advisories)
    pub async fn fetch_advisories(&self, icao: &str) -> Result<Vec<DatisAdvisory>> {
        let url = format!("{}/{}", self.datis_base_url, icao);
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Upstream(format!(
                "D-ATIS returned {} for {}",
                response.status(),
                icao
            )));
        }
        let advisories = response.json::<Vec<DatisAdvisory>>().await?;
        Ok(advisories)
    }

    /// Fetch the raw METAR text for an ICAO identifier
    pub async fn fetch_metar(&self, icao: &str) -> Result<String> {
        let url = format!(
            "{}?ids={}&format=raw&hours=1",
            self.metar_base_url, icao
        );
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Upstream(format!(
                "METAR API returned {} for {}",
                response.status(),
                icao
            )));
        }
        let text = response.text().await?.trim().to_string();
        if text.is_empty() {
            return Err(Error::MalformedUpstream(format!("no METAR for {}", icao)));
        }
        Ok(text)
    }

    /// Fetch the display ATIS for an airport: the combined advisory when
    /// one exists, otherwise the departure/arrival pair labeled
    pub async fn fetch_atis_display(&self, icao: &str) -> Result<String> {
        let advisories = self.fetch_advisories(icao).await?;
        let combined = advisories
            .iter()
            .find(|a| a.advisory_type.eq_ignore_ascii_case("combined"));
        if let Some(adv) = combined {
            return Ok(adv.datis.clone());
        }
        let dep = advisories
            .iter()
            .find(|a| a.advisory_type.eq_ignore_ascii_case("dep"));
        let arr = advisories
            .iter()
            .find(|a| a.advisory_type.eq_ignore_ascii_case("arr"));
        match (dep, arr) {
            (Some(dep), Some(arr)) => {
                Ok(format!("Departure: {}\nArrival: {}", dep.datis, arr.datis))
            }
            _ => advisories
                .first()
                .map(|a| a.datis.clone())
                .ok_or_else(|| Error::MalformedUpstream(format!("empty D-ATIS for {}", icao))),
        }
    }
}

/// Select the advisory understood to cover departures: the dedicated
/// departure advisory when present, else the combined one, else the only
/// one available.
fn departure_advisory(advisories: &[DatisAdvisory]) -> Option<&DatisAdvisory> {
    advisories
        .iter()
        .find(|a| a.advisory_type.eq_ignore_ascii_case("dep"))
        .or_else(|| {
            advisories
                .iter()
                .find(|a| a.advisory_type.eq_ignore_ascii_case("combined"))
        })
        .or_else(|| advisories.first())
}

/// Match ATIS text against ordered flow rules.
///
/// Recognizes the three equivalent phrasings "DEPG RWY", "DEPG RWYS", and
/// "DEPTG RWY", each followed by a configured runway number and an
/// optional single L/R/C suffix ending at a word boundary. Rules are
/// walked in configuration order; the first direction with a matching
/// runway wins. Returns the direction uppercased, or None when nothing
/// matched.
pub fn match_flow(atis_text: &str, rules: &[FlowRule]) -> Option<String> {
    for rule in rules {
        for rwy in &rule.runways {
            let pattern = format!(
                r"(?:DEPG RWYS?|DEPTG RWY) {}[LRC]?\b",
                regex::escape(rwy)
            );
            if let Ok(re) = Regex::new(&pattern) {
                if re.is_match(atis_text) {
                    return Some(rule.direction.to_uppercase());
                }
            }
        }
    }
    None
}

/// Seam the resolution engine consumes for live flow state
#[async_trait]
pub trait FlowSource: Send + Sync {
    /// Whether the airport has a configured flow concept
    fn has_flows(&self, airport: &str) -> bool;

    /// Evaluate the current departure flow for an airport.
    ///
    /// `Err` means the text source failed or returned an unexpected
    /// shape; callers must treat that as `Unknown`, never as a request
    /// failure.
    async fn detect_flow(&self, airport: &str) -> Result<FlowResult>;
}

/// Live flow detector backed by the D-ATIS feed and the configured
/// runway flow map
#[derive(Debug, Clone)]
pub struct FlowDetector {
    wx: WxClient,
    flow_map: FlowMap,
}

impl FlowDetector {
    pub fn new(wx: WxClient, flow_map: FlowMap) -> Self {
        Self { wx, flow_map }
    }

    pub fn flow_map(&self) -> &FlowMap {
        &self.flow_map
    }
}

#[async_trait]
impl FlowSource for FlowDetector {
    fn has_flows(&self, airport: &str) -> bool {
        self.flow_map.contains(airport)
    }

    async fn detect_flow(&self, airport: &str) -> Result<FlowResult> {
        // Unmapped airports short-circuit without a network call
        let Some(rules) = self.flow_map.rules(airport) else {
            return Ok(FlowResult::Unknown);
        };

        let icao = format!("K{}", normalize_airport(airport));
        let advisories = self.wx.fetch_advisories(&icao).await?;
        let advisory = departure_advisory(&advisories)
            .ok_or_else(|| Error::MalformedUpstream(format!("empty D-ATIS for {}", icao)))?;

        Ok(match match_flow(&advisory.datis, rules) {
            Some(direction) => FlowResult::Direction(direction),
            None => FlowResult::Unknown,
        })
    }
}
