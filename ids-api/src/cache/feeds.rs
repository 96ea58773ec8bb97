//! Live data feed clients: VATSIM data feed and vNAS controller feed
//!
//! Controller entries are filtered here but passed through to the
//! display unmodified, so they stay raw JSON values; only the fields the
//! filters read are probed.

use super::snapshot::{Aircraft, ControllerSnapshot};
use chrono::Utc;
use ids_common::geo::{distance_nm, DJB_VOR};
use ids_common::{Error, Result};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Canadian center callsign prefixes adjacent to the facility, mapped to
/// their ARTCC identifiers
const CALLSIGN_TO_ARTCC: &[(&str, &str)] = &[
    ("TOR", "CZYZ"),
    ("WPG", "CZWG"),
    ("CZVR", "CZVR"),
    ("MTL", "CZUL"),
    ("CZQM", "CZQM"),
    ("CZQX", "CZQM"),
    ("CZEG", "CZEG"),
];

/// The facility whose approach/departure positions are shown
const TRACON_ARTCC: &str = "ZOB";

#[derive(Debug, Deserialize)]
struct VatsimData {
    #[serde(default)]
    pilots: Vec<VatsimPilot>,
    #[serde(default)]
    controllers: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct VatsimPilot {
    #[serde(default)]
    callsign: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    altitude: i64,
    flight_plan: Option<VatsimFlightPlan>,
}

#[derive(Debug, Deserialize)]
struct VatsimFlightPlan {
    #[serde(default)]
    route: String,
    #[serde(default)]
    departure: String,
    #[serde(default)]
    arrival: String,
}

#[derive(Debug, Deserialize)]
struct VnasFeed {
    #[serde(rename = "updatedAt")]
    updated_at: Option<String>,
    #[serde(default)]
    controllers: Vec<Value>,
}

/// Client for both live feeds, sharing one bounded-timeout HTTP client
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    vatsim_url: String,
    vnas_url: String,
}

impl FeedClient {
    pub fn new(
        vatsim_url: impl Into<String>,
        vnas_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            vatsim_url: vatsim_url.into(),
            vnas_url: vnas_url.into(),
        })
    }

    /// Fetch pilots with filed flight plans within `max_radius_nm` of the
    /// facility reference point
    pub async fn fetch_aircraft(&self, max_radius_nm: f64) -> Result<Vec<Aircraft>> {
        let data: VatsimData = self.fetch_json(&self.vatsim_url).await?;
        let (ref_lat, ref_lon) = DJB_VOR;

        let aircraft = data
            .pilots
            .into_iter()
            .filter_map(|pilot| {
                let plan = pilot.flight_plan?;
                let lat = pilot.latitude?;
                let lon = pilot.longitude?;
                if distance_nm(ref_lat, ref_lon, lat, lon) > max_radius_nm {
                    return None;
                }
                Some(Aircraft {
                    callsign: pilot.callsign,
                    route: plan.route,
                    departure: plan.departure,
                    destination: plan.arrival,
                    lat,
                    lon,
                    altitude: pilot.altitude,
                })
            })
            .collect();
        Ok(aircraft)
    }

    /// Fetch the controller roster: vNAS center and ZOB tracon positions
    /// plus Canadian center positions matched from the VATSIM feed
    pub async fn fetch_controllers(&self) -> Result<ControllerSnapshot> {
        let vnas: VnasFeed = self.fetch_json(&self.vnas_url).await?;

        let mut controllers: Vec<Value> = vnas
            .controllers
            .iter()
            .filter(|c| is_online(c) && facility_type(c) == Some("Center"))
            .cloned()
            .collect();

        let tracon: Vec<Value> = vnas
            .controllers
            .iter()
            .filter(|c| {
                is_online(c)
                    && facility_type(c) == Some("ApproachDeparture")
                    && c.get("artccId").and_then(Value::as_str) == Some(TRACON_ARTCC)
            })
            .cloned()
            .collect();

        let vatsim: VatsimData = self.fetch_json(&self.vatsim_url).await?;
        controllers.extend(canadian_centers(vatsim.controllers));

        Ok(ControllerSnapshot {
            updated_at: vnas.updated_at,
            cache_updated_at: Utc::now(),
            controllers,
            tracon,
        })
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Upstream(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }
        Ok(response.json::<T>().await?)
    }
}

fn is_online(controller: &Value) -> bool {
    controller
        .get("isActive")
        .and_then(Value::as_bool)
        .unwrap_or(false)
        && !controller
            .get("isObserver")
            .and_then(Value::as_bool)
            .unwrap_or(false)
}

fn facility_type(controller: &Value) -> Option<&str> {
    controller.get("vatsimData")?.get("facilityType")?.as_str()
}

/// Pick Canadian center/FSS positions out of the VATSIM controller list
/// by callsign prefix and tag each with its ARTCC identifier
fn canadian_centers(controllers: Vec<Value>) -> Vec<Value> {
    let Ok(pattern) = Regex::new(r"^([A-Z]{3,4})_(?:\d{1,3}_)?(?:CTR|FSS)$") else {
        return Vec::new();
    };

    controllers
        .into_iter()
        .filter_map(|mut controller| {
            let callsign = controller
                .get("callsign")
                .and_then(Value::as_str)?
                .to_uppercase();
            let prefix = pattern.captures(&callsign)?.get(1)?.as_str().to_string();
            let artcc = CALLSIGN_TO_ARTCC
                .iter()
                .find(|(p, _)| *p == prefix)
                .map(|(_, artcc)| *artcc)?;
            controller
                .as_object_mut()?
                .insert("artccId".to_string(), Value::String(artcc.to_string()));
            Some(controller)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canadian_centers_match_by_callsign_prefix() {
        let controllers = vec![
            json!({"callsign": "TOR_CTR", "name": "Toronto Centre"}),
            json!({"callsign": "TOR_1_CTR", "name": "Toronto Centre"}),
            json!({"callsign": "CZQX_FSS", "name": "Gander Radio"}),
            json!({"callsign": "TOR_APP", "name": "not a center"}),
            json!({"callsign": "LON_CTR", "name": "not Canadian"}),
        ];

        let matched = canadian_centers(controllers);
        assert_eq!(matched.len(), 3);
        assert_eq!(matched[0]["artccId"], "CZYZ");
        assert_eq!(matched[1]["artccId"], "CZYZ");
        assert_eq!(matched[2]["artccId"], "CZQM");
    }

    #[test]
    fn online_filter_requires_active_non_observer() {
        assert!(is_online(&json!({"isActive": true, "isObserver": false})));
        assert!(!is_online(&json!({"isActive": true, "isObserver": true})));
        assert!(!is_online(&json!({"isActive": false, "isObserver": false})));
        assert!(!is_online(&json!({})));
    }

    #[test]
    fn facility_type_reads_nested_vatsim_data() {
        let c = json!({"vatsimData": {"facilityType": "Center"}});
        assert_eq!(facility_type(&c), Some("Center"));
        assert_eq!(facility_type(&json!({})), None);
    }
}
