//! Configuration loading and the runway flow map
//!
//! Service configuration follows the resolution priority used across the
//! workspace: command-line argument, then environment variable, then TOML
//! config file, then compiled defaults.
//!
//! The runway flow map is its own TOML file because it is facility data,
//! not deployment data. It is loaded once at startup and treated as
//! immutable for the process lifetime. Direction precedence is the file
//! order of the `[[airport.flows]]` blocks; detection walks them in order
//! and the first direction whose runway list matches wins.

use crate::normalize::normalize_airport;
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable naming the service config file
pub const CONFIG_ENV_VAR: &str = "IDS_CONFIG";

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listen address for the HTTP server
    pub bind: String,
    /// SQLite database file
    pub database_path: PathBuf,
    /// Runway flow map TOML file
    pub runway_flow_path: PathBuf,
    /// Airports (ICAO) covered by the weather/ATIS cache
    pub atis_airports: Vec<String>,
    /// Origins allowed by the CORS layer
    pub cors_origins: Vec<String>,
    /// D-ATIS API base URL
    pub datis_base_url: String,
    /// METAR API base URL
    pub metar_base_url: String,
    /// VATSIM data feed URL (pilots + controllers)
    pub vatsim_data_url: String,
    /// vNAS controller feed URL
    pub vnas_controllers_url: String,
    /// Weather/flow cache refresh interval, seconds
    pub wx_refresh_secs: u64,
    /// Aircraft cache refresh interval, seconds
    pub aircraft_refresh_secs: u64,
    /// Controller roster refresh interval, seconds
    pub controller_refresh_secs: u64,
    /// Timeout applied to every outbound fetch, seconds
    pub fetch_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5730".to_string(),
            database_path: PathBuf::from("ids.db"),
            runway_flow_path: PathBuf::from("runway_flow.toml"),
            atis_airports: vec![
                "KDTW".to_string(),
                "KCLE".to_string(),
                "KBUF".to_string(),
                "KPIT".to_string(),
            ],
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
            datis_base_url: "https://datis.clowd.io/api".to_string(),
            metar_base_url: "https://aviationweather.gov/api/data/metar".to_string(),
            vatsim_data_url: "https://data.vatsim.net/v3/vatsim-data.json".to_string(),
            vnas_controllers_url: "https://live.env.vnas.vatsim.net/data-feed/controllers.json"
                .to_string(),
            wx_refresh_secs: 60,
            aircraft_refresh_secs: 60,
            controller_refresh_secs: 300,
            fetch_timeout_secs: 5,
        }
    }
}

impl Config {
    /// Load configuration with CLI > env > file > default priority.
    ///
    /// `cli_path` wins when given; otherwise the file named by `IDS_CONFIG`
    /// is used; otherwise `ids.toml` in the working directory if present;
    /// otherwise compiled defaults.
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = cli_path {
            return Self::from_file(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::from_file(Path::new(&path));
        }
        let default_path = Path::new("ids.toml");
        if default_path.exists() {
            return Self::from_file(default_path);
        }
        Ok(Self::default())
    }

    /// Load configuration from a specific TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("cannot parse {}: {}", path.display(), e)))
    }
}

/// One flow direction and the runways that imply it
#[derive(Debug, Clone, Deserialize)]
pub struct FlowRule {
    pub direction: String,
    pub runways: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FlowAirport {
    code: String,
    #[serde(default)]
    flows: Vec<FlowRule>,
}

#[derive(Debug, Deserialize)]
struct FlowFile {
    #[serde(default)]
    airport: Vec<FlowAirport>,
}

/// Airport code -> ordered flow rules.
///
/// Keys are normalized airport codes; rule order within an airport is the
/// file order and is authoritative for detection precedence.
#[derive(Debug, Clone, Default)]
pub struct FlowMap {
    airports: HashMap<String, Vec<FlowRule>>,
}

impl FlowMap {
    /// Load the flow map from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse the flow map from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: FlowFile = toml::from_str(content)
            .map_err(|e| Error::Config(format!("cannot parse flow map: {}", e)))?;
        let mut airports = HashMap::new();
        for apt in file.airport {
            airports.insert(normalize_airport(&apt.code), apt.flows);
        }
        Ok(Self { airports })
    }

    /// Build a flow map directly from rules (test seams and defaults)
    pub fn from_rules<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<FlowRule>)>,
    {
        let airports = entries
            .into_iter()
            .map(|(code, rules)| (normalize_airport(&code), rules))
            .collect();
        Self { airports }
    }

    /// Whether the airport has any flow concept configured
    pub fn contains(&self, code: &str) -> bool {
        self.airports.contains_key(&normalize_airport(code))
    }

    /// Ordered flow rules for an airport
    pub fn rules(&self, code: &str) -> Option<&[FlowRule]> {
        self.airports
            .get(&normalize_airport(code))
            .map(|v| v.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }
}
