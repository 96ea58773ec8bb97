//! Cache snapshot types and the snapshot store
//!
//! Each live feed is cached as an immutable snapshot swapped whole by
//! its refresh task. Request handlers clone the current `Arc`, so a
//! refresh in flight never exposes a partially built snapshot, and a
//! failed refresh simply leaves the previous one in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Weather state for one airport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirportWx {
    pub metar: Option<String>,
    pub atis: Option<String>,
    pub flow: Option<String>,
}

/// METAR/ATIS/flow per configured airport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirportInfoSnapshot {
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    pub airports: HashMap<String, AirportWx>,
}

/// Controller roster: center positions (including matched Canadian
/// centers) and ZOB approach/departure positions. Controller entries are
/// passed through as received from the feeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    /// Feed's own update stamp, passed through
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<String>,
    /// When this cache entry was built
    #[serde(rename = "cacheUpdatedAt")]
    pub cache_updated_at: DateTime<Utc>,
    pub controllers: Vec<Value>,
    pub tracon: Vec<Value>,
}

/// One displayed aircraft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aircraft {
    pub callsign: String,
    pub route: String,
    pub departure: String,
    pub destination: String,
    pub lat: f64,
    pub lon: f64,
    pub altitude: i64,
}

/// Aircraft with filed flight plans near the facility
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AircraftSnapshot {
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    pub aircraft: Vec<Aircraft>,
}

/// Read-mostly store for the three snapshots: one writer (the refresh
/// task), many readers (request handlers).
#[derive(Debug, Default)]
pub struct CacheStore {
    airport_info: RwLock<Option<Arc<AirportInfoSnapshot>>>,
    controllers: RwLock<Option<Arc<ControllerSnapshot>>>,
    aircraft: RwLock<Option<Arc<AircraftSnapshot>>>,
}

impl CacheStore {
    pub async fn airport_info(&self) -> Option<Arc<AirportInfoSnapshot>> {
        self.airport_info.read().await.clone()
    }

    pub async fn set_airport_info(&self, snapshot: AirportInfoSnapshot) {
        *self.airport_info.write().await = Some(Arc::new(snapshot));
    }

    pub async fn controllers(&self) -> Option<Arc<ControllerSnapshot>> {
        self.controllers.read().await.clone()
    }

    pub async fn set_controllers(&self, snapshot: ControllerSnapshot) {
        *self.controllers.write().await = Some(Arc::new(snapshot));
    }

    pub async fn aircraft(&self) -> Option<Arc<AircraftSnapshot>> {
        self.aircraft.read().await.clone()
    }

    pub async fn set_aircraft(&self, snapshot: AircraftSnapshot) {
        *self.aircraft.write().await = Some(Arc::new(snapshot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_starts_cold() {
        let store = CacheStore::default();
        assert!(store.airport_info().await.is_none());
        assert!(store.controllers().await.is_none());
        assert!(store.aircraft().await.is_none());
    }

    #[tokio::test]
    async fn readers_see_the_last_complete_snapshot() {
        let store = CacheStore::default();
        store
            .set_aircraft(AircraftSnapshot {
                updated_at: Utc::now(),
                aircraft: vec![],
            })
            .await;
        let first = store.aircraft().await.unwrap();

        store
            .set_aircraft(AircraftSnapshot {
                updated_at: Utc::now(),
                aircraft: vec![Aircraft {
                    callsign: "DAL123".to_string(),
                    route: "BONZZ BONZZ2".to_string(),
                    departure: "KCLE".to_string(),
                    destination: "KDTW".to_string(),
                    lat: 41.4,
                    lon: -81.8,
                    altitude: 21000,
                }],
            })
            .await;

        // the old Arc held by a reader is untouched by the swap
        assert!(first.aircraft.is_empty());
        assert_eq!(store.aircraft().await.unwrap().aircraft.len(), 1);
    }
}
