//! Background cache refresh tasks
//!
//! Three independent periodic loops keep the live-data snapshots warm:
//! weather/flow and aircraft on a short interval, the controller roster
//! on a longer one. A failed cycle logs and leaves the previous snapshot
//! intact; the request path never waits on a refresh. All loops stop
//! cleanly when the shutdown token fires.

use crate::AppState;
use chrono::Utc;
use ids_common::normalize::normalize_airport;
use ids_common::wx::FlowSource;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::snapshot::{AirportInfoSnapshot, AirportWx, AircraftSnapshot};

/// Aircraft are cached out to this radius; the display filters tighter
const MAX_CACHE_RADIUS_NM: f64 = 1000.0;

/// Spawn the periodic refresh tasks
pub fn start_refreshers(state: AppState, cancel: CancellationToken) {
    tokio::spawn(wx_refresh_task(state.clone(), cancel.clone()));
    tokio::spawn(aircraft_refresh_task(state.clone(), cancel.clone()));
    tokio::spawn(controller_refresh_task(state, cancel));
}

async fn wx_refresh_task(state: AppState, cancel: CancellationToken) {
    let mut interval = time::interval(Duration::from_secs(state.config.wx_refresh_secs));
    info!(
        "airport info refresh task started ({}s interval)",
        state.config.wx_refresh_secs
    );
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("airport info refresh task stopping");
                break;
            }
            _ = interval.tick() => {
                let snapshot = build_airport_info(&state).await;
                state.cache.set_airport_info(snapshot).await;
                debug!("airport info cache updated");
            }
        }
    }
}

/// Build the weather snapshot. Per-airport fetch failures leave that
/// field empty rather than failing the whole cycle.
async fn build_airport_info(state: &AppState) -> AirportInfoSnapshot {
    let mut airports = HashMap::new();
    for icao in &state.config.atis_airports {
        let code = normalize_airport(icao);

        let metar = match state.wx.fetch_metar(icao).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("METAR fetch failed for {}: {}", icao, e);
                None
            }
        };
        let atis = match state.wx.fetch_atis_display(icao).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("ATIS fetch failed for {}: {}", icao, e);
                None
            }
        };
        let flow = match state.flow.detect_flow(&code).await {
            Ok(result) => result.direction().map(|d| d.to_string()),
            Err(e) => {
                warn!("flow detection failed for {}: {}", code, e);
                None
            }
        };

        airports.insert(icao.clone(), AirportWx { metar, atis, flow });
    }
    AirportInfoSnapshot {
        updated_at: Utc::now(),
        airports,
    }
}

async fn aircraft_refresh_task(state: AppState, cancel: CancellationToken) {
    let mut interval = time::interval(Duration::from_secs(state.config.aircraft_refresh_secs));
    info!(
        "aircraft refresh task started ({}s interval)",
        state.config.aircraft_refresh_secs
    );
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("aircraft refresh task stopping");
                break;
            }
            _ = interval.tick() => {
                match state.feeds.fetch_aircraft(MAX_CACHE_RADIUS_NM).await {
                    Ok(aircraft) => {
                        debug!("aircraft cache updated ({} aircraft)", aircraft.len());
                        state.cache.set_aircraft(AircraftSnapshot {
                            updated_at: Utc::now(),
                            aircraft,
                        }).await;
                    }
                    // previous snapshot stays readable
                    Err(e) => warn!("aircraft refresh failed: {}", e),
                }
            }
        }
    }
}

async fn controller_refresh_task(state: AppState, cancel: CancellationToken) {
    let mut interval = time::interval(Duration::from_secs(state.config.controller_refresh_secs));
    info!(
        "controller refresh task started ({}s interval)",
        state.config.controller_refresh_secs
    );
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("controller refresh task stopping");
                break;
            }
            _ = interval.tick() => {
                match state.feeds.fetch_controllers().await {
                    Ok(snapshot) => {
                        debug!(
                            "controller cache updated ({} center, {} tracon)",
                            snapshot.controllers.len(),
                            snapshot.tracon.len()
                        );
                        state.cache.set_controllers(snapshot).await;
                    }
                    Err(e) => warn!("controller refresh failed: {}", e),
                }
            }
        }
    }
}
