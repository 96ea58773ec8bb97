//! Cached aircraft endpoint

use axum::extract::{Query, State};
use axum::Json;
use ids_common::geo::{distance_nm, DJB_VOR};
use ids_common::Error;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::cache::Aircraft;
use crate::AppState;

const DEFAULT_RADIUS_NM: f64 = 400.0;

#[derive(Debug, Deserialize)]
pub struct AircraftQuery {
    pub radius: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct AircraftResponse {
    pub aircraft: Vec<Aircraft>,
}

/// GET /api/aircraft?radius=
///
/// Serves the last aircraft snapshot, narrowed to the requested radius
/// around the facility reference point. The cache itself covers a wider
/// area so the display can widen its view without a refetch.
pub async fn get_aircraft(
    State(state): State<AppState>,
    Query(query): Query<AircraftQuery>,
) -> Result<Json<AircraftResponse>, ApiError> {
    let snapshot = state
        .cache
        .aircraft()
        .await
        .ok_or_else(|| Error::Upstream("Aircraft cache unavailable".to_string()))?;

    let radius = query.radius.unwrap_or(DEFAULT_RADIUS_NM);
    let (ref_lat, ref_lon) = DJB_VOR;

    let aircraft = snapshot
        .aircraft
        .iter()
        .filter(|ac| distance_nm(ac.lat, ac.lon, ref_lat, ref_lon) <= radius)
        .cloned()
        .collect();

    Ok(Json(AircraftResponse { aircraft }))
}
