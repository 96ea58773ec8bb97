//! Cached airport weather/ATIS/flow endpoint

use axum::extract::State;
use axum::Json;
use ids_common::Error;

use super::error::ApiError;
use crate::cache::AirportInfoSnapshot;
use crate::AppState;

/// GET /api/airport_info
///
/// 503 until the first refresh cycle completes.
pub async fn get_airport_info(
    State(state): State<AppState>,
) -> Result<Json<AirportInfoSnapshot>, ApiError> {
    let snapshot = state
        .cache
        .airport_info()
        .await
        .ok_or_else(|| Error::Upstream("No airport info available".to_string()))?;
    Ok(Json((*snapshot).clone()))
}
