//! Cached controller roster endpoint

use axum::extract::State;
use axum::Json;
use ids_common::Error;

use super::error::ApiError;
use crate::cache::ControllerSnapshot;
use crate::AppState;

/// GET /api/controllers
pub async fn get_controllers(
    State(state): State<AppState>,
) -> Result<Json<ControllerSnapshot>, ApiError> {
    let snapshot = state
        .cache
        .controllers()
        .await
        .ok_or_else(|| Error::Upstream("No controller data available".to_string()))?;
    Ok(Json((*snapshot).clone()))
}
