//! STAR/DP transition expansion
//!
//! Expands a transition computer code (e.g. `KKILR3.KAMMA`) to its
//! waypoint sequence. Rows tied to a specific runway (association text
//! containing `/`) are skipped so the expansion stays runway-agnostic.
//! When the transition code finds nothing, the bare procedure code is
//! tried with TRANSITION-named rows excluded; as a last resort the text
//! after the first `.` is returned as the only waypoint.

use axum::extract::{Query, State};
use axum::Json;
use ids_common::Error;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TransitionQuery {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub transition: String,
    pub waypoints: Vec<String>,
}

/// GET /api/star?code=
pub async fn get_star_transition(
    State(state): State<AppState>,
    Query(query): Query<TransitionQuery>,
) -> Result<Json<TransitionResponse>, ApiError> {
    expand_transition(&state.db, "star_rte", &query.code).await
}

/// GET /api/sid?code=
pub async fn get_sid_transition(
    State(state): State<AppState>,
    Query(query): Query<TransitionQuery>,
) -> Result<Json<TransitionResponse>, ApiError> {
    expand_transition(&state.db, "sid_rte", &query.code).await
}

async fn expand_transition(
    pool: &SqlitePool,
    table: &str,
    code: &str,
) -> Result<Json<TransitionResponse>, ApiError> {
    let code = code.trim().to_uppercase();
    if code.is_empty() {
        return Err(Error::InvalidInput("'code' is required".to_string()).into());
    }

    // First try: the transition computer code
    let mut points: Vec<String> = sqlx::query_scalar(&format!(
        "SELECT point FROM {}
         WHERE transition_code = ? AND instr(arpt_rwy_assoc, '/') = 0
         ORDER BY point_seq DESC",
        table
    ))
    .bind(&code)
    .fetch_all(pool)
    .await
    .map_err(Error::from)?;

    // Second try: the procedure code itself, excluding transition rows
    if points.is_empty() {
        points = sqlx::query_scalar(&format!(
            "SELECT point FROM {}
             WHERE procedure_code = ?
               AND route_name NOT LIKE '%TRANSITION%'
               AND instr(arpt_rwy_assoc, '/') = 0
             ORDER BY point_seq DESC",
            table
        ))
        .bind(&code)
        .fetch_all(pool)
        .await
        .map_err(Error::from)?;
    }

    let mut waypoints = Vec::new();
    for point in points {
        if !point.is_empty() && !waypoints.contains(&point) {
            waypoints.push(point);
        }
    }

    if waypoints.is_empty() {
        // Dotted codes degrade to the transition fix itself
        if let Some((_, after_dot)) = code.split_once('.') {
            return Ok(Json(TransitionResponse {
                transition: code.clone(),
                waypoints: vec![after_dot.to_string()],
            }));
        }
        return Err(
            Error::NotFound(format!("No valid waypoints found for {}", code)).into(),
        );
    }

    Ok(Json(TransitionResponse {
        transition: code,
        waypoints,
    }))
}
