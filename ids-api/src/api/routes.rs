//! Curated route endpoints: flow-aware resolution plus CRUD
//!
//! The GET handler is the front door of the resolution engine; origin
//! and destination are both optional and arrive in whatever case the
//! display sends. Mutating handlers store airport codes and route
//! strings normalized so the store's exact-match filters keep working.

use axum::extract::{Path, Query, State};
use axum::Json;
use ids_common::normalize::{normalize_airport, normalize_route};
use ids_common::Error;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::ApiError;
use crate::resolve::{self, RankedRoute};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RoutesQuery {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
}

/// GET /api/routes?origin=&destination=
pub async fn search_routes(
    State(state): State<AppState>,
    Query(query): Query<RoutesQuery>,
) -> Result<Json<Vec<RankedRoute>>, ApiError> {
    let routes = resolve::resolve(
        &state.db,
        state.flow.as_ref(),
        &query.origin,
        &query.destination,
    )
    .await?;
    Ok(Json(routes))
}

#[derive(Debug, Deserialize)]
pub struct RouteBody {
    pub origin: String,
    pub destination: String,
    pub route: String,
    #[serde(default)]
    pub altitude: String,
    #[serde(default)]
    pub notes: String,
}

/// POST /api/routes
pub async fn create_route(
    State(state): State<AppState>,
    Json(body): Json<RouteBody>,
) -> Result<Json<Value>, ApiError> {
    let result = sqlx::query(
        "INSERT INTO routes (origin, destination, route, altitude, notes)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(normalize_airport(&body.origin))
    .bind(normalize_airport(&body.destination))
    .bind(normalize_route(&body.route))
    .bind(&body.altitude)
    .bind(&body.notes)
    .execute(&state.db)
    .await
    .map_err(Error::from)?;

    Ok(Json(json!({
        "message": "Route created successfully",
        "route_id": result.last_insert_rowid(),
    })))
}

/// PUT /api/routes/:id
pub async fn update_route(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<RouteBody>,
) -> Result<Json<Value>, ApiError> {
    let result = sqlx::query(
        "UPDATE routes SET origin = ?, destination = ?, route = ?, altitude = ?, notes = ?
         WHERE id = ?",
    )
    .bind(normalize_airport(&body.origin))
    .bind(normalize_airport(&body.destination))
    .bind(normalize_route(&body.route))
    .bind(&body.altitude)
    .bind(&body.notes)
    .bind(id)
    .execute(&state.db)
    .await
    .map_err(Error::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Route not found".to_string()).into());
    }
    Ok(Json(json!({ "message": "Route updated successfully" })))
}

/// DELETE /api/routes/:id
pub async fn delete_route(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let result = sqlx::query("DELETE FROM routes WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(Error::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Route not found".to_string()).into());
    }
    Ok(Json(json!({ "message": "Route deleted successfully" })))
}
