//! Boundary crossing restriction endpoints

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use ids_common::db::CrossingRow;
use ids_common::normalize::normalize_airport;
use ids_common::Error;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CrossingsQuery {
    #[serde(default)]
    pub destination: String,
}

/// Crossing as the display consumes it (`bdry_fix` exposed as `fix`)
#[derive(Debug, Serialize)]
pub struct CrossingResponse {
    pub id: i64,
    pub destination: String,
    pub fix: String,
    pub restriction: String,
    pub notes: String,
    pub artcc: String,
}

impl From<CrossingRow> for CrossingResponse {
    fn from(row: CrossingRow) -> Self {
        Self {
            id: row.id,
            destination: row.destination,
            fix: row.bdry_fix,
            restriction: row.restriction,
            notes: row.notes,
            artcc: row.artcc,
        }
    }
}

/// GET /api/crossings?destination=
pub async fn list_crossings(
    State(state): State<AppState>,
    Query(query): Query<CrossingsQuery>,
) -> Result<Json<Vec<CrossingResponse>>, ApiError> {
    let destination = normalize_airport(&query.destination);

    let rows = if destination.is_empty() {
        sqlx::query_as::<_, CrossingRow>(
            "SELECT id, destination, bdry_fix, restriction, notes, artcc
             FROM crossings ORDER BY destination",
        )
        .fetch_all(&state.db)
        .await
    } else {
        sqlx::query_as::<_, CrossingRow>(
            "SELECT id, destination, bdry_fix, restriction, notes, artcc
             FROM crossings WHERE destination = ? ORDER BY destination",
        )
        .bind(&destination)
        .fetch_all(&state.db)
        .await
    }
    .map_err(Error::from)?;

    Ok(Json(rows.into_iter().map(CrossingResponse::from).collect()))
}

#[derive(Debug, Deserialize)]
pub struct CrossingBody {
    pub destination: String,
    #[serde(default)]
    pub fix: String,
    pub restriction: String,
    #[serde(default)]
    pub notes: String,
    pub artcc: String,
}

/// POST /api/crossings
pub async fn create_crossing(
    State(state): State<AppState>,
    Json(body): Json<CrossingBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let result = sqlx::query(
        "INSERT INTO crossings (destination, bdry_fix, restriction, notes, artcc)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(normalize_airport(&body.destination))
    .bind(&body.fix)
    .bind(&body.restriction)
    .bind(&body.notes)
    .bind(&body.artcc)
    .execute(&state.db)
    .await
    .map_err(Error::from)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Crossing created successfully",
            "crossing_id": result.last_insert_rowid(),
        })),
    ))
}

/// PUT /api/crossings/:id
pub async fn update_crossing(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<CrossingBody>,
) -> Result<Json<Value>, ApiError> {
    let result = sqlx::query(
        "UPDATE crossings SET destination = ?, bdry_fix = ?, restriction = ?, notes = ?, artcc = ?
         WHERE id = ?",
    )
    .bind(normalize_airport(&body.destination))
    .bind(&body.fix)
    .bind(&body.restriction)
    .bind(&body.notes)
    .bind(&body.artcc)
    .bind(id)
    .execute(&state.db)
    .await
    .map_err(Error::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Crossing not found".to_string()).into());
    }
    Ok(Json(json!({ "message": "Crossing updated successfully" })))
}

/// DELETE /api/crossings/:id
pub async fn delete_crossing(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let result = sqlx::query("DELETE FROM crossings WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(Error::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Crossing not found".to_string()).into());
    }
    Ok(Json(json!({ "message": "Crossing deleted successfully" })))
}
