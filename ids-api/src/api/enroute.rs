//! Enroute qualifier rule endpoints
//!
//! The listing collapses rows whose (field, qualifier, areas, rule)
//! tuples are identical - the table is bulk-imported and carries exact
//! duplicates - and sorts by field.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use ids_common::db::EnrouteRow;
use ids_common::normalize::normalize_airport;
use ids_common::Error;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;

use super::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct EnrouteQuery {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub area: String,
}

/// GET /api/enroute?field=&area=
pub async fn list_enroute(
    State(state): State<AppState>,
    Query(query): Query<EnrouteQuery>,
) -> Result<Json<Vec<EnrouteRow>>, ApiError> {
    let field = normalize_airport(&query.field);

    let mut sql = String::from(
        "SELECT id, field, qualifier, areas, rule FROM enroute WHERE 1=1",
    );
    if !field.is_empty() {
        sql.push_str(" AND field LIKE '%' || ? || '%'");
    }
    if !query.area.is_empty() {
        sql.push_str(" AND areas LIKE '%' || ? || '%'");
    }

    let mut q = sqlx::query_as::<_, EnrouteRow>(&sql);
    if !field.is_empty() {
        q = q.bind(field.clone());
    }
    if !query.area.is_empty() {
        q = q.bind(query.area.clone());
    }

    let rows = q.fetch_all(&state.db).await.map_err(Error::from)?;

    let mut seen = HashSet::new();
    let mut results: Vec<EnrouteRow> = rows
        .into_iter()
        .filter(|row| {
            seen.insert((
                row.field.clone(),
                row.qualifier.clone(),
                row.areas.clone(),
                row.rule.clone(),
            ))
        })
        .collect();
    results.sort_by(|a, b| a.field.cmp(&b.field));

    Ok(Json(results))
}

#[derive(Debug, Deserialize)]
pub struct EnrouteBody {
    pub areas: String,
    pub field: String,
    pub qualifier: String,
    pub rule: String,
}

/// POST /api/enroute
pub async fn create_enroute(
    State(state): State<AppState>,
    Json(body): Json<EnrouteBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let result = sqlx::query(
        "INSERT INTO enroute (field, qualifier, areas, rule) VALUES (?, ?, ?, ?)",
    )
    .bind(&body.field)
    .bind(&body.qualifier)
    .bind(&body.areas)
    .bind(&body.rule)
    .execute(&state.db)
    .await
    .map_err(Error::from)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Enroute entry created successfully",
            "enroute_id": result.last_insert_rowid(),
        })),
    ))
}

/// PUT /api/enroute/:id
pub async fn update_enroute(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<EnrouteBody>,
) -> Result<Json<Value>, ApiError> {
    let result = sqlx::query(
        "UPDATE enroute SET field = ?, qualifier = ?, areas = ?, rule = ? WHERE id = ?",
    )
    .bind(&body.field)
    .bind(&body.qualifier)
    .bind(&body.areas)
    .bind(&body.rule)
    .bind(id)
    .execute(&state.db)
    .await
    .map_err(Error::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Enroute entry not found".to_string()).into());
    }
    Ok(Json(json!({ "message": "Enroute entry updated successfully" })))
}

/// DELETE /api/enroute/:id
pub async fn delete_enroute(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let result = sqlx::query("DELETE FROM enroute WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(Error::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Enroute entry not found".to_string()).into());
    }
    Ok(Json(json!({ "message": "Enroute entry deleted successfully" })))
}
