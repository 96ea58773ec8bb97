//! Route store queries
//!
//! Both stores take independently optional origin/destination filters.
//! An origin filter matches the stored origin exactly OR appears as a
//! case-insensitive substring of the notes/area text; published routes
//! often document their applicability in the scope note rather than the
//! structured origin field. A destination filter is always an exact
//! match.
//!
//! With no filters at all, the custom store returns every row while the
//! FAA store returns nothing without touching the database: the FAA
//! table is far too large to dump wholesale. That asymmetry is a
//! deliberate cost/usefulness tradeoff and must be preserved.
//!
//! Neither function validates its arguments; requiring at least one
//! filter is the HTTP boundary's concern.

use ids_common::db::{FaaRouteRow, RouteRow};
use ids_common::{Error, Result};
use sqlx::SqlitePool;

fn store_unavailable(which: &str, e: sqlx::Error) -> Error {
    Error::Upstream(format!("{} store unavailable: {}", which, e))
}

/// Query the locally curated route collection
pub async fn query_custom(
    pool: &SqlitePool,
    origin: Option<&str>,
    destination: Option<&str>,
) -> Result<Vec<RouteRow>> {
    const COLS: &str = "id, origin, destination, route, altitude, notes";
    let rows = match (origin, destination) {
        (Some(o), Some(d)) => {
            sqlx::query_as::<_, RouteRow>(&format!(
                "SELECT {} FROM routes
                 WHERE (origin = ?1 OR notes LIKE '%' || ?1 || '%') AND destination = ?2",
                COLS
            ))
            .bind(o)
            .bind(d)
            .fetch_all(pool)
            .await
        }
        (Some(o), None) => {
            sqlx::query_as::<_, RouteRow>(&format!(
                "SELECT {} FROM routes
                 WHERE origin = ?1 OR notes LIKE '%' || ?1 || '%'",
                COLS
            ))
            .bind(o)
            .fetch_all(pool)
            .await
        }
        (None, Some(d)) => {
            sqlx::query_as::<_, RouteRow>(&format!(
                "SELECT {} FROM routes WHERE destination = ?1",
                COLS
            ))
            .bind(d)
            .fetch_all(pool)
            .await
        }
        (None, None) => {
            sqlx::query_as::<_, RouteRow>(&format!("SELECT {} FROM routes", COLS))
                .fetch_all(pool)
                .await
        }
    };
    rows.map_err(|e| store_unavailable("routes", e))
}

/// Query the FAA preferred route collection
pub async fn query_faa(
    pool: &SqlitePool,
    origin: Option<&str>,
    destination: Option<&str>,
) -> Result<Vec<FaaRouteRow>> {
    const COLS: &str =
        "id, orig, route_string, dest, hours, type, area, altitude, aircraft, direction, seq";
    let rows = match (origin, destination) {
        (Some(o), Some(d)) => {
            sqlx::query_as::<_, FaaRouteRow>(&format!(
                "SELECT {} FROM faa_prefroutes
                 WHERE (orig = ?1 OR area LIKE '%' || ?1 || '%') AND dest = ?2",
                COLS
            ))
            .bind(o)
            .bind(d)
            .fetch_all(pool)
            .await
        }
        (Some(o), None) => {
            sqlx::query_as::<_, FaaRouteRow>(&format!(
                "SELECT {} FROM faa_prefroutes
                 WHERE orig = ?1 OR area LIKE '%' || ?1 || '%'",
                COLS
            ))
            .bind(o)
            .fetch_all(pool)
            .await
        }
        (None, Some(d)) => {
            sqlx::query_as::<_, FaaRouteRow>(&format!(
                "SELECT {} FROM faa_prefroutes WHERE dest = ?1",
                COLS
            ))
            .bind(d)
            .fetch_all(pool)
            .await
        }
        // No criteria: the FAA table is never dumped wholesale
        (None, None) => return Ok(Vec::new()),
    };
    rows.map_err(|e| store_unavailable("faa_prefroutes", e))
}
