//! Database row models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Locally curated route row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RouteRow {
    pub id: i64,
    pub origin: String,
    pub destination: String,
    pub route: String,
    pub altitude: String,
    pub notes: String,
}

/// FAA preferred route row. These rows are scoped by query, carry their
/// applicability in `area`/`direction` text, and never supply an altitude
/// usable for display.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FaaRouteRow {
    pub id: i64,
    pub orig: String,
    pub route_string: String,
    pub dest: String,
    pub hours: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub route_type: String,
    pub area: String,
    pub altitude: String,
    pub aircraft: String,
    pub direction: String,
    pub seq: i64,
}

/// Boundary crossing restriction row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CrossingRow {
    pub id: i64,
    pub destination: String,
    pub bdry_fix: String,
    pub restriction: String,
    pub notes: String,
    pub artcc: String,
}

/// Enroute qualifier rule row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EnrouteRow {
    pub id: i64,
    pub field: String,
    pub qualifier: String,
    pub areas: String,
    pub rule: String,
}

/// One point of a STAR/DP route expansion
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProcedurePointRow {
    pub id: i64,
    pub procedure_code: String,
    pub transition_code: String,
    pub route_name: String,
    pub point_seq: i64,
    pub point: String,
    pub arpt_rwy_assoc: String,
}
