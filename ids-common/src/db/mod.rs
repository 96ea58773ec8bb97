//! Database access layer: pool initialization, schema, and row models

mod init;
mod models;

pub use init::{create_schema, init_database};
pub use models::{CrossingRow, EnrouteRow, FaaRouteRow, ProcedurePointRow, RouteRow};
