//! HTTP API handlers

pub mod aircraft;
pub mod airport_info;
pub mod auth;
pub mod controllers;
pub mod crossings;
pub mod enroute;
pub mod error;
pub mod health;
pub mod procedures;
pub mod routes;

pub use aircraft::get_aircraft;
pub use airport_info::get_airport_info;
pub use auth::auth_middleware;
pub use controllers::get_controllers;
pub use crossings::{create_crossing, delete_crossing, list_crossings, update_crossing};
pub use enroute::{create_enroute, delete_enroute, list_enroute, update_enroute};
pub use error::ApiError;
pub use health::health_check;
pub use procedures::{get_sid_transition, get_star_transition};
pub use routes::{create_route, delete_route, search_routes, update_route};
