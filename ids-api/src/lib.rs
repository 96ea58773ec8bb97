//! ids-api library - IDS backend HTTP service
//!
//! Serves preferred-route resolution, reference-data CRUD, and cached
//! live data (weather/flow, aircraft, controllers) for the facility
//! information display.

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::Router;
use ids_common::wx::{FlowDetector, WxClient};
use ids_common::Config;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod api;
pub mod cache;
pub mod resolve;

use cache::{CacheStore, FeedClient};

/// Application state shared across HTTP handlers and refresh tasks
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    pub config: Arc<Config>,
    /// Weather text source client
    pub wx: WxClient,
    /// Live departure-flow detector
    pub flow: Arc<FlowDetector>,
    /// VATSIM / vNAS feed client
    pub feeds: FeedClient,
    /// Live-data snapshots
    pub cache: Arc<CacheStore>,
    /// API shared secret; empty disables auth on mutating routes
    pub shared_secret: String,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        config: Config,
        wx: WxClient,
        flow: FlowDetector,
        feeds: FeedClient,
        shared_secret: String,
    ) -> Self {
        Self {
            db,
            config: Arc::new(config),
            wx,
            flow: Arc::new(flow),
            feeds,
            cache: Arc::new(CacheStore::default()),
            shared_secret,
        }
    }
}

/// Build the application router.
///
/// Mutating routes sit behind the shared-secret middleware; every read
/// path, including the health endpoint, is public.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post, put};

    let protected = Router::new()
        .route("/api/routes", post(api::create_route))
        .route(
            "/api/routes/:id",
            put(api::update_route).delete(api::delete_route),
        )
        .route("/api/crossings", post(api::create_crossing))
        .route(
            "/api/crossings/:id",
            put(api::update_crossing).delete(api::delete_crossing),
        )
        .route("/api/enroute", post(api::create_enroute))
        .route(
            "/api/enroute/:id",
            put(api::update_enroute).delete(api::delete_enroute),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    let public = Router::new()
        .route("/health", get(api::health_check))
        .route("/api/routes", get(api::search_routes))
        .route("/api/crossings", get(api::list_crossings))
        .route("/api/enroute", get(api::list_enroute))
        .route("/api/star", get(api::get_star_transition))
        .route("/api/sid", get(api::get_sid_transition))
        .route("/api/aircraft", get(api::get_aircraft))
        .route("/api/controllers", get(api::get_controllers))
        .route("/api/airport_info", get(api::get_airport_info));

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the display frontends. Origins that fail to parse are
/// skipped with a warning rather than failing startup.
fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("ignoring unparseable CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}
