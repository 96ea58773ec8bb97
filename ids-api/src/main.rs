//! ids-api - IDS backend HTTP service
//!
//! Serves route resolution, reference data, and cached live data for
//! the facility information display. Background refresh tasks keep the
//! live-data snapshots warm and stop cleanly on shutdown.

use anyhow::Result;
use clap::Parser;
use ids_api::{build_router, cache, AppState};
use ids_common::api::auth::load_shared_secret;
use ids_common::db::init_database;
use ids_common::wx::{FlowDetector, WxClient};
use ids_common::{Config, FlowMap};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "ids-api", about = "IDS backend HTTP service")]
struct Args {
    /// Path to the service config TOML
    #[arg(long, env = "IDS_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured listen address
    #[arg(long)]
    bind: Option<String>,

    /// Override the configured database path
    #[arg(long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately for instant startup feedback
    info!(
        "Starting IDS backend (ids-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(database) = args.database {
        config.database_path = database;
    }

    // A missing flow map only disables flow detection; the rest of the
    // service keeps its zero-config startup
    let flow_map = if config.runway_flow_path.exists() {
        let map = FlowMap::load(&config.runway_flow_path)?;
        info!(
            "✓ Loaded runway flow map from {}",
            config.runway_flow_path.display()
        );
        map
    } else {
        warn!(
            "runway flow map not found at {}; flow detection disabled",
            config.runway_flow_path.display()
        );
        FlowMap::default()
    };

    let pool = init_database(&config.database_path).await?;

    let shared_secret = load_shared_secret(&pool).await?;
    if shared_secret.is_empty() {
        info!("API authentication disabled (no shared secret set)");
    } else {
        info!("✓ Loaded shared secret for API authentication");
    }

    let timeout = Duration::from_secs(config.fetch_timeout_secs);
    let wx = WxClient::new(
        config.datis_base_url.as_str(),
        config.metar_base_url.as_str(),
        timeout,
    )?;
    let feeds = cache::FeedClient::new(
        config.vatsim_data_url.as_str(),
        config.vnas_controllers_url.as_str(),
        timeout,
    )?;
    let flow = FlowDetector::new(wx.clone(), flow_map);

    let bind = config.bind.clone();
    let state = AppState::new(pool, config, wx, flow, feeds, shared_secret);

    let cancel = CancellationToken::new();
    cache::start_refreshers(state.clone(), cancel.clone());

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("ids-api listening on http://{}", bind);
    info!("Health check: http://{}/health", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received, stopping refresh tasks");
            cancel.cancel();
        })
        .await?;

    Ok(())
}
