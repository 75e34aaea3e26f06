//! Smart City Assistant: Binary Entrypoint
//! Boots the Axum HTTP server with the analysis pipeline, the optional
//! model client, and the Prometheus exporter.

use shuttle_axum::ShuttleAxum;
use smart_city_assistant::{api, metrics::Metrics, AppState};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default; JSON lines when LOG_FORMAT=json.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("smart_city_assistant=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let res = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    // Shuttle may already have installed a global subscriber.
    if res.is_err() {
        info!("tracing subscriber already set; keeping existing one");
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let state = AppState::from_env()?;
    let metrics = Metrics::init()?;

    let router = api::create_router(state).merge(metrics.router());
    info!("smart city assistant router ready");

    Ok(router.into())
}
