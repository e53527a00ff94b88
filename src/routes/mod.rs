use axum::{response::IntoResponse, routing::get, Json, Router};
use http::StatusCode;
use serde_json::json;
use std::{error::Error, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt, Registry};
pub mod session;
pub use session::session_routes;

use crate::{
    models::cache::ResponseCache,
    providers::ergast::ErgastProvider,
    utils::{config::Config, rate_limiter::RateLimiter, state::AppState},
};

pub fn init_tracing() {
    let log_level = std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase();

    let level = match log_level.as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let filter = filter::Targets::new()
        .with_target("tower_http::trace::on_response", Level::TRACE)
        .with_target("tower_http::trace::on_request", Level::TRACE)
        .with_target("tower_http::trace::make_span", Level::DEBUG)
        .with_target("axum::rejection", Level::TRACE)
        .with_target(env!("CARGO_CRATE_NAME"), level)
        .with_default(Level::INFO);

    let tracing_layer = tracing_subscriber::fmt::layer();

    Registry::default().with(tracing_layer).with(filter).init();
}

pub fn make_app(config: &Config) -> Result<Router, Box<dyn Error>> {
    info!("Initializing application...");

    let http_client = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let limiter = RateLimiter::new(config.provider_max_concurrent, config.provider_min_delay_ms);
    let provider = ErgastProvider::new(http_client, &config.laps_api_url, limiter);
    info!("Lap provider configured at {}", config.laps_api_url);

    let state = Arc::new(AppState {
        provider: Arc::new(provider),
        response_cache: ResponseCache::new(config.response_cache_ttl),
    });

    let app = app_router(state);
    info!("Application initialized successfully");

    Ok(app)
}

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .nest("/telemetry", session_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"message": "ok"}))).into_response()
}
