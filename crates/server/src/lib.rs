//! health-server library crate
//!
//! Exposes `build_app` and the building blocks integration tests need.
//! The binary entrypoint is in `main.rs`.

pub mod ai;
pub mod auth;
pub mod chat;
pub mod config;
pub mod db;
mod error;
mod middleware;
mod pdf;
mod routes;

use axum::{
    Extension, Router,
    extract::DefaultBodyLimit,
    middleware as axum_mw,
    routing::get,
};
use deadpool_postgres::Pool;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use ai::{Assistant, GeminiClient};
use auth::TokenKeys;
use chat::ChatStore;
use config::Config;
use routes::profile::UploadSettings;

pub use error::{AppError, ErrorBody};

/// Build the full application router with all routes and middleware.
///
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a TCP port.
pub fn build_app(pool: Pool, config: &Config) -> Router {
    let keys = TokenKeys::new(&config.jwt_secret, config.token_ttl_hours);
    let chats = ChatStore::new();
    let uploads = UploadSettings {
        dir: PathBuf::from(&config.upload_dir),
        public_base_url: config.public_base_url.clone(),
    };

    // None if GEMINI_API_KEY is not set; every reply then falls back
    let assistant = Assistant::new(config.gemini_api_key.as_ref().map(|key| {
        GeminiClient::new(key.clone(), &config.gemini_api_url, &config.gemini_model)
    }));

    let rate_limiter = middleware::create_rate_limiter(config.rate_limit_rps);

    let protected_routes = routes::protected_routes()
        .layer(axum_mw::from_fn(middleware::auth_middleware))
        .layer(axum_mw::from_fn(middleware::rate_limit_middleware))
        .layer(Extension(rate_limiter));

    // build_recorder() + set_global_recorder() so repeated calls (tests)
    // don't panic; later installs are ignored but still yield a handle
    let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
    let prometheus_handle = recorder.handle();
    let _ = metrics::set_global_recorder(recorder);

    let service_routes = Router::new()
        .route("/health", get(routes::health::check))
        .route("/metrics", get(routes::metrics::get))
        .layer(Extension(prometheus_handle));

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(service_routes)
        .merge(routes::public_routes())
        .merge(protected_routes)
        .nest_service("/uploads", ServeDir::new(&uploads.dir))
        .with_state(pool)
        .layer(Extension(keys))
        .layer(Extension(chats))
        .layer(Extension(assistant))
        .layer(Extension(uploads))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(axum_mw::from_fn(middleware::audit_middleware))
        .layer(axum_mw::from_fn(middleware::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_mw::from_fn(middleware::metrics_middleware))
}
