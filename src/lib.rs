use std::error::Error;

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::get,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::App;
use crate::handler::{AppState, healthcheck};

pub mod books;
pub mod config;
pub mod db;
pub mod error;
pub mod handler;

/// Builds the full service router around an already opened database.
pub fn app(state: AppState, cfg: &App) -> Router {
    Router::new()
        .route("/", get(healthcheck))
        .merge(books::routes())
        .layer(cors_layer(&cfg.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "ignoring invalid cors origin");
                None
            }
        })
        .collect();
    if origins.is_empty() {
        tracing::warn!("no valid cors origins configured, cross-origin requests will be refused");
    }
    cors.allow_origin(AllowOrigin::list(origins))
}

pub fn unpack_error(err: &dyn Error) -> String {
    let mut parts = Vec::new();
    parts.push(err.to_string());
    let mut current = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}
