//! HTTP middleware
//!
//! - CORS from [`CorsConfig`]
//! - Request tracing

use axum::http::{header, Method};
use std::time::Duration;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::{AllowOrigin, Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::CorsConfig;

/// Create CORS layer from configuration
///
/// Credentials are only allowed with an explicit origin list; a wildcard
/// origin never carries them.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(3600));

    match explicit_origins(config) {
        Some(origins) => cors
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(config.allow_credentials),
        None => {
            if config.allow_credentials {
                tracing::warn!("CORS credentials ignored for wildcard origin");
            }
            cors.allow_origin(Any)
        },
    }
}

/// Parsed origins, or `None` for "any origin"
fn explicit_origins(config: &CorsConfig) -> Option<Vec<header::HeaderValue>> {
    if config.allowed_origins.is_empty() || config.allowed_origins.iter().any(|o| o == "*") {
        return None;
    }

    let origins: Vec<_> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Skipping unparsable CORS origin");
                None
            },
        })
        .collect();

    if origins.is_empty() {
        None
    } else {
        Some(origins)
    }
}

/// Create tracing/logging layer
pub fn tracing_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(tower_http::LatencyUnit::Micros),
        )
}
