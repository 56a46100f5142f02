//! HTTP server assembly
//!
//! [`serve`] builds the stores for the configured backend, mounts the
//! feature routers under `/api/v1`, and runs until a shutdown signal.

pub mod response;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::compression::CompressionLayer;

use crate::auth::{PasswordService, TokenService};
use crate::config::{Config, StorageBackend};
use crate::db::{self, MemoryAuditStore, MemoryUserStore, PgAuditStore, PgUserStore};
use crate::error::AppError;
use crate::features::{self, FeatureState};
use crate::middleware;

/// Run the server until Ctrl+C or SIGTERM
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let state = build_state(&config).await?;
    let app = create_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Stores and services for the configured backend
pub async fn build_state(config: &Config) -> anyhow::Result<FeatureState> {
    let (audits, users): (Arc<dyn db::AuditStore>, Arc<dyn db::UserStore>) = match config.storage {
        StorageBackend::Postgres => {
            let pool = db::create_pool(&config.database).await?;
            sqlx::migrate!("../../migrations")
                .run(&pool)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
            tracing::info!("Database migrations completed");

            (
                Arc::new(PgAuditStore::new(pool.clone())),
                Arc::new(PgUserStore::new(pool)),
            )
        },
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            (Arc::new(MemoryAuditStore::new()), Arc::new(MemoryUserStore::new()))
        },
    };

    Ok(FeatureState {
        audits,
        users,
        tokens: Arc::new(TokenService::from_config(&config.auth)),
        passwords: PasswordService::default(),
        departments: Arc::new(config.departments.clone()),
    })
}

/// Application router with all routes and middleware
pub fn create_router(state: FeatureState, config: &Config) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health_check))
        .with_state(state.clone());

    Router::new()
        .merge(health_routes)
        .nest("/api/v1", features::router(state))
        .fallback(route_not_found)
        // Apply layers from innermost to outermost
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

async fn health_check(State(state): State<FeatureState>) -> Response {
    match state.audits.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "datastore": "connected",
                "version": env!("CARGO_PKG_VERSION"),
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Datastore health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "datastore": "unreachable",
                })),
            )
                .into_response()
        },
    }
}

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

/// Resolve on Ctrl+C or SIGTERM, then give in-flight requests time to finish
pub async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, starting graceful shutdown"),
        _ = terminate => tracing::info!("Received terminate signal, starting graceful shutdown"),
    }

    tracing::info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
