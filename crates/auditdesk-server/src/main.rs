//! AuditDesk Server - Main entry point

use anyhow::Result;
use auditdesk_common::logging::{init_logging, LogConfig};
use tracing::info;

use auditdesk_server::{api, config::Config};

/// Per-target directives applied when `LOG_FILTER` is unset
const DEFAULT_LOG_FILTER: &str = "auditdesk_server=debug,tower_http=debug,sqlx=warn";

#[tokio::main]
async fn main() -> Result<()> {
    let mut log_config = LogConfig::from_env()?;
    if log_config.filter_directives.is_none() {
        log_config.filter_directives = Some(DEFAULT_LOG_FILTER.to_string());
    }
    let _log_guard = init_logging(&log_config)?;

    info!("Starting AuditDesk Server");

    let config = Config::load()?;
    info!(
        storage = ?config.storage,
        departments = config.departments.len(),
        "Configuration loaded - server will bind to {}:{}",
        config.server.host,
        config.server.port
    );

    api::serve(config).await
}
