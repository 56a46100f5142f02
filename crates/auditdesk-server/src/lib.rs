//! AuditDesk Server Library
//!
//! HTTP server for managing internal audits and their checklist items.
//!
//! # Overview
//!
//! - **Authentication**: bearer JWTs resolved into a caller [`auth::Identity`]
//! - **Policy**: role- and department-scoped visibility, record access, and
//!   the mutation gate that owns every derived field ([`policy`])
//! - **Persistence**: PostgreSQL through SQLx, or in-memory stores for local
//!   runs and tests ([`db`])
//! - **Configuration**: environment-based configuration ([`config`])
//!
//! # Architecture
//!
//! Endpoints are organized as command/query feature slices under [`features`]:
//!
//! - **Commands** (create, update, delete) validate their payload, resolve the
//!   target record, run the access checker and mutation gate, then persist
//! - **Queries** (get, list) resolve the caller's visibility predicate or
//!   access decision before returning any record
//!
//! Every policy function takes the caller's identity explicitly; nothing is
//! read from ambient state.
//!
//! # Example
//!
//! ```no_run
//! use auditdesk_server::{api, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     api::serve(config).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;
pub mod models;
pub mod policy;

// Re-export commonly used types
pub use error::{AppError, ApiResult};
