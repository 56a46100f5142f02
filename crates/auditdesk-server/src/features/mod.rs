//! Feature modules implementing the AuditDesk API
//!
//! Each feature is a vertical command/query slice:
//! - `commands/` - Write operations
//! - `queries/` - Read operations
//! - `routes.rs` - HTTP handlers and the mapping of slice errors onto [`AppError`]
//!
//! # Features
//!
//! - **audits**: audit records and their checklist items
//! - **users**: user administration (admin only)
//! - **auth**: login, registration, profile, and first-run admin setup
//!
//! [`AppError`]: crate::error::AppError

pub mod audits;
pub mod auth;
pub mod shared;
pub mod users;

use auditdesk_common::types::DepartmentSet;
use axum::{extract::FromRef, Router};
use std::sync::Arc;

use crate::auth::{Authenticator, PasswordService, TokenService};
use crate::db::{AuditStore, UserStore};

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    pub audits: Arc<dyn AuditStore>,
    pub users: Arc<dyn UserStore>,
    pub tokens: Arc<TokenService>,
    pub passwords: PasswordService,
    /// Valid departments for audits and accounts
    pub departments: Arc<DepartmentSet>,
}

impl FromRef<FeatureState> for Authenticator {
    fn from_ref(state: &FeatureState) -> Self {
        Authenticator::new(state.tokens.clone(), state.users.clone())
    }
}

/// Mount every feature under its path prefix
///
/// - `/audits` - Audit records
/// - `/admin/users` - User administration
/// - `/auth` - Login, registration, profile
/// - `/setup` - First-run admin setup
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/audits", audits::audits_routes())
        .nest("/admin/users", users::users_routes())
        .nest("/auth", auth::auth_routes())
        .nest("/setup", auth::setup_routes())
        .with_state(state)
}
