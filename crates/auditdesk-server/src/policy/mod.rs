//! Access-control policy
//!
//! Pure decisions over an explicit caller [`Identity`]:
//!
//! - [`visibility`]: the predicate restricting which audits a list returns
//! - [`access`]: whether a caller may read, update, or delete one audit
//! - [`mutation`]: what a caller may set on create/update, and the derived
//!   fields (completion dates, score) recomputed before every write
//!
//! Nothing here touches a store. Callers resolve existence first, then ask
//! for a decision, then persist.

pub mod access;
pub mod mutation;
pub mod visibility;

use thiserror::Error;

use crate::auth::Identity;

pub use access::{authorize, can_access, can_delete, AuditAction};
pub use mutation::{check_create, check_department_change, derive_fields, overall_score};
pub use visibility::{AuditFilters, AuditPredicate, Scope};

/// A policy denial
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// Role or department rule rejected the operation itself
    #[error("{0}")]
    Forbidden(String),

    /// The caller may not act on this particular audit
    #[error("{0}")]
    AccessDenied(String),
}

/// Admin-only operations
pub fn require_admin(identity: &Identity) -> Result<(), PolicyError> {
    if identity.is_admin() {
        Ok(())
    } else {
        tracing::warn!(user_id = %identity.id, role = %identity.role, "Admin privileges required");
        Err(PolicyError::Forbidden(
            "Access denied. Admin privileges required.".to_string(),
        ))
    }
}
