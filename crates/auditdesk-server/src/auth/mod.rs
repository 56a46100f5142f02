//! Authentication
//!
//! Resolves a bearer credential into the caller's [`Identity`]. Token
//! signing lives in [`jwt`], password hashing in [`password`], the
//! resolution itself in [`authenticator`], and the axum extractor that runs
//! it for every protected route in [`extractor`].

pub mod authenticator;
pub mod extractor;
pub mod jwt;
pub mod password;

use auditdesk_common::types::{Department, Role};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::db::DbError;
use crate::models::User;

pub use authenticator::Authenticator;
pub use extractor::CurrentIdentity;
pub use jwt::{Claims, TokenError, TokenService};
pub use password::{PasswordError, PasswordService};

/// The resolved caller of a request
///
/// Role and department are fixed for the duration of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub role: Role,
    pub department: Department,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
            department: user.department.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization token required")]
    MissingCredential,

    #[error("Invalid or expired token")]
    InvalidCredential,

    #[error("Invalid or expired token")]
    ExpiredCredential,

    /// Login failure; never says which of email or password was wrong
    #[error("Invalid email or password")]
    InvalidLogin,

    #[error("User not found or inactive")]
    IdentityNotFound,

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Password hashing error: {0}")]
    Password(#[from] PasswordError),

    #[error("User lookup failed: {0}")]
    Store(#[from] DbError),
}
