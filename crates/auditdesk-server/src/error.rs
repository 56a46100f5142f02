//! Server-wide error type
//!
//! Every feature error converts into [`AppError`], which owns the mapping
//! onto HTTP status codes and the `{"success": false, "error": {...}}` body.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::response::ErrorResponse;
use crate::auth::AuthError;
use crate::db::DbError;
use crate::policy::PolicyError;

/// Alias for handler results
pub type ApiResult<T> = Result<T, AppError>;

/// Application error taxonomy
#[derive(Error, Debug)]
pub enum AppError {
    /// Credential missing, malformed, or expired
    #[error("{0}")]
    Unauthenticated(String),

    /// Credential valid but its user is missing or inactive
    #[error("User not found or inactive")]
    IdentityNotFound,

    /// Role or department rule rejected the operation
    #[error("{0}")]
    Forbidden(String),

    /// The access checker denied the caller on an existing record
    #[error("{0}")]
    AccessDenied(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[source] DbError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::IdentityNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) | AppError::AccessDenied(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthenticated(_) => "UNAUTHENTICATED",
            AppError::IdentityNotFound => "IDENTITY_NOT_FOUND",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::AccessDenied(_) => "ACCESS_DENIED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Database(_) | AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                "A database error occurred".to_string()
            },
            AppError::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                "An internal error occurred".to_string()
            },
            other => other.to_string(),
        };

        (status, Json(ErrorResponse::new(self.code(), message))).into_response()
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Duplicate(message) => AppError::Conflict(message),
            DbError::NotFound(message) => AppError::NotFound(message),
            other => AppError::Database(other),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::IdentityNotFound => AppError::IdentityNotFound,
            AuthError::Store(db) => AppError::from(db),
            AuthError::Token(e) => AppError::Internal(e.to_string()),
            AuthError::Password(e) => AppError::Internal(e.to_string()),
            unauthenticated => AppError::Unauthenticated(unauthenticated.to_string()),
        }
    }
}

impl From<PolicyError> for AppError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::Forbidden(message) => AppError::Forbidden(message),
            PolicyError::AccessDenied(message) => AppError::AccessDenied(message),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Unauthenticated("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::IdentityNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::AccessDenied("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_forbidden_and_access_denied_have_distinct_codes() {
        assert_eq!(AppError::Forbidden("x".into()).code(), "FORBIDDEN");
        assert_eq!(AppError::AccessDenied("x".into()).code(), "ACCESS_DENIED");
    }

    #[test]
    fn test_duplicate_maps_to_conflict() {
        let err = AppError::from(DbError::duplicate("User", "a@b.co"));
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_database_error_is_internal() {
        let err = AppError::from(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }
}
