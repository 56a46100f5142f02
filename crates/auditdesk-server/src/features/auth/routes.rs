//! Authentication routes
//!
//! - `POST /api/v1/auth/login` - Exchange email and password for a token
//! - `POST /api/v1/auth/register` - Create an auditor account
//! - `GET /api/v1/auth/me` - Profile of the bearer
//! - `POST /api/v1/setup/admin` - Create the first admin on an empty system

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};

use super::{
    commands::{
        self, LoginCommand, LoginError, RegisterCommand, RegisterError, SetupAdminCommand,
        SetupAdminError,
    },
    queries::{self, MeError, MeQuery},
};
use crate::api::response::ApiResponse;
use crate::auth::CurrentIdentity;
use crate::error::{ApiResult, AppError};
use crate::features::shared::AppJson;
use crate::features::FeatureState;

pub fn auth_routes() -> Router<FeatureState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/me", get(me))
}

pub fn setup_routes() -> Router<FeatureState> {
    Router::new().route("/admin", post(setup_admin))
}

async fn login(
    State(state): State<FeatureState>,
    AppJson(command): AppJson<LoginCommand>,
) -> ApiResult<Response> {
    let response = commands::login::handle(
        state.users.as_ref(),
        &state.passwords,
        &state.tokens,
        command,
    )
    .await?;
    Ok(ApiResponse::success(response).into_response())
}

async fn register(
    State(state): State<FeatureState>,
    AppJson(command): AppJson<RegisterCommand>,
) -> ApiResult<Response> {
    let response = commands::register::handle(
        state.users.as_ref(),
        &state.passwords,
        &state.tokens,
        &state.departments,
        command,
    )
    .await?;
    Ok(ApiResponse::success(response).created())
}

async fn me(
    State(state): State<FeatureState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> ApiResult<Response> {
    let profile = queries::me::handle(state.users.as_ref(), &identity, MeQuery::default()).await?;
    Ok(ApiResponse::success(profile).into_response())
}

async fn setup_admin(
    State(state): State<FeatureState>,
    AppJson(command): AppJson<SetupAdminCommand>,
) -> ApiResult<Response> {
    let response = commands::setup_admin::handle(
        state.users.as_ref(),
        &state.passwords,
        &state.tokens,
        command,
    )
    .await?;
    Ok(ApiResponse::success(response).created())
}

impl From<LoginError> for AppError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::MissingFields => AppError::Validation(err.to_string()),
            LoginError::Auth(e) => e.into(),
        }
    }
}

impl From<RegisterError> for AppError {
    fn from(err: RegisterError) -> Self {
        match err {
            RegisterError::Validation(e) => AppError::Validation(e.to_string()),
            RegisterError::DuplicateEmail => AppError::Conflict(err.to_string()),
            RegisterError::Password(e) => AppError::Internal(e.to_string()),
            RegisterError::Token(e) => AppError::Internal(e.to_string()),
            RegisterError::Store(e) => e.into(),
        }
    }
}

impl From<SetupAdminError> for AppError {
    fn from(err: SetupAdminError) -> Self {
        match err {
            SetupAdminError::AlreadyInitialized => AppError::Forbidden(err.to_string()),
            SetupAdminError::Validation(e) => AppError::Validation(e.to_string()),
            SetupAdminError::Password(e) => AppError::Internal(e.to_string()),
            SetupAdminError::Token(e) => AppError::Internal(e.to_string()),
            SetupAdminError::Store(e) => e.into(),
        }
    }
}

impl From<MeError> for AppError {
    fn from(err: MeError) -> Self {
        match err {
            MeError::NotFound => AppError::IdentityNotFound,
            MeError::Store(e) => e.into(),
        }
    }
}
