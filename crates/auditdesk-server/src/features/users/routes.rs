//! User administration routes
//!
//! - `GET /api/v1/admin/users` - List active users
//! - `POST /api/v1/admin/users` - Create a user with any role

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use super::{
    commands::{self, CreateUserCommand, CreateUserError},
    queries::{self, ListUsersError, ListUsersQuery},
};
use crate::api::response::ApiResponse;
use crate::auth::CurrentIdentity;
use crate::error::{ApiResult, AppError};
use crate::features::shared::AppJson;
use crate::features::FeatureState;

pub fn users_routes() -> Router<FeatureState> {
    Router::new().route("/", get(list_users).post(create_user))
}

async fn list_users(
    State(state): State<FeatureState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> ApiResult<Response> {
    let users =
        queries::list::handle(state.users.as_ref(), &identity, ListUsersQuery::default()).await?;
    Ok(ApiResponse::success(users).into_response())
}

async fn create_user(
    State(state): State<FeatureState>,
    CurrentIdentity(identity): CurrentIdentity,
    AppJson(command): AppJson<CreateUserCommand>,
) -> ApiResult<Response> {
    let user = commands::create::handle(
        state.users.as_ref(),
        &state.passwords,
        &state.departments,
        &identity,
        command,
    )
    .await?;
    Ok(ApiResponse::success(user).created())
}

impl From<CreateUserError> for AppError {
    fn from(err: CreateUserError) -> Self {
        match err {
            CreateUserError::Validation(e) => AppError::Validation(e.to_string()),
            CreateUserError::Policy(e) => e.into(),
            CreateUserError::DuplicateEmail(_) => AppError::Conflict(err.to_string()),
            CreateUserError::Password(e) => AppError::Internal(e.to_string()),
            CreateUserError::Store(e) => e.into(),
        }
    }
}

impl From<ListUsersError> for AppError {
    fn from(err: ListUsersError) -> Self {
        match err {
            ListUsersError::Policy(e) => e.into(),
            ListUsersError::Store(e) => e.into(),
        }
    }
}
