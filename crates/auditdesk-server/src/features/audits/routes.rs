//! Audit API routes
//!
//! - `GET /api/v1/audits` - List visible audits with filters, sorting, and pagination
//! - `POST /api/v1/audits` - Create an audit owned by the caller
//! - `GET /api/v1/audits/:id` - Get one audit
//! - `PUT /api/v1/audits/:id` - Update an audit
//! - `DELETE /api/v1/audits/:id` - Soft-delete an audit
//!
//! Every route requires a bearer token.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;
use uuid::Uuid;

use super::{
    commands::{
        self, CreateAuditCommand, CreateAuditError, DeleteAuditCommand, DeleteAuditError,
        UpdateAuditCommand, UpdateAuditError,
    },
    queries::{self, GetAuditError, GetAuditQuery, ListAuditsError, ListAuditsQuery},
    view,
};
use crate::api::response::ApiResponse;
use crate::auth::CurrentIdentity;
use crate::error::{ApiResult, AppError};
use crate::features::shared::{AppJson, AppPath, AppQuery};
use crate::features::FeatureState;

pub fn audits_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_audits).post(create_audit))
        .route("/:id", get(get_audit).put(update_audit).delete(delete_audit))
}

async fn list_audits(
    State(state): State<FeatureState>,
    CurrentIdentity(identity): CurrentIdentity,
    AppQuery(query): AppQuery<ListAuditsQuery>,
) -> ApiResult<Response> {
    let page = queries::list::handle(state.audits.as_ref(), &identity, query).await?;
    let items = view::resolve_all(state.users.as_ref(), page.items).await?;
    let meta = json!({ "pagination": page.pagination });
    Ok(ApiResponse::success_with_meta(items, meta).into_response())
}

/// `201 Created` with the stored audit, user references expanded
async fn create_audit(
    State(state): State<FeatureState>,
    CurrentIdentity(identity): CurrentIdentity,
    AppJson(command): AppJson<CreateAuditCommand>,
) -> ApiResult<Response> {
    let audit = commands::create::handle(
        state.audits.as_ref(),
        &state.departments,
        &identity,
        command,
    )
    .await?;
    let audit = view::resolve(state.users.as_ref(), audit).await?;
    Ok(ApiResponse::success(audit).created())
}

async fn get_audit(
    State(state): State<FeatureState>,
    CurrentIdentity(identity): CurrentIdentity,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Response> {
    let audit =
        queries::get::handle(state.audits.as_ref(), &identity, GetAuditQuery { id }).await?;
    let audit = view::resolve(state.users.as_ref(), audit).await?;
    Ok(ApiResponse::success(audit).into_response())
}

async fn update_audit(
    State(state): State<FeatureState>,
    CurrentIdentity(identity): CurrentIdentity,
    AppPath(id): AppPath<Uuid>,
    AppJson(mut command): AppJson<UpdateAuditCommand>,
) -> ApiResult<Response> {
    command.id = id;
    let audit = commands::update::handle(
        state.audits.as_ref(),
        &state.departments,
        &identity,
        command,
    )
    .await?;
    let audit = view::resolve(state.users.as_ref(), audit).await?;
    Ok(ApiResponse::success(audit).into_response())
}

async fn delete_audit(
    State(state): State<FeatureState>,
    CurrentIdentity(identity): CurrentIdentity,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Response> {
    let response =
        commands::delete::handle(state.audits.as_ref(), &identity, DeleteAuditCommand { id })
            .await?;
    Ok(ApiResponse::success(response).into_response())
}

// ============================================================================
// Error Mapping
// ============================================================================

impl From<CreateAuditError> for AppError {
    fn from(err: CreateAuditError) -> Self {
        match err {
            CreateAuditError::Validation(e) => AppError::Validation(e.to_string()),
            CreateAuditError::Policy(e) => e.into(),
            CreateAuditError::Store(e) => e.into(),
        }
    }
}

impl From<UpdateAuditError> for AppError {
    fn from(err: UpdateAuditError) -> Self {
        match err {
            UpdateAuditError::Validation(e) => AppError::Validation(e.to_string()),
            UpdateAuditError::NotFound(_) => AppError::NotFound(err.to_string()),
            UpdateAuditError::Policy(e) => e.into(),
            UpdateAuditError::Store(e) => e.into(),
        }
    }
}

impl From<DeleteAuditError> for AppError {
    fn from(err: DeleteAuditError) -> Self {
        match err {
            DeleteAuditError::NotFound(_) => AppError::NotFound(err.to_string()),
            DeleteAuditError::Policy(e) => e.into(),
            DeleteAuditError::Store(e) => e.into(),
        }
    }
}

impl From<GetAuditError> for AppError {
    fn from(err: GetAuditError) -> Self {
        match err {
            GetAuditError::NotFound(_) => AppError::NotFound(err.to_string()),
            GetAuditError::Policy(e) => e.into(),
            GetAuditError::Store(e) => e.into(),
        }
    }
}

impl From<ListAuditsError> for AppError {
    fn from(err: ListAuditsError) -> Self {
        match err {
            ListAuditsError::InvalidPagination(message) => AppError::Validation(message.to_string()),
            ListAuditsError::Store(e) => e.into(),
        }
    }
}
