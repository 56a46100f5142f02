//! Soft-delete audit command

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Identity;
use crate::db::{AuditStore, DbError};
use crate::policy::{self, AuditAction, PolicyError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAuditCommand {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAuditResponse {
    pub id: Uuid,
    pub deleted: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteAuditError {
    #[error("Audit not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Store(#[from] DbError),
}

#[tracing::instrument(skip_all, fields(audit_id = %command.id, user_id = %identity.id))]
pub async fn handle(
    store: &dyn AuditStore,
    identity: &Identity,
    command: DeleteAuditCommand,
) -> Result<DeleteAuditResponse, DeleteAuditError> {
    let existing = store
        .find_one(command.id)
        .await?
        .filter(|audit| audit.is_active)
        .ok_or(DeleteAuditError::NotFound(command.id))?;

    policy::authorize(identity, AuditAction::Delete, &existing)?;

    if !store.soft_delete(command.id, Utc::now()).await? {
        return Err(DeleteAuditError::NotFound(command.id));
    }

    tracing::info!("Audit deleted");
    Ok(DeleteAuditResponse {
        id: command.id,
        deleted: true,
    })
}
