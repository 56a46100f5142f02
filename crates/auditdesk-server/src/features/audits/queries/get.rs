use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Identity;
use crate::db::{AuditStore, DbError};
use crate::models::Audit;
use crate::policy::{self, AuditAction, PolicyError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetAuditQuery {
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum GetAuditError {
    #[error("Audit not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Store(#[from] DbError),
}

/// Fetch one audit; soft-deleted audits are not found for every caller
#[tracing::instrument(skip_all, fields(audit_id = %query.id, user_id = %identity.id))]
pub async fn handle(
    store: &dyn AuditStore,
    identity: &Identity,
    query: GetAuditQuery,
) -> Result<Audit, GetAuditError> {
    let audit = store
        .find_one(query.id)
        .await?
        .filter(|audit| audit.is_active)
        .ok_or(GetAuditError::NotFound(query.id))?;

    policy::authorize(identity, AuditAction::Read, &audit)?;
    Ok(audit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryAuditStore;
    use crate::models::audit::fixtures::audit;
    use auditdesk_common::types::{Department, Role};
    use chrono::Utc;

    #[tokio::test]
    async fn test_deleted_audit_not_found_even_for_admin() {
        let store = MemoryAuditStore::new();
        let record = audit("Finance", Uuid::new_v4());
        store.insert(&record).await.unwrap();
        store.soft_delete(record.id, Utc::now()).await.unwrap();

        let admin = Identity {
            id: Uuid::new_v4(),
            role: Role::Admin,
            department: Department::from("IT Administration"),
        };
        let result = handle(&store, &admin, GetAuditQuery { id: record.id }).await;
        assert!(matches!(result, Err(GetAuditError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_not_found_precedes_access_denied() {
        let store = MemoryAuditStore::new();
        let stranger = Identity {
            id: Uuid::new_v4(),
            role: Role::Auditor,
            department: Department::from("Finance"),
        };

        let missing = handle(&store, &stranger, GetAuditQuery { id: Uuid::new_v4() }).await;
        assert!(matches!(missing, Err(GetAuditError::NotFound(_))));

        let record = audit("Engineering", Uuid::new_v4());
        store.insert(&record).await.unwrap();
        let denied = handle(&store, &stranger, GetAuditQuery { id: record.id }).await;
        assert!(matches!(denied, Err(GetAuditError::Policy(PolicyError::AccessDenied(_)))));
    }
}
