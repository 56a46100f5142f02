//! Create audit command
//!
//! The caller always becomes the audit's `auditor`; a payload naming
//! another auditor, a score, or completion data has those fields dropped.

use auditdesk_common::types::{AuditStatus, AuditType, Department, DepartmentSet, RiskLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Identity;
use crate::db::{AuditStore, DbError};
use crate::features::audits::items::{validate_items, ItemInput};
use crate::features::shared::{required_text, resolve_department, ValidationError};
use crate::models::{Audit, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN};
use crate::policy::{self, PolicyError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditCommand {
    pub title: String,
    pub description: String,
    pub audit_type: AuditType,
    pub department: String,
    #[serde(default)]
    pub manager: Option<Uuid>,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<AuditStatus>,
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
    #[serde(default)]
    pub items: Vec<ItemInput>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateAuditError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Store(#[from] DbError),
}

impl CreateAuditCommand {
    pub fn validate(&self, departments: &DepartmentSet) -> Result<(), CreateAuditError> {
        required_text(&self.title, "title", MAX_TITLE_LEN)?;
        required_text(&self.description, "description", MAX_DESCRIPTION_LEN)?;
        resolve_department(departments, &self.department)?;
        validate_items(&self.items)?;
        Ok(())
    }

    /// The record as submitted, before derived fields are computed
    fn into_draft(self, actor: &Identity, now: DateTime<Utc>) -> Audit {
        Audit {
            id: Uuid::new_v4(),
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            audit_type: self.audit_type,
            department: Department::new(self.department),
            auditor: actor.id,
            manager: self.manager,
            status: self.status.unwrap_or_default(),
            start_date: self.start_date,
            end_date: self.end_date,
            items: self
                .items
                .into_iter()
                .map(|item| item.into_item(actor.id, now))
                .collect(),
            overall_score: None,
            risk_level: self.risk_level.unwrap_or_default(),
            is_active: true,
            completed_date: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[tracing::instrument(
    skip_all,
    fields(user_id = %identity.id, role = %identity.role, department = %command.department)
)]
pub async fn handle(
    store: &dyn AuditStore,
    departments: &DepartmentSet,
    identity: &Identity,
    command: CreateAuditCommand,
) -> Result<Audit, CreateAuditError> {
    command.validate(departments)?;

    let now = Utc::now();
    let draft = command.into_draft(identity, now);
    policy::check_create(identity, &draft.department)?;

    let audit = policy::derive_fields(None, draft, identity, now);
    store.insert(&audit).await?;

    tracing::info!(audit_id = %audit.id, "Audit created");
    Ok(audit)
}
