//! Update audit command
//!
//! Absent fields keep their stored value. A present `items` list replaces
//! the whole collection; items are matched to stored ones by position.
//! Concurrent updates are last-write-wins for the entire record.

use auditdesk_common::types::{AuditStatus, AuditType, DepartmentSet, RiskLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Identity;
use crate::db::{AuditStore, DbError};
use crate::features::audits::items::{validate_items, ItemInput};
use crate::features::shared::{required_text, resolve_department, ValidationError};
use crate::models::{Audit, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN};
use crate::policy::{self, AuditAction, PolicyError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAuditCommand {
    /// Taken from the path
    #[serde(skip)]
    pub id: Uuid,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub audit_type: Option<AuditType>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub manager: Option<Uuid>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<AuditStatus>,
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
    #[serde(default)]
    pub items: Option<Vec<ItemInput>>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateAuditError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Audit not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Store(#[from] DbError),
}

impl UpdateAuditCommand {
    pub fn validate(&self, departments: &DepartmentSet) -> Result<(), UpdateAuditError> {
        if let Some(title) = &self.title {
            required_text(title, "title", MAX_TITLE_LEN)?;
        }
        if let Some(description) = &self.description {
            required_text(description, "description", MAX_DESCRIPTION_LEN)?;
        }
        if let Some(department) = &self.department {
            resolve_department(departments, department)?;
        }
        if let Some(items) = &self.items {
            validate_items(items)?;
        }
        Ok(())
    }

    /// Overlay the submitted fields onto `existing`
    fn apply_to(self, existing: &Audit, actor: &Identity, now: DateTime<Utc>) -> Audit {
        let mut audit = existing.clone();
        if let Some(title) = self.title {
            audit.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            audit.description = description.trim().to_string();
        }
        if let Some(audit_type) = self.audit_type {
            audit.audit_type = audit_type;
        }
        if let Some(department) = self.department {
            audit.department = department.as_str().into();
        }
        if self.manager.is_some() {
            audit.manager = self.manager;
        }
        if let Some(start_date) = self.start_date {
            audit.start_date = start_date;
        }
        if self.end_date.is_some() {
            audit.end_date = self.end_date;
        }
        if let Some(status) = self.status {
            audit.status = status;
        }
        if let Some(risk_level) = self.risk_level {
            audit.risk_level = risk_level;
        }
        if let Some(items) = self.items {
            audit.items = items
                .into_iter()
                .map(|item| item.into_item(actor.id, now))
                .collect();
        }
        audit
    }
}

#[tracing::instrument(
    skip_all,
    fields(audit_id = %command.id, user_id = %identity.id, role = %identity.role)
)]
pub async fn handle(
    store: &dyn AuditStore,
    departments: &DepartmentSet,
    identity: &Identity,
    command: UpdateAuditCommand,
) -> Result<Audit, UpdateAuditError> {
    command.validate(departments)?;

    let id = command.id;
    let existing = store
        .find_one(id)
        .await?
        .filter(|audit| audit.is_active)
        .ok_or(UpdateAuditError::NotFound(id))?;

    policy::authorize(identity, AuditAction::Update, &existing)?;

    let now = Utc::now();
    let incoming = command.apply_to(&existing, identity, now);
    policy::check_department_change(identity, &existing.department, &incoming.department)?;

    let audit = policy::derive_fields(Some(&existing), incoming, identity, now);
    if !store.replace(&audit).await? {
        // deleted between the read and the write
        return Err(UpdateAuditError::NotFound(id));
    }

    tracing::info!(score = ?audit.overall_score, status = %audit.status, "Audit updated");
    Ok(audit)
}
