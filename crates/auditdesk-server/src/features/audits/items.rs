//! Checklist item payloads
//!
//! Clients send items without server-owned fields; any `id`, `created_by`,
//! `completed_date`, or timestamps they include are ignored.

use auditdesk_common::types::{ItemCategory, ItemStatus, Priority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::shared::{optional_text, required_text, ValidationError};
use crate::models::{
    AuditItem, MAX_DESCRIPTION_LEN, MAX_EVIDENCE_LEN, MAX_NOTES_LEN, MAX_TITLE_LEN,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: ItemCategory,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub status: Option<ItemStatus>,
    #[serde(default)]
    pub assigned_to: Option<Uuid>,
    #[serde(default)]
    pub findings: String,
    #[serde(default)]
    pub recommendations: String,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl ItemInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required_text(&self.title, "item title", MAX_TITLE_LEN)?;
        optional_text(&self.description, "item description", MAX_DESCRIPTION_LEN)?;
        optional_text(&self.findings, "findings", MAX_NOTES_LEN)?;
        optional_text(&self.recommendations, "recommendations", MAX_NOTES_LEN)?;
        for entry in &self.evidence {
            optional_text(entry, "evidence", MAX_EVIDENCE_LEN)?;
        }
        Ok(())
    }

    /// Trimmed item with provisional server fields
    ///
    /// Identity, creator, and dates are settled by
    /// [`crate::policy::derive_fields`] before the item is stored.
    pub fn into_item(self, actor: Uuid, now: DateTime<Utc>) -> AuditItem {
        AuditItem {
            id: Uuid::new_v4(),
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category,
            priority: self.priority.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            assigned_to: self.assigned_to,
            findings: self.findings.trim().to_string(),
            recommendations: self.recommendations.trim().to_string(),
            evidence: self.evidence.iter().map(|e| e.trim().to_string()).collect(),
            due_date: self.due_date,
            completed_date: None,
            created_by: actor,
            created_at: now,
            updated_at: now,
        }
    }
}

pub fn validate_items(items: &[ItemInput]) -> Result<(), ValidationError> {
    items.iter().try_for_each(ItemInput::validate)
}
