use auditdesk_common::types::{
    AuditStatus, AuditType, Department, ItemCategory, ItemStatus, Priority, RiskLevel,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An audit record with its embedded checklist
///
/// `overall_score`, `completed_date`, `auditor`, and the timestamps are
/// owned by the mutation gate ([`crate::policy::mutation`]); clients never
/// set them directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audit {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub audit_type: AuditType,
    pub department: Department,
    /// Owning user; always the creator
    pub auditor: Uuid,
    pub manager: Option<Uuid>,
    pub status: AuditStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub items: Vec<AuditItem>,
    /// Percentage of completed items, 0-100; absent when there are no items
    pub overall_score: Option<i32>,
    pub risk_level: RiskLevel,
    /// False once soft-deleted
    pub is_active: bool,
    pub completed_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One checklist entry, owned by its parent audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: ItemCategory,
    pub priority: Priority,
    pub status: ItemStatus,
    pub assigned_to: Option<Uuid>,
    #[serde(default)]
    pub findings: String,
    #[serde(default)]
    pub recommendations: String,
    #[serde(default)]
    pub evidence: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    /// Fixed at creation and never overwritten
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Audit {
    pub fn completed_items(&self) -> usize {
        self.items.iter().filter(|i| i.status.is_completed()).count()
    }
}

impl AuditItem {
    /// True when the client-editable fields of both items are equal
    pub fn same_content(&self, other: &AuditItem) -> bool {
        self.title == other.title
            && self.description == other.description
            && self.category == other.category
            && self.priority == other.priority
            && self.status == other.status
            && self.assigned_to == other.assigned_to
            && self.findings == other.findings
            && self.recommendations == other.recommendations
            && self.evidence == other.evidence
            && self.due_date == other.due_date
    }
}
