//! Response shapes for audits
//!
//! Stored audits reference users by id. Responses replace the auditor,
//! the manager, and each item's assignee with a short account summary
//! looked up through the user store. A reference whose account no longer
//! exists is rendered as its bare id.

use std::collections::HashMap;

use auditdesk_common::types::{
    AuditStatus, AuditType, Department, ItemCategory, ItemStatus, Priority, RiskLevel,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::db::{DbResult, UserStore};
use crate::models::{Audit, AuditItem, User};

/// Embedded account reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<Department>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditItemView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: ItemCategory,
    pub priority: Priority,
    pub status: ItemStatus,
    pub assigned_to: Option<UserSummary>,
    pub findings: String,
    pub recommendations: String,
    pub evidence: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub audit_type: AuditType,
    pub department: Department,
    pub auditor: UserSummary,
    pub manager: Option<UserSummary>,
    pub status: AuditStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub items: Vec<AuditItemView>,
    pub overall_score: Option<i32>,
    pub risk_level: RiskLevel,
    pub is_active: bool,
    pub completed_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Accounts referenced by a batch of audits, keyed by id
struct UserDirectory(HashMap<Uuid, User>);

impl UserDirectory {
    async fn load(users: &dyn UserStore, audits: &[Audit]) -> DbResult<Self> {
        let mut ids: Vec<Uuid> = audits.iter().flat_map(referenced_users).collect();
        ids.sort_unstable();
        ids.dedup();

        let found = users.find_by_ids(&ids).await?;
        Ok(Self(found.into_iter().map(|u| (u.id, u)).collect()))
    }

    fn summary(&self, id: Uuid) -> UserSummary {
        match self.0.get(&id) {
            Some(user) => UserSummary {
                id,
                name: Some(user.name.clone()),
                email: Some(user.email.clone()),
                department: Some(user.department.clone()),
            },
            None => UserSummary {
                id,
                name: None,
                email: None,
                department: None,
            },
        }
    }

    fn item(&self, item: AuditItem) -> AuditItemView {
        AuditItemView {
            id: item.id,
            title: item.title,
            description: item.description,
            category: item.category,
            priority: item.priority,
            status: item.status,
            assigned_to: item.assigned_to.map(|id| self.summary(id)),
            findings: item.findings,
            recommendations: item.recommendations,
            evidence: item.evidence,
            due_date: item.due_date,
            completed_date: item.completed_date,
            created_by: item.created_by,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }

    fn audit(&self, audit: Audit) -> AuditView {
        AuditView {
            id: audit.id,
            title: audit.title,
            description: audit.description,
            audit_type: audit.audit_type,
            department: audit.department,
            auditor: self.summary(audit.auditor),
            manager: audit.manager.map(|id| self.summary(id)),
            status: audit.status,
            start_date: audit.start_date,
            end_date: audit.end_date,
            items: audit.items.into_iter().map(|i| self.item(i)).collect(),
            overall_score: audit.overall_score,
            risk_level: audit.risk_level,
            is_active: audit.is_active,
            completed_date: audit.completed_date,
            created_at: audit.created_at,
            updated_at: audit.updated_at,
        }
    }
}

fn referenced_users(audit: &Audit) -> impl Iterator<Item = Uuid> + '_ {
    std::iter::once(audit.auditor)
        .chain(audit.manager)
        .chain(audit.items.iter().filter_map(|i| i.assigned_to))
}

/// Render one audit with its user references filled in
pub async fn resolve(users: &dyn UserStore, audit: Audit) -> DbResult<AuditView> {
    let directory = UserDirectory::load(users, std::slice::from_ref(&audit)).await?;
    Ok(directory.audit(audit))
}

/// Render a page of audits with a single user lookup
pub async fn resolve_all(users: &dyn UserStore, audits: Vec<Audit>) -> DbResult<Vec<AuditView>> {
    let directory = UserDirectory::load(users, &audits).await?;
    Ok(audits.into_iter().map(|a| directory.audit(a)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryUserStore;
    use crate::models::audit::fixtures::{audit, item};
    use auditdesk_common::types::Role;

    async fn store_with(users: &[&User]) -> MemoryUserStore {
        let store = MemoryUserStore::new();
        for user in users {
            store.insert(user).await.unwrap();
        }
        store
    }

    fn user(email: &str, name: &str, department: &str) -> User {
        User::new(email, name, "h".into(), Role::Auditor, department.into(), Utc::now())
    }

    #[tokio::test]
    async fn test_references_are_expanded() {
        let auditor = user("aud@example.com", "Ada", "Finance");
        let manager = user("mgr@example.com", "Max", "Operations");
        let store = store_with(&[&auditor, &manager]).await;

        let mut record = audit("Finance", auditor.id);
        record.manager = Some(manager.id);
        let mut assigned = item("check ledger", ItemStatus::Pending, auditor.id);
        assigned.assigned_to = Some(manager.id);
        record.items = vec![assigned, item("spare", ItemStatus::Pending, auditor.id)];

        let view = resolve(&store, record).await.unwrap();
        assert_eq!(view.auditor.name.as_deref(), Some("Ada"));
        assert_eq!(view.auditor.department, Some(Department::from("Finance")));
        assert_eq!(view.manager.as_ref().unwrap().email.as_deref(), Some("mgr@example.com"));
        assert_eq!(view.items[0].assigned_to.as_ref().unwrap().id, manager.id);
        assert!(view.items[1].assigned_to.is_none());
    }

    #[tokio::test]
    async fn test_missing_account_renders_bare_id() {
        let store = MemoryUserStore::new();
        let ghost = Uuid::new_v4();

        let view = resolve(&store, audit("Finance", ghost)).await.unwrap();
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["auditor"], serde_json::json!({ "id": ghost.to_string() }));
        assert!(value["manager"].is_null());
        assert!(value.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_resolve_all_keeps_order() {
        let first = user("one@example.com", "One", "Finance");
        let second = user("two@example.com", "Two", "Finance");
        let store = store_with(&[&first, &second]).await;

        let audits = vec![audit("Finance", second.id), audit("Finance", first.id)];
        let ids: Vec<Uuid> = audits.iter().map(|a| a.id).collect();

        let views = resolve_all(&store, audits).await.unwrap();
        assert_eq!(views.iter().map(|v| v.id).collect::<Vec<_>>(), ids);
        assert_eq!(views[0].auditor.name.as_deref(), Some("Two"));
        assert_eq!(views[1].auditor.name.as_deref(), Some("One"));
    }
}
