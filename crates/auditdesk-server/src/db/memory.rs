//! Process-local stores
//!
//! Used by the test suite and by `AUDITDESK_STORAGE=memory`. They evaluate
//! the same [`AuditPredicate`] and [`AuditSort`] values as the PostgreSQL
//! stores, so list results agree between backends.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AuditSort, AuditStore, DbError, DbResult, UserStore};
use crate::models::{Audit, User};
use crate::policy::AuditPredicate;

#[derive(Debug, Default)]
pub struct MemoryAuditStore {
    audits: RwLock<HashMap<Uuid, Audit>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn find(
        &self,
        predicate: &AuditPredicate,
        sort: AuditSort,
        skip: i64,
        limit: i64,
    ) -> DbResult<Vec<Audit>> {
        let audits = self.audits.read().await;
        let mut matching: Vec<&Audit> = audits.values().filter(|a| predicate.matches(a)).collect();
        matching.sort_by(|a, b| sort.compare(a, b));

        let skip = usize::try_from(skip).unwrap_or(0);
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(matching.into_iter().skip(skip).take(limit).cloned().collect())
    }

    async fn count(&self, predicate: &AuditPredicate) -> DbResult<i64> {
        let audits = self.audits.read().await;
        let total = audits.values().filter(|a| predicate.matches(a)).count();
        Ok(total as i64)
    }

    async fn find_one(&self, id: Uuid) -> DbResult<Option<Audit>> {
        Ok(self.audits.read().await.get(&id).cloned())
    }

    async fn insert(&self, audit: &Audit) -> DbResult<()> {
        let mut audits = self.audits.write().await;
        if audits.contains_key(&audit.id) {
            return Err(DbError::duplicate("Audit", &audit.id.to_string()));
        }
        audits.insert(audit.id, audit.clone());
        Ok(())
    }

    async fn replace(&self, audit: &Audit) -> DbResult<bool> {
        let mut audits = self.audits.write().await;
        match audits.get_mut(&audit.id) {
            Some(existing) if existing.is_active => {
                let mut next = audit.clone();
                next.is_active = true;
                next.created_at = existing.created_at;
                *existing = next;
                Ok(true)
            },
            _ => Ok(false),
        }
    }

    async fn soft_delete(&self, id: Uuid, now: DateTime<Utc>) -> DbResult<bool> {
        let mut audits = self.audits.write().await;
        match audits.get_mut(&id) {
            Some(existing) if existing.is_active => {
                existing.is_active = false;
                existing.updated_at = now;
                Ok(true)
            },
            _ => Ok(false),
        }
    }

    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> DbResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let email = email.trim().to_lowercase();
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn list_active(&self) -> DbResult<Vec<User>> {
        let users = self.users.read().await;
        let mut active: Vec<User> = users.values().filter(|u| u.is_active).cloned().collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(active)
    }

    async fn insert(&self, user: &User) -> DbResult<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(DbError::duplicate("User", &user.email));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn count(&self) -> DbResult<i64> {
        Ok(self.users.read().await.len() as i64)
    }
}
