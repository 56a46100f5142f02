//! List audits query
//!
//! The caller's role scope is applied before any filter; see
//! [`AuditPredicate::for_identity`].

use auditdesk_common::types::{AuditStatus, AuditType, Department, RiskLevel};
use serde::{Deserialize, Serialize};

use crate::auth::Identity;
use crate::db::{AuditSort, AuditStore, DbError, SortField, SortOrder};
use crate::features::shared::{Paginated, PaginationParams};
use crate::models::Audit;
use crate::policy::{AuditFilters, AuditPredicate};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListAuditsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(default, alias = "limit", alias = "perPage", skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AuditStatus>,
    /// Ignored unless the caller is an admin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(alias = "auditType", skip_serializing_if = "Option::is_none")]
    pub audit_type: Option<AuditType>,
    #[serde(alias = "riskLevel", skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(alias = "sortBy", skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortField>,
    #[serde(alias = "sortOrder", skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

pub type ListAuditsResponse = Paginated<Audit>;

#[derive(Debug, thiserror::Error)]
pub enum ListAuditsError {
    #[error("{0}")]
    InvalidPagination(&'static str),

    #[error(transparent)]
    Store(#[from] DbError),
}

impl ListAuditsQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.per_page)
    }

    pub fn validate(&self) -> Result<(), ListAuditsError> {
        self.pagination()
            .validate()
            .map_err(ListAuditsError::InvalidPagination)
    }

    pub fn filters(&self) -> AuditFilters {
        AuditFilters {
            status: self.status,
            department: self
                .department
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(Department::from),
            audit_type: self.audit_type,
            risk_level: self.risk_level,
        }
    }

    pub fn sort(&self) -> AuditSort {
        AuditSort::new(
            self.sort_by.unwrap_or_default(),
            self.sort_order.unwrap_or_default(),
        )
    }
}

#[tracing::instrument(skip_all, fields(user_id = %identity.id, role = %identity.role))]
pub async fn handle(
    store: &dyn AuditStore,
    identity: &Identity,
    query: ListAuditsQuery,
) -> Result<ListAuditsResponse, ListAuditsError> {
    query.validate()?;

    let params = query.pagination();
    let predicate = AuditPredicate::for_identity(identity, query.filters());

    let total = store.count(&predicate).await?;
    let audits = store
        .find(&predicate, query.sort(), params.offset(), params.per_page())
        .await?;

    tracing::debug!(total, returned = audits.len(), "Listed audits");
    Ok(Paginated::from_items(audits, &params, total))
}
