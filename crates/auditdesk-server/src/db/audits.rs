//! Audit persistence
//!
//! The store executes queries; it makes no access decisions. Callers pass
//! in the visibility predicate built by [`crate::policy::visibility`].

use async_trait::async_trait;
use auditdesk_common::types::{AuditStatus, RiskLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use std::cmp::Ordering;
use uuid::Uuid;

use super::{DbError, DbResult};
use crate::models::{Audit, AuditItem};
use crate::policy::{AuditPredicate, Scope};

/// Sortable audit columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    #[serde(alias = "createdAt")]
    CreatedAt,
    #[serde(alias = "updatedAt")]
    UpdatedAt,
    Title,
    #[serde(alias = "startDate")]
    StartDate,
    Status,
    Department,
    #[serde(alias = "riskLevel")]
    RiskLevel,
    #[serde(alias = "overallScore")]
    OverallScore,
}

impl SortField {
    /// SQL ordering expression; enum columns sort by declaration order
    fn sql_expression(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Title => "title",
            SortField::StartDate => "start_date",
            SortField::Status => {
                "CASE status WHEN 'draft' THEN 0 WHEN 'active' THEN 1 \
                 WHEN 'completed' THEN 2 ELSE 3 END"
            },
            SortField::Department => "department",
            SortField::RiskLevel => {
                "CASE risk_level WHEN 'low' THEN 0 WHEN 'medium' THEN 1 \
                 WHEN 'high' THEN 2 ELSE 3 END"
            },
            SortField::OverallScore => "overall_score",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Ordering of a list query; ties break on id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuditSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl AuditSort {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    /// `ORDER BY` body; a missing score sorts lowest in either direction
    fn sql(&self) -> String {
        let direction = match self.order {
            SortOrder::Asc => "ASC NULLS FIRST",
            SortOrder::Desc => "DESC NULLS LAST",
        };
        format!("{} {}, id ASC", self.field.sql_expression(), direction)
    }

    /// In-memory comparator matching [`AuditSort::sql`]
    pub fn compare(&self, a: &Audit, b: &Audit) -> Ordering {
        let primary = match self.field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::Title => a.title.cmp(&b.title),
            SortField::StartDate => a.start_date.cmp(&b.start_date),
            SortField::Status => ordinal(AuditStatus::ALL, &a.status)
                .cmp(&ordinal(AuditStatus::ALL, &b.status)),
            SortField::Department => a.department.cmp(&b.department),
            SortField::RiskLevel => ordinal(RiskLevel::ALL, &a.risk_level)
                .cmp(&ordinal(RiskLevel::ALL, &b.risk_level)),
            SortField::OverallScore => a.overall_score.cmp(&b.overall_score),
        };
        let primary = match self.order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

fn ordinal<T: PartialEq>(all: &[T], value: &T) -> usize {
    all.iter().position(|v| v == value).unwrap_or(all.len())
}

/// Persistence operations on audits
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Page of audits matching `predicate`
    async fn find(
        &self,
        predicate: &AuditPredicate,
        sort: AuditSort,
        skip: i64,
        limit: i64,
    ) -> DbResult<Vec<Audit>>;

    async fn count(&self, predicate: &AuditPredicate) -> DbResult<i64>;

    /// Look up by id, including soft-deleted records
    async fn find_one(&self, id: Uuid) -> DbResult<Option<Audit>>;

    async fn insert(&self, audit: &Audit) -> DbResult<()>;

    /// Overwrite an active audit as a whole; `false` if no active row matched
    async fn replace(&self, audit: &Audit) -> DbResult<bool>;

    /// Mark an audit inactive; `false` if it was already gone
    async fn soft_delete(&self, id: Uuid, now: DateTime<Utc>) -> DbResult<bool>;

    /// Datastore reachability
    async fn ping(&self) -> DbResult<()>;
}

const AUDIT_COLUMNS: &str = "id, title, description, audit_type, department, auditor, manager, \
     status, start_date, end_date, items, overall_score, risk_level, is_active, completed_date, \
     created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    title: String,
    description: String,
    audit_type: String,
    department: String,
    auditor: Uuid,
    manager: Option<Uuid>,
    status: String,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    items: Json<Vec<AuditItem>>,
    overall_score: Option<i32>,
    risk_level: String,
    is_active: bool,
    completed_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AuditRow> for Audit {
    type Error = DbError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        Ok(Audit {
            id: row.id,
            title: row.title,
            description: row.description,
            audit_type: row.audit_type.parse().map_err(DbError::corrupt)?,
            department: row.department.as_str().into(),
            auditor: row.auditor,
            manager: row.manager,
            status: row.status.parse().map_err(DbError::corrupt)?,
            start_date: row.start_date,
            end_date: row.end_date,
            items: row.items.0,
            overall_score: row.overall_score,
            risk_level: row.risk_level.parse().map_err(DbError::corrupt)?,
            is_active: row.is_active,
            completed_date: row.completed_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Append the `WHERE` clause for `predicate`
fn push_predicate(qb: &mut QueryBuilder<'_, Postgres>, predicate: &AuditPredicate) {
    qb.push(" WHERE is_active = TRUE");

    match &predicate.scope {
        Scope::All => {},
        Scope::Department(department) => {
            qb.push(" AND department = ")
                .push_bind(department.as_str().to_string());
        },
        Scope::OwnerOrDepartment { owner, department } => {
            qb.push(" AND (auditor = ")
                .push_bind(*owner)
                .push(" OR department = ")
                .push_bind(department.as_str().to_string())
                .push(")");
        },
    }

    if let Some(status) = predicate.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(department) = &predicate.department {
        qb.push(" AND department = ")
            .push_bind(department.as_str().to_string());
    }
    if let Some(audit_type) = predicate.audit_type {
        qb.push(" AND audit_type = ").push_bind(audit_type.as_str());
    }
    if let Some(risk_level) = predicate.risk_level {
        qb.push(" AND risk_level = ").push_bind(risk_level.as_str());
    }
}

/// PostgreSQL-backed [`AuditStore`]
#[derive(Debug, Clone)]
pub struct PgAuditStore {
    pool: PgPool,
}

impl PgAuditStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for PgAuditStore {
    #[tracing::instrument(skip(self, predicate))]
    async fn find(
        &self,
        predicate: &AuditPredicate,
        sort: AuditSort,
        skip: i64,
        limit: i64,
    ) -> DbResult<Vec<Audit>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM audits", AUDIT_COLUMNS));
        push_predicate(&mut qb, predicate);
        qb.push(" ORDER BY ")
            .push(sort.sql())
            .push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(skip);

        let rows = qb.build_query_as::<AuditRow>().fetch_all(&self.pool).await?;
        rows.into_iter().map(Audit::try_from).collect()
    }

    async fn count(&self, predicate: &AuditPredicate) -> DbResult<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM audits");
        push_predicate(&mut qb, predicate);
        let total = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(total)
    }

    async fn find_one(&self, id: Uuid) -> DbResult<Option<Audit>> {
        let sql = format!("SELECT {} FROM audits WHERE id = $1", AUDIT_COLUMNS);
        let row = sqlx::query_as::<_, AuditRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Audit::try_from).transpose()
    }

    #[tracing::instrument(skip(self, audit), fields(audit_id = %audit.id))]
    async fn insert(&self, audit: &Audit) -> DbResult<()> {
        let sql = format!(
            "INSERT INTO audits ({}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
            AUDIT_COLUMNS
        );
        sqlx::query(&sql)
            .bind(audit.id)
            .bind(&audit.title)
            .bind(&audit.description)
            .bind(audit.audit_type.as_str())
            .bind(audit.department.as_str())
            .bind(audit.auditor)
            .bind(audit.manager)
            .bind(audit.status.as_str())
            .bind(audit.start_date)
            .bind(audit.end_date)
            .bind(Json(&audit.items))
            .bind(audit.overall_score)
            .bind(audit.risk_level.as_str())
            .bind(audit.is_active)
            .bind(audit.completed_date)
            .bind(audit.created_at)
            .bind(audit.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if super::is_unique_violation(&e) {
                    DbError::duplicate("Audit", &audit.id.to_string())
                } else {
                    DbError::Sqlx(e)
                }
            })?;
        Ok(())
    }

    #[tracing::instrument(skip(self, audit), fields(audit_id = %audit.id))]
    async fn replace(&self, audit: &Audit) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE audits
            SET title = $2, description = $3, audit_type = $4, department = $5,
                auditor = $6, manager = $7, status = $8, start_date = $9, end_date = $10,
                items = $11, overall_score = $12, risk_level = $13, completed_date = $14,
                updated_at = $15
            WHERE id = $1 AND is_active = TRUE
            "#,
        )
        .bind(audit.id)
        .bind(&audit.title)
        .bind(&audit.description)
        .bind(audit.audit_type.as_str())
        .bind(audit.department.as_str())
        .bind(audit.auditor)
        .bind(audit.manager)
        .bind(audit.status.as_str())
        .bind(audit.start_date)
        .bind(audit.end_date)
        .bind(Json(&audit.items))
        .bind(audit.overall_score)
        .bind(audit.risk_level.as_str())
        .bind(audit.completed_date)
        .bind(audit.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn soft_delete(&self, id: Uuid, now: DateTime<Utc>) -> DbResult<bool> {
        let result = sqlx::query(
            "UPDATE audits SET is_active = FALSE, updated_at = $2 WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> DbResult<()> {
        super::health_check(&self.pool).await
    }
}
