//! Audit visibility filter
//!
//! [`AuditPredicate::for_identity`] turns a caller and their requested
//! filters into one predicate value. The in-memory store evaluates it with
//! [`AuditPredicate::matches`]; the PostgreSQL store renders the same value
//! into a `WHERE` clause. Both paths must agree, so the predicate carries no
//! behavior beyond plain data and `matches`.

use auditdesk_common::types::{AuditStatus, AuditType, Department, RiskLevel, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Identity;
use crate::models::Audit;

/// Caller-supplied list filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFilters {
    pub status: Option<AuditStatus>,
    /// Honored for admins only
    pub department: Option<Department>,
    pub audit_type: Option<AuditType>,
    pub risk_level: Option<RiskLevel>,
}

/// Role-derived restriction on which audits are visible
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Every audit
    All,
    /// Audits of one department
    Department(Department),
    /// Audits owned by `owner` or belonging to `department`
    OwnerOrDepartment { owner: Uuid, department: Department },
}

/// Conjunction of the role scope, `is_active`, and the caller's filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditPredicate {
    pub scope: Scope,
    pub status: Option<AuditStatus>,
    pub department: Option<Department>,
    pub audit_type: Option<AuditType>,
    pub risk_level: Option<RiskLevel>,
}

impl AuditPredicate {
    /// Build the predicate for `identity`
    ///
    /// A non-admin's department filter is dropped: only the role scope
    /// decides which departments they see.
    pub fn for_identity(identity: &Identity, filters: AuditFilters) -> Self {
        let scope = match identity.role {
            Role::Admin => Scope::All,
            Role::Manager => Scope::Department(identity.department.clone()),
            Role::Auditor => Scope::OwnerOrDepartment {
                owner: identity.id,
                department: identity.department.clone(),
            },
        };

        let department = match identity.role {
            Role::Admin => filters.department,
            Role::Manager | Role::Auditor => {
                if filters.department.is_some() {
                    tracing::debug!(
                        user_id = %identity.id,
                        "Ignoring department filter from non-admin caller"
                    );
                }
                None
            },
        };

        Self {
            scope,
            status: filters.status,
            department,
            audit_type: filters.audit_type,
            risk_level: filters.risk_level,
        }
    }

    pub fn matches(&self, audit: &Audit) -> bool {
        if !audit.is_active {
            return false;
        }

        let in_scope = match &self.scope {
            Scope::All => true,
            Scope::Department(department) => &audit.department == department,
            Scope::OwnerOrDepartment { owner, department } => {
                &audit.auditor == owner || &audit.department == department
            },
        };

        in_scope
            && self.status.map_or(true, |s| audit.status == s)
            && self.department.as_ref().map_or(true, |d| &audit.department == d)
            && self.audit_type.map_or(true, |t| audit.audit_type == t)
            && self.risk_level.map_or(true, |r| audit.risk_level == r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::audit::fixtures::audit;

    fn identity(role: Role, department: &str) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            role,
            department: Department::from(department),
        }
    }

    #[test]
    fn test_admin_sees_every_active_audit() {
        let admin = identity(Role::Admin, "IT Administration");
        let predicate = AuditPredicate::for_identity(&admin, AuditFilters::default());
        assert_eq!(predicate.scope, Scope::All);

        assert!(predicate.matches(&audit("Finance", Uuid::new_v4())));
        assert!(predicate.matches(&audit("Engineering", Uuid::new_v4())));

        let mut deleted = audit("Finance", Uuid::new_v4());
        deleted.is_active = false;
        assert!(!predicate.matches(&deleted));
    }

    #[test]
    fn test_manager_sees_own_department_only() {
        let manager = identity(Role::Manager, "Engineering");
        let predicate = AuditPredicate::for_identity(&manager, AuditFilters::default());

        assert!(predicate.matches(&audit("Engineering", Uuid::new_v4())));
        // even audits they own elsewhere
        assert!(!predicate.matches(&audit("Finance", manager.id)));
    }

    #[test]
    fn test_auditor_sees_owned_or_department() {
        let auditor = identity(Role::Auditor, "Operations");
        let predicate = AuditPredicate::for_identity(&auditor, AuditFilters::default());

        assert!(predicate.matches(&audit("Operations", Uuid::new_v4())));
        assert!(predicate.matches(&audit("Finance", auditor.id)));
        assert!(!predicate.matches(&audit("Finance", Uuid::new_v4())));
    }

    #[test]
    fn test_department_filter_only_for_admin() {
        let filters = AuditFilters {
            department: Some(Department::from("Finance")),
            ..Default::default()
        };

        let admin = identity(Role::Admin, "IT Administration");
        let admin_predicate = AuditPredicate::for_identity(&admin, filters.clone());
        assert!(admin_predicate.matches(&audit("Finance", Uuid::new_v4())));
        assert!(!admin_predicate.matches(&audit("Engineering", Uuid::new_v4())));

        let manager = identity(Role::Manager, "Engineering");
        let manager_predicate = AuditPredicate::for_identity(&manager, filters);
        assert_eq!(manager_predicate.department, None);
        assert!(manager_predicate.matches(&audit("Engineering", Uuid::new_v4())));
        assert!(!manager_predicate.matches(&audit("Finance", Uuid::new_v4())));
    }

    #[test]
    fn test_filters_compose_with_and() {
        let admin = identity(Role::Admin, "IT Administration");
        let predicate = AuditPredicate::for_identity(
            &admin,
            AuditFilters {
                status: Some(AuditStatus::Active),
                risk_level: Some(RiskLevel::High),
                ..Default::default()
            },
        );

        let mut record = audit("Finance", Uuid::new_v4());
        record.status = AuditStatus::Active;
        assert!(!predicate.matches(&record));

        record.risk_level = RiskLevel::High;
        assert!(predicate.matches(&record));

        record.status = AuditStatus::Draft;
        assert!(!predicate.matches(&record));
    }
}
