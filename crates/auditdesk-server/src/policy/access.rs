//! Audit access checker
//!
//! Decides whether a caller may act on one audit that has already been
//! located. Callers must resolve existence (and soft deletion) first, so a
//! missing audit is reported as not found before any access decision.

use auditdesk_common::types::Role;

use super::PolicyError;
use crate::auth::Identity;
use crate::models::Audit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Read,
    Update,
    Delete,
}

/// Read/update rule
pub fn can_access(identity: &Identity, audit: &Audit) -> bool {
    match identity.role {
        Role::Admin => true,
        Role::Manager => identity.department == audit.department,
        Role::Auditor => audit.auditor == identity.id || identity.department == audit.department,
    }
}

/// Delete rule: admins and the owning auditor only
pub fn can_delete(identity: &Identity, audit: &Audit) -> bool {
    identity.is_admin() || audit.auditor == identity.id
}

pub fn authorize(identity: &Identity, action: AuditAction, audit: &Audit) -> Result<(), PolicyError> {
    let allowed = match action {
        AuditAction::Read | AuditAction::Update => can_access(identity, audit),
        AuditAction::Delete => can_delete(identity, audit),
    };

    if allowed {
        return Ok(());
    }

    tracing::warn!(
        user_id = %identity.id,
        role = %identity.role,
        audit_id = %audit.id,
        ?action,
        "Audit access denied"
    );

    let message = match action {
        AuditAction::Read | AuditAction::Update => "Access denied",
        AuditAction::Delete => "Only the audit's auditor or an admin can delete audits",
    };
    Err(PolicyError::AccessDenied(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::audit::fixtures::audit;
    use crate::policy::visibility::{AuditFilters, AuditPredicate};
    use auditdesk_common::types::Department;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn identity(role: Role, department: &str) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            role,
            department: Department::from(department),
        }
    }

    #[test]
    fn test_same_department_manager_cannot_delete() {
        let owner = identity(Role::Auditor, "Engineering");
        let manager = identity(Role::Manager, "Engineering");
        let record = audit("Engineering", owner.id);

        assert!(authorize(&manager, AuditAction::Read, &record).is_ok());
        assert!(authorize(&manager, AuditAction::Update, &record).is_ok());
        assert!(matches!(
            authorize(&manager, AuditAction::Delete, &record),
            Err(PolicyError::AccessDenied(_))
        ));
    }

    #[test]
    fn test_department_peer_auditor_can_edit_but_not_delete() {
        let a = identity(Role::Auditor, "Quality Assurance");
        let b = identity(Role::Auditor, "Quality Assurance");
        let record = audit("Quality Assurance", a.id);

        assert!(authorize(&b, AuditAction::Read, &record).is_ok());
        assert!(authorize(&b, AuditAction::Update, &record).is_ok());
        assert!(authorize(&b, AuditAction::Delete, &record).is_err());
        assert!(authorize(&a, AuditAction::Delete, &record).is_ok());
    }

    #[test]
    fn test_admin_allowed_everything() {
        let admin = identity(Role::Admin, "IT Administration");
        let record = audit("Finance", Uuid::new_v4());
        for action in [AuditAction::Read, AuditAction::Update, AuditAction::Delete] {
            assert!(authorize(&admin, action, &record).is_ok());
        }
    }

    #[test]
    fn test_manager_owning_audit_elsewhere() {
        let manager = identity(Role::Manager, "Finance");
        let record = audit("Engineering", manager.id);
        // no ownership clause for managers on read
        assert!(!can_access(&manager, &record));
        // but owners may always delete
        assert!(can_delete(&manager, &record));
    }

    fn role_strategy() -> impl Strategy<Value = Role> {
        prop_oneof![Just(Role::Admin), Just(Role::Manager), Just(Role::Auditor)]
    }

    fn department_strategy() -> impl Strategy<Value = &'static str> {
        prop_oneof![Just("Finance"), Just("Engineering"), Just("Operations")]
    }

    proptest! {
        #[test]
        fn prop_visibility_agrees_with_access(
            role in role_strategy(),
            caller_dept in department_strategy(),
            audit_dept in department_strategy(),
            owned in any::<bool>(),
        ) {
            let caller = identity(role, caller_dept);
            let owner = if owned { caller.id } else { Uuid::new_v4() };
            let record = audit(audit_dept, owner);

            let predicate = AuditPredicate::for_identity(&caller, AuditFilters::default());
            prop_assert_eq!(predicate.matches(&record), can_access(&caller, &record));
        }
    }
}
