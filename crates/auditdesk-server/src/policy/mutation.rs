//! Mutation gate
//!
//! Role rules on what a caller may write, and [`derive_fields`], the single
//! place where server-owned fields of an audit are computed. Every create
//! and update passes its candidate record through `derive_fields` right
//! before persisting it.

use auditdesk_common::types::{Department, Role};
use chrono::{DateTime, Utc};

use super::PolicyError;
use crate::auth::Identity;
use crate::models::{Audit, AuditItem};

/// Creation gate: role allow-list, then the department rule
pub fn check_create(identity: &Identity, department: &Department) -> Result<(), PolicyError> {
    let may_create = match identity.role {
        Role::Admin | Role::Manager | Role::Auditor => true,
    };
    if !may_create {
        return Err(PolicyError::Forbidden(
            "Insufficient permissions to create audits".to_string(),
        ));
    }

    if !identity.is_admin() && department != &identity.department {
        tracing::warn!(
            user_id = %identity.id,
            caller_department = %identity.department,
            requested_department = %department,
            "Rejected audit creation outside caller's department"
        );
        return Err(PolicyError::Forbidden(
            "You can only create audits in your own department".to_string(),
        ));
    }

    Ok(())
}

/// Department reassignment on update
///
/// Keeping the current department is always allowed. Otherwise a
/// non-admin may only move the audit into their own department.
pub fn check_department_change(
    identity: &Identity,
    current: &Department,
    requested: &Department,
) -> Result<(), PolicyError> {
    if requested == current || identity.is_admin() || requested == &identity.department {
        return Ok(());
    }

    tracing::warn!(
        user_id = %identity.id,
        from = %current,
        to = %requested,
        "Rejected audit department change"
    );
    Err(PolicyError::Forbidden(
        "You can only move audits into your own department".to_string(),
    ))
}

/// Percentage of completed items, rounded half up; `None` without items
pub fn overall_score(items: &[AuditItem]) -> Option<i32> {
    let total = items.len();
    if total == 0 {
        return None;
    }
    let completed = items.iter().filter(|i| i.status.is_completed()).count();
    // round(100 * c / t) with halves rounding up, in integers
    let score = (200 * completed + total) / (2 * total);
    i32::try_from(score).ok()
}

/// Compute every server-owned field of `incoming`
///
/// `previous` is the stored record on update and `None` on create. Items
/// are matched to their previous version by position:
///
/// - `id`, `created_by`, and `created_at` come from the item at the same
///   position; new positions get a fresh creator of `actor`
/// - `completed_date` is set to `now` on a transition into completed and
///   otherwise carried over from the same position
/// - `updated_at` only moves when the item's content changed
///
/// The parent's `completed_date` follows the same transition rule. The
/// score is recomputed from the final items.
pub fn derive_fields(
    previous: Option<&Audit>,
    incoming: Audit,
    actor: &Identity,
    now: DateTime<Utc>,
) -> Audit {
    let mut audit = incoming;

    let prior_items: &[AuditItem] = previous.map(|p| p.items.as_slice()).unwrap_or(&[]);
    audit.items = std::mem::take(&mut audit.items)
        .into_iter()
        .enumerate()
        .map(|(position, item)| derive_item(prior_items.get(position), item, actor, now))
        .collect();

    match previous {
        Some(prior) => {
            audit.id = prior.id;
            audit.auditor = prior.auditor;
            audit.is_active = prior.is_active;
            audit.created_at = prior.created_at;
            audit.completed_date = if audit.status.is_completed() && !prior.status.is_completed() {
                Some(now)
            } else {
                prior.completed_date
            };
        },
        None => {
            audit.auditor = actor.id;
            audit.is_active = true;
            audit.created_at = now;
            audit.completed_date = audit.status.is_completed().then_some(now);
        },
    }

    audit.overall_score = overall_score(&audit.items);
    audit.updated_at = now;
    audit
}

fn derive_item(
    prior: Option<&AuditItem>,
    mut item: AuditItem,
    actor: &Identity,
    now: DateTime<Utc>,
) -> AuditItem {
    match prior {
        Some(prior) => {
            item.id = prior.id;
            item.created_by = prior.created_by;
            item.created_at = prior.created_at;
            item.completed_date = if item.status.is_completed() && !prior.status.is_completed() {
                Some(now)
            } else {
                prior.completed_date
            };
            item.updated_at = if item.same_content(prior) {
                prior.updated_at
            } else {
                now
            };
        },
        None => {
            item.created_by = actor.id;
            item.created_at = now;
            item.completed_date = item.status.is_completed().then_some(now);
            item.updated_at = now;
        },
    }
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::audit::fixtures::{audit, item};
    use auditdesk_common::types::{AuditStatus, ItemStatus};
    use chrono::Duration;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn identity(role: Role, department: &str) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            role,
            department: Department::from(department),
        }
    }

    fn items_with(statuses: &[ItemStatus], by: Uuid) -> Vec<AuditItem> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, s)| item(&format!("item {}", i), *s, by))
            .collect()
    }

    #[test]
    fn test_create_gate_department_rule() {
        let manager = identity(Role::Manager, "Engineering");
        assert!(matches!(
            check_create(&manager, &Department::from("Finance")),
            Err(PolicyError::Forbidden(_))
        ));
        assert!(check_create(&manager, &Department::from("Engineering")).is_ok());

        let admin = identity(Role::Admin, "IT Administration");
        assert!(check_create(&admin, &Department::from("Finance")).is_ok());
    }

    #[test]
    fn test_department_change_rule() {
        let auditor = identity(Role::Auditor, "Operations");
        let finance = Department::from("Finance");
        let operations = Department::from("Operations");
        let engineering = Department::from("Engineering");

        assert!(check_department_change(&auditor, &finance, &finance).is_ok());
        assert!(check_department_change(&auditor, &finance, &operations).is_ok());
        assert!(check_department_change(&auditor, &finance, &engineering).is_err());

        let admin = identity(Role::Admin, "IT Administration");
        assert!(check_department_change(&admin, &finance, &engineering).is_ok());
    }

    #[test]
    fn test_score_rounding() {
        let by = Uuid::new_v4();
        use ItemStatus::*;
        assert_eq!(overall_score(&[]), None);
        assert_eq!(overall_score(&items_with(&[Completed, Completed, Completed, Pending], by)), Some(75));
        assert_eq!(overall_score(&items_with(&[Completed, Pending], by)), Some(50));
        assert_eq!(overall_score(&items_with(&[Pending, Pending], by)), Some(0));
        // 1/3 = 33.33 -> 33, 2/3 = 66.67 -> 67
        assert_eq!(overall_score(&items_with(&[Completed, Pending, Pending], by)), Some(33));
        assert_eq!(overall_score(&items_with(&[Completed, Completed, Pending], by)), Some(67));
        // 1/8 = 12.5 rounds up
        let mut eight = vec![Pending; 8];
        eight[0] = Completed;
        assert_eq!(overall_score(&items_with(&eight, by)), Some(13));
    }

    #[test]
    fn test_create_stamps_owner_and_items() {
        let actor = identity(Role::Manager, "Engineering");
        let someone_else = Uuid::new_v4();
        let mut incoming = audit("Engineering", someone_else);
        incoming.items = items_with(&[ItemStatus::Completed, ItemStatus::Pending], someone_else);
        incoming.overall_score = Some(99);
        let now = Utc::now();

        let created = derive_fields(None, incoming, &actor, now);

        assert_eq!(created.auditor, actor.id);
        assert!(created.is_active);
        assert_eq!(created.overall_score, Some(50));
        assert!(created.items.iter().all(|i| i.created_by == actor.id));
        assert_eq!(created.items[0].completed_date, Some(now));
        assert_eq!(created.items[1].completed_date, None);
        assert_eq!(created.completed_date, None);
    }

    #[test]
    fn test_update_item_completion_transition() {
        let owner = identity(Role::Auditor, "Finance");
        let editor = identity(Role::Auditor, "Finance");
        let earlier = Utc::now() - Duration::hours(3);

        let mut stored = audit("Finance", owner.id);
        stored.items = items_with(&[ItemStatus::Pending, ItemStatus::Pending], owner.id);
        stored.overall_score = Some(0);

        let mut incoming = stored.clone();
        incoming.items[0].status = ItemStatus::Completed;
        // client-supplied provenance is ignored
        incoming.items[0].created_by = editor.id;
        incoming.items[1].created_by = editor.id;
        let now = earlier + Duration::hours(3);

        let updated = derive_fields(Some(&stored), incoming, &editor, now);

        assert_eq!(updated.items[0].completed_date, Some(now));
        assert_eq!(updated.items[1].completed_date, None);
        assert_eq!(updated.overall_score, Some(50));
        assert_eq!(updated.items[0].created_by, owner.id);
        assert_eq!(updated.items[1].created_by, owner.id);
        assert_eq!(updated.items[0].id, stored.items[0].id);
        assert_eq!(updated.items[1].updated_at, stored.items[1].updated_at);
    }

    #[test]
    fn test_resubmitting_completed_item_keeps_date() {
        let actor = identity(Role::Admin, "IT Administration");
        let first = Utc::now() - Duration::days(2);

        let mut stored = audit("Finance", Uuid::new_v4());
        stored.items = items_with(&[ItemStatus::Completed], stored.auditor);
        stored.items[0].completed_date = Some(first);

        let updated = derive_fields(Some(&stored), stored.clone(), &actor, Utc::now());
        assert_eq!(updated.items[0].completed_date, Some(first));
        assert_eq!(updated.overall_score, Some(100));
    }

    #[test]
    fn test_new_positions_get_actor_as_creator() {
        let owner = Uuid::new_v4();
        let editor = identity(Role::Auditor, "Finance");

        let mut stored = audit("Finance", owner);
        stored.items = items_with(&[ItemStatus::Pending], owner);

        let mut incoming = stored.clone();
        incoming.items.push(item("added later", ItemStatus::Pending, owner));

        let updated = derive_fields(Some(&stored), incoming, &editor, Utc::now());
        assert_eq!(updated.items[0].created_by, owner);
        assert_eq!(updated.items[1].created_by, editor.id);
    }

    #[test]
    fn test_parent_completion_transition() {
        let actor = identity(Role::Admin, "IT Administration");
        let mut stored = audit("Finance", Uuid::new_v4());

        let mut incoming = stored.clone();
        incoming.status = AuditStatus::Completed;
        let first = Utc::now();
        let completed = derive_fields(Some(&stored), incoming, &actor, first);
        assert_eq!(completed.completed_date, Some(first));

        // staying completed keeps the first date
        stored = completed.clone();
        let later = first + Duration::minutes(5);
        let again = derive_fields(Some(&stored), completed, &actor, later);
        assert_eq!(again.completed_date, Some(first));

        // leaving completed keeps the historical date
        let mut reopened = again.clone();
        reopened.status = AuditStatus::Active;
        let reopened = derive_fields(Some(&again), reopened, &actor, later);
        assert_eq!(reopened.completed_date, Some(first));
    }

    #[test]
    fn test_update_preserves_owner_and_activity() {
        let owner = Uuid::new_v4();
        let actor = identity(Role::Admin, "IT Administration");
        let stored = audit("Finance", owner);

        let mut incoming = stored.clone();
        incoming.auditor = actor.id;
        incoming.is_active = false;
        incoming.overall_score = Some(100);

        let updated = derive_fields(Some(&stored), incoming, &actor, Utc::now());
        assert_eq!(updated.auditor, owner);
        assert!(updated.is_active);
        assert_eq!(updated.overall_score, None);
        assert_eq!(updated.created_at, stored.created_at);
    }

    proptest! {
        #[test]
        fn prop_score_bounded_and_monotone(total in 1usize..60, completed_seed in 0usize..60) {
            let completed = completed_seed % (total + 1);
            let by = Uuid::new_v4();
            let mut statuses = vec![ItemStatus::Pending; total];
            for status in statuses.iter_mut().take(completed) {
                *status = ItemStatus::Completed;
            }
            let score = overall_score(&items_with(&statuses, by));
            let score = score.unwrap_or(-1);
            prop_assert!((0..=100).contains(&score));
            prop_assert_eq!(score == 100, completed == total);
            prop_assert_eq!(score == 0, completed * 200 < total);
        }
    }
}
