//! Create user command (admin only)

use auditdesk_common::types::{DepartmentSet, Role};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::{Identity, PasswordError, PasswordService};
use crate::db::{DbError, UserStore};
use crate::features::shared::{
    required_text, resolve_department, validate_email, validate_password, ValidationError,
};
use crate::models::{User, UserProfile, MAX_USER_NAME_LEN};
use crate::policy::{self, PolicyError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserCommand {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    pub department: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("User already exists with this email")]
    DuplicateEmail(String),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(DbError),
}

impl From<DbError> for CreateUserError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Duplicate(email) => CreateUserError::DuplicateEmail(email),
            other => CreateUserError::Store(other),
        }
    }
}

impl CreateUserCommand {
    pub fn validate(&self, departments: &DepartmentSet) -> Result<(), CreateUserError> {
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        required_text(&self.name, "name", MAX_USER_NAME_LEN)?;
        resolve_department(departments, &self.department)?;
        Ok(())
    }
}

#[tracing::instrument(skip_all, fields(admin_id = %identity.id, role = %command.role))]
pub async fn handle(
    users: &dyn UserStore,
    passwords: &PasswordService,
    departments: &DepartmentSet,
    identity: &Identity,
    command: CreateUserCommand,
) -> Result<UserProfile, CreateUserError> {
    policy::require_admin(identity)?;
    command.validate(departments)?;

    let email = validate_email(&command.email)?;
    let department = resolve_department(departments, &command.department)?;
    let password_hash = passwords.hash(&command.password)?;

    let user = User::new(
        &email,
        &command.name,
        password_hash,
        command.role,
        department,
        Utc::now(),
    );
    users.insert(&user).await?;

    tracing::info!(user_id = %user.id, "User created by admin");
    Ok(user.profile())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryUserStore;
    use auditdesk_common::types::Department;
    use uuid::Uuid;

    fn identity(role: Role) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            role,
            department: Department::from("IT Administration"),
        }
    }

    fn command(email: &str) -> CreateUserCommand {
        CreateUserCommand {
            email: email.to_string(),
            password: "hunter22".to_string(),
            name: "Ada Auditor".to_string(),
            role: Role::Auditor,
            department: "Finance".to_string(),
        }
    }

    fn passwords() -> PasswordService {
        PasswordService::with_cost(1024, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn test_admin_creates_user_with_lowercased_email() {
        let users = MemoryUserStore::new();
        let profile = handle(
            &users,
            &passwords(),
            &DepartmentSet::default(),
            &identity(Role::Admin),
            command("Ada@Example.com"),
        )
        .await
        .unwrap();

        assert_eq!(profile.email, "ada@example.com");
        let stored = users.find_by_email("ada@example.com").await.unwrap().unwrap();
        assert!(passwords().verify("hunter22", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_non_admin_forbidden() {
        let users = MemoryUserStore::new();
        let err = handle(
            &users,
            &passwords(),
            &DepartmentSet::default(),
            &identity(Role::Manager),
            command("ada@example.com"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CreateUserError::Policy(PolicyError::Forbidden(_))));
        assert_eq!(users.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let users = MemoryUserStore::new();
        let admin = identity(Role::Admin);
        let departments = DepartmentSet::default();

        handle(&users, &passwords(), &departments, &admin, command("ada@example.com"))
            .await
            .unwrap();
        let err = handle(&users, &passwords(), &departments, &admin, command("ADA@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, CreateUserError::DuplicateEmail(_)));
    }

    #[test]
    fn test_short_password_rejected() {
        let mut cmd = command("ada@example.com");
        cmd.password = "abc".to_string();
        assert!(matches!(
            cmd.validate(&DepartmentSet::default()),
            Err(CreateUserError::Validation(ValidationError::PasswordTooShort { .. }))
        ));
    }
}
