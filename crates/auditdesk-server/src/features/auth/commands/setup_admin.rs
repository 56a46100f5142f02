//! First-run administrator bootstrap
//!
//! Only allowed while the user table is empty. The emptiness check and the
//! insert are separate statements, so two concurrent first requests could
//! both succeed; the unique email constraint is the only backstop.

use auditdesk_common::types::{Department, Role, ADMIN_DEPARTMENT};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::{PasswordError, PasswordService, TokenError, TokenService};
use crate::db::{DbError, UserStore};
use crate::features::auth::AuthResponse;
use crate::features::shared::{required_text, validate_email, validate_password, ValidationError};
use crate::models::{User, MAX_USER_NAME_LEN};

#[derive(Clone, Serialize, Deserialize)]
pub struct SetupAdminCommand {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl std::fmt::Debug for SetupAdminCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetupAdminCommand")
            .field("email", &self.email)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SetupAdminError {
    #[error("Admin user already exists. Setup is complete.")]
    AlreadyInitialized,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(#[from] DbError),
}

impl SetupAdminCommand {
    pub fn validate(&self) -> Result<(), SetupAdminError> {
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        required_text(&self.name, "name", MAX_USER_NAME_LEN)?;
        Ok(())
    }
}

#[tracing::instrument(skip_all)]
pub async fn handle(
    users: &dyn UserStore,
    passwords: &PasswordService,
    tokens: &TokenService,
    command: SetupAdminCommand,
) -> Result<AuthResponse, SetupAdminError> {
    if users.count().await? > 0 {
        tracing::warn!("Rejected admin setup on initialized system");
        return Err(SetupAdminError::AlreadyInitialized);
    }
    command.validate()?;

    let email = validate_email(&command.email)?;
    let admin = User::new(
        &email,
        &command.name,
        passwords.hash(&command.password)?,
        Role::Admin,
        Department::from(ADMIN_DEPARTMENT),
        Utc::now(),
    );
    users.insert(&admin).await?;

    let token = tokens.issue(admin.id)?;
    tracing::info!(user_id = %admin.id, "Initial admin created");
    Ok(AuthResponse::new(token, &admin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryUserStore;
    use chrono::Duration;

    fn command(email: &str) -> SetupAdminCommand {
        SetupAdminCommand {
            email: email.to_string(),
            password: "changeme".to_string(),
            name: "Root".to_string(),
        }
    }

    #[tokio::test]
    async fn test_only_first_admin_allowed() {
        let users = MemoryUserStore::new();
        let passwords = PasswordService::with_cost(1024, 1, 1).unwrap();
        let tokens =
            TokenService::new("0123456789abcdef0123456789abcdef", "auditdesk", Duration::hours(1));

        let first = handle(&users, &passwords, &tokens, command("root@example.com"))
            .await
            .unwrap();
        assert_eq!(first.user.role, Role::Admin);
        assert_eq!(first.user.department.as_str(), ADMIN_DEPARTMENT);

        let second = handle(&users, &passwords, &tokens, command("other@example.com")).await;
        assert!(matches!(second, Err(SetupAdminError::AlreadyInitialized)));
    }
}
