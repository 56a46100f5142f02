//! Self-registration
//!
//! New accounts always get the auditor role; other roles are assigned by
//! an admin through the user administration routes.

use auditdesk_common::types::{DepartmentSet, Role};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::{PasswordError, PasswordService, TokenError, TokenService};
use crate::db::{DbError, UserStore};
use crate::features::auth::AuthResponse;
use crate::features::shared::{
    required_text, resolve_department, validate_email, validate_password, ValidationError,
};
use crate::models::{User, MAX_USER_NAME_LEN};

#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterCommand {
    pub email: String,
    pub password: String,
    pub name: String,
    pub department: String,
}

impl std::fmt::Debug for RegisterCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterCommand")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("department", &self.department)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("User already exists with this email")]
    DuplicateEmail,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(DbError),
}

impl From<DbError> for RegisterError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Duplicate(_) => RegisterError::DuplicateEmail,
            other => RegisterError::Store(other),
        }
    }
}

impl RegisterCommand {
    pub fn validate(&self, departments: &DepartmentSet) -> Result<(), RegisterError> {
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        required_text(&self.name, "name", MAX_USER_NAME_LEN)?;
        resolve_department(departments, &self.department)?;
        Ok(())
    }
}

#[tracing::instrument(skip_all, fields(department = %command.department))]
pub async fn handle(
    users: &dyn UserStore,
    passwords: &PasswordService,
    tokens: &TokenService,
    departments: &DepartmentSet,
    command: RegisterCommand,
) -> Result<AuthResponse, RegisterError> {
    command.validate(departments)?;

    let email = validate_email(&command.email)?;
    let department = resolve_department(departments, &command.department)?;
    let user = User::new(
        &email,
        &command.name,
        passwords.hash(&command.password)?,
        Role::Auditor,
        department,
        Utc::now(),
    );
    users.insert(&user).await?;

    let token = tokens.issue(user.id)?;
    tracing::info!(user_id = %user.id, "User registered");
    Ok(AuthResponse::new(token, &user))
}
