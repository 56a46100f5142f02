//! Login command
//!
//! Unknown email, wrong password, and inactive account all fail with the
//! same message.

use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, PasswordService, TokenService};
use crate::db::UserStore;
use crate::features::auth::AuthResponse;

#[derive(Clone, Serialize, Deserialize)]
pub struct LoginCommand {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCommand")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("Please provide email and password")]
    MissingFields,

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl LoginCommand {
    pub fn validate(&self) -> Result<(), LoginError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(LoginError::MissingFields);
        }
        Ok(())
    }
}

#[tracing::instrument(skip_all)]
pub async fn handle(
    users: &dyn UserStore,
    passwords: &PasswordService,
    tokens: &TokenService,
    command: LoginCommand,
) -> Result<AuthResponse, LoginError> {
    command.validate()?;

    let user = users
        .find_by_email(&command.email)
        .await
        .map_err(AuthError::from)?
        .filter(|user| user.is_active)
        .ok_or(AuthError::InvalidLogin)?;

    if !passwords
        .verify(&command.password, &user.password_hash)
        .map_err(AuthError::from)?
    {
        tracing::warn!(user_id = %user.id, "Failed login attempt");
        return Err(AuthError::InvalidLogin.into());
    }

    let token = tokens.issue(user.id).map_err(AuthError::from)?;
    tracing::info!(user_id = %user.id, "User logged in");
    Ok(AuthResponse::new(token, &user))
}
