use serde::{Deserialize, Serialize};

use crate::auth::Identity;
use crate::db::{DbError, UserStore};
use crate::models::UserProfile;
use crate::policy::{self, PolicyError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListUsersQuery {}

#[derive(Debug, thiserror::Error)]
pub enum ListUsersError {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Store(#[from] DbError),
}

/// Active users, newest first (admin only)
#[tracing::instrument(skip_all, fields(user_id = %identity.id))]
pub async fn handle(
    users: &dyn UserStore,
    identity: &Identity,
    _query: ListUsersQuery,
) -> Result<Vec<UserProfile>, ListUsersError> {
    policy::require_admin(identity)?;

    let profiles = users
        .list_active()
        .await?
        .iter()
        .map(UserProfile::from)
        .collect();
    Ok(profiles)
}
