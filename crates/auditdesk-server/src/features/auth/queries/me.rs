use serde::{Deserialize, Serialize};

use crate::auth::Identity;
use crate::db::{DbError, UserStore};
use crate::models::UserProfile;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeQuery {}

#[derive(Debug, thiserror::Error)]
pub enum MeError {
    #[error("User not found or inactive")]
    NotFound,

    #[error(transparent)]
    Store(#[from] DbError),
}

/// Profile of the authenticated caller
#[tracing::instrument(skip_all, fields(user_id = %identity.id))]
pub async fn handle(
    users: &dyn UserStore,
    identity: &Identity,
    _query: MeQuery,
) -> Result<UserProfile, MeError> {
    users
        .find_by_id(identity.id)
        .await?
        .filter(|user| user.is_active)
        .map(|user| user.profile())
        .ok_or(MeError::NotFound)
}
