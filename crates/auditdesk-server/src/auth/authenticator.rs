use std::sync::Arc;
use uuid::Uuid;

use super::{AuthError, Identity, TokenError, TokenService};
use crate::db::UserStore;

/// Resolves bearer credentials into identities
#[derive(Clone)]
pub struct Authenticator {
    tokens: Arc<TokenService>,
    users: Arc<dyn UserStore>,
}

impl Authenticator {
    pub fn new(tokens: Arc<TokenService>, users: Arc<dyn UserStore>) -> Self {
        Self { tokens, users }
    }

    /// Resolve an `Authorization` header value
    ///
    /// Anything other than `Bearer <token>` is treated as a missing
    /// credential. Inactive users resolve to [`AuthError::IdentityNotFound`]
    /// exactly like deleted ones.
    #[tracing::instrument(skip_all)]
    pub async fn authenticate(&self, header: Option<&str>) -> Result<Identity, AuthError> {
        let token = header
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingCredential)?;

        let claims = self.tokens.verify(token).map_err(|e| match e {
            TokenError::Expired => AuthError::ExpiredCredential,
            other => {
                tracing::debug!(error = %other, "Rejected bearer token");
                AuthError::InvalidCredential
            },
        })?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidCredential)?;

        match self.users.find_by_id(user_id).await? {
            Some(user) if user.is_active => Ok(Identity::from(&user)),
            _ => {
                tracing::warn!(%user_id, "Token subject missing or inactive");
                Err(AuthError::IdentityNotFound)
            },
        }
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}
