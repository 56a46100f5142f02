//! HS256 token issuance and verification

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{AuthConfig, MAX_JWT_EXPIRES_IN_HOURS};

/// Claims carried by an AuditDesk token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token is invalid: {0}")]
    Invalid(String),

    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// Signs and verifies tokens with a shared secret
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    expires_in: Duration,
}

impl TokenService {
    pub fn new(secret: &str, issuer: &str, expires_in: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            issuer: issuer.to_string(),
            expires_in,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            &config.jwt_issuer,
            Duration::hours(config.jwt_expires_in_hours.clamp(1, MAX_JWT_EXPIRES_IN_HOURS)),
        )
    }

    /// Issue a token whose subject is `user_id`
    pub fn issue(&self, user_id: Uuid) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.expires_in).timestamp(),
            iss: self.issuer.clone(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Verify signature, issuer, and expiry
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_issue_then_verify() {
        let service = TokenService::new(SECRET, "auditdesk", Duration::hours(1));
        let user_id = Uuid::new_v4();
        let claims = service.verify(&service.issue(user_id).unwrap()).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.iss, "auditdesk");
    }

    #[test]
    fn test_expired_token() {
        let service = TokenService::new(SECRET, "auditdesk", Duration::hours(-2));
        let token = service.issue(Uuid::new_v4()).unwrap();
        assert!(matches!(service.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_wrong_secret_or_issuer_rejected() {
        let issuer = TokenService::new(SECRET, "auditdesk", Duration::hours(1));
        let token = issuer.issue(Uuid::new_v4()).unwrap();

        let other_secret =
            TokenService::new("ffffffffffffffffffffffffffffffff", "auditdesk", Duration::hours(1));
        assert!(matches!(other_secret.verify(&token), Err(TokenError::Invalid(_))));

        let other_issuer = TokenService::new(SECRET, "someone-else", Duration::hours(1));
        assert!(matches!(other_issuer.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_from_config_clamps_lifetime() {
        let config = AuthConfig {
            jwt_secret: SECRET.to_string(),
            jwt_expires_in_hours: i64::MAX,
            jwt_issuer: "auditdesk".to_string(),
        };
        let service = TokenService::from_config(&config);
        assert_eq!(service.expires_in, Duration::hours(MAX_JWT_EXPIRES_IN_HOURS));
        assert!(service.verify(&service.issue(Uuid::new_v4()).unwrap()).is_ok());
    }

    #[test]
    fn test_garbage_rejected() {
        let service = TokenService::new(SECRET, "auditdesk", Duration::hours(1));
        assert!(matches!(service.verify("not.a.jwt"), Err(TokenError::Invalid(_))));
    }
}
