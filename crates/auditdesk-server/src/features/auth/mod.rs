//! Authentication feature
//!
//! Login, self-registration, the caller's profile, and first-run admin
//! setup. Login, register, and setup respond with `{token, user}`.

pub mod commands;
pub mod queries;
pub mod routes;

use serde::{Deserialize, Serialize};

use crate::models::{User, UserProfile};

pub use routes::{auth_routes, setup_routes};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

impl AuthResponse {
    pub fn new(token: String, user: &User) -> Self {
        Self {
            token,
            user: user.profile(),
        }
    }
}
