//! Domain models
//!
//! Records as the policy layer and the stores see them. Field limits live
//! here as constants so validation and storage agree on them.

pub mod audit;
pub mod user;

pub use audit::{Audit, AuditItem};
pub use user::{User, UserProfile};

/// Maximum length of audit and item titles, in characters
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum length of audit and item descriptions
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Maximum length of item findings and recommendations
pub const MAX_NOTES_LEN: usize = 2000;

/// Maximum length of a single evidence entry
pub const MAX_EVIDENCE_LEN: usize = 500;

/// Maximum length of a user's display name
pub const MAX_USER_NAME_LEN: usize = 100;

/// Minimum password length accepted at user creation
pub const MIN_PASSWORD_LEN: usize = 6;
