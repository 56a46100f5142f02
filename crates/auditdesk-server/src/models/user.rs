use auditdesk_common::types::{Department, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored user account
///
/// The password hash never leaves the server: serialization skips it and
/// API responses use [`UserProfile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Always lowercase
    pub email: String,
    pub name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub department: Department,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New active user with a fresh id; the email is lowercased
    pub fn new(
        email: &str,
        name: &str,
        password_hash: String,
        role: Role,
        department: Department,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.trim().to_lowercase(),
            name: name.trim().to_string(),
            password_hash,
            role,
            department,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self)
    }
}

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub department: Department,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            department: user.department.clone(),
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_lowercases_email() {
        let user = User::new(
            " Jane.Doe@Example.COM ",
            " Jane ",
            "hash".to_string(),
            Role::Manager,
            Department::from("Finance"),
            Utc::now(),
        );
        assert_eq!(user.email, "jane.doe@example.com");
        assert_eq!(user.name, "Jane");
        assert!(user.is_active);
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User::new(
            "a@b.co",
            "A",
            "$argon2id$secret".to_string(),
            Role::Auditor,
            Department::from("Finance"),
            Utc::now(),
        );
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        let profile = serde_json::to_value(user.profile()).unwrap();
        assert!(profile.get("password_hash").is_none());
        assert_eq!(profile["role"], "auditor");
    }
}
