//! Field validation shared by commands
//!
//! Text helpers trim first and measure length in characters, returning the
//! trimmed value so callers store exactly what was checked.
//!
//! ```rust,ignore
//! let title = required_text(&command.title, "title", MAX_TITLE_LEN)?;
//! let email = validate_email(&command.email)?;
//! ```

use auditdesk_common::types::{Department, DepartmentSet};
use regex::Regex;
use thiserror::Error;

use crate::models::MIN_PASSWORD_LEN;

const EMAIL_PATTERN: &str = r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} cannot exceed {max_length} characters")]
    TooLong {
        field: &'static str,
        max_length: usize,
    },

    #[error("Please enter a valid email")]
    InvalidEmail,

    #[error("Password must be at least {min_length} characters long")]
    PasswordTooShort { min_length: usize },

    #[error("Unknown department: '{0}'")]
    UnknownDepartment(String),
}

/// Trimmed, non-empty, at most `max_length` characters
pub fn required_text(
    value: &str,
    field: &'static str,
    max_length: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    optional_text(trimmed, field, max_length)
}

/// Trimmed, possibly empty, at most `max_length` characters
pub fn optional_text(
    value: &str,
    field: &'static str,
    max_length: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.chars().count() > max_length {
        return Err(ValidationError::TooLong { field, max_length });
    }
    Ok(trimmed.to_string())
}

/// Check the format and return the lowercased address
pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ValidationError::Required { field: "email" });
    }

    let valid = Regex::new(EMAIL_PATTERN)
        .map(|re| re.is_match(&email))
        .unwrap_or(false);
    if !valid {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(email)
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Required { field: "password" });
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min_length: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

pub fn resolve_department(
    departments: &DepartmentSet,
    name: &str,
) -> Result<Department, ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required { field: "department" });
    }
    departments
        .resolve(name)
        .map_err(|_| ValidationError::UnknownDepartment(name.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("  Title ", "title", 10).unwrap(), "Title");
        assert_eq!(
            required_text("   ", "title", 10),
            Err(ValidationError::Required { field: "title" })
        );
        assert_eq!(
            required_text("abcdefghijk", "title", 10),
            Err(ValidationError::TooLong {
                field: "title",
                max_length: 10
            })
        );
    }

    #[test]
    fn test_length_counts_characters_after_trim() {
        let umlauts = "ä".repeat(10);
        assert!(required_text(&umlauts, "title", 10).is_ok());
        assert!(optional_text(&format!("  {}  ", umlauts), "title", 10).is_ok());
        assert_eq!(optional_text("", "findings", 5).unwrap(), "");
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(" Jane.Doe@Example.com ").unwrap(), "jane.doe@example.com");
        assert!(validate_email("first-last@sub.example.org").is_ok());
        assert_eq!(validate_email("not-an-email"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("a@b"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email(""), Err(ValidationError::Required { field: "email" }));
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert_eq!(
            validate_password("12345"),
            Err(ValidationError::PasswordTooShort { min_length: 6 })
        );
    }

    #[test]
    fn test_resolve_department() {
        let departments = DepartmentSet::default();
        assert_eq!(
            resolve_department(&departments, " Finance ").unwrap().as_str(),
            "Finance"
        );
        assert_eq!(
            resolve_department(&departments, "Legal"),
            Err(ValidationError::UnknownDepartment("Legal".to_string()))
        );
    }
}
