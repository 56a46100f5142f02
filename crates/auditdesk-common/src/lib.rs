//! AuditDesk Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared domain types, error handling, and logging for the AuditDesk workspace.
//!
//! # Overview
//!
//! - **Types**: the fixed enumerations of the audit domain (roles, audit and
//!   item statuses, audit types, risk levels, item categories) and the
//!   configurable department set
//! - **Error Handling**: the common error type and result alias
//! - **Logging**: `tracing` subscriber configuration shared by every binary
//!
//! # Example
//!
//! ```
//! use auditdesk_common::types::{ItemStatus, Role};
//!
//! let role: Role = "manager".parse().unwrap();
//! assert_eq!(role, Role::Manager);
//! assert_eq!(ItemStatus::InProgress.as_str(), "in-progress");
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{AuditDeskError, Result};
