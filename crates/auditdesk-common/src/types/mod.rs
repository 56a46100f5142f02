//! Domain enumerations shared across AuditDesk
//!
//! The wire strings of every enumeration are fixed: clients and stored rows
//! use exactly the values listed here. Departments are the exception; they
//! are configuration (see [`DepartmentSet`]) rather than a closed enum.

use serde::{Deserialize, Serialize};

use crate::error::AuditDeskError;

/// Declares a fieldless enum whose serde, `Display`, and `FromStr` forms are
/// the given wire strings.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $wire)] $variant),+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = AuditDeskError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(AuditDeskError::invalid_enum($kind, other)),
                }
            }
        }
    };
}

wire_enum! {
    /// Role of an authenticated user. Exactly one per user.
    Role("role") {
        Admin => "admin",
        Auditor => "auditor",
        Manager => "manager",
    }
}

wire_enum! {
    /// Lifecycle status of an audit. Any status may be set to any other.
    AuditStatus("audit status") {
        Draft => "draft",
        Active => "active",
        Completed => "completed",
        Archived => "archived",
    }
}

wire_enum! {
    AuditType("audit type") {
        Internal => "internal",
        External => "external",
        Compliance => "compliance",
        Quality => "quality",
        Safety => "safety",
    }
}

wire_enum! {
    /// Risk level of an audit; also used as the priority of an audit item.
    RiskLevel("risk level") {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

wire_enum! {
    ItemStatus("item status") {
        Pending => "pending",
        InProgress => "in-progress",
        Completed => "completed",
        OnHold => "on-hold",
        Cancelled => "cancelled",
    }
}

wire_enum! {
    ItemCategory("item category") {
        Compliance => "compliance",
        Quality => "quality",
        Safety => "safety",
        Process => "process",
        Security => "security",
        Financial => "financial",
    }
}

/// Priority of an audit item shares the risk scale
pub type Priority = RiskLevel;

impl Default for Role {
    fn default() -> Self {
        Role::Auditor
    }
}

impl Default for AuditStatus {
    fn default() -> Self {
        AuditStatus::Draft
    }
}

impl Default for RiskLevel {
    fn default() -> Self {
        RiskLevel::Medium
    }
}

impl Default for ItemStatus {
    fn default() -> Self {
        ItemStatus::Pending
    }
}

impl AuditStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, AuditStatus::Completed)
    }
}

impl ItemStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, ItemStatus::Completed)
    }
}

// ============================================================================
// Departments
// ============================================================================

/// Departments known out of the box
pub const DEFAULT_DEPARTMENTS: &[&str] = &[
    "Quality Assurance",
    "IT Administration",
    "Project Management",
    "Engineering",
    "Operations",
    "Human Resources",
    "Finance",
    "Manufacturing",
];

/// Department assigned to the bootstrap administrator
pub const ADMIN_DEPARTMENT: &str = "IT Administration";

/// Name of an organizational unit
///
/// Equality is exact string equality; membership in the configured set is
/// checked separately by [`DepartmentSet::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Department(String);

impl Department {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Department {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// The configured set of valid departments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentSet {
    names: Vec<String>,
}

impl Default for DepartmentSet {
    fn default() -> Self {
        Self::from_names(DEFAULT_DEPARTMENTS.iter().copied())
    }
}

impl DepartmentSet {
    /// Build a set from names, trimming whitespace and dropping blanks and
    /// duplicates while keeping first-seen order
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if !name.is_empty() && !unique.iter().any(|n| n == name) {
                unique.push(name.to_string());
            }
        }
        Self { names: unique }
    }

    /// Parse a comma-separated list such as `"Finance, Engineering"`
    pub fn parse_list(list: &str) -> Self {
        Self::from_names(list.split(','))
    }

    pub fn contains(&self, department: &Department) -> bool {
        self.names.iter().any(|n| n == department.as_str())
    }

    /// Resolve a raw name into a department of this set
    pub fn resolve(&self, name: &str) -> Result<Department, AuditDeskError> {
        let department = Department::new(name);
        if self.contains(&department) {
            Ok(department)
        } else {
            Err(AuditDeskError::UnknownDepartment(department.0))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
