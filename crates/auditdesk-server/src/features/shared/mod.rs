//! Helpers shared by feature slices
//!
//! - **extract**: extractors whose rejections use the API error envelope
//! - **pagination**: page/size parameters and response metadata
//! - **validation**: trimmed text, email, password, and department checks

pub mod extract;
pub mod pagination;
pub mod validation;

pub use extract::{AppJson, AppPath, AppQuery};
pub use pagination::{Paginated, PaginationMetadata, PaginationParams};
pub use validation::{
    optional_text, required_text, resolve_department, validate_email, validate_password,
    ValidationError,
};
