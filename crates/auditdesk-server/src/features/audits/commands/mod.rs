pub mod create;
pub mod delete;
pub mod update;

pub use create::{CreateAuditCommand, CreateAuditError};
pub use delete::{DeleteAuditCommand, DeleteAuditError, DeleteAuditResponse};
pub use update::{UpdateAuditCommand, UpdateAuditError};
