pub mod get;
pub mod list;

pub use get::{GetAuditError, GetAuditQuery};
pub use list::{ListAuditsError, ListAuditsQuery, ListAuditsResponse};
