pub mod list;

pub use list::{ListUsersError, ListUsersQuery};
