pub mod create;

pub use create::{CreateUserCommand, CreateUserError};
