pub mod login;
pub mod register;
pub mod setup_admin;

pub use login::{LoginCommand, LoginError};
pub use register::{RegisterCommand, RegisterError};
pub use setup_admin::{SetupAdminCommand, SetupAdminError};
