//! User administration (admin only)

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::users_routes;
