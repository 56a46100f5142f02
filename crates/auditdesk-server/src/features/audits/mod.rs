//! Audits feature
//!
//! CRUD over audit records and their embedded checklist items. Every
//! operation takes the caller's identity: lists are narrowed by the
//! visibility filter, single-record operations go through the access
//! checker, and writes go through the mutation gate. Responses embed a
//! summary of each referenced user account.

pub mod commands;
pub mod items;
pub mod queries;
pub mod routes;
pub mod view;

pub use routes::audits_routes;
