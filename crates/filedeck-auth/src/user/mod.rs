//! User accounts: model, roles, and the JSON-file-backed store.

pub mod model;
pub mod role;
pub mod store;
