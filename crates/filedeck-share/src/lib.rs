//! # filedeck-share
//!
//! Ad-hoc share links: unguessable tokens bound to a path under the scan
//! root, with expiry and an optional Argon2-hashed password. The registry
//! persists to a JSON file and validates access without ever revealing
//! whether a failing token is unknown or merely expired.

pub mod access;
pub mod model;
pub mod store;
pub mod token;

pub use access::ShareAccess;
pub use model::ShareLink;
pub use store::ShareStore;
pub use token::generate_token;
