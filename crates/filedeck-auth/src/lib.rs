//! # filedeck-auth
//!
//! Authentication and authorization for FileDeck: Argon2id password
//! hashing, stateless JWT access tokens, role-based capability checks,
//! and the JSON-file-backed user store.

pub mod jwt;
pub mod password;
pub mod rbac;
pub mod user;

pub use jwt::claims::Claims;
pub use jwt::decoder::JwtDecoder;
pub use jwt::encoder::JwtEncoder;
pub use password::PasswordHasher;
pub use rbac::Capability;
pub use user::model::User;
pub use user::role::UserRole;
pub use user::store::UserStore;
