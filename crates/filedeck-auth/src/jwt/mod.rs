//! Stateless JWT access tokens.
//!
//! Tokens are HS256-signed and self-contained: the username and role
//! travel in the claims, so request authorization never touches the
//! user store.

pub mod claims;
pub mod decoder;
pub mod encoder;
