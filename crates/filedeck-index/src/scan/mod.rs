//! Background filesystem scanning.
//!
//! One [`job::ScanJob`] tracks one walk (root or subtree). Jobs live in a
//! [`registry::ScanRegistry`] keyed by target path; the [`scanner::Scanner`]
//! drives the walks and publishes listings into the directory index.

pub mod job;
pub mod registry;
pub mod scanner;
