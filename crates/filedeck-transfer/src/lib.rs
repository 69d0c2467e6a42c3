//! # filedeck-transfer
//!
//! Byte delivery: single files with standard `Range` support, and
//! on-demand zip archives of folders, built entry-by-entry into an
//! unlinked spool file so memory stays flat no matter how large the
//! folder is.

pub mod archive;
pub mod range;
pub mod stream;

pub use archive::{CancelGuard, SpooledArchive, ZipLimits, spool_archive};
pub use range::ByteRange;
pub use stream::FileSlice;
