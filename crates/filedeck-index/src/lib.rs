//! # filedeck-index
//!
//! The browseable side of FileDeck: client path resolution against the
//! scan root, the in-memory directory index, and the background scanner
//! that keeps the index populated while publishing pollable progress.

pub mod entry;
pub mod index;
pub mod resolver;
pub mod scan;

pub use entry::{DirListing, Entry};
pub use index::{DirectoryIndex, IndexTotals, SearchHit};
pub use resolver::{PathResolver, ResolvedPath};
pub use scan::job::{FolderProgress, ScanState};
pub use scan::registry::{ScanRegistry, ScanStatus};
pub use scan::scanner::Scanner;
