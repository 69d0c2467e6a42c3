//! Scan root and scanner configuration.

use serde::{Deserialize, Serialize};

/// Filesystem scanning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// The directory tree exposed by the service. All client paths are
    /// resolved relative to this root. Must exist at startup.
    #[serde(default = "default_root")]
    pub root: String,
    /// Whether to kick off a full root scan when the server boots.
    #[serde(default = "default_true")]
    pub scan_on_startup: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            scan_on_startup: default_true(),
        }
    }
}

fn default_root() -> String {
    "/data".to_string()
}

fn default_true() -> bool {
    true
}
