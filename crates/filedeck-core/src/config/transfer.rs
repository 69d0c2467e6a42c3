//! Download and archive configuration.

use serde::{Deserialize, Serialize};

/// Limits for on-demand folder archives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Maximum number of entries allowed in one zip download.
    #[serde(default = "default_zip_max_entries")]
    pub zip_max_entries: usize,
    /// Maximum total uncompressed bytes allowed in one zip download.
    #[serde(default = "default_zip_max_total_bytes")]
    pub zip_max_total_bytes: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            zip_max_entries: default_zip_max_entries(),
            zip_max_total_bytes: default_zip_max_total_bytes(),
        }
    }
}

fn default_zip_max_entries() -> usize {
    10_000
}

fn default_zip_max_total_bytes() -> u64 {
    4 * 1024 * 1024 * 1024
}
