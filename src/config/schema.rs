//! Configuration schema for the wipe pipeline
use serde::{Deserialize, Serialize};

use crate::security::destruct::DEFAULT_RENAME_ATTEMPTS;
use crate::security::overwrite::DEFAULT_PROGRESS_INTERVAL;
use crate::security::patterns::DEFAULT_BLOCK_SIZE;
use crate::security::scrub::DEFAULT_METADATA_ATTEMPTS;
use crate::utils::logging::parse_level;

/// Largest accepted overwrite block (64 MiB)
pub const MAX_BLOCK_SIZE: usize = 64 * 1024 * 1024;

/// Largest accepted rename chain
pub const MAX_RENAME_ATTEMPTS: usize = 16;

/// Fixed policy values for a wipe. The pass count is not configurable.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WipeConfig {
    /// Overwrite block size in bytes
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// Emit progress every N passes (first and last pass always report)
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,

    /// Random timestamp assignments before the final "now"
    #[serde(default = "default_metadata_attempts")]
    pub metadata_attempts: usize,

    /// Length of the `.wipeN` rename chain
    #[serde(default = "default_rename_attempts")]
    pub rename_attempts: usize,

    /// Treat a failed final timestamp assignment as fatal
    #[serde(default)]
    pub strict_metadata: bool,

    /// Log level: "debug", "info", "warn", "error", "none"
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}

fn default_progress_interval() -> usize {
    DEFAULT_PROGRESS_INTERVAL
}

fn default_metadata_attempts() -> usize {
    DEFAULT_METADATA_ATTEMPTS
}

fn default_rename_attempts() -> usize {
    DEFAULT_RENAME_ATTEMPTS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for WipeConfig {
    fn default() -> Self {
        Self {
            block_size: default_block_size(),
            progress_interval: default_progress_interval(),
            metadata_attempts: default_metadata_attempts(),
            rename_attempts: default_rename_attempts(),
            strict_metadata: false,
            log_level: default_log_level(),
        }
    }
}

impl WipeConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.block_size == 0 {
            return Err("block_size cannot be zero".to_string());
        }

        if self.block_size > MAX_BLOCK_SIZE {
            return Err(format!("block_size cannot exceed {} bytes", MAX_BLOCK_SIZE));
        }

        if self.progress_interval == 0 {
            return Err("progress_interval cannot be zero".to_string());
        }

        if self.rename_attempts > MAX_RENAME_ATTEMPTS {
            return Err(format!("rename_attempts cannot exceed {}", MAX_RENAME_ATTEMPTS));
        }

        if parse_level(&self.log_level).is_none() {
            return Err(format!("unknown log_level: {}", self.log_level));
        }

        Ok(())
    }
}
