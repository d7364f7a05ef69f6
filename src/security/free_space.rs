//! Free-space wiping capability
//!
//! Pluggable and advisory. The default implementation deliberately does
//! nothing: filling a volume without temporary files needs platform support
//! this crate does not ship.

use std::path::Path;

use crate::error::Result;
use crate::execution::StatusSink;

pub trait FreeSpaceWiper: Send + Sync {
    fn name(&self) -> &str;

    /// Best-effort fill of unallocated space on the volume holding `dir`
    fn wipe_free_space(&self, dir: &Path, status: &dyn StatusSink) -> Result<()>;
}

/// Documented no-op
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFreeSpaceWiper;

impl FreeSpaceWiper for NoopFreeSpaceWiper {
    fn name(&self) -> &str {
        "noop"
    }

    fn wipe_free_space(&self, dir: &Path, status: &dyn StatusSink) -> Result<()> {
        log::debug!("Free-space wipe skipped for {}", dir.display());
        status.status("🗑️ Free-space wiping not available on this platform (skipped)");
        Ok(())
    }
}
