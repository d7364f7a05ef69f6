//! Timestamp scrubbing
//!
//! Several random timestamps are written first (each failure only logged),
//! then a final assignment to "now" whose failure is returned.

use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::error::{Result, WipeError};
use crate::execution::StatusSink;
use crate::security::fs_ops::FsOps;

/// Default number of randomized timestamp assignments
pub const DEFAULT_METADATA_ATTEMPTS: usize = 7;

/// Upper bound (exclusive) for random timestamps, seconds since the epoch
pub const RANDOM_EPOCH_LIMIT: i64 = 2_000_000_000;

/// A random instant in `[1970-01-01, 2033-05-18)`
pub fn random_instant<R: Rng + ?Sized>(rng: &mut R) -> DateTime<Utc> {
    let secs = rng.random_range(0..RANDOM_EPOCH_LIMIT);
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

pub fn randomize_timestamps(
    path: &Path,
    attempts: usize,
    fs: &dyn FsOps,
    status: &dyn StatusSink,
) -> Result<()> {
    randomize_timestamps_with(path, attempts, fs, status, &mut rand::rng())
}

pub fn randomize_timestamps_with<R: Rng + ?Sized>(
    path: &Path,
    attempts: usize,
    fs: &dyn FsOps,
    status: &dyn StatusSink,
    rng: &mut R,
) -> Result<()> {
    status.status("📊 Obfuscating metadata...");

    let mut applied = 0;
    for attempt in 1..=attempts {
        let instant = random_instant(rng);
        match fs.set_times(path, SystemTime::from(instant)) {
            Ok(()) => {
                applied += 1;
                log::debug!("Timestamp {} set to {}", attempt, instant.to_rfc3339());
            }
            Err(e) => {
                log::warn!("Metadata change {} failed: {}", attempt, e);
                status.status(&format!("⚠️ Metadata change {} failed: {}", attempt, e));
            }
        }
    }

    fs.set_times(path, SystemTime::now())
        .map_err(WipeError::Timestamp)?;

    status.status(&format!(
        "🕒 Timestamps randomized ({}/{} attempts) and reset to now",
        applied, attempts
    ));
    Ok(())
}
