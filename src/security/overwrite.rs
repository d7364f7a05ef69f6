//! Multi-pass overwrite engine
//!
//! Passes run strictly in order on one handle. Each pass rewrites the file
//! from offset 0 with its pattern tiled to exactly `file_size` bytes, then
//! asks for a sync. A sync failure is only a warning; a write failure aborts.

use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::time::Instant;

use crate::error::{Result, WipeError};
use crate::execution::{CancelToken, ProgressSink, ProgressState, StatusSink};
use crate::security::patterns::WipePatterns;
use crate::security::target::FileState;

/// Default progress cadence, in passes
pub const DEFAULT_PROGRESS_INTERVAL: usize = 5;

/// Handle the engine overwrites through
pub trait WipeMedium: Write + Seek {
    /// Push written data towards stable storage
    fn sync(&mut self) -> io::Result<()>;
}

impl WipeMedium for File {
    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

/// Reporting and cancellation hooks for a run of passes
pub struct PassContext<'a> {
    pub progress_interval: usize,
    pub status: &'a dyn StatusSink,
    pub progress: &'a dyn ProgressSink,
    pub cancel: &'a CancelToken,
}

/// Run every pattern over the first `file_size` bytes of `medium`.
///
/// Returns the number of completed passes. Cancellation is honoured between
/// passes, never inside one. `on_pass` receives the 1-based index of every
/// pass as soon as it has been written.
pub fn execute_passes<M: WipeMedium + ?Sized>(
    medium: &mut M,
    patterns: &WipePatterns,
    file_size: u64,
    ctx: &PassContext<'_>,
    mut on_pass: impl FnMut(usize),
) -> Result<usize> {
    if file_size == 0 {
        ctx.status.status("ℹ️  Empty file, nothing to overwrite");
        return Ok(0);
    }

    let total = patterns.len();
    let interval = ctx.progress_interval.max(1);
    let start = Instant::now();

    ctx.status.status(&format!(
        "🔁 Starting {}-pass overwrite ({} bytes, {}-byte blocks)",
        total,
        file_size,
        patterns.block_size()
    ));

    for (i, pattern) in patterns.iter().enumerate() {
        if ctx.cancel.is_cancelled() {
            let checkpoint = match i {
                0 => FileState::Ciphertext,
                done => FileState::Overwritten { pass: done },
            };
            ctx.progress.progress(None);
            return Err(WipeError::Cancelled { checkpoint });
        }

        overwrite_pass(medium, pattern, file_size)
            .map_err(|source| WipeError::Pass { index: i + 1, source })?;
        on_pass(i + 1);

        if let Err(e) = medium.sync() {
            log::warn!("Sync failed after pass {}: {}", i + 1, e);
            ctx.status.status(&format!("⚠️ Sync warning pass {}: {}", i + 1, e));
        }

        if (i + 1) % interval == 0 || i == 0 || i + 1 == total {
            let state = ProgressState::new(i + 1, total, start.elapsed());
            ctx.progress.progress(Some(&state));
        }
    }

    ctx.progress.progress(None);
    Ok(total)
}

/// Write `pattern` repeatedly from offset 0 until exactly `file_size` bytes
/// have gone out. The last chunk is cut to the remaining count.
pub fn overwrite_pass<M: WipeMedium + ?Sized>(
    medium: &mut M,
    pattern: &[u8],
    file_size: u64,
) -> io::Result<u64> {
    if pattern.is_empty() && file_size > 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "empty overwrite pattern",
        ));
    }

    medium.seek(SeekFrom::Start(0))?;

    let mut written = 0u64;
    while written < file_size {
        let chunk = (pattern.len() as u64).min(file_size - written) as usize;
        medium.write_all(&pattern[..chunk])?;
        written += chunk as u64;
    }
    medium.flush()?;

    Ok(written)
}
