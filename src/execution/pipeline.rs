//! Wipe orchestrator
//!
//! Flow:
//! 1. Validate the target and draw a key (nothing touched yet)
//! 2. Encrypt in place
//! 3. 35 overwrite passes
//! 4. Timestamp scrub and free-space wipe (advisory)
//! 5. Rename / truncate / unlink
//!
//! Fatal errors stop the run at once and are returned with their stage.
//! Everything advisory goes to the status stream.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::WipeConfig;
use crate::error::{Result, Stage, WipeError};
use crate::execution::cancel::CancelToken;
use crate::execution::sink::{LogSink, ProgressSink, StatusSink};
use crate::security::{
    FileState, FileTarget, FreeSpaceWiper, FsOps, NoopFreeSpaceWiper, OsFs, PassContext,
    SecureKey, encrypt_in_place, execute_passes, generate_patterns, randomize_timestamps,
    secure_remove,
};
use crate::utils::detect_storage;

/// Summary of a completed wipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WipeReport {
    pub original_path: PathBuf,
    /// Path whose unlink finished the job
    pub removed_path: PathBuf,
    /// Plaintext size before encryption
    pub bytes: u64,
    pub passes: usize,
    pub renames: usize,
    pub elapsed: Duration,
}

/// Runs the full destruction pipeline for one file at a time
#[derive(Clone)]
pub struct Wiper {
    config: WipeConfig,
    fs: Arc<dyn FsOps>,
    free_space: Arc<dyn FreeSpaceWiper>,
    cancel: CancelToken,
}

impl Default for Wiper {
    fn default() -> Self {
        Self::new(WipeConfig::default())
    }
}

impl Wiper {
    pub fn new(config: WipeConfig) -> Self {
        Self {
            config,
            fs: Arc::new(OsFs),
            free_space: Arc::new(NoopFreeSpaceWiper),
            cancel: CancelToken::new(),
        }
    }

    /// Swap the filesystem used by the finalize stages
    pub fn with_fs(mut self, fs: Arc<dyn FsOps>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_free_space_wiper(mut self, wiper: Arc<dyn FreeSpaceWiper>) -> Self {
        self.free_space = wiper;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &WipeConfig {
        &self.config
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Destroy the file at `path`, reporting through the given sinks
    pub fn wipe(
        &self,
        path: &Path,
        status: &dyn StatusSink,
        progress: &dyn ProgressSink,
    ) -> Result<WipeReport> {
        let result = self.run(path, status, progress);
        if let Err(e) = &result {
            log::error!("Wipe of {} failed during {}: {}", path.display(), e.stage(), e);
            status.status(&format!("❌ Aborted during {}: {}", e.stage(), e));
        }
        result
    }

    fn run(
        &self,
        path: &Path,
        status: &dyn StatusSink,
        progress: &dyn ProgressSink,
    ) -> Result<WipeReport> {
        let start = Instant::now();
        self.config.validate().map_err(WipeError::Config)?;

        let mut target = FileTarget::open(path)?;
        let original_size = target.size;
        status.status(&format!("⏰ Starting secure deletion at: {}", timestamp_now()));
        status.status(&format!("🚀 Starting advanced secure deletion for: {}", path.display()));

        let storage = detect_storage(path);
        if storage.is_advisory() {
            status.status(&format!("⚠️ Target is on {}", storage));
            status.status("⚠️ Software wiping has limited effectiveness on flash media");
        }

        if self.cancel.is_cancelled() {
            return Err(target.cancelled());
        }

        // key exists before any mutation; dropped (zeroized) on every exit
        let mut key = SecureKey::generate()?;

        encrypt_in_place(&mut target, &key, status)?;
        key.destroy();

        let passes = self.overwrite(&mut target, status, progress)?;

        let scrubbed = randomize_timestamps(
            &target.path,
            self.config.metadata_attempts,
            &*self.fs,
            status,
        );
        if let Err(e) = scrubbed {
            if self.config.strict_metadata {
                return Err(e);
            }
            log::warn!("Metadata wiping failed: {}", e);
            status.status(&format!("⚠️ Metadata wiping failed: {}", e));
        }

        let dir = target.path.parent().map(Path::to_path_buf).unwrap_or_default();
        status.status(&format!("🗑️ Wiping free space ({})", self.free_space.name()));
        if let Err(e) = self.free_space.wipe_free_space(&dir, status) {
            log::warn!("Free-space wiping failed: {}", e);
            status.status(&format!("⚠️ Free-space wiping failed: {}", e));
        }
        target.advance(FileState::Scrubbed);

        if self.cancel.is_cancelled() {
            return Err(target.cancelled());
        }

        let removal = secure_remove(&mut target, self.config.rename_attempts, &*self.fs, status)?;

        let elapsed = start.elapsed();
        status.status("✅ Advanced secure deletion completed!");
        status.status(&format!("✅ Secure deletion completed in: {}ms", elapsed.as_millis()));
        status.status(&format!("⏰ Finished at: {}", timestamp_now()));
        if storage.is_advisory() {
            status.status("⚠️ IMPORTANT: On flash storage (SSD/eMMC), physical destruction");
            status.status("⚠️ is the only 100% secure method against determined adversaries!");
        }

        Ok(WipeReport {
            original_path: path.to_path_buf(),
            removed_path: removal.removed_path,
            bytes: original_size,
            passes,
            renames: removal.renames,
            elapsed,
        })
    }

    fn overwrite(
        &self,
        target: &mut FileTarget,
        status: &dyn StatusSink,
        progress: &dyn ProgressSink,
    ) -> Result<usize> {
        let mut file = OpenOptions::new()
            .write(true)
            .open(&target.path)
            .map_err(|e| WipeError::io(Stage::Overwrite, e))?;
        let file_size = file
            .metadata()
            .map_err(|e| WipeError::io(Stage::Overwrite, e))?
            .len();

        status.status(&format!("📊 File size: {} bytes", file_size));

        let patterns = generate_patterns(self.config.block_size, &mut rand::rng());
        let ctx = PassContext {
            progress_interval: self.config.progress_interval,
            status,
            progress,
            cancel: &self.cancel,
        };

        let passes = execute_passes(&mut file, &patterns, file_size, &ctx, |done| {
            target.advance(FileState::Overwritten { pass: done })
        })?;
        target.advance(FileState::Overwritten { pass: passes });
        Ok(passes)
    }
}

fn timestamp_now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Wipe `path` with default policy, reporting through `log`
pub fn wipe(path: impl AsRef<Path>) -> Result<()> {
    Wiper::default()
        .wipe(path.as_ref(), &LogSink, &LogSink)
        .map(|_| ())
}
