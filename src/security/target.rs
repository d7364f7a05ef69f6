//! File target and its one-way state machine

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{Result, Stage, WipeError};
use crate::security::patterns::PATTERN_COUNT;

/// Where a target file is in the destruction sequence.
///
/// Variants are declared in pipeline order, so `Ord` matches progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileState {
    Plaintext,
    Ciphertext,
    /// Passes `1..=pass` have fully completed.
    Overwritten { pass: usize },
    /// Timestamp scrub and free-space wipe have run (advisory or not).
    Scrubbed,
    /// Number of successful renames (0..=3 by default).
    Renamed(usize),
    Truncated,
    Removed,
}

impl FileState {
    /// The stage that would have run next from this checkpoint.
    pub fn next_stage(&self) -> Stage {
        match self {
            FileState::Plaintext => Stage::Encrypt,
            FileState::Ciphertext => Stage::Overwrite,
            FileState::Overwritten { pass } if *pass < PATTERN_COUNT => Stage::Overwrite,
            FileState::Overwritten { .. } => Stage::Metadata,
            FileState::Scrubbed
            | FileState::Renamed(_) | FileState::Truncated | FileState::Removed => Stage::Remove,
        }
    }
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileState::Plaintext => write!(f, "plaintext"),
            FileState::Ciphertext => write!(f, "ciphertext"),
            FileState::Overwritten { pass } => write!(f, "ciphertext+pass {}", pass),
            FileState::Scrubbed => write!(f, "scrubbed"),
            FileState::Renamed(n) => write!(f, "renamed({})", n),
            FileState::Truncated => write!(f, "truncated"),
            FileState::Removed => write!(f, "removed"),
        }
    }
}

/// A single regular file being destroyed.
#[derive(Debug, Clone)]
pub struct FileTarget {
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<SystemTime>,
    pub accessed: Option<SystemTime>,
    state: FileState,
}

impl FileTarget {
    /// Stat `path` and make sure it is an existing regular file.
    /// Symlinks are refused so the wipe never lands on the link target.
    pub fn open(path: &Path) -> Result<Self> {
        let meta = fs::symlink_metadata(path).map_err(|e| {
            WipeError::InvalidTarget(format!("{}: {}", path.display(), e))
        })?;

        if !meta.file_type().is_file() {
            return Err(WipeError::InvalidTarget(format!(
                "{} is not a regular file",
                path.display()
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
            size: meta.len(),
            modified: meta.modified().ok(),
            accessed: meta.accessed().ok(),
            state: FileState::Plaintext,
        })
    }

    pub fn state(&self) -> FileState {
        self.state
    }

    /// Move forward to `next`. States never go backwards.
    pub fn advance(&mut self, next: FileState) {
        debug_assert!(next >= self.state, "{} -> {} goes backwards", self.state, next);
        log::debug!("{}: {} -> {}", self.path.display(), self.state, next);
        self.state = next;
    }

    /// Build a cancellation error at the current checkpoint.
    pub fn cancelled(&self) -> WipeError {
        WipeError::Cancelled {
            checkpoint: self.state,
        }
    }
}
