//! Error types for the wipe pipeline
//!
//! Every fatal condition surfaces as exactly one `WipeError`. Advisory
//! failures (sync warnings, timestamp attempts, free-space, rename,
//! truncate) never become errors; they go to the status stream instead.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::security::FileState;

/// Pipeline stage in which an error was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Prepare,
    KeyGeneration,
    Encrypt,
    Overwrite,
    Metadata,
    FreeSpace,
    Remove,
    Worker,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Prepare => "prepare",
            Stage::KeyGeneration => "key generation",
            Stage::Encrypt => "encryption",
            Stage::Overwrite => "overwrite",
            Stage::Metadata => "metadata",
            Stage::FreeSpace => "free-space",
            Stage::Remove => "removal",
            Stage::Worker => "worker",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum WipeError {
    /// Secure random source failed while drawing key material.
    /// Raised before any file mutation.
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    /// Cipher construction, nonce generation or sealing failed.
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Read/write failure outside of an overwrite pass.
    #[error("I/O error during {stage}: {source}")]
    Io {
        stage: Stage,
        #[source]
        source: io::Error,
    },

    /// Write failure during overwrite pass `index` (1-based).
    /// The file holds the pattern of pass `index - 1`.
    #[error("Pass {index} failed: {source}")]
    Pass {
        index: usize,
        #[source]
        source: io::Error,
    },

    /// Final "now" timestamp assignment failed.
    #[error("Final timestamp assignment failed: {0}")]
    Timestamp(#[source] io::Error),

    /// Both unlink attempts failed; the content-wiped file is still on disk.
    #[error("Final removal of {} failed: {source}", .path.display())]
    Removal {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Cancellation was requested; the file stopped at `checkpoint`.
    #[error("Wipe cancelled at checkpoint: {checkpoint}")]
    Cancelled { checkpoint: FileState },

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Wipe worker terminated unexpectedly")]
    WorkerPanicked,
}

impl WipeError {
    /// Wraps an I/O error raised in `stage`.
    pub fn io(stage: Stage, source: io::Error) -> Self {
        WipeError::Io { stage, source }
    }

    /// The stage that produced this error.
    pub fn stage(&self) -> Stage {
        match self {
            WipeError::KeyGeneration(_) => Stage::KeyGeneration,
            WipeError::Encryption(_) => Stage::Encrypt,
            WipeError::Io { stage, .. } => *stage,
            WipeError::Pass { .. } => Stage::Overwrite,
            WipeError::Timestamp(_) => Stage::Metadata,
            WipeError::Removal { .. } => Stage::Remove,
            WipeError::Cancelled { checkpoint } => checkpoint.next_stage(),
            WipeError::InvalidTarget(_) | WipeError::Config(_) => Stage::Prepare,
            WipeError::WorkerPanicked => Stage::Worker,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, WipeError::Cancelled { .. })
    }
}

pub type Result<T> = std::result::Result<T, WipeError>;
