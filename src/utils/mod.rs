//! Utilities - logging and platform probes
pub mod logging;
pub mod platform;

pub use platform::{StorageKind, detect_storage};
