//! Storage-type detection
//!
//! Overwriting is only meaningful on media that rewrite in place. Flash
//! devices remap writes, so anything not positively identified as
//! rotational is treated as flash and reported as advisory.

use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Rotational,
    Flash,
    Unknown,
}

impl StorageKind {
    /// Whether software overwrite guarantees should be treated as advisory
    pub fn is_advisory(&self) -> bool {
        !matches!(self, StorageKind::Rotational)
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Rotational => write!(f, "rotational disk"),
            StorageKind::Flash => write!(f, "flash storage (SSD/eMMC)"),
            StorageKind::Unknown => write!(f, "unknown storage"),
        }
    }
}

/// Parse the contents of a sysfs `queue/rotational` file
pub fn parse_rotational(contents: &str) -> Option<StorageKind> {
    match contents.trim() {
        "1" => Some(StorageKind::Rotational),
        "0" => Some(StorageKind::Flash),
        _ => None,
    }
}

/// Best-effort lookup of the device backing `path`
#[cfg(target_os = "linux")]
pub fn detect_storage(path: &Path) -> StorageKind {
    use nix::sys::stat::{major, minor, stat};

    let dev = match stat(path) {
        Ok(st) => st.st_dev,
        Err(e) => {
            log::debug!("stat({}) failed: {}", path.display(), e);
            return StorageKind::Unknown;
        }
    };

    let base = format!("/sys/dev/block/{}:{}", major(dev), minor(dev));
    // whole disks carry queue/ directly, partitions under their parent
    for candidate in ["queue/rotational", "../queue/rotational"] {
        if let Ok(contents) = std::fs::read_to_string(format!("{}/{}", base, candidate)) {
            if let Some(kind) = parse_rotational(&contents) {
                return kind;
            }
        }
    }

    StorageKind::Unknown
}

#[cfg(not(target_os = "linux"))]
pub fn detect_storage(_path: &Path) -> StorageKind {
    StorageKind::Unknown
}
