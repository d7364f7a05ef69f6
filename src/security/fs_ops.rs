//! Filesystem operations used by the finalize stages
//!
//! Routed through a trait so tests can inject failures into individual
//! renames, unlinks and timestamp updates.

use std::fs::{self, FileTimes, OpenOptions};
use std::io;
use std::path::Path;
use std::time::SystemTime;

pub trait FsOps: Send + Sync {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Whether anything (file, dir or dangling link) sits at `path`
    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    /// Open for write, truncate to zero length, close
    fn truncate(&self, path: &Path) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Set both access and modification time
    fn set_times(&self, path: &Path, time: SystemTime) -> io::Result<()>;
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl FsOps for OsFs {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn truncate(&self, path: &Path) -> io::Result<()> {
        let file = OpenOptions::new().write(true).truncate(true).open(path)?;
        file.sync_all()
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn set_times(&self, path: &Path, time: SystemTime) -> io::Result<()> {
        let file = OpenOptions::new().write(true).open(path)?;
        file.set_times(FileTimes::new().set_accessed(time).set_modified(time))
    }
}
