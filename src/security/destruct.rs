//! Secure removal: rename chain, truncate, unlink with fallback
//!
//! Process:
//! 1. Rename up to N times (`<path>.wipe0`, `.wipe1`, ...), stopping at the
//!    first failure. An occupied sibling name counts as a failure; the
//!    chain never replaces a file it did not create.
//! 2. Truncate whatever path was reached (advisory)
//! 3. Unlink it; if that fails after at least one rename, unlink the
//!    original path instead. Only a double failure is fatal.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Result, WipeError};
use crate::execution::StatusSink;
use crate::security::fs_ops::FsOps;
use crate::security::target::{FileState, FileTarget};

/// Default rename-chain length
pub const DEFAULT_RENAME_ATTEMPTS: usize = 3;

/// Outcome of a successful removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalReport {
    /// Path whose unlink succeeded
    pub removed_path: PathBuf,
    /// Number of renames that succeeded
    pub renames: usize,
    pub truncated: bool,
}

/// `<path>.wipe<index>`
pub fn wipe_sibling(path: &Path, index: usize) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(format!(".wipe{}", index));
    PathBuf::from(name)
}

pub fn secure_remove(
    target: &mut FileTarget,
    rename_attempts: usize,
    fs: &dyn FsOps,
    status: &dyn StatusSink,
) -> Result<RemovalReport> {
    status.status("🔒 Performing final secure removal...");

    let original = target.path.clone();
    let mut active = original.clone();
    let mut renames = 0;
    target.advance(FileState::Renamed(0));

    for i in 0..rename_attempts {
        let next = wipe_sibling(&original, i);
        if fs.exists(&next) {
            log::warn!("Rename attempt {} skipped: {} already exists", i + 1, next.display());
            status.status(&format!(
                "⚠️ Rename attempt {} failed: {} already exists",
                i + 1,
                next.display()
            ));
            break;
        }
        if let Err(e) = fs.rename(&active, &next) {
            log::warn!("Rename attempt {} failed: {}", i + 1, e);
            status.status(&format!("⚠️ Rename attempt {} failed: {}", i + 1, e));
            break;
        }
        active = next;
        renames += 1;
        target.advance(FileState::Renamed(renames));
    }

    let truncated = match fs.truncate(&active) {
        Ok(()) => {
            target.advance(FileState::Truncated);
            true
        }
        Err(e) => {
            log::warn!("Truncation of {} failed: {}", active.display(), e);
            status.status(&format!("⚠️ Truncation failed: {}", e));
            false
        }
    };

    let removed_path = match fs.remove_file(&active) {
        Ok(()) => active,
        Err(e) if active != original => {
            log::warn!("Unlink of {} failed: {}, trying original path", active.display(), e);
            match fs.remove_file(&original) {
                Ok(()) => {
                    status.status("✅ Removed original file after rename failure");
                    original
                }
                Err(_) => {
                    return Err(WipeError::Removal {
                        path: active,
                        source: e,
                    });
                }
            }
        }
        Err(e) => {
            return Err(WipeError::Removal {
                path: active,
                source: e,
            });
        }
    };

    target.advance(FileState::Removed);
    Ok(RemovalReport {
        removed_path,
        renames,
        truncated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::CollectingSink;
    use crate::security::fs_ops::OsFs;
    use std::fs;
    use std::io;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Fake filesystem: fails the Nth rename, the listed unlink targets and
    /// optionally truncation. Records unlink attempts.
    #[derive(Default)]
    struct FakeFs {
        fail_rename_at: Option<usize>,
        fail_unlink: Vec<PathBuf>,
        fail_truncate: bool,
        renames: Mutex<usize>,
        unlinks: Mutex<Vec<PathBuf>>,
    }

    impl FsOps for FakeFs {
        fn rename(&self, _from: &Path, _to: &Path) -> io::Result<()> {
            let mut n = self.renames.lock().unwrap();
            *n += 1;
            if self.fail_rename_at == Some(*n) {
                return Err(io::Error::other("cross-device link"));
            }
            Ok(())
        }

        fn truncate(&self, _path: &Path) -> io::Result<()> {
            if self.fail_truncate {
                Err(io::Error::other("permission denied"))
            } else {
                Ok(())
            }
        }

        fn remove_file(&self, path: &Path) -> io::Result<()> {
            self.unlinks.lock().unwrap().push(path.to_path_buf());
            if self.fail_unlink.iter().any(|p| p == path) {
                Err(io::Error::other("busy"))
            } else {
                Ok(())
            }
        }

        fn set_times(&self, _: &Path, _: std::time::SystemTime) -> io::Result<()> {
            Ok(())
        }
    }

    fn target_at(dir: &Path) -> FileTarget {
        let path = dir.join("doc.txt");
        fs::write(&path, b"ciphertext").unwrap();
        FileTarget::open(&path).unwrap()
    }

    #[test]
    fn test_wipe_sibling_name() {
        assert_eq!(
            wipe_sibling(Path::new("/data/a.txt"), 2),
            PathBuf::from("/data/a.txt.wipe2")
        );
    }

    #[test]
    fn test_all_renames_unlink_last_sibling() {
        let dir = tempdir().unwrap();
        let mut target = target_at(dir.path());
        let fs = FakeFs::default();

        let report = secure_remove(&mut target, 3, &fs, &CollectingSink::new()).unwrap();
        assert_eq!(report.renames, 3);
        assert_eq!(report.removed_path, wipe_sibling(&target.path, 2));
        assert_eq!(*fs.unlinks.lock().unwrap(), vec![wipe_sibling(&target.path, 2)]);
        assert_eq!(target.state(), FileState::Removed);
    }

    #[test]
    fn test_first_rename_failure_unlinks_original() {
        let dir = tempdir().unwrap();
        let mut target = target_at(dir.path());
        let fs = FakeFs {
            fail_rename_at: Some(1),
            ..FakeFs::default()
        };
        let sink = CollectingSink::new();

        let report = secure_remove(&mut target, 3, &fs, &sink).unwrap();
        assert_eq!(report.renames, 0);
        assert_eq!(report.removed_path, target.path);
        assert_eq!(*fs.renames.lock().unwrap(), 1);
        assert!(sink.contains("Rename attempt 1 failed"));
    }

    #[test]
    fn test_rename_chain_stops_at_first_failure() {
        let dir = tempdir().unwrap();
        let mut target = target_at(dir.path());
        let fs = FakeFs {
            fail_rename_at: Some(2),
            ..FakeFs::default()
        };

        let report = secure_remove(&mut target, 3, &fs, &CollectingSink::new()).unwrap();
        assert_eq!(report.renames, 1);
        assert_eq!(report.removed_path, wipe_sibling(&target.path, 0));
        assert_eq!(*fs.renames.lock().unwrap(), 2);
    }

    #[test]
    fn test_unlink_fallback_to_original() {
        let dir = tempdir().unwrap();
        let mut target = target_at(dir.path());
        let last = wipe_sibling(&target.path, 2);
        let fs = FakeFs {
            fail_unlink: vec![last.clone()],
            ..FakeFs::default()
        };
        let sink = CollectingSink::new();

        let report = secure_remove(&mut target, 3, &fs, &sink).unwrap();
        assert_eq!(report.removed_path, target.path);
        assert_eq!(*fs.unlinks.lock().unwrap(), vec![last, target.path.clone()]);
        assert!(sink.contains("Removed original file"));
    }

    #[test]
    fn test_both_unlinks_fail() {
        let dir = tempdir().unwrap();
        let mut target = target_at(dir.path());
        let last = wipe_sibling(&target.path, 2);
        let fs = FakeFs {
            fail_unlink: vec![last.clone(), target.path.clone()],
            ..FakeFs::default()
        };

        let err = secure_remove(&mut target, 3, &fs, &CollectingSink::new()).unwrap_err();
        assert!(matches!(err, WipeError::Removal { ref path, .. } if *path == last));
        assert_ne!(target.state(), FileState::Removed);
    }

    #[test]
    fn test_no_fallback_without_rename() {
        let dir = tempdir().unwrap();
        let mut target = target_at(dir.path());
        let fs = FakeFs {
            fail_rename_at: Some(1),
            fail_unlink: vec![target.path.clone()],
            ..FakeFs::default()
        };

        assert!(secure_remove(&mut target, 3, &fs, &CollectingSink::new()).is_err());
        assert_eq!(fs.unlinks.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_truncate_failure_is_advisory() {
        let dir = tempdir().unwrap();
        let mut target = target_at(dir.path());
        let fs = FakeFs {
            fail_truncate: true,
            ..FakeFs::default()
        };
        let sink = CollectingSink::new();

        let report = secure_remove(&mut target, 3, &fs, &sink).unwrap();
        assert!(!report.truncated);
        assert!(sink.contains("Truncation failed"));
    }

    #[test]
    fn test_existing_sibling_is_never_replaced() {
        let dir = tempdir().unwrap();
        let mut target = target_at(dir.path());
        let bystander = wipe_sibling(&target.path, 0);
        fs::write(&bystander, b"unrelated user data").unwrap();
        let sink = CollectingSink::new();

        let report = secure_remove(&mut target, 3, &OsFs, &sink).unwrap();

        assert_eq!(report.renames, 0);
        assert_eq!(report.removed_path, target.path);
        assert!(!target.path.exists());
        assert_eq!(fs::read(&bystander).unwrap(), b"unrelated user data");
        assert!(sink.contains("already exists"));
    }

    #[test]
    fn test_chain_stops_before_occupied_sibling() {
        let dir = tempdir().unwrap();
        let mut target = target_at(dir.path());
        let bystander = wipe_sibling(&target.path, 1);
        fs::write(&bystander, b"keep me").unwrap();

        let report = secure_remove(&mut target, 3, &OsFs, &CollectingSink::new()).unwrap();

        assert_eq!(report.renames, 1);
        assert_eq!(report.removed_path, wipe_sibling(&target.path, 0));
        assert!(!report.removed_path.exists());
        assert_eq!(fs::read(&bystander).unwrap(), b"keep me");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_state_tracks_each_rename() {
        let dir = tempdir().unwrap();
        let mut target = target_at(dir.path());
        let fs = FakeFs {
            fail_rename_at: Some(3),
            fail_unlink: vec![wipe_sibling(&target.path, 1), target.path.clone()],
            ..FakeFs::default()
        };

        assert!(secure_remove(&mut target, 3, &fs, &CollectingSink::new()).is_err());
        assert_eq!(target.state(), FileState::Truncated);

        let mut target = target_at(dir.path());
        let fs = FakeFs {
            fail_rename_at: Some(3),
            fail_truncate: true,
            fail_unlink: vec![wipe_sibling(&target.path, 1), target.path.clone()],
            ..FakeFs::default()
        };
        assert!(secure_remove(&mut target, 3, &fs, &CollectingSink::new()).is_err());
        assert_eq!(target.state(), FileState::Renamed(2));
    }

    #[test]
    fn test_real_removal_leaves_nothing() {
        let dir = tempdir().unwrap();
        let mut target = target_at(dir.path());

        secure_remove(&mut target, 3, &OsFs, &CollectingSink::new()).unwrap();

        assert!(!target.path.exists());
        for i in 0..3 {
            assert!(!wipe_sibling(&target.path, i).exists());
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
