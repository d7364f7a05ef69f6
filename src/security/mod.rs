//! Security module - key vault, encryption, overwrite and removal stages
pub mod destruct;
pub mod encrypt;
pub mod free_space;
pub mod fs_ops;
pub mod overwrite;
pub mod patterns;
pub mod scrub;
pub mod target;
pub mod vault;

pub use destruct::{RemovalReport, secure_remove, wipe_sibling};
pub use encrypt::encrypt_in_place;
pub use free_space::{FreeSpaceWiper, NoopFreeSpaceWiper};
pub use fs_ops::{FsOps, OsFs};
pub use overwrite::{PassContext, WipeMedium, execute_passes};
pub use patterns::{PATTERN_COUNT, WipePatterns, generate_patterns};
pub use scrub::randomize_timestamps;
pub use target::{FileState, FileTarget};
pub use vault::SecureKey;
