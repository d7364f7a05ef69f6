//! kc-wipe - irreversible destruction of a single file
//!
//! The file is encrypted in place under a throwaway key, overwritten with
//! the 35-pass Gutmann sequence, has its timestamps scrambled, and is then
//! removed through a rename/truncate/unlink chain that tolerates partial
//! failure.
//!
//! ```no_run
//! kc_wipe::wipe("/tmp/secret.txt")?;
//! # Ok::<(), kc_wipe::WipeError>(())
//! ```
//!
//! Overwriting is advisory on flash media: wear levelling may keep copies
//! of earlier blocks that no software pass can reach.

pub mod config;
pub mod error;
pub mod execution;
pub mod security;
pub mod utils;

pub use config::{WipeConfig, load_config};
pub use error::{Stage, WipeError};
pub use execution::{
    CancelToken, ProgressState, WipeEvent, WipeHandle, WipeReport, Wiper, spawn_wipe, wipe,
};
pub use security::FileState;
