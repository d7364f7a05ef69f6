//! Background execution
//!
//! The pipeline runs on a dedicated worker thread. Status and progress come
//! back over an mpsc channel in generation order, so the consumer never has
//! its state touched by the worker.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use crate::error::{Result, Stage, WipeError};
use crate::execution::cancel::CancelToken;
use crate::execution::pipeline::{WipeReport, Wiper};
use crate::execution::sink::{ChannelSink, WipeEvent};

/// A wipe running in the background
pub struct WipeHandle {
    events: Receiver<WipeEvent>,
    cancel: CancelToken,
    worker: JoinHandle<Result<WipeReport>>,
}

impl WipeHandle {
    /// Ordered event stream; disconnects when the worker finishes
    pub fn events(&self) -> &Receiver<WipeEvent> {
        &self.events
    }

    /// Ask the worker to stop at its next checkpoint
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Wait for the worker and return its outcome
    pub fn join(self) -> Result<WipeReport> {
        self.worker.join().map_err(|_| WipeError::WorkerPanicked)?
    }
}

/// Start wiping `path` on a new worker thread
pub fn spawn_wipe(wiper: Wiper, path: PathBuf) -> Result<WipeHandle> {
    let (tx, rx) = mpsc::channel();
    let cancel = wiper.cancel_token();

    let worker = thread::Builder::new()
        .name("kc-wipe-worker".to_string())
        .spawn(move || {
            let sink = ChannelSink::new(tx);
            wiper.wipe(&path, &sink, &sink)
        })
        .map_err(|e| WipeError::io(Stage::Worker, e))?;

    Ok(WipeHandle {
        events: rx,
        cancel,
        worker,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WipeConfig;
    use crate::security::FileState;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_background_wipe_streams_events() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bg.txt");
        fs::write(&path, b"abcdefghij").unwrap();

        let wiper = Wiper::new(WipeConfig {
            block_size: 16,
            ..WipeConfig::default()
        });
        let handle = spawn_wipe(wiper, path.clone()).unwrap();

        let events: Vec<WipeEvent> = handle.events().iter().collect();
        let report = handle.join().unwrap();

        assert!(!path.exists());
        assert_eq!(report.original_path, path);

        assert!(matches!(events.first(), Some(WipeEvent::Status(s)) if s.contains("Starting")));
        assert!(matches!(events.last(), Some(WipeEvent::Status(s)) if s.contains("completed")));
        assert!(events.iter().any(|e| matches!(e, WipeEvent::Progress(p) if p.pass == 35)));
        assert!(events.contains(&WipeEvent::ProgressCleared));
    }

    #[test]
    fn test_cancelled_before_start() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stay.txt");
        fs::write(&path, b"untouched").unwrap();

        let wiper = Wiper::default();
        wiper.cancel_token().cancel();
        let handle = spawn_wipe(wiper, path.clone()).unwrap();

        let err = handle.join().unwrap_err();
        assert!(matches!(
            err,
            WipeError::Cancelled { checkpoint: FileState::Plaintext }
        ));
        assert_eq!(fs::read(&path).unwrap(), b"untouched");
    }
}
