//! Status and progress sinks
//!
//! The pipeline only ever writes to these. Status is an append-only ordered
//! stream; progress is a single latest-value slot.

use std::fmt;
use std::sync::Mutex;
use std::sync::mpsc::Sender;
use std::time::Duration;

/// Snapshot of overwrite progress, recomputed on every update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressState {
    /// 1-based index of the last completed pass
    pub pass: usize,
    pub total_passes: usize,
    pub elapsed: Duration,
    pub remaining: Duration,
}

impl ProgressState {
    /// ETA = elapsed * total / completed
    pub fn new(pass: usize, total_passes: usize, elapsed: Duration) -> Self {
        let estimated_total = if pass == 0 {
            Duration::ZERO
        } else {
            let total = u32::try_from(total_passes).unwrap_or(u32::MAX);
            let done = u32::try_from(pass).unwrap_or(u32::MAX);
            elapsed.saturating_mul(total) / done
        };

        Self {
            pass,
            total_passes,
            elapsed,
            remaining: estimated_total.saturating_sub(elapsed),
        }
    }

    pub fn percent(&self) -> usize {
        if self.total_passes == 0 {
            return 100;
        }
        self.pass * 100 / self.total_passes
    }
}

impl fmt::Display for ProgressState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "🔄 Progress: {}% (Pass {}/{}) Elapsed: {}s Remaining: ~{}s",
            self.percent(),
            self.pass,
            self.total_passes,
            self.elapsed.as_secs(),
            self.remaining.as_secs()
        )
    }
}

/// Append-only stream of status lines
pub trait StatusSink: Send + Sync {
    fn status(&self, line: &str);
}

/// Latest-value-wins progress slot. `None` clears it.
pub trait ProgressSink: Send + Sync {
    fn progress(&self, update: Option<&ProgressState>);
}

/// Event delivered from a background wipe to its consumer
#[derive(Debug, Clone, PartialEq)]
pub enum WipeEvent {
    Status(String),
    Progress(ProgressState),
    ProgressCleared,
}

/// Forwards every update over an mpsc channel, preserving order.
/// A disconnected receiver is ignored; the wipe keeps going.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<WipeEvent>,
}

impl ChannelSink {
    pub fn new(tx: Sender<WipeEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: WipeEvent) {
        if self.tx.send(event).is_err() {
            log::debug!("Wipe event receiver dropped");
        }
    }
}

impl StatusSink for ChannelSink {
    fn status(&self, line: &str) {
        self.send(WipeEvent::Status(line.to_string()));
    }
}

impl ProgressSink for ChannelSink {
    fn progress(&self, update: Option<&ProgressState>) {
        match update {
            Some(state) => self.send(WipeEvent::Progress(*state)),
            None => self.send(WipeEvent::ProgressCleared),
        }
    }
}

/// Sends status to `log::info!` and progress to `log::debug!`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl StatusSink for LogSink {
    fn status(&self, line: &str) {
        log::info!("{}", line);
    }
}

impl ProgressSink for LogSink {
    fn progress(&self, update: Option<&ProgressState>) {
        if let Some(state) = update {
            log::debug!("{}", state);
        }
    }
}

/// Keeps everything in memory; handy for embedding and tests
#[derive(Debug, Default)]
pub struct CollectingSink {
    lines: Mutex<Vec<String>>,
    latest: Mutex<Option<ProgressState>>,
    updates: Mutex<usize>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn latest(&self) -> Option<ProgressState> {
        self.latest.lock().ok().and_then(|p| *p)
    }

    /// Number of progress updates received, clears excluded
    pub fn progress_updates(&self) -> usize {
        self.updates.lock().map(|n| *n).unwrap_or(0)
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }
}

impl StatusSink for CollectingSink {
    fn status(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

impl ProgressSink for CollectingSink {
    fn progress(&self, update: Option<&ProgressState>) {
        if let Ok(mut latest) = self.latest.lock() {
            *latest = update.copied();
        }
        if update.is_some() {
            if let Ok(mut n) = self.updates.lock() {
                *n += 1;
            }
        }
    }
}
