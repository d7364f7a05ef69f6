//! Execution module - orchestration, background worker and reporting
pub mod async_mode;
pub mod cancel;
pub mod pipeline;
pub mod sink;

pub use async_mode::{WipeHandle, spawn_wipe};
pub use cancel::CancelToken;
pub use pipeline::{WipeReport, Wiper, wipe};
pub use sink::{
    ChannelSink, CollectingSink, LogSink, ProgressSink, ProgressState, StatusSink, WipeEvent,
};
