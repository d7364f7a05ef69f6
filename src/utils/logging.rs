//! Minimal stderr logger behind the `log` facade

use log::{Level, LevelFilter, Log, Metadata, Record};

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let tag = match record.level() {
            Level::Error => "❌",
            Level::Warn => "⚠️ ",
            Level::Info => "ℹ️ ",
            Level::Debug | Level::Trace => "🔍",
        };
        eprintln!("{} {}", tag, record.args());
    }

    fn flush(&self) {}
}

/// Map a config `log_level` string to a filter
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.to_lowercase().as_str() {
        "trace" => Some(LevelFilter::Trace),
        "debug" => Some(LevelFilter::Debug),
        "info" => Some(LevelFilter::Info),
        "warn" => Some(LevelFilter::Warn),
        "error" => Some(LevelFilter::Error),
        "none" | "off" => Some(LevelFilter::Off),
        _ => None,
    }
}

/// Install the stderr logger. Calling it again only adjusts the level.
pub fn init(level: &str) {
    let filter = parse_level(level).unwrap_or(LevelFilter::Info);
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(filter);
}
