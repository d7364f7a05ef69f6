//! Configuration loader
use std::fs;
use std::path::{Path, PathBuf};

use super::schema::WipeConfig;
use crate::error::{Result, WipeError};

/// `<executable>.config`, next to the running binary
pub fn default_config_path() -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    Some(PathBuf::from(format!("{}.config", exe_path.display())))
}

/// Load configuration.
///
/// An explicit `path` must exist and parse. Without one, the adjacent
/// `<executable>.config` is used when present, otherwise defaults apply.
pub fn load_config(path: Option<&Path>) -> Result<WipeConfig> {
    let config = match path {
        Some(path) => read_config(path)?,
        None => match default_config_path() {
            Some(adjacent) if adjacent.exists() => read_config(&adjacent)?,
            _ => WipeConfig::default(),
        },
    };

    config.validate().map_err(WipeError::Config)?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<WipeConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        WipeError::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    serde_json::from_str(&content)
        .map_err(|e| WipeError::Config(format!("Failed to parse config: {}", e)))
}
