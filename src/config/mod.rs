//! Configuration module - load and validate wipe policy
pub mod loader;
pub mod schema;

pub use loader::{default_config_path, load_config};
pub use schema::WipeConfig;
