//! Configuration management for Zab E-Fest

pub mod loader;
mod schema;

pub use loader::{load_config, load_config_from_path, save_default_config, CONFIG_FILENAME};
pub use schema::*;
