//! Configuration loading and validation

pub mod loader;
pub mod types;

pub use loader::{config_file_exists, load_config};
pub use types::AppConfig;
