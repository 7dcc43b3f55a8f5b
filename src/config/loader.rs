//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::AppConfig;
use crate::common::errors::{LeaderboardError, Result};

/// Environment variable prefix, e.g. `LEADERBOARD__ALGORITHM__NAME`
pub const ENV_PREFIX: &str = "LEADERBOARD";

/// Whether `path` names a configuration file `load_config` will read
pub fn config_file_exists(path: &str) -> bool {
    Path::new(path).is_file()
}

/// Load configuration from file and environment variables, then validate it
///
/// A missing file is not an error; the caller reports it once logging is up.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with LEADERBOARD__)
/// 2. Configuration file (TOML format)
/// 3. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let mut builder = Config::builder();

    if let Some(path) = config_path.filter(|p| config_file_exists(p)) {
        builder = builder.add_source(File::with_name(path).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| LeaderboardError::Configuration(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| LeaderboardError::Configuration(e.to_string()))?;

    app_config.validate()?;
    Ok(app_config)
}
