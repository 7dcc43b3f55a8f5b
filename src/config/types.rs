//! Configuration types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

use crate::common::errors::{LeaderboardError, Result};
use crate::common::types::DisplayMetadata;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Competition window and refresh cadence
    pub competition: CompetitionConfig,
    /// Selected ranking algorithm
    pub algorithm: AlgorithmConfig,
    /// Display metadata passed through to readers
    #[serde(default)]
    pub display: DisplayConfig,
    /// External service endpoints
    pub sources: SourcesConfig,
    /// Blacklisted verified identities: numeric identity id -> reason
    #[serde(default)]
    pub blacklist: HashMap<String, String>,
    /// Snapshot persistence
    #[serde(default)]
    pub snapshots: SnapshotConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on, e.g. 127.0.0.1:8000
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Grace period for in-flight work on shutdown
    #[serde(default = "default_graceful_shutdown")]
    pub graceful_shutdown_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            graceful_shutdown_seconds: default_graceful_shutdown(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_graceful_shutdown() -> u64 {
    10
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format: "text" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Install the global tracing subscriber.
    ///
    /// `RUST_LOG` wins over `level_override`, which wins over `level`.
    pub fn init(&self, level_override: Option<&str>) -> Result<()> {
        let level = level_override.unwrap_or(self.level.as_str());
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        let installed = match self.format.as_str() {
            "json" => fmt().json().with_env_filter(filter).with_target(true).try_init(),
            _ => fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_line_number(true)
                .try_init(),
        };
        installed.map_err(|e| LeaderboardError::Internal(format!("logging init failed: {}", e)))
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Competition window and refresh settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitionConfig {
    /// Competition start (RFC 3339)
    pub start_time: DateTime<Utc>,
    /// Competition end (RFC 3339)
    pub end_time: DateTime<Utc>,
    /// Delay between refresh cycles in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Timeout for each call to an external service in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Stop re-ranking once the competition has ended and the end snapshot exists
    #[serde(default)]
    pub freeze_after_end: bool,
    /// Board version reported to readers
    #[serde(default = "default_version")]
    pub version: u32,
}

fn default_poll_interval() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    10
}

fn default_version() -> u32 {
    1
}

/// Ranking algorithm selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlgorithmConfig {
    /// Registered strategy name
    #[serde(default)]
    pub name: String,
    /// Free-form strategy parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// Display metadata as it appears in the configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub default_display: String,
    #[serde(default)]
    pub default_sort: String,
    #[serde(default)]
    pub assets: Vec<String>,
}

impl From<&DisplayConfig> for DisplayMetadata {
    fn from(cfg: &DisplayConfig) -> Self {
        Self {
            description: cfg.description.clone(),
            headers: cfg.headers.clone(),
            default_display: cfg.default_display.clone(),
            default_sort: cfg.default_sort.clone(),
            assets: cfg.assets.clone(),
        }
    }
}

/// External service endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// GraphQL endpoint of the platform data node
    pub data_node_url: String,
    /// Endpoint listing verified identities
    pub verifier_url: String,
}

/// Snapshot persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Persist snapshots so restarts do not re-capture
    #[serde(default = "default_snapshots_enabled")]
    pub enabled: bool,
    /// Directory holding one file per snapshot label
    #[serde(default = "default_snapshot_dir")]
    pub directory: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            enabled: default_snapshots_enabled(),
            directory: default_snapshot_dir(),
        }
    }
}

fn default_snapshots_enabled() -> bool {
    true
}

fn default_snapshot_dir() -> String {
    "snapshots".to_string()
}

impl AppConfig {
    /// Check the configuration, reporting every problem at once
    pub fn validate(&self) -> Result<()> {
        let mut problems: Vec<String> = Vec::new();

        if self.server.listen.trim().is_empty() {
            problems.push("missing: server.listen".to_string());
        } else if self.server.listen.parse::<std::net::SocketAddr>().is_err() {
            problems.push(format!("invalid: server.listen ({})", self.server.listen));
        }
        if self.server.graceful_shutdown_seconds == 0 {
            problems.push(
                "invalid: server.graceful_shutdown_seconds (should be greater than 0)".to_string(),
            );
        }
        if self.algorithm.name.trim().is_empty() {
            problems.push("missing: algorithm.name".to_string());
        }
        if self.competition.poll_interval_seconds == 0 {
            problems.push(
                "invalid: competition.poll_interval_seconds (should be greater than 0)".to_string(),
            );
        }
        if self.competition.request_timeout_seconds == 0 {
            problems.push(
                "invalid: competition.request_timeout_seconds (should be greater than 0)"
                    .to_string(),
            );
        }
        if self.competition.start_time > self.competition.end_time {
            problems.push(format!(
                "invalid: competition window (start {} is after end {})",
                self.competition.start_time, self.competition.end_time
            ));
        }
        if url::Url::parse(&self.sources.data_node_url).is_err() {
            problems.push(format!(
                "invalid: sources.data_node_url ({})",
                self.sources.data_node_url
            ));
        }
        if url::Url::parse(&self.sources.verifier_url).is_err() {
            problems.push(format!(
                "invalid: sources.verifier_url ({})",
                self.sources.verifier_url
            ));
        }
        for key in self.blacklist.keys() {
            if key.trim().parse::<i64>().is_err() {
                problems.push(format!("invalid: blacklist entry {} (not a numeric id)", key));
            }
        }
        if self.snapshots.enabled && self.snapshots.directory.trim().is_empty() {
            problems.push("missing: snapshots.directory".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(LeaderboardError::Configuration(problems.join("; ")))
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.competition.poll_interval_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.competition.request_timeout_seconds)
    }

    pub fn graceful_shutdown(&self) -> Duration {
        Duration::from_secs(self.server.graceful_shutdown_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_config() -> AppConfig {
        AppConfig {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            competition: CompetitionConfig {
                start_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                end_time: Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap(),
                poll_interval_seconds: 30,
                request_timeout_seconds: 10,
                freeze_after_end: false,
                version: 1,
            },
            algorithm: AlgorithmConfig {
                name: "socialRegistration".to_string(),
                params: HashMap::new(),
            },
            display: DisplayConfig::default(),
            sources: SourcesConfig {
                data_node_url: "https://data-node.example.com/graphql".to_string(),
                verifier_url: "https://verifier.example.com/list".to_string(),
            },
            blacklist: HashMap::new(),
            snapshots: SnapshotConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn test_validation_reports_every_problem() {
        let mut cfg = sample_config();
        cfg.algorithm.name = String::new();
        cfg.competition.poll_interval_seconds = 0;
        cfg.sources.verifier_url = "not a url".to_string();

        let err = cfg.validate().unwrap_err();
        assert!(err.is_fatal());
        let msg = err.to_string();
        assert!(msg.contains("algorithm.name"));
        assert!(msg.contains("poll_interval_seconds"));
        assert!(msg.contains("verifier_url"));
    }

    #[test]
    fn test_start_after_end_is_rejected() {
        let mut cfg = sample_config();
        std::mem::swap(
            &mut cfg.competition.start_time,
            &mut cfg.competition.end_time,
        );
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_length_window_is_allowed() {
        let mut cfg = sample_config();
        cfg.competition.end_time = cfg.competition.start_time;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_non_numeric_blacklist_key_is_rejected() {
        let mut cfg = sample_config();
        cfg.blacklist
            .insert("house-bot".to_string(), "market maker".to_string());
        assert!(cfg.validate().is_err());
    }
}
