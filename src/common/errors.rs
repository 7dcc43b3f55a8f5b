//! Error types for the leaderboard service

use thiserror::Error;

/// Result type alias using our LeaderboardError
pub type Result<T> = std::result::Result<T, LeaderboardError>;

/// Main error type for the leaderboard service
#[derive(Error, Debug)]
pub enum LeaderboardError {
    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// CSV rendering errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem errors (snapshot persistence)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid response from an external service
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Algorithm name not present in the strategy registry
    #[error("Unknown ranking algorithm: {0}")]
    UnknownStrategy(String),

    /// Timeout errors
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// A ranking strategy failed to produce a result
    #[error("Strategy error: {0}")]
    Strategy(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LeaderboardError {
    /// Whether this error must stop the process from serving.
    ///
    /// Configuration problems are detected once at startup; everything
    /// else is a transient dependency failure the refresh loop rides out.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LeaderboardError::Configuration(_) | LeaderboardError::UnknownStrategy(_)
        )
    }
}

impl From<tokio::time::error::Elapsed> for LeaderboardError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        LeaderboardError::Timeout(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(LeaderboardError::Configuration("missing: algorithm".into()).is_fatal());
        assert!(LeaderboardError::UnknownStrategy("nope".into()).is_fatal());
        assert!(!LeaderboardError::Timeout("verifier".into()).is_fatal());
        assert!(!LeaderboardError::InvalidResponse("status 502".into()).is_fatal());
    }
}
