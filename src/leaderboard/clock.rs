//! Competition lifecycle derived from wall-clock time

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::errors::{LeaderboardError, Result};
use crate::common::types::CompetitionStatus;
use crate::config::types::CompetitionConfig;

/// Configured competition bounds, fixed for the life of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitionWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CompetitionWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window from configuration, rejecting an end before the start
    pub fn from_config(cfg: &CompetitionConfig) -> Result<Self> {
        if cfg.start_time > cfg.end_time {
            return Err(LeaderboardError::Configuration(format!(
                "competition start {} is after end {}",
                cfg.start_time, cfg.end_time
            )));
        }
        Ok(Self::new(cfg.start_time, cfg.end_time))
    }

    /// Lifecycle state at `now`
    ///
    /// Never returns `Loading`; that state belongs to a board no refresh
    /// has completed for yet.
    pub fn status(&self, now: DateTime<Utc>) -> CompetitionStatus {
        if now < self.start {
            CompetitionStatus::NotStarted
        } else if now < self.end {
            CompetitionStatus::Active
        } else {
            CompetitionStatus::Ended
        }
    }

    /// Whether `t` falls in `[start, end)`
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }
}
