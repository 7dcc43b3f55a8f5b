//! Leaderboard service library
//!
//! Periodically ranks verified participants of a time-boxed trading
//! competition and serves the resulting board over HTTP.

pub mod api;
pub mod clients;
pub mod common;
pub mod config;
pub mod leaderboard;
pub mod strategy;

// Re-export commonly used types
pub use common::errors::{LeaderboardError, Result};
pub use common::traits::{DataSource, SnapshotStore, VerificationSource};
pub use common::types::{
    Board, CompetitionStatus, Participant, Party, Snapshot, SnapshotLabel, VerifiedIdentity,
    VerifiedParty,
};
pub use config::types::AppConfig;
pub use leaderboard::{CompetitionWindow, LeaderboardService, RefreshOutcome, ServiceSettings};

// Strategy types
pub use strategy::{AlgorithmParams, RankingContext, RankingStrategy, StrategyRegistry};
