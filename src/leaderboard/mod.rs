//! The leaderboard engine: lifecycle clock, refresh pipeline, published
//! board, snapshots and read views.

pub mod board;
pub mod clock;
pub mod query;
pub mod ranking;
pub mod service;
pub mod snapshot;

pub use board::BoardState;
pub use clock::CompetitionWindow;
pub use query::{OutputFormat, Pagination, ViewQuery};
pub use ranking::Blacklist;
pub use service::{LeaderboardService, RefreshOutcome, ServiceSettings, SkipReason};
pub use snapshot::{FileSnapshotStore, SnapshotManager};
