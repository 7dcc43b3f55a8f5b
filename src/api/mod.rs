//! HTTP read surface over the leaderboard service

pub mod error;
pub mod handlers;
pub mod routes;

use std::sync::Arc;

use crate::leaderboard::LeaderboardService;

pub use routes::create_router;

/// Shared state handed to every handler
pub type AppState = Arc<LeaderboardService>;
