use std::sync::Arc;

use crate::common::errors::Result;
use crate::common::types::Participant;
use crate::strategy::types::{AlgorithmParams, RankingContext};

/// Core ranking strategy trait
///
/// A strategy turns the verified parties of one refresh cycle into an
/// ordered list of scored participants. It is a pure computation: all
/// network reads happen in the refresh pipeline before `rank` is called.
///
/// # Implementation Notes
///
/// - Tie-breaking is owned by the strategy and must be documented on it
/// - Participants may legitimately carry a zero score
/// - `position` is assigned by the engine, strategies leave it at zero
/// - Each participant carries the blacklist flag of its verified identity
///
/// # Example
///
/// ```ignore
/// struct TradeCount;
///
/// impl RankingStrategy for TradeCount {
///     fn name(&self) -> &str { "tradeCount" }
///
///     fn rank(&self, ctx: &RankingContext<'_>) -> Result<Vec<Participant>> {
///         // score each ctx.parties entry, then sort
///         Ok(vec![])
///     }
/// }
/// ```
pub trait RankingStrategy: Send + Sync {
    /// Unique name the strategy is selected by in configuration
    fn name(&self) -> &str;

    /// Check algorithm parameters once at startup
    ///
    /// Default implementation accepts anything.
    fn validate(&self, _params: &AlgorithmParams) -> Result<()> {
        Ok(())
    }

    /// Whether platform data must be fetched before ranking
    ///
    /// Strategies working from verified identities alone return false and
    /// the pipeline skips the data-source call.
    fn requires_platform_data(&self) -> bool {
        true
    }

    /// Produce the ordered participant list for this cycle
    fn rank(&self, ctx: &RankingContext<'_>) -> Result<Vec<Participant>>;
}

/// Shared strategy for dynamic dispatch
pub type SharedStrategy = Arc<dyn RankingStrategy>;
