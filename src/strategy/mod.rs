pub mod builtin;
pub mod registry;
pub mod traits;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use registry::StrategyRegistry;
pub use traits::{RankingStrategy, SharedStrategy};
pub use types::{AlgorithmParams, RankingContext};
