use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::common::errors::{LeaderboardError, Result};
use crate::strategy::builtin::{
    AccountBalance, DepositWithdrawalCount, GovernanceVotes, LiquidityShare, PositionPnl,
    SocialRegistration,
};
use crate::strategy::traits::SharedStrategy;
use crate::strategy::types::AlgorithmParams;

/// Name-keyed set of available ranking strategies
///
/// The configured strategy is resolved once at startup; an unknown name or
/// invalid parameters stop the service before it serves anything.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: HashMap<String, SharedStrategy>,
}

impl StrategyRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in strategy
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(SocialRegistration));
        registry.register(Arc::new(AccountBalance));
        registry.register(Arc::new(GovernanceVotes));
        registry.register(Arc::new(PositionPnl));
        registry.register(Arc::new(LiquidityShare));
        registry.register(Arc::new(DepositWithdrawalCount));
        registry
    }

    /// Add a strategy, replacing any previous one with the same name
    pub fn register(&mut self, strategy: SharedStrategy) {
        debug!("Registering ranking strategy: {}", strategy.name());
        self.strategies.insert(strategy.name().to_string(), strategy);
    }

    pub fn get(&self, name: &str) -> Option<SharedStrategy> {
        self.strategies.get(name).cloned()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Look up `name` and check `params` against it
    pub fn resolve(&self, name: &str, params: &AlgorithmParams) -> Result<SharedStrategy> {
        let strategy = self.get(name).ok_or_else(|| {
            LeaderboardError::UnknownStrategy(format!(
                "{} (available: {})",
                name,
                self.names().join(", ")
            ))
        })?;
        strategy.validate(params)?;
        Ok(strategy)
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("strategies", &self.names())
            .finish()
    }
}
