use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use tracing::warn;

use crate::common::errors::{LeaderboardError, Result};
use crate::common::types::{Participant, VerifiedParty};
use crate::leaderboard::clock::CompetitionWindow;

/// Largest decimal-place scale a strategy accepts
pub const MAX_DECIMAL_PLACES: u32 = 18;

/// Free-form, string-keyed strategy parameters from configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlgorithmParams {
    values: HashMap<String, String>,
}

impl AlgorithmParams {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value of a parameter the strategy cannot run without
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| {
            LeaderboardError::Configuration(format!("missing algorithm parameter: {}", key))
        })
    }

    /// Parse a required parameter
    pub fn parse<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.require(key)?;
        raw.trim().parse().map_err(|e: T::Err| {
            LeaderboardError::Configuration(format!(
                "invalid algorithm parameter {} ({}): {}",
                key, raw, e
            ))
        })
    }

    /// Parse an optional parameter, falling back to `default` when absent
    pub fn parse_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(key) {
            Some(_) => self.parse(key),
            None => Ok(default),
        }
    }

    /// Comma-separated list parameter; empty when absent
    pub fn list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Decimal places used to scale raw integer amounts
    pub fn decimal_places(&self) -> Result<u32> {
        let dp: u32 = self.parse("decimal_places")?;
        if dp > MAX_DECIMAL_PLACES {
            return Err(LeaderboardError::Configuration(format!(
                "invalid algorithm parameter decimal_places ({}): at most {}",
                dp, MAX_DECIMAL_PLACES
            )));
        }
        Ok(dp)
    }
}

/// Everything a strategy may read while ranking one refresh cycle
#[derive(Debug, Clone, Copy)]
pub struct RankingContext<'a> {
    /// Verified identities joined with their platform data
    pub parties: &'a [VerifiedParty],
    pub window: &'a CompetitionWindow,
    pub params: &'a AlgorithmParams,
    /// Timestamp of this refresh cycle
    pub now: DateTime<Utc>,
}

/// Parse a raw integer amount and scale it down by `10^decimal_places`.
///
/// A value that fails to parse counts as zero for this record only.
pub fn parse_amount(raw: &str, decimal_places: u32, what: &str, party_id: &str) -> Decimal {
    let raw = raw.trim();
    if raw.is_empty() {
        return Decimal::ZERO;
    }
    match Decimal::from_str(raw).or_else(|_| Decimal::from_scientific(raw)) {
        Ok(value) => value * Decimal::new(1, decimal_places),
        Err(e) => {
            warn!(party_id, value = raw, "Failed to parse {}: {}", what, e);
            Decimal::ZERO
        }
    }
}

/// Format an amount with exactly `decimal_places` decimals
pub fn format_amount(value: Decimal, decimal_places: u32) -> String {
    format!("{:.1$}", value.round_dp(decimal_places), decimal_places as usize)
}

pub fn sort_key(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Stable descending sort on the comparison key; equal keys keep their order
pub fn sort_descending(participants: &mut [Participant]) {
    participants.sort_by(|a, b| b.sort_key.total_cmp(&a.sort_key));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn params(pairs: &[(&str, &str)]) -> AlgorithmParams {
        AlgorithmParams::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_require_missing_parameter() {
        let err = params(&[]).require("asset").unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("asset"));
    }

    #[test]
    fn test_parse_and_defaults() {
        let p = params(&[("decimal_places", " 6 ")]);
        assert_eq!(p.decimal_places().unwrap(), 6);
        assert!(p.parse_or("exclude_zero", false).is_ok());
        assert!(params(&[("decimal_places", "sixty")]).decimal_places().is_err());
        assert!(params(&[("decimal_places", "40")]).decimal_places().is_err());
    }

    #[test]
    fn test_list_parameter() {
        let p = params(&[("markets", "m1, m2,,m3 ")]);
        assert_eq!(p.list("markets"), vec!["m1", "m2", "m3"]);
        assert!(p.list("absent").is_empty());
    }

    #[test]
    fn test_parse_amount_scales_and_defaults() {
        assert_eq!(parse_amount("1500000", 6, "balance", "0xa"), dec!(1.5));
        assert_eq!(parse_amount("", 6, "balance", "0xa"), Decimal::ZERO);
        assert_eq!(parse_amount("garbage", 6, "balance", "0xa"), Decimal::ZERO);
        assert_eq!(parse_amount("-250", 2, "pnl", "0xa"), dec!(-2.5));
    }

    #[test]
    fn test_format_amount_pads_decimals() {
        assert_eq!(format_amount(dec!(1.5), 3), "1.500");
        assert_eq!(format_amount(dec!(2), 0), "2");
    }
}
