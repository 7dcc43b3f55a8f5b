//! Ranks parties by the total balance held in one asset

use rust_decimal::Decimal;

use crate::common::errors::{LeaderboardError, Result};
use crate::common::types::{Participant, VerifiedParty};
use crate::strategy::traits::RankingStrategy;
use crate::strategy::types::{
    format_amount, parse_amount, sort_descending, sort_key, AlgorithmParams, RankingContext,
};

pub const NAME: &str = "accountBalance";

/// Account types summed when `account_types` is not configured
pub const DEFAULT_ACCOUNT_TYPES: [&str; 2] = ["ACCOUNT_TYPE_GENERAL", "ACCOUNT_TYPE_MARGIN"];

/// Sum of a party's balances in the configured asset, highest first.
///
/// Parameters:
/// - `asset`: asset id or symbol (required)
/// - `decimal_places`: scale of the raw integer balances (required)
/// - `account_types`: comma-separated account types to include
/// - `exclude_zero`: omit parties holding nothing (default false)
///
/// Equal balances keep the verifier's identity order.
#[derive(Debug, Default, Clone, Copy)]
pub struct AccountBalance;

struct Settings {
    asset: String,
    decimal_places: u32,
    account_types: Vec<String>,
    exclude_zero: bool,
}

impl Settings {
    fn from_params(params: &AlgorithmParams) -> Result<Self> {
        let asset = params.require("asset")?.trim().to_string();
        if asset.is_empty() {
            return Err(LeaderboardError::Configuration(
                "algorithm parameter asset must not be empty".to_string(),
            ));
        }
        let mut account_types = params.list("account_types");
        if account_types.is_empty() {
            account_types = DEFAULT_ACCOUNT_TYPES.iter().map(|s| s.to_string()).collect();
        }
        Ok(Self {
            asset,
            decimal_places: params.decimal_places()?,
            account_types,
            exclude_zero: params.parse_or("exclude_zero", false)?,
        })
    }

    fn balance(&self, vp: &VerifiedParty) -> Decimal {
        vp.party
            .accounts
            .iter()
            .filter(|a| a.asset_id == self.asset || a.asset_symbol == self.asset)
            .filter(|a| self.account_types.iter().any(|t| *t == a.account_type))
            .map(|a| parse_amount(&a.balance, self.decimal_places, "balance", &vp.identity.party_id))
            .sum()
    }
}

impl RankingStrategy for AccountBalance {
    fn name(&self) -> &str {
        NAME
    }

    fn validate(&self, params: &AlgorithmParams) -> Result<()> {
        Settings::from_params(params).map(|_| ())
    }

    fn rank(&self, ctx: &RankingContext<'_>) -> Result<Vec<Participant>> {
        let settings = Settings::from_params(ctx.params)?;

        let mut participants: Vec<Participant> = ctx
            .parties
            .iter()
            .filter_map(|vp| {
                let balance = settings.balance(vp);
                if settings.exclude_zero && balance.is_zero() {
                    return None;
                }
                Some(Participant::for_identity(
                    &vp.identity,
                    vec![format_amount(balance, settings.decimal_places)],
                    sort_key(balance),
                    ctx.now,
                ))
            })
            .collect();

        sort_descending(&mut participants);
        Ok(participants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::Account;
    use crate::strategy::fixtures::{context, identity, verified};

    fn account(symbol: &str, balance: &str, account_type: &str) -> Account {
        Account {
            asset_id: format!("id-{}", symbol),
            asset_symbol: symbol.to_string(),
            balance: balance.to_string(),
            account_type: account_type.to_string(),
        }
    }

    #[test]
    fn test_sums_matching_accounts() {
        let parties = vec![
            verified(
                identity("0xa", "alice"),
                vec![
                    account("USDT", "1000000", "ACCOUNT_TYPE_GENERAL"),
                    account("USDT", "500000", "ACCOUNT_TYPE_MARGIN"),
                    account("USDT", "9000000", "ACCOUNT_TYPE_BOND"),
                    account("BTC", "9000000", "ACCOUNT_TYPE_GENERAL"),
                ],
                vec![],
                vec![],
            ),
            verified(
                identity("0xb", "bob"),
                vec![account("USDT", "2000000", "ACCOUNT_TYPE_GENERAL")],
                vec![],
                vec![],
            ),
        ];
        let params = [("asset", "USDT"), ("decimal_places", "6")];
        let ranked = context(&parties, &params, |ctx| AccountBalance.rank(ctx)).unwrap();

        assert_eq!(ranked[0].party_id, "0xb");
        assert_eq!(ranked[0].data, vec!["2.000000"]);
        assert_eq!(ranked[1].data, vec!["1.500000"]);
    }

    #[test]
    fn test_zero_balances_kept_unless_excluded() {
        let parties = vec![verified(identity("0xa", "alice"), vec![], vec![], vec![])];
        let params = [("asset", "USDT"), ("decimal_places", "2")];
        let ranked = context(&parties, &params, |ctx| AccountBalance.rank(ctx)).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].data, vec!["0.00"]);

        let params = [("asset", "USDT"), ("decimal_places", "2"), ("exclude_zero", "true")];
        let ranked = context(&parties, &params, |ctx| AccountBalance.rank(ctx)).unwrap();
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_ties_keep_identity_order() {
        let parties = vec![
            verified(identity("0xa", "alice"), vec![], vec![], vec![]),
            verified(identity("0xb", "bob"), vec![], vec![], vec![]),
        ];
        let params = [("asset", "USDT"), ("decimal_places", "0")];
        let ranked = context(&parties, &params, |ctx| AccountBalance.rank(ctx)).unwrap();
        assert_eq!(ranked[0].party_id, "0xa");
        assert_eq!(ranked[1].party_id, "0xb");
    }

    #[test]
    fn test_validate_requires_asset() {
        let params = AlgorithmParams::new(
            [("decimal_places".to_string(), "6".to_string())].into_iter().collect(),
        );
        assert!(AccountBalance.validate(&params).is_err());
    }
}
