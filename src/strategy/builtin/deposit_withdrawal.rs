//! Ranks parties by bridge deposits and withdrawals of one asset

use rust_decimal::Decimal;

use crate::common::errors::{LeaderboardError, Result};
use crate::common::types::{Participant, Transfer};
use crate::leaderboard::clock::CompetitionWindow;
use crate::strategy::traits::RankingStrategy;
use crate::strategy::types::{parse_amount, sort_descending, AlgorithmParams, RankingContext};

pub const NAME: &str = "depositWithdrawalCount";

/// Status of a transfer that completed on the bridge
pub const STATUS_FINALIZED: &str = "STATUS_FINALIZED";

/// Finalized deposits plus withdrawals of `asset` made during the
/// competition, most transfers first.
///
/// Parameters:
/// - `asset`: asset id or symbol (required)
/// - `min_deposit` / `min_withdrawal`: smallest raw amount that counts (default 0)
/// - `min_transfers`: transfers needed to be listed (default 1)
///
/// Equal totals keep the verifier's identity order.
#[derive(Debug, Default, Clone, Copy)]
pub struct DepositWithdrawalCount;

struct Settings {
    asset: String,
    min_deposit: Decimal,
    min_withdrawal: Decimal,
    min_transfers: usize,
}

impl Settings {
    fn from_params(params: &AlgorithmParams) -> Result<Self> {
        let asset = params.require("asset")?.trim().to_string();
        if asset.is_empty() {
            return Err(LeaderboardError::Configuration(
                "algorithm parameter asset must not be empty".to_string(),
            ));
        }
        Ok(Self {
            asset,
            min_deposit: params.parse_or("min_deposit", Decimal::ZERO)?,
            min_withdrawal: params.parse_or("min_withdrawal", Decimal::ZERO)?,
            min_transfers: params.parse_or("min_transfers", 1)?,
        })
    }

    fn count(
        &self,
        transfers: &[Transfer],
        minimum: Decimal,
        window: &CompetitionWindow,
        what: &str,
        party_id: &str,
    ) -> usize {
        transfers
            .iter()
            .filter(|t| t.asset_id == self.asset || t.asset_symbol == self.asset)
            .filter(|t| t.status == STATUS_FINALIZED && window.contains(t.created_at))
            .filter(|t| parse_amount(&t.amount, 0, what, party_id) >= minimum)
            .count()
    }
}

impl RankingStrategy for DepositWithdrawalCount {
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
                let party_id = vp.identity.party_id.as_str();
                let deposits = settings.count(
                    &vp.party.deposits,
                    settings.min_deposit,
                    ctx.window,
                    "deposit",
                    party_id,
                );
                let withdrawals = settings.count(
                    &vp.party.withdrawals,
                    settings.min_withdrawal,
                    ctx.window,
                    "withdrawal",
                    party_id,
                );
                let total = deposits + withdrawals;
                (total >= settings.min_transfers).then(|| {
                    Participant::for_identity(
                        &vp.identity,
                        vec![deposits.to_string(), withdrawals.to_string()],
                        total as f64,
                        ctx.now,
                    )
                })
            })
            .collect();

        sort_descending(&mut participants);
        Ok(participants)
    }
}
