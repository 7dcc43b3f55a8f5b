//! Ranks parties by their share of liquidity committed to one market

use rust_decimal::Decimal;

use crate::common::errors::{LeaderboardError, Result};
use crate::common::types::{LiquidityProvision, Participant, VerifiedParty};
use crate::leaderboard::clock::CompetitionWindow;
use crate::strategy::traits::RankingStrategy;
use crate::strategy::types::{
    format_amount, parse_amount, sort_descending, sort_key, AlgorithmParams, RankingContext,
};

pub const NAME: &str = "liquidityShare";

/// Status of a commitment that currently provides liquidity
pub const STATUS_ACTIVE: &str = "STATUS_ACTIVE";

const PERCENT_DECIMALS: u32 = 6;

/// Share of the active liquidity committed to `market` by verified parties,
/// largest share first.
///
/// Parameters:
/// - `market`: market id the commitments are counted in (required)
/// - `decimal_places`: scale of the raw commitment amounts (required)
///
/// Only active commitments made inside the competition window count. Every
/// verified party is listed, those without a commitment at zero. Equal
/// shares keep the verifier's identity order.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiquidityShare;

struct Settings {
    market: String,
    decimal_places: u32,
}

/// Commitment and proposed fee of one party
struct Commitment {
    amount: Decimal,
    fee: Decimal,
}

impl Settings {
    fn from_params(params: &AlgorithmParams) -> Result<Self> {
        let market = params.require("market")?.trim().to_string();
        if market.is_empty() {
            return Err(LeaderboardError::Configuration(
                "algorithm parameter market must not be empty".to_string(),
            ));
        }
        Ok(Self {
            market,
            decimal_places: params.decimal_places()?,
        })
    }

    fn counts(&self, lp: &LiquidityProvision, window: &CompetitionWindow) -> bool {
        lp.market_id == self.market && lp.status == STATUS_ACTIVE && window.contains(lp.created_at)
    }

    fn commitment(&self, vp: &VerifiedParty, window: &CompetitionWindow) -> Commitment {
        let party_id = vp.identity.party_id.as_str();
        let mut amount = Decimal::ZERO;
        let mut latest: Option<&LiquidityProvision> = None;

        for lp in vp.party.liquidity_provisions.iter().filter(|lp| self.counts(lp, window)) {
            amount += parse_amount(&lp.commitment_amount, self.decimal_places, "commitment", party_id);
            if latest.map_or(true, |l| lp.created_at >= l.created_at) {
                latest = Some(lp);
            }
        }

        let fee = latest
            .map(|lp| parse_amount(&lp.fee, 0, "liquidity fee", party_id))
            .unwrap_or(Decimal::ZERO);
        Commitment { amount, fee }
    }
}

fn percent(fraction: Decimal) -> String {
    format!("{}%", format_amount(fraction * Decimal::ONE_HUNDRED, PERCENT_DECIMALS))
}

impl RankingStrategy for LiquidityShare {
    fn name(&self) -> &str {
        NAME
    }

    fn validate(&self, params: &AlgorithmParams) -> Result<()> {
        Settings::from_params(params).map(|_| ())
    }

    fn rank(&self, ctx: &RankingContext<'_>) -> Result<Vec<Participant>> {
        let settings = Settings::from_params(ctx.params)?;

        let commitments: Vec<Commitment> = ctx
            .parties
            .iter()
            .map(|vp| settings.commitment(vp, ctx.window))
            .collect();
        let total: Decimal = commitments.iter().map(|c| c.amount).sum();

        let mut participants: Vec<Participant> = ctx
            .parties
            .iter()
            .zip(&commitments)
            .map(|(vp, commitment)| {
                let share = if total.is_zero() {
                    Decimal::ZERO
                } else {
                    commitment.amount / total
                };
                Participant::for_identity(
                    &vp.identity,
                    vec![
                        format_amount(commitment.amount, settings.decimal_places),
                        percent(share),
                        percent(commitment.fee),
                    ],
                    sort_key(share),
                    ctx.now,
                )
            })
            .collect();

        sort_descending(&mut participants);
        Ok(participants)
    }
}
