//! Ranks parties by trading profit and loss

use rust_decimal::Decimal;

use crate::common::errors::Result;
use crate::common::types::{Participant, VerifiedParty};
use crate::strategy::traits::RankingStrategy;
use crate::strategy::types::{
    format_amount, parse_amount, sort_descending, sort_key, AlgorithmParams, RankingContext,
};

pub const NAME: &str = "positionPnl";

/// Realised plus unrealised PnL across positions, highest first.
///
/// Parameters:
/// - `decimal_places`: scale of the raw integer PnL values (required)
/// - `markets`: comma-separated market ids to restrict to (all when empty)
///
/// Parties without a position in a counted market are left out. Equal PnL
/// keeps the verifier's identity order.
#[derive(Debug, Default, Clone, Copy)]
pub struct PositionPnl;

struct Settings {
    decimal_places: u32,
    markets: Vec<String>,
}

impl Settings {
    fn from_params(params: &AlgorithmParams) -> Result<Self> {
        Ok(Self {
            decimal_places: params.decimal_places()?,
            markets: params.list("markets"),
        })
    }

    /// Total PnL, or None when the party has no counted position
    fn pnl(&self, vp: &VerifiedParty) -> Option<Decimal> {
        let party_id = vp.identity.party_id.as_str();
        let mut counted = false;
        let mut total = Decimal::ZERO;

        for position in vp
            .party
            .positions
            .iter()
            .filter(|p| self.markets.is_empty() || self.markets.contains(&p.market_id))
        {
            counted = true;
            total += parse_amount(&position.realised_pnl, self.decimal_places, "realised pnl", party_id);
            total += parse_amount(
                &position.unrealised_pnl,
                self.decimal_places,
                "unrealised pnl",
                party_id,
            );
        }

        counted.then_some(total)
    }
}

impl RankingStrategy for PositionPnl {
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
                let pnl = settings.pnl(vp)?;
                Some(Participant::for_identity(
                    &vp.identity,
                    vec![format_amount(pnl, settings.decimal_places)],
                    sort_key(pnl),
                    ctx.now,
                ))
            })
            .collect();

        sort_descending(&mut participants);
        Ok(participants)
    }
}
