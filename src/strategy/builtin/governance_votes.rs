//! Ranks parties by governance participation during the competition

use crate::common::errors::Result;
use crate::common::types::Participant;
use crate::strategy::traits::RankingStrategy;
use crate::strategy::types::{sort_descending, RankingContext};

pub const NAME: &str = "governanceVotes";

/// Number of votes cast inside the competition window, most votes first.
///
/// Equal counts keep the verifier's identity order.
#[derive(Debug, Default, Clone, Copy)]
pub struct GovernanceVotes;

impl RankingStrategy for GovernanceVotes {
    fn name(&self) -> &str {
        NAME
    }

    fn rank(&self, ctx: &RankingContext<'_>) -> Result<Vec<Participant>> {
        let mut participants: Vec<Participant> = ctx
            .parties
            .iter()
            .map(|vp| {
                let votes = vp
                    .party
                    .votes
                    .iter()
                    .filter(|v| ctx.window.contains(v.datetime))
                    .count();
                Participant::for_identity(&vp.identity, vec![votes.to_string()], votes as f64, ctx.now)
            })
            .collect();

        sort_descending(&mut participants);
        Ok(participants)
    }
}
