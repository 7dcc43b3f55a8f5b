//! Ranks verified identities by registration order

use std::collections::HashSet;

use crate::common::errors::Result;
use crate::common::types::Participant;
use crate::strategy::traits::RankingStrategy;
use crate::strategy::types::{sort_descending, RankingContext};

pub const NAME: &str = "socialRegistration";

/// Every verified identity is a participant, most recent registration first.
///
/// Handles are deduplicated case-insensitively; the first identity seen for
/// a handle wins. No platform data is read.
#[derive(Debug, Default, Clone, Copy)]
pub struct SocialRegistration;

impl RankingStrategy for SocialRegistration {
    fn name(&self) -> &str {
        NAME
    }

    fn requires_platform_data(&self) -> bool {
        false
    }

    fn rank(&self, ctx: &RankingContext<'_>) -> Result<Vec<Participant>> {
        let mut seen = HashSet::new();
        let mut participants = Vec::with_capacity(ctx.parties.len());

        for vp in ctx.parties {
            if !seen.insert(vp.identity.handle.to_lowercase()) {
                continue;
            }
            let order = participants.len() as f64;
            participants.push(Participant::for_identity(
                &vp.identity,
                vec!["Registered".to_string()],
                order,
                ctx.now,
            ));
        }

        sort_descending(&mut participants);
        Ok(participants)
    }
}
