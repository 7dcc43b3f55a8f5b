//! Builders shared by the strategy unit tests

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::common::types::{Account, Party, Position, VerifiedIdentity, VerifiedParty, Vote};
use crate::leaderboard::clock::CompetitionWindow;
use crate::strategy::types::{AlgorithmParams, RankingContext};

pub fn window_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn identity(party_id: &str, handle: &str) -> VerifiedIdentity {
    VerifiedIdentity {
        party_id: party_id.to_string(),
        handle: handle.to_string(),
        identity_id: party_id.len() as i64,
        created_at: window_start(),
        updated_at: window_start(),
        is_blacklisted: false,
    }
}

pub fn verified(
    identity: VerifiedIdentity,
    accounts: Vec<Account>,
    positions: Vec<Position>,
    votes: Vec<Vote>,
) -> VerifiedParty {
    let party = Party {
        accounts,
        positions,
        votes,
        ..Party::empty(identity.party_id.clone())
    };
    VerifiedParty { identity, party }
}

/// Run `f` against a context over a one-week window starting at `window_start`
pub fn context<T>(
    parties: &[VerifiedParty],
    params: &[(&str, &str)],
    f: impl FnOnce(&RankingContext<'_>) -> T,
) -> T {
    let window = CompetitionWindow::new(window_start(), window_start() + Duration::days(7));
    let params = AlgorithmParams::new(
        params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    );
    let ctx = RankingContext {
        parties,
        window: &window,
        params: &params,
        now: window_start() + Duration::days(1),
    };
    f(&ctx)
}
