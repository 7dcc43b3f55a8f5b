//! Post-ranking steps: identity join, blacklist, partitioning and positions

use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::common::types::{Participant, Party, VerifiedIdentity, VerifiedParty};

/// Verified numeric identity ids excluded from the public ranking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    ids: HashSet<i64>,
}

impl Blacklist {
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Build from the configured `id -> reason` map, skipping keys that are not integers
    pub fn from_config(entries: &HashMap<String, String>) -> Self {
        let ids = entries.iter().filter_map(|(key, reason)| match key.trim().parse::<i64>() {
            Ok(id) => {
                debug!(identity_id = id, reason = %reason, "Blacklisted identity");
                Some(id)
            }
            Err(_) => {
                warn!("Ignoring blacklist entry with non-numeric id: {}", key);
                None
            }
        });
        Self::new(ids)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, identity_id: i64) -> bool {
        self.ids.contains(&identity_id)
    }

    /// Flag listed identities; flags already set by the verifier are kept
    pub fn apply(&self, identities: &mut [VerifiedIdentity]) {
        for identity in identities.iter_mut() {
            if self.contains(identity.identity_id) {
                identity.is_blacklisted = true;
            }
        }
    }
}

/// One entry per verified identity, in identity order, carrying its platform data
///
/// Identities with no platform record get an empty party; platform
/// parties without a verified identity are dropped.
pub fn join_verified(identities: &[VerifiedIdentity], parties: Vec<Party>) -> Vec<VerifiedParty> {
    let mut by_id: HashMap<String, Party> = parties.into_iter().map(|p| (p.id.clone(), p)).collect();

    identities
        .iter()
        .map(|identity| VerifiedParty {
            party: by_id
                .remove(&identity.party_id)
                .unwrap_or_else(|| Party::empty(identity.party_id.clone())),
            identity: identity.clone(),
        })
        .collect()
}

/// Stable split into `(public, excluded)` on each participant's blacklist flag
pub fn partition(participants: Vec<Participant>) -> (Vec<Participant>, Vec<Participant>) {
    participants.into_iter().partition(|p| !p.blacklisted)
}

/// Dense 1-based positions in list order
pub fn assign_positions(participants: &mut [Participant]) {
    for (index, participant) in participants.iter_mut().enumerate() {
        participant.position = index as u64 + 1;
    }
}
