//! Trait definitions for the engine's external collaborators

use async_trait::async_trait;

use super::errors::Result;
use super::types::{Party, Snapshot, SnapshotLabel, VerifiedIdentity};

/// Source of account, position and vote data for trading-platform parties.
///
/// Implementations return a point-in-time view; the refresh pipeline
/// joins it against the verified identities and drops everything else.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch platform data for all known parties
    async fn fetch_parties(&self) -> Result<Vec<Party>>;
}

/// External service mapping platform accounts to verified social identities
#[async_trait]
pub trait VerificationSource: Send + Sync {
    /// Fetch the complete current set of verified identities
    async fn fetch_identities(&self) -> Result<Vec<VerifiedIdentity>>;
}

/// Durable storage for competition snapshots, keyed by label
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load a previously persisted snapshot, `None` if absent
    async fn load(&self, label: SnapshotLabel) -> Result<Option<Snapshot>>;

    /// Persist a snapshot under its label
    async fn save(&self, snapshot: &Snapshot) -> Result<()>;
}
