//! Unified types shared by the clients, strategies and the leaderboard engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of the competition as seen by readers.
///
/// Variant order is the lifecycle order, so `Ord` can be used to check that
/// the status never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompetitionStatus {
    /// No refresh cycle has completed yet
    Loading,
    NotStarted,
    Active,
    Ended,
}

impl std::fmt::Display for CompetitionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompetitionStatus::Loading => write!(f, "loading"),
            CompetitionStatus::NotStarted => write!(f, "notStarted"),
            CompetitionStatus::Active => write!(f, "active"),
            CompetitionStatus::Ended => write!(f, "ended"),
        }
    }
}

/// A platform account mapped to a verified social identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    /// Platform account identifier (party id / public key)
    pub party_id: String,
    /// Verified display handle
    pub handle: String,
    /// Numeric id of the social identity
    pub identity_id: i64,
    /// Registration time at the verification service
    pub created_at: DateTime<Utc>,
    /// Last modification time at the verification service
    pub updated_at: DateTime<Utc>,
    /// Excluded from the public ranking
    pub is_blacklisted: bool,
}

/// One ranked entry of the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Dense 1-based rank within its partition, recomputed every refresh
    #[serde(default)]
    pub position: u64,
    pub party_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_id: Option<i64>,
    /// Display values produced by the active strategy, one per header
    pub data: Vec<String>,
    /// Comparison key used by the strategy; never exposed
    #[serde(skip)]
    pub sort_key: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub blacklisted: bool,
}

impl Participant {
    /// Build an unpositioned participant for a verified identity
    pub fn for_identity(
        identity: &VerifiedIdentity,
        data: Vec<String>,
        sort_key: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            position: 0,
            party_id: identity.party_id.clone(),
            handle: Some(identity.handle.clone()),
            identity_id: Some(identity.identity_id),
            data,
            sort_key,
            created_at: now,
            updated_at: now,
            blacklisted: identity.is_blacklisted,
        }
    }

    /// Case-insensitive match of an already lower-cased needle against id or handle
    pub fn matches(&self, needle_lower: &str) -> bool {
        if needle_lower.is_empty() {
            return true;
        }
        self.party_id.to_lowercase().contains(needle_lower)
            || self
                .handle
                .as_deref()
                .map(|h| h.to_lowercase().contains(needle_lower))
                .unwrap_or(false)
    }
}

/// Balance held by a party in one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub asset_id: String,
    pub asset_symbol: String,
    /// Raw integer balance as reported by the platform
    pub balance: String,
    pub account_type: String,
}

/// Open or closed position of a party in one market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub market_id: String,
    pub open_volume: String,
    pub realised_pnl: String,
    pub unrealised_pnl: String,
}

/// Governance vote cast by a party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub proposal_id: String,
    pub value: String,
    pub datetime: DateTime<Utc>,
}

/// Liquidity commitment of a party to one market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityProvision {
    pub market_id: String,
    /// Raw integer commitment
    pub commitment_amount: String,
    /// Proposed fee as a fraction, e.g. "0.001"
    pub fee: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Bridge deposit or withdrawal of one asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub asset_id: String,
    pub asset_symbol: String,
    /// Raw integer amount
    pub amount: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Platform-side data for one party
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub id: String,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub votes: Vec<Vote>,
    #[serde(default)]
    pub liquidity_provisions: Vec<LiquidityProvision>,
    #[serde(default)]
    pub deposits: Vec<Transfer>,
    #[serde(default)]
    pub withdrawals: Vec<Transfer>,
}

impl Party {
    /// A party known only by id (verified but absent on the platform)
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// A verified identity joined with its platform data
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedParty {
    pub identity: VerifiedIdentity,
    pub party: Party,
}

/// Display metadata copied verbatim from configuration onto every board
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayMetadata {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub default_display: String,
    #[serde(default)]
    pub default_sort: String,
    #[serde(default)]
    pub assets: Vec<String>,
}

/// The published leaderboard state
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub version: u32,
    pub metadata: DisplayMetadata,
    pub last_update: DateTime<Utc>,
    pub status: CompetitionStatus,
    /// Public partition, positioned
    pub participants: Vec<Participant>,
    /// Blacklisted partition, positioned
    pub excluded: Vec<Participant>,
}

impl Board {
    /// The board readers see before the first refresh completes
    pub fn loading(version: u32, metadata: DisplayMetadata, now: DateTime<Utc>) -> Self {
        Self {
            version,
            metadata,
            last_update: now,
            status: CompetitionStatus::Loading,
            participants: Vec::new(),
            excluded: Vec::new(),
        }
    }
}

/// Competition boundary a snapshot was captured at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotLabel {
    Start,
    End,
}

impl SnapshotLabel {
    pub const ALL: [SnapshotLabel; 2] = [SnapshotLabel::Start, SnapshotLabel::End];

    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotLabel::Start => "start",
            SnapshotLabel::End => "end",
        }
    }
}

impl std::fmt::Display for SnapshotLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SnapshotLabel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start" => Ok(SnapshotLabel::Start),
            "end" => Ok(SnapshotLabel::End),
            other => Err(format!("unknown snapshot label: {}", other)),
        }
    }
}

/// Immutable copy of the public participant list at a competition boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub label: SnapshotLabel,
    pub captured_at: DateTime<Utc>,
    pub participants: Vec<Participant>,
}
