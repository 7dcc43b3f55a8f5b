//! Wire types for the data-node GraphQL API and the verification service

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::common::types::{
    Account, LiquidityProvision, Party, Position, Transfer, VerifiedIdentity, Vote,
};

/// Query sent to the data node; one request returns every party with the
/// accounts, positions, votes, liquidity commitments and bridge transfers
/// the built-in strategies consume.
pub const PARTIES_QUERY: &str = r#"query {
  partiesConnection {
    edges {
      node {
        id
        accountsConnection {
          edges { node { asset { id symbol } balance type } }
        }
        positionsConnection {
          edges { node { market { id } openVolume realisedPNL unrealisedPNL } }
        }
        votesConnection {
          edges { node { proposalId vote { value datetime } } }
        }
        liquidityProvisionsConnection {
          edges { node { market { id } commitmentAmount fee status createdAt } }
        }
        depositsConnection {
          edges { node { asset { id symbol } amount status createdTimestamp } }
        }
        withdrawalsConnection {
          edges { node { asset { id symbol } amount status createdTimestamp } }
        }
      }
    }
  }
}"#;

/// GraphQL request body
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
}

/// GraphQL response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

/// Relay-style connection
#[derive(Debug, Clone, Deserialize)]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { edges: Vec::new() }
    }
}

impl<T> Connection<T> {
    pub fn into_nodes(self) -> impl Iterator<Item = T> {
        self.edges.into_iter().map(|e| e.node)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartiesData {
    pub parties_connection: Connection<PartyNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyNode {
    pub id: String,
    #[serde(default)]
    pub accounts_connection: Option<Connection<AccountNode>>,
    #[serde(default)]
    pub positions_connection: Option<Connection<PositionNode>>,
    #[serde(default)]
    pub votes_connection: Option<Connection<VoteNode>>,
    #[serde(default)]
    pub liquidity_provisions_connection: Option<Connection<LiquidityProvisionNode>>,
    #[serde(default)]
    pub deposits_connection: Option<Connection<TransferNode>>,
    #[serde(default)]
    pub withdrawals_connection: Option<Connection<TransferNode>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetRef {
    pub id: String,
    #[serde(default)]
    pub symbol: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountNode {
    pub asset: AssetRef,
    pub balance: String,
    #[serde(rename = "type")]
    pub account_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketRef {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionNode {
    pub market: MarketRef,
    #[serde(default)]
    pub open_volume: String,
    #[serde(rename = "realisedPNL", default)]
    pub realised_pnl: String,
    #[serde(rename = "unrealisedPNL", default)]
    pub unrealised_pnl: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoteValue {
    pub value: String,
    pub datetime: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteNode {
    pub proposal_id: String,
    pub vote: VoteValue,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityProvisionNode {
    pub market: MarketRef,
    pub commitment_amount: String,
    #[serde(default)]
    pub fee: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Deposit or withdrawal through the asset bridge
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferNode {
    pub asset: AssetRef,
    pub amount: String,
    pub status: String,
    pub created_timestamp: DateTime<Utc>,
}

impl From<TransferNode> for Transfer {
    fn from(node: TransferNode) -> Self {
        Transfer {
            asset_id: node.asset.id,
            asset_symbol: node.asset.symbol,
            amount: node.amount,
            status: node.status,
            created_at: node.created_timestamp,
        }
    }
}

impl From<PartyNode> for Party {
    fn from(node: PartyNode) -> Self {
        Party {
            id: node.id,
            accounts: node
                .accounts_connection
                .unwrap_or_default()
                .into_nodes()
                .map(|a| Account {
                    asset_id: a.asset.id,
                    asset_symbol: a.asset.symbol,
                    balance: a.balance,
                    account_type: a.account_type,
                })
                .collect(),
            positions: node
                .positions_connection
                .unwrap_or_default()
                .into_nodes()
                .map(|p| Position {
                    market_id: p.market.id,
                    open_volume: p.open_volume,
                    realised_pnl: p.realised_pnl,
                    unrealised_pnl: p.unrealised_pnl,
                })
                .collect(),
            votes: node
                .votes_connection
                .unwrap_or_default()
                .into_nodes()
                .map(|v| Vote {
                    proposal_id: v.proposal_id,
                    value: v.vote.value,
                    datetime: v.vote.datetime,
                })
                .collect(),
            liquidity_provisions: node
                .liquidity_provisions_connection
                .unwrap_or_default()
                .into_nodes()
                .map(|lp| LiquidityProvision {
                    market_id: lp.market.id,
                    commitment_amount: lp.commitment_amount,
                    fee: lp.fee,
                    status: lp.status,
                    created_at: lp.created_at,
                })
                .collect(),
            deposits: node
                .deposits_connection
                .unwrap_or_default()
                .into_nodes()
                .map(Transfer::from)
                .collect(),
            withdrawals: node
                .withdrawals_connection
                .unwrap_or_default()
                .into_nodes()
                .map(Transfer::from)
                .collect(),
        }
    }
}

/// One entry of the verification service's identity list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialRecord {
    pub party_id: String,
    pub twitter_handle: String,
    pub twitter_user_id: i64,
    /// Unix seconds
    #[serde(default)]
    pub created: i64,
    /// Unix seconds
    #[serde(default)]
    pub last_modified: i64,
    #[serde(default)]
    pub is_blacklisted: bool,
}

fn from_unix(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .unwrap_or_default()
}

impl From<SocialRecord> for VerifiedIdentity {
    fn from(record: SocialRecord) -> Self {
        VerifiedIdentity {
            party_id: record.party_id,
            handle: record.twitter_handle,
            identity_id: record.twitter_user_id,
            created_at: from_unix(record.created),
            updated_at: from_unix(record.last_modified),
            is_blacklisted: record.is_blacklisted,
        }
    }
}
