//! GraphQL client for the trading platform's data node

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use super::messages::{GraphQlRequest, GraphQlResponse, PartiesData, PARTIES_QUERY};
use crate::common::errors::{LeaderboardError, Result};
use crate::common::traits::DataSource;
use crate::common::types::Party;

/// Client fetching per-party platform data from a data node
#[derive(Debug, Clone)]
pub struct DataNodeClient {
    /// HTTP client
    client: Client,
    /// GraphQL endpoint
    url: String,
}

impl DataNodeClient {
    /// Create a new client with the default timeout
    pub fn new(url: &str) -> Result<Self> {
        Self::with_timeout(url, Duration::from_secs(10))
    }

    /// Create a new client with a custom request timeout
    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LeaderboardError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
        })
    }

    /// Run the parties query and flatten the connection envelope
    #[instrument(skip(self))]
    pub async fn get_parties(&self) -> Result<Vec<Party>> {
        debug!("Querying parties from data node: {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .header("Cache-Control", "no-cache")
            .json(&GraphQlRequest {
                query: PARTIES_QUERY,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LeaderboardError::InvalidResponse(format!(
                "Data node returned status {}: {}",
                status, body
            )));
        }

        let envelope: GraphQlResponse<PartiesData> = response.json().await?;
        if !envelope.errors.is_empty() {
            let messages: Vec<String> = envelope.errors.into_iter().map(|e| e.message).collect();
            return Err(LeaderboardError::InvalidResponse(format!(
                "GraphQL errors: {}",
                messages.join("; ")
            )));
        }

        let data = envelope.data.ok_or_else(|| {
            LeaderboardError::InvalidResponse("GraphQL response carried no data".to_string())
        })?;

        let parties: Vec<Party> = data
            .parties_connection
            .into_nodes()
            .map(Party::from)
            .collect();
        debug!("Data node returned {} parties", parties.len());
        Ok(parties)
    }
}

#[async_trait]
impl DataSource for DataNodeClient {
    async fn fetch_parties(&self) -> Result<Vec<Party>> {
        self.get_parties().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = DataNodeClient::new("https://data-node.example.com/graphql");
        assert!(client.is_ok());
    }

    #[test]
    fn test_url_normalization() {
        let client = DataNodeClient::new("https://data-node.example.com/graphql/").unwrap();
        assert!(!client.url.ends_with('/'));
    }
}
