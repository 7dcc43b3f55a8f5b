//! REST client for the social identity verification service

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use super::messages::SocialRecord;
use crate::common::errors::{LeaderboardError, Result};
use crate::common::traits::VerificationSource;
use crate::common::types::VerifiedIdentity;

/// Client listing the platform accounts that completed social verification
#[derive(Debug, Clone)]
pub struct VerifierClient {
    /// HTTP client
    client: Client,
    /// Endpoint returning the full identity list
    url: String,
}

impl VerifierClient {
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
            url: url.to_string(),
        })
    }

    /// Fetch every verified identity
    #[instrument(skip(self))]
    pub async fn get_identities(&self) -> Result<Vec<VerifiedIdentity>> {
        debug!("Fetching verified identities from: {}", self.url);

        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LeaderboardError::InvalidResponse(format!(
                "Verifier returned status {}: {}",
                status, body
            )));
        }

        let records: Vec<SocialRecord> = response.json().await?;
        Ok(records.into_iter().map(VerifiedIdentity::from).collect())
    }
}

#[async_trait]
impl VerificationSource for VerifierClient {
    async fn fetch_identities(&self) -> Result<Vec<VerifiedIdentity>> {
        self.get_identities().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(VerifierClient::new("https://verifier.example.com/list").is_ok());
    }
}
