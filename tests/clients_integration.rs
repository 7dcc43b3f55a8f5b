//! Integration tests for the data-node and verifier clients
//!
//! Each test runs against a local wiremock server.

use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use leaderboard_service::clients::{DataNodeClient, VerifierClient};
use leaderboard_service::common::errors::LeaderboardError;
use leaderboard_service::common::traits::{DataSource, VerificationSource};

fn parties_body() -> serde_json::Value {
    json!({
        "data": {
            "partiesConnection": {
                "edges": [
                    {
                        "node": {
                            "id": "0xa",
                            "accountsConnection": {"edges": [
                                {"node": {"asset": {"id": "usdt-id", "symbol": "USDT"}, "balance": "2500000", "type": "ACCOUNT_TYPE_GENERAL"}}
                            ]},
                            "positionsConnection": {"edges": [
                                {"node": {"market": {"id": "m1"}, "openVolume": "3", "realisedPNL": "100", "unrealisedPNL": "-20"}}
                            ]},
                            "votesConnection": {"edges": []}
                        }
                    },
                    {"node": {"id": "0xb"}}
                ]
            }
        }
    })
}

// ============================================================================
// Data node
// ============================================================================

#[tokio::test]
async fn test_data_node_fetches_and_flattens_parties() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("cache-control", "no-cache"))
        .and(body_string_contains("partiesConnection"))
        .respond_with(ResponseTemplate::new(200).set_body_json(parties_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = DataNodeClient::new(&format!("{}/graphql", server.uri())).unwrap();
    let parties = client.fetch_parties().await.unwrap();

    assert_eq!(parties.len(), 2);
    assert_eq!(parties[0].id, "0xa");
    assert_eq!(parties[0].accounts[0].balance, "2500000");
    assert_eq!(parties[0].positions[0].unrealised_pnl, "-20");
    assert!(parties[1].accounts.is_empty());
}

#[tokio::test]
async fn test_data_node_graphql_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{"message": "field not found"}]
        })))
        .mount(&server)
        .await;

    let client = DataNodeClient::new(&server.uri()).unwrap();
    let err = client.fetch_parties().await.unwrap_err();

    assert!(matches!(err, LeaderboardError::InvalidResponse(ref m) if m.contains("field not found")));
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn test_data_node_http_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = DataNodeClient::new(&server.uri()).unwrap();
    let err = client.fetch_parties().await.unwrap_err();

    assert!(matches!(err, LeaderboardError::InvalidResponse(ref m) if m.contains("503")));
}

#[tokio::test]
async fn test_data_node_client_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(parties_body())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = DataNodeClient::with_timeout(&server.uri(), Duration::from_millis(100)).unwrap();
    let err = client.fetch_parties().await.unwrap_err();

    assert!(matches!(err, LeaderboardError::HttpRequest(_)));
}

// ============================================================================
// Verifier
// ============================================================================

#[tokio::test]
async fn test_verifier_lists_identities() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "party_id": "0xa",
                "twitter_handle": "alice",
                "twitter_user_id": 101,
                "created": 1704067200,
                "last_modified": 1704153600,
                "is_blacklisted": false
            },
            {
                "party_id": "0xb",
                "twitter_handle": "bob",
                "twitter_user_id": 102,
                "created": 1704067200,
                "last_modified": 1704067200,
                "is_blacklisted": true
            }
        ])))
        .mount(&server)
        .await;

    let client = VerifierClient::new(&format!("{}/api/v1/list", server.uri())).unwrap();
    let identities = client.fetch_identities().await.unwrap();

    assert_eq!(identities.len(), 2);
    assert_eq!(identities[0].handle, "alice");
    assert_eq!(identities[0].identity_id, 101);
    assert!(identities[1].is_blacklisted);
}

#[tokio::test]
async fn test_verifier_rejects_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = VerifierClient::new(&server.uri()).unwrap();
    let err = client.fetch_identities().await.unwrap_err();

    assert!(matches!(err, LeaderboardError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_verifier_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = VerifierClient::new(&server.uri()).unwrap();
    assert!(client.fetch_identities().await.is_err());
}
