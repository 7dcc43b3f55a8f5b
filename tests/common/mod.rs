//! Common test utilities and fixtures
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use mockall::mock;
use std::sync::Arc;
use std::time::Duration;

use leaderboard_service::common::errors::Result;
use leaderboard_service::common::traits::{DataSource, SnapshotStore, VerificationSource};
use leaderboard_service::common::types::{
    Account, DisplayMetadata, Party, Snapshot, SnapshotLabel, VerifiedIdentity,
};
use leaderboard_service::leaderboard::{
    CompetitionWindow, LeaderboardService, ServiceSettings, SnapshotManager,
};
use leaderboard_service::strategy::{AlgorithmParams, StrategyRegistry};

mock! {
    pub Source {}

    #[async_trait]
    impl DataSource for Source {
        async fn fetch_parties(&self) -> Result<Vec<Party>>;
    }
}

mock! {
    pub Verifier {}

    #[async_trait]
    impl VerificationSource for Verifier {
        async fn fetch_identities(&self) -> Result<Vec<VerifiedIdentity>>;
    }
}

mock! {
    pub Store {}

    #[async_trait]
    impl SnapshotStore for Store {
        async fn load(&self, label: SnapshotLabel) -> Result<Option<Snapshot>>;
        async fn save(&self, snapshot: &Snapshot) -> Result<()>;
    }
}

/// Data source returning a fixed party list
pub struct StaticSource(pub Vec<Party>);

#[async_trait]
impl DataSource for StaticSource {
    async fn fetch_parties(&self) -> Result<Vec<Party>> {
        Ok(self.0.clone())
    }
}

/// Verifier returning a fixed identity list
pub struct StaticVerifier(pub Vec<VerifiedIdentity>);

#[async_trait]
impl VerificationSource for StaticVerifier {
    async fn fetch_identities(&self) -> Result<Vec<VerifiedIdentity>> {
        Ok(self.0.clone())
    }
}

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// 2024-01-01T00:00:00Z .. 2024-01-08T00:00:00Z
pub fn window() -> CompetitionWindow {
    CompetitionWindow::new(at(2024, 1, 1), at(2024, 1, 8))
}

pub fn identity(party_id: &str, handle: &str, identity_id: i64) -> VerifiedIdentity {
    VerifiedIdentity {
        party_id: party_id.to_string(),
        handle: handle.to_string(),
        identity_id,
        created_at: at(2023, 12, 1),
        updated_at: at(2023, 12, 1),
        is_blacklisted: false,
    }
}

/// Party holding `balance` units of USDT in its general account
pub fn party_with_balance(party_id: &str, balance: &str) -> Party {
    Party {
        id: party_id.to_string(),
        accounts: vec![Account {
            asset_id: "usdt-asset-id".to_string(),
            asset_symbol: "USDT".to_string(),
            balance: balance.to_string(),
            account_type: "ACCOUNT_TYPE_GENERAL".to_string(),
        }],
        ..Party::default()
    }
}

/// accountBalance over USDT with no scaling; empty holders are omitted
pub fn balance_params() -> AlgorithmParams {
    AlgorithmParams::new(
        [
            ("asset", "USDT"),
            ("decimal_places", "0"),
            ("exclude_zero", "true"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
    )
}

pub fn settings() -> ServiceSettings {
    ServiceSettings {
        request_timeout: Duration::from_millis(200),
        metadata: DisplayMetadata {
            description: "USDT balance competition".to_string(),
            headers: vec!["Balance".to_string()],
            ..DisplayMetadata::default()
        },
        ..ServiceSettings::default()
    }
}

/// Service ranking by USDT balance over the sample window
pub fn balance_service(
    data_source: Arc<dyn DataSource>,
    verifier: Arc<dyn VerificationSource>,
    snapshots: SnapshotManager,
) -> LeaderboardService {
    balance_service_with(data_source, verifier, snapshots, settings())
}

pub fn balance_service_with(
    data_source: Arc<dyn DataSource>,
    verifier: Arc<dyn VerificationSource>,
    snapshots: SnapshotManager,
    settings: ServiceSettings,
) -> LeaderboardService {
    let params = balance_params();
    let strategy = StrategyRegistry::with_defaults()
        .resolve("accountBalance", &params)
        .unwrap();
    LeaderboardService::new(
        window(),
        strategy,
        params,
        data_source,
        verifier,
        snapshots,
        settings,
    )
}
