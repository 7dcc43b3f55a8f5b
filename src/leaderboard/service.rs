//! Refresh pipeline and lifecycle of the leaderboard engine

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use super::board::BoardState;
use super::clock::CompetitionWindow;
use super::ranking::{assign_positions, join_verified, partition, Blacklist};
use super::snapshot::{FileSnapshotStore, SnapshotManager};
use crate::clients::{DataNodeClient, VerifierClient};
use crate::common::errors::{LeaderboardError, Result};
use crate::common::traits::{DataSource, SnapshotStore, VerificationSource};
use crate::common::types::{
    Board, CompetitionStatus, DisplayMetadata, Party, Snapshot, SnapshotLabel, VerifiedIdentity,
};
use crate::config::types::AppConfig;
use crate::strategy::{AlgorithmParams, RankingContext, SharedStrategy, StrategyRegistry};

/// Runtime knobs of the refresh loop
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSettings {
    pub poll_interval: Duration,
    /// Bound on each call to the verifier or the data source
    pub request_timeout: Duration,
    /// How long `stop` waits for an in-flight cycle
    pub graceful_shutdown: Duration,
    pub freeze_after_end: bool,
    pub version: u32,
    pub metadata: DisplayMetadata,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            request_timeout: Duration::from_secs(10),
            graceful_shutdown: Duration::from_secs(10),
            freeze_after_end: false,
            version: 1,
            metadata: DisplayMetadata::default(),
        }
    }
}

impl ServiceSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            request_timeout: config.request_timeout(),
            graceful_shutdown: config.graceful_shutdown(),
            freeze_after_end: config.competition.freeze_after_end,
            version: config.competition.version,
            metadata: DisplayMetadata::from(&config.display),
        }
    }
}

/// Why a refresh cycle left the board untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another cycle held the single-flight guard
    AlreadyRunning,
    NoVerifiedIdentities,
    NotStarted,
    /// Competition ended and the board is frozen at the end snapshot
    Frozen,
    FetchFailed,
    StrategyFailed,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            SkipReason::AlreadyRunning => "refresh already running",
            SkipReason::NoVerifiedIdentities => "no verified identities",
            SkipReason::NotStarted => "competition not started",
            SkipReason::Frozen => "board frozen after end",
            SkipReason::FetchFailed => "data source fetch failed",
            SkipReason::StrategyFailed => "ranking strategy failed",
        };
        f.write_str(reason)
    }
}

/// Result of one refresh cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Published {
        status: CompetitionStatus,
        participants: usize,
        excluded: usize,
        /// The strategy returned nothing and the previous lists were kept
        reused_previous: bool,
        /// Snapshot labels captured by this cycle
        captured: Vec<SnapshotLabel>,
    },
    Skipped(SkipReason),
}

impl RefreshOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, RefreshOutcome::Published { .. })
    }
}

struct Worker {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Owns the published board and everything needed to refresh it.
///
/// One background task drives `refresh` on a fixed cadence; readers call
/// `board` and `snapshot` concurrently from any number of tasks.
pub struct LeaderboardService {
    window: CompetitionWindow,
    strategy: SharedStrategy,
    params: AlgorithmParams,
    data_source: Arc<dyn DataSource>,
    verifier: Arc<dyn VerificationSource>,
    blacklist: Blacklist,
    settings: ServiceSettings,
    board: BoardState,
    /// Last successfully synced identities, replaced wholesale
    identities: RwLock<Arc<Vec<VerifiedIdentity>>>,
    snapshots: SnapshotManager,
    refresh_guard: Mutex<()>,
    worker: Mutex<Option<Worker>>,
}

impl LeaderboardService {
    pub fn new(
        window: CompetitionWindow,
        strategy: SharedStrategy,
        params: AlgorithmParams,
        data_source: Arc<dyn DataSource>,
        verifier: Arc<dyn VerificationSource>,
        snapshots: SnapshotManager,
        settings: ServiceSettings,
    ) -> Self {
        let board = Board::loading(settings.version, settings.metadata.clone(), Utc::now());
        Self {
            window,
            strategy,
            params,
            data_source,
            verifier,
            blacklist: Blacklist::default(),
            settings,
            board: BoardState::new(board),
            identities: RwLock::new(Arc::new(Vec::new())),
            snapshots,
            refresh_guard: Mutex::new(()),
            worker: Mutex::new(None),
        }
    }

    pub fn with_blacklist(mut self, blacklist: Blacklist) -> Self {
        self.blacklist = blacklist;
        self
    }

    /// Wire the service from validated configuration using the built-in strategies
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::from_config_with_registry(config, &StrategyRegistry::with_defaults())
    }

    /// Wire the service from configuration, resolving the algorithm in `registry`
    pub fn from_config_with_registry(config: &AppConfig, registry: &StrategyRegistry) -> Result<Self> {
        let window = CompetitionWindow::from_config(&config.competition)?;
        let params = AlgorithmParams::new(config.algorithm.params.clone());
        let strategy = registry.resolve(&config.algorithm.name, &params)?;

        let request_timeout = config.request_timeout();
        let data_source = Arc::new(DataNodeClient::with_timeout(
            &config.sources.data_node_url,
            request_timeout,
        )?);
        let verifier = Arc::new(VerifierClient::with_timeout(
            &config.sources.verifier_url,
            request_timeout,
        )?);

        let snapshots = if config.snapshots.enabled {
            let store: Arc<dyn SnapshotStore> = Arc::new(FileSnapshotStore::new(&config.snapshots.directory));
            SnapshotManager::new(Some(store))
        } else {
            SnapshotManager::in_memory()
        };

        let blacklist = Blacklist::from_config(&config.blacklist);
        info!(
            "Leaderboard configured: algorithm={}, window={}..{}, blacklisted={}, snapshots={}",
            strategy.name(),
            window.start,
            window.end,
            blacklist.len(),
            if config.snapshots.enabled { "persistent" } else { "memory" }
        );

        Ok(Self::new(
            window,
            strategy,
            params,
            data_source,
            verifier,
            snapshots,
            ServiceSettings::from_config(config),
        )
        .with_blacklist(blacklist))
    }

    pub fn window(&self) -> &CompetitionWindow {
        &self.window
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// The currently published board
    pub async fn board(&self) -> Arc<Board> {
        self.board.current().await
    }

    pub async fn snapshot(&self, label: SnapshotLabel) -> Option<Arc<Snapshot>> {
        self.snapshots.get(label).await
    }

    /// Identities from the last successful verifier sync
    pub async fn identities(&self) -> Arc<Vec<VerifiedIdentity>> {
        self.identities.read().await.clone()
    }

    /// Load persisted snapshots so a restart does not capture them again
    pub async fn restore_snapshots(&self) -> usize {
        self.snapshots.restore().await
    }

    /// Run one refresh cycle at the current time
    pub async fn refresh(&self) -> RefreshOutcome {
        self.refresh_at(Utc::now()).await
    }

    /// Run one refresh cycle as if the clock read `now`.
    ///
    /// Never fails: every error is logged and leaves the board as it was.
    #[instrument(skip(self), fields(algorithm = %self.strategy.name()))]
    pub async fn refresh_at(&self, now: DateTime<Utc>) -> RefreshOutcome {
        let Ok(_guard) = self.refresh_guard.try_lock() else {
            warn!("Refresh requested while another cycle is running");
            return RefreshOutcome::Skipped(SkipReason::AlreadyRunning);
        };

        let outcome = self.run_cycle(now).await;
        match &outcome {
            RefreshOutcome::Published {
                status,
                participants,
                excluded,
                reused_previous,
                captured,
            } => info!(
                %status,
                participants,
                excluded,
                reused_previous,
                ?captured,
                "Published leaderboard"
            ),
            RefreshOutcome::Skipped(reason) => info!(%reason, "Skipped leaderboard refresh"),
        }
        outcome
    }

    async fn run_cycle(&self, now: DateTime<Utc>) -> RefreshOutcome {
        let status = self.window.status(now);
        let identities = self.sync_identities().await;

        if identities.is_empty() {
            return RefreshOutcome::Skipped(SkipReason::NoVerifiedIdentities);
        }
        if status == CompetitionStatus::NotStarted {
            return RefreshOutcome::Skipped(SkipReason::NotStarted);
        }

        // Once frozen, the public list is the end snapshot. The excluded
        // list is still ranked by the first cycle of each process.
        let frozen = if status == CompetitionStatus::Ended && self.settings.freeze_after_end {
            let end = self.snapshots.get(SnapshotLabel::End).await;
            if end.is_some() && self.board.current().await.status == CompetitionStatus::Ended {
                return RefreshOutcome::Skipped(SkipReason::Frozen);
            }
            end
        } else {
            None
        };

        let parties = if self.strategy.requires_platform_data() {
            match self.fetch_parties().await {
                Ok(parties) => parties,
                Err(e) => {
                    warn!("Data source fetch failed, keeping previous board: {}", e);
                    return RefreshOutcome::Skipped(SkipReason::FetchFailed);
                }
            }
        } else {
            Vec::new()
        };

        let verified = join_verified(&identities, parties);
        let ctx = RankingContext {
            parties: &verified,
            window: &self.window,
            params: &self.params,
            now,
        };
        let ranked = match self.strategy.rank(&ctx) {
            Ok(ranked) => ranked,
            Err(e) => {
                error!("Ranking strategy {} failed: {}", self.strategy.name(), e);
                return RefreshOutcome::Skipped(SkipReason::StrategyFailed);
            }
        };

        let reused_previous = ranked.is_empty();
        let (mut participants, excluded) = if reused_previous {
            debug!("Strategy returned no participants, keeping previous lists");
            let previous = self.board.current().await;
            (previous.participants.clone(), previous.excluded.clone())
        } else {
            let (mut public, mut excluded) = partition(ranked);
            assign_positions(&mut public);
            assign_positions(&mut excluded);
            (public, excluded)
        };
        if let Some(end) = &frozen {
            info!("Freezing board at end snapshot captured {}", end.captured_at);
            participants = end.participants.clone();
        }

        let (public_count, excluded_count) = (participants.len(), excluded.len());
        self.board
            .publish(Board {
                version: self.settings.version,
                metadata: self.settings.metadata.clone(),
                last_update: now,
                status,
                participants,
                excluded,
            })
            .await;

        let mut captured = Vec::new();
        let label = match status {
            CompetitionStatus::Active => Some(SnapshotLabel::Start),
            CompetitionStatus::Ended => Some(SnapshotLabel::End),
            _ => None,
        };
        if let Some(label) = label {
            let current = self.board.current().await;
            if self
                .snapshots
                .capture_if_needed(label, &current.participants, now)
                .await
            {
                captured.push(label);
            }
        }

        RefreshOutcome::Published {
            status,
            participants: public_count,
            excluded: excluded_count,
            reused_previous,
            captured,
        }
    }

    /// Resync identities from the verifier, falling back to the cached set
    async fn sync_identities(&self) -> Arc<Vec<VerifiedIdentity>> {
        match self.fetch_identities().await {
            Ok(mut fresh) => {
                self.blacklist.apply(&mut fresh);
                debug!("Synced {} verified identities", fresh.len());
                let fresh = Arc::new(fresh);
                *self.identities.write().await = Arc::clone(&fresh);
                fresh
            }
            Err(e) => {
                let cached = self.identities.read().await.clone();
                warn!(
                    "Verifier sync failed, keeping {} cached identities: {}",
                    cached.len(),
                    e
                );
                cached
            }
        }
    }

    async fn fetch_identities(&self) -> Result<Vec<VerifiedIdentity>> {
        timeout(self.settings.request_timeout, self.verifier.fetch_identities()).await?
    }

    async fn fetch_parties(&self) -> Result<Vec<Party>> {
        timeout(self.settings.request_timeout, self.data_source.fetch_parties()).await?
    }

    /// Spawn the refresh loop; the first cycle runs immediately
    pub async fn start(self: &Arc<Self>) -> Result<()> {
        let mut worker = self.worker.lock().await;
        if worker.is_some() {
            return Err(LeaderboardError::Internal(
                "refresh loop already running".to_string(),
            ));
        }

        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let service = Arc::clone(self);
        let period = self.settings.poll_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        service.refresh().await;
                    }
                }
            }
            info!("Refresh loop stopped");
        });

        info!("Refresh loop started, polling every {:?}", period);
        *worker = Some(Worker { shutdown, handle });
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        self.worker.lock().await.is_some()
    }

    /// Stop scheduling cycles and wait for one in flight, up to the grace period
    pub async fn stop(&self) {
        let Some(worker) = self.worker.lock().await.take() else {
            return;
        };

        let _ = worker.shutdown.send(true);
        let mut handle = worker.handle;
        let grace = self.settings.graceful_shutdown;

        match timeout(grace, &mut handle).await {
            Ok(Ok(())) => info!("Leaderboard service stopped"),
            Ok(Err(e)) => error!("Refresh loop terminated abnormally: {}", e),
            Err(_) => {
                warn!("Refresh cycle still running after {:?}, aborting", grace);
                handle.abort();
            }
        }
    }
}

impl std::fmt::Debug for LeaderboardService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeaderboardService")
            .field("window", &self.window)
            .field("strategy", &self.strategy.name())
            .field("settings", &self.settings)
            .finish()
    }
}
