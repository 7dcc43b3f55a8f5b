//! Start and end snapshots of the public participant list

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::common::errors::Result;
use crate::common::traits::SnapshotStore;
use crate::common::types::{Participant, Snapshot, SnapshotLabel};

/// Captures each labelled snapshot at most once per process and, through
/// the optional store, at most once across restarts.
///
/// Captures are serialized by `capture` across the load-check-save sequence
/// so two concurrent callers can never both capture the same label. Readers
/// only take the slot map's read lock and never wait on store I/O.
pub struct SnapshotManager {
    store: Option<Arc<dyn SnapshotStore>>,
    slots: RwLock<HashMap<SnapshotLabel, Arc<Snapshot>>>,
    capture: Mutex<()>,
}

impl SnapshotManager {
    pub fn new(store: Option<Arc<dyn SnapshotStore>>) -> Self {
        Self {
            store,
            slots: RwLock::new(HashMap::new()),
            capture: Mutex::new(()),
        }
    }

    /// In-memory only; snapshots are lost on restart
    pub fn in_memory() -> Self {
        Self::new(None)
    }

    /// Load every persisted snapshot into memory, returning how many are held
    pub async fn restore(&self) -> usize {
        let Some(store) = &self.store else {
            return 0;
        };

        let _capture = self.capture.lock().await;
        for label in SnapshotLabel::ALL {
            if self.slots.read().await.contains_key(&label) {
                continue;
            }
            match store.load(label).await {
                Ok(Some(snapshot)) => {
                    info!(
                        "Restored {} snapshot captured at {} ({} participants)",
                        label,
                        snapshot.captured_at,
                        snapshot.participants.len()
                    );
                    self.slots.write().await.insert(label, Arc::new(snapshot));
                }
                Ok(None) => debug!("No persisted {} snapshot", label),
                Err(e) => warn!("Failed to restore {} snapshot: {}", label, e),
            }
        }
        self.slots.read().await.len()
    }

    /// Capture `participants` under `label` unless a snapshot already exists.
    ///
    /// Returns true only when this call captured it. Persistence failures
    /// are logged and the in-memory copy is kept.
    pub async fn capture_if_needed(
        &self,
        label: SnapshotLabel,
        participants: &[Participant],
        now: DateTime<Utc>,
    ) -> bool {
        let _capture = self.capture.lock().await;
        if self.slots.read().await.contains_key(&label) {
            return false;
        }

        if let Some(store) = &self.store {
            match store.load(label).await {
                Ok(Some(existing)) => {
                    info!("Found persisted {} snapshot, not capturing again", label);
                    self.slots.write().await.insert(label, Arc::new(existing));
                    return false;
                }
                Ok(None) => {}
                Err(e) => warn!("Could not read persisted {} snapshot, capturing anew: {}", label, e),
            }
        }

        let snapshot = Snapshot {
            label,
            captured_at: now,
            participants: participants.to_vec(),
        };

        if let Some(store) = &self.store {
            if let Err(e) = store.save(&snapshot).await {
                error!("Failed to persist {} snapshot: {}", label, e);
            }
        }

        info!(
            "Captured {} snapshot with {} participants",
            label,
            snapshot.participants.len()
        );
        self.slots.write().await.insert(label, Arc::new(snapshot));
        true
    }

    pub async fn get(&self, label: SnapshotLabel) -> Option<Arc<Snapshot>> {
        self.slots.read().await.get(&label).cloned()
    }
}

impl std::fmt::Debug for SnapshotManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotManager")
            .field("persistent", &self.store.is_some())
            .finish()
    }
}

/// Stores one JSON file per label in a directory
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    directory: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn path_for(&self, label: SnapshotLabel) -> PathBuf {
        self.directory.join(format!("snapshot_{}.json", label))
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self, label: SnapshotLabel) -> Result<Option<Snapshot>> {
        let path = self.path_for(label);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        tokio::fs::create_dir_all(&self.directory).await?;

        let path = self.path_for(snapshot.label);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!("Wrote {} snapshot to {}", snapshot.label, path.display());
        Ok(())
    }
}
