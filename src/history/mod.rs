//! History of completed revision steps and runs

pub mod export;

#[cfg(feature = "sqlite")]
pub mod store;

#[cfg(feature = "sqlite")]
pub use store::SqliteHistoryStore;

pub use export::ExportFormat;

use crate::diff::{align, escape, DiffSpan};
use crate::executor::ChangeEntry;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// One completed revision step or full run, immutable once recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Unique record ID
    pub id: Uuid,

    /// When the record was created
    pub timestamp: DateTime<Utc>,

    /// The step name, or the full-run marker
    pub label: String,

    /// Text before the revision
    pub original_text: String,

    /// Text after the revision
    pub result_text: String,

    /// External tool(s) that produced the revision
    pub tools_used: String,

    /// Discrete edits reported for this revision, in document order
    pub changes: Vec<ChangeEntry>,
}

impl HistoryRecord {
    /// Create a record stamped with a fresh ID and the current time
    pub fn new(
        label: String,
        original_text: String,
        result_text: String,
        tools_used: String,
        changes: Vec<ChangeEntry>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            label,
            original_text,
            result_text,
            tools_used,
            changes,
        }
    }

    /// Word-level comparison of the original and the result.
    ///
    /// Both sides are escaped before alignment so the spans are safe to
    /// hand to a markup renderer.
    pub fn diff(&self) -> Vec<DiffSpan> {
        align(&escape(&self.original_text), &escape(&self.result_text))
    }
}

/// Trait for persistence backends
///
/// Best effort: the store never blocks or rolls back its in-memory state
/// on a backend failure.
#[async_trait::async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Save one record
    async fn save(&self, record: &HistoryRecord) -> Result<()>;

    /// Load all records, most recent first
    async fn load_all(&self) -> Result<Vec<HistoryRecord>>;

    /// Delete all records
    async fn clear(&self) -> Result<()>;
}

/// In-memory persistence (for testing or ephemeral use)
pub struct InMemoryPersistence {
    records: tokio::sync::RwLock<Vec<HistoryRecord>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self {
            records: tokio::sync::RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryPersistence {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PersistenceBackend for InMemoryPersistence {
    async fn save(&self, record: &HistoryRecord) -> Result<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<HistoryRecord>> {
        let mut records = self.records.read().await.clone();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }

    async fn clear(&self) -> Result<()> {
        self.records.write().await.clear();
        Ok(())
    }
}

/// Append-only, capacity-capped log of completed revisions
///
/// Records are kept most recent first; once the log exceeds its capacity
/// the oldest entries are evicted from the tail. Backend writes are fire
/// and forget: a failed save is logged and the in-memory log keeps the
/// record regardless.
pub struct HistoryStore {
    records: VecDeque<HistoryRecord>,
    capacity: usize,
    persistence: Option<Arc<dyn PersistenceBackend>>,
    pending_writes: Vec<tokio::task::JoinHandle<()>>,
}

impl HistoryStore {
    /// Create an unpersisted store with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::new(),
            capacity: capacity.max(1),
            persistence: None,
            pending_writes: Vec::new(),
        }
    }

    /// Create a store backed by a persistence capability
    pub fn with_persistence(capacity: usize, backend: Arc<dyn PersistenceBackend>) -> Self {
        Self {
            records: VecDeque::new(),
            capacity: capacity.max(1),
            persistence: Some(backend),
            pending_writes: Vec::new(),
        }
    }

    /// Load previously persisted records, called once at startup.
    ///
    /// A backend failure leaves the store empty and usable.
    pub async fn load(&mut self) {
        let Some(backend) = &self.persistence else {
            return;
        };
        match backend.load_all().await {
            Ok(records) => {
                self.records = records.into_iter().take(self.capacity).collect();
            }
            Err(e) => {
                warn!("failed to load history: {:#}", e);
            }
        }
    }

    /// Insert a record at the head, evicting from the tail past capacity
    pub fn append(&mut self, record: HistoryRecord) {
        if let Some(backend) = &self.persistence {
            let backend = backend.clone();
            let to_save = record.clone();
            self.pending_writes.push(tokio::spawn(async move {
                if let Err(e) = backend.save(&to_save).await {
                    warn!("failed to persist history record: {:#}", e);
                }
            }));
        }

        self.records.push_front(record);
        while self.records.len() > self.capacity {
            self.records.pop_back();
        }
    }

    /// Iterate records, most recent first
    pub fn list(&self) -> impl Iterator<Item = &HistoryRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Empty the log.
    ///
    /// Irreversible; the caller layer is responsible for confirming with
    /// the user first. The backend clear is fire and forget like saves.
    pub fn clear(&mut self) {
        self.records.clear();
        if let Some(backend) = &self.persistence {
            let backend = backend.clone();
            self.pending_writes.push(tokio::spawn(async move {
                if let Err(e) = backend.clear().await {
                    warn!("failed to clear persisted history: {:#}", e);
                }
            }));
        }
    }

    /// Wait for outstanding backend writes to settle.
    ///
    /// Appends never block on the backend; a process that is about to
    /// exit calls this so best-effort writes get their chance to land.
    pub async fn flush(&mut self) {
        for handle in self.pending_writes.drain(..) {
            let _ = handle.await;
        }
    }

    /// Serialize the current log
    pub fn export(&self, format: ExportFormat) -> Result<Vec<u8>> {
        export::export(self.records.iter(), format)
    }
}
