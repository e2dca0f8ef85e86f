//! In-memory checkpoint store for testing and development.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::StoreResult;
use crate::schema::ReportKind;
use crate::traits::store::CheckpointStore;
use crate::types::checkpoint::Checkpoint;

/// In-memory checkpoint storage.
///
/// Useful for tests and development; checkpoints are lost on restart. The
/// async mutex serializes read-modify-commit sequences, giving the per-key
/// atomicity the pipeline requires.
#[derive(Default)]
pub struct MemoryCheckpointStore {
    inner: Mutex<HashMap<(String, ReportKind), Checkpoint>>,
}

impl MemoryCheckpointStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored checkpoints.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Whether the store holds no checkpoints.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    /// Remove all stored checkpoints.
    pub async fn clear(&self) {
        self.inner.lock().await.clear();
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn get(&self, input_id: &str, kind: ReportKind) -> StoreResult<Option<Checkpoint>> {
        let inner = self.inner.lock().await;
        Ok(inner.get(&(input_id.to_string(), kind)).cloned())
    }

    async fn commit(
        &self,
        input_id: &str,
        kind: ReportKind,
        last_datetime: DateTime<Utc>,
        processed_records: u64,
    ) -> StoreResult<Checkpoint> {
        let mut inner = self.inner.lock().await;
        let key = (input_id.to_string(), kind);

        // The high-water mark never regresses, even on a stale commit.
        let last_datetime = match inner.get(&key) {
            Some(existing) if existing.last_datetime > last_datetime => {
                warn!(
                    input = %input_id,
                    report = %kind,
                    committed = %last_datetime,
                    stored = %existing.last_datetime,
                    "stale checkpoint commit, keeping stored high-water mark"
                );
                existing.last_datetime
            }
            _ => last_datetime,
        };

        let checkpoint = Checkpoint::new(input_id, kind, last_datetime, processed_records, Utc::now());
        inner.insert(key, checkpoint.clone());
        Ok(checkpoint)
    }
}
