//! Checkpoint store seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreResult;
use crate::schema::ReportKind;
use crate::types::checkpoint::Checkpoint;

/// Durable checkpoint storage, keyed by `(input_id, report_kind)`.
///
/// Implementations must provide read-modify-commit atomicity per key so that
/// two runs for the same identity cannot race, and must keep `last_datetime`
/// monotonically non-decreasing: a commit carrying an older timestamp keeps
/// the stored high-water mark.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Fetch the checkpoint for a key, if one exists.
    async fn get(&self, input_id: &str, kind: ReportKind) -> StoreResult<Option<Checkpoint>>;

    /// Commit a new checkpoint for a key, returning the stored value.
    ///
    /// Only called after a confirmed sink write; `last_datetime` is the
    /// maximum record start time observed among the written records.
    async fn commit(
        &self,
        input_id: &str,
        kind: ReportKind,
        last_datetime: DateTime<Utc>,
        processed_records: u64,
    ) -> StoreResult<Checkpoint>;
}

#[async_trait]
impl<T: CheckpointStore + ?Sized> CheckpointStore for std::sync::Arc<T> {
    async fn get(&self, input_id: &str, kind: ReportKind) -> StoreResult<Option<Checkpoint>> {
        (**self).get(input_id, kind).await
    }

    async fn commit(
        &self,
        input_id: &str,
        kind: ReportKind,
        last_datetime: DateTime<Utc>,
        processed_records: u64,
    ) -> StoreResult<Checkpoint> {
        (**self).commit(input_id, kind, last_datetime, processed_records).await
    }
}
