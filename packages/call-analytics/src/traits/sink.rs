//! Event sink seam.

use async_trait::async_trait;

use crate::error::SinkResult;
use crate::types::record::EnrichedRecord;

/// Receives the enriched batch at the end of a successful run.
///
/// The write must be all-or-nothing from the pipeline's perspective: on
/// `Err` the checkpoint is left untouched and the whole window is
/// re-extracted next run. Implementations should bound the write with their
/// own timeout.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Write the full batch of enriched records.
    async fn write(&self, records: &[EnrichedRecord]) -> SinkResult<()>;
}

#[async_trait]
impl<T: EventSink + ?Sized> EventSink for std::sync::Arc<T> {
    async fn write(&self, records: &[EnrichedRecord]) -> SinkResult<()> {
        (**self).write(records).await
    }
}
