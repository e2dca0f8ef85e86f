//! The enrichment engine: derived-field computation with bounded fan-out.
//!
//! Each decoded record is enriched independently; there is no cross-record
//! state, so records are dispatched to a bounded pool of workers and the
//! results recombined as one unordered batch. Per-record failures are logged
//! with their row index and skipped; they never abort the run.

pub mod auto_attendant;
pub mod call_queue;
pub mod time;

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::EnrichError;
use crate::schema::ReportKind;
use crate::types::config::EnrichConfig;
use crate::types::record::{DecodedRecord, EnrichedRecord};

/// Batches smaller than this are enriched inline; the task fan-out only pays
/// off once there is real work to spread.
const PARALLEL_MIN_RECORDS: usize = 100;

/// Outcome of enriching one batch.
#[derive(Debug, Default)]
pub struct EnrichmentOutcome {
    /// Successfully enriched records, in no particular order.
    pub records: Vec<EnrichedRecord>,
    /// Records dropped by per-record enrichment failures.
    pub skipped: usize,
}

/// Enrich one decoded record for the given report kind.
pub fn enrich_one(
    kind: ReportKind,
    record: &DecodedRecord,
    config: &EnrichConfig,
) -> Result<EnrichedRecord, EnrichError> {
    match kind {
        ReportKind::CallQueue => call_queue::enrich(record, config).map(EnrichedRecord::CallQueue),
        ReportKind::AutoAttendant => {
            auto_attendant::enrich(record, config).map(EnrichedRecord::AutoAttendant)
        }
    }
}

/// Enrich a batch of decoded records.
///
/// Fans out across `config.parallelism` workers for large batches and runs
/// inline otherwise. All workers are drained before this returns; no record
/// is in flight afterwards.
pub async fn enrich_batch(
    kind: ReportKind,
    decoded: Vec<DecodedRecord>,
    config: &EnrichConfig,
) -> EnrichmentOutcome {
    let total = decoded.len();
    if config.parallelism <= 1 || total < PARALLEL_MIN_RECORDS {
        debug!(report = %kind, records = total, "enriching sequentially");
        return enrich_sequential(kind, decoded, config);
    }

    info!(
        report = %kind,
        records = total,
        workers = config.parallelism,
        "enriching with worker pool"
    );

    let semaphore = Arc::new(Semaphore::new(config.parallelism));
    let shared = Arc::new(config.clone());
    let mut tasks = JoinSet::new();

    for (index, record) in decoded.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let config = Arc::clone(&shared);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.unwrap();
            (index, enrich_one(kind, &record, &config))
        });
    }

    let mut outcome = EnrichmentOutcome::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(record))) => outcome.records.push(record),
            Ok((index, Err(error))) => {
                outcome.skipped += 1;
                warn!(report = %kind, row = index, %error, "skipping record: enrichment failed");
            }
            Err(join_error) => {
                outcome.skipped += 1;
                warn!(report = %kind, %join_error, "skipping record: worker panicked");
            }
        }
    }

    info!(
        report = %kind,
        enriched = outcome.records.len(),
        skipped = outcome.skipped,
        "enrichment complete"
    );
    outcome
}

fn enrich_sequential(
    kind: ReportKind,
    decoded: Vec<DecodedRecord>,
    config: &EnrichConfig,
) -> EnrichmentOutcome {
    let mut outcome = EnrichmentOutcome::default();
    for (index, record) in decoded.iter().enumerate() {
        match enrich_one(kind, record, config) {
            Ok(enriched) => outcome.records.push(enriched),
            Err(error) => {
                outcome.skipped += 1;
                warn!(report = %kind, row = index, %error, "skipping record: enrichment failed");
            }
        }
    }
    outcome
}

/// Extract the resource account name: the identity up to the `@`.
pub(crate) fn resource_account_name(identity: &str) -> String {
    match identity.split_once('@') {
        Some((name, _)) => name.to_string(),
        None => identity.to_string(),
    }
}
