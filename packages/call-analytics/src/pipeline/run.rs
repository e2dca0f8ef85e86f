//! The run orchestrator.
//!
//! One run walks the phases planned-window → auth → query → decode → enrich
//! → write → commit. Row-level failures are skipped and counted; run-level
//! failures abort without touching the checkpoint, which is only advanced
//! after the sink confirms the write. Cancellation is observed between
//! phases, so a cancel after the write but before the commit still leaves
//! the checkpoint untouched.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::enrich;
use crate::error::{PipelineError, Result};
use crate::pipeline::window::plan_window;
use crate::pipeline::{RunPhase, RunReport};
use crate::schema::DimensionSchema;
use crate::traits::source::QueryRequest;
use crate::traits::{AnalyticsSource, AuthProvider, CheckpointStore, EventSink};
use crate::types::checkpoint::QueryWindow;
use crate::types::config::RunConfig;
use crate::types::record::{DecodedRecord, EnrichedRecord, RawRow};

const AUTH_MAX_ATTEMPTS: u32 = 3;
const AUTH_RETRY_BASE_DELAY_MS: u64 = 500;

/// The extraction pipeline, generic over its collaborators.
///
/// # Example
///
/// ```rust,ignore
/// use call_analytics::{Pipeline, RunConfig, ReportKind};
///
/// let pipeline = Pipeline::new(auth, client, sink, store);
/// let report = pipeline.run(&RunConfig::new("input-1", ReportKind::CallQueue, "svc")).await?;
/// ```
pub struct Pipeline<A, Q, S, C> {
    auth: A,
    source: Q,
    sink: S,
    checkpoints: C,
}

impl<A, Q, S, C> Pipeline<A, Q, S, C>
where
    A: AuthProvider,
    Q: AnalyticsSource,
    S: EventSink,
    C: CheckpointStore,
{
    pub fn new(auth: A, source: Q, sink: S, checkpoints: C) -> Self {
        Self {
            auth,
            source,
            sink,
            checkpoints,
        }
    }

    /// Execute one run to completion.
    pub async fn run(&self, config: &RunConfig) -> Result<RunReport> {
        self.run_with_cancel(config, CancellationToken::new()).await
    }

    /// Execute one run, observing the token between phases.
    pub async fn run_with_cancel(
        &self,
        config: &RunConfig,
        cancel: CancellationToken,
    ) -> Result<RunReport> {
        info!(
            input = %config.input_id,
            report = %config.report_kind,
            source = self.source.name(),
            "extraction run starting"
        );

        let result = self.run_inner(config, &cancel).await;
        match &result {
            Ok(report) => info!(
                input = %config.input_id,
                report = %config.report_kind,
                rows = report.rows_fetched,
                skipped = report.rows_skipped,
                written = report.records_written,
                last_datetime = %report.checkpoint.last_datetime,
                "extraction run complete"
            ),
            Err(error) => warn!(
                input = %config.input_id,
                report = %config.report_kind,
                %error,
                "extraction run failed"
            ),
        }
        result
    }

    async fn run_inner(
        &self,
        config: &RunConfig,
        cancel: &CancellationToken,
    ) -> Result<RunReport> {
        // Idle -> WindowPlanned
        let previous = self
            .checkpoints
            .get(&config.input_id, config.report_kind)
            .await?;
        let window = plan_window(previous.as_ref(), config.lookback, Utc::now());
        check_cancel(cancel, RunPhase::WindowPlanned)?;

        // WindowPlanned -> Authenticated
        let token = self.authenticate(&config.account).await?;
        check_cancel(cancel, RunPhase::Authenticated)?;

        // Authenticated -> Queried
        let schema =
            DimensionSchema::for_report(config.report_kind, config.include_optional_measurements);
        let request = QueryRequest::new(&schema, window, config.row_limit);
        let rows = self.source.fetch_rows(&token, &request).await?;
        let rows_fetched = rows.len();
        info!(
            report = %config.report_kind,
            rows = rows_fetched,
            window_start = %window.start_utc,
            "analytics query returned"
        );
        check_cancel(cancel, RunPhase::Queried)?;

        // Queried -> Decoded
        let (decoded, decode_skipped) = decode_rows(&schema, &window, rows);
        check_cancel(cancel, RunPhase::Decoded)?;

        // Decoded -> Enriched. The worker pool is fully drained before the
        // write step; nothing is in flight past this point.
        let outcome = enrich::enrich_batch(config.report_kind, decoded, &config.enrich).await;
        let rows_skipped = decode_skipped + outcome.skipped;
        let records = outcome.records;
        check_cancel(cancel, RunPhase::Enriched)?;

        // Enriched -> Written. All-or-nothing: a sink error aborts the run
        // before any checkpoint movement.
        if records.is_empty() {
            info!(report = %config.report_kind, "no records to write");
        } else {
            self.sink.write(&records).await?;
        }
        check_cancel(cancel, RunPhase::Written)?;

        // Written -> CheckpointCommitted. Advance to the newest record start
        // actually written, never to "now"; an empty run re-commits the
        // window start so the high-water mark holds.
        let last_datetime = max_start(&records).unwrap_or(window.start_utc);
        let checkpoint = self
            .checkpoints
            .commit(
                &config.input_id,
                config.report_kind,
                last_datetime,
                records.len() as u64,
            )
            .await?;

        Ok(RunReport {
            window,
            rows_fetched,
            rows_skipped,
            records_written: records.len(),
            checkpoint,
        })
    }

    /// Obtain a bearer token, retrying transient failures with backoff.
    async fn authenticate(&self, account: &str) -> Result<String> {
        let mut attempt = 1;
        loop {
            match self.auth.bearer_token(account).await {
                Ok(token) => return Ok(token),
                Err(error) if error.is_transient() && attempt < AUTH_MAX_ATTEMPTS => {
                    let delay =
                        Duration::from_millis(AUTH_RETRY_BASE_DELAY_MS) * 2u32.pow(attempt - 1);
                    warn!(
                        attempt,
                        max_attempts = AUTH_MAX_ATTEMPTS,
                        delay_ms = delay.as_millis() as u64,
                        %error,
                        "transient auth failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(PipelineError::Auth(error)),
            }
        }
    }
}

fn check_cancel(cancel: &CancellationToken, phase: RunPhase) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled { phase });
    }
    Ok(())
}

/// Decode every row, skipping and counting schema mismatches.
fn decode_rows(
    schema: &DimensionSchema,
    window: &QueryWindow,
    rows: Vec<RawRow>,
) -> (Vec<DecodedRecord>, usize) {
    let mut decoded = Vec::with_capacity(rows.len());
    let mut skipped = 0;
    for (index, row) in rows.iter().enumerate() {
        match schema.decode_row(row) {
            Ok(record) => decoded.push(record),
            Err(error) => {
                skipped += 1;
                warn!(
                    report = %schema.kind(),
                    row = index,
                    window_start = %window.start_utc,
                    %error,
                    "skipping row: decode failed"
                );
            }
        }
    }
    (decoded, skipped)
}

fn max_start(records: &[EnrichedRecord]) -> Option<DateTime<Utc>> {
    records.iter().filter_map(EnrichedRecord::start_utc).max()
}
