//! Checkpoints and extraction windows.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::ReportKind;

/// The durable high-water mark for one `(input_id, report_kind)` pair.
///
/// Owned exclusively by the checkpoint store; the pipeline only reads it when
/// planning a window and commits a new one after a confirmed sink write.
/// `last_datetime` is monotonically non-decreasing per key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub input_id: String,
    #[serde(rename = "report_type")]
    pub report_kind: ReportKind,
    /// Maximum `UserStartTimeUTC` among records durably written so far.
    pub last_datetime: DateTime<Utc>,
    /// Records written by the run that produced this checkpoint.
    pub processed_records: u64,
    pub updated_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(
        input_id: impl Into<String>,
        report_kind: ReportKind,
        last_datetime: DateTime<Utc>,
        processed_records: u64,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            input_id: input_id.into(),
            report_kind,
            last_datetime,
            processed_records,
            updated_at,
        }
    }
}

/// The extraction window for one run. Transient; recomputed every run.
///
/// `start_utc` is the precise inclusive lower bound; `start_date`/`end_date`
/// are coarse calendar-day bounds sent alongside it as server-side filters.
/// The inclusive bound means boundary records can be fetched twice across
/// runs; downstream dedup keys resolve that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub start_utc: DateTime<Utc>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}
