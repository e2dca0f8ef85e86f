//! Extraction pipeline: window planning and the run state machine.

pub mod run;
pub mod window;

pub use run::Pipeline;
pub use window::plan_window;

use crate::types::checkpoint::{Checkpoint, QueryWindow};

/// Phases a run moves through. A run that completes ends at
/// `CheckpointCommitted`; a failure carries the phase it was in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    WindowPlanned,
    Authenticated,
    Queried,
    Decoded,
    Enriched,
    Written,
    CheckpointCommitted,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunPhase::Idle => "idle",
            RunPhase::WindowPlanned => "window-planned",
            RunPhase::Authenticated => "authenticated",
            RunPhase::Queried => "queried",
            RunPhase::Decoded => "decoded",
            RunPhase::Enriched => "enriched",
            RunPhase::Written => "written",
            RunPhase::CheckpointCommitted => "checkpoint-committed",
        };
        f.write_str(name)
    }
}

/// What a completed run did, for logging and host observability.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Window the run extracted.
    pub window: QueryWindow,
    /// Raw rows returned by the analytics API.
    pub rows_fetched: usize,
    /// Rows dropped by decode or enrichment failures.
    pub rows_skipped: usize,
    /// Enriched records durably handed to the sink.
    pub records_written: usize,
    /// Checkpoint stored by the commit step.
    pub checkpoint: Checkpoint,
}
