//! Typed errors for the extraction pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can match on
//! failure classes: row-level errors are skippable, run-level errors abort the
//! run without touching the checkpoint.

use thiserror::Error;

use crate::pipeline::RunPhase;

/// Errors from the authentication collaborator.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Credentials were rejected. Not retryable.
    #[error("invalid credentials for account: {account}")]
    InvalidCredentials { account: String },

    /// The grant has expired and cannot be refreshed. Not retryable.
    #[error("expired grant for account: {account}")]
    Expired { account: String },

    /// The token endpoint was unreachable or returned a transient failure.
    #[error("auth provider unavailable: {0}")]
    Unavailable(String),
}

impl AuthError {
    /// Whether the pipeline may retry this failure within the run.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::Unavailable(_))
    }
}

/// Errors from the remote analytics query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Network-level or throttling failure; retried with backoff in-client.
    #[error("transient query failure: {0}")]
    Transient(String),

    /// Non-retryable HTTP failure from the analytics API.
    #[error("analytics API returned HTTP {status}")]
    Http { status: u16 },

    /// The query payload could not be serialized or compressed.
    #[error("failed to encode query payload: {0}")]
    Payload(String),

    /// The response body could not be parsed.
    #[error("failed to decode analytics response: {0}")]
    Decode(String),

    /// The configured endpoint URL is not valid.
    #[error("invalid analytics endpoint: {0}")]
    Endpoint(String),
}

impl QueryError {
    /// Whether the client may retry this failure within the run.
    pub fn is_transient(&self) -> bool {
        matches!(self, QueryError::Transient(_))
    }
}

/// Per-row decode failures. Rows failing to decode are skipped, not fatal.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Row length does not match the configured schema length.
    ///
    /// A partial zip would silently misalign every field after the gap, so
    /// the whole row is rejected instead.
    #[error("row has {actual} values but schema expects {expected}")]
    SchemaMismatch { expected: usize, actual: usize },
}

/// Per-record enrichment failure, carrying the offending field.
#[derive(Debug, Error)]
#[error("enrichment failed on field {field}: {reason}")]
pub struct EnrichError {
    /// The source field that could not be processed.
    pub field: String,
    pub reason: String,
}

impl EnrichError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors from the event sink. Always fatal for the run; the checkpoint is
/// left untouched so the next run re-extracts the window.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The write failed or was rejected.
    #[error("sink write failed: {0}")]
    Write(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The write did not complete within the sink's deadline.
    #[error("sink write timed out")]
    Timeout,
}

impl SinkError {
    /// Build a write error from a plain message.
    pub fn write(msg: impl Into<String>) -> Self {
        SinkError::Write(msg.into().into())
    }
}

/// Errors from the checkpoint store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying storage engine failed.
    #[error("checkpoint storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Build a storage error from a plain message.
    pub fn storage(msg: impl Into<String>) -> Self {
        StoreError::Storage(msg.into().into())
    }
}

/// Run-level errors for a pipeline execution.
///
/// Row-level failures ([`DecodeError`], [`EnrichError`]) never surface here;
/// they are logged, counted, and skipped.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("analytics query failed: {0}")]
    Query(#[from] QueryError),

    #[error("sink write failed: {0}")]
    Sink(#[from] SinkError),

    #[error("checkpoint store failed: {0}")]
    Checkpoint(#[from] StoreError),

    /// The run was cancelled between pipeline phases. Cancellation after the
    /// write but before the commit is reported here too, leaving the
    /// checkpoint untouched.
    #[error("run cancelled during {phase}")]
    Cancelled { phase: RunPhase },
}

/// Result type alias for pipeline runs.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Result type alias for analytics queries.
pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// Result type alias for checkpoint store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for sink writes.
pub type SinkResult<T> = std::result::Result<T, SinkError>;
