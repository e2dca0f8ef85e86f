//! Incremental Call-Analytics Extraction Library
//!
//! Extracts call-event records from a voice-analytics API and turns them
//! into enriched, query-ready documents for a search/indexing backend. The
//! API returns compact ordered-array rows with no field names; this library
//! decodes them against a configured dimension schema, derives the reporting
//! fields (localized timestamps, legend codes, dedup keys), and delivers
//! them with at-least-once semantics driven by a durable checkpoint.
//!
//! # Design
//!
//! - Checkpointed windows: each run resumes from the stored high-water mark
//!   and only commits after the sink confirms the write.
//! - One decode boundary: rows are validated against the schema in a single
//!   place; a bad row is skipped, never silently truncated.
//! - Total classification: unrecognized outcome values land in defined
//!   fallback buckets instead of failing the run.
//!
//! # Usage
//!
//! ```rust,ignore
//! use call_analytics::{Pipeline, RunConfig, ReportKind, EnrichConfig};
//! use call_analytics::client::VaacClient;
//! use call_analytics::stores::MemoryCheckpointStore;
//!
//! let client = VaacClient::new()?;
//! let pipeline = Pipeline::new(auth, client, sink, MemoryCheckpointStore::new());
//!
//! let config = RunConfig::new("input-1", ReportKind::CallQueue, "svc-account")
//!     .with_enrich(EnrichConfig::new().with_timezone("Australia/Sydney"));
//! let report = pipeline.run(&config).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator seams (AuthProvider, AnalyticsSource, EventSink, CheckpointStore)
//! - [`schema`] - Dimension schemas and positional row decoding
//! - [`legend`] - Outcome classification tables
//! - [`enrich`] - The derived-field enrichment engine
//! - [`pipeline`] - Window planning and the run state machine
//! - [`client`] - The reqwest analytics client
//! - [`stores`] - Checkpoint store implementations
//! - [`testing`] - Mock collaborators for tests

pub mod client;
pub mod enrich;
pub mod error;
pub mod legend;
pub mod pipeline;
pub mod schema;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{
    AuthError, DecodeError, EnrichError, PipelineError, QueryError, Result, SinkError, StoreError,
};
pub use pipeline::{Pipeline, RunPhase, RunReport};
pub use schema::{DimensionSchema, ReportKind};
pub use traits::{AnalyticsSource, AuthProvider, CheckpointStore, EventSink};
pub use types::{
    checkpoint::{Checkpoint, QueryWindow},
    config::{EnrichConfig, RunConfig},
    record::{AutoAttendantRecord, CallQueueRecord, DecodedRecord, EnrichedRecord, RawRow},
};

// Re-export the production client and stores
pub use client::VaacClient;
pub use stores::MemoryCheckpointStore;

#[cfg(feature = "postgres")]
pub use stores::PostgresCheckpointStore;
