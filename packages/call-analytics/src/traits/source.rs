//! Analytics source seam: the remote ordered-array query interface.

use async_trait::async_trait;

use crate::error::QueryResult;
use crate::schema::DimensionSchema;
use crate::types::checkpoint::QueryWindow;
use crate::types::record::RawRow;

/// One query against the analytics API.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    /// Dimension names, in the positional order rows will follow.
    pub dimensions: Vec<String>,
    /// Measurement names, appended after the dimensions in each row.
    pub measurements: Vec<String>,
    /// Extraction window driving the server-side filters.
    pub window: QueryWindow,
    /// Cap on returned rows.
    pub row_limit: u32,
}

impl QueryRequest {
    /// Build a request from a schema and a planned window.
    pub fn new(schema: &DimensionSchema, window: QueryWindow, row_limit: u32) -> Self {
        Self {
            dimensions: schema.dimensions().to_vec(),
            measurements: schema.measurements().to_vec(),
            window,
            row_limit,
        }
    }
}

/// Issues queries against the remote analytics API.
///
/// Implementations own their transport details (encoding, timeouts) and
/// retry policy for transient failures; the pipeline treats a returned error
/// as final for the run. An empty row set is a valid response, not an error.
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    /// Fetch the raw ordered-array rows matching the request.
    async fn fetch_rows(&self, token: &str, request: &QueryRequest) -> QueryResult<Vec<RawRow>>;

    /// Source name for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}

#[async_trait]
impl<T: AnalyticsSource + ?Sized> AnalyticsSource for std::sync::Arc<T> {
    async fn fetch_rows(&self, token: &str, request: &QueryRequest) -> QueryResult<Vec<RawRow>> {
        (**self).fetch_rows(token, request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
