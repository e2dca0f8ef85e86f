//! Testing utilities including mock collaborators.
//!
//! These exercise the pipeline without a network, a token endpoint, or a
//! real sink. Each mock records its calls for assertions and can inject
//! failures.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::{AuthError, QueryError, QueryResult, SinkError, SinkResult};
use crate::traits::auth::AuthProvider;
use crate::traits::sink::EventSink;
use crate::traits::source::{AnalyticsSource, QueryRequest};
use crate::types::record::{EnrichedRecord, RawRow};

/// A mock auth provider returning a fixed token.
///
/// Can fail the first N calls transiently, or reject credentials outright.
#[derive(Default)]
pub struct MockAuthProvider {
    token: String,
    transient_failures: AtomicU32,
    invalid_credentials: bool,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockAuthProvider {
    pub fn new() -> Self {
        Self {
            token: "test-token".to_string(),
            ..Default::default()
        }
    }

    /// Set the token returned on success.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Fail the first `count` calls with a transient error.
    pub fn with_transient_failures(self, count: u32) -> Self {
        self.transient_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Reject every call as invalid credentials.
    pub fn with_invalid_credentials(mut self) -> Self {
        self.invalid_credentials = true;
        self
    }

    /// Accounts this mock was asked to authenticate.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn bearer_token(&self, account: &str) -> Result<String, AuthError> {
        self.calls.write().unwrap().push(account.to_string());

        if self.invalid_credentials {
            return Err(AuthError::InvalidCredentials {
                account: account.to_string(),
            });
        }

        let remaining = self.transient_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.transient_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(AuthError::Unavailable("token endpoint unreachable".into()));
        }

        Ok(self.token.clone())
    }
}

/// A mock analytics source returning canned rows.
#[derive(Default)]
pub struct MockAnalyticsSource {
    rows: Vec<RawRow>,
    transient_failures: AtomicU32,
    http_failure: Option<u16>,
    requests: Arc<RwLock<Vec<QueryRequest>>>,
    tokens: Arc<RwLock<Vec<String>>>,
}

impl MockAnalyticsSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one canned row.
    pub fn with_row(mut self, row: RawRow) -> Self {
        self.rows.push(row);
        self
    }

    /// Replace the canned row set.
    pub fn with_rows(mut self, rows: Vec<RawRow>) -> Self {
        self.rows = rows;
        self
    }

    /// Fail the first `count` calls with a transient error.
    pub fn with_transient_failures(self, count: u32) -> Self {
        self.transient_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Fail every call with the given HTTP status.
    pub fn with_http_failure(mut self, status: u16) -> Self {
        self.http_failure = Some(status);
        self
    }

    /// Requests this mock has served.
    pub fn requests(&self) -> Vec<QueryRequest> {
        self.requests.read().unwrap().clone()
    }

    /// Bearer tokens this mock has seen.
    pub fn tokens(&self) -> Vec<String> {
        self.tokens.read().unwrap().clone()
    }
}

#[async_trait]
impl AnalyticsSource for MockAnalyticsSource {
    async fn fetch_rows(&self, token: &str, request: &QueryRequest) -> QueryResult<Vec<RawRow>> {
        self.requests.write().unwrap().push(request.clone());
        self.tokens.write().unwrap().push(token.to_string());

        if let Some(status) = self.http_failure {
            return Err(QueryError::Http { status });
        }

        let remaining = self.transient_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.transient_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(QueryError::Transient("connection reset".into()));
        }

        Ok(self.rows.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A mock event sink collecting written batches.
#[derive(Default)]
pub struct MockEventSink {
    batches: Arc<RwLock<Vec<Vec<EnrichedRecord>>>>,
    fail_writes: bool,
}

impl MockEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every write.
    pub fn with_write_failure(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Batches written so far.
    pub fn batches(&self) -> Vec<Vec<EnrichedRecord>> {
        self.batches.read().unwrap().clone()
    }

    /// All written records, flattened.
    pub fn records(&self) -> Vec<EnrichedRecord> {
        self.batches.read().unwrap().iter().flatten().cloned().collect()
    }

    /// Total written record count.
    pub fn written_count(&self) -> usize {
        self.batches.read().unwrap().iter().map(Vec::len).sum()
    }
}

#[async_trait]
impl EventSink for MockEventSink {
    async fn write(&self, records: &[EnrichedRecord]) -> SinkResult<()> {
        if self.fail_writes {
            return Err(SinkError::write("index unavailable"));
        }
        self.batches.write().unwrap().push(records.to_vec());
        Ok(())
    }
}
