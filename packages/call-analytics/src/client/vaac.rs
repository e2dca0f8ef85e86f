//! HTTP client for the voice-analytics query endpoint.
//!
//! Owns the transport policy the pipeline expects of its source: a request
//! timeout, bounded retry with exponential backoff on transient failures,
//! and mapping of the `dataResult` response body into raw rows.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::client::query::{build_payload, encode_payload};
use crate::error::{QueryError, QueryResult};
use crate::traits::source::{AnalyticsSource, QueryRequest};
use crate::types::record::RawRow;

/// Default analytics endpoint.
pub const DEFAULT_ENDPOINT: &str =
    "https://api.interfaces.records.teams.microsoft.com/Teams.VoiceAnalytics/getanalytics";

/// User agent the endpoint expects; it rejects unrecognized reporting
/// clients.
pub const DEFAULT_USER_AGENT: &str = "Power BI Desktop V3.1.8";

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 500;

#[derive(Debug, Deserialize)]
struct AnalyticsResponse {
    #[serde(rename = "dataResult", default)]
    data_result: Vec<RawRow>,
}

/// Client for the voice-analytics API.
///
/// # Example
///
/// ```rust,ignore
/// use call_analytics::client::VaacClient;
///
/// let client = VaacClient::new()?.with_max_attempts(5);
/// let rows = client.fetch_rows(&token, &request).await?;
/// ```
pub struct VaacClient {
    client: reqwest::Client,
    endpoint: Url,
    user_agent: String,
    max_attempts: u32,
    retry_base_delay: Duration,
}

impl VaacClient {
    /// Create a client against the default endpoint.
    pub fn new() -> QueryResult<Self> {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Create a client against a custom endpoint.
    pub fn with_endpoint(endpoint: &str) -> QueryResult<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| QueryError::Endpoint(e.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| QueryError::Transient(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_DELAY_MS),
        })
    }

    /// Set the user agent sent in the query parameters.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the maximum attempts per query (including the first).
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the base delay for exponential backoff between attempts.
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Replace the HTTP client, e.g. to change the request timeout.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    async fn fetch_once(&self, token: &str, request: &QueryRequest) -> QueryResult<Vec<RawRow>> {
        let payload = build_payload(request, &self.user_agent);
        let encoded = encode_payload(&payload)?;

        debug!(endpoint = %self.endpoint, rows_limit = request.row_limit, "querying analytics API");
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("query", encoded.as_str())])
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    QueryError::Transient(e.to_string())
                } else {
                    QueryError::Http {
                        status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                    }
                }
            })?;

        let status = response.status();
        if status.is_server_error() || status.as_u16() == 429 {
            return Err(QueryError::Transient(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(QueryError::Http {
                status: status.as_u16(),
            });
        }

        let body: AnalyticsResponse = response
            .json()
            .await
            .map_err(|e| QueryError::Decode(e.to_string()))?;

        Ok(body.data_result)
    }
}

#[async_trait]
impl AnalyticsSource for VaacClient {
    async fn fetch_rows(&self, token: &str, request: &QueryRequest) -> QueryResult<Vec<RawRow>> {
        let mut attempt = 1;
        loop {
            match self.fetch_once(token, request).await {
                Ok(rows) => {
                    debug!(rows = rows.len(), attempt, "analytics query succeeded");
                    return Ok(rows);
                }
                Err(error) if error.is_transient() && attempt < self.max_attempts => {
                    let delay = self.retry_base_delay * 2u32.pow(attempt - 1);
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        %error,
                        "transient query failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    fn name(&self) -> &str {
        "vaac"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_validates_the_endpoint() {
        assert!(VaacClient::new().is_ok());
        assert!(VaacClient::with_endpoint("not a url").is_err());
    }

    #[test]
    fn attempts_never_drop_below_one() {
        let client = VaacClient::new().unwrap().with_max_attempts(0);
        assert_eq!(client.max_attempts, 1);
    }

    #[test]
    fn empty_data_result_deserializes() {
        let body: AnalyticsResponse = serde_json::from_str("{}").unwrap();
        assert!(body.data_result.is_empty());

        let body: AnalyticsResponse =
            serde_json::from_str(r#"{"dataResult": [["a", 1, null]]}"#).unwrap();
        assert_eq!(body.data_result.len(), 1);
        assert_eq!(body.data_result[0].len(), 3);
    }
}
