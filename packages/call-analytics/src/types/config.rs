//! Run and enrichment configuration.

use std::collections::HashMap;

use chrono::Duration;

use crate::enrich::time::TimeZoneSpec;
use crate::schema::ReportKind;

/// Default row cap sent with every analytics query.
pub const DEFAULT_ROW_LIMIT: u32 = 90_000;

/// Default worker count for the enrichment pool.
pub const DEFAULT_PARALLELISM: usize = 4;

/// Configuration for the enrichment step.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// Zone record timestamps are converted into.
    pub timezone: TimeZoneSpec,

    /// Language code stamped on every enriched record.
    pub language_code: String,

    /// Worker count for the enrichment pool.
    pub parallelism: usize,

    /// Emit numeric legend codes. When off, code fields are zero.
    pub legend_codes: bool,

    /// Emit human-readable legend strings alongside the codes.
    pub legend_strings: bool,

    /// Convert timestamps to the configured zone. When off, local fields
    /// carry the UTC values.
    pub timezone_conversion: bool,

    /// Friendly display names keyed by resource account identity.
    pub names: HashMap<String, String>,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            timezone: TimeZoneSpec::Utc,
            language_code: "en-AU".to_string(),
            parallelism: DEFAULT_PARALLELISM,
            legend_codes: true,
            legend_strings: true,
            timezone_conversion: true,
            names: HashMap::new(),
        }
    }
}

impl EnrichConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target timezone from a configured string
    /// (IANA name or legacy `UTC±HH:MM`).
    pub fn with_timezone(mut self, timezone: &str) -> Self {
        self.timezone = TimeZoneSpec::parse(timezone);
        self
    }

    /// Set the language code.
    pub fn with_language_code(mut self, code: impl Into<String>) -> Self {
        self.language_code = code.into();
        self
    }

    /// Set the enrichment worker count.
    pub fn with_parallelism(mut self, workers: usize) -> Self {
        self.parallelism = workers.max(1);
        self
    }

    /// Add a friendly display name for a resource account identity.
    pub fn with_name(mut self, identity: impl Into<String>, name: impl Into<String>) -> Self {
        self.names.insert(identity.into(), name.into());
        self
    }

    /// Replace the friendly-name lookup.
    pub fn with_names(mut self, names: HashMap<String, String>) -> Self {
        self.names = names;
        self
    }

    /// Disable legend code emission.
    pub fn without_legend_codes(mut self) -> Self {
        self.legend_codes = false;
        self
    }

    /// Disable timezone conversion.
    pub fn without_timezone_conversion(mut self) -> Self {
        self.timezone_conversion = false;
        self
    }
}

/// Configuration for one extraction run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Identity of the configured input; part of the checkpoint key.
    pub input_id: String,

    /// Report family to extract.
    pub report_kind: ReportKind,

    /// Account identity handed to the auth provider.
    pub account: String,

    /// How far back the first run (no checkpoint yet) reaches.
    pub lookback: Duration,

    /// Cap on rows requested from the analytics API.
    pub row_limit: u32,

    /// Request the optional measurement set in addition to the defaults.
    pub include_optional_measurements: bool,

    /// Enrichment settings for the run.
    pub enrich: EnrichConfig,
}

impl RunConfig {
    /// Create a run config with default windowing and enrichment.
    pub fn new(
        input_id: impl Into<String>,
        report_kind: ReportKind,
        account: impl Into<String>,
    ) -> Self {
        Self {
            input_id: input_id.into(),
            report_kind,
            account: account.into(),
            lookback: Duration::hours(1),
            row_limit: DEFAULT_ROW_LIMIT,
            include_optional_measurements: false,
            enrich: EnrichConfig::default(),
        }
    }

    /// Set the first-run lookback.
    pub fn with_lookback(mut self, lookback: Duration) -> Self {
        self.lookback = lookback;
        self
    }

    /// Set the query row limit.
    pub fn with_row_limit(mut self, limit: u32) -> Self {
        self.row_limit = limit;
        self
    }

    /// Request the optional measurement set.
    pub fn with_optional_measurements(mut self) -> Self {
        self.include_optional_measurements = true;
        self
    }

    /// Set the enrichment configuration.
    pub fn with_enrich(mut self, enrich: EnrichConfig) -> Self {
        self.enrich = enrich;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enrich_config_builder() {
        let config = EnrichConfig::new()
            .with_timezone("Australia/Sydney")
            .with_language_code("en-US")
            .with_parallelism(8)
            .with_name("CQBilling@contoso.com", "Billing Queue");

        assert!(matches!(config.timezone, TimeZoneSpec::Named(_)));
        assert_eq!(config.language_code, "en-US");
        assert_eq!(config.parallelism, 8);
        assert_eq!(
            config.names.get("CQBilling@contoso.com").map(String::as_str),
            Some("Billing Queue")
        );
    }

    #[test]
    fn parallelism_never_drops_below_one() {
        let config = EnrichConfig::new().with_parallelism(0);
        assert_eq!(config.parallelism, 1);
    }

    #[test]
    fn run_config_defaults() {
        let config = RunConfig::new("input-1", ReportKind::CallQueue, "svc-account");
        assert_eq!(config.lookback, Duration::hours(1));
        assert_eq!(config.row_limit, DEFAULT_ROW_LIMIT);
        assert!(!config.include_optional_measurements);
    }
}
