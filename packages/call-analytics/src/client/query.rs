//! Wire payload for the analytics query endpoint.
//!
//! The endpoint takes the whole query as a single URL parameter: compact
//! JSON, gzip-compressed, base64-encoded. Field casing below matches the
//! upstream data-model names exactly.

use std::io::Write;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;

use crate::error::{QueryError, QueryResult};
use crate::traits::source::QueryRequest;
use crate::types::checkpoint::QueryWindow;

/// Comparison operand codes understood by the analytics API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperand {
    Equals,
    GreaterOrEqual,
    LessOrEqual,
}

impl FilterOperand {
    /// The numeric code sent on the wire.
    pub fn code(self) -> u8 {
        match self {
            FilterOperand::Equals => 0,
            FilterOperand::GreaterOrEqual => 5,
            FilterOperand::LessOrEqual => 6,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QueryPayload {
    #[serde(rename = "Filters")]
    pub filters: Vec<WireFilter>,
    #[serde(rename = "Dimensions")]
    pub dimensions: Vec<WireField>,
    #[serde(rename = "Measurements")]
    pub measurements: Vec<WireField>,
    #[serde(rename = "Parameters")]
    pub parameters: WireParameters,
    #[serde(rename = "LimitResultRowsCount")]
    pub row_limit: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireField {
    #[serde(rename = "DataModelName")]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireFilter {
    #[serde(rename = "DataModelName")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "Operand")]
    pub operand: u8,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireParameters {
    #[serde(rename = "UserAgent")]
    pub user_agent: String,
}

impl WireFilter {
    fn new(name: &str, value: String, operand: FilterOperand) -> Self {
        Self {
            name: name.to_string(),
            value,
            operand: operand.code(),
        }
    }
}

/// Server-side filters for a planned window: the precise timestamp lower
/// bound plus coarse calendar-day bounds.
pub(crate) fn filters_for_window(window: &QueryWindow) -> Vec<WireFilter> {
    vec![
        WireFilter::new(
            "UserStartTimeUTC",
            window.start_utc.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            FilterOperand::GreaterOrEqual,
        ),
        WireFilter::new(
            "Date",
            window.start_date.format("%Y-%m-%d").to_string(),
            FilterOperand::GreaterOrEqual,
        ),
        WireFilter::new(
            "Date",
            window.end_date.format("%Y-%m-%d").to_string(),
            FilterOperand::LessOrEqual,
        ),
    ]
}

/// Build the wire payload for a request.
pub(crate) fn build_payload(request: &QueryRequest, user_agent: &str) -> QueryPayload {
    QueryPayload {
        filters: filters_for_window(&request.window),
        dimensions: request
            .dimensions
            .iter()
            .map(|name| WireField { name: name.clone() })
            .collect(),
        measurements: request
            .measurements
            .iter()
            .map(|name| WireField { name: name.clone() })
            .collect(),
        parameters: WireParameters {
            user_agent: user_agent.to_string(),
        },
        row_limit: request.row_limit,
    }
}

/// Encode a payload for the `query` URL parameter:
/// compact JSON → gzip → base64.
pub(crate) fn encode_payload(payload: &QueryPayload) -> QueryResult<String> {
    let json =
        serde_json::to_vec(payload).map_err(|e| QueryError::Payload(e.to_string()))?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&json)
        .map_err(|e| QueryError::Payload(e.to_string()))?;
    let compressed = encoder
        .finish()
        .map_err(|e| QueryError::Payload(e.to_string()))?;

    Ok(BASE64.encode(compressed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DimensionSchema, ReportKind};
    use chrono::{NaiveDate, TimeZone, Utc};
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn window() -> QueryWindow {
        QueryWindow {
            start_utc: Utc.with_ymd_and_hms(2025, 11, 27, 21, 0, 0).unwrap(),
            start_date: NaiveDate::from_ymd_opt(2025, 11, 27).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 11, 28).unwrap(),
        }
    }

    #[test]
    fn operand_codes_match_the_wire_protocol() {
        assert_eq!(FilterOperand::Equals.code(), 0);
        assert_eq!(FilterOperand::GreaterOrEqual.code(), 5);
        assert_eq!(FilterOperand::LessOrEqual.code(), 6);
    }

    #[test]
    fn window_filters_bound_the_extraction() {
        let filters = filters_for_window(&window());

        assert_eq!(filters.len(), 3);
        assert_eq!(filters[0].name, "UserStartTimeUTC");
        assert_eq!(filters[0].value, "2025-11-27T21:00:00Z");
        assert_eq!(filters[0].operand, 5);
        assert_eq!(filters[1].value, "2025-11-27");
        assert_eq!(filters[1].operand, 5);
        assert_eq!(filters[2].value, "2025-11-28");
        assert_eq!(filters[2].operand, 6);
    }

    #[test]
    fn encoded_payload_round_trips_through_gzip() {
        let schema = DimensionSchema::for_report(ReportKind::CallQueue, false);
        let request = QueryRequest::new(&schema, window(), 90_000);
        let payload = build_payload(&request, "test-agent");

        let encoded = encode_payload(&payload).unwrap();
        let compressed = BASE64.decode(encoded.as_bytes()).unwrap();
        let mut json = String::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_string(&mut json)
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["LimitResultRowsCount"], 90_000);
        assert_eq!(value["Parameters"]["UserAgent"], "test-agent");
        assert_eq!(value["Dimensions"][0]["DataModelName"], "DocumentId");
        assert_eq!(
            value["Dimensions"].as_array().unwrap().len(),
            schema.dimensions().len()
        );
        assert_eq!(value["Measurements"][0]["DataModelName"], "PSTNTotalMinutes");
        assert_eq!(value["Filters"][0]["Operand"], 5);
    }
}
