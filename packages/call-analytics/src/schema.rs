//! Dimension schemas: the positional contract for decoding analytics rows.
//!
//! The analytics API returns each call event as an ordered array with no
//! field names; the order is exactly the order of the dimensions and
//! measurements sent in the query. The lists here are the single source of
//! truth for that ordering. The common prefix must stay aligned with what the
//! API emits for every report kind — reordering it without a matching server
//! change silently corrupts every decoded record, which is why decoding
//! validates row length here and nowhere else.

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::types::record::{DecodedRecord, RawRow};

/// The report family a run extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    CallQueue,
    AutoAttendant,
}

impl ReportKind {
    /// Stable identifier used in checkpoints and dedup keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::CallQueue => "call_queue",
            ReportKind::AutoAttendant => "auto_attendant",
        }
    }

    /// Parse the stable identifier back into a kind.
    pub fn parse(s: &str) -> Option<ReportKind> {
        match s {
            "call_queue" => Some(ReportKind::CallQueue),
            "auto_attendant" => Some(ReportKind::AutoAttendant),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dimensions shared by every report kind. Must come first, in this order.
pub const COMMON_DIMENSIONS: &[&str] = &[
    "DocumentId",
    "ConferenceId",
    "DialogId",
    "UserStartTimeUTC",
    "EndTime",
    "Date",
];

/// Call-queue dimensions, appended after the common prefix.
pub const CALL_QUEUE_DIMENSIONS: &[&str] = &[
    "CallQueueIdentity",
    "CallQueueAgentCount",
    "CallQueueAgentOptInCount",
    "CallQueueCallResult",
    "CallQueueDurationSeconds",
    "CallQueueFinalStateAction",
    "CallQueueId",
    "CallQueueTargetType",
    "HasCQ",
    "TransferredFromCQId",
    "TransferredFromCallQueueIdentity",
];

/// Auto-attendant dimensions, appended after the common prefix.
pub const AUTO_ATTENDANT_DIMENSIONS: &[&str] = &[
    "AutoAttendantIdentity",
    "AutoAttendantCallFlow",
    "AutoAttendantCallResult",
    "AutoAttendantCallerActionCounts",
    "AutoAttendantChainDurationInSecs",
    "AutoAttendantChainIndex",
    "AutoAttendantChainStartTime",
    "AutoAttendantCount",
    "AutoAttendantDirectorySearchMethod",
    "AutoAttendantId",
    "AutoAttendantTransferAction",
    "HasAA",
];

/// Measurements requested for every report kind.
pub const DEFAULT_MEASUREMENTS: &[&str] = &["PSTNTotalMinutes", "TotalCallCount"];

/// Extra call-queue measurements, included when optional measurements are on.
pub const OPTIONAL_CALL_QUEUE_MEASUREMENTS: &[&str] =
    &["AvgCallDuration", "AvgCallQueueDurationSeconds"];

/// Extra auto-attendant measurements, included when optional measurements are on.
pub const OPTIONAL_AUTO_ATTENDANT_MEASUREMENTS: &[&str] =
    &["AvgAutoAttendantChainDurationSeconds"];

/// Optional measurements available to both report kinds.
pub const OPTIONAL_GENERAL_MEASUREMENTS: &[&str] = &["TotalAudioStreamDuration"];

/// The ordered dimension and measurement lists for one report kind.
///
/// A value object: build it once per run and pass it wherever the positional
/// contract is needed (query construction and row decoding).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionSchema {
    kind: ReportKind,
    dimensions: Vec<String>,
    measurements: Vec<String>,
}

impl DimensionSchema {
    /// Build the schema for a report kind.
    pub fn for_report(kind: ReportKind, include_optional_measurements: bool) -> Self {
        let specific = match kind {
            ReportKind::CallQueue => CALL_QUEUE_DIMENSIONS,
            ReportKind::AutoAttendant => AUTO_ATTENDANT_DIMENSIONS,
        };
        let dimensions = COMMON_DIMENSIONS
            .iter()
            .chain(specific.iter())
            .map(|s| s.to_string())
            .collect();

        let mut measurements: Vec<String> =
            DEFAULT_MEASUREMENTS.iter().map(|s| s.to_string()).collect();
        if include_optional_measurements {
            let extra = match kind {
                ReportKind::CallQueue => OPTIONAL_CALL_QUEUE_MEASUREMENTS,
                ReportKind::AutoAttendant => OPTIONAL_AUTO_ATTENDANT_MEASUREMENTS,
            };
            measurements.extend(extra.iter().map(|s| s.to_string()));
            measurements.extend(OPTIONAL_GENERAL_MEASUREMENTS.iter().map(|s| s.to_string()));
        }

        Self {
            kind,
            dimensions,
            measurements,
        }
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    pub fn measurements(&self) -> &[String] {
        &self.measurements
    }

    /// Total field count a row must carry: dimensions then measurements.
    pub fn len(&self) -> usize {
        self.dimensions.len() + self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty() && self.measurements.is_empty()
    }

    /// All field names in positional order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.dimensions
            .iter()
            .chain(self.measurements.iter())
            .map(String::as_str)
    }

    /// Decode one raw ordered-array row into a named record.
    ///
    /// Pure and safe to call concurrently across rows. Rejects the whole row
    /// when its length does not match the schema; a partial zip would
    /// misalign every field after the gap.
    pub fn decode_row(&self, row: &RawRow) -> Result<DecodedRecord, DecodeError> {
        if row.len() != self.len() {
            return Err(DecodeError::SchemaMismatch {
                expected: self.len(),
                actual: row.len(),
            });
        }
        Ok(DecodedRecord::from_pairs(
            self.field_names().zip(row.iter().cloned()),
        ))
    }

    /// Re-project a decoded record back into positional order.
    ///
    /// The inverse of [`decode_row`](Self::decode_row); fields missing from
    /// the record come back as null.
    pub fn project_row(&self, record: &DecodedRecord) -> RawRow {
        self.field_names()
            .map(|name| record.value(name).cloned().unwrap_or(serde_json::Value::Null))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn schemas_start_with_the_common_prefix() {
        for kind in [ReportKind::CallQueue, ReportKind::AutoAttendant] {
            let schema = DimensionSchema::for_report(kind, false);
            assert_eq!(&schema.dimensions()[..COMMON_DIMENSIONS.len()], COMMON_DIMENSIONS);
        }
    }

    #[test]
    fn call_queue_schema_length() {
        let schema = DimensionSchema::for_report(ReportKind::CallQueue, false);
        assert_eq!(schema.dimensions().len(), 17);
        assert_eq!(schema.measurements(), &["PSTNTotalMinutes", "TotalCallCount"]);
        assert_eq!(schema.len(), 19);
    }

    #[test]
    fn optional_measurements_are_appended() {
        let schema = DimensionSchema::for_report(ReportKind::CallQueue, true);
        assert_eq!(
            schema.measurements(),
            &[
                "PSTNTotalMinutes",
                "TotalCallCount",
                "AvgCallDuration",
                "AvgCallQueueDurationSeconds",
                "TotalAudioStreamDuration",
            ]
        );
    }

    #[test]
    fn decode_rejects_length_mismatch() {
        let schema = DimensionSchema::for_report(ReportKind::CallQueue, false);
        let row: RawRow = vec![json!("x"); schema.len() - 1];
        let err = schema.decode_row(&row).unwrap_err();
        match err {
            DecodeError::SchemaMismatch { expected, actual } => {
                assert_eq!(expected, 19);
                assert_eq!(actual, 18);
            }
        }
    }

    #[test]
    fn decode_then_project_round_trips() {
        let schema = DimensionSchema::for_report(ReportKind::AutoAttendant, false);
        let row: RawRow = (0..schema.len())
            .map(|i| match i % 3 {
                0 => json!(format!("value-{i}")),
                1 => json!(i),
                _ => serde_json::Value::Null,
            })
            .collect();

        let decoded = schema.decode_row(&row).unwrap();
        assert_eq!(schema.project_row(&decoded), row);
    }

    #[test]
    fn report_kind_round_trips_through_identifier() {
        for kind in [ReportKind::CallQueue, ReportKind::AutoAttendant] {
            assert_eq!(ReportKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ReportKind::parse("something_else"), None);
    }
}
