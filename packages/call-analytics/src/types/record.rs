//! Record types flowing through the pipeline: raw rows, decoded records, and
//! fully enriched records.
//!
//! Enriched records serialize with the upstream reporting field names so the
//! sink receives index-ready documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::schema::ReportKind;

/// One raw ordered-array row from the analytics API.
pub type RawRow = Vec<Value>;

/// A raw row zipped against its schema: field name → primitive value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedRecord {
    fields: HashMap<String, Value>,
}

impl DecodedRecord {
    /// Build a record from `(name, value)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        Self {
            fields: pairs
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }

    /// Raw value for a field, if present.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// String value for a field; missing, null, and non-string values become
    /// the empty string, mirroring the upstream rows where absent dimensions
    /// arrive as null.
    pub fn str_or_empty(&self, name: &str) -> String {
        match self.fields.get(name) {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        }
    }

    /// Integer value for a field, with a default for missing or non-numeric
    /// values. Accepts floats the API sometimes emits for count fields.
    pub fn int_or(&self, name: &str, default: i64) -> i64 {
        match self.fields.get(name) {
            Some(v) => v
                .as_i64()
                .or_else(|| v.as_f64().map(|f| f as i64))
                .unwrap_or(default),
            None => default,
        }
    }

    /// Float value for a field, with a default for missing or non-numeric
    /// values.
    pub fn float_or(&self, name: &str, default: f64) -> f64 {
        match self.fields.get(name) {
            Some(v) => v.as_f64().unwrap_or(default),
            None => default,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A fully enriched call-queue record.
///
/// Raw API fields are preserved under `raw*` names; everything else is
/// derived. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallQueueRecord {
    #[serde(rename = "rawUserStartTimeUTC")]
    pub raw_user_start_time_utc: String,
    #[serde(rename = "rawEndTime")]
    pub raw_end_time: String,
    #[serde(rename = "rawCallQueueId")]
    pub raw_call_queue_id: String,
    #[serde(rename = "rawCallQueueIdentity")]
    pub raw_call_queue_identity: String,
    #[serde(rename = "rawCallQueueCallResult")]
    pub raw_call_result: String,
    #[serde(rename = "rawCallQueueTargetType")]
    pub raw_target_type: String,
    #[serde(rename = "rawCallQueueDurationSeconds")]
    pub raw_duration_seconds: f64,
    #[serde(rename = "rawCallQueueAgentCount")]
    pub raw_agent_count: i64,
    #[serde(rename = "rawCallQueueAgentOptInCount")]
    pub raw_agent_opt_in_count: i64,
    #[serde(rename = "rawPSTNConnectivityType")]
    pub raw_connectivity_type: String,
    #[serde(rename = "rawPSTNTotalMinutes")]
    pub raw_pstn_total_minutes: f64,
    #[serde(rename = "rawTotalCallCount")]
    pub raw_total_call_count: i64,

    #[serde(rename = "DocumentID")]
    pub document_id: String,
    #[serde(rename = "ConferenceID")]
    pub conference_id: String,
    #[serde(rename = "DialogID")]
    pub dialog_id: String,

    /// Target type after callback/timeout correction.
    #[serde(rename = "CQTargetType")]
    pub target_type: String,

    #[serde(rename = "CallStartTimeUTC")]
    pub call_start_time_utc: String,
    #[serde(rename = "CallEndTimeUTC")]
    pub call_end_time_utc: String,
    #[serde(rename = "CallStartTimeLocal")]
    pub call_start_time_local: String,
    #[serde(rename = "CallEndTimeLocal")]
    pub call_end_time_local: String,
    /// Midnight of the local start date.
    #[serde(rename = "CallStartDateLocal")]
    pub call_start_date_local: String,
    /// Local start time truncated to the hour.
    #[serde(rename = "Date")]
    pub date: String,
    /// Local hour of day, 0-23.
    #[serde(rename = "CQHour")]
    pub hour: u32,

    #[serde(rename = "CQConnectivityTypeCode")]
    pub connectivity_type_code: i64,
    #[serde(rename = "CQConnectivityTypeString")]
    pub connectivity_type_string: String,
    #[serde(rename = "CQConnectivityTypeRaw")]
    pub connectivity_type_raw: String,

    #[serde(rename = "CQCallResultLegendCode")]
    pub call_result_legend_code: i64,
    #[serde(rename = "CQCallResultLegendString")]
    pub call_result_legend_string: String,
    #[serde(rename = "CQTargetTypeLegendCode")]
    pub target_type_legend_code: i64,
    #[serde(rename = "CQTargetTypeLegendString")]
    pub target_type_legend_string: String,

    #[serde(rename = "CQCallCountAbandoned")]
    pub abandoned_count: i64,

    /// Resource account name: the identity up to the `@`.
    #[serde(rename = "CQRAName")]
    pub ra_name: String,
    /// Display name used for filtering; the friendly name when configured,
    /// the resource account name otherwise.
    #[serde(rename = "CQSlicer")]
    pub slicer: String,
    /// Friendly queue name from the configured lookup, empty when unmapped.
    #[serde(rename = "CQName")]
    pub name: String,

    /// Legacy display key: formatted local start time + resource account name.
    #[serde(rename = "DateTimeCQName")]
    pub datetime_cq_name: String,
    /// Composite dedup key: report kind, raw UTC start, queue identity.
    #[serde(rename = "DedupKey")]
    pub dedup_key: String,

    #[serde(rename = "CQGUID")]
    pub guid: String,
    #[serde(rename = "CQAgentCount")]
    pub agent_count: i64,
    #[serde(rename = "CQAgentOptInCount")]
    pub agent_opt_in_count: i64,
    #[serde(rename = "CQCallDurationSeconds")]
    pub call_duration_seconds: f64,
    #[serde(rename = "CQCallCount")]
    pub call_count: i64,
    #[serde(rename = "CQCallResultRaw")]
    pub call_result_raw: String,
    #[serde(rename = "PSTNTotalMinutes")]
    pub pstn_total_minutes: f64,
    #[serde(rename = "LanguageCode")]
    pub language_code: String,

    /// Parsed start instant, kept for checkpoint advancement.
    #[serde(skip)]
    pub start_utc: Option<DateTime<Utc>>,
}

/// A fully enriched auto-attendant record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoAttendantRecord {
    #[serde(rename = "rawUserStartTimeUTC")]
    pub raw_user_start_time_utc: String,
    #[serde(rename = "rawAutoAttendantIdentity")]
    pub raw_identity: String,
    #[serde(rename = "rawAutoAttendantCallFlow")]
    pub raw_call_flow: String,
    #[serde(rename = "rawAutoAttendantCallResult")]
    pub raw_call_result: String,
    #[serde(rename = "rawAutoAttendantCallerActionCounts")]
    pub raw_caller_action_counts: i64,
    #[serde(rename = "rawAutoAttendantChainDurationInSecs")]
    pub raw_chain_duration_secs: f64,
    #[serde(rename = "rawAutoAttendantChainIndex")]
    pub raw_chain_index: i64,
    #[serde(rename = "rawAutoAttendantChainStartTime")]
    pub raw_chain_start_time: String,
    #[serde(rename = "rawAutoAttendantCount")]
    pub raw_attendant_count: i64,
    #[serde(rename = "rawAutoAttendantDirectorySearchMethod")]
    pub raw_directory_search_method: String,
    #[serde(rename = "rawAutoAttendantId")]
    pub raw_attendant_id: String,
    #[serde(rename = "rawAutoAttendantTransferAction")]
    pub raw_transfer_action: String,
    #[serde(rename = "rawHasAA")]
    pub raw_has_aa: String,
    #[serde(rename = "rawTotalCallCount")]
    pub raw_total_call_count: i64,
    #[serde(rename = "rawPSTNTotalMinutes")]
    pub raw_pstn_total_minutes: f64,

    #[serde(rename = "DocumentID")]
    pub document_id: String,
    #[serde(rename = "ConferenceID")]
    pub conference_id: String,
    #[serde(rename = "DialogID")]
    pub dialog_id: String,

    #[serde(rename = "AARAName")]
    pub ra_name: String,
    #[serde(rename = "AASlicer")]
    pub slicer: String,
    #[serde(rename = "AAName")]
    pub name: String,

    #[serde(rename = "AAGUID")]
    pub guid: String,
    #[serde(rename = "AACallCount")]
    pub call_count: i64,
    #[serde(rename = "AAChainDurationSeconds")]
    pub chain_duration_seconds: f64,
    #[serde(rename = "AACallFlow")]
    pub call_flow: String,
    #[serde(rename = "AACallResult")]
    pub call_result: String,
    #[serde(rename = "AATransferAction")]
    pub transfer_action: String,
    /// Chain start time parsed to UTC; the raw value when unparseable.
    #[serde(rename = "AAChainStartTimeUTC")]
    pub chain_start_time_utc: String,

    #[serde(rename = "PSTNTotalMinutes")]
    pub pstn_total_minutes: f64,
    #[serde(rename = "LanguageCode")]
    pub language_code: String,
    #[serde(rename = "DedupKey")]
    pub dedup_key: String,

    /// Parsed start instant, kept for checkpoint advancement.
    #[serde(skip)]
    pub start_utc: Option<DateTime<Utc>>,
}

/// An enriched record of either report kind.
///
/// Serializes transparently as the inner record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EnrichedRecord {
    CallQueue(CallQueueRecord),
    AutoAttendant(AutoAttendantRecord),
}

impl EnrichedRecord {
    pub fn kind(&self) -> ReportKind {
        match self {
            EnrichedRecord::CallQueue(_) => ReportKind::CallQueue,
            EnrichedRecord::AutoAttendant(_) => ReportKind::AutoAttendant,
        }
    }

    /// The composite dedup key downstream consumers use to discard
    /// duplicates across overlapping extraction windows.
    pub fn dedup_key(&self) -> &str {
        match self {
            EnrichedRecord::CallQueue(r) => &r.dedup_key,
            EnrichedRecord::AutoAttendant(r) => &r.dedup_key,
        }
    }

    /// The record's parsed UTC start instant, used to advance the checkpoint.
    pub fn start_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            EnrichedRecord::CallQueue(r) => r.start_utc,
            EnrichedRecord::AutoAttendant(r) => r.start_utc,
        }
    }
}

/// Build the composite dedup key for a record.
///
/// `kind|raw UTC start|resource identity`. Stable for a given real call
/// event, so re-extraction of an overlapping window produces the same key.
pub fn dedup_key(kind: ReportKind, raw_start_utc: &str, identity: &str) -> String {
    format!("{}|{}|{}", kind.as_str(), raw_start_utc, identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decoded_record_accessors_default_sensibly() {
        let record = DecodedRecord::from_pairs([
            ("Name", json!("queue-a")),
            ("Count", json!(4)),
            ("Minutes", json!(1.5)),
            ("Missing", Value::Null),
        ]);

        assert_eq!(record.str_or_empty("Name"), "queue-a");
        assert_eq!(record.str_or_empty("Missing"), "");
        assert_eq!(record.str_or_empty("NotThere"), "");
        assert_eq!(record.int_or("Count", 0), 4);
        assert_eq!(record.int_or("Minutes", 0), 1);
        assert_eq!(record.int_or("NotThere", 7), 7);
        assert_eq!(record.float_or("Minutes", 0.0), 1.5);
        assert_eq!(record.float_or("NotThere", 0.25), 0.25);
    }

    #[test]
    fn dedup_key_is_stable_and_readable() {
        let key = dedup_key(
            ReportKind::CallQueue,
            "2025-11-28T08:00:00Z",
            "CQBilling@contoso.com",
        );
        assert_eq!(key, "call_queue|2025-11-28T08:00:00Z|CQBilling@contoso.com");
    }
}
