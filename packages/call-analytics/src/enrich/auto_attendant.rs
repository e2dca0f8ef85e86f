//! Auto-attendant record enrichment.
//!
//! Leaner than the call-queue path: raw fields are preserved, name fields and
//! the chain start time are derived, and the dedup key is built from the
//! common start timestamp.

use chrono::SecondsFormat;

use crate::enrich::{resource_account_name, time};
use crate::error::EnrichError;
use crate::schema::ReportKind;
use crate::types::config::EnrichConfig;
use crate::types::record::{dedup_key, AutoAttendantRecord, DecodedRecord};

/// Enrich one decoded auto-attendant record.
///
/// As with call queues, `UserStartTimeUTC` is required; everything else
/// degrades to a defined default.
pub fn enrich(
    record: &DecodedRecord,
    config: &EnrichConfig,
) -> Result<AutoAttendantRecord, EnrichError> {
    let raw_start = record.str_or_empty("UserStartTimeUTC");
    let start_utc = time::parse_utc(&raw_start).ok_or_else(|| {
        EnrichError::new(
            "UserStartTimeUTC",
            format!("unparseable start timestamp: {raw_start:?}"),
        )
    })?;

    let identity = record.str_or_empty("AutoAttendantIdentity");
    let ra_name = resource_account_name(&identity);
    let name = config.names.get(&identity).cloned().unwrap_or_default();
    let slicer = if name.is_empty() { ra_name.clone() } else { name.clone() };

    // Chain start falls back to the raw value when unparseable; it is a
    // display field, not a keying field.
    let raw_chain_start = record.str_or_empty("AutoAttendantChainStartTime");
    let chain_start_time_utc = if raw_chain_start.is_empty() {
        String::new()
    } else {
        match time::parse_utc(&raw_chain_start) {
            Some(parsed) => parsed.fixed_offset().to_rfc3339_opts(SecondsFormat::AutoSi, false),
            None => raw_chain_start.clone(),
        }
    };

    Ok(AutoAttendantRecord {
        raw_user_start_time_utc: raw_start.clone(),
        raw_identity: identity.clone(),
        raw_call_flow: record.str_or_empty("AutoAttendantCallFlow"),
        raw_call_result: record.str_or_empty("AutoAttendantCallResult"),
        raw_caller_action_counts: record.int_or("AutoAttendantCallerActionCounts", 0),
        raw_chain_duration_secs: record.float_or("AutoAttendantChainDurationInSecs", 0.0),
        raw_chain_index: record.int_or("AutoAttendantChainIndex", 0),
        raw_chain_start_time: raw_chain_start,
        raw_attendant_count: record.int_or("AutoAttendantCount", 0),
        raw_directory_search_method: record.str_or_empty("AutoAttendantDirectorySearchMethod"),
        raw_attendant_id: record.str_or_empty("AutoAttendantId"),
        raw_transfer_action: record.str_or_empty("AutoAttendantTransferAction"),
        raw_has_aa: record.str_or_empty("HasAA"),
        raw_total_call_count: record.int_or("TotalCallCount", 1),
        raw_pstn_total_minutes: record.float_or("PSTNTotalMinutes", 0.0),

        document_id: record.str_or_empty("DocumentId"),
        conference_id: record.str_or_empty("ConferenceId"),
        dialog_id: record.str_or_empty("DialogId"),

        guid: record.str_or_empty("AutoAttendantId"),
        call_count: record.int_or("TotalCallCount", 1),
        chain_duration_seconds: record.float_or("AutoAttendantChainDurationInSecs", 0.0),
        call_flow: record.str_or_empty("AutoAttendantCallFlow"),
        call_result: record.str_or_empty("AutoAttendantCallResult"),
        transfer_action: record.str_or_empty("AutoAttendantTransferAction"),
        chain_start_time_utc,

        pstn_total_minutes: record.float_or("PSTNTotalMinutes", 0.0),
        language_code: config.language_code.clone(),
        dedup_key: dedup_key(ReportKind::AutoAttendant, &raw_start, &identity),

        ra_name,
        slicer,
        name,

        start_utc: Some(start_utc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_record() -> DecodedRecord {
        DecodedRecord::from_pairs([
            ("DocumentId", json!("doc-9")),
            ("ConferenceId", json!("conf-9")),
            ("DialogId", json!("dlg-9")),
            ("UserStartTimeUTC", json!("2025-11-27T21:00:00Z")),
            ("EndTime", json!("2025-11-27T21:02:00Z")),
            ("Date", json!("2025-11-27")),
            ("AutoAttendantIdentity", json!("AAReception@contoso.com")),
            ("AutoAttendantCallFlow", json!("Greeting,Menu")),
            ("AutoAttendantCallResult", json!("transferred_to_cq")),
            ("AutoAttendantCallerActionCounts", json!(2)),
            ("AutoAttendantChainDurationInSecs", json!(18.0)),
            ("AutoAttendantChainIndex", json!(1)),
            ("AutoAttendantChainStartTime", json!("2025-11-27T21:00:05")),
            ("AutoAttendantCount", json!(1)),
            ("AutoAttendantDirectorySearchMethod", json!("dtmf")),
            ("AutoAttendantId", json!("aa-guid-1")),
            ("AutoAttendantTransferAction", json!("CallQueue")),
            ("HasAA", json!("True")),
            ("PSTNTotalMinutes", json!(2.0)),
            ("TotalCallCount", json!(1)),
        ])
    }

    #[test]
    fn basic_enrichment() {
        let record = enrich(&base_record(), &EnrichConfig::new()).unwrap();

        assert_eq!(record.ra_name, "AAReception");
        assert_eq!(record.slicer, "AAReception");
        assert_eq!(record.name, "");
        assert_eq!(record.guid, "aa-guid-1");
        assert_eq!(record.call_flow, "Greeting,Menu");
        // naive chain start is parsed as UTC
        assert_eq!(record.chain_start_time_utc, "2025-11-27T21:00:05+00:00");
        assert_eq!(
            record.dedup_key,
            "auto_attendant|2025-11-27T21:00:00Z|AAReception@contoso.com"
        );
        assert_eq!(record.start_utc, crate::enrich::time::parse_utc("2025-11-27T21:00:00Z"));
    }

    #[test]
    fn unparseable_chain_start_passes_through() {
        let pairs = DecodedRecord::from_pairs([
            ("UserStartTimeUTC", json!("2025-11-27T21:00:00Z")),
            ("AutoAttendantChainStartTime", json!("yesterday-ish")),
        ]);
        let record = enrich(&pairs, &EnrichConfig::new()).unwrap();

        assert_eq!(record.chain_start_time_utc, "yesterday-ish");
    }

    #[test]
    fn missing_start_time_is_an_enrichment_error() {
        let err = enrich(
            &DecodedRecord::from_pairs([("AutoAttendantIdentity", json!("AAReception@c.com"))]),
            &EnrichConfig::new(),
        )
        .unwrap_err();

        assert_eq!(err.field, "UserStartTimeUTC");
    }
}
