//! Call-queue record enrichment.
//!
//! Turns one decoded call-queue row into the full reporting record: parsed
//! and localized timestamps, corrected target type, legend codes, abandoned
//! flag, name fields, and the composite dedup key.

use chrono::{SecondsFormat, Timelike};

use crate::enrich::{resource_account_name, time};
use crate::error::EnrichError;
use crate::legend;
use crate::schema::ReportKind;
use crate::types::config::EnrichConfig;
use crate::types::record::{dedup_key, CallQueueRecord, DecodedRecord};

/// Enrich one decoded call-queue record.
///
/// A missing or unparseable `UserStartTimeUTC` fails the record: without the
/// start instant there is no dedup key and no checkpoint contribution. Every
/// other field degrades to a defined default instead of failing.
pub fn enrich(record: &DecodedRecord, config: &EnrichConfig) -> Result<CallQueueRecord, EnrichError> {
    let raw_start = record.str_or_empty("UserStartTimeUTC");
    let start_utc = time::parse_utc(&raw_start).ok_or_else(|| {
        EnrichError::new(
            "UserStartTimeUTC",
            format!("unparseable start timestamp: {raw_start:?}"),
        )
    })?;
    let raw_end = record.str_or_empty("EndTime");
    let end_utc = time::parse_utc(&raw_end);

    let raw_call_result = record.str_or_empty("CallQueueCallResult");
    let raw_target_type = record.str_or_empty("CallQueueTargetType");
    let target_type = legend::corrected_target_type(&raw_call_result, &raw_target_type).to_string();

    let (start_local, end_local) = if config.timezone_conversion {
        (
            time::to_local(start_utc, &config.timezone),
            end_utc.map(|end| time::to_local(end, &config.timezone)),
        )
    } else {
        (start_utc.fixed_offset(), end_utc.map(|end| end.fixed_offset()))
    };

    let identity = record.str_or_empty("CallQueueIdentity");
    let ra_name = resource_account_name(&identity);
    let name = config.names.get(&identity).cloned().unwrap_or_default();
    let slicer = if name.is_empty() { ra_name.clone() } else { name.clone() };

    let raw_connectivity = record.str_or_empty("PSTNConnectivityType");
    let (connectivity_code, connectivity_label) = legend::connectivity_legend(&raw_connectivity);

    let (result_code, result_label) = if config.legend_codes {
        legend::call_result_legend(&raw_call_result, &target_type)
    } else {
        (0, "")
    };
    let (disposition_code, disposition_label) = if config.legend_codes {
        legend::target_type_legend(&raw_call_result, &target_type)
    } else {
        (0, "")
    };
    let emit_strings = config.legend_codes && config.legend_strings;

    let datetime_cq_name = format!(
        "{}{}",
        start_local.format("%-d/%-m/%Y %-I:%M:%S %p"),
        ra_name
    );

    Ok(CallQueueRecord {
        raw_user_start_time_utc: raw_start.clone(),
        raw_end_time: raw_end,
        raw_call_queue_id: record.str_or_empty("CallQueueId"),
        raw_call_queue_identity: identity.clone(),
        raw_call_result: raw_call_result.clone(),
        raw_target_type,
        raw_duration_seconds: record.float_or("CallQueueDurationSeconds", 0.0),
        raw_agent_count: record.int_or("CallQueueAgentCount", 0),
        raw_agent_opt_in_count: record.int_or("CallQueueAgentOptInCount", 0),
        raw_connectivity_type: raw_connectivity.clone(),
        raw_pstn_total_minutes: record.float_or("PSTNTotalMinutes", 0.0),
        raw_total_call_count: record.int_or("TotalCallCount", 1),

        document_id: record.str_or_empty("DocumentId"),
        conference_id: record.str_or_empty("ConferenceId"),
        dialog_id: record.str_or_empty("DialogId"),

        call_start_time_utc: start_utc
            .fixed_offset()
            .to_rfc3339_opts(SecondsFormat::AutoSi, false),
        call_end_time_utc: end_utc
            .map(|end| end.fixed_offset().to_rfc3339_opts(SecondsFormat::AutoSi, false))
            .unwrap_or_default(),
        call_start_time_local: start_local.to_rfc3339_opts(SecondsFormat::AutoSi, false),
        call_end_time_local: end_local
            .map(|end| end.to_rfc3339_opts(SecondsFormat::AutoSi, false))
            .unwrap_or_default(),
        call_start_date_local: start_local.format("%Y-%m-%dT00:00:00%:z").to_string(),
        date: start_local.format("%Y-%m-%dT%H:00:00%:z").to_string(),
        hour: start_local.hour(),

        connectivity_type_code: connectivity_code,
        connectivity_type_string: connectivity_label.to_string(),
        connectivity_type_raw: raw_connectivity,

        call_result_legend_code: result_code,
        call_result_legend_string: if emit_strings { result_label.to_string() } else { String::new() },
        target_type_legend_code: disposition_code,
        target_type_legend_string: if emit_strings {
            disposition_label.to_string()
        } else {
            String::new()
        },

        abandoned_count: i64::from(legend::is_abandoned(&raw_call_result, &target_type)),

        datetime_cq_name,
        dedup_key: dedup_key(ReportKind::CallQueue, &raw_start, &identity),

        guid: record.str_or_empty("CallQueueId"),
        agent_count: record.int_or("CallQueueAgentCount", 0),
        agent_opt_in_count: record.int_or("CallQueueAgentOptInCount", 0),
        call_duration_seconds: record.float_or("CallQueueDurationSeconds", 0.0),
        call_count: record.int_or("TotalCallCount", 1),
        call_result_raw: raw_call_result,
        pstn_total_minutes: record.float_or("PSTNTotalMinutes", 0.0),
        language_code: config.language_code.clone(),

        target_type,
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
            ("DocumentId", json!("doc-1")),
            ("ConferenceId", json!("conf-1")),
            ("DialogId", json!("dlg-1")),
            ("UserStartTimeUTC", json!("2025-11-27T21:00:00Z")),
            ("EndTime", json!("2025-11-27T21:05:30Z")),
            ("Date", json!("2025-11-27")),
            ("CallQueueIdentity", json!("CQBilling@contoso.com")),
            ("CallQueueAgentCount", json!(12)),
            ("CallQueueAgentOptInCount", json!(9)),
            ("CallQueueCallResult", json!("agent_joined_conference")),
            ("CallQueueDurationSeconds", json!(42.5)),
            ("CallQueueFinalStateAction", json!("answered")),
            ("CallQueueId", json!("9f1c9a52-0001")),
            ("CallQueueTargetType", json!("User")),
            ("HasCQ", json!("True")),
            ("PSTNTotalMinutes", json!(5.5)),
            ("TotalCallCount", json!(1)),
        ])
    }

    fn sydney_config() -> EnrichConfig {
        EnrichConfig::new().with_timezone("Australia/Sydney")
    }

    #[test]
    fn answered_call_full_enrichment() {
        let record = enrich(&base_record(), &sydney_config()).unwrap();

        assert_eq!(record.call_result_legend_code, 4001);
        assert_eq!(record.call_result_legend_string, "Agent Answered");
        assert_eq!(record.target_type_legend_code, 4010);
        assert_eq!(record.abandoned_count, 0);
        assert_eq!(record.ra_name, "CQBilling");
        assert_eq!(record.slicer, "CQBilling");
        assert_eq!(record.name, "");
        assert_eq!(record.guid, "9f1c9a52-0001");

        // 2025-11-27T21:00:00Z is 2025-11-28 08:00 in Sydney (DST, +11)
        assert_eq!(record.call_start_time_local, "2025-11-28T08:00:00+11:00");
        assert_eq!(record.call_start_date_local, "2025-11-28T00:00:00+11:00");
        assert_eq!(record.date, "2025-11-28T08:00:00+11:00");
        assert_eq!(record.hour, 8);
        assert_eq!(record.datetime_cq_name, "28/11/2025 8:00:00 AMCQBilling");
        assert_eq!(
            record.dedup_key,
            "call_queue|2025-11-27T21:00:00Z|CQBilling@contoso.com"
        );
    }

    #[test]
    fn not_authorized_gets_the_dedicated_code() {
        let pairs = DecodedRecord::from_pairs([
            ("UserStartTimeUTC", json!("2025-11-27T21:00:00Z")),
            ("CallQueueCallResult", json!("NOTAUTHCQ")),
            ("CallQueueIdentity", json!("CQBilling@contoso.com")),
        ]);
        let record = enrich(&pairs, &EnrichConfig::new()).unwrap();

        assert_eq!(record.call_result_legend_code, 4999);
        assert_eq!(record.call_result_legend_string, "Not Authorized");
        assert_eq!(record.target_type_legend_code, 0);
    }

    #[test]
    fn abandoned_call_sets_count_and_codes() {
        let pairs = DecodedRecord::from_pairs([
            ("UserStartTimeUTC", json!("2025-11-27T21:00:00Z")),
            ("CallQueueCallResult", json!("disconnected")),
            ("CallQueueTargetType", json!("Disconnect")),
        ]);
        let record = enrich(&pairs, &EnrichConfig::new()).unwrap();

        assert_eq!(record.abandoned_count, 1);
        assert_eq!(record.call_result_legend_code, 4012);
        assert_eq!(record.target_type_legend_code, 4012);
    }

    #[test]
    fn callback_timeout_corrects_the_target_type() {
        let pairs = DecodedRecord::from_pairs([
            ("UserStartTimeUTC", json!("2025-11-27T21:00:00Z")),
            ("CallQueueCallResult", json!("callback_call_timed_out")),
            ("CallQueueTargetType", json!("User")),
        ]);
        let record = enrich(&pairs, &EnrichConfig::new()).unwrap();

        assert_eq!(record.target_type, "Disconnect");
        assert_eq!(record.raw_target_type, "User");
        assert_eq!(record.call_result_legend_code, 4003);
        assert_eq!(record.target_type_legend_code, 4025);
    }

    #[test]
    fn blank_connectivity_maps_to_unknown() {
        let record = enrich(
            &DecodedRecord::from_pairs([("UserStartTimeUTC", json!("2025-11-27T21:00:00Z"))]),
            &EnrichConfig::new(),
        )
        .unwrap();

        assert_eq!(record.connectivity_type_code, 8620);
        assert_eq!(record.connectivity_type_string, "Unknown");
    }

    #[test]
    fn missing_start_time_is_an_enrichment_error() {
        let err = enrich(
            &DecodedRecord::from_pairs([("CallQueueCallResult", json!("timed_out"))]),
            &EnrichConfig::new(),
        )
        .unwrap_err();

        assert_eq!(err.field, "UserStartTimeUTC");
    }

    #[test]
    fn friendly_name_lookup_feeds_name_and_slicer() {
        let config = sydney_config().with_name("CQBilling@contoso.com", "Billing");
        let record = enrich(&base_record(), &config).unwrap();

        assert_eq!(record.name, "Billing");
        assert_eq!(record.slicer, "Billing");
        assert_eq!(record.ra_name, "CQBilling");
    }

    #[test]
    fn legend_codes_can_be_disabled() {
        let mut config = EnrichConfig::new();
        config.legend_codes = false;
        let record = enrich(&base_record(), &config).unwrap();

        assert_eq!(record.call_result_legend_code, 0);
        assert_eq!(record.call_result_legend_string, "");
        assert_eq!(record.target_type_legend_code, 0);
        // connectivity classification is independent of the legend toggle
        assert_eq!(record.connectivity_type_code, 8620);
    }

    #[test]
    fn timezone_conversion_can_be_disabled() {
        let config = sydney_config().without_timezone_conversion();
        let record = enrich(&base_record(), &config).unwrap();

        assert_eq!(record.call_start_time_local, "2025-11-27T21:00:00+00:00");
        assert_eq!(record.hour, 21);
    }
}
