//! Legend-code lookup tables for call outcomes.
//!
//! Raw outcome strings from the analytics API are mapped to small numeric
//! classification codes with paired human-readable labels. Every function
//! here is total: unrecognized input lands in a defined fallback bucket,
//! never an error. The tables are process-wide constants; nothing is mutated
//! at runtime.

/// Sentinel result emitted by the API when the querying account is not
/// authorized to see the queue's data.
pub const NOT_AUTHORIZED_RESULT: &str = "NOTAUTHCQ";

/// Fallback connectivity code for blank or unrecognized values.
pub const CONNECTIVITY_UNKNOWN: i64 = 8620;

/// High-level "other" bucket for unrecognized call results.
pub const CALL_RESULT_OTHER: i64 = 4005;

/// High-level code for unauthorized results, distinct from "other".
pub const CALL_RESULT_NOT_AUTHORIZED: i64 = 4999;

/// Map a raw PSTN connectivity value to its code and label.
///
/// Blank and unrecognized values map to `8620 Unknown`.
pub fn connectivity_legend(raw: &str) -> (i64, &'static str) {
    match raw {
        "CallingPlan" => (8600, "Calling Plan"),
        "DirectRouting" => (8601, "Direct Routing"),
        "OperatorConnect" => (8602, "Operator Connect"),
        "ACS Call" => (8610, "ACS Call"),
        _ => (CONNECTIVITY_UNKNOWN, "Unknown"),
    }
}

/// Correct the target type for callback and timeout scenarios.
///
/// The API reports the pre-callback target for these results; reporting
/// expects the effective one.
pub fn corrected_target_type<'a>(call_result: &str, target_type: &'a str) -> &'a str {
    match call_result {
        "callback_call_timed_out" => "Disconnect",
        "transferred_to_callback_caller" => "User",
        _ => target_type,
    }
}

/// Map a call result to its high-level legend code and label.
///
/// `target_type` must already be corrected via [`corrected_target_type`].
pub fn call_result_legend(call_result: &str, target_type: &str) -> (i64, &'static str) {
    if call_result == NOT_AUTHORIZED_RESULT {
        return (CALL_RESULT_NOT_AUTHORIZED, "Not Authorized");
    }
    if call_result == "disconnected" && target_type == "Disconnect" {
        return (4012, "Abandoned");
    }
    match call_result {
        "agent_joined_conference" | "transferred_to_agent" | "transferred_to_callback_caller" => {
            (4001, "Agent Answered")
        }
        "overflown" => (4002, "Overflowed"),
        "timed_out" | "callback_call_timed_out" => (4003, "Timed Out"),
        "no_agent" => (4004, "No Agents"),
        _ => (CALL_RESULT_OTHER, "Other"),
    }
}

/// Map a call result and corrected target type to the detailed disposition
/// code and label.
pub fn target_type_legend(call_result: &str, target_type: &str) -> (i64, &'static str) {
    if call_result == NOT_AUTHORIZED_RESULT {
        return (0, "Not Authorized");
    }

    match (call_result, target_type) {
        ("agent_joined_conference" | "transferred_to_agent", "User") => {
            (4010, "Agent Answered (Call)")
        }
        ("transferred_to_callback_caller", "User") => (4011, "Agent Answered (Callback)"),
        ("disconnected", "Disconnect") => (4012, "Abandoned"),

        ("overflown", "ApplicationEndpoint" | "ConfigurationEndpoint") => {
            (4013, "Overflowed (Application)")
        }
        ("overflown", "MailBox") => (4014, "Overflowed (Voicemail)"),
        ("overflown", "Disconnect") => (4015, "Overflowed (Disconnect)"),
        ("overflown", "Phone") => (4016, "Overflowed (External)"),
        ("overflown", "User") => (4017, "Overflowed (User)"),

        ("timed_out", "ApplicationEndpoint" | "ConfigurationEndpoint") => {
            (4020, "Timed Out (Application)")
        }
        ("timed_out", "MailBox") => (4021, "Timed Out (Voicemail)"),
        ("timed_out", "Disconnect") => (4022, "Timed Out (Disconnect)"),
        ("timed_out", "Phone") => (4023, "Timed Out (External)"),
        ("timed_out", "User") => (4024, "Timed Out (User)"),
        ("callback_call_timed_out", "Disconnect") => (4025, "Timed Out (Callback)"),

        ("no_agent", "ApplicationEndpoint" | "ConfigurationEndpoint") => {
            (4030, "No Agents (Application)")
        }
        ("no_agent", "MailBox") => (4031, "No Agents (Voicemail)"),
        ("no_agent", "Disconnect") => (4032, "No Agents (Disconnect)"),
        ("no_agent", "Phone") => (4033, "No Agents (External)"),
        ("no_agent", "User") => (4034, "No Agents (User)"),

        _ => (CALL_RESULT_OTHER, "Other"),
    }
}

/// Whether the call counts as abandoned.
pub fn is_abandoned(call_result: &str, target_type: &str) -> bool {
    call_result == "disconnected" && target_type == "Disconnect"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connectivity_known_values() {
        assert_eq!(connectivity_legend("CallingPlan"), (8600, "Calling Plan"));
        assert_eq!(connectivity_legend("DirectRouting"), (8601, "Direct Routing"));
        assert_eq!(connectivity_legend("OperatorConnect"), (8602, "Operator Connect"));
        assert_eq!(connectivity_legend("ACS Call"), (8610, "ACS Call"));
    }

    #[test]
    fn connectivity_is_total() {
        assert_eq!(connectivity_legend(""), (8620, "Unknown"));
        assert_eq!(connectivity_legend("SomethingNew"), (8620, "Unknown"));
    }

    #[test]
    fn not_authorized_is_distinct_from_other() {
        assert_eq!(call_result_legend("NOTAUTHCQ", ""), (4999, "Not Authorized"));
        assert_eq!(call_result_legend("brand_new_result", ""), (4005, "Other"));
        assert_eq!(target_type_legend("NOTAUTHCQ", ""), (0, "Not Authorized"));
    }

    #[test]
    fn corrected_target_type_callback_cases() {
        assert_eq!(corrected_target_type("callback_call_timed_out", "User"), "Disconnect");
        assert_eq!(corrected_target_type("transferred_to_callback_caller", "Phone"), "User");
        assert_eq!(corrected_target_type("timed_out", "MailBox"), "MailBox");
        assert_eq!(corrected_target_type("timed_out", ""), "");
    }

    #[test]
    fn abandoned_maps_to_4012_in_both_legends() {
        assert_eq!(call_result_legend("disconnected", "Disconnect"), (4012, "Abandoned"));
        assert_eq!(target_type_legend("disconnected", "Disconnect"), (4012, "Abandoned"));
        assert!(is_abandoned("disconnected", "Disconnect"));
        assert!(!is_abandoned("disconnected", "User"));
    }

    #[test]
    fn agent_answered_variants() {
        assert_eq!(call_result_legend("agent_joined_conference", "User").0, 4001);
        assert_eq!(call_result_legend("transferred_to_agent", "User").0, 4001);
        assert_eq!(call_result_legend("transferred_to_callback_caller", "User").0, 4001);
        assert_eq!(target_type_legend("transferred_to_agent", "User").0, 4010);
        assert_eq!(target_type_legend("transferred_to_callback_caller", "User").0, 4011);
    }

    #[test]
    fn disposition_matrix_by_target() {
        assert_eq!(target_type_legend("overflown", "ApplicationEndpoint").0, 4013);
        assert_eq!(target_type_legend("overflown", "ConfigurationEndpoint").0, 4013);
        assert_eq!(target_type_legend("overflown", "MailBox").0, 4014);
        assert_eq!(target_type_legend("timed_out", "Phone").0, 4023);
        assert_eq!(target_type_legend("callback_call_timed_out", "Disconnect").0, 4025);
        assert_eq!(target_type_legend("no_agent", "User").0, 4034);
        // unmapped target falls through to Other
        assert_eq!(target_type_legend("overflown", "SomethingElse").0, 4005);
    }
}
