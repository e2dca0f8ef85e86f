//! Timestamp parsing and timezone conversion.
//!
//! Upstream timestamps arrive as ISO-8601 strings with a `Z` suffix, an
//! explicit offset, or no zone at all (assumed UTC). Local conversion applies
//! the configured zone's DST rules at each record's own instant, so two
//! records an hour apart can carry different offsets across a transition.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// The timezone a run converts record timestamps into.
///
/// Two formats are accepted: IANA names ("Australia/Sydney"), which follow
/// that zone's DST rules automatically, and legacy fixed offsets
/// ("UTC+10:00"), kept for configurations predating named-zone support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeZoneSpec {
    Utc,
    Named(Tz),
    Fixed(FixedOffset),
}

impl Default for TimeZoneSpec {
    fn default() -> Self {
        TimeZoneSpec::Utc
    }
}

impl TimeZoneSpec {
    /// Parse a configured timezone string.
    ///
    /// Names containing `/` are treated as IANA zone names; `UTC` and
    /// `UTC±HH:MM` are fixed offsets. Unrecognized values degrade to UTC
    /// with a warning rather than failing the run.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "UTC" {
            return TimeZoneSpec::Utc;
        }

        if trimmed.contains('/') {
            match trimmed.parse::<Tz>() {
                Ok(tz) => return TimeZoneSpec::Named(tz),
                Err(_) => {
                    warn!(timezone = %trimmed, "unknown timezone name, falling back to UTC");
                    return TimeZoneSpec::Utc;
                }
            }
        }

        match parse_fixed_offset(trimmed) {
            Some(offset) => TimeZoneSpec::Fixed(offset),
            None => {
                warn!(timezone = %trimmed, "unknown timezone offset, falling back to UTC");
                TimeZoneSpec::Utc
            }
        }
    }
}

/// Parse a legacy `UTC±HH:MM` offset string.
fn parse_fixed_offset(raw: &str) -> Option<FixedOffset> {
    let rest = raw.strip_prefix("UTC")?;
    let (sign, body) = match rest.as_bytes().first()? {
        b'+' => (1i32, &rest[1..]),
        b'-' => (-1i32, &rest[1..]),
        _ => return None,
    };

    let (hours, minutes) = match body.split_once(':') {
        Some((h, m)) => (h.parse::<i32>().ok()?, m.parse::<i32>().ok()?),
        None => (body.parse::<i32>().ok()?, 0),
    };
    if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Parse an upstream timestamp string to UTC.
///
/// Returns `None` for empty or unparseable input; callers decide whether the
/// field is required.
pub fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Z suffix or explicit offset
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    // No zone information: assume UTC
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    None
}

/// Convert a UTC instant into the configured zone, resolving the offset in
/// effect at that instant.
pub fn to_local(utc: DateTime<Utc>, zone: &TimeZoneSpec) -> DateTime<FixedOffset> {
    match zone {
        TimeZoneSpec::Utc => utc.fixed_offset(),
        TimeZoneSpec::Named(tz) => {
            let local = utc.with_timezone(tz);
            local.with_timezone(&local.offset().fix())
        }
        TimeZoneSpec::Fixed(offset) => utc.with_timezone(offset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{SecondsFormat, Timelike};

    #[test]
    fn parses_z_suffix_offset_and_naive() {
        let z = parse_utc("2025-11-28T08:00:00Z").unwrap();
        let offset = parse_utc("2025-11-28T19:00:00+11:00").unwrap();
        let naive = parse_utc("2025-11-28T08:00:00").unwrap();

        assert_eq!(z, offset);
        assert_eq!(z, naive);
        assert_eq!(parse_utc(""), None);
        assert_eq!(parse_utc("not a timestamp"), None);
    }

    #[test]
    fn parses_fractional_seconds() {
        let dt = parse_utc("2025-11-28T08:00:00.123").unwrap();
        assert_eq!(dt.to_rfc3339_opts(SecondsFormat::Millis, true), "2025-11-28T08:00:00.123Z");
    }

    #[test]
    fn named_zone_applies_dst_at_the_record_instant() {
        let zone = TimeZoneSpec::parse("Australia/Sydney");

        // Sydney switches to DST at 2025-10-05 02:00 local (+10:00 -> +11:00)
        let before = to_local(parse_utc("2025-10-04T15:59:00Z").unwrap(), &zone);
        let after = to_local(parse_utc("2025-10-05T16:01:00Z").unwrap(), &zone);

        assert_eq!(before.offset().local_minus_utc(), 10 * 3600);
        assert_eq!(after.offset().local_minus_utc(), 11 * 3600);
    }

    #[test]
    fn local_conversion_round_trips_to_utc() {
        let zone = TimeZoneSpec::parse("Australia/Sydney");
        let utc = parse_utc("2025-10-05T16:01:00Z").unwrap();
        let local = to_local(utc, &zone);
        assert_eq!(local.with_timezone(&Utc), utc);
    }

    #[test]
    fn legacy_fixed_offsets_parse() {
        match TimeZoneSpec::parse("UTC+10:00") {
            TimeZoneSpec::Fixed(offset) => assert_eq!(offset.local_minus_utc(), 10 * 3600),
            other => panic!("expected fixed offset, got {other:?}"),
        }
        match TimeZoneSpec::parse("UTC+05:45") {
            TimeZoneSpec::Fixed(offset) => {
                assert_eq!(offset.local_minus_utc(), 5 * 3600 + 45 * 60)
            }
            other => panic!("expected fixed offset, got {other:?}"),
        }
        match TimeZoneSpec::parse("UTC-08:00") {
            TimeZoneSpec::Fixed(offset) => assert_eq!(offset.local_minus_utc(), -8 * 3600),
            other => panic!("expected fixed offset, got {other:?}"),
        }
    }

    #[test]
    fn unknown_zones_fall_back_to_utc() {
        assert_eq!(TimeZoneSpec::parse("UTC+99:00"), TimeZoneSpec::Utc);
        assert_eq!(TimeZoneSpec::parse("Atlantis/Capital"), TimeZoneSpec::Utc);
        assert_eq!(TimeZoneSpec::parse(""), TimeZoneSpec::Utc);
        assert_eq!(TimeZoneSpec::parse("UTC"), TimeZoneSpec::Utc);
    }

    #[test]
    fn fixed_offset_conversion_shifts_the_clock() {
        let zone = TimeZoneSpec::parse("UTC+05:30");
        let local = to_local(parse_utc("2025-11-28T08:00:00Z").unwrap(), &zone);
        assert_eq!(local.hour(), 13);
        assert_eq!(local.minute(), 30);
    }
}
