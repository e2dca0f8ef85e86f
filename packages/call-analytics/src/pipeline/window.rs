//! Extraction window planning.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::types::checkpoint::{Checkpoint, QueryWindow};

/// Compute the next extraction window.
///
/// The precise lower bound is the checkpoint's high-water mark when one
/// exists, else `now - lookback`. The bound is inclusive so records landing
/// exactly on the checkpoint are never skipped; the duplicates that can
/// produce are resolved downstream by the record dedup key. The calendar-day
/// bounds cover `[start, now]` and serve as coarse server-side filters next
/// to the precise one.
pub fn plan_window(
    checkpoint: Option<&Checkpoint>,
    lookback: Duration,
    now: DateTime<Utc>,
) -> QueryWindow {
    let start_utc = match checkpoint {
        Some(cp) => cp.last_datetime,
        None => now - lookback,
    };

    let window = QueryWindow {
        start_utc,
        start_date: start_utc.date_naive(),
        end_date: now.date_naive(),
    };
    debug!(
        start = %window.start_utc,
        start_date = %window.start_date,
        end_date = %window.end_date,
        from_checkpoint = checkpoint.is_some(),
        "planned extraction window"
    );
    window
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ReportKind;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 28, 3, 30, 0).unwrap()
    }

    #[test]
    fn without_checkpoint_uses_the_lookback() {
        let window = plan_window(None, Duration::hours(6), now());

        assert_eq!(window.start_utc, Utc.with_ymd_and_hms(2025, 11, 27, 21, 30, 0).unwrap());
        assert_eq!(window.start_date.to_string(), "2025-11-27");
        assert_eq!(window.end_date.to_string(), "2025-11-28");
    }

    #[test]
    fn with_checkpoint_resumes_from_the_high_water_mark() {
        let checkpoint = Checkpoint::new(
            "input-1",
            ReportKind::CallQueue,
            Utc.with_ymd_and_hms(2025, 11, 27, 23, 45, 12).unwrap(),
            10,
            now(),
        );
        let window = plan_window(Some(&checkpoint), Duration::hours(1), now());

        // Inclusive lower bound: exactly the checkpoint value, never past it.
        assert_eq!(window.start_utc, checkpoint.last_datetime);
        assert_eq!(window.start_date.to_string(), "2025-11-27");
        assert_eq!(window.end_date.to_string(), "2025-11-28");
    }

    #[test]
    fn same_day_window_collapses_the_date_bounds() {
        let checkpoint = Checkpoint::new(
            "input-1",
            ReportKind::CallQueue,
            Utc.with_ymd_and_hms(2025, 11, 28, 1, 0, 0).unwrap(),
            0,
            now(),
        );
        let window = plan_window(Some(&checkpoint), Duration::hours(1), now());

        assert_eq!(window.start_date, window.end_date);
    }
}
