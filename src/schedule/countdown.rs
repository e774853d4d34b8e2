//! Remaining-time text for the next prayer.

use chrono::NaiveDateTime;

use crate::constants::ARRIVED_LABEL;

/// Format the time left until `target`.
///
/// Renders `H:MM:SS` while at least an hour remains and `M:SS` below that.
/// Fractional seconds are truncated. Once `target` is at or before `now` the
/// arrived label is returned instead.
pub fn format_countdown(target: NaiveDateTime, now: NaiveDateTime) -> String {
    if target <= now {
        return ARRIVED_LABEL.to_string();
    }

    let total_seconds = (target - now).num_seconds();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(18, 5, 0)
            .unwrap()
    }

    #[test]
    fn test_hours_minutes_seconds() {
        let target = now() + Duration::seconds(3725);
        assert_eq!(format_countdown(target, now()), "1:02:05");
    }

    #[test]
    fn test_minutes_seconds_only() {
        let target = now() + Duration::seconds(59);
        assert_eq!(format_countdown(target, now()), "0:59");

        let target = now() + Duration::seconds(25 * 60);
        assert_eq!(format_countdown(target, now()), "25:00");
    }

    #[test]
    fn test_exactly_one_hour() {
        let target = now() + Duration::hours(1);
        assert_eq!(format_countdown(target, now()), "1:00:00");
    }

    #[test]
    fn test_long_wait_keeps_hours_unpadded() {
        let target = now() + Duration::hours(13) + Duration::minutes(4);
        assert_eq!(format_countdown(target, now()), "13:04:00");
    }

    #[test]
    fn test_fractional_seconds_truncate() {
        let target = now() + Duration::milliseconds(61_999);
        assert_eq!(format_countdown(target, now()), "1:01");

        // Under one second left is still "0:00", not arrived
        let target = now() + Duration::milliseconds(400);
        assert_eq!(format_countdown(target, now()), "0:00");
    }

    #[test]
    fn test_sub_millisecond_remainder_is_not_arrived() {
        let target = now() + Duration::microseconds(500);
        assert_eq!(format_countdown(target, now()), "0:00");

        let target = now() + Duration::nanoseconds(1);
        assert_eq!(format_countdown(target, now()), "0:00");
    }

    #[test]
    fn test_arrived_label() {
        assert_eq!(format_countdown(now(), now()), ARRIVED_LABEL);
        assert_eq!(
            format_countdown(now() - Duration::minutes(3), now()),
            ARRIVED_LABEL
        );
    }
}
