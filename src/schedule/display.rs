//! Human-readable rendering of a day's schedule.

use chrono::{NaiveTime, Timelike};

use super::{Prayer, ScheduleOfDay, ScheduleState, parse_time_of_day};
use crate::catalog::Theme;
use crate::constants::{AM_SUFFIX, PM_SUFFIX};
use crate::provider::HijriDate;

/// Render a time in 12-hour form with an Arabic AM/PM marker, e.g. `5:07 ص`.
///
/// Midnight and noon both render as 12.
pub fn format_12_hour(time: NaiveTime) -> String {
    let (is_pm, hour) = time.hour12();
    let suffix = if is_pm { PM_SUFFIX } else { AM_SUFFIX };
    format!("{hour}:{:02} {suffix}", time.minute())
}

/// 12-hour form of a raw provider string, or the string itself if it does not parse.
pub fn format_12_hour_str(value: &str) -> String {
    parse_time_of_day(value)
        .map(format_12_hour)
        .unwrap_or_else(|| value.to_string())
}

/// `{weekday}، {day} {month} {year} هـ`
pub fn hijri_line(hijri: &HijriDate) -> String {
    format!(
        "{}، {} {} {} هـ",
        hijri.weekday.ar, hijri.day, hijri.month.ar, hijri.year
    )
}

/// One row of the schedule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRow {
    pub prayer: Prayer,
    pub time: String,
    pub is_next: bool,
}

/// All six markers in display order, flagging the countdown target.
pub fn schedule_rows(schedule: &ScheduleOfDay, state: Option<&ScheduleState>) -> Vec<ScheduleRow> {
    Prayer::ALL
        .iter()
        .map(|&prayer| ScheduleRow {
            prayer,
            time: format_12_hour_str(schedule.time_str(prayer)),
            is_next: state.is_some_and(|state| state.is_next(prayer)),
        })
        .collect()
}

/// Format one row; the next prayer is coloured with the theme and marked.
pub fn render_row(row: &ScheduleRow, theme: &Theme) -> String {
    let line = format!(
        "{}{:<8} {:<8} {:>10}",
        row.prayer.symbol(),
        row.prayer.name(),
        row.prayer.arabic_name(),
        row.time
    );
    if row.is_next {
        format!("{}{line} ◂\x1b[0m", theme.ansi())
    } else {
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::theme_or_default;
    use crate::provider::test_support::hijri;
    use crate::schedule::test_support::reference_schedule;
    use crate::schedule::{AlertWindow, evaluate};
    use chrono::NaiveDate;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_format_12_hour() {
        assert_eq!(format_12_hour(time(0, 5)), "12:05 ص");
        assert_eq!(format_12_hour(time(5, 7)), "5:07 ص");
        assert_eq!(format_12_hour(time(12, 0)), "12:00 م");
        assert_eq!(format_12_hour(time(18, 30)), "6:30 م");
        assert_eq!(format_12_hour(time(23, 59)), "11:59 م");
    }

    #[test]
    fn test_format_unparseable_string_passes_through() {
        assert_eq!(format_12_hour_str("19:30 (+03)"), "7:30 م");
        assert_eq!(format_12_hour_str("--:--"), "--:--");
    }

    #[test]
    fn test_hijri_line() {
        assert_eq!(hijri_line(&hijri()), "الجمعة، 14 رَمَضان 1446 هـ");
    }

    #[test]
    fn test_rows_include_sunrise_and_flag_next() {
        let schedule = reference_schedule();
        let now = NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(13, 0, 0)
            .unwrap();
        let state = evaluate(&schedule, now, AlertWindow::new(10, 15).unwrap()).unwrap();

        let rows = schedule_rows(&schedule, Some(&state));

        assert_eq!(rows.len(), 6);
        assert_eq!(rows[1].prayer, Prayer::Sunrise);
        assert_eq!(rows[1].time, "6:20 ص");
        let next: Vec<_> = rows.iter().filter(|row| row.is_next).collect();
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].prayer, Prayer::Asr);
    }

    #[test]
    fn test_render_highlights_next_row_only() {
        let theme = theme_or_default("rose");
        let rows = schedule_rows(&reference_schedule(), None);
        assert!(rows.iter().all(|row| !row.is_next));

        let plain = render_row(&rows[0], theme);
        assert!(!plain.contains('\x1b'));
        assert!(plain.contains("Fajr"));

        let highlighted = render_row(
            &ScheduleRow {
                is_next: true,
                ..rows[0].clone()
            },
            theme,
        );
        assert!(highlighted.starts_with(&theme.ansi()));
        assert!(highlighted.contains('◂'));
    }
}
