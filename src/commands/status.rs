//! Status command - one-shot schedule, state and countdown.
//!
//! Retrieves today's timings for the configured location (through the same
//! cache the monitor uses), evaluates the engine once and prints the result
//! either as a table or as JSON.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::config_dir_path;
use crate::config::{self, Location};
use crate::core::live::status_text;
use crate::logger::Log;
use crate::provider::{self, DayTimings, HijriDate, TimingsProvider};
use crate::schedule::display::{format_12_hour, hijri_line, render_row, schedule_rows};
use crate::schedule::{AlertWindow, Evaluation, ScheduleOfDay, format_countdown};
use crate::time_source::{RealTimeSource, TimeSource};

/// Everything `salat status --json` prints.
#[derive(Debug, Serialize)]
pub struct StatusReport<'a> {
    pub location: &'a Location,
    pub date: NaiveDate,
    pub now: NaiveDateTime,
    pub hijri: Option<&'a HijriDate>,
    pub schedule: &'a ScheduleOfDay,
    pub alert_window: AlertWindow,
    pub state: Evaluation,
    /// Countdown to the next prayer, `H:MM:SS` or `M:SS`
    pub countdown: Option<String>,
}

/// Evaluate `timings` at `now` into a report.
pub fn build_report<'a>(
    timings: &'a DayTimings,
    location: &'a Location,
    now: NaiveDateTime,
    window: AlertWindow,
) -> Result<StatusReport<'a>> {
    let state = Evaluation::of(Some(&timings.schedule), now, window)?;
    let countdown = state
        .state()
        .map(|state| format_countdown(state.next.at, now));

    Ok(StatusReport {
        location,
        date: timings.date,
        now,
        hijri: timings.hijri.as_ref(),
        schedule: &timings.schedule,
        alert_window: window,
        state,
        countdown,
    })
}

/// Handle the status command.
pub fn handle_status_command(debug_enabled: bool, config_dir: Option<&str>, json: bool) -> Result<()> {
    if json {
        // Keep stdout clean for the JSON document
        Log::set_enabled(false);
    } else {
        log_version!();
    }

    let config_dir = config_dir_path(config_dir);
    let config = config::load(config_dir.as_deref())?;
    let location = config.location()?;
    let window = config.alert_window()?;

    let provider = provider::default_provider(&config, config_dir.as_deref(), debug_enabled)?;
    let now = RealTimeSource.now();

    if debug_enabled {
        log_pipe!();
        log_debug!("Fetching timings for {} at {}", now.date(), location.coordinate);
    }

    let timings = provider
        .fetch(now.date(), location.coordinate)
        .context("Failed to retrieve prayer times")?;
    let report = build_report(&timings, &location, now, window)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display_human_readable(&report, config.theme(), window);
    }

    Ok(())
}

fn display_human_readable(report: &StatusReport, theme: &crate::catalog::Theme, window: AlertWindow) {
    log_block_start!("{}", report.location.display_name());
    log_indented!("Coordinates: {}", report.location.coordinate);
    log_indented!("Date: {}", report.date.format("%Y-%m-%d"));
    if let Some(hijri) = report.hijri {
        log_indented!("{}", hijri_line(hijri));
    }

    log_block_start!("Prayer times:");
    for row in schedule_rows(report.schedule, report.state.state()) {
        log_indented!("{}", render_row(&row, theme));
    }

    match report.state.state() {
        Some(state) => {
            if let Some(last) = state.last {
                log_block_start!(
                    "Last: {} ({}) at {}",
                    last.prayer,
                    last.prayer.arabic_name(),
                    format_12_hour(last.at.time())
                );
            } else {
                log_block_start!("No prayer has begun yet today");
            }
            log_indented!("{}", status_text(&report.state, report.now, window));
        }
        None => log_block_start!("Prayer times are not available"),
    }

    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::provider::test_support::day_timings;

    fn now(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_report_between_prayers() {
        let location = Config::default().location().unwrap();
        let timings = day_timings(now(0, 0).date(), location.coordinate);
        let window = AlertWindow::new(10, 15).unwrap();

        let report = build_report(&timings, &location, now(18, 5), window).unwrap();
        let state = report.state.state().unwrap();
        assert_eq!(state.last.unwrap().prayer.name(), "Maghrib");
        assert_eq!(state.next.prayer.name(), "Isha");
        assert_eq!(report.countdown.as_deref(), Some("1:25:00"));
    }

    #[test]
    fn test_report_serializes_state_and_location() {
        let location = Config::default().location().unwrap();
        let timings = day_timings(now(0, 0).date(), location.coordinate);
        let window = AlertWindow::new(10, 15).unwrap();

        let report = build_report(&timings, &location, now(20, 0), window).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["location"]["name"], "Buraidah");
        assert_eq!(json["state"]["status"], "ready");
        assert_eq!(json["state"]["mode_active"], false);
        assert_eq!(json["schedule"]["Isha"], "19:30");
        assert_eq!(json["hijri"]["year"], "1446");
    }

    #[test]
    fn test_report_rolls_over_after_isha() {
        let location = Config::default().location().unwrap();
        let timings = day_timings(now(0, 0).date(), location.coordinate);
        let window = AlertWindow::new(10, 15).unwrap();

        let report = build_report(&timings, &location, now(23, 0), window).unwrap();
        // Tomorrow's Fajr at 05:00
        assert_eq!(report.countdown.as_deref(), Some("6:00:00"));
    }
}
