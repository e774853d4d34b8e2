//! Schedule state derivation for the daily prayer cycle.
//!
//! This module turns today's five canonical markers plus an injected "now"
//! into a [`ScheduleState`] snapshot: the last prayer that has begun, the next
//! one to come, and whether the post-prayer quiet window is active.
//!
//! ## Rules
//! - A marker exactly at "now" counts as past: it becomes `last` immediately
//! - After the final marker of the day, `next` rolls over to tomorrow's Fajr
//!   with the same hour and minute
//! - The quiet window is half-open: active from `delay` (inclusive) until
//!   `delay + duration` (exclusive) minutes after `last`
//!
//! Evaluation is a pure function. It never reads a clock and each call builds a
//! complete new snapshot, so identical inputs always give identical output.

use chrono::{Days, Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{Prayer, ScheduleError, ScheduleOfDay};

/// Minutes relative to the last prayer during which quiet mode is active.
///
/// Only constructed through [`AlertWindow::new`], so the duration is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlertWindow {
    delay_minutes: u32,
    duration_minutes: u32,
}

impl AlertWindow {
    /// Build a window; the duration must be at least one minute.
    pub fn new(delay_minutes: u32, duration_minutes: u32) -> Result<Self, ScheduleError> {
        if duration_minutes == 0 {
            return Err(ScheduleError::EmptyAlertWindow);
        }
        Ok(Self {
            delay_minutes,
            duration_minutes,
        })
    }

    pub fn delay_minutes(&self) -> u32 {
        self.delay_minutes
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    /// Offset from the prayer at which the window opens.
    pub fn start(&self) -> Duration {
        Duration::minutes(i64::from(self.delay_minutes))
    }

    /// Offset from the prayer at which the window closes (exclusive).
    pub fn end(&self) -> Duration {
        Duration::minutes(i64::from(self.delay_minutes) + i64::from(self.duration_minutes))
    }

    /// Whether `elapsed` time since a prayer falls inside `[start, end)`.
    pub fn contains(&self, elapsed: Duration) -> bool {
        elapsed >= self.start() && elapsed < self.end()
    }
}

/// A canonical prayer placed on an absolute wall-clock instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerInstant {
    pub prayer: Prayer,
    pub at: NaiveDateTime,
}

/// Derived snapshot for one evaluation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleState {
    /// Most recent prayer at or before "now"; `None` before today's Fajr
    pub last: Option<PrayerInstant>,
    /// Earliest prayer strictly after "now", possibly tomorrow's Fajr
    pub next: PrayerInstant,
    /// Whether the post-prayer quiet window is active
    pub mode_active: bool,
}

impl ScheduleState {
    /// Whether `prayer` is the one being counted down to.
    pub fn is_next(&self, prayer: Prayer) -> bool {
        self.next.prayer == prayer
    }

    /// Time elapsed since the last prayer began.
    pub fn elapsed_since_last(&self, now: NaiveDateTime) -> Option<Duration> {
        self.last.map(|last| now - last.at)
    }

    /// Time remaining until the next prayer.
    pub fn time_until_next(&self, now: NaiveDateTime) -> Duration {
        self.next.at - now
    }

    /// Quiet time left when the window is active.
    pub fn quiet_remaining(&self, now: NaiveDateTime, window: AlertWindow) -> Option<Duration> {
        if !self.mode_active {
            return None;
        }
        self.last.map(|last| last.at + window.end() - now)
    }
}

/// Derive the schedule state for `now`.
///
/// Fails with [`ScheduleError::MalformedTime`] when a canonical marker does not
/// parse, so callers can show "not ready" rather than a corrupted ordering.
pub fn evaluate(
    schedule: &ScheduleOfDay,
    now: NaiveDateTime,
    window: AlertWindow,
) -> Result<ScheduleState, ScheduleError> {
    let today = now.date();
    let instants = schedule.canonical_times()?.map(|(prayer, time)| PrayerInstant {
        prayer,
        at: today.and_time(time),
    });

    let upcoming = instants
        .iter()
        .filter(|instant| instant.at > now)
        .min_by_key(|instant| instant.at)
        .copied();

    let last = instants
        .iter()
        .filter(|instant| instant.at <= now)
        .max_by_key(|instant| instant.at)
        .copied();

    let next = match upcoming {
        Some(next) => next,
        None => {
            // Past the final marker: tomorrow's first prayer, same wall-clock time
            let first = instants[0];
            let at = first
                .at
                .checked_add_days(Days::new(1))
                .ok_or(ScheduleError::DateOutOfRange)?;
            PrayerInstant {
                prayer: first.prayer,
                at,
            }
        }
    };

    let mode_active = last.is_some_and(|last| window.contains(now - last.at));

    Ok(ScheduleState {
        last,
        next,
        mode_active,
    })
}

/// Result of one engine tick, distinguishing "no schedule yet" from a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Evaluation {
    /// No usable schedule has been retrieved for the current location
    NotReady,
    Ready(ScheduleState),
}

impl Evaluation {
    /// Evaluate an optional schedule; an absent schedule is `NotReady`.
    pub fn of(
        schedule: Option<&ScheduleOfDay>,
        now: NaiveDateTime,
        window: AlertWindow,
    ) -> Result<Self, ScheduleError> {
        match schedule {
            None => Ok(Evaluation::NotReady),
            Some(schedule) => evaluate(schedule, now, window).map(Evaluation::Ready),
        }
    }

    pub fn state(&self) -> Option<&ScheduleState> {
        match self {
            Evaluation::NotReady => None,
            Evaluation::Ready(state) => Some(state),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Evaluation::Ready(_))
    }
}

/// A notable difference between two consecutive evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    /// A schedule became available for the current location
    BecameReady,
    /// The schedule was dropped (location change, malformed data)
    BecameUnavailable,
    /// The countdown target moved on
    NextPrayerChanged { from: Prayer, to: Prayer },
    /// The quiet window opened after `prayer`
    ModeActivated { prayer: Prayer },
    /// The quiet window closed
    ModeDeactivated,
}

/// Compare consecutive evaluations and report what changed, in display order.
///
/// `previous` is `None` on the very first tick.
pub fn detect_state_change(previous: Option<&Evaluation>, current: &Evaluation) -> Vec<StateChange> {
    let mut changes = Vec::new();

    match (previous.and_then(Evaluation::state), current.state()) {
        (None, Some(state)) => {
            changes.push(StateChange::BecameReady);
            if state.mode_active
                && let Some(last) = state.last
            {
                changes.push(StateChange::ModeActivated {
                    prayer: last.prayer,
                });
            }
        }
        (Some(_), None) => changes.push(StateChange::BecameUnavailable),
        (Some(before), Some(after)) => {
            if before.next != after.next {
                changes.push(StateChange::NextPrayerChanged {
                    from: before.next.prayer,
                    to: after.next.prayer,
                });
            }
            match (before.mode_active, after.mode_active) {
                (false, true) => {
                    if let Some(last) = after.last {
                        changes.push(StateChange::ModeActivated {
                            prayer: last.prayer,
                        });
                    }
                }
                (true, false) => changes.push(StateChange::ModeDeactivated),
                _ => {}
            }
        }
        (None, None) => {}
    }

    changes
}
