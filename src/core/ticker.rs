//! The monitor's two timer drivers.
//!
//! The coarse driver re-evaluates the schedule engine every `update_interval`
//! seconds. The fine driver redraws the countdown once a second from the last
//! evaluation. Deadlines are kept in the time source's clock, so a simulated
//! clock drives both exactly as the wall clock would. A driver that falls
//! behind fires once and is rescheduled from "now" rather than catching up.

use chrono::{NaiveDateTime, TimeDelta};
use std::time::Duration;

/// Which drivers are due on this pass of the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Due {
    pub coarse: bool,
    pub fine: bool,
}

impl Due {
    pub fn any(&self) -> bool {
        self.coarse || self.fine
    }
}

pub struct Ticker {
    coarse: TimeDelta,
    fine: Option<TimeDelta>,
    next_coarse: NaiveDateTime,
    next_fine: NaiveDateTime,
}

fn delta(duration: Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(TimeDelta::seconds(1))
}

impl Ticker {
    /// Both drivers are due immediately. `fine = None` disables the countdown
    /// driver (no live display).
    pub fn new(now: NaiveDateTime, coarse: Duration, fine: Option<Duration>) -> Self {
        Self {
            coarse: delta(coarse),
            fine: fine.map(delta),
            next_coarse: now,
            next_fine: now,
        }
    }

    /// Change the coarse period, e.g. after a config reload.
    pub fn set_coarse_interval(&mut self, now: NaiveDateTime, coarse: Duration) {
        self.coarse = delta(coarse);
        self.next_coarse = self.next_coarse.min(now + self.coarse);
    }

    /// Make the coarse driver due on the next pass.
    pub fn force_coarse(&mut self, now: NaiveDateTime) {
        self.next_coarse = now;
    }

    /// Make the fine driver due on the next pass.
    pub fn force_fine(&mut self, now: NaiveDateTime) {
        self.next_fine = now;
    }

    /// Report due drivers and reschedule them.
    pub fn due(&mut self, now: NaiveDateTime) -> Due {
        let mut due = Due::default();

        if now >= self.next_coarse {
            due.coarse = true;
            self.next_coarse = now + self.coarse;
        }

        if let Some(fine) = self.fine
            && now >= self.next_fine
        {
            due.fine = true;
            self.next_fine = now + fine;
        }

        due
    }

    /// Time until the earliest pending deadline.
    pub fn time_until_next(&self, now: NaiveDateTime) -> Duration {
        let deadline = match self.fine {
            Some(_) => self.next_coarse.min(self.next_fine),
            None => self.next_coarse,
        };
        (deadline - now).to_std().unwrap_or(Duration::ZERO)
    }
}
