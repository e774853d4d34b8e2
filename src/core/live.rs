//! Single-line live countdown drawn in place on the terminal.
//!
//! The line is rewritten by the fine driver and cleared before any block of
//! log output, so log lines never interleave with a half-drawn status. When
//! stdout is not a terminal (service, pipe, `--log`) nothing is drawn.

use chrono::NaiveDateTime;
use crossterm::{
    cursor::MoveToColumn,
    queue,
    style::{Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::{Write, stdout};

use crate::catalog::Theme;
use crate::constants::QUIET_MODE_TITLE;
use crate::schedule::{AlertWindow, Evaluation, format_countdown};

/// Text of the status line for one fine tick.
///
/// During quiet mode the countdown shows the time left in the quiet window;
/// otherwise it counts down to the next prayer.
pub fn status_text(evaluation: &Evaluation, now: NaiveDateTime, window: AlertWindow) -> String {
    let Some(state) = evaluation.state() else {
        return "Waiting for prayer times...".to_string();
    };

    if state.mode_active
        && let Some(last) = state.last
    {
        let quiet_end = last.at + window.end();
        return format!(
            "🔕 {QUIET_MODE_TITLE} · {}",
            format_countdown(quiet_end, now)
        );
    }

    let next = state.next;
    format!(
        "{}{} {} in {}",
        next.prayer.symbol(),
        next.prayer.name(),
        next.prayer.arabic_name(),
        format_countdown(next.at, now)
    )
}

pub struct LiveLine {
    enabled: bool,
    drawn: bool,
}

impl LiveLine {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            drawn: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Replace the current line with `text` in the theme colour.
    pub fn draw(&mut self, text: &str, theme: &Theme) {
        if !self.enabled {
            return;
        }

        let mut out = stdout();
        let result = queue!(
            out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print("┃ "),
            SetForegroundColor(theme.color()),
            Print(text),
            ResetColor
        )
        .and_then(|_| out.flush());

        // A terminal that rejects the escape codes is treated as absent
        match result {
            Ok(()) => self.drawn = true,
            Err(_) => self.enabled = false,
        }
    }

    /// Erase the line so log output starts at column 0.
    pub fn clear(&mut self) {
        if !self.drawn {
            return;
        }
        let mut out = stdout();
        let _ = queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine)).and_then(|_| out.flush());
        self.drawn = false;
    }
}

impl Drop for LiveLine {
    fn drop(&mut self) {
        self.clear();
    }
}
