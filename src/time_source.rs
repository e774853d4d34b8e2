//! Time source abstraction for supporting both real-time and simulated time.
//!
//! The monitor loop reads "now" from a [`TimeSource`] and injects it into the
//! schedule engine, so the engine itself never touches a clock. Simulation is
//! used by `salat simulate` to watch a whole day of prayer transitions in a
//! few seconds.
//!
//! All instants are naive local wall-clock times: the device clock is assumed
//! to already match the selected location's civil time.

use chrono::{Duration as ChronoDuration, Local, NaiveDateTime};
use std::sync::Mutex;
use std::time::Duration as StdDuration;

/// Trait for abstracting time operations
pub trait TimeSource: Send + Sync {
    /// Get the current wall-clock time
    fn now(&self) -> NaiveDateTime;

    /// Sleep for the specified duration (or simulate it)
    fn sleep(&self, duration: StdDuration);

    /// Check if this is a simulated time source
    fn is_simulated(&self) -> bool;

    /// Check if simulation has ended (always false for real time)
    fn is_ended(&self) -> bool {
        false
    }
}

/// Real-time implementation that uses the system clock
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn sleep(&self, duration: StdDuration) {
        std::thread::sleep(duration);
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

/// Simulated time source for time-accelerated execution.
///
/// Two modes are supported:
/// - Linear acceleration: simulated time advances `multiplier` times faster
///   than real time while sleeping
/// - Fast-forward (`multiplier == 0.0`): every sleep jumps instantly
pub struct SimulatedTimeSource {
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
    time_multiplier: f64,
    /// Simulated time that has elapsed through completed sleeps
    elapsed: Mutex<StdDuration>,
}

impl SimulatedTimeSource {
    /// Create a new simulated time source.
    ///
    /// A negative multiplier falls back to 3600x (one simulated hour per second).
    pub fn new(start_time: NaiveDateTime, end_time: NaiveDateTime, multiplier: f64) -> Self {
        let time_multiplier = if multiplier == 0.0 {
            0.0
        } else if multiplier < 0.0 {
            3600.0
        } else {
            multiplier
        };

        Self {
            start_time,
            end_time,
            time_multiplier,
            elapsed: Mutex::new(StdDuration::ZERO),
        }
    }

    pub fn is_fast_forward(&self) -> bool {
        self.time_multiplier == 0.0
    }

    /// Simulated time left until the end of the run.
    pub fn remaining_simulated(&self) -> ChronoDuration {
        self.end_time - self.current_time()
    }

    fn current_time(&self) -> NaiveDateTime {
        let elapsed = *self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        let simulated = ChronoDuration::from_std(elapsed)
            .ok()
            .and_then(|d| self.start_time.checked_add_signed(d))
            .unwrap_or(self.end_time);
        simulated.min(self.end_time)
    }

    fn remaining(&self) -> StdDuration {
        (self.end_time - self.current_time())
            .to_std()
            .unwrap_or(StdDuration::ZERO)
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now(&self) -> NaiveDateTime {
        self.current_time()
    }

    fn sleep(&self, duration: StdDuration) {
        let step = duration.min(self.remaining());
        if step.is_zero() {
            return;
        }

        if self.is_fast_forward() {
            // Give other threads (log writer, fetch workers) a chance to run
            std::thread::sleep(StdDuration::from_millis(1));
        } else {
            std::thread::sleep(step.div_f64(self.time_multiplier));
        }

        let mut elapsed = self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        *elapsed += step;
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn is_ended(&self) -> bool {
        self.current_time() >= self.end_time
    }
}

/// Parse a datetime string in the format "YYYY-MM-DD HH:MM:SS" (seconds optional).
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M"))
        .map_err(|e| format!("Invalid datetime format: {e}. Use YYYY-MM-DD HH:MM:SS"))
}
