//! Core monitor loop and runtime state.
//!
//! This module runs the long-lived `salat` process. It handles:
//!
//! - Two timer drivers: a coarse tick that re-evaluates the schedule engine
//!   and a fine tick that redraws the live countdown
//! - Schedule retrieval on startup and whenever the location changes, on
//!   worker threads with last-write-wins resolution
//! - Logging each state change (next prayer, quiet mode on/off)
//! - Signal processing (SIGINT/SIGTERM shut down, SIGHUP/SIGUSR2 reload)
//! - Configuration hot-reloading
//!
//! The `Core` struct owns all of this state. The clock is injected, so the
//! same loop drives both real time and `salat simulate`.

pub mod fetch;
pub mod live;
pub mod lock;
pub mod ticker;

use anyhow::Result;
use chrono::NaiveDateTime;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use crate::{
    config::{self, Config, Location},
    constants::*,
    provider::TimingsProvider,
    schedule::{
        AlertWindow, Evaluation, ScheduleError, StateChange, detect_state_change,
        display::{format_12_hour, hijri_line, render_row, schedule_rows},
    },
    signals::{SignalMessage, SignalState},
    time_source::TimeSource,
    utils::private_path,
};
use fetch::{FetchCoordinator, FetchOutcome, ScheduleSlot};
use live::{LiveLine, status_text};
use lock::LockFile;
use ticker::Ticker;

/// Parameters for creating a Core instance.
pub(crate) struct CoreParams {
    pub config: Config,
    /// Custom config directory from `--config`, reused on reload
    pub config_dir: Option<PathBuf>,
    pub provider: Arc<dyn TimingsProvider>,
    pub clock: Arc<dyn TimeSource>,
    pub signal_state: SignalState,
    pub debug_enabled: bool,
    pub lock: Option<LockFile>,
    /// Draw the in-place countdown line
    pub live_display: bool,
}

/// Runtime state of the monitor.
pub(crate) struct Core {
    config: Config,
    config_dir: Option<PathBuf>,
    location: Location,
    window: AlertWindow,
    clock: Arc<dyn TimeSource>,
    signal_state: SignalState,
    debug_enabled: bool,
    lock: Option<LockFile>,
    fetcher: FetchCoordinator,
    slot: ScheduleSlot,
    ticker: Ticker,
    live: LiveLine,
    // Last engine result, reused by the fine driver
    evaluation: Option<Evaluation>,
    last_error: Option<ScheduleError>,
}

impl Core {
    pub fn new(params: CoreParams) -> Result<Self> {
        let location = params.config.location()?;
        let window = params.config.alert_window()?;
        let fine = params
            .live_display
            .then_some(Duration::from_millis(COUNTDOWN_INTERVAL_MS));
        let ticker = Ticker::new(params.clock.now(), params.config.update_interval(), fine);

        Ok(Self {
            location,
            window,
            config_dir: params.config_dir,
            clock: params.clock,
            signal_state: params.signal_state,
            debug_enabled: params.debug_enabled,
            lock: params.lock,
            fetcher: FetchCoordinator::new(params.provider),
            slot: ScheduleSlot::new(),
            ticker,
            live: LiveLine::new(params.live_display),
            evaluation: None,
            last_error: None,
            config: params.config,
        })
    }

    /// Run the monitor until shutdown or until a simulated clock runs out.
    pub fn execute(mut self) -> Result<()> {
        if let Some(dir) = &self.config_dir {
            log_block_start!("Base directory: {}", private_path(dir));
        }
        if let Some(lock) = &self.lock
            && self.debug_enabled
        {
            log_pipe!();
            log_debug!("Lock acquired: {}", private_path(lock.path()));
        }

        log_block_start!(
            "Monitoring prayer times for {}",
            self.location.display_name()
        );

        self.request_fetch();

        // A simulated clock would race ahead of the first fetch
        if self.clock.is_simulated()
            && let Some(outcome) = self
                .fetcher
                .wait(Duration::from_secs(FETCH_TIMEOUT_SECS + 1))
        {
            self.apply_fetch_outcome(outcome);
        }

        self.main_loop();

        self.live.clear();
        log_block_start!("Shutting down salat...");
        // Releases and removes the lock file
        drop(self.lock.take());
        log_end!();

        Ok(())
    }

    fn main_loop(&mut self) {
        while self.signal_state.is_running() && !self.clock.is_ended() {
            if let Some(outcome) = self.fetcher.poll() {
                self.apply_fetch_outcome(outcome);
            }

            let now = self.clock.now();
            let due = self.ticker.due(now);

            if due.coarse {
                self.tick(now);
            }
            if due.fine {
                self.draw_live(now);
            }

            let wait = self.ticker.time_until_next(self.clock.now());
            if let Some(message) = self.wait_for_message(wait) {
                self.handle_message(message);
            }
        }
    }

    /// Sleep up to `wait`, returning early for a signal or config change.
    fn wait_for_message(&self, wait: Duration) -> Option<SignalMessage> {
        if self.clock.is_simulated() {
            self.clock.sleep(wait);
            return self.signal_state.signal_receiver.try_recv().ok();
        }

        // Short slices so fetch results are applied promptly
        let slice = wait.min(Duration::from_millis(MAX_POLL_SLICE_MS));
        match self.signal_state.signal_receiver.recv_timeout(slice) {
            Ok(message) => Some(message),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    fn handle_message(&mut self, message: SignalMessage) {
        match message {
            SignalMessage::Shutdown => self.signal_state.request_shutdown(),
            SignalMessage::Reload => self.reload_config(),
        }
    }

    /// Coarse driver: evaluate the engine and log what changed.
    pub(crate) fn tick(&mut self, now: NaiveDateTime) -> Vec<StateChange> {
        let schedule = self.slot.schedule_for(&self.location.coordinate);

        let evaluation = match Evaluation::of(schedule, now, self.window) {
            Ok(evaluation) => {
                self.last_error = None;
                evaluation
            }
            Err(e) => {
                if self.last_error.as_ref() != Some(&e) {
                    self.live.clear();
                    log_pipe!();
                    log_error!("Cannot evaluate prayer times: {e}");
                    self.last_error = Some(e);
                }
                Evaluation::NotReady
            }
        };

        let changes = detect_state_change(self.evaluation.as_ref(), &evaluation);
        if !changes.is_empty() {
            self.live.clear();
            for change in &changes {
                self.log_change(*change, &evaluation);
            }
            self.ticker.force_fine(now);
        }

        self.evaluation = Some(evaluation);
        changes
    }

    fn draw_live(&mut self, now: NaiveDateTime) {
        let evaluation = self.evaluation.unwrap_or(Evaluation::NotReady);
        let text = status_text(&evaluation, now, self.window);
        self.live.draw(&text, self.config.theme());
    }

    fn log_change(&self, change: StateChange, evaluation: &Evaluation) {
        let Some(state) = evaluation.state() else {
            if change == StateChange::BecameUnavailable {
                log_pipe!();
                log_warning!(
                    "Prayer times unavailable for {}",
                    self.location.display_name()
                );
                log_indented!("Waiting for a schedule for the current location");
            }
            return;
        };

        let next = state.next;
        match change {
            StateChange::BecameReady => {
                log_block_start!("Schedule ready");
                if let Some(last) = state.last {
                    log_indented!(
                        "Last: {} ({}) at {}",
                        last.prayer,
                        last.prayer.arabic_name(),
                        format_12_hour(last.at.time())
                    );
                }
                log_indented!(
                    "Next: {} ({}) at {}",
                    next.prayer,
                    next.prayer.arabic_name(),
                    format_12_hour(next.at.time())
                );
            }
            StateChange::NextPrayerChanged { from, .. } => {
                log_block_start!(
                    "{}{} time has begun ({})",
                    from.symbol(),
                    from,
                    from.arabic_name()
                );
                log_indented!(
                    "Next: {} ({}) at {}",
                    next.prayer,
                    next.prayer.arabic_name(),
                    format_12_hour(next.at.time())
                );
            }
            StateChange::ModeActivated { prayer } => {
                log_block_start!("Quiet mode active after {prayer}");
                log_indented!("{QUIET_MODE_TITLE}");
                log_indented!("{QUIET_MODE_SUBTITLE}");
                if let Some(last) = state.last {
                    log_indented!(
                        "Until {}",
                        format_12_hour((last.at + self.window.end()).time())
                    );
                }
            }
            StateChange::ModeDeactivated => {
                log_block_start!("Quiet mode ended");
            }
            StateChange::BecameUnavailable => {}
        }
    }

    fn request_fetch(&mut self) {
        let date = self.clock.now().date();
        let coordinate = self.location.coordinate;
        let generation = self.fetcher.request(date, coordinate);

        if self.debug_enabled {
            self.live.clear();
            log_pipe!();
            log_debug!("Fetch #{generation}: {date} at {coordinate}");
        }
    }

    fn apply_fetch_outcome(&mut self, outcome: FetchOutcome) {
        self.live.clear();

        match outcome.result {
            Ok(timings) => {
                log_block_start!(
                    "Prayer times for {} on {}",
                    self.location.display_name(),
                    timings.date.format("%Y-%m-%d")
                );
                if let Some(hijri) = &timings.hijri {
                    log_indented!("{}", hijri_line(hijri));
                }
                let theme = self.config.theme();
                for row in schedule_rows(&timings.schedule, None) {
                    log_indented!("{}", render_row(&row, theme));
                }
                self.slot.store(timings);
            }
            Err(e) => {
                log_pipe!();
                log_error!("Failed to retrieve prayer times: {e}");
                if self.slot.timings_for(&self.location.coordinate).is_some() {
                    log_indented!("Keeping the previous schedule");
                } else {
                    log_indented!("Prayer times stay unavailable until the location changes");
                }
            }
        }

        // Re-evaluate straight away rather than at the next coarse tick
        self.ticker.force_coarse(self.clock.now());
    }

    /// Re-read the config file. A moved location triggers a new fetch.
    fn reload_config(&mut self) {
        self.live.clear();

        let new_config = match config::load(self.config_dir.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                log_pipe!();
                log_error!("Failed to reload configuration: {e}");
                log_indented!("Keeping the previous settings");
                return;
            }
        };

        if new_config == self.config {
            if self.debug_enabled {
                log_pipe!();
                log_debug!("Configuration unchanged");
            }
            return;
        }

        let (location, window) = match (new_config.location(), new_config.alert_window()) {
            (Ok(location), Ok(window)) => (location, window),
            (Err(e), _) | (_, Err(e)) => {
                log_pipe!();
                log_error!("Failed to reload configuration: {e}");
                log_indented!("Keeping the previous settings");
                return;
            }
        };

        log_block_start!("Configuration reloaded");
        if new_config.method() != self.config.method() {
            log_warning!("Calculation method changes take effect after a restart");
        }

        let now = self.clock.now();
        let moved = !location.coordinate.same_place(&self.location.coordinate);

        self.window = window;
        self.ticker
            .set_coarse_interval(now, new_config.update_interval());
        self.config = new_config;

        if moved {
            log_indented!("Location: {}", location.display_name());
            self.location = location;
            self.request_fetch();
        } else {
            // Same coordinate, possibly a new label
            self.location = location;
        }

        self.ticker.force_coarse(now);
        self.ticker.force_fine(now);
    }

    #[cfg(test)]
    fn evaluation(&self) -> Option<Evaluation> {
        self.evaluation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockTimingsProvider;
    use crate::provider::test_support::day_timings;
    use crate::schedule::Prayer;
    use crate::time_source::SimulatedTimeSource;
    use anyhow::anyhow;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::tempdir;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn working_provider() -> MockTimingsProvider {
        let mut provider = MockTimingsProvider::new();
        provider
            .expect_fetch()
            .returning(|date, coordinate| Ok(day_timings(date, coordinate)));
        provider.expect_key().return_const("mock".to_string());
        provider
    }

    fn core_with(provider: MockTimingsProvider, config_dir: Option<PathBuf>) -> Core {
        let clock = Arc::new(SimulatedTimeSource::new(at(4, 0), at(23, 59), 0.0));
        let config = match &config_dir {
            Some(dir) => config::load(Some(dir.as_path())).unwrap(),
            None => Config::default(),
        };
        Core::new(CoreParams {
            config,
            config_dir,
            provider: Arc::new(provider),
            clock,
            signal_state: SignalState::detached(),
            debug_enabled: false,
            lock: None,
            live_display: false,
        })
        .unwrap()
    }

    fn fetch_now(core: &mut Core) {
        core.request_fetch();
        let outcome = core.fetcher.wait(Duration::from_secs(5)).unwrap();
        core.apply_fetch_outcome(outcome);
    }

    #[test]
    fn test_not_ready_until_schedule_arrives() {
        let mut core = core_with(working_provider(), None);

        assert!(core.tick(at(12, 0)).is_empty());
        assert_eq!(core.evaluation(), Some(Evaluation::NotReady));

        fetch_now(&mut core);
        let changes = core.tick(at(12, 0));
        assert_eq!(changes, vec![StateChange::BecameReady]);
        assert!(core.evaluation().unwrap().is_ready());
    }

    #[test]
    fn test_ticks_report_prayer_and_quiet_mode_changes() {
        let mut core = core_with(working_provider(), None);
        fetch_now(&mut core);

        core.tick(at(17, 59));
        assert_eq!(
            core.tick(at(18, 0)),
            vec![StateChange::NextPrayerChanged {
                from: Prayer::Maghrib,
                to: Prayer::Isha
            }]
        );
        assert_eq!(
            core.tick(at(18, 10)),
            vec![StateChange::ModeActivated {
                prayer: Prayer::Maghrib
            }]
        );
        assert_eq!(core.tick(at(18, 25)), vec![StateChange::ModeDeactivated]);
    }

    #[test]
    fn test_failed_fetch_keeps_previous_schedule() {
        let mut provider = MockTimingsProvider::new();
        let mut calls = 0;
        provider.expect_fetch().returning(move |date, coordinate| {
            calls += 1;
            if calls == 1 {
                Ok(day_timings(date, coordinate))
            } else {
                Err(anyhow!("HTTP 503"))
            }
        });
        let mut core = core_with(provider, None);

        fetch_now(&mut core);
        fetch_now(&mut core);

        core.tick(at(12, 0));
        assert!(core.evaluation().unwrap().is_ready());
    }

    #[test]
    fn test_location_change_reloads_and_refetches() {
        let dir = tempdir().unwrap();
        let mut core = core_with(working_provider(), Some(dir.path().to_path_buf()));
        fetch_now(&mut core);
        core.tick(at(12, 0));

        let path = dir.path().join("salat.toml");
        let content = fs::read_to_string(&path).unwrap();
        fs::write(&path, content.replace("\"Buraidah\"", "\"Jeddah\"")).unwrap();
        core.reload_config();

        assert_eq!(core.location.name, "Jeddah");
        // Old timings belong to Buraidah and are no longer offered
        assert_eq!(core.tick(at(12, 1)), vec![StateChange::BecameUnavailable]);

        let outcome = core.fetcher.wait(Duration::from_secs(5)).unwrap();
        core.apply_fetch_outcome(outcome);
        assert_eq!(core.tick(at(12, 2)), vec![StateChange::BecameReady]);
    }

    #[test]
    fn test_invalid_reload_keeps_settings() {
        let dir = tempdir().unwrap();
        let mut core = core_with(working_provider(), Some(dir.path().to_path_buf()));
        let before = core.config.clone();

        fs::write(dir.path().join("salat.toml"), "alert_duration = 0\n").unwrap();
        core.reload_config();

        assert_eq!(core.config, before);
    }

    #[test]
    fn test_simulated_run_reaches_end_of_clock() {
        let clock = Arc::new(SimulatedTimeSource::new(at(17, 50), at(18, 30), 0.0));
        let core = Core::new(CoreParams {
            config: Config::default(),
            config_dir: None,
            provider: Arc::new(working_provider()),
            clock: clock.clone(),
            signal_state: SignalState::detached(),
            debug_enabled: false,
            lock: None,
            live_display: false,
        })
        .unwrap();

        core.execute().unwrap();
        assert!(clock.is_ended());
    }

    #[test]
    fn test_shutdown_message_stops_loop() {
        let mut core = core_with(working_provider(), None);
        core.handle_message(SignalMessage::Shutdown);
        assert!(!core.signal_state.is_running());
    }
}
