//! Application coordinator that manages the complete lifecycle of the monitor.
//!
//! This module handles resource acquisition, initialization, and orchestration
//! of the core loop. It manages:
//! - Terminal setup with RAII guards
//! - Configuration loading
//! - Lock file management for single-instance enforcement
//! - Signal handler setup and the config file watcher
//! - Provider construction
//!
//! The `Salat` struct uses a builder pattern to support different startup contexts:
//! - Normal startup: `Salat::new(debug_enabled).run()`
//! - Simulation mode: `Salat::new(debug_enabled).without_lock().with_clock(clock).run()`

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    config,
    core::lock::{acquire_lock, get_main_lock_path},
    core::{Core, CoreParams},
    logger,
    provider::{self, TimingsProvider},
    signals::{SignalState, setup_signal_handler},
    state,
    time_source::{RealTimeSource, TimeSource},
    utils::{TerminalGuard, stdout_is_terminal},
};

/// Builder for configuring and running the salat monitor.
///
/// # Examples
///
/// ```no_run
/// use salat::Salat;
///
/// # fn main() -> anyhow::Result<()> {
/// let debug_enabled = false;
/// Salat::new(debug_enabled).run()?;
///
/// // Separate configuration, no single-instance lock
/// Salat::new(debug_enabled)
///     .with_config_dir("/tmp/salat-test".into())
///     .without_lock()
///     .run()?;
/// # Ok(())
/// # }
/// ```
pub struct Salat {
    debug_enabled: bool,
    config_dir: Option<PathBuf>,
    create_lock: bool,
    show_headers: bool,
    clock: Option<Arc<dyn TimeSource>>,
}

impl Salat {
    /// Create a new runner with defaults matching normal run
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            config_dir: None,
            create_lock: true,
            show_headers: true,
            clock: None,
        }
    }

    /// Read configuration from `dir` instead of the default location
    pub fn with_config_dir(mut self, dir: PathBuf) -> Self {
        self.config_dir = Some(dir);
        self
    }

    /// Skip lock file creation (simulations may run beside a real monitor)
    pub fn without_lock(mut self) -> Self {
        self.create_lock = false;
        self
    }

    /// Skip header display (the caller already printed one)
    pub fn without_headers(mut self) -> Self {
        self.show_headers = false;
        self
    }

    /// Drive the monitor from `clock` instead of the system clock
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Execute the monitor with the configured settings.
    ///
    /// Returns once a shutdown signal arrives or a simulated clock reaches
    /// its end time.
    pub fn run(self) -> Result<()> {
        if self.show_headers {
            log_version!();
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(RealTimeSource));
        let simulated = clock.is_simulated();
        let live_display = !simulated && stdout_is_terminal() && !logger::is_logging_to_file();

        // Hide the cursor while the live line is drawn
        let _term = if live_display {
            Some(TerminalGuard::new().context("failed to initialize terminal features")?)
        } else {
            None
        };

        let config_dir = self.config_dir.as_deref();
        let config = config::load(config_dir).context("Configuration failed")?;

        let lock = if self.create_lock {
            Some(acquire_lock(&get_main_lock_path(), config_dir)?)
        } else {
            None
        };

        let signal_state = if simulated {
            SignalState::detached()
        } else {
            setup_signal_handler(self.debug_enabled)?
        };

        // Hot reload is optional; the monitor still answers SIGHUP without it
        if !simulated {
            let watch_dir = match &self.config_dir {
                Some(dir) => Ok(dir.clone()),
                None => config::default_config_dir(),
            };
            if let Err(e) = watch_dir.and_then(|dir| {
                config::start_config_watcher(
                    signal_state.signal_sender.clone(),
                    dir,
                    self.debug_enabled,
                )
            }) && self.debug_enabled
            {
                log_pipe!();
                log_warning!("Config file watching unavailable: {e}");
                log_indented!("Hot config reload disabled, use SIGHUP for manual reload");
            }
        }

        config.log_config(&config::config_path(config_dir)?);

        let provider: Arc<dyn TimingsProvider> =
            Arc::new(provider::default_provider(&config, config_dir, self.debug_enabled)?);

        if let Err(e) = state::cleanup_orphaned_state_dirs()
            && self.debug_enabled
        {
            log_pipe!();
            log_debug!("State cleanup skipped: {e}");
        }

        if lock.is_some() {
            log_block_start!("Lock acquired, starting salat...");
        }

        let core = Core::new(CoreParams {
            config,
            config_dir: self.config_dir.clone(),
            provider,
            clock,
            signal_state,
            debug_enabled: self.debug_enabled,
            lock,
            live_display,
        })?;

        core.execute()
    }
}
