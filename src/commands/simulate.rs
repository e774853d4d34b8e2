//! Implementation of the simulate command for exercising the monitor in
//! accelerated time.
//!
//! The monitor runs unchanged against a [`SimulatedTimeSource`], so quiet
//! mode and prayer changes across a whole day can be watched in seconds.

use anyhow::{Result, anyhow, bail};
use chrono::Local;
use std::sync::Arc;

use crate::Salat;
use crate::logger::Log;
use crate::time_source::{SimulatedTimeSource, TimeSource, parse_datetime};

/// Default acceleration: one simulated hour per real second.
const DEFAULT_MULTIPLIER: f64 = 3600.0;

/// Arguments of `salat simulate`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulateOptions {
    pub start_time: String,
    pub end_time: String,
    pub multiplier: Option<f64>,
    pub fast_forward: bool,
    pub log_to_file: bool,
}

impl SimulateOptions {
    /// Multiplier handed to the time source; `0.0` means fast-forward.
    fn effective_multiplier(&self) -> f64 {
        if self.fast_forward {
            0.0
        } else {
            self.multiplier.unwrap_or(DEFAULT_MULTIPLIER)
        }
    }

    fn build_clock(&self) -> Result<SimulatedTimeSource> {
        let start = parse_datetime(&self.start_time).map_err(|e| anyhow!("Invalid start time: {e}"))?;
        let end = parse_datetime(&self.end_time).map_err(|e| anyhow!("Invalid end time: {e}"))?;

        if end <= start {
            bail!("End time must be after start time");
        }

        Ok(SimulatedTimeSource::new(start, end, self.effective_multiplier()))
    }
}

/// Handle the simulate command: install the simulated clock and run the monitor.
pub fn handle_simulate_command(
    debug_enabled: bool,
    config_dir: Option<&str>,
    options: &SimulateOptions,
) -> Result<()> {
    let clock = Arc::new(options.build_clock()?);
    let start = clock.now();

    // Install the clock before any logging so every line is timestamped
    Log::set_clock(clock.clone());

    let log_filename = format!(
        "salat-simulation-{}.log",
        Local::now().format("%Y%m%d-%H%M%S")
    );
    let _log_guard = if options.log_to_file {
        println!("Writing simulation output to {log_filename}");
        Some(Log::start_file_logging(log_filename.clone())?)
    } else {
        None
    };

    log_version!();
    log_block_start!("Simulation Mode");
    log_decorated!(
        "Simulating from {} to {}",
        start.format("%Y-%m-%d %H:%M:%S"),
        options.end_time.trim()
    );

    let remaining = clock.remaining_simulated();
    log_indented!(
        "Total simulated time: {} hours {} minutes",
        remaining.num_hours(),
        remaining.num_minutes() % 60
    );

    if clock.is_fast_forward() {
        log_indented!("Time acceleration: fast-forward (instant execution)");
    } else {
        let multiplier = options.effective_multiplier();
        log_indented!(
            "Time acceleration: {}x (will complete in ~{:.1} seconds)",
            multiplier,
            remaining.num_seconds() as f64 / multiplier
        );
    }

    if !options.log_to_file {
        log_pipe!();
        log_decorated!("To save output to a file, add --log (writes {log_filename})");
    }

    let mut salat = Salat::new(debug_enabled).without_lock().without_headers().with_clock(clock);
    if let Some(dir) = config_dir {
        salat = salat.with_config_dir(dir.into());
    }
    salat.run()
}

/// Display detailed help for the simulate command (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("simulate - Run the monitor against a simulated clock");
    log_block_start!(
        "Usage: salat simulate <start> <end> [multiplier | --fast-forward] [--log]"
    );
    log_block_start!("Arguments:");
    log_indented!("<start>, <end>   \"YYYY-MM-DD HH:MM[:SS]\" in local time");
    log_indented!("multiplier       Time acceleration, 0.1 to 3600 (default 3600)");
    log_block_start!("Options:");
    log_indented!("--fast-forward   Jump through every wait instantly");
    log_indented!("--log            Write output to salat-simulation-<time>.log");
    log_block_start!("Examples:");
    log_indented!("salat simulate \"2025-03-14 17:00\" \"2025-03-14 20:00\" 60");
    log_indented!("salat simulate \"2025-03-14 00:00\" \"2025-03-15 00:00\" --fast-forward");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(start: &str, end: &str) -> SimulateOptions {
        SimulateOptions {
            start_time: start.to_string(),
            end_time: end.to_string(),
            multiplier: None,
            fast_forward: false,
            log_to_file: false,
        }
    }

    #[test]
    fn test_multiplier_selection() {
        let mut opts = options("2025-03-14 17:00", "2025-03-14 18:00");
        assert_eq!(opts.effective_multiplier(), DEFAULT_MULTIPLIER);

        opts.multiplier = Some(60.0);
        assert_eq!(opts.effective_multiplier(), 60.0);

        opts.multiplier = None;
        opts.fast_forward = true;
        assert_eq!(opts.effective_multiplier(), 0.0);
        assert!(opts.build_clock().unwrap().is_fast_forward());
    }

    #[test]
    fn test_clock_starts_at_start_time() {
        let clock = options("2025-03-14 17:00", "2025-03-14 18:00:30")
            .build_clock()
            .unwrap();
        assert_eq!(clock.now(), parse_datetime("2025-03-14 17:00:00").unwrap());
        assert_eq!(clock.remaining_simulated().num_seconds(), 3630);
    }

    #[test]
    fn test_end_must_follow_start() {
        assert!(options("2025-03-14 18:00", "2025-03-14 17:00").build_clock().is_err());
        assert!(options("2025-03-14 18:00", "2025-03-14 18:00").build_clock().is_err());
        assert!(options("yesterday", "2025-03-14 18:00").build_clock().is_err());
    }
}
