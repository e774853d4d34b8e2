//! # Salat Library
//!
//! Internal library for the `salat` binary.
//!
//! This library exists to enable testing of complex internals and provide clean separation
//! between CLI dispatch (main.rs) and application logic.
//!
//! ## Architecture
//!
//! - **Entry Point**: `Salat` struct starts the monitor with resource management
//! - **Core Logic**: internal `core` module with the main loop, fetch coordination,
//!   timer drivers and the live countdown line
//! - **Schedule Engine**: `schedule` module turning a day of prayer times into
//!   the next prayer, the last prayer and the quiet mode flag
//! - **Qibla**: `geo` module with coordinates, great-circle bearing and distance
//! - **Provider**: `provider` module fetching timings from the Aladhan API with a disk cache
//! - **Configuration**: `config` module for TOML settings with hot-reload
//! - **Commands**: `commands` module for CLI subcommands (status, qibla, get, set, ...)
//! - **Infrastructure**: signal handling, logging, time sources and utilities

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

// Public API modules
pub mod args;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod constants;
pub mod geo;
pub mod provider;
pub mod schedule;
pub mod signals;
pub mod state;
pub mod time_source;
pub mod utils;

// Internal modules
mod core;
mod salat;

pub use salat::Salat;
