//! Configuration system for salat with validation and private coordinates.
//!
//! ## Configuration Sources
//!
//! Settings are read from `salat.toml` in:
//! 1. **--config DIR** when given on the command line
//! 2. **XDG_CONFIG_HOME**/salat/salat.toml otherwise
//!
//! A commented default file is written on first use. An optional `geo.toml`
//! next to it overrides `latitude`/`longitude`, so the main file can be shared
//! or version controlled while the coordinates stay private.
//!
//! ## Configuration Structure
//!
//! ```toml
//! #[Location]
//! city = "Buraidah"         # Built-in city (see 'salat list cities')
//! location_name = "Custom"  # Label shown for custom coordinates
//! latitude = 26.327300      # Custom latitude, overrides city (-90 to 90)
//! longitude = 43.975000     # Custom longitude, overrides city (-180 to 180)
//!
//! #[Quiet mode]
//! alert_delay = 10          # Minutes after a prayer before quiet mode starts (0-30)
//! alert_duration = 15       # Minutes quiet mode stays active (1-60)
//!
//! #[Display]
//! theme = "emerald"         # Highlight colour: "emerald", "indigo", "slate", "rose"
//!
//! #[Prayer times]
//! method = 4                # Calculation method sent to the provider (0-23)
//! update_interval = 10      # Seconds between schedule evaluations (1-60)
//! ```
//!
//! Every field is optional. Missing values fall back to the defaults in
//! [`crate::constants`]. Validation rejects out-of-range values and a
//! latitude given without a longitude (or the reverse).

pub mod builder;
pub mod loading;
pub mod validation;
pub mod watcher;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::catalog::{self, Theme};
use crate::constants::*;
use crate::geo::Coordinate;
use crate::schedule::AlertWindow;
use crate::utils::private_path;

// Re-export public API
pub use builder::{create_default_config, find_config_line, preserve_comment_formatting};
pub use loading::{config_path, default_config_dir, geo_path, load, load_from_path};
pub use validation::validate_config;
pub use watcher::start_config_watcher;

/// Optional `geo.toml` holding coordinates separately from the main file.
#[derive(Debug, Deserialize, Clone)]
pub(crate) struct GeoConfig {
    pub(crate) latitude: Option<f64>,
    pub(crate) longitude: Option<f64>,
}

/// User settings loaded from `salat.toml`.
///
/// After [`load`] or [`load_from_path`] every field is populated: validation
/// has run and defaults have been applied. A value built by hand (as in
/// tests) may leave fields empty, so accessors still fall back to defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    pub city: Option<String>,
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub alert_delay: Option<u32>,    // minutes after the prayer
    pub alert_duration: Option<u32>, // minutes
    pub theme: Option<String>,
    pub method: Option<u8>,
    pub update_interval: Option<u64>, // seconds between evaluations
}

/// Where prayer times are computed for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub name: String,
    pub arabic_name: Option<String>,
    pub coordinate: Coordinate,
}

impl Location {
    /// "Riyadh (الرياض)" for catalog cities, the plain label otherwise.
    pub fn display_name(&self) -> String {
        match &self.arabic_name {
            Some(arabic) => format!("{} ({arabic})", self.name),
            None => self.name.clone(),
        }
    }
}

impl Config {
    /// Resolve the configured location.
    ///
    /// Custom coordinates take precedence over `city`.
    pub fn location(&self) -> Result<Location> {
        if let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) {
            return Ok(Location {
                name: self
                    .location_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_LOCATION_NAME.to_string()),
                arabic_name: None,
                coordinate: Coordinate::new(latitude, longitude)?,
            });
        }

        let city_name = self.city.as_deref().unwrap_or(DEFAULT_CITY);
        match catalog::find_city(city_name) {
            Some(city) => Ok(Location {
                name: city.name.to_string(),
                arabic_name: Some(city.arabic_name.to_string()),
                coordinate: city.coordinate(),
            }),
            None => bail!(
                "Unknown city '{city_name}' (available: {})",
                catalog::city_names()
            ),
        }
    }

    pub fn alert_window(&self) -> Result<AlertWindow> {
        Ok(AlertWindow::new(
            self.alert_delay.unwrap_or(DEFAULT_ALERT_DELAY),
            self.alert_duration.unwrap_or(DEFAULT_ALERT_DURATION),
        )?)
    }

    pub fn theme(&self) -> &'static Theme {
        catalog::theme_or_default(self.theme.as_deref().unwrap_or(DEFAULT_THEME))
    }

    pub fn method(&self) -> u8 {
        self.method.unwrap_or(DEFAULT_METHOD)
    }

    /// Period of the coarse evaluation tick.
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval.unwrap_or(DEFAULT_UPDATE_INTERVAL))
    }

    /// Log the effective settings as a block.
    pub fn log_config(&self, config_path: &Path) {
        log_block_start!("Loaded configuration");
        log_indented!("From: {}", private_path(config_path));

        match self.location() {
            Ok(location) => {
                log_indented!("Location: {}", location.display_name());
                log_indented!("Coordinates: {}", location.coordinate);
            }
            Err(e) => log_indented!("Location: {e}"),
        }

        log_indented!(
            "Quiet mode: {} min after each prayer, for {} min",
            self.alert_delay.unwrap_or(DEFAULT_ALERT_DELAY),
            self.alert_duration.unwrap_or(DEFAULT_ALERT_DURATION)
        );

        let theme = self.theme();
        log_indented!(
            "Theme: {}{}\x1b[0m ({})",
            theme.ansi(),
            theme.id,
            theme.arabic_name
        );
        log_indented!("Calculation method: {}", self.method());
        log_indented!(
            "Update interval: {} seconds",
            self.update_interval().as_secs()
        );
    }
}
