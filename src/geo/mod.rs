//! Geographic coordinates and the qibla direction.
//!
//! ## Module Structure
//!
//! - [`qibla`]: great-circle bearing and distance from any point to the Kaaba
//!
//! Coordinates are plain degrees. They are validated once, when they enter the
//! program from configuration or the command line, and then passed by value.

pub mod qibla;

pub use qibla::{Bearing, bearing_to, distance_km, initial_bearing};

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{KAABA_LATITUDE, KAABA_LONGITUDE};

/// Coordinates closer than this (in degrees) are treated as the same place.
const SAME_PLACE_EPSILON: f64 = 1e-6;

/// A point on the Earth's surface in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// The Kaaba in Masjid al-Haram, the fixed qibla destination.
    pub const KAABA: Coordinate = Coordinate {
        latitude: KAABA_LATITUDE,
        longitude: KAABA_LONGITUDE,
    };

    /// Build a validated coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let coordinate = Self {
            latitude,
            longitude,
        };
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Check that both components are finite and inside their ranges.
    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            bail!(
                "Latitude must be between -90 and 90 degrees (got {})",
                self.latitude
            );
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            bail!(
                "Longitude must be between -180 and 180 degrees (got {})",
                self.longitude
            );
        }
        Ok(())
    }

    /// Whether two coordinates name the same place.
    pub fn same_place(&self, other: &Coordinate) -> bool {
        (self.latitude - other.latitude).abs() < SAME_PLACE_EPSILON
            && (self.longitude - other.longitude).abs() < SAME_PLACE_EPSILON
    }

    /// Stable text key, used for cache file names.
    pub fn cache_key(&self) -> String {
        format!("{:.4}_{:.4}", self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.latitude >= 0.0 { 'N' } else { 'S' };
        let ew = if self.longitude >= 0.0 { 'E' } else { 'W' };
        write!(
            f,
            "{:.4}°{ns}, {:.4}°{ew}",
            self.latitude.abs(),
            self.longitude.abs()
        )
    }
}
