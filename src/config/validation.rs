//! Configuration validation functionality.
//!
//! Rejects values outside their documented ranges before any of them reach
//! the monitor. Defaults are applied only after validation succeeds.

use anyhow::{Result, bail};

use super::Config;
use crate::catalog;
use crate::constants::*;

/// Validate every field that is set.
pub fn validate_config(config: &Config) -> Result<()> {
    match (config.latitude, config.longitude) {
        (Some(_), None) => bail!("latitude is set but longitude is missing"),
        (None, Some(_)) => bail!("longitude is set but latitude is missing"),
        _ => {}
    }

    if let Some(lat) = config.latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        bail!("latitude must be between -90 and 90 degrees (got {lat})");
    }

    if let Some(lon) = config.longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        bail!("longitude must be between -180 and 180 degrees (got {lon})");
    }

    // The city only matters when no custom coordinates are set
    if config.latitude.is_none()
        && let Some(city) = config.city.as_deref()
        && catalog::find_city(city).is_none()
    {
        bail!(
            "city '{city}' is not a built-in city (available: {})",
            catalog::city_names()
        );
    }

    if let Some(name) = config.location_name.as_deref()
        && name.trim().is_empty()
    {
        bail!("location_name must not be empty");
    }

    if let Some(delay) = config.alert_delay
        && !(MINIMUM_ALERT_DELAY..=MAXIMUM_ALERT_DELAY).contains(&delay)
    {
        bail!(
            "alert_delay ({delay} minutes) must be between {MINIMUM_ALERT_DELAY} and {MAXIMUM_ALERT_DELAY} minutes"
        );
    }

    if let Some(duration) = config.alert_duration
        && !(MINIMUM_ALERT_DURATION..=MAXIMUM_ALERT_DURATION).contains(&duration)
    {
        bail!(
            "alert_duration ({duration} minutes) must be between {MINIMUM_ALERT_DURATION} and {MAXIMUM_ALERT_DURATION} minutes"
        );
    }

    if let Some(theme) = config.theme.as_deref()
        && catalog::find_theme(theme).is_none()
    {
        bail!(
            "theme '{theme}' is not available (use one of: {})",
            catalog::theme_ids()
        );
    }

    if let Some(method) = config.method
        && !(MINIMUM_METHOD..=MAXIMUM_METHOD).contains(&method)
    {
        bail!("method ({method}) must be between {MINIMUM_METHOD} and {MAXIMUM_METHOD}");
    }

    if let Some(interval) = config.update_interval
        && !(MINIMUM_UPDATE_INTERVAL..=MAXIMUM_UPDATE_INTERVAL).contains(&interval)
    {
        bail!(
            "update_interval ({interval} seconds) must be between {MINIMUM_UPDATE_INTERVAL} and {MAXIMUM_UPDATE_INTERVAL} seconds"
        );
    }

    Ok(())
}
