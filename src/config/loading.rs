//! Configuration loading functionality.
//!
//! Handles locating the configuration file, creating a default one on first
//! use, merging `geo.toml` overrides and applying defaults.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

use super::validation::validate_config;
use super::{Config, GeoConfig};
use crate::constants::*;
use crate::utils::private_path;

pub const CONFIG_FILE_NAME: &str = "salat.toml";
pub const GEO_FILE_NAME: &str = "geo.toml";

/// `XDG_CONFIG_HOME/salat`.
pub fn default_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join("salat"))
}

/// Path of `salat.toml` in `config_dir`, or in the default directory.
pub fn config_path(config_dir: Option<&Path>) -> Result<PathBuf> {
    match config_dir {
        Some(dir) => Ok(dir.join(CONFIG_FILE_NAME)),
        None => Ok(default_config_dir()?.join(CONFIG_FILE_NAME)),
    }
}

/// Path of the optional `geo.toml` beside `salat.toml`.
pub fn geo_path(config_dir: Option<&Path>) -> Result<PathBuf> {
    match config_dir {
        Some(dir) => Ok(dir.join(GEO_FILE_NAME)),
        None => Ok(default_config_dir()?.join(GEO_FILE_NAME)),
    }
}

/// Load configuration, creating a default file if none exists yet.
pub fn load(config_dir: Option<&Path>) -> Result<Config> {
    let path = config_path(config_dir)?;

    if !path.exists() {
        super::builder::create_default_config(&path)
            .context("Failed to create default config during load")?;
    }

    load_from_path(&path)
        .with_context(|| format!("Failed to load configuration from {}", private_path(&path)))
}

/// Load configuration from a specific path.
///
/// This version does NOT create a default config if the path doesn't exist.
pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        bail!("Configuration file not found at {}", private_path(path));
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", private_path(path)))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", private_path(path)))?;

    // geo.toml values are merged before validation so they are checked too
    load_geo_override_from_path(&mut config, path)?;

    validate_config(&config)?;

    apply_defaults(&mut config);

    Ok(config)
}

/// Fill every unset field with its default.
pub(crate) fn apply_defaults(config: &mut Config) {
    if config.city.is_none() {
        config.city = Some(DEFAULT_CITY.to_string());
    }
    if config.location_name.is_none() {
        config.location_name = Some(DEFAULT_LOCATION_NAME.to_string());
    }
    if config.alert_delay.is_none() {
        config.alert_delay = Some(DEFAULT_ALERT_DELAY);
    }
    if config.alert_duration.is_none() {
        config.alert_duration = Some(DEFAULT_ALERT_DURATION);
    }
    if config.theme.is_none() {
        config.theme = Some(DEFAULT_THEME.to_string());
    }
    if config.method.is_none() {
        config.method = Some(DEFAULT_METHOD);
    }
    if config.update_interval.is_none() {
        config.update_interval = Some(DEFAULT_UPDATE_INTERVAL);
    }
}

/// Merge coordinates from the `geo.toml` beside `config_path`, if present.
pub(crate) fn load_geo_override_from_path(config: &mut Config, config_path: &Path) -> Result<()> {
    let geo_path = if let Some(parent) = config_path.parent() {
        parent.join(GEO_FILE_NAME)
    } else {
        return Ok(());
    };

    if !geo_path.exists() {
        return Ok(());
    }

    match fs::read_to_string(&geo_path) {
        Ok(content) => match toml::from_str::<GeoConfig>(&content) {
            Ok(geo_config) => {
                if let Some(lat) = geo_config.latitude {
                    config.latitude = Some(lat);
                }
                if let Some(lon) = geo_config.longitude {
                    config.longitude = Some(lon);
                }
            }
            Err(e) => {
                log_warning!("Failed to parse geo.toml: {e}. Using coordinates from main config.");
            }
        },
        Err(e) => {
            log_warning!("Failed to read geo.toml: {e}. Using coordinates from main config.");
        }
    }

    Ok(())
}
