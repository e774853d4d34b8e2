//! Set command implementation for modifying configuration fields
//!
//! Updates individual settings without manual editing while preserving the
//! file's comments. A running monitor picks the change up through its config
//! watcher. Coordinates go to `geo.toml` when that file exists.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

use super::{config_dir_path, describe_config_dir, resolve_city, with_city_errors};
use crate::catalog;
use crate::config::builder::update_field_in_content;
use crate::config::loading::load_geo_override_from_path;
use crate::config::{self, Config, validate_config};
use crate::core::lock::{get_main_lock_path, read_lock_pid};
use crate::utils::{is_process_running, private_path};

/// Handle the set command - update configuration fields
pub fn handle_set_command(
    debug_enabled: bool,
    config_dir: Option<&str>,
    fields: &[(String, String)],
) -> Result<()> {
    log_version!();

    let config_dir = match config_dir_path(config_dir) {
        Some(dir) => dir,
        None => config::default_config_dir()?,
    };

    if debug_enabled {
        log_pipe!();
        log_debug!("Updating configuration in {}", private_path(&config_dir));
    }

    let outcome = with_city_errors(apply_fields(&config_dir, fields))?;

    if outcome.updated.is_empty() {
        log_block_start!("Configuration unchanged");
        if let [(field, value)] = outcome.requested.as_slice() {
            log_indented!("{field} is already set to {value}");
        } else {
            log_indented!("All fields already have the specified values");
        }
        log_end!();
        return Ok(());
    }

    log_block_start!("Updated configuration");
    for (field, value) in &outcome.updated {
        log_indented!("{field} = {value}");
    }
    for path in &outcome.written {
        log_indented!("in {}", private_path(path));
    }

    if outcome.city_shadowed {
        log_pipe!();
        log_warning!("Custom latitude/longitude are still set and take precedence over the city");
        log_indented!("Remove them from the configuration to use the selected city");
    }

    match read_lock_pid(&get_main_lock_path()).filter(|pid| is_process_running(*pid)) {
        Some(pid) => log_block_start!("salat (PID: {pid}) will reload the new settings"),
        None => log_block_start!(
            "Start salat to apply the new configuration from {}",
            describe_config_dir(Some(&config_dir))
        ),
    }

    log_end!();
    Ok(())
}

/// Result of applying `set` to the files on disk.
#[derive(Debug, Default)]
struct SetOutcome {
    /// Every requested field with its normalized value
    requested: Vec<(String, String)>,
    /// Fields whose value actually changed
    updated: Vec<(String, String)>,
    written: Vec<PathBuf>,
    /// A new city was written while custom coordinates still take precedence
    city_shadowed: bool,
}

/// Validate and write `fields` into the config in `config_dir`.
///
/// Nothing is written unless the resulting configuration as a whole passes
/// validation.
fn apply_fields(config_dir: &Path, fields: &[(String, String)]) -> Result<SetOutcome> {
    let config_path = config::config_path(Some(config_dir))?;
    if !config_path.exists() {
        config::create_default_config(&config_path)?;
    }
    let geo_path = config::geo_path(Some(config_dir))?;
    let geo_exists = geo_path.exists();

    let mut outcome = SetOutcome::default();
    for (field, value) in fields {
        let formatted = format_field_value(field, value)
            .with_context(|| format!("Invalid value for field '{field}'"))?;
        outcome.requested.push((field.clone(), formatted));
    }

    let original = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config from {}", private_path(&config_path)))?;
    let original_geo = if geo_exists {
        fs::read_to_string(&geo_path)
            .with_context(|| format!("Failed to read {}", private_path(&geo_path)))?
    } else {
        String::new()
    };

    let mut content = original.clone();
    let mut geo_content = original_geo.clone();
    for (field, value) in &outcome.requested {
        let target = if geo_exists && is_coordinate(field) {
            &mut geo_content
        } else {
            &mut content
        };
        let updated = update_field_in_content(target, field, value);
        if updated != *target {
            *target = updated;
            outcome.updated.push((field.clone(), value.clone()));
        }
    }

    if outcome.updated.is_empty() {
        return Ok(outcome);
    }

    let mut candidate: Config =
        toml::from_str(&content).context("Updated configuration is not valid TOML")?;
    if geo_exists {
        // Stage geo.toml beside a scratch copy so the override logic is shared
        let scratch = tempfile::tempdir()?;
        let scratch_config = scratch.path().join(config::loading::CONFIG_FILE_NAME);
        fs::write(scratch.path().join(config::loading::GEO_FILE_NAME), &geo_content)?;
        load_geo_override_from_path(&mut candidate, &scratch_config)?;
    }
    validate_config(&candidate).context("Configuration validation failed")?;
    outcome.city_shadowed = outcome.updated.iter().any(|(field, _)| field == "city")
        && candidate.latitude.is_some()
        && candidate.longitude.is_some();

    if content != original {
        fs::write(&config_path, &content)
            .with_context(|| format!("Failed to write config to {}", private_path(&config_path)))?;
        outcome.written.push(config_path);
    }
    if geo_content != original_geo {
        fs::write(&geo_path, &geo_content)
            .with_context(|| format!("Failed to write {}", private_path(&geo_path)))?;
        outcome.written.push(geo_path);
    }

    Ok(outcome)
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn is_coordinate(field: &str) -> bool {
    field == "latitude" || field == "longitude"
}

/// Check a single value and render it as TOML.
fn format_field_value(field: &str, value: &str) -> Result<String> {
    let toml_value = match field {
        "city" | "location_name" | "theme" => {
            if (value.starts_with('"') && value.ends_with('"') && value.len() >= 2)
                || (value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2)
            {
                value.to_string()
            } else {
                quote(value)
            }
        }
        _ => value.to_string(),
    };

    let parsed: toml::Value = format!("{field} = {toml_value}")
        .parse()
        .with_context(|| format!("Invalid TOML syntax for field '{field}'"))?;
    let field_value = parsed.get(field).context("Failed to extract field value")?;

    match field {
        "city" => {
            let name = field_value.as_str().context("City must be a string")?;
            let city = resolve_city(name)?;
            Ok(format!("\"{}\"", city.name))
        }
        "location_name" => {
            let name = field_value.as_str().context("Location name must be a string")?;
            if name.trim().is_empty() {
                bail!("Location name must not be empty");
            }
            Ok(quote(name.trim()))
        }
        "theme" => {
            let id = field_value.as_str().context("Theme must be a string")?;
            match catalog::find_theme(id) {
                Some(theme) => Ok(format!("\"{}\"", theme.id)),
                None => bail!("Unknown theme '{id}' (use one of: {})", catalog::theme_ids()),
            }
        }
        "alert_delay" | "alert_duration" | "method" | "update_interval" => {
            let number = field_value
                .as_integer()
                .with_context(|| format!("{field} must be a whole number"))?;
            if number < 0 {
                bail!("{field} must not be negative");
            }
            Ok(number.to_string())
        }
        "latitude" | "longitude" => {
            let degrees = field_value
                .as_float()
                .or_else(|| field_value.as_integer().map(|i| i as f64))
                .with_context(|| format!("{field} must be a number"))?;
            let limit = if field == "latitude" { 90.0 } else { 180.0 };
            if !(-limit..=limit).contains(&degrees) {
                bail!("{field} must be between -{limit} and {limit} degrees");
            }
            Ok(format!("{degrees:.6}"))
        }
        _ => bail!(
            "Unknown configuration field: '{field}' (available: {})",
            super::get::FIELD_NAMES.join(", ")
        ),
    }
}

/// Display detailed help for the set command (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("set - Update configuration fields");
    log_block_start!("Usage: salat set [OPTIONS] <field>=<value> [<field>=<value>...]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>   Update a custom configuration directory");
    log_block_start!("Description:");
    log_indented!("Values are validated before anything is written and the");
    log_indented!("file's comments are preserved. A running monitor reloads");
    log_indented!("automatically. latitude/longitude are written to geo.toml");
    log_indented!("when that file exists.");
    log_block_start!("Examples:");
    log_indented!("salat set city=Riyadh");
    log_indented!("salat set alert_delay=5 alert_duration=20");
    log_indented!("salat set latitude 24.7136 longitude 46.6753");
    log_indented!("salat set theme rose");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn pair(field: &str, value: &str) -> (String, String) {
        (field.to_string(), value.to_string())
    }

    #[test]
    fn test_format_field_value() {
        assert_eq!(format_field_value("city", "riyadh").unwrap(), "\"Riyadh\"");
        assert_eq!(format_field_value("theme", "\"Rose\"").unwrap(), "\"rose\"");
        assert_eq!(format_field_value("alert_delay", "5").unwrap(), "5");
        assert_eq!(format_field_value("latitude", "24.7").unwrap(), "24.700000");
        assert_eq!(format_field_value("longitude", "46").unwrap(), "46.000000");
        assert_eq!(
            format_field_value("location_name", "Block \"4\"").unwrap(),
            "\"Block \\\"4\\\"\""
        );

        assert!(format_field_value("alert_delay", "soon").is_err());
        assert!(format_field_value("latitude", "91").is_err());
        assert!(format_field_value("theme", "neon").is_err());
        assert!(format_field_value("night_temp", "3500").is_err());
    }

    #[test]
    fn test_unknown_city_is_typed_error() {
        let err = format_field_value("city", "Cairo").unwrap_err();
        assert!(err.downcast_ref::<super::super::UnknownCityError>().is_some());
    }

    #[test]
    fn test_apply_fields_preserves_comments() {
        let dir = tempdir().unwrap();
        let outcome = apply_fields(dir.path(), &[pair("alert_delay", "5")]).unwrap();
        assert_eq!(outcome.updated, vec![pair("alert_delay", "5")]);

        let content = fs::read_to_string(dir.path().join("salat.toml")).unwrap();
        let line = config::find_config_line(&content, "alert_delay").unwrap();
        assert!(line.starts_with("alert_delay = 5"));
        assert!(line.contains("# Minutes after a prayer"));
    }

    #[test]
    fn test_apply_fields_unchanged() {
        let dir = tempdir().unwrap();
        apply_fields(dir.path(), &[pair("theme", "slate")]).unwrap();
        let outcome = apply_fields(dir.path(), &[pair("theme", "slate")]).unwrap();
        assert!(outcome.updated.is_empty());
        assert!(outcome.written.is_empty());
    }

    #[test]
    fn test_half_coordinates_rejected_without_writing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("salat.toml");
        config::create_default_config(&path).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        assert!(apply_fields(dir.path(), &[pair("latitude", "24.7")]).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), before);

        apply_fields(dir.path(), &[pair("latitude", "24.7"), pair("longitude", "46.7")]).unwrap();
        let config = config::load(Some(dir.path())).unwrap();
        assert_eq!(config.latitude, Some(24.7));
    }

    #[test]
    fn test_city_change_flags_overriding_coordinates() {
        let dir = tempdir().unwrap();
        let outcome = apply_fields(dir.path(), &[pair("city", "Jeddah")]).unwrap();
        assert!(!outcome.city_shadowed);

        apply_fields(dir.path(), &[pair("latitude", "24.7"), pair("longitude", "46.7")]).unwrap();
        let outcome = apply_fields(dir.path(), &[pair("city", "Riyadh")]).unwrap();
        assert_eq!(outcome.updated, vec![pair("city", "\"Riyadh\"")]);
        assert!(outcome.city_shadowed);

        // The coordinates still decide the location
        let config = config::load(Some(dir.path())).unwrap();
        assert_eq!(config.location().unwrap().coordinate.latitude, 24.7);
    }

    #[test]
    fn test_coordinates_go_to_geo_file() {
        let dir = tempdir().unwrap();
        let geo = dir.path().join("geo.toml");
        fs::write(&geo, "latitude = 21.0\nlongitude = 39.0\n").unwrap();

        let outcome = apply_fields(dir.path(), &[pair("latitude", "24.5")]).unwrap();
        assert_eq!(outcome.written, vec![geo.clone()]);
        assert!(fs::read_to_string(&geo).unwrap().contains("latitude = 24.500000"));

        let main = fs::read_to_string(dir.path().join("salat.toml")).unwrap();
        assert!(config::find_config_line(&main, "latitude").is_none());
    }
}
