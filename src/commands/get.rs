//! Get command implementation for reading configuration fields
//!
//! Values come from the effective configuration, so `geo.toml` overrides and
//! defaults are already applied. Output is either plain text or JSON.

use anyhow::Result;
use serde_json::{Map, Value, json};

use super::config_dir_path;
use crate::config::{self, Config};
use crate::constants::EXIT_FAILURE;

/// Every readable field, in config file order.
pub(crate) const FIELD_NAMES: &[&str] = &[
    "city",
    "location_name",
    "latitude",
    "longitude",
    "alert_delay",
    "alert_duration",
    "theme",
    "method",
    "update_interval",
];

/// Handle the get command - read configuration fields
pub fn handle_get_command(config_dir: Option<&str>, fields: &[String], json: bool) -> Result<()> {
    // No version header: output is meant for scripts
    let config_dir = config_dir_path(config_dir);
    let config = config::load(config_dir.as_deref())?;

    let requested = expand_fields(fields);
    let (values, unknown) = collect_values(&config, &requested)?;

    if !unknown.is_empty() {
        report_unknown_fields(&unknown, json)?;
        std::process::exit(EXIT_FAILURE);
    }

    if json {
        let object: Map<String, Value> = values.into_iter().collect();
        println!("{}", serde_json::to_string(&object)?);
    } else if values.len() == 1 && !is_all(fields) {
        println!("{}", format_value(&values[0].1));
    } else {
        for (field, value) in &values {
            println!("{field}={}", format_value(value));
        }
    }

    Ok(())
}

fn is_all(fields: &[String]) -> bool {
    fields.len() == 1 && fields[0] == "all"
}

fn expand_fields(fields: &[String]) -> Vec<String> {
    if is_all(fields) {
        FIELD_NAMES.iter().map(|f| f.to_string()).collect()
    } else {
        fields.to_vec()
    }
}

/// Look the requested fields up, separating the unknown ones.
fn collect_values(config: &Config, fields: &[String]) -> Result<(Vec<(String, Value)>, Vec<String>)> {
    let Value::Object(all) = serde_json::to_value(config)? else {
        anyhow::bail!("Configuration did not serialize to an object");
    };

    let mut values = Vec::new();
    let mut unknown = Vec::new();
    for field in fields {
        match all.get(field.as_str()) {
            Some(value) if FIELD_NAMES.contains(&field.as_str()) => {
                values.push((field.clone(), value.clone()))
            }
            _ => unknown.push(field.clone()),
        }
    }
    Ok((values, unknown))
}

/// Plain-text rendering; unset values print as an empty string.
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() != 0.0 => format!("{f:.6}"),
            Some(f) if n.is_f64() => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

fn report_unknown_fields(unknown: &[String], json: bool) -> Result<()> {
    if json {
        let message = if unknown.len() == 1 {
            format!("Unknown field: {}", unknown[0])
        } else {
            format!("Unknown fields: {}", unknown.join(", "))
        };
        let error = json!({
            "error": message,
            "type": "UnknownField",
            "available": FIELD_NAMES,
        });
        eprintln!("{}", serde_json::to_string(&error)?);
    } else {
        log_pipe!();
        for field in unknown {
            log_error!("Unknown configuration field: '{field}'");
        }
        log_block_start!("Available fields:");
        log_indented!("all (special: returns all fields)");
        log_indented!("city, location_name, latitude, longitude");
        log_indented!("alert_delay, alert_duration");
        log_indented!("theme, method, update_interval");
        log_end!();
    }
    Ok(())
}

/// Display detailed help for the get command (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("get - Read configuration fields");
    log_block_start!("Usage: salat get [OPTIONS] <field> [<field>...]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>   Read from a custom configuration directory");
    log_indented!("-j, --json           Output in JSON format");
    log_block_start!("Special Fields:");
    log_indented!("all                  Get all configuration fields");
    log_block_start!("Available Fields:");
    log_indented!("city                 Built-in city name");
    log_indented!("location_name        Label for custom coordinates");
    log_indented!("latitude             Custom latitude (-90 to 90)");
    log_indented!("longitude            Custom longitude (-180 to 180)");
    log_indented!("alert_delay          Minutes after a prayer before quiet mode");
    log_indented!("alert_duration       Minutes quiet mode stays active");
    log_indented!("theme                Highlight colour");
    log_indented!("method               Calculation method sent to the provider");
    log_indented!("update_interval      Seconds between schedule evaluations");
    log_block_start!("Examples:");
    log_indented!("# Get single field value");
    log_indented!("salat get city");
    log_indented!("Buraidah");
    log_pipe!();
    log_indented!("# Get multiple field values");
    log_indented!("salat get alert_delay alert_duration");
    log_indented!("alert_delay=10");
    log_indented!("alert_duration=15");
    log_pipe!();
    log_indented!("# Get values in JSON format");
    log_indented!("salat get --json city theme");
    log_indented!("{{\"city\":\"Buraidah\",\"theme\":\"emerald\"}}");
    log_end!();
}
