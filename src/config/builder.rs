//! Configuration file building and comment-preserving edits.
//!
//! Handles creating the default configuration file and rewriting single
//! settings in an existing file without disturbing the user's comments.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::catalog;
use crate::constants::*;

/// Create the default, fully commented config file at `path`.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let theme_choices = catalog::THEMES
        .iter()
        .map(|theme| format!("\"{}\"", theme.id))
        .collect::<Vec<_>>()
        .join(", ");

    let config_content = ConfigBuilder::new()
        .add_section("Location")
        .add_setting(
            "city",
            &format!("\"{DEFAULT_CITY}\""),
            "Built-in city (see 'salat list cities')",
        )
        .add_setting(
            "location_name",
            &format!("\"{DEFAULT_LOCATION_NAME}\""),
            "Label shown when latitude/longitude are set",
        )
        .add_comment("latitude = 26.327300     # Custom latitude, overrides city (-90 to 90)")
        .add_comment("longitude = 43.975000    # Custom longitude, overrides city (-180 to 180)")
        .add_section("Quiet mode")
        .add_setting(
            "alert_delay",
            &DEFAULT_ALERT_DELAY.to_string(),
            &format!(
                "Minutes after a prayer before quiet mode starts ({MINIMUM_ALERT_DELAY}-{MAXIMUM_ALERT_DELAY})"
            ),
        )
        .add_setting(
            "alert_duration",
            &DEFAULT_ALERT_DURATION.to_string(),
            &format!(
                "Minutes quiet mode stays active ({MINIMUM_ALERT_DURATION}-{MAXIMUM_ALERT_DURATION})"
            ),
        )
        .add_section("Display")
        .add_setting(
            "theme",
            &format!("\"{DEFAULT_THEME}\""),
            &format!("Highlight colour: {theme_choices}"),
        )
        .add_section("Prayer times")
        .add_setting(
            "method",
            &DEFAULT_METHOD.to_string(),
            &format!(
                "Calculation method sent to the provider ({MINIMUM_METHOD}-{MAXIMUM_METHOD}, 4 = Umm Al-Qura)"
            ),
        )
        .add_setting(
            "update_interval",
            &DEFAULT_UPDATE_INTERVAL.to_string(),
            &format!(
                "Seconds between schedule evaluations ({MINIMUM_UPDATE_INTERVAL}-{MAXIMUM_UPDATE_INTERVAL})"
            ),
        )
        .build();

    fs::write(path, config_content).context("Failed to write default config file")?;
    Ok(())
}

/// Builder for creating dynamically-aligned configuration files.
///
/// Comments are aligned one space past the longest setting line, so changing
/// a default in constants.rs keeps the file tidy.
struct ConfigBuilder {
    entries: Vec<EntryType>,
}

enum EntryType {
    Section(String),
    Setting { line: String, comment: String },
    /// Verbatim line, e.g. a commented-out example setting
    Comment(String),
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(EntryType::Section(format!("#[{title}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(EntryType::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn add_comment(mut self, text: &str) -> Self {
        self.entries.push(EntryType::Comment(format!("# {text}")));
        self
    }

    fn build(self) -> String {
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                EntryType::Setting { line, .. } => Some(line.len()),
                _ => None,
            })
            .max()
            .unwrap_or(0)
            + 1; // one space between setting and comment

        let mut result = Vec::new();
        let mut first_section = true;

        for entry in self.entries {
            match entry {
                EntryType::Section(title) => {
                    if !first_section {
                        result.push(String::new());
                    }
                    result.push(title);
                    first_section = false;
                }
                EntryType::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{line}{padding}{comment}"));
                }
                EntryType::Comment(text) => result.push(text),
            }
        }

        let mut content = result.join("\n");
        content.push('\n');
        content
    }
}

/// Find the uncommented line that assigns `key`.
pub fn find_config_line(content: &str, key: &str) -> Option<String> {
    content
        .lines()
        .find(|line| {
            let trimmed = line.trim_start();
            trimmed
                .strip_prefix(key)
                .is_some_and(|rest| rest.trim_start().starts_with('='))
        })
        .map(str::to_string)
}

/// Rewrite a config line with a new value, keeping the original spacing
/// between the value and its trailing comment.
pub fn preserve_comment_formatting(original_line: &str, key: &str, new_value: &str) -> String {
    let key_value_part = format!("{key} = {new_value}");

    match comment_start(original_line) {
        Some(comment_pos) => {
            let comment_part = &original_line[comment_pos..];
            let before_comment = &original_line[..comment_pos];
            let original_spacing = before_comment
                .rfind(|c: char| !c.is_whitespace())
                .map(|last| &before_comment[last + 1..])
                .filter(|spacing| !spacing.is_empty())
                .unwrap_or(" ");

            format!("{key_value_part}{original_spacing}{comment_part}")
        }
        None => key_value_part,
    }
}

/// Byte offset of a trailing `#` comment, ignoring `#` inside quoted strings.
fn comment_start(line: &str) -> Option<usize> {
    let mut in_string = false;
    for (index, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return Some(index),
            _ => {}
        }
    }
    None
}

/// Set `field` to `value` in file content, appending the line if missing.
pub(crate) fn update_field_in_content(content: &str, field: &str, value: &str) -> String {
    match find_config_line(content, field) {
        Some(line) => {
            let new_line = preserve_comment_formatting(&line, field, value);
            content.replacen(&line, &new_line, 1)
        }
        None => {
            let mut updated = content.to_string();
            if !updated.is_empty() && !updated.ends_with('\n') {
                updated.push('\n');
            }
            updated.push_str(&format!("{field} = {value}\n"));
            updated
        }
    }
}
