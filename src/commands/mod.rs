//! Command-line command handlers for salat.
//!
//! Each one-shot command lives in its own submodule. The monitor itself is
//! started through [`crate::Salat`].

pub mod get;
pub mod help;
pub mod list;
pub mod qibla;
pub mod set;
pub mod simulate;
pub mod status;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::catalog::{self, City};
use crate::constants::EXIT_FAILURE;

/// Error for a city name missing from the catalog.
#[derive(Debug)]
pub(crate) struct UnknownCityError {
    pub name: String,
    pub available: Vec<String>,
}

impl std::fmt::Display for UnknownCityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown city '{}'", self.name)
    }
}

impl std::error::Error for UnknownCityError {}

/// Look a city up, failing with [`UnknownCityError`].
pub(crate) fn resolve_city(name: &str) -> Result<&'static City> {
    catalog::find_city(name).ok_or_else(|| {
        UnknownCityError {
            name: name.to_string(),
            available: catalog::CITIES.iter().map(|c| c.name.to_string()).collect(),
        }
        .into()
    })
}

/// `--config` as a path.
pub(crate) fn config_dir_path(config_dir: Option<&str>) -> Option<PathBuf> {
    config_dir.map(PathBuf::from)
}

/// Calculate Levenshtein distance between two strings for similarity matching
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let len2 = s2_chars.len();

    // Single rolling row is enough for the distance alone
    let mut previous: Vec<usize> = (0..=len2).collect();
    let mut current = vec![0; len2 + 1];

    for (i, c1) in s1_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, c2) in s2_chars.iter().enumerate() {
            let cost = usize::from(c1 != c2);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[len2]
}

/// Find the N most similar names to the given one
pub(crate) fn find_similar_names(target: &str, available: &[String], max_count: usize) -> Vec<String> {
    let target_lower = target.to_lowercase();
    let mut scored: Vec<(String, usize)> = available
        .iter()
        .map(|name| {
            let distance = levenshtein_distance(&target_lower, &name.to_lowercase());
            (name.clone(), distance)
        })
        .collect();

    scored.sort_by_key(|&(_, distance)| distance);
    scored
        .into_iter()
        .take(max_count)
        .map(|(name, _)| name)
        .collect()
}

/// Report an unknown city with a suggestion and exit.
pub(crate) fn handle_unknown_city_error(error: &UnknownCityError) -> ! {
    log_pipe!();
    log_error!("{error}");

    if let Some(closest) = find_similar_names(&error.name, &error.available, 1).first() {
        log_block_start!("Did you mean '{closest}'?");
    }
    log_block_start!("Use `salat list cities` to see all built-in cities");
    log_end!();
    std::process::exit(EXIT_FAILURE);
}

/// Route an [`UnknownCityError`] to its dedicated report.
pub(crate) fn with_city_errors<T>(result: Result<T>) -> Result<T> {
    match result {
        Err(e) => match e.downcast_ref::<UnknownCityError>() {
            Some(city_error) => handle_unknown_city_error(city_error),
            None => Err(e),
        },
        ok => ok,
    }
}

/// Display a config path for messages: the custom dir or the default location.
pub(crate) fn describe_config_dir(config_dir: Option<&Path>) -> String {
    match config_dir {
        Some(dir) => crate::utils::private_path(dir),
        None => crate::config::default_config_dir()
            .map(|dir| crate::utils::private_path(&dir))
            .unwrap_or_else(|_| "~/.config/salat".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("riyadh", "riyadh"), 0);
        assert_eq!(levenshtein_distance("riyad", "riyadh"), 1);
        assert_eq!(levenshtein_distance("", "abha"), 4);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_similar_city_suggestion() {
        let available: Vec<String> = catalog::CITIES.iter().map(|c| c.name.to_string()).collect();
        assert_eq!(find_similar_names("Jedda", &available, 1), vec!["Jeddah"]);
        assert_eq!(find_similar_names("MEDINA", &available, 1), vec!["Madinah"]);
    }

    #[test]
    fn test_resolve_city() {
        assert_eq!(resolve_city("tabuk").unwrap().name, "Tabuk");

        let err = resolve_city("Cairo").unwrap_err();
        let city_error = err.downcast_ref::<UnknownCityError>().unwrap();
        assert_eq!(city_error.name, "Cairo");
        assert_eq!(city_error.available.len(), catalog::CITIES.len());
    }
}
