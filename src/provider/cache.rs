//! On-disk cache for provider responses.
//!
//! Each entry is one JSON file named `{YYYY-MM-DD}_{lat}_{lon}_{provider}.json`.
//! Entries are written atomically through a temporary file in the same
//! directory, and entries for dates more than [`CACHE_RETENTION_DAYS`] in the
//! past are pruned after every successful fetch. Cache problems never fail a
//! fetch: an unreadable entry is refetched and a failed write is only logged.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{DayTimings, TimingsProvider};
use crate::constants::CACHE_RETENTION_DAYS;
use crate::geo::Coordinate;
use crate::utils::private_path;

/// Wraps a provider with a per-day file cache.
pub struct CachedProvider<P> {
    inner: P,
    dir: PathBuf,
    debug_enabled: bool,
}

impl<P: TimingsProvider> CachedProvider<P> {
    pub fn new(inner: P, dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            dir: dir.into(),
            debug_enabled: false,
        }
    }

    /// Log cache hits and pruning.
    pub fn with_debug(mut self, debug_enabled: bool) -> Self {
        self.debug_enabled = debug_enabled;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, date: NaiveDate, coordinate: Coordinate) -> PathBuf {
        self.dir.join(format!(
            "{}_{}_{}.json",
            date.format("%Y-%m-%d"),
            coordinate.cache_key(),
            self.inner.key()
        ))
    }

    fn load(&self, path: &Path, coordinate: &Coordinate) -> Option<DayTimings> {
        let content = fs::read_to_string(path).ok()?;
        let timings: DayTimings = serde_json::from_str(&content).ok()?;
        // Entries that no longer parse are treated as missing
        (timings.is_for(coordinate) && timings.schedule.validate().is_ok()).then_some(timings)
    }

    fn store(&self, path: &Path, timings: &DayTimings) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create cache directory {}", self.dir.display()))?;

        let json = serde_json::to_string_pretty(timings)?;
        let mut temp = tempfile::NamedTempFile::new_in(&self.dir)
            .context("Failed to create temporary cache file")?;
        temp.write_all(json.as_bytes())?;
        temp.persist(path)
            .with_context(|| format!("Failed to write cache entry {}", path.display()))?;
        Ok(())
    }

    /// Delete entries for dates older than the retention window.
    pub fn prune(&self, today: NaiveDate) -> Result<usize> {
        let Some(cutoff) = today.checked_sub_signed(Duration::days(CACHE_RETENTION_DAYS)) else {
            return Ok(0);
        };

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => return Ok(0),
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !name.ends_with(".json") {
                continue;
            }

            let date = name
                .split('_')
                .next()
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok());

            if let Some(date) = date
                && date < cutoff
                && fs::remove_file(entry.path()).is_ok()
            {
                removed += 1;
            }
        }

        Ok(removed)
    }
}

impl<P: TimingsProvider> TimingsProvider for CachedProvider<P> {
    fn fetch(&self, date: NaiveDate, coordinate: Coordinate) -> Result<DayTimings> {
        let path = self.entry_path(date, coordinate);

        if let Some(timings) = self.load(&path, &coordinate) {
            if self.debug_enabled {
                log_pipe!();
                log_debug!("Using cached timings from {}", private_path(&path));
            }
            return Ok(timings);
        }

        let timings = self.inner.fetch(date, coordinate)?;

        if let Err(e) = self.store(&path, &timings) {
            log_warning!("Could not cache prayer times: {e}");
        }
        if let Ok(removed) = self.prune(date)
            && removed > 0
            && self.debug_enabled
        {
            log_pipe!();
            log_debug!("Pruned {removed} stale cache entries");
        }

        Ok(timings)
    }

    fn key(&self) -> String {
        self.inner.key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockTimingsProvider;
    use crate::provider::test_support::day_timings;
    use tempfile::tempdir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn riyadh() -> Coordinate {
        Coordinate::new(24.7136, 46.6753).unwrap()
    }

    fn mock_returning_once() -> MockTimingsProvider {
        let mut mock = MockTimingsProvider::new();
        mock.expect_key().return_const("mock".to_string());
        mock.expect_fetch()
            .times(1)
            .returning(|date, coordinate| Ok(day_timings(date, coordinate)));
        mock
    }

    #[test]
    fn test_second_fetch_is_served_from_disk() {
        let dir = tempdir().unwrap();
        let provider = CachedProvider::new(mock_returning_once(), dir.path());

        let first = provider.fetch(date(), riyadh()).unwrap();
        let second = provider.fetch(date(), riyadh()).unwrap();

        assert_eq!(first, second);
        assert!(
            dir.path()
                .join("2025-03-14_24.7136_46.6753_mock.json")
                .exists()
        );
    }

    #[test]
    fn test_corrupt_entry_is_refetched() {
        let dir = tempdir().unwrap();
        let provider = CachedProvider::new(mock_returning_once(), dir.path());
        fs::write(
            dir.path().join("2025-03-14_24.7136_46.6753_mock.json"),
            "{ not json",
        )
        .unwrap();

        let timings = provider.fetch(date(), riyadh()).unwrap();
        assert_eq!(timings.date, date());
    }

    #[test]
    fn test_fetch_error_is_not_cached() {
        let dir = tempdir().unwrap();
        let mut mock = MockTimingsProvider::new();
        mock.expect_key().return_const("mock".to_string());
        mock.expect_fetch()
            .returning(|_, _| Err(anyhow::anyhow!("offline")));
        let provider = CachedProvider::new(mock, dir.path());

        assert!(provider.fetch(date(), riyadh()).is_err());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_prune_removes_only_stale_entries() {
        let dir = tempdir().unwrap();
        let mut mock = MockTimingsProvider::new();
        mock.expect_key().return_const("mock".to_string());
        let provider = CachedProvider::new(mock, dir.path());

        for name in [
            "2025-03-01_1.0000_2.0000_mock.json",
            "2025-03-07_1.0000_2.0000_mock.json",
            "2025-03-13_1.0000_2.0000_mock.json",
            "notes.txt",
        ] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }

        let removed = provider.prune(date()).unwrap();

        assert_eq!(removed, 1);
        assert!(!dir.path().join("2025-03-01_1.0000_2.0000_mock.json").exists());
        assert!(dir.path().join("2025-03-07_1.0000_2.0000_mock.json").exists());
        assert!(dir.path().join("notes.txt").exists());
    }
}
