//! Prayer-time providers.
//!
//! A provider turns `(date, coordinate)` into a [`DayTimings`]: the six daily
//! markers plus the Hijri calendar descriptor for that day. The monitor treats
//! providers as opaque suppliers. The only check applied to what they return
//! is that every time string parses.
//!
//! ## Module Structure
//!
//! - [`aladhan`]: blocking HTTP client for the public Aladhan API
//! - [`cache`]: on-disk cache wrapping any provider

pub mod aladhan;
pub mod cache;

pub use aladhan::AladhanClient;
pub use cache::CachedProvider;

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::Config;
use crate::geo::Coordinate;
use crate::schedule::ScheduleOfDay;

/// A name given in both English and Arabic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedName {
    pub en: String,
    pub ar: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HijriMonth {
    pub number: u8,
    pub en: String,
    pub ar: String,
}

/// Hijri calendar descriptor for one day, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HijriDate {
    /// "DD-MM-YYYY" in the Hijri calendar
    pub date: String,
    pub day: String,
    pub weekday: LocalizedName,
    pub month: HijriMonth,
    pub year: String,
}

/// Everything retrieved for one location and civil date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTimings {
    pub date: NaiveDate,
    pub coordinate: Coordinate,
    pub schedule: ScheduleOfDay,
    pub hijri: Option<HijriDate>,
}

impl DayTimings {
    /// Whether these timings were retrieved for `coordinate`.
    pub fn is_for(&self, coordinate: &Coordinate) -> bool {
        self.coordinate.same_place(coordinate)
    }
}

/// Source of daily prayer timings.
#[cfg_attr(test, mockall::automock)]
pub trait TimingsProvider: Send + Sync {
    /// Retrieve the timings for `date` at `coordinate`.
    fn fetch(&self, date: NaiveDate, coordinate: Coordinate) -> Result<DayTimings>;

    /// Identifies the provider and its settings, e.g. `aladhan-m4`.
    ///
    /// Cached entries from a provider with a different key are never reused.
    fn key(&self) -> String;
}

/// The provider used by the monitor and `status`: Aladhan behind the disk cache.
pub fn default_provider(
    config: &Config,
    config_dir: Option<&Path>,
    debug_enabled: bool,
) -> Result<CachedProvider<AladhanClient>> {
    let client = AladhanClient::new(config.method())?.with_debug(debug_enabled);
    Ok(
        CachedProvider::new(client, crate::state::get_timings_dir(config_dir)?)
            .with_debug(debug_enabled),
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::schedule::test_support::reference_schedule;

    pub fn hijri() -> HijriDate {
        HijriDate {
            date: "14-09-1446".to_string(),
            day: "14".to_string(),
            weekday: LocalizedName {
                en: "Al Juma'a".to_string(),
                ar: "الجمعة".to_string(),
            },
            month: HijriMonth {
                number: 9,
                en: "Ramaḍān".to_string(),
                ar: "رَمَضان".to_string(),
            },
            year: "1446".to_string(),
        }
    }

    pub fn day_timings(date: NaiveDate, coordinate: Coordinate) -> DayTimings {
        DayTimings {
            date,
            coordinate,
            schedule: reference_schedule(),
            hijri: Some(hijri()),
        }
    }
}
