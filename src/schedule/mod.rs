//! Daily prayer schedule: markers, parsing and the state engine.
//!
//! ## Module Structure
//!
//! - [`state`]: derives `{last, next, quiet mode}` from a schedule and an injected "now"
//! - [`countdown`]: remaining-time text for the next prayer
//! - [`display`]: 12-hour rendering and the schedule table
//!
//! A [`ScheduleOfDay`] holds the provider's raw `"HH:MM"` strings. Strings are
//! parsed on every evaluation and a string that does not parse is reported as
//! [`ScheduleError::MalformedTime`] instead of producing a bogus instant.

pub mod countdown;
pub mod display;
pub mod state;

use chrono::NaiveTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

pub use countdown::format_countdown;
pub use state::{
    AlertWindow, Evaluation, PrayerInstant, ScheduleState, StateChange, detect_state_change,
    evaluate,
};

/// A named daily marker.
///
/// Five are canonical prayers used for next/last derivation; `Sunrise` is
/// auxiliary and only displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prayer {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    /// The five canonical prayers in daily order.
    pub const CANONICAL: [Prayer; 5] = [
        Prayer::Fajr,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    /// Every marker in display order.
    pub const ALL: [Prayer; 6] = [
        Prayer::Fajr,
        Prayer::Sunrise,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    pub fn is_canonical(&self) -> bool {
        !matches!(self, Prayer::Sunrise)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Sunrise => "Sunrise",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
        }
    }

    pub fn arabic_name(&self) -> &'static str {
        match self {
            Prayer::Fajr => "الفجر",
            Prayer::Sunrise => "الشروق",
            Prayer::Dhuhr => "الظهر",
            Prayer::Asr => "العصر",
            Prayer::Maghrib => "المغرب",
            Prayer::Isha => "العشاء",
        }
    }

    /// Returns the icon/symbol for this marker.
    pub fn symbol(&self) -> &'static str {
        match self {
            Prayer::Fajr => "󰖔 ",
            Prayer::Sunrise => "󰖜 ",
            Prayer::Dhuhr => "󰖨 ",
            Prayer::Asr => "󰖕 ",
            Prayer::Maghrib => "󰖛 ",
            Prayer::Isha => " ",
        }
    }
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised while turning a schedule into instants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// A marker string is not a valid 24-hour `HH:MM` time
    MalformedTime { prayer: Prayer, value: String },
    /// Canonical markers are not strictly increasing
    OutOfOrder { earlier: Prayer, later: Prayer },
    /// The alert window has a zero duration
    EmptyAlertWindow,
    /// Date arithmetic left chrono's representable range
    DateOutOfRange,
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::MalformedTime { prayer, value } => {
                write!(f, "Malformed {prayer} time '{value}' (expected HH:MM)")
            }
            ScheduleError::OutOfOrder { earlier, later } => {
                write!(f, "{later} is not after {earlier}")
            }
            ScheduleError::EmptyAlertWindow => {
                write!(f, "Alert window duration must be at least one minute")
            }
            ScheduleError::DateOutOfRange => write!(f, "Date is out of the supported range"),
        }
    }
}

impl std::error::Error for ScheduleError {}

fn time_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    // Providers may append a zone label, e.g. "05:01 (+03)"
    PATTERN
        .get_or_init(|| Regex::new(r"^\s*(\d{1,2}):(\d{2})(?:\s*\(.*\))?\s*$").ok())
        .as_ref()
}

/// Parse a 24-hour `HH:MM` time-of-day.
///
/// Returns `None` for anything that is not an hour 0-23 and minute 0-59.
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let captures = time_pattern()?.captures(value)?;
    let hour: u32 = captures[1].parse().ok()?;
    let minute: u32 = captures[2].parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// The six daily markers as delivered by the time provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScheduleOfDay {
    pub fajr: String,
    pub sunrise: String,
    pub dhuhr: String,
    pub asr: String,
    pub maghrib: String,
    pub isha: String,
}

impl ScheduleOfDay {
    /// Raw string for a marker.
    pub fn time_str(&self, prayer: Prayer) -> &str {
        match prayer {
            Prayer::Fajr => &self.fajr,
            Prayer::Sunrise => &self.sunrise,
            Prayer::Dhuhr => &self.dhuhr,
            Prayer::Asr => &self.asr,
            Prayer::Maghrib => &self.maghrib,
            Prayer::Isha => &self.isha,
        }
    }

    /// Parsed time-of-day for a marker.
    pub fn time_of(&self, prayer: Prayer) -> Result<NaiveTime, ScheduleError> {
        let value = self.time_str(prayer);
        parse_time_of_day(value).ok_or_else(|| ScheduleError::MalformedTime {
            prayer,
            value: value.to_string(),
        })
    }

    /// The five canonical markers, parsed, in daily order.
    pub fn canonical_times(&self) -> Result<[(Prayer, NaiveTime); 5], ScheduleError> {
        let [fajr, dhuhr, asr, maghrib, isha] = Prayer::CANONICAL;
        Ok([
            (fajr, self.time_of(fajr)?),
            (dhuhr, self.time_of(dhuhr)?),
            (asr, self.time_of(asr)?),
            (maghrib, self.time_of(maghrib)?),
            (isha, self.time_of(isha)?),
        ])
    }

    /// Check that every marker, including sunrise, parses and that the
    /// canonical markers are in daily order.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        for prayer in Prayer::ALL {
            self.time_of(prayer)?;
        }
        self.check_order()
    }

    /// Check that the canonical markers strictly increase through the day.
    pub fn check_order(&self) -> Result<(), ScheduleError> {
        let times = self.canonical_times()?;
        for pair in times.windows(2) {
            let (earlier, earlier_time) = pair[0];
            let (later, later_time) = pair[1];
            if later_time <= earlier_time {
                return Err(ScheduleError::OutOfOrder { earlier, later });
            }
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(parse_time_of_day("05:00"), NaiveTime::from_hms_opt(5, 0, 0));
        assert_eq!(parse_time_of_day("5:07"), NaiveTime::from_hms_opt(5, 7, 0));
        assert_eq!(parse_time_of_day("23:59"), NaiveTime::from_hms_opt(23, 59, 0));
        assert_eq!(parse_time_of_day(" 12:15 "), NaiveTime::from_hms_opt(12, 15, 0));
    }

    #[test]
    fn test_parse_time_with_zone_suffix() {
        assert_eq!(
            parse_time_of_day("04:12 (+03)"),
            NaiveTime::from_hms_opt(4, 12, 0)
        );
        assert_eq!(
            parse_time_of_day("18:40 (AST)"),
            NaiveTime::from_hms_opt(18, 40, 0)
        );
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        assert_eq!(parse_time_of_day(""), None);
        assert_eq!(parse_time_of_day("24:00"), None);
        assert_eq!(parse_time_of_day("12:60"), None);
        assert_eq!(parse_time_of_day("12"), None);
        assert_eq!(parse_time_of_day("noon"), None);
        assert_eq!(parse_time_of_day("12:5"), None);
        assert_eq!(parse_time_of_day("123:45"), None);
    }

    #[test]
    fn test_malformed_time_names_the_prayer() {
        let mut day = reference_schedule();
        day.asr = "3:3O".to_string();

        let err = day.canonical_times().unwrap_err();
        assert_eq!(
            err,
            ScheduleError::MalformedTime {
                prayer: Prayer::Asr,
                value: "3:3O".to_string()
            }
        );
        assert!(err.to_string().contains("Asr"));
    }

    #[test]
    fn test_validate_includes_sunrise() {
        let mut day = reference_schedule();
        assert!(day.validate().is_ok());

        day.sunrise = "--:--".to_string();
        assert!(matches!(
            day.validate(),
            Err(ScheduleError::MalformedTime {
                prayer: Prayer::Sunrise,
                ..
            })
        ));
        // Sunrise never takes part in derivation
        assert!(day.canonical_times().is_ok());
    }

    #[test]
    fn test_check_order() {
        assert!(reference_schedule().check_order().is_ok());

        let day = schedule("05:00", "12:15", "12:15", "18:00", "19:30");
        assert_eq!(
            day.check_order(),
            Err(ScheduleError::OutOfOrder {
                earlier: Prayer::Dhuhr,
                later: Prayer::Asr
            })
        );
        // A supplied day that runs backwards is unusable as a whole
        assert!(day.validate().is_err());
    }

    #[test]
    fn test_canonical_excludes_sunrise() {
        assert_eq!(Prayer::CANONICAL.len(), 5);
        assert!(!Prayer::CANONICAL.contains(&Prayer::Sunrise));
        assert!(!Prayer::Sunrise.is_canonical());
        assert!(Prayer::CANONICAL.iter().all(Prayer::is_canonical));
    }

    #[test]
    fn test_schedule_deserializes_provider_keys() {
        let json = r#"{"Fajr":"04:30","Sunrise":"05:52","Dhuhr":"11:58","Asr":"15:20",
            "Sunset":"18:03","Maghrib":"18:03","Isha":"19:33","Imsak":"04:20"}"#;
        let day: ScheduleOfDay = serde_json::from_str(json).unwrap();

        assert_eq!(day.fajr, "04:30");
        assert_eq!(day.maghrib, "18:03");
        assert_eq!(day.time_str(Prayer::Isha), "19:33");
    }
}
