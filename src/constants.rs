//! Application-wide constants: defaults, validation limits and fixed points.

// # Configuration defaults

pub const DEFAULT_CITY: &str = "Buraidah";
pub const DEFAULT_LOCATION_NAME: &str = "Custom";
pub const DEFAULT_ALERT_DELAY: u32 = 10; // minutes after the prayer
pub const DEFAULT_ALERT_DURATION: u32 = 15; // minutes
pub const DEFAULT_THEME: &str = "emerald";
pub const DEFAULT_METHOD: u8 = 4; // Umm Al-Qura University, Makkah
pub const DEFAULT_UPDATE_INTERVAL: u64 = 10; // seconds between engine evaluations

// # Validation limits

pub const MINIMUM_ALERT_DELAY: u32 = 0;
pub const MAXIMUM_ALERT_DELAY: u32 = 30;
pub const MINIMUM_ALERT_DURATION: u32 = 1;
pub const MAXIMUM_ALERT_DURATION: u32 = 60;
pub const MINIMUM_METHOD: u8 = 0;
pub const MAXIMUM_METHOD: u8 = 23;
pub const MINIMUM_UPDATE_INTERVAL: u64 = 1;
pub const MAXIMUM_UPDATE_INTERVAL: u64 = 60;

// # Monitor timing

/// Period of the countdown driver.
pub const COUNTDOWN_INTERVAL_MS: u64 = 1000;

/// Longest single sleep of the main loop, so signals and fetch results are
/// picked up promptly.
pub const MAX_POLL_SLICE_MS: u64 = 250;

// # Time provider

pub const ALADHAN_BASE_URL: &str = "https://api.aladhan.com/v1";
pub const FETCH_TIMEOUT_SECS: u64 = 10;
pub const CACHE_RETENTION_DAYS: i64 = 7;

// # Geography

/// Kaaba, Masjid al-Haram.
pub const KAABA_LATITUDE: f64 = 21.422487;
pub const KAABA_LONGITUDE: f64 = 39.826206;

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// # Display

/// Countdown label once the target has been reached ("now").
pub const ARRIVED_LABEL: &str = "الآن";
pub const AM_SUFFIX: &str = "ص";
pub const PM_SUFFIX: &str = "م";
pub const QUIET_MODE_TITLE: &str = "أغلق جوالك وأخشع بصلاتك";
pub const QUIET_MODE_SUBTITLE: &str = "الصلاة صلة بين العبد وربه";

// # Exit codes

pub const EXIT_FAILURE: i32 = 1;
