//! Aladhan timings API client.
//!
//! Requests `GET {base}/timings/{DD-MM-YYYY}?latitude=..&longitude=..&method=..`
//! and decodes `data.timings` plus `data.date.hijri`. Calls are blocking and
//! bounded by [`FETCH_TIMEOUT_SECS`]; the monitor runs them on worker threads.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

use super::{DayTimings, HijriDate, TimingsProvider};
use crate::constants::{ALADHAN_BASE_URL, FETCH_TIMEOUT_SECS};
use crate::geo::Coordinate;
use crate::schedule::ScheduleOfDay;

#[derive(Debug, Deserialize)]
struct ApiResponse {
    code: u16,
    #[serde(default)]
    status: String,
    /// An object on success, an error message string otherwise
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiData {
    timings: ScheduleOfDay,
    date: ApiDate,
}

#[derive(Debug, Deserialize)]
struct ApiDate {
    hijri: Option<HijriDate>,
}

/// Blocking client for the Aladhan prayer-times service.
pub struct AladhanClient {
    client: reqwest::blocking::Client,
    base_url: String,
    method: u8,
    debug_enabled: bool,
}

impl AladhanClient {
    /// Client for the public API using calculation `method`.
    pub fn new(method: u8) -> Result<Self> {
        Self::with_base_url(ALADHAN_BASE_URL, method)
    }

    pub fn with_base_url(base_url: impl Into<String>, method: u8) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .user_agent(concat!("salat/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            method,
            debug_enabled: false,
        })
    }

    /// Log each request URL.
    pub fn with_debug(mut self, debug_enabled: bool) -> Self {
        self.debug_enabled = debug_enabled;
        self
    }

    /// Full request URL for a date and coordinate.
    pub fn timings_url(&self, date: NaiveDate, coordinate: Coordinate) -> String {
        format!(
            "{}/timings/{}?latitude={}&longitude={}&method={}",
            self.base_url,
            date.format("%d-%m-%Y"),
            coordinate.latitude,
            coordinate.longitude,
            self.method
        )
    }
}

impl TimingsProvider for AladhanClient {
    fn fetch(&self, date: NaiveDate, coordinate: Coordinate) -> Result<DayTimings> {
        let url = self.timings_url(date, coordinate);
        if self.debug_enabled {
            log_pipe!();
            log_debug!("Requesting {url}");
        }

        let response = self
            .client
            .get(&url)
            .send()
            .context("Failed to reach the prayer times service")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Prayer times service returned HTTP {status}");
        }

        let body = response
            .text()
            .context("Failed to read prayer times response")?;

        parse_response(&body, date, coordinate)
    }

    fn key(&self) -> String {
        format!("aladhan-m{}", self.method)
    }
}

/// Decode an Aladhan response body.
///
/// Fails when the envelope reports an error or any of the six times does not
/// parse as `HH:MM`.
pub fn parse_response(body: &str, date: NaiveDate, coordinate: Coordinate) -> Result<DayTimings> {
    let response: ApiResponse =
        serde_json::from_str(body).context("Prayer times response is not valid JSON")?;

    if response.code != 200 {
        let detail = response
            .data
            .as_str()
            .map(str::to_string)
            .unwrap_or(response.status);
        bail!("Prayer times service error {}: {detail}", response.code);
    }

    let data: ApiData = serde_json::from_value(response.data)
        .context("Prayer times response is missing timings")?;

    data.timings
        .validate()
        .context("Prayer times service returned an unusable schedule")?;

    Ok(DayTimings {
        date,
        coordinate,
        schedule: data.timings,
        hijri: data.date.hijri,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{Prayer, ScheduleError};

    const SAMPLE: &str = r#"{
        "code": 200,
        "status": "OK",
        "data": {
            "timings": {
                "Fajr": "04:48", "Sunrise": "06:07", "Dhuhr": "12:09",
                "Asr": "15:33", "Sunset": "18:11", "Maghrib": "18:11",
                "Isha": "19:41", "Imsak": "04:38", "Midnight": "00:09"
            },
            "date": {
                "readable": "14 Mar 2025",
                "timestamp": "1741932000",
                "gregorian": { "date": "14-03-2025" },
                "hijri": {
                    "date": "14-09-1446", "format": "DD-MM-YYYY", "day": "14",
                    "weekday": { "en": "Al Juma'a", "ar": "الجمعة" },
                    "month": { "number": 9, "en": "Ramaḍān", "ar": "رَمَضان" },
                    "year": "1446"
                }
            },
            "meta": { "method": { "id": 4 } }
        }
    }"#;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn buraidah() -> Coordinate {
        Coordinate::new(26.3273, 43.9750).unwrap()
    }

    #[test]
    fn test_parse_sample_response() {
        let timings = parse_response(SAMPLE, date(), buraidah()).unwrap();

        assert_eq!(timings.schedule.time_str(Prayer::Fajr), "04:48");
        assert_eq!(timings.schedule.time_str(Prayer::Sunrise), "06:07");
        assert_eq!(timings.schedule.time_str(Prayer::Isha), "19:41");
        assert_eq!(timings.date, date());
        assert!(timings.is_for(&buraidah()));

        let hijri = timings.hijri.unwrap();
        assert_eq!(hijri.weekday.ar, "الجمعة");
        assert_eq!(hijri.month.number, 9);
        assert_eq!(hijri.year, "1446");
    }

    #[test]
    fn test_parse_error_envelope() {
        let body = r#"{"code": 400, "status": "BAD_REQUEST", "data": "Please specify a valid date."}"#;
        let err = parse_response(body, date(), buraidah()).unwrap_err();
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("valid date"));
    }

    #[test]
    fn test_parse_rejects_unparseable_times() {
        let body = SAMPLE.replace("\"Asr\": \"15:33\"", "\"Asr\": \"late\"");
        assert!(parse_response(&body, date(), buraidah()).is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_order_times() {
        let body = SAMPLE.replace("\"Isha\": \"19:41\"", "\"Isha\": \"00:15\"");
        let err = parse_response(&body, date(), buraidah()).unwrap_err();
        let cause = err.downcast_ref::<ScheduleError>().unwrap();
        assert_eq!(
            cause,
            &ScheduleError::OutOfOrder {
                earlier: Prayer::Maghrib,
                later: Prayer::Isha
            }
        );
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(parse_response("<html>502</html>", date(), buraidah()).is_err());
    }

    #[test]
    fn test_timings_url_and_key() {
        let client = AladhanClient::with_base_url("https://example.test/v1/", 4).unwrap();
        let url = client.timings_url(date(), buraidah());

        assert_eq!(
            url,
            "https://example.test/v1/timings/14-03-2025?latitude=26.3273&longitude=43.975&method=4"
        );
        assert_eq!(client.key(), "aladhan-m4");
    }
}
