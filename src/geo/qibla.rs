//! Qibla direction and distance.
//!
//! The bearing is the initial great-circle course from the origin toward the
//! destination, measured clockwise from true north:
//!
//! ```text
//! y = sin Δλ
//! x = cos φ1 · tan φ2 − sin φ1 · cos Δλ
//! θ = atan2(y, x)
//! ```
//!
//! where φ1, φ2 are the latitudes of origin and destination and Δλ the
//! longitude difference. All work is done in full `f64` precision. Rounding to
//! whole degrees happens only in [`Bearing::rounded`] and the `Display` impl.

use serde::{Serialize, Serializer};
use std::fmt;

use super::Coordinate;
use crate::constants::EARTH_RADIUS_KM;

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Direction in degrees, always in `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Bearing(f64);

impl Bearing {
    /// Normalize any angle into `[0, 360)`.
    pub fn from_degrees(degrees: f64) -> Self {
        let normalized = ((degrees % 360.0) + 360.0) % 360.0;
        // Tiny negative inputs can round up to exactly 360.0
        if normalized >= 360.0 || !normalized.is_finite() {
            Bearing(0.0)
        } else {
            Bearing(normalized)
        }
    }

    /// Unrounded value.
    pub fn degrees(&self) -> f64 {
        self.0
    }

    /// Whole degrees for presentation; 359.5 and above wrap to 0.
    pub fn rounded(&self) -> u16 {
        let whole = self.0.round() as u16;
        if whole >= 360 { 0 } else { whole }
    }

    /// 16-point compass label such as "SW" or "WSW".
    pub fn compass_point(&self) -> &'static str {
        let index = ((self.0 + 11.25) / 22.5) as usize % COMPASS_POINTS.len();
        COMPASS_POINTS[index]
    }
}

impl fmt::Display for Bearing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.rounded())
    }
}

impl Serialize for Bearing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

/// Initial great-circle bearing from `origin` to `destination`.
///
/// Returns 0 when both points are the same place.
pub fn initial_bearing(origin: Coordinate, destination: Coordinate) -> Bearing {
    if origin.same_place(&destination) {
        return Bearing(0.0);
    }

    let phi1 = origin.latitude.to_radians();
    let phi2 = destination.latitude.to_radians();
    let delta_lambda = (destination.longitude - origin.longitude).to_radians();

    let y = delta_lambda.sin();
    let x = phi1.cos() * phi2.tan() - phi1.sin() * delta_lambda.cos();

    Bearing::from_degrees(y.atan2(x).to_degrees())
}

/// Qibla bearing from `origin`.
pub fn bearing_to(origin: Coordinate) -> Bearing {
    initial_bearing(origin, Coordinate::KAABA)
}

/// Haversine great-circle distance in kilometres.
pub fn distance_km(origin: Coordinate, destination: Coordinate) -> f64 {
    let phi1 = origin.latitude.to_radians();
    let phi2 = destination.latitude.to_radians();
    let delta_phi = phi2 - phi1;
    let delta_lambda = (destination.longitude - origin.longitude).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate::new(latitude, longitude).unwrap()
    }

    #[test]
    fn test_riyadh_faces_west_south_west() {
        let bearing = bearing_to(at(24.7136, 46.6753));
        assert!((bearing.degrees() - 243.8).abs() < 1.0, "got {bearing}");
        assert_eq!(bearing.rounded(), 244);
        assert_eq!(bearing.compass_point(), "WSW");
    }

    #[test]
    fn test_known_cities() {
        // Buraidah lies north-east of Makkah
        let buraidah = bearing_to(at(26.3273, 43.9750));
        assert!((buraidah.degrees() - 218.6).abs() < 1.0);

        // Jeddah lies west of Makkah
        let jeddah = bearing_to(at(21.5433, 39.1728));
        assert!((jeddah.degrees() - 101.1).abs() < 1.0);

        // London prays south-east
        let london = bearing_to(at(51.5074, -0.1278));
        assert!((london.degrees() - 119.0).abs() < 1.0);
        assert_eq!(london.compass_point(), "ESE");
    }

    #[test]
    fn test_destination_itself_is_zero() {
        let bearing = bearing_to(Coordinate::KAABA);
        assert_eq!(bearing.degrees(), 0.0);
        assert_eq!(bearing.to_string(), "0°");
    }

    #[test]
    fn test_normalization() {
        assert_eq!(Bearing::from_degrees(-90.0).degrees(), 270.0);
        assert_eq!(Bearing::from_degrees(720.0).degrees(), 0.0);
        assert_eq!(Bearing::from_degrees(-1e-15).degrees(), 0.0);
        assert_eq!(Bearing::from_degrees(f64::NAN).degrees(), 0.0);
    }

    #[test]
    fn test_rounding_wraps_at_boundary() {
        assert_eq!(Bearing::from_degrees(359.6).rounded(), 0);
        assert_eq!(Bearing::from_degrees(359.4).rounded(), 359);
        assert_eq!(Bearing::from_degrees(228.5).rounded(), 229);
    }

    #[test]
    fn test_compass_points() {
        assert_eq!(Bearing::from_degrees(0.0).compass_point(), "N");
        assert_eq!(Bearing::from_degrees(11.24).compass_point(), "N");
        assert_eq!(Bearing::from_degrees(11.25).compass_point(), "NNE");
        assert_eq!(Bearing::from_degrees(225.0).compass_point(), "SW");
        assert_eq!(Bearing::from_degrees(355.0).compass_point(), "N");
    }

    #[test]
    fn test_distance() {
        assert!(distance_km(Coordinate::KAABA, Coordinate::KAABA).abs() < 1e-9);

        // Riyadh to Makkah is roughly 790 km as the crow flies
        let riyadh = distance_km(at(24.7136, 46.6753), Coordinate::KAABA);
        assert!((riyadh - 790.0).abs() < 25.0, "got {riyadh}");
    }
}
