use proptest::prelude::*;
use salat::geo::{Bearing, Coordinate, bearing_to, distance_km, initial_bearing};

/// Generate valid latitude values
fn latitude_strategy() -> impl Strategy<Value = f64> {
    -90.0..=90.0
}

/// Generate valid longitude values
fn longitude_strategy() -> impl Strategy<Value = f64> {
    -180.0..=180.0
}

/// Property tests for qibla bearing and distance
#[cfg(test)]
mod qibla_tests {
    use super::*;

    proptest! {
        /// The bearing is always a finite angle in [0, 360)
        #[test]
        fn test_bearing_in_range(
            lat in latitude_strategy(),
            lon in longitude_strategy()
        ) {
            let bearing = bearing_to(Coordinate::new(lat, lon).unwrap());
            prop_assert!(bearing.degrees().is_finite());
            prop_assert!((0.0..360.0).contains(&bearing.degrees()),
                "bearing {} out of range for ({lat}, {lon})", bearing.degrees());
            prop_assert!(bearing.rounded() < 360);
        }

        /// Any angle normalizes into [0, 360)
        #[test]
        fn test_bearing_normalization(degrees in -10_000.0f64..10_000.0) {
            let bearing = Bearing::from_degrees(degrees);
            prop_assert!((0.0..360.0).contains(&bearing.degrees()));
            let diff = (bearing.degrees() - degrees).rem_euclid(360.0);
            prop_assert!(diff < 1e-6 || (360.0 - diff) < 1e-6);
        }

        /// Distance is symmetric and bounded by half the circumference
        #[test]
        fn test_distance_symmetric(
            lat1 in latitude_strategy(),
            lon1 in longitude_strategy(),
            lat2 in latitude_strategy(),
            lon2 in longitude_strategy()
        ) {
            let a = Coordinate::new(lat1, lon1).unwrap();
            let b = Coordinate::new(lat2, lon2).unwrap();
            let ab = distance_km(a, b);
            let ba = distance_km(b, a);

            prop_assert!(ab >= 0.0);
            prop_assert!((ab - ba).abs() < 1e-6);
            prop_assert!(ab <= std::f64::consts::PI * 6371.0 + 1e-6);
        }

        /// Stepping a little along the bearing gets closer to the Kaaba
        #[test]
        fn test_bearing_points_toward_kaaba(
            lat in -60.0f64..60.0,
            lon in longitude_strategy()
        ) {
            let origin = Coordinate::new(lat, lon).unwrap();
            let start = distance_km(origin, Coordinate::KAABA);
            prop_assume!(start > 50.0 && start < 19_000.0);

            let theta = initial_bearing(origin, Coordinate::KAABA).degrees().to_radians();
            let step = 0.05;
            let moved_lat = (lat + step * theta.cos()).clamp(-90.0, 90.0);
            let moved_lon = lon + step * theta.sin() / lat.to_radians().cos();
            let moved_lon = (moved_lon + 540.0).rem_euclid(360.0) - 180.0;
            let moved = Coordinate::new(moved_lat, moved_lon).unwrap();

            prop_assert!(distance_km(moved, Coordinate::KAABA) < start);
        }
    }
}
