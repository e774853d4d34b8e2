//! Qibla command - bearing and distance from a location to the Kaaba.

use anyhow::Result;
use serde::Serialize;

use super::{config_dir_path, resolve_city, with_city_errors};
use crate::args::QiblaTarget;
use crate::config::{self, Location};
use crate::geo::{Bearing, Coordinate, bearing_to, distance_km};
use crate::logger::Log;

/// Result printed by `salat qibla`.
#[derive(Debug, Serialize)]
pub struct QiblaReport {
    pub location: Location,
    pub bearing: Bearing,
    /// Whole degrees, 0-359
    pub bearing_rounded: u16,
    pub compass_point: &'static str,
    pub distance_km: f64,
}

impl QiblaReport {
    pub fn for_location(location: Location) -> Self {
        let bearing = bearing_to(location.coordinate);
        Self {
            bearing,
            bearing_rounded: bearing.rounded(),
            compass_point: bearing.compass_point(),
            distance_km: distance_km(location.coordinate, Coordinate::KAABA),
            location,
        }
    }
}

fn resolve_location(config_dir: Option<&str>, target: &QiblaTarget) -> Result<Location> {
    match target {
        QiblaTarget::Configured => {
            let config_dir = config_dir_path(config_dir);
            config::load(config_dir.as_deref())?.location()
        }
        QiblaTarget::City(name) => {
            let city = resolve_city(name)?;
            Ok(Location {
                name: city.name.to_string(),
                arabic_name: Some(city.arabic_name.to_string()),
                coordinate: city.coordinate(),
            })
        }
        QiblaTarget::Coordinate {
            latitude,
            longitude,
        } => Ok(Location {
            name: format!("{latitude:.4}, {longitude:.4}"),
            arabic_name: None,
            coordinate: Coordinate::new(*latitude, *longitude)?,
        }),
    }
}

/// Handle the qibla command.
pub fn handle_qibla_command(config_dir: Option<&str>, target: &QiblaTarget, json: bool) -> Result<()> {
    if json {
        Log::set_enabled(false);
    } else {
        log_version!();
    }

    let location = with_city_errors(resolve_location(config_dir, target))?;
    let report = QiblaReport::for_location(location);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    log_block_start!("Qibla from {}", report.location.display_name());
    log_indented!("Coordinates: {}", report.location.coordinate);
    log_block_start!(
        "Bearing: {} ({}) clockwise from true north",
        report.bearing,
        report.compass_point
    );
    log_indented!("Distance to the Kaaba: {:.0} km", report.distance_km);
    log_end!();

    Ok(())
}
