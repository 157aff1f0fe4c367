//! Selects the catalog stations that are relevant to a claimed location.
//!
//! A station is relevant when its great-circle distance to the location,
//! rounded to one decimal place, is within the search radius. The elevation
//! difference is always computed and tagged on the result; whether it also
//! excludes stations is decided by the [`ElevationPolicy`].

use crate::stations::error::StationError;
use crate::types::location::Location;
use crate::types::station::{ElevationCheck, RankedStation, Station};
use haversine::{distance, Units};
use log::{debug, info, warn};

/// Default search radius around the claimed location.
pub const DEFAULT_RADIUS_KM: f64 = 10.0;
/// Default maximum elevation difference between location and station.
pub const DEFAULT_ELEVATION_BOUND_M: f64 = 200.0;

/// What happens to stations in range whose elevation difference exceeds the bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElevationPolicy {
    /// Keep the station; the elevation check is only recorded on the [`RankedStation`].
    #[default]
    Informational,
    /// Drop stations tagged [`ElevationCheck::ElevationExceeded`].
    Exclude,
}

/// Parameters of the station search around a location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchArea {
    pub radius_km: f64,
    pub elevation_bound_m: f64,
    pub elevation_policy: ElevationPolicy,
}

impl Default for SearchArea {
    fn default() -> Self {
        Self {
            radius_km: DEFAULT_RADIUS_KM,
            elevation_bound_m: DEFAULT_ELEVATION_BOUND_M,
            elevation_policy: ElevationPolicy::default(),
        }
    }
}

impl SearchArea {
    pub fn with_radius_km(mut self, radius_km: f64) -> Self {
        self.radius_km = radius_km;
        self
    }

    pub fn with_elevation_bound_m(mut self, elevation_bound_m: f64) -> Self {
        self.elevation_bound_m = elevation_bound_m;
        self
    }

    pub fn with_elevation_policy(mut self, elevation_policy: ElevationPolicy) -> Self {
        self.elevation_policy = elevation_policy;
        self
    }
}

/// Rounds to one decimal place. Distances are compared and stored in this precision.
///
/// Halves round away from zero, and [`haversine`] uses an Earth radius of
/// 6371 km. A half-to-even rounding over a 6371.0088 km radius can disagree on
/// distances within about 1e-5 km of a rounding edge.
pub(crate) fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Distance in kilometers between a station and a location, rounded to one decimal.
pub fn station_distance_km(station: &Station, location: &Location) -> f64 {
    let dist_km = distance(
        station.location().into(),
        (*location).into(),
        Units::Kilometers,
    );
    round_to_tenth(dist_km)
}

/// Ranks a single station against a location without applying any inclusion rule.
pub fn rank_station(station: &Station, location: &Location, area: &SearchArea) -> RankedStation {
    let elevation_diff_m = (location.elevation - station.elevation).abs();
    let elevation_check = if elevation_diff_m <= area.elevation_bound_m {
        ElevationCheck::WithinElevationBound
    } else {
        ElevationCheck::ElevationExceeded
    };
    RankedStation {
        station: station.clone(),
        distance_km: station_distance_km(station, location),
        elevation_diff_m,
        elevation_check,
    }
}

/// Returns the stations within `area.radius_km` of `location`, in catalog order.
///
/// # Errors
///
/// Returns [`StationError::NoStationsInRange`] if no station qualifies. This is
/// terminal for the request.
pub fn select(
    location: &Location,
    catalog: &[Station],
    area: &SearchArea,
) -> Result<Vec<RankedStation>, StationError> {
    let selected: Vec<RankedStation> = catalog
        .iter()
        .map(|station| rank_station(station, location, area))
        .filter(|ranked| ranked.distance_km <= area.radius_km)
        .filter(|ranked| match ranked.elevation_check {
            ElevationCheck::WithinElevationBound => true,
            ElevationCheck::ElevationExceeded => {
                warn!(
                    "Station {} is {:.0} m above/below the location (bound {} m)",
                    ranked.abbreviation(),
                    ranked.elevation_diff_m,
                    area.elevation_bound_m
                );
                area.elevation_policy == ElevationPolicy::Informational
            }
        })
        .collect();

    for ranked in &selected {
        debug!(
            "Selected station {} at {} km ({})",
            ranked.abbreviation(),
            ranked.distance_km,
            ranked.elevation_check
        );
    }

    if selected.is_empty() {
        return Err(StationError::NoStationsInRange {
            radius_km: area.radius_km,
        });
    }
    info!(
        "Selected {} of {} stations within {} km",
        selected.len(),
        catalog.len(),
        area.radius_km
    );
    Ok(selected)
}
