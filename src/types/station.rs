//! Defines the weather station reference data and the per-request annotations
//! the geo filter attaches to it.

use crate::types::location::Location;
use serde::{Deserialize, Serialize};
use std::fmt;

// --- Data Structures ---

/// A measurement station as listed in the station catalog.
///
/// Stations are read-only reference data. The `abbreviation` is the key under
/// which the measurement store keeps the station's wind series.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Station {
    /// The human readable station name (e.g., "Zürich / Fluntern").
    pub name: String,
    /// The short station code used by the measurement store (e.g., "SMA").
    pub abbreviation: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Elevation of the measurement site above sea level in meters.
    pub elevation: f64,
}

impl Station {
    pub fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude, self.elevation)
    }
}

/// Outcome of comparing a station's elevation against the search area's bound.
///
/// Under [`ElevationPolicy::Informational`](crate::ElevationPolicy::Informational)
/// both variants are kept in the result; the tag only documents which side of
/// the bound the station fell on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElevationCheck {
    WithinElevationBound,
    ElevationExceeded,
}

impl fmt::Display for ElevationCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElevationCheck::WithinElevationBound => write!(f, "within elevation bound"),
            ElevationCheck::ElevationExceeded => write!(f, "elevation exceeded"),
        }
    }
}

/// A [`Station`] annotated with its distance and elevation difference to one [`Location`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedStation {
    pub station: Station,
    /// Great-circle distance in kilometers, rounded to one decimal place.
    pub distance_km: f64,
    /// Absolute elevation difference in meters.
    pub elevation_diff_m: f64,
    pub elevation_check: ElevationCheck,
}

impl RankedStation {
    pub fn abbreviation(&self) -> &str {
        &self.station.abbreviation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_location_carries_elevation() {
        let station = Station {
            name: "Zürich / Fluntern".to_string(),
            abbreviation: "SMA".to_string(),
            latitude: 47.3779,
            longitude: 8.5656,
            elevation: 556.0,
        };
        assert_eq!(station.location(), Location::new(47.3779, 8.5656, 556.0));
    }
}
