//! Geographic value types shared by the catalog, the geo filter and the checker.

use serde::{Deserialize, Serialize};

/// A claimed location: a point with an elevation above sea level in meters.
///
/// Built once per town or claim and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in decimal degrees (positive for North, negative for South).
    pub latitude: f64,
    /// Longitude in decimal degrees (positive for East, negative for West).
    pub longitude: f64,
    /// Elevation above sea level in meters.
    pub elevation: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
        }
    }
}

impl From<Location> for haversine::Location {
    fn from(value: Location) -> Self {
        haversine::Location {
            latitude: value.latitude,
            longitude: value.longitude,
        }
    }
}
