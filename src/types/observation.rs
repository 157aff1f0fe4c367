//! Defines the two classes of wind measurements and a single observation row.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The measurement class a wind speed reading belongs to.
///
/// Each station keeps one series per kind in the measurement store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MeasurementKind {
    /// Wind speed averaged over a 10 minute interval.
    Sustained,
    /// Peak wind speed within a ~1 second sampling interval.
    Gust,
}

impl MeasurementKind {
    pub const ALL: [MeasurementKind; 2] = [MeasurementKind::Sustained, MeasurementKind::Gust];

    /// Suffix of the per-station table holding this kind of series.
    pub(crate) fn table_suffix(&self) -> &'static str {
        match self {
            MeasurementKind::Sustained => "wind_10min",
            MeasurementKind::Gust => "wind_1s",
        }
    }

    /// Name of the table holding this series for the given station abbreviation.
    pub fn table_name(&self, abbreviation: &str) -> String {
        format!("{}_{}", abbreviation, self.table_suffix())
    }

    pub fn label(&self) -> &'static str {
        match self {
            MeasurementKind::Sustained => "10min interval",
            MeasurementKind::Gust => "gust peak",
        }
    }
}

/// Formats a `MeasurementKind` using its display label.
///
/// # Examples
///
/// ```
/// use windcheck::MeasurementKind;
///
/// assert_eq!(MeasurementKind::Gust.to_string(), "gust peak");
/// assert_eq!(MeasurementKind::Sustained.table_name("SMA"), "SMA_wind_10min");
/// ```
impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One wind speed reading in km/h.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Abbreviation of the station that recorded the value.
    pub station: String,
    pub timestamp: NaiveDateTime,
    pub speed_kmh: f64,
    pub kind: MeasurementKind,
}

impl Observation {
    /// Identity used for deduplication: two observations with the same key are the same reading.
    pub fn key(&self) -> (&str, NaiveDateTime, MeasurementKind) {
        (self.station.as_str(), self.timestamp, self.kind)
    }
}
