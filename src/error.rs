use crate::measurements::error::MeasurementError;
use crate::request::RequestError;
use crate::stations::error::StationError;
use crate::verdict::error::VerdictError;
use std::path::PathBuf;
use thiserror::Error;

/// Every error a wind check can end in. None of them is retried internally.
#[derive(Debug, Error)]
pub enum WindCheckError {
    #[error(transparent)]
    InvalidRequest(#[from] RequestError),

    #[error(transparent)]
    Station(#[from] StationError),

    #[error(transparent)]
    Measurement(#[from] MeasurementError),

    #[error(transparent)]
    Verdict(#[from] VerdictError),

    #[error("Failed to determine data directory")]
    DataDirResolution,

    #[error("Data directory '{0}' is not usable")]
    DataDir(PathBuf, #[source] std::io::Error),

    // Covers errors joining tokio blocking tasks
    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl WindCheckError {
    /// True for the "no stations within the search radius" outcome.
    pub fn is_no_stations_in_range(&self) -> bool {
        matches!(
            self,
            WindCheckError::Station(StationError::NoStationsInRange { .. })
        )
    }

    /// True when the selected stations have no usable readings in the window.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, WindCheckError::Verdict(_))
    }

    /// True when the catalog references a station the measurement store does not know.
    pub fn is_unknown_station_schema(&self) -> bool {
        matches!(
            self,
            WindCheckError::Measurement(MeasurementError::UnknownStationSchema { .. })
        )
    }
}
