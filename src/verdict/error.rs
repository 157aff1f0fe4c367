use crate::types::observation::MeasurementKind;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum VerdictError {
    #[error("None of the {stations} selected stations recorded wind data in the requested window")]
    InsufficientData { stations: usize },

    #[error("No {kind} readings in the requested window at any of the {stations} selected stations")]
    MissingMeasurementClass {
        kind: MeasurementKind,
        stations: usize,
    },
}
