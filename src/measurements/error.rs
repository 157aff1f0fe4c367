use crate::types::observation::MeasurementKind;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeasurementError {
    #[error("Failed to open measurement store at '{0}'")]
    StoreOpen(PathBuf, #[source] std::io::Error),

    // The catalog references a station the store has no table for.
    #[error("No {kind} table '{table}' for station '{abbreviation}'")]
    UnknownStationSchema {
        abbreviation: String,
        kind: MeasurementKind,
        table: String,
    },

    #[error("Missing required column '{column}' in table '{table}'")]
    MissingColumn { table: String, column: String },

    #[error("Failed to scan table file '{0}'")]
    TableScan(PathBuf, #[source] PolarsError),

    #[error("Polars operation failed for table {table}: {source}")]
    PolarsError {
        table: String,
        #[source]
        source: PolarsError,
    },

    #[error("Unexpected data in table {table}: {message}")]
    UnexpectedData { table: String, message: String },
}
