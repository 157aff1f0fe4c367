use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StationError {
    #[error("Failed to read station catalog '{0}'")]
    CatalogRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse station catalog '{0}'")]
    CatalogParse(PathBuf, #[source] serde_json::Error),

    #[error("No towns registered for postal code {0}")]
    UnknownPostalCode(String),

    #[error("Postal code {postal_code} covers several places, pick one of: {}", .candidates.join(", "))]
    AmbiguousPostalCode {
        postal_code: String,
        candidates: Vec<String>,
    },

    #[error("Place '{place}' is not registered under postal code {postal_code}")]
    UnknownPlace { postal_code: String, place: String },

    // Terminal for the request: the caller has to retry with another location.
    #[error("No measurement stations found within {radius_km} km")]
    NoStationsInRange { radius_km: f64 },

    // Covers errors joining tokio blocking tasks
    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
