//! Turns the selected stations into per-station wind maxima for a date window.

use crate::measurements::error::MeasurementError;
use crate::measurements::store::MeasurementSession;
use crate::types::date_window::DateWindow;
use crate::types::observation::{MeasurementKind, Observation};
use crate::types::station::RankedStation;
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A [`RankedStation`] with its wind maxima over the requested window.
///
/// A maximum is `None` when the station recorded nothing of that kind in the
/// window. It is never defaulted to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSummary {
    pub ranked: RankedStation,
    pub max_sustained: Option<f64>,
    pub max_gust: Option<f64>,
}

impl StationSummary {
    pub fn max(&self, kind: MeasurementKind) -> Option<f64> {
        match kind {
            MeasurementKind::Sustained => self.max_sustained,
            MeasurementKind::Gust => self.max_gust,
        }
    }

    /// Whether at least one of the two maxima is present.
    pub fn has_data(&self) -> bool {
        self.max_sustained.is_some() || self.max_gust.is_some()
    }

    pub fn abbreviation(&self) -> &str {
        self.ranked.abbreviation()
    }

    pub fn distance_km(&self) -> f64 {
        self.ranked.distance_km
    }
}

/// Output of [`aggregate`]: one summary per station plus the merged observations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    /// Summaries in the order the stations were given.
    pub summaries: Vec<StationSummary>,
    /// Sustained and gust readings of all stations, one entry per
    /// (station, timestamp, kind), for time-series display.
    pub observations: Vec<Observation>,
}

/// Drops repeated (station, timestamp, kind) readings, keeping the first occurrence.
pub fn dedup_observations(observations: Vec<Observation>) -> Vec<Observation> {
    let mut seen = HashSet::with_capacity(observations.len());
    observations
        .into_iter()
        .filter(|o| seen.insert((o.station.clone(), o.timestamp, o.kind)))
        .collect()
}

/// Queries both measurement classes of every station for the window.
///
/// Maxima come from the store's per-kind max query and are independent of the
/// merged observation list.
///
/// # Errors
///
/// Any store error aborts the whole aggregation, including a station without
/// a table ([`MeasurementError::UnknownStationSchema`]).
pub fn aggregate(
    session: &mut (dyn MeasurementSession + '_),
    stations: &[RankedStation],
    window: &DateWindow,
) -> Result<Aggregation, MeasurementError> {
    let mut summaries = Vec::with_capacity(stations.len());
    let mut merged = Vec::new();

    for ranked in stations {
        let abbreviation = ranked.abbreviation();
        debug!("Querying station {} for {}", abbreviation, window);

        for kind in MeasurementKind::ALL {
            let rows = session
                .observations(abbreviation, kind, window)
                .inspect_err(log_store_error)?;
            merged.extend(rows);
        }

        let max_sustained = session
            .max_speed(abbreviation, MeasurementKind::Sustained, window)
            .inspect_err(log_store_error)?;
        let max_gust = session
            .max_speed(abbreviation, MeasurementKind::Gust, window)
            .inspect_err(log_store_error)?;

        if max_sustained.is_none() && max_gust.is_none() {
            warn!(
                "Station {} has no wind data between {}",
                abbreviation, window
            );
        }

        summaries.push(StationSummary {
            ranked: ranked.clone(),
            max_sustained,
            max_gust,
        });
    }

    let observations = dedup_observations(merged);
    debug!(
        "Aggregated {} stations, {} distinct observations",
        summaries.len(),
        observations.len()
    );
    Ok(Aggregation {
        summaries,
        observations,
    })
}

fn log_store_error(err: &MeasurementError) {
    if let MeasurementError::UnknownStationSchema { table, .. } = err {
        error!("Catalog and measurement store disagree: table {} does not exist", table);
    }
}
