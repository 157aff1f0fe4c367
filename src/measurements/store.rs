//! Read-only access to per-station wind series.
//!
//! A [`MeasurementStore`] hands out one [`MeasurementSession`] per request.
//! The session is the only handle the aggregator queries through, and it is
//! released when dropped, on success and error paths alike.

use crate::measurements::error::MeasurementError;
use crate::types::date_window::DateWindow;
use crate::types::observation::{MeasurementKind, Observation};
use chrono::NaiveDateTime;
use log::debug;
use ordered_float::OrderedFloat;
use std::collections::HashMap;

pub trait MeasurementStore: Send + Sync {
    /// Acquires a session for one request.
    fn open_session(&self) -> Result<Box<dyn MeasurementSession + '_>, MeasurementError>;
}

pub trait MeasurementSession {
    /// All readings of `kind` recorded by the station on a date inside `window`.
    ///
    /// # Errors
    ///
    /// [`MeasurementError::UnknownStationSchema`] if the store has no table for
    /// the station and kind.
    fn observations(
        &mut self,
        abbreviation: &str,
        kind: MeasurementKind,
        window: &DateWindow,
    ) -> Result<Vec<Observation>, MeasurementError>;

    /// Highest reading of `kind` inside `window`, `None` if there is none.
    fn max_speed(
        &mut self,
        abbreviation: &str,
        kind: MeasurementKind,
        window: &DateWindow,
    ) -> Result<Option<f64>, MeasurementError>;
}

/// Maximum over the speeds, ignoring NaN readings.
pub(crate) fn max_speed_of<'a>(observations: impl IntoIterator<Item = &'a Observation>) -> Option<f64> {
    observations
        .into_iter()
        .filter(|o| !o.speed_kmh.is_nan())
        .map(|o| OrderedFloat(o.speed_kmh))
        .max()
        .map(OrderedFloat::into_inner)
}

/// An in-memory store keyed by station abbreviation and measurement kind.
///
/// A table exists once it has been inserted, even when it holds no rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: HashMap<(String, MeasurementKind), Vec<Observation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a (possibly empty) table for the station and kind, replacing any previous one.
    pub fn insert_table(&mut self, abbreviation: &str, kind: MeasurementKind) -> &mut Self {
        self.tables
            .insert((abbreviation.to_string(), kind), Vec::new());
        self
    }

    /// Appends a reading, creating the table if needed.
    pub fn push(
        &mut self,
        abbreviation: &str,
        kind: MeasurementKind,
        timestamp: NaiveDateTime,
        speed_kmh: f64,
    ) -> &mut Self {
        self.tables
            .entry((abbreviation.to_string(), kind))
            .or_default()
            .push(Observation {
                station: abbreviation.to_string(),
                timestamp,
                speed_kmh,
                kind,
            });
        self
    }

    fn table(
        &self,
        abbreviation: &str,
        kind: MeasurementKind,
    ) -> Result<&[Observation], MeasurementError> {
        self.tables
            .get(&(abbreviation.to_string(), kind))
            .map(Vec::as_slice)
            .ok_or_else(|| MeasurementError::UnknownStationSchema {
                abbreviation: abbreviation.to_string(),
                kind,
                table: kind.table_name(abbreviation),
            })
    }
}

impl MeasurementStore for MemoryStore {
    fn open_session(&self) -> Result<Box<dyn MeasurementSession + '_>, MeasurementError> {
        debug!("Opening in-memory session ({} tables)", self.tables.len());
        Ok(Box::new(MemorySession { store: self }))
    }
}

struct MemorySession<'a> {
    store: &'a MemoryStore,
}

impl MeasurementSession for MemorySession<'_> {
    fn observations(
        &mut self,
        abbreviation: &str,
        kind: MeasurementKind,
        window: &DateWindow,
    ) -> Result<Vec<Observation>, MeasurementError> {
        Ok(self
            .store
            .table(abbreviation, kind)?
            .iter()
            .filter(|o| window.contains(o.timestamp))
            .cloned()
            .collect())
    }

    fn max_speed(
        &mut self,
        abbreviation: &str,
        kind: MeasurementKind,
        window: &DateWindow,
    ) -> Result<Option<f64>, MeasurementError> {
        let table = self.store.table(abbreviation, kind)?;
        Ok(max_speed_of(
            table.iter().filter(|o| window.contains(o.timestamp)),
        ))
    }
}

impl Drop for MemorySession<'_> {
    fn drop(&mut self) {
        debug!("Closing in-memory session");
    }
}
