//! A [`MeasurementStore`] over a directory of per-station table files.
//!
//! Each station keeps one file per [`MeasurementKind`], named after the table
//! (`<ABBR>_wind_10min` / `<ABBR>_wind_1s`) with a `.parquet` or `.csv`
//! extension. Both formats carry a `timestamp` and a `speed` (km/h) column.

use crate::measurements::error::MeasurementError;
use crate::measurements::filtering::{WindFrameFilterExt, SPEED_COLUMN, TIMESTAMP_COLUMN};
use crate::measurements::store::{MeasurementSession, MeasurementStore};
use crate::types::date_window::DateWindow;
use crate::types::observation::{MeasurementKind, Observation};
use chrono::DateTime;
use log::{debug, warn};
use polars::prelude::*;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

const TIMESTAMP_MS_COLUMN: &str = "timestamp_ms";

#[derive(Debug, Clone)]
pub struct FrameStore {
    root: PathBuf,
}

impl FrameStore {
    /// Opens the store rooted at `root`, which must be an existing directory.
    pub async fn open(root: &Path) -> Result<Self, MeasurementError> {
        let metadata = tokio::fs::metadata(root)
            .await
            .map_err(|e| MeasurementError::StoreOpen(root.to_path_buf(), e))?;
        if !metadata.is_dir() {
            return Err(MeasurementError::StoreOpen(
                root.to_path_buf(),
                io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
            ));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing a table, preferring parquet over CSV.
    fn table_path(&self, table: &str) -> Option<PathBuf> {
        ["parquet", "csv"]
            .iter()
            .map(|extension| self.root.join(format!("{}.{}", table, extension)))
            .find(|path| path.is_file())
    }
}

impl MeasurementStore for FrameStore {
    fn open_session(&self) -> Result<Box<dyn MeasurementSession + '_>, MeasurementError> {
        debug!("Opening frame store session at {}", self.root.display());
        Ok(Box::new(FrameSession {
            store: self,
            windows: HashMap::new(),
        }))
    }
}

/// The rows of a table inside a window are read once and kept for the
/// lifetime of the session, so the range and max queries of one request share
/// a single file read.
struct FrameSession<'a> {
    store: &'a FrameStore,
    windows: HashMap<(String, DateWindow), DataFrame>,
}

impl FrameSession<'_> {
    /// `timestamp_ms` (i64) and `speed` (f64) of the table rows inside `window`.
    fn window_frame(
        &mut self,
        abbreviation: &str,
        kind: MeasurementKind,
        window: &DateWindow,
    ) -> Result<DataFrame, MeasurementError> {
        let table = kind.table_name(abbreviation);
        let key = (table.clone(), *window);
        if let Some(df) = self.windows.get(&key) {
            return Ok(df.clone());
        }

        let path = self.store.table_path(&table).ok_or_else(|| {
            MeasurementError::UnknownStationSchema {
                abbreviation: abbreviation.to_string(),
                kind,
                table: table.clone(),
            }
        })?;
        let mut frame = scan_table(&path)?;

        let schema = frame
            .collect_schema()
            .map_err(|e| MeasurementError::TableScan(path.clone(), e))?;
        for column in [TIMESTAMP_COLUMN, SPEED_COLUMN] {
            if !schema.contains(column) {
                return Err(MeasurementError::MissingColumn {
                    table,
                    column: column.to_string(),
                });
            }
        }

        let df = frame
            .filter_window(window)
            .select([
                col(TIMESTAMP_COLUMN)
                    .cast(DataType::Datetime(TimeUnit::Milliseconds, None))
                    .cast(DataType::Int64)
                    .alias(TIMESTAMP_MS_COLUMN),
                col(SPEED_COLUMN).cast(DataType::Float64),
            ])
            .collect()
            .map_err(|source| MeasurementError::PolarsError {
                table: table.clone(),
                source,
            })?;

        debug!(
            "Read {} rows of table {} from {}",
            df.height(),
            table,
            path.display()
        );
        self.windows.insert(key, df.clone());
        Ok(df)
    }
}

fn scan_table(path: &Path) -> Result<LazyFrame, MeasurementError> {
    let is_parquet = path
        .extension()
        .is_some_and(|extension| extension == "parquet");
    let frame = if is_parquet {
        LazyFrame::scan_parquet(path, Default::default())
    } else {
        LazyCsvReader::new(path)
            .with_has_header(true)
            .with_try_parse_dates(true)
            .finish()
    };
    frame.map_err(|e| MeasurementError::TableScan(path.to_path_buf(), e))
}

impl MeasurementSession for FrameSession<'_> {
    fn observations(
        &mut self,
        abbreviation: &str,
        kind: MeasurementKind,
        window: &DateWindow,
    ) -> Result<Vec<Observation>, MeasurementError> {
        let df = self.window_frame(abbreviation, kind, window)?;
        let table = kind.table_name(abbreviation);
        let polars_err = |source| MeasurementError::PolarsError {
            table: table.clone(),
            source,
        };

        let timestamps = df
            .column(TIMESTAMP_MS_COLUMN)
            .and_then(|c| c.i64())
            .map_err(polars_err)?;
        let speeds = df
            .column(SPEED_COLUMN)
            .and_then(|c| c.f64())
            .map_err(polars_err)?;

        let mut observations = Vec::with_capacity(df.height());
        let mut skipped = 0usize;
        for (timestamp_ms, speed) in timestamps.into_iter().zip(speeds.into_iter()) {
            let timestamp = timestamp_ms
                .and_then(DateTime::from_timestamp_millis)
                .map(|dt| dt.naive_utc());
            match (timestamp, speed) {
                (Some(timestamp), Some(speed_kmh)) => observations.push(Observation {
                    station: abbreviation.to_string(),
                    timestamp,
                    speed_kmh,
                    kind,
                }),
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!("Skipped {} incomplete rows in table {}", skipped, table);
        }
        Ok(observations)
    }

    fn max_speed(
        &mut self,
        abbreviation: &str,
        kind: MeasurementKind,
        window: &DateWindow,
    ) -> Result<Option<f64>, MeasurementError> {
        let df = self.window_frame(abbreviation, kind, window)?;
        let table = kind.table_name(abbreviation);
        let polars_err = |source| MeasurementError::PolarsError {
            table: table.clone(),
            source,
        };

        let max_df = df.lazy().max_speed().collect().map_err(polars_err)?;
        if max_df.height() != 1 {
            return Err(MeasurementError::UnexpectedData {
                table: table.clone(),
                message: format!("max aggregation returned {} rows", max_df.height()),
            });
        }
        let max = max_df
            .column(SPEED_COLUMN)
            .and_then(|c| c.f64())
            .map_err(polars_err)?
            .get(0);
        Ok(max)
    }
}

impl Drop for FrameSession<'_> {
    fn drop(&mut self) {
        debug!(
            "Closing frame store session ({} table windows read)",
            self.windows.len()
        );
    }
}
