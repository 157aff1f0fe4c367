//! The main entry point: runs station selection, measurement aggregation and
//! the verdict for one claim.
//!
//! [`assess`] is the synchronous pipeline. [`WindChecker`] wraps it with a
//! station catalog, a measurement store and the evaluation settings, and runs
//! it on tokio's blocking pool.

use crate::error::WindCheckError;
use crate::measurements::aggregator::{aggregate, StationSummary};
use crate::measurements::frame_store::FrameStore;
use crate::measurements::store::MeasurementStore;
use crate::request::{CheckRequest, RequestPolicy};
use crate::stations::catalog::StationCatalog;
use crate::stations::geo_filter::{select, SearchArea};
use crate::types::date_window::DateWindow;
use crate::types::location::Location;
use crate::types::observation::Observation;
use crate::utils::{catalog_path, ensure_data_dir_exists, get_data_dir, measurements_dir};
use crate::verdict::engine::{evaluate, Verdict};
use crate::verdict::thresholds::Thresholds;
use bon::bon;
use chrono::NaiveDate;
use log::info;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a wind check produces: the verdict plus the data behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub location: Location,
    pub window: DateWindow,
    pub verdict: Verdict,
    /// One row per selected station, in catalog order.
    pub summaries: Vec<StationSummary>,
    /// Deduplicated sustained and gust readings of all selected stations.
    pub observations: Vec<Observation>,
}

impl Assessment {
    /// Station rows ordered by distance, closest first. Equal distances keep catalog order.
    pub fn summaries_by_distance(&self) -> Vec<&StationSummary> {
        let mut rows: Vec<&StationSummary> = self.summaries.iter().collect();
        rows.sort_by_key(|summary| OrderedFloat(summary.distance_km()));
        rows
    }

    /// Readings of one station, in store order.
    pub fn observations_for<'a>(
        &'a self,
        abbreviation: &'a str,
    ) -> impl Iterator<Item = &'a Observation> + 'a {
        self.observations
            .iter()
            .filter(move |o| o.station == abbreviation)
    }
}

/// Runs the whole evaluation for one location and window.
///
/// A single store session is opened for the request and dropped before the
/// verdict is computed, whether aggregation succeeds or not.
///
/// # Errors
///
/// * [`StationError::NoStationsInRange`](crate::StationError::NoStationsInRange) if the search area is empty.
/// * [`MeasurementError`](crate::MeasurementError) for store failures, including unknown station tables.
/// * [`VerdictError`](crate::VerdictError) if the selected stations have no usable data.
pub fn assess(
    catalog: &StationCatalog,
    store: &dyn MeasurementStore,
    location: Location,
    window: DateWindow,
    search_area: &SearchArea,
    thresholds: &Thresholds,
) -> Result<Assessment, WindCheckError> {
    let stations = select(&location, &catalog.stations, search_area)?;

    let aggregation = {
        let mut session = store.open_session()?;
        aggregate(session.as_mut(), &stations, &window)?
    };

    let verdict = evaluate(&aggregation.summaries, thresholds)?;
    Ok(Assessment {
        location,
        window,
        verdict,
        summaries: aggregation.summaries,
        observations: aggregation.observations,
    })
}

/// A configured wind checker.
///
/// # Examples
///
/// ```rust
/// # use windcheck::{WindChecker, StationCatalog, MemoryStore, SearchArea, WindCheckError};
/// # use std::sync::Arc;
/// let checker = WindChecker::builder()
///     .catalog(StationCatalog::default())
///     .store(Arc::new(MemoryStore::new()))
///     .search_area(SearchArea::default().with_radius_km(15.0))
///     .build();
/// assert_eq!(checker.search_area().radius_km, 15.0);
/// ```
pub struct WindChecker {
    catalog: Arc<StationCatalog>,
    store: Arc<dyn MeasurementStore>,
    search_area: SearchArea,
    thresholds: Thresholds,
}

#[bon]
impl WindChecker {
    /// Creates a checker from an already loaded catalog and store.
    ///
    /// `search_area` and `thresholds` default to the regulatory values
    /// (10 km, 200 m, 63 km/h sustained, 100 km/h gust).
    #[builder]
    pub fn new(
        catalog: StationCatalog,
        store: Arc<dyn MeasurementStore>,
        search_area: Option<SearchArea>,
        thresholds: Option<Thresholds>,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            store,
            search_area: search_area.unwrap_or_default(),
            thresholds: thresholds.unwrap_or_default(),
        }
    }

    /// Creates a checker over a data directory holding `catalog.json` and a
    /// `measurements/` table directory.
    pub async fn with_data_dir(data_dir: PathBuf) -> Result<Self, WindCheckError> {
        ensure_data_dir_exists(&data_dir).await?;
        let catalog = StationCatalog::load(&catalog_path(&data_dir)).await?;
        let store = FrameStore::open(&measurements_dir(&data_dir)).await?;
        info!("Wind checker ready on {}", data_dir.display());
        Ok(Self::builder().catalog(catalog).store(Arc::new(store)).build())
    }

    /// Creates a checker over the platform data directory (see [`get_data_dir`]).
    pub async fn open_default() -> Result<Self, WindCheckError> {
        Self::with_data_dir(get_data_dir()?).await
    }

    pub fn catalog(&self) -> &StationCatalog {
        &self.catalog
    }

    pub fn search_area(&self) -> &SearchArea {
        &self.search_area
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Checks the wind speeds around a postal code for a window.
    ///
    /// # Arguments
    ///
    /// * `.postal_code(&str)`: **Required.** Postal code of the claim.
    /// * `.place(&str)`: Optional. Needed when the postal code covers several places.
    /// * `.window(DateWindow)`: **Required.** Inclusive date window of the damage.
    ///
    /// # Errors
    ///
    /// Postal code resolution errors ([`StationError`](crate::StationError)) and every error of [`assess`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use windcheck::{WindChecker, DateWindow, WindCheckError};
    /// # use chrono::NaiveDate;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), WindCheckError> {
    /// let checker = WindChecker::open_default().await?;
    /// let window = DateWindow::new(
    ///     NaiveDate::from_ymd_opt(2023, 8, 24).unwrap(),
    ///     NaiveDate::from_ymd_opt(2023, 8, 26).unwrap(),
    /// );
    /// let assessment = checker
    ///     .check()
    ///     .postal_code("8001")
    ///     .window(window)
    ///     .call()
    ///     .await?;
    /// println!("{} ({})", assessment.verdict.outcome, assessment.verdict.reason);
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn check(
        &self,
        postal_code: &str,
        place: Option<&str>,
        window: DateWindow,
    ) -> Result<Assessment, WindCheckError> {
        let location = self.catalog.resolve_location(postal_code, place)?;
        info!("Checking postal code {} for {}", postal_code, window);
        self.check_location()
            .location(location)
            .window(window)
            .call()
            .await
    }

    /// Checks the wind speeds around a location for a window.
    #[builder]
    pub async fn check_location(
        &self,
        location: Location,
        window: DateWindow,
    ) -> Result<Assessment, WindCheckError> {
        let catalog = Arc::clone(&self.catalog);
        let store = Arc::clone(&self.store);
        let search_area = self.search_area;
        let thresholds = self.thresholds;

        tokio::task::spawn_blocking(move || {
            assess(
                &catalog,
                store.as_ref(),
                location,
                window,
                &search_area,
                &thresholds,
            )
        })
        .await?
    }

    /// Validates a parsed request against `policy` as of `today`, then checks it.
    pub async fn check_request(
        &self,
        request: &CheckRequest,
        policy: &RequestPolicy,
        today: NaiveDate,
    ) -> Result<Assessment, WindCheckError> {
        request.validate(policy, today)?;
        self.check()
            .postal_code(&request.postal_code)
            .maybe_place(request.place.as_deref())
            .window(request.window)
            .call()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurements::error::MeasurementError;
    use crate::measurements::store::MemoryStore;
    use crate::request::RequestError;
    use crate::stations::catalog::Town;
    use crate::stations::error::StationError;
    use crate::types::observation::MeasurementKind;
    use crate::types::station::Station;
    use crate::verdict::engine::{Outcome, Reason};
    use crate::verdict::error::VerdictError;
    use chrono::NaiveDateTime;

    const KM_PER_DEGREE_LAT: f64 = 6371.0 * std::f64::consts::PI / 180.0;
    const TOWN_LAT: f64 = 47.0;
    const TOWN_LON: f64 = 8.0;

    fn station(abbreviation: &str, km_north: f64, elevation: f64) -> Station {
        Station {
            name: format!("Station {}", abbreviation),
            abbreviation: abbreviation.to_string(),
            latitude: TOWN_LAT + km_north / KM_PER_DEGREE_LAT,
            longitude: TOWN_LON,
            elevation,
        }
    }

    fn catalog() -> StationCatalog {
        StationCatalog::new(
            vec![
                station("FAR", 8.0, 520.0),
                station("NEAR", 2.0, 480.0),
                station("HIGH", 5.0, 1100.0),
                station("OUT", 40.0, 500.0),
            ],
            vec![
                Town {
                    postal_code: "3000".to_string(),
                    name: "Testdorf".to_string(),
                    latitude: TOWN_LAT,
                    longitude: TOWN_LON,
                    elevation: 500.0,
                },
                Town {
                    postal_code: "4000".to_string(),
                    name: "Faraway".to_string(),
                    latitude: 46.0,
                    longitude: 7.0,
                    elevation: 500.0,
                },
            ],
        )
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 8, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn window() -> DateWindow {
        DateWindow::new(
            NaiveDate::from_ymd_opt(2023, 8, 24).unwrap(),
            NaiveDate::from_ymd_opt(2023, 8, 26).unwrap(),
        )
    }

    /// FAR saw a storm, NEAR stayed calm, HIGH has no readings in the window.
    fn store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store
            .push("FAR", MeasurementKind::Sustained, at(25, 14), 71.0)
            .push("FAR", MeasurementKind::Sustained, at(25, 15), 66.0)
            .push("FAR", MeasurementKind::Gust, at(25, 14), 121.0)
            .push("NEAR", MeasurementKind::Sustained, at(25, 14), 38.0)
            .push("NEAR", MeasurementKind::Gust, at(25, 14), 61.0)
            .push("NEAR", MeasurementKind::Gust, at(25, 14), 61.0)
            .push("HIGH", MeasurementKind::Sustained, at(2, 10), 90.0)
            .insert_table("HIGH", MeasurementKind::Gust);
        store
    }

    fn checker(store: MemoryStore) -> WindChecker {
        WindChecker::builder()
            .catalog(catalog())
            .store(Arc::new(store))
            .build()
    }

    #[tokio::test]
    async fn test_check_postal_code_local_threshold_not_met() -> Result<(), WindCheckError> {
        let assessment = checker(store())
            .check()
            .postal_code("3000")
            .window(window())
            .call()
            .await?;

        let verdict = &assessment.verdict;
        assert_eq!(verdict.outcome, Outcome::Insufficient);
        assert_eq!(verdict.reason, Reason::LocalThresholdNotMet);
        assert!(verdict.region_exceeded);
        assert!(!verdict.local_exceeded);
        assert_eq!(verdict.evidence.region_max_sustained, 71.0);
        assert_eq!(verdict.evidence.region_max_gust, 121.0);
        assert_eq!(verdict.evidence.closest_station, "NEAR");

        let abbreviations: Vec<&str> = assessment
            .summaries
            .iter()
            .map(|s| s.abbreviation())
            .collect();
        assert_eq!(abbreviations, vec!["FAR", "NEAR", "HIGH"]);

        let by_distance: Vec<&str> = assessment
            .summaries_by_distance()
            .iter()
            .map(|s| s.abbreviation())
            .collect();
        assert_eq!(by_distance, vec!["NEAR", "HIGH", "FAR"]);

        // The duplicated NEAR gust reading is reported once.
        assert_eq!(assessment.observations_for("NEAR").count(), 2);
        assert_eq!(assessment.observations.len(), 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_check_location_criteria_met_when_closest_is_stormy() -> Result<(), WindCheckError> {
        let mut store = store();
        store.push("NEAR", MeasurementKind::Sustained, at(26, 2), 64.0);

        let location = Location::new(TOWN_LAT, TOWN_LON, 500.0);
        let assessment = checker(store)
            .check_location()
            .location(location)
            .window(window())
            .call()
            .await?;

        assert_eq!(assessment.verdict.outcome, Outcome::Sufficient);
        assert_eq!(assessment.verdict.reason, Reason::CriteriaMet);
        assert_eq!(assessment.verdict.evidence.closest_max_sustained, Some(64.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_check_no_stations_in_range() {
        let err = checker(store())
            .check()
            .postal_code("4000")
            .window(window())
            .call()
            .await
            .unwrap_err();
        assert!(err.is_no_stations_in_range());
    }

    #[tokio::test]
    async fn test_check_unknown_station_schema() {
        let mut store = MemoryStore::new();
        store
            .push("FAR", MeasurementKind::Sustained, at(25, 14), 71.0)
            .push("FAR", MeasurementKind::Gust, at(25, 14), 121.0);

        let err = checker(store)
            .check()
            .postal_code("3000")
            .window(window())
            .call()
            .await
            .unwrap_err();
        assert!(err.is_unknown_station_schema());
        assert!(matches!(
            err,
            WindCheckError::Measurement(MeasurementError::UnknownStationSchema { ref abbreviation, .. })
                if abbreviation == "NEAR"
        ));
    }

    #[tokio::test]
    async fn test_check_insufficient_data() {
        let mut store = MemoryStore::new();
        for abbreviation in ["FAR", "NEAR", "HIGH"] {
            for kind in MeasurementKind::ALL {
                store.insert_table(abbreviation, kind);
            }
        }

        let err = checker(store)
            .check()
            .postal_code("3000")
            .window(window())
            .call()
            .await
            .unwrap_err();
        assert!(err.is_insufficient_data());
        assert!(matches!(
            err,
            WindCheckError::Verdict(VerdictError::InsufficientData { stations: 3 })
        ));
    }

    #[tokio::test]
    async fn test_check_request_validates_first() {
        let request = CheckRequest::parse("26.08.2023", "24.08.2023", "3000").unwrap();
        let today = NaiveDate::from_ymd_opt(2023, 9, 1).unwrap();

        let err = checker(store())
            .check_request(&request, &RequestPolicy::default(), today)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WindCheckError::InvalidRequest(RequestError::EndBeforeStart { .. })
        ));
    }

    #[tokio::test]
    async fn test_check_request_runs_pipeline() -> Result<(), WindCheckError> {
        let request = CheckRequest::parse("24.08.2023", "26.08.2023", "3000")?.with_place("Testdorf");
        let today = NaiveDate::from_ymd_opt(2023, 9, 1).unwrap();

        let assessment = checker(store())
            .check_request(&request, &RequestPolicy::default(), today)
            .await?;
        assert_eq!(assessment.window, window());
        assert_eq!(assessment.verdict.reason, Reason::LocalThresholdNotMet);
        Ok(())
    }

    #[tokio::test]
    async fn test_check_unknown_postal_code() {
        let err = checker(store())
            .check()
            .postal_code("9999")
            .window(window())
            .call()
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WindCheckError::Station(StationError::UnknownPostalCode(_))
        ));
    }

    #[test]
    fn test_builder_defaults() {
        let checker = checker(MemoryStore::new());
        assert_eq!(checker.search_area(), &SearchArea::default());
        assert_eq!(checker.thresholds(), &Thresholds::default());
        assert_eq!(checker.catalog().stations.len(), 4);
    }

    #[tokio::test]
    async fn test_with_data_dir() -> Result<(), WindCheckError> {
        let dir = tempfile::tempdir().unwrap();
        let measurements = dir.path().join("measurements");
        std::fs::create_dir(&measurements).unwrap();
        std::fs::write(
            dir.path().join("catalog.json"),
            serde_json::to_vec(&catalog()).unwrap(),
        )
        .unwrap();

        let tables: [(&str, &str); 6] = [
            ("FAR_wind_10min", "2023-08-25 14:00:00,44.0\n2023-08-25 14:10:00,52.5\n"),
            ("FAR_wind_1s", "2023-08-25 14:03:00,88.0\n"),
            ("NEAR_wind_10min", "2023-08-24 09:00:00,20.0\n"),
            ("NEAR_wind_1s", "2023-08-24 09:01:00,35.0\n2023-08-27 00:00:00,150.0\n"),
            ("HIGH_wind_10min", ""),
            ("HIGH_wind_1s", ""),
        ];
        for (table, rows) in tables {
            std::fs::write(
                measurements.join(format!("{}.csv", table)),
                format!("timestamp,speed\n{}", rows),
            )
            .unwrap();
        }

        let checker = WindChecker::with_data_dir(dir.path().to_path_buf()).await?;
        let assessment = checker
            .check()
            .postal_code("3000")
            .window(window())
            .call()
            .await?;

        assert_eq!(assessment.verdict.reason, Reason::RegionThresholdNotMet);
        assert_eq!(assessment.verdict.evidence.region_max_sustained, 52.5);
        assert_eq!(assessment.verdict.evidence.region_max_gust, 88.0);
        let high = &assessment.summaries[2];
        assert_eq!(high.abbreviation(), "HIGH");
        assert_eq!(high.max_sustained, None);
        assert_eq!(high.max_gust, None);
        Ok(())
    }
}
