//! The station catalog: every known measurement station plus the town register
//! used to turn a postal code into a [`Location`].

use crate::stations::error::StationError;
use crate::types::location::Location;
use crate::types::station::Station;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A place registered under a postal code.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Town {
    pub postal_code: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation above sea level in meters.
    pub elevation: f64,
}

impl Town {
    pub fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude, self.elevation)
    }
}

/// Read-only reference data for station selection.
///
/// The order of `stations` is significant: it is the output order of the geo
/// filter and breaks distance ties when picking the closest station.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct StationCatalog {
    pub stations: Vec<Station>,
    #[serde(default)]
    pub towns: Vec<Town>,
}

impl StationCatalog {
    pub fn new(stations: Vec<Station>, towns: Vec<Town>) -> Self {
        Self { stations, towns }
    }

    /// Loads a catalog from a JSON file of the form `{"stations": [...], "towns": [...]}`.
    pub async fn load(path: &Path) -> Result<Self, StationError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| StationError::CatalogRead(path.to_path_buf(), e))?;
        let path_clone = path.to_path_buf();
        let catalog = tokio::task::spawn_blocking(move || {
            serde_json::from_slice::<StationCatalog>(&bytes)
                .map_err(|e| StationError::CatalogParse(path_clone, e))
        })
        .await??;
        info!(
            "Loaded station catalog from {} ({} stations, {} towns)",
            path.display(),
            catalog.stations.len(),
            catalog.towns.len()
        );
        Ok(catalog)
    }

    pub fn station(&self, abbreviation: &str) -> Option<&Station> {
        self.stations
            .iter()
            .find(|station| station.abbreviation == abbreviation)
    }

    /// All place names registered under a postal code, in catalog order.
    pub fn places_for_postal_code(&self, postal_code: &str) -> Vec<&str> {
        self.towns
            .iter()
            .filter(|town| town.postal_code == postal_code)
            .map(|town| town.name.as_str())
            .collect()
    }

    /// Resolves a postal code (and, if it covers several places, a place name) to a location.
    ///
    /// A postal code with a single place resolves without `place`. When several places
    /// share the code and none is given, the candidates are returned in
    /// [`StationError::AmbiguousPostalCode`] so the caller can ask which one is meant.
    pub fn resolve_location(
        &self,
        postal_code: &str,
        place: Option<&str>,
    ) -> Result<Location, StationError> {
        let towns: Vec<&Town> = self
            .towns
            .iter()
            .filter(|town| town.postal_code == postal_code)
            .collect();

        let town = match (towns.as_slice(), place) {
            ([], _) => return Err(StationError::UnknownPostalCode(postal_code.to_string())),
            (_, Some(place)) => towns
                .iter()
                .find(|town| town.name == place)
                .copied()
                .ok_or_else(|| StationError::UnknownPlace {
                    postal_code: postal_code.to_string(),
                    place: place.to_string(),
                })?,
            ([single], None) => *single,
            (many, None) => {
                return Err(StationError::AmbiguousPostalCode {
                    postal_code: postal_code.to_string(),
                    candidates: many.iter().map(|town| town.name.clone()).collect(),
                })
            }
        };

        debug!(
            "Resolved postal code {} to {} ({}, {}, {} m)",
            postal_code, town.name, town.latitude, town.longitude, town.elevation
        );
        Ok(town.location())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn town(postal_code: &str, name: &str, lat: f64, lon: f64, elevation: f64) -> Town {
        Town {
            postal_code: postal_code.to_string(),
            name: name.to_string(),
            latitude: lat,
            longitude: lon,
            elevation,
        }
    }

    fn catalog() -> StationCatalog {
        StationCatalog::new(
            vec![Station {
                name: "Zürich / Fluntern".to_string(),
                abbreviation: "SMA".to_string(),
                latitude: 47.3779,
                longitude: 8.5656,
                elevation: 556.0,
            }],
            vec![
                town("8001", "Zürich", 47.3717, 8.5423, 408.0),
                town("8400", "Winterthur", 47.4991, 8.7291, 439.0),
                town("8706", "Meilen", 47.2695, 8.6434, 425.0),
                town("8706", "Feldmeilen", 47.2793, 8.6257, 420.0),
            ],
        )
    }

    #[test]
    fn test_resolve_single_place_without_name() {
        let location = catalog().resolve_location("8400", None).unwrap();
        assert_eq!(location, Location::new(47.4991, 8.7291, 439.0));
    }

    #[test]
    fn test_resolve_ambiguous_postal_code_lists_candidates() {
        let err = catalog().resolve_location("8706", None).unwrap_err();
        match err {
            StationError::AmbiguousPostalCode { candidates, .. } => {
                assert_eq!(candidates, vec!["Meilen", "Feldmeilen"]);
            }
            other => panic!("Expected AmbiguousPostalCode, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_ambiguous_postal_code_with_place() {
        let location = catalog()
            .resolve_location("8706", Some("Feldmeilen"))
            .unwrap();
        assert_eq!(location.elevation, 420.0);
    }

    #[test]
    fn test_resolve_unknown_postal_code_and_place() {
        assert!(matches!(
            catalog().resolve_location("9999", None),
            Err(StationError::UnknownPostalCode(code)) if code == "9999"
        ));
        assert!(matches!(
            catalog().resolve_location("8400", Some("Zürich")),
            Err(StationError::UnknownPlace { .. })
        ));
    }

    #[test]
    fn test_places_for_postal_code_keeps_catalog_order() {
        assert_eq!(
            catalog().places_for_postal_code("8706"),
            vec!["Meilen", "Feldmeilen"]
        );
        assert!(catalog().places_for_postal_code("1000").is_empty());
    }

    #[tokio::test]
    async fn test_load_catalog_from_json() -> Result<(), StationError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let json = serde_json::to_vec(&catalog()).unwrap();
        std::fs::write(&path, json).unwrap();

        let loaded = StationCatalog::load(&path).await?;
        assert_eq!(loaded, catalog());
        assert_eq!(loaded.station("SMA").map(|s| s.elevation), Some(556.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_load_catalog_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, b"{\"stations\": 12}").unwrap();

        let err = StationCatalog::load(&path).await.unwrap_err();
        assert!(matches!(err, StationError::CatalogParse(p, _) if p == path));
    }
}
