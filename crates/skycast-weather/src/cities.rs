//! Offline city directory used to pick comparison cities by name.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::{Location, WeatherError};

const MIN_QUERY_LEN: usize = 3;
const MAX_RESULTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: u64,
    pub name: String,
    pub country: String,
    pub coordinates: Coordinates,
}

impl City {
    pub fn location(&self) -> Location {
        Location::named(self.coordinates.lat, self.coordinates.lon, self.name.clone())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CityDirectory {
    cities: Vec<City>,
}

impl CityDirectory {
    /// Parse a `{ "cities": [...] }` document.
    pub fn from_json(json: &str) -> Result<Self, WeatherError> {
        serde_json::from_str(json).map_err(|e| WeatherError::CityData(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, WeatherError> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| WeatherError::CityDataUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
        let directory = Self::from_json(&contents)?;
        tracing::info!(
            "Loaded {} cities from {}",
            directory.cities.len(),
            path.display()
        );
        Ok(directory)
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Case-insensitive substring search over city names.
    ///
    /// Queries shorter than three characters return nothing; at most five
    /// matches are returned in directory order.
    pub fn search(&self, query: &str) -> Vec<&City> {
        let query = query.trim().to_lowercase();
        if query.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }

        self.cities
            .iter()
            .filter(|city| city.name.to_lowercase().contains(&query))
            .take(MAX_RESULTS)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIRECTORY: &str = r#"{
        "cities": [
            { "id": 1, "name": "London", "country": "GB",
              "coordinates": { "lat": 51.5074, "lon": -0.1278 } },
            { "id": 2, "name": "Londonderry", "country": "GB",
              "coordinates": { "lat": 54.9966, "lon": -7.3086 } },
            { "id": 3, "name": "New London", "country": "US",
              "coordinates": { "lat": 41.3557, "lon": -72.0995 } },
            { "id": 4, "name": "Dhaka", "country": "BD",
              "coordinates": { "lat": 23.7772, "lon": 90.3995 } },
            { "id": 5, "name": "London", "country": "CA",
              "coordinates": { "lat": 42.9849, "lon": -81.2453 } },
            { "id": 6, "name": "East London", "country": "ZA",
              "coordinates": { "lat": -33.0153, "lon": 27.9116 } },
            { "id": 7, "name": "London Colney", "country": "GB",
              "coordinates": { "lat": 51.7260, "lon": -0.3000 } }
        ]
    }"#;

    #[test]
    fn test_search_is_case_insensitive() {
        let directory = CityDirectory::from_json(DIRECTORY).unwrap();
        let results = directory.search("dHaK");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].country, "BD");
    }

    #[test]
    fn test_search_requires_three_characters() {
        let directory = CityDirectory::from_json(DIRECTORY).unwrap();
        assert!(directory.search("Lo").is_empty());
        assert!(directory.search("  ").is_empty());
        assert!(!directory.search("Lon").is_empty());
    }

    #[test]
    fn test_search_limits_results() {
        let directory = CityDirectory::from_json(DIRECTORY).unwrap();
        let results = directory.search("london");
        assert_eq!(results.len(), 5);
        assert_eq!(results[0].id, 1);
        assert!(results.iter().all(|c| c.id != 7));
    }

    #[test]
    fn test_city_location() {
        let directory = CityDirectory::from_json(DIRECTORY).unwrap();
        let location = directory.search("Dhaka")[0].location();
        assert_eq!(location.city_name.as_deref(), Some("Dhaka"));
        assert!((location.latitude - 23.7772).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_document() {
        assert!(matches!(
            CityDirectory::from_json("{ \"towns\": [] }"),
            Err(WeatherError::CityData(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cityData.json");
        std::fs::write(&path, DIRECTORY).unwrap();

        let directory = CityDirectory::load(&path).unwrap();
        assert!(!directory.is_empty());
        assert_eq!(directory.search("london").len(), 5);
    }

    #[test]
    fn test_load_missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        match CityDirectory::load(&path) {
            Err(WeatherError::CityDataUnreadable { path: reported, source }) => {
                assert_eq!(reported, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected unreadable city data, got {:?}", other),
        }
    }
}
