//! Static city name to coordinate lookup table

use super::GeoLocation;
use crate::errors::DomainError;

/// Built-in cities as `(name, longitude, latitude)`
const BUILTIN_CITIES: &[(&str, f64, f64)] = &[
    ("beijing", 116.4074, 39.9042),
    ("shanghai", 121.4737, 31.2304),
    ("guangzhou", 113.2644, 23.1291),
    ("shenzhen", 114.0579, 22.5431),
    ("chengdu", 104.0659, 30.5728),
    ("hangzhou", 120.1551, 30.2875),
    ("suzhou", 120.5954, 31.2989),
    ("wuhan", 114.3055, 30.5928),
    ("xi'an", 108.9398, 34.3416),
    ("chongqing", 106.5516, 29.5630),
    ("london", -0.1276, 51.5074),
    ("new york", -74.0060, 40.7128),
    ("tokyo", 139.6917, 35.6762),
    ("paris", 2.3522, 48.8566),
    ("sydney", 151.2093, -33.8688),
];

/// Mapping from lowercase city name to coordinates
///
/// Built once at startup and shared read-only. Names keep their insertion
/// order so the list of valid locations is stable.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationTable {
    entries: Vec<(String, GeoLocation)>,
}

impl LocationTable {
    /// Create an empty table
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Create a table holding the built-in cities
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_CITIES
                .iter()
                .map(|&(name, lng, lat)| (name.to_string(), GeoLocation::new_unchecked(lat, lng)))
                .collect(),
        }
    }

    /// Add or replace an entry
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationError` for a blank name and
    /// `DomainError::InvalidCoordinates` for out-of-range coordinates.
    pub fn insert(
        &mut self,
        name: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<(), DomainError> {
        let key = normalize(name);
        if key.is_empty() {
            return Err(DomainError::ValidationError(
                "location name must not be empty".to_string(),
            ));
        }
        let location = GeoLocation::new(latitude, longitude)?;

        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == key) {
            entry.1 = location;
        } else {
            self.entries.push((key, location));
        }
        Ok(())
    }

    /// Look up a location by name (case-insensitive)
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<GeoLocation> {
        let key = normalize(name);
        self.entries
            .iter()
            .find(|(n, _)| *n == key)
            .map(|(_, loc)| *loc)
    }

    /// All known names, in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Number of known locations
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LocationTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
