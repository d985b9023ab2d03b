use foundation::ids::Id;
use foundation::math::{GeoError, LngLat};
use foundation::time::Time;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PinId(pub Id);

/// Grouping key for pins: `(city name, country)`, compared exactly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CityKey {
    pub city_name: String,
    pub country: String,
}

impl CityKey {
    pub fn new(city_name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city_name: city_name.into(),
            country: country.into(),
        }
    }
}

impl std::fmt::Display for CityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.city_name, self.country)
    }
}

/// Where a pin goes: labels plus coordinates, as resolved by geocoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinLocation {
    pub city_name: String,
    pub country: String,
    pub state: Option<String>,
    pub country_code: Option<String>,
    pub coordinates: LngLat,
}

impl PinLocation {
    pub fn new(
        city_name: impl Into<String>,
        country: impl Into<String>,
        coordinates: LngLat,
    ) -> Self {
        Self {
            city_name: city_name.into(),
            country: country.into(),
            state: None,
            country_code: None,
            coordinates,
        }
    }

    pub fn with_country_code(mut self, code: impl Into<String>) -> Self {
        self.country_code = Some(code.into());
        self
    }

    pub fn key(&self) -> CityKey {
        CityKey::new(self.city_name.clone(), self.country.clone())
    }
}

/// A point of interest on the globe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    pub id: PinId,
    pub city_name: String,
    pub country: String,
    pub state: Option<String>,
    pub country_code: Option<String>,
    pub coordinates: LngLat,
    pub timestamp: Time,
    pub user_name: String,
    /// Denormalized size of this pin's city group.
    pub total_city_pins: u32,
}

impl Pin {
    pub fn key(&self) -> CityKey {
        CityKey::new(self.city_name.clone(), self.country.clone())
    }

    pub(crate) fn from_location(
        id: PinId,
        location: PinLocation,
        user_name: String,
        timestamp: Time,
    ) -> Self {
        Self {
            id,
            city_name: location.city_name,
            country: location.country,
            state: location.state,
            country_code: location.country_code,
            coordinates: location.coordinates,
            timestamp,
            user_name,
            total_city_pins: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PinError {
    InvalidCoordinates(GeoError),
}

impl std::fmt::Display for PinError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PinError::InvalidCoordinates(err) => write!(f, "invalid pin coordinates: {err}"),
        }
    }
}

impl std::error::Error for PinError {}

impl From<GeoError> for PinError {
    fn from(err: GeoError) -> Self {
        PinError::InvalidCoordinates(err)
    }
}
