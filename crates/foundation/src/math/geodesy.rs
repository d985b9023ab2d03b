use serde::{Deserialize, Serialize};

use super::{lerp_longitude, normalize_longitude, shortest_longitude_delta};

/// A WGS84 longitude/latitude pair in degrees.
///
/// Invariant: `lng ∈ [-180, 180]`, `lat ∈ [-90, 90]`. Construct through
/// [`LngLat::new`] when the input is untrusted.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GeoError {
    LongitudeOutOfRange(f64),
    LatitudeOutOfRange(f64),
}

impl std::fmt::Display for GeoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoError::LongitudeOutOfRange(v) => write!(f, "longitude {v} outside [-180, 180]"),
            GeoError::LatitudeOutOfRange(v) => write!(f, "latitude {v} outside [-90, 90]"),
        }
    }
}

impl std::error::Error for GeoError {}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Result<Self, GeoError> {
        if !(-180.0..=180.0).contains(&lng) {
            return Err(GeoError::LongitudeOutOfRange(lng));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::LatitudeOutOfRange(lat));
        }
        Ok(Self { lng, lat })
    }

    /// Builds a coordinate from values that may have drifted out of range,
    /// wrapping longitude and clamping latitude.
    pub fn wrapped(lng: f64, lat: f64) -> Self {
        Self {
            lng: normalize_longitude(lng),
            lat: lat.clamp(-90.0, 90.0),
        }
    }

    pub fn as_array(self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    /// Planar distance in degrees, taking the short way around in longitude.
    pub fn degree_distance(self, other: Self) -> f64 {
        let dlng = shortest_longitude_delta(self.lng, other.lng);
        let dlat = other.lat - self.lat;
        (dlng * dlng + dlat * dlat).sqrt()
    }

    /// Largest per-axis difference in degrees (longitude wrap-aware).
    pub fn max_axis_delta(self, other: Self) -> f64 {
        shortest_longitude_delta(self.lng, other.lng)
            .abs()
            .max((other.lat - self.lat).abs())
    }

    /// Interpolates toward `other`, crossing the antimeridian when shorter.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            lng: lerp_longitude(self.lng, other.lng, t),
            lat: self.lat + (other.lat - self.lat) * t,
        }
    }
}
