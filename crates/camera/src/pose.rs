use foundation::math::LngLat;
use serde::{Deserialize, Serialize};

/// Camera framing as the map SDK understands it.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub center: LngLat,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
}

impl CameraPose {
    /// Whole-globe attract view.
    pub const DEFAULT_VIEW: CameraPose = CameraPose {
        center: LngLat { lng: 0.0, lat: 0.0 },
        zoom: 1.8,
        pitch: 0.0,
        bearing: 0.0,
    };

    pub fn with_center(self, center: LngLat) -> Self {
        Self { center, ..self }
    }

    pub fn with_zoom(self, zoom: f64) -> Self {
        Self { zoom, ..self }
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::DEFAULT_VIEW
    }
}
