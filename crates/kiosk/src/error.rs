use pins::PinError;
use serde::Serialize;

use crate::config::ConfigError;

/// Failures reported by the map SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// The constructor threw.
    Creation(String),
    /// The map emitted an error event after construction.
    Load(String),
}

impl MapError {
    pub fn detail(&self) -> &str {
        match self {
            MapError::Creation(msg) | MapError::Load(msg) => msg,
        }
    }

    /// Text shown on the retry overlay.
    pub fn user_message(&self) -> String {
        if self.detail().to_ascii_lowercase().contains("token") {
            return "Invalid Mapbox token. Please check your token.".to_string();
        }
        match self {
            MapError::Creation(msg) => format!("Failed to create map: {msg}"),
            MapError::Load(msg) => format!("Map error: {msg}"),
        }
    }
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::Creation(msg) => write!(f, "map creation failed: {msg}"),
            MapError::Load(msg) => write!(f, "map failed to load: {msg}"),
        }
    }
}

impl std::error::Error for MapError {}

#[derive(Debug, Clone, PartialEq)]
pub enum KioskError {
    Config(ConfigError),
    Map(MapError),
    Pin(PinError),
}

impl std::fmt::Display for KioskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KioskError::Config(err) => write!(f, "configuration error: {err}"),
            KioskError::Map(err) => write!(f, "{err}"),
            KioskError::Pin(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for KioskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KioskError::Config(err) => Some(err),
            KioskError::Map(err) => Some(err),
            KioskError::Pin(err) => Some(err),
        }
    }
}

impl From<ConfigError> for KioskError {
    fn from(err: ConfigError) -> Self {
        KioskError::Config(err)
    }
}

impl From<MapError> for KioskError {
    fn from(err: MapError) -> Self {
        KioskError::Map(err)
    }
}

impl From<PinError> for KioskError {
    fn from(err: PinError) -> Self {
        KioskError::Pin(err)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum OverlayKind {
    /// Nothing to do but fix the deployment.
    Fatal,
    /// Offers a retry button that recreates the map.
    Retryable,
}

/// Full-screen message covering the globe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overlay {
    pub kind: OverlayKind,
    pub title: String,
    pub message: String,
}

impl Overlay {
    pub fn for_config(err: &ConfigError) -> Self {
        let (title, message) = match err {
            ConfigError::MissingToken => (
                "Missing Mapbox Token",
                format!("Add {} to the kiosk environment", crate::config::TOKEN_ENV),
            ),
            ConfigError::MalformedToken { .. } => ("Invalid Mapbox Token", err.to_string()),
        };
        Self {
            kind: OverlayKind::Fatal,
            title: title.to_string(),
            message,
        }
    }

    pub fn for_map(err: &MapError) -> Self {
        Self {
            kind: OverlayKind::Retryable,
            title: "Map unavailable".to_string(),
            message: err.user_message(),
        }
    }
}
