use std::env;

use camera::CameraConfig;
use markers::MarkerConfig;
use pins::PinStoreConfig;
use serde::Serialize;

use crate::geocode::GeocodeConfig;
use crate::wizard::WizardConfig;

pub const TOKEN_ENV: &str = "MAPBOX_ACCESS_TOKEN";
pub const TOKEN_PREFIX: &str = "pk.";
pub const DEFAULT_STYLE_URL: &str = "mapbox://styles/mapbox/satellite-streets-v12";
pub const DEFAULT_RESIZE_THROTTLE_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingToken,
    MalformedToken { prefix: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingToken => write!(f, "missing Mapbox token: set {TOKEN_ENV}"),
            ConfigError::MalformedToken { prefix } => {
                write!(f, "token should start with {TOKEN_PREFIX} but starts with {prefix}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq)]
pub struct KioskConfig {
    pub access_token: String,
    pub style_url: String,
    pub pins: PinStoreConfig,
    pub markers: MarkerConfig,
    pub camera: CameraConfig,
    pub geocode: GeocodeConfig,
    pub wizard: WizardConfig,
    pub resize_throttle_ms: u64,
}

impl KioskConfig {
    /// Defaults everywhere except the token.
    pub fn with_token(token: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            access_token: validate_token(Some(token.into()))?,
            style_url: DEFAULT_STYLE_URL.to_string(),
            pins: PinStoreConfig::default(),
            markers: MarkerConfig::default(),
            camera: CameraConfig::default(),
            geocode: GeocodeConfig::default(),
            wizard: WizardConfig::default(),
            resize_throttle_ms: DEFAULT_RESIZE_THROTTLE_MS,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads configuration through `lookup` so tests need not touch the
    /// process environment. Unparseable tunables fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::with_token(lookup(TOKEN_ENV).unwrap_or_default())?;

        if let Some(style) = lookup("KIOSK_STYLE_URL").filter(|s| !s.trim().is_empty()) {
            config.style_url = style;
        }
        config.pins.proximity_threshold_deg =
            env_var_f64(&lookup, "KIOSK_PROXIMITY_DEG", config.pins.proximity_threshold_deg);
        config.pins.visitor_scale =
            env_var_u64(&lookup, "KIOSK_VISITOR_SCALE", config.pins.visitor_scale);
        config.camera.focus_timeout_ms =
            env_var_u64(&lookup, "KIOSK_FOCUS_TIMEOUT_MS", config.camera.focus_timeout_ms);
        config.camera.focus_duration_ms =
            env_var_u64(&lookup, "KIOSK_FOCUS_DURATION_MS", config.camera.focus_duration_ms);
        config.camera.focus_zoom =
            env_var_f64(&lookup, "KIOSK_FOCUS_ZOOM", config.camera.focus_zoom);
        config.camera.auto_rotate =
            env_var_bool(&lookup, "KIOSK_AUTO_ROTATE", config.camera.auto_rotate);
        Ok(config)
    }

    pub fn map_options(&self) -> MapOptions {
        let view = self.camera.default_view;
        MapOptions {
            access_token: self.access_token.clone(),
            style: self.style_url.clone(),
            center: view.center.as_array(),
            zoom: view.zoom,
            pitch: view.pitch,
            bearing: view.bearing,
            projection: "globe".to_string(),
            antialias: true,
            max_zoom: 8.5,
            min_zoom: 0.1,
            max_pitch: 75.0,
            drag_rotate: false,
            drag_pan: false,
            scroll_zoom: false,
            touch_zoom_rotate: false,
            double_click_zoom: false,
            keyboard: false,
            attribution_control: false,
            render_world_copies: false,
            track_resize: true,
            preserve_drawing_buffer: true,
            atmosphere: Atmosphere::default(),
        }
    }
}

/// Options handed to the map SDK's constructor. Kiosk mode disables every
/// interaction; the camera is driven only by the controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    pub access_token: String,
    pub style: String,
    pub center: [f64; 2],
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
    pub projection: String,
    pub antialias: bool,
    pub max_zoom: f64,
    pub min_zoom: f64,
    pub max_pitch: f64,
    pub drag_rotate: bool,
    pub drag_pan: bool,
    pub scroll_zoom: bool,
    pub touch_zoom_rotate: bool,
    pub double_click_zoom: bool,
    pub keyboard: bool,
    pub attribution_control: bool,
    pub render_world_copies: bool,
    pub track_resize: bool,
    pub preserve_drawing_buffer: bool,
    pub atmosphere: Atmosphere,
}

/// Basemap config properties applied once the style has loaded.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Atmosphere {
    pub show_atmosphere: bool,
    pub atmosphere_intensity: f64,
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self {
            show_atmosphere: true,
            atmosphere_intensity: 1.2,
        }
    }
}

fn validate_token(raw: Option<String>) -> Result<String, ConfigError> {
    let token = raw.map(|t| t.trim().to_string()).unwrap_or_default();
    if token.is_empty() {
        return Err(ConfigError::MissingToken);
    }
    if !token.starts_with(TOKEN_PREFIX) {
        let prefix: String = token.chars().take(TOKEN_PREFIX.len()).collect();
        return Err(ConfigError::MalformedToken { prefix });
    }
    Ok(token)
}

// Every numeric tunable is a positive quantity; anything else keeps the default.
fn env_var_f64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: f64) -> f64 {
    lookup(key)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(default)
}

fn env_var_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

fn env_var_bool(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        _ => default,
    }
}
