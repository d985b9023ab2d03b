use serde::Serialize;
use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::config::MapOptions;
use crate::error::{MapError, Overlay};

/// The map SDK's construction and style hooks.
pub trait MapHost {
    fn create_map(&mut self, options: &MapOptions) -> Result<(), MapError>;
    fn destroy_map(&mut self);
    fn set_config_property(&mut self, scope: &str, key: &str, value: Value) -> Result<(), MapError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SessionStatus {
    Idle,
    Loading,
    Ready,
    Failed(MapErrorView),
}

/// Serializable copy of a [`MapError`] for status snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapErrorView {
    pub detail: String,
    pub message: String,
}

impl From<&MapError> for MapErrorView {
    fn from(err: &MapError) -> Self {
        Self {
            detail: err.detail().to_string(),
            message: err.user_message(),
        }
    }
}

/// Lifecycle of the one map instance: create, load, fail, retry.
#[derive(Debug)]
pub struct MapSession {
    status: SessionStatus,
    last_error: Option<MapError>,
    attempts: u32,
}

impl Default for MapSession {
    fn default() -> Self {
        Self {
            status: SessionStatus::Idle,
            last_error: None,
            attempts: 0,
        }
    }
}

impl MapSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn is_ready(&self) -> bool {
        self.status == SessionStatus::Ready
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn open(&mut self, host: &mut dyn MapHost, options: &MapOptions) -> Result<(), MapError> {
        self.attempts += 1;
        self.status = SessionStatus::Loading;
        info!(attempt = self.attempts, style = %options.style, "creating map");
        host.create_map(options).inspect_err(|err| self.fail(err.clone()))
    }

    /// Style finished loading: apply the basemap config properties.
    /// Failures here are cosmetic and only logged.
    pub fn loaded(&mut self, host: &mut dyn MapHost, options: &MapOptions) {
        let atmosphere = options.atmosphere;
        let props = [
            ("showAtmosphere", json!(atmosphere.show_atmosphere)),
            ("atmosphereIntensity", json!(atmosphere.atmosphere_intensity)),
        ];
        for (key, value) in props {
            if let Err(err) = host.set_config_property("basemap", key, value) {
                warn!(key, error = %err, "could not apply basemap setting");
            }
        }
        self.status = SessionStatus::Ready;
        self.last_error = None;
        info!("map ready");
    }

    pub fn fail(&mut self, err: MapError) {
        error!(error = %err, "map unavailable");
        self.status = SessionStatus::Failed(MapErrorView::from(&err));
        self.last_error = Some(err);
    }

    /// Tears down whatever is left of the map and builds a fresh one.
    pub fn retry(&mut self, host: &mut dyn MapHost, options: &MapOptions) -> Result<(), MapError> {
        info!(attempt = self.attempts + 1, "retrying map creation");
        host.destroy_map();
        self.last_error = None;
        self.open(host, options)
    }

    pub fn overlay(&self) -> Option<Overlay> {
        self.last_error.as_ref().map(Overlay::for_map)
    }
}
