use camera::{CameraCall, CameraSurface, EaseCommand, CameraPose, RecordingCameraSurface};
use markers::{MarkerCall, MarkerId, MarkerSurface, MarkerVisual, RecordingMarkerSurface};
use serde_json::Value;

use crate::config::MapOptions;
use crate::error::MapError;
use crate::map_session::MapHost;

/// Everything the kiosk drives on the rendering side.
pub trait GlobeHost: MapHost + MarkerSurface + CameraSurface {}

impl<T: MapHost + MarkerSurface + CameraSurface> GlobeHost for T {}

/// In-memory host that records every call.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub maps_created: u32,
    pub maps_destroyed: u32,
    pub fail_next_create: Option<MapError>,
    pub config_properties: Vec<(String, String, Value)>,
    pub markers: RecordingMarkerSurface,
    pub camera: RecordingCameraSurface,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker_calls(&self) -> &[MarkerCall] {
        &self.markers.calls
    }

    pub fn camera_calls(&self) -> &[CameraCall] {
        &self.camera.calls
    }
}

impl MapHost for RecordingHost {
    fn create_map(&mut self, _options: &MapOptions) -> Result<(), MapError> {
        if let Some(err) = self.fail_next_create.take() {
            return Err(err);
        }
        self.maps_created += 1;
        Ok(())
    }

    fn destroy_map(&mut self) {
        self.maps_destroyed += 1;
    }

    fn set_config_property(
        &mut self,
        scope: &str,
        key: &str,
        value: Value,
    ) -> Result<(), MapError> {
        self.config_properties
            .push((scope.to_string(), key.to_string(), value));
        Ok(())
    }
}

impl MarkerSurface for RecordingHost {
    fn attach(&mut self, id: MarkerId, visual: &MarkerVisual) {
        self.markers.attach(id, visual);
    }

    fn update(&mut self, id: MarkerId, visual: &MarkerVisual) {
        self.markers.update(id, visual);
    }

    fn detach(&mut self, id: MarkerId) {
        self.markers.detach(id);
    }
}

impl CameraSurface for RecordingHost {
    fn begin_ease(&mut self, command: &EaseCommand) {
        self.camera.begin_ease(command);
    }

    fn set_pose(&mut self, pose: &CameraPose) {
        self.camera.set_pose(pose);
    }
}
