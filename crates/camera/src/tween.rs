use foundation::easing::{Easing, lerp};
use foundation::time::{Time, TimeSpan};
use serde::Serialize;

use crate::pose::CameraPose;

/// Why a camera ease is running.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum EasePurpose {
    Focus,
    ZoomOut,
    ResizeCorrection,
}

impl EasePurpose {
    pub fn metric(self) -> &'static str {
        match self {
            EasePurpose::Focus => "camera.ease.focus",
            EasePurpose::ZoomOut => "camera.ease.zoom_out",
            EasePurpose::ResizeCorrection => "camera.ease.resize",
        }
    }
}

/// One eased camera move, as handed to the SDK's `easeTo`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EaseCommand {
    pub target: CameraPose,
    pub duration_ms: u64,
    pub easing: Easing,
    pub purpose: EasePurpose,
}

/// Time-parameterized interpolation between two poses.
///
/// Longitude takes the short way across the antimeridian.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraTween {
    pub from: CameraPose,
    pub to: CameraPose,
    pub span: TimeSpan,
    pub easing: Easing,
}

impl CameraTween {
    pub fn start(from: CameraPose, command: &EaseCommand, now: Time) -> Self {
        Self {
            from,
            to: command.target,
            span: TimeSpan::starting_at(now, command.duration_ms),
            easing: command.easing,
        }
    }

    pub fn sample(&self, now: Time) -> CameraPose {
        if self.is_finished(now) {
            return self.to;
        }
        let t = self.easing.apply(self.span.progress(now));
        CameraPose {
            center: self.from.center.lerp(self.to.center, t),
            zoom: lerp(self.from.zoom, self.to.zoom, t),
            pitch: lerp(self.from.pitch, self.to.pitch, t),
            bearing: lerp(self.from.bearing, self.to.bearing, t),
        }
    }

    pub fn is_finished(&self, now: Time) -> bool {
        self.span.is_finished(now)
    }
}
