use crate::pose::CameraPose;
use crate::tween::EaseCommand;

/// The map's camera.
///
/// `begin_ease` is issued once per eased move; `set_pose` carries every
/// frame's sampled pose, rotation ticks included.
pub trait CameraSurface {
    fn begin_ease(&mut self, command: &EaseCommand);
    fn set_pose(&mut self, pose: &CameraPose);
}

#[derive(Debug, Clone, PartialEq)]
pub enum CameraCall {
    BeginEase(EaseCommand),
    SetPose(CameraPose),
}

#[derive(Debug, Default)]
pub struct RecordingCameraSurface {
    pub calls: Vec<CameraCall>,
}

impl RecordingCameraSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eases(&self) -> Vec<EaseCommand> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                CameraCall::BeginEase(cmd) => Some(*cmd),
                CameraCall::SetPose(_) => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl CameraSurface for RecordingCameraSurface {
    fn begin_ease(&mut self, command: &EaseCommand) {
        self.calls.push(CameraCall::BeginEase(*command));
    }

    fn set_pose(&mut self, pose: &CameraPose) {
        self.calls.push(CameraCall::SetPose(*pose));
    }
}
