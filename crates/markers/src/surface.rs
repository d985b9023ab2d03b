use crate::marker::{MarkerId, MarkerVisual};

/// The map's marker primitives.
///
/// `attach` is called once per marker, `update` for every animated frame or
/// label change, and `detach` once when the marker leaves the map.
pub trait MarkerSurface {
    fn attach(&mut self, id: MarkerId, visual: &MarkerVisual);
    fn update(&mut self, id: MarkerId, visual: &MarkerVisual);
    fn detach(&mut self, id: MarkerId);
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkerCall {
    Attach(MarkerId, MarkerVisual),
    Update(MarkerId, MarkerVisual),
    Detach(MarkerId),
}

/// Surface that records every call; used by hosts without a map and by tests.
#[derive(Debug, Default)]
pub struct RecordingMarkerSurface {
    pub calls: Vec<MarkerCall>,
}

impl RecordingMarkerSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<MarkerCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn attached(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, MarkerCall::Attach(..)))
            .count()
    }

    pub fn detached(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, MarkerCall::Detach(..)))
            .count()
    }
}

impl MarkerSurface for RecordingMarkerSurface {
    fn attach(&mut self, id: MarkerId, visual: &MarkerVisual) {
        self.calls.push(MarkerCall::Attach(id, visual.clone()));
    }

    fn update(&mut self, id: MarkerId, visual: &MarkerVisual) {
        self.calls.push(MarkerCall::Update(id, visual.clone()));
    }

    fn detach(&mut self, id: MarkerId) {
        self.calls.push(MarkerCall::Detach(id));
    }
}
