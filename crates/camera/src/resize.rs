use foundation::easing::Easing;
use serde::{Deserialize, Serialize};

/// Where a container-size change was observed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeSource {
    Window,
    Orientation,
    Container,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSize {
    pub width: u32,
    pub height: u32,
}

impl ContainerSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn min_side(self) -> u32 {
        self.width.min(self.height)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ResizeConfig {
    pub base_size_px: f64,
    pub base_zoom: f64,
    /// Zoom changes at or below this are skipped.
    pub threshold: f64,
    pub duration_ms: u64,
    pub easing: Easing,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            base_size_px: 1280.0,
            base_zoom: 2.9,
            threshold: 0.05,
            duration_ms: 400,
            easing: Easing::EaseInOutCubic,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ResizeDecision {
    /// Sub-threshold change or a collapsed container; leave the camera alone.
    Skip { zoom: f64 },
    Apply { zoom: f64 },
}

/// Maps container pixels to a globe zoom with a fixed linear ratio.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ResizeResponder {
    config: ResizeConfig,
}

impl ResizeResponder {
    pub fn new(config: ResizeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResizeConfig {
        &self.config
    }

    /// `base_zoom × min(w, h) / base_size`, rounded to two decimals.
    pub fn zoom_for(&self, size: ContainerSize) -> f64 {
        let raw = self.config.base_zoom * (f64::from(size.min_side()) / self.config.base_size_px);
        (raw * 100.0).round() / 100.0
    }

    pub fn evaluate(&self, current_zoom: f64, size: ContainerSize) -> ResizeDecision {
        // A hidden or collapsed container reports zero; never zoom to nothing.
        if size.min_side() == 0 {
            return ResizeDecision::Skip { zoom: current_zoom };
        }
        let zoom = self.zoom_for(size);
        // Zooms carry two decimals; compare in hundredths so a delta of
        // exactly the threshold stays a skip.
        let delta = ((current_zoom - zoom).abs() * 100.0).round();
        if delta > (self.config.threshold * 100.0).round() {
            ResizeDecision::Apply { zoom }
        } else {
            ResizeDecision::Skip { zoom }
        }
    }
}
