//! Easing curves for camera and marker transitions.
//!
//! Every curve maps `t ∈ [0, 1]` to a progress value with `f(0) = 0` and
//! `f(1) = 1`. `EaseOutBack` overshoots past 1 before settling.

use serde::{Deserialize, Serialize};

/// Overshoot amount for [`Easing::EaseOutBack`].
const BACK_OVERSHOOT: f64 = 1.70158;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    EaseOutCubic,
    EaseInCubic,
    #[default]
    EaseInOutCubic,
    EaseOutBack,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInCubic => t * t * t,
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseOutBack => {
                let c3 = BACK_OVERSHOOT + 1.0;
                let u = t - 1.0;
                1.0 + c3 * u.powi(3) + BACK_OVERSHOOT * u.powi(2)
            }
        }
    }
}

/// Linear interpolation between two scalars.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
