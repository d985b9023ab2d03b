use foundation::time::Time;

/// Default frame period: 16 ms, roughly 60 fps.
pub const DEFAULT_FRAME_MS: u64 = 16;

/// Deterministic frame metadata.
///
/// This is the kiosk's only timebase. Hosts feed frames in order; every
/// animation and timer reads `now` from the frame rather than a wall clock,
/// so whole sessions can be replayed in tests.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Fixed frame period (milliseconds).
    pub dt_ms: u64,
    /// Kiosk time at the start of the frame.
    pub now: Time,
}

impl Frame {
    pub fn new(index: u64, dt_ms: u64) -> Self {
        Self {
            index,
            dt_ms,
            now: Time(index * dt_ms),
        }
    }

    pub fn with_fps(index: u64, fps: u32) -> Self {
        Self::new(index, 1000 / u64::from(fps.max(1)))
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1, self.dt_ms)
    }
}
