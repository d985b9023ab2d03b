use camera::{ContainerSize, ResizeSource};
use foundation::time::Time;
use tracing::trace;

/// Funnels the three resize sources into one stream for the camera.
///
/// Window events arrive in bursts while a window is dragged, so they are
/// coalesced and delivered once the throttle window closes with the latest
/// size. Orientation and container-observer changes pass straight through.
#[derive(Debug, Default)]
pub struct ResizeFeed {
    throttle_ms: u64,
    pending: Option<(ContainerSize, Time)>,
    last: Option<ContainerSize>,
}

impl ResizeFeed {
    pub fn new(throttle_ms: u64) -> Self {
        Self {
            throttle_ms,
            ..Self::default()
        }
    }

    pub fn last(&self) -> Option<ContainerSize> {
        self.last
    }

    /// Returns the size to forward right away, if any.
    pub fn push(
        &mut self,
        size: ContainerSize,
        source: ResizeSource,
        now: Time,
    ) -> Option<ContainerSize> {
        match source {
            ResizeSource::Window => {
                let due = match self.pending {
                    Some((_, due)) => due,
                    None => now.after(self.throttle_ms),
                };
                self.pending = Some((size, due));
                trace!(width = size.width, height = size.height, "window resize throttled");
                None
            }
            ResizeSource::Orientation | ResizeSource::Container => self.forward(size),
        }
    }

    /// Releases a throttled window size once its window has closed.
    pub fn poll(&mut self, now: Time) -> Option<ContainerSize> {
        match self.pending {
            Some((size, due)) if now >= due => {
                self.pending = None;
                self.forward(size)
            }
            _ => None,
        }
    }

    fn forward(&mut self, size: ContainerSize) -> Option<ContainerSize> {
        if self.last == Some(size) {
            return None;
        }
        self.last = Some(size);
        Some(size)
    }
}
