use serde::{Deserialize, Serialize};

/// Kiosk clock reading in milliseconds since start-up.
///
/// Integer milliseconds keep timer ordering exact and replayable.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Time(pub u64);

impl Time {
    pub const ZERO: Time = Time(0);

    pub fn after(self, ms: u64) -> Self {
        Time(self.0.saturating_add(ms))
    }

    pub fn since(self, earlier: Time) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Half-open interval `[start, end)` on the kiosk clock.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimeSpan {
    pub start: Time,
    pub end: Time,
}

impl TimeSpan {
    pub fn starting_at(start: Time, duration_ms: u64) -> Self {
        Self {
            start,
            end: start.after(duration_ms),
        }
    }

    pub fn duration(&self) -> u64 {
        self.end.since(self.start)
    }

    /// Linear progress of `now` through the span, clamped to `[0, 1]`.
    ///
    /// Zero-length spans report `1.0` as soon as they start.
    pub fn progress(&self, now: Time) -> f64 {
        let duration = self.duration();
        if duration == 0 {
            return if now >= self.start { 1.0 } else { 0.0 };
        }
        (now.since(self.start) as f64 / duration as f64).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, now: Time) -> bool {
        now >= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::{Time, TimeSpan};

    #[test]
    fn span_progress_is_clamped() {
        let span = TimeSpan::starting_at(Time(1000), 500);
        assert_eq!(span.progress(Time(900)), 0.0);
        assert_eq!(span.progress(Time(1250)), 0.5);
        assert_eq!(span.progress(Time(4000)), 1.0);
        assert!(!span.is_finished(Time(1499)));
        assert!(span.is_finished(Time(1500)));
    }

    #[test]
    fn zero_length_span_completes_immediately() {
        let span = TimeSpan::starting_at(Time(10), 0);
        assert_eq!(span.progress(Time(10)), 1.0);
        assert_eq!(span.progress(Time(9)), 0.0);
    }

    #[test]
    fn time_arithmetic_saturates() {
        assert_eq!(Time(5).since(Time(10)), 0);
        assert_eq!(Time(u64::MAX).after(1), Time(u64::MAX));
        assert_eq!(Time(100).after(20), Time(120));
    }
}
