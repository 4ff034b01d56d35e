//! Minimum-interval gate for frame pushes.

/// Caps how often a renderer may push a frame, independent of the tick rate.
///
/// The first call always opens the gate. After that, a call opens it only
/// once `interval_ms` has passed since the last opening; calls in between
/// are no-ops and must not push a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RedrawGate {
    interval_ms: u64,
    last_ms: Option<u64>,
}

impl RedrawGate {
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    #[inline]
    pub const fn interval_ms(&self) -> u64 { self.interval_ms }

    /// Change the interval; the last opening time is kept.
    #[inline]
    pub fn set_interval(
        &mut self,
        interval_ms: u64,
    ) {
        self.interval_ms = interval_ms;
    }

    /// Open the gate if the interval has elapsed, recording `now_ms`.
    pub fn try_open(
        &mut self,
        now_ms: u64,
    ) -> bool {
        let ready = match self.last_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        };
        if ready {
            self.last_ms = Some(now_ms);
        }
        ready
    }

    /// Forget the last opening so the next call opens immediately.
    #[inline]
    pub fn reset(&mut self) { self.last_ms = None; }
}
