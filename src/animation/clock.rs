//! Host frame-clock boundary.
//!
//! The host (a browser's `requestAnimationFrame`, a winit event loop, or a
//! test) hands out one callback per display refresh. Scenes never see the
//! clock directly; the scheduler requests exactly one frame at a time.

use crate::error::VizError;

/// Handle for one outstanding frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameRequestId(pub u64);

/// A host that delivers frame callbacks on request.
pub trait FrameClock {
    /// Ask for one callback at the next display refresh.
    ///
    /// # Errors
    ///
    /// Fails when the host refuses the request; no callback will fire.
    fn request_frame(&mut self) -> Result<FrameRequestId, VizError>;

    /// Withdraw a request. Cancelling one that already fired or was never
    /// issued is a no-op.
    fn cancel_frame(&mut self, id: FrameRequestId);
}

/// Deterministic clock advancing by a fixed interval per [`tick`].
///
/// [`tick`]: ManualFrameClock::tick
#[derive(Debug, Clone)]
pub struct ManualFrameClock {
    now_ms: f64,
    interval_ms: f64,
    next_id: u64,
    pending: Vec<FrameRequestId>,
    refuse_requests: bool,
}

impl Default for ManualFrameClock {
    /// A 60 Hz clock.
    fn default() -> Self {
        Self::new(1000.0 / 60.0)
    }
}

impl ManualFrameClock {
    /// Clock starting at time zero that advances `interval_ms` per tick.
    #[must_use]
    pub fn new(interval_ms: f64) -> Self {
        Self {
            now_ms: 0.0,
            interval_ms,
            next_id: 0,
            pending: Vec::new(),
            refuse_requests: false,
        }
    }

    /// Make later [`request_frame`](FrameClock::request_frame) calls fail,
    /// as a host without a frame source would.
    pub fn refuse_requests(&mut self, refuse: bool) {
        self.refuse_requests = refuse;
    }

    /// Advance time by one interval and fire every outstanding request,
    /// oldest first, with the new timestamp.
    pub fn tick(&mut self) -> Vec<(FrameRequestId, f64)> {
        self.now_ms += self.interval_ms;
        let now = self.now_ms;
        self.pending.drain(..).map(|id| (id, now)).collect()
    }

    /// Current time in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Requests that will fire on the next tick.
    #[must_use]
    pub fn pending(&self) -> &[FrameRequestId] {
        &self.pending
    }
}

impl FrameClock for ManualFrameClock {
    fn request_frame(&mut self) -> Result<FrameRequestId, VizError> {
        if self.refuse_requests {
            return Err(VizError::FrameRequest("manual clock refused".into()));
        }
        self.next_id += 1;
        let id = FrameRequestId(self.next_id);
        self.pending.push(id);
        Ok(id)
    }

    fn cancel_frame(&mut self, id: FrameRequestId) {
        self.pending.retain(|pending| *pending != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_fire_once_with_the_tick_time() {
        let mut clock = ManualFrameClock::new(10.0);
        let a = clock.request_frame().unwrap();
        let b = clock.request_frame().unwrap();
        assert_ne!(a, b);
        assert_eq!(clock.tick(), vec![(a, 10.0), (b, 10.0)]);
        assert!(clock.tick().is_empty());
        assert_eq!(clock.now_ms(), 20.0);
    }

    #[test]
    fn cancelled_requests_never_fire() {
        let mut clock = ManualFrameClock::default();
        let a = clock.request_frame().unwrap();
        let b = clock.request_frame().unwrap();
        clock.cancel_frame(a);
        clock.cancel_frame(FrameRequestId(999));
        assert_eq!(clock.pending(), &[b]);
        let fired: Vec<FrameRequestId> = clock.tick().into_iter().map(|(id, _)| id).collect();
        assert_eq!(fired, vec![b]);
    }

    #[test]
    fn refused_requests_schedule_nothing() {
        let mut clock = ManualFrameClock::default();
        clock.refuse_requests(true);
        assert!(matches!(
            clock.request_frame(),
            Err(VizError::FrameRequest(_))
        ));
        assert!(clock.pending().is_empty());
        clock.refuse_requests(false);
        assert!(clock.request_frame().is_ok());
    }
}
