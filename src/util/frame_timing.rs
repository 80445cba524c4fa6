//! Frame-rate bookkeeping for the animation loop.

/// Smoothed frame rate derived from host frame timestamps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    /// Timestamp of the previous frame in milliseconds.
    last_timestamp_ms: Option<f64>,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f32,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTiming {
    /// Create a timer that assumes 60 FPS until frames arrive.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_timestamp_ms: None,
            smoothed_fps: 60.0,
            smoothing: 0.05, // 5% new value, 95% old value
        }
    }

    /// Record a frame delivered at `timestamp_ms`. Non-increasing
    /// timestamps update the reference but not the average.
    pub fn record_frame(&mut self, timestamp_ms: f64) {
        let previous = self.last_timestamp_ms.replace(timestamp_ms);
        let Some(previous) = previous else {
            return;
        };
        let frame_time = ((timestamp_ms - previous) / 1000.0) as f32;
        if frame_time > 0.0 {
            let instant_fps = 1.0 / frame_time;
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + instant_fps * self.smoothing;
        }
    }

    /// Forget the previous timestamp, e.g. after the loop was paused.
    pub fn reset(&mut self) {
        self.last_timestamp_ms = None;
    }

    /// Get the current FPS (smoothed)
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_to_steady_rate() {
        let mut timing = FrameTiming::new();
        for frame in 0..400 {
            timing.record_frame(f64::from(frame) * 10.0);
        }
        assert!((timing.fps() - 100.0).abs() < 0.5, "fps = {}", timing.fps());
    }

    #[test]
    fn first_frame_and_stalls_keep_the_estimate() {
        let mut timing = FrameTiming::new();
        timing.record_frame(500.0);
        assert_eq!(timing.fps(), 60.0);
        timing.record_frame(500.0);
        assert_eq!(timing.fps(), 60.0);
    }

    #[test]
    fn reset_skips_the_pause_gap() {
        let mut timing = FrameTiming::new();
        timing.record_frame(0.0);
        timing.reset();
        timing.record_frame(60_000.0);
        assert_eq!(timing.fps(), 60.0);
    }
}
