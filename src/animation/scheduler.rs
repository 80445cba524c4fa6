//! Self-rescheduling frame loop with deterministic teardown.
//!
//! The scheduler is `Idle` until activated with a drawable surface. While
//! `Running` it holds exactly one outstanding frame request; each fired
//! request advances the scene, draws it, and requests the next frame.
//! Deactivation cancels the outstanding request and drops the scene, so no
//! callback can reach the surface afterwards. Activation is re-entrant.

use crate::animation::clock::{FrameClock, FrameRequestId};
use crate::error::VizError;
use crate::scene::Scene;
use crate::surface::{Surface, SurfaceSize};
use crate::util::frame_timing::FrameTiming;

/// Lifecycle state of an [`AnimationScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No scene, no outstanding frame request.
    Idle,
    /// A scene exists and one frame request is outstanding.
    Running,
}

#[derive(Debug)]
struct Running<S> {
    scene: S,
    pending: FrameRequestId,
}

/// Drives one scene: advance then draw, once per host frame.
///
/// `build` creates a fresh scene for the surface size on every activation;
/// no scene state survives a deactivation.
pub struct AnimationScheduler<S, F> {
    build: F,
    running: Option<Running<S>>,
    frames_run: u64,
    timing: FrameTiming,
}

impl<S, F> AnimationScheduler<S, F>
where
    S: Scene,
    F: FnMut(SurfaceSize) -> S,
{
    /// Idle scheduler that builds scenes with `build`.
    pub fn new(build: F) -> Self {
        Self {
            build,
            running: None,
            frames_run: 0,
            timing: FrameTiming::new(),
        }
    }

    /// Build the scene and request the first frame.
    ///
    /// `surface_size` is `None` when the host has no drawable surface yet;
    /// that is an error and nothing is scheduled. A clock that refuses the
    /// first request leaves the scheduler idle. Activating a running
    /// scheduler does nothing.
    pub fn activate(
        &mut self,
        clock: &mut impl FrameClock,
        surface_size: Option<SurfaceSize>,
    ) -> Result<(), VizError> {
        if self.running.is_some() {
            log::debug!("activate ignored: already running");
            return Ok(());
        }
        let size = surface_size.ok_or(VizError::SurfaceUnavailable)?;
        let scene = (self.build)(size);
        let pending = clock.request_frame()?;
        self.running = Some(Running { scene, pending });
        self.frames_run = 0;
        self.timing.reset();
        log::info!("animation started on {}x{} surface", size.width, size.height);
        Ok(())
    }

    /// Run the frame for a fired request. Returns `false` (and does
    /// nothing) when idle or when `request` is not the outstanding one.
    ///
    /// If the clock refuses the follow-up request the loop cannot continue,
    /// so the scene is dropped and the scheduler returns to `Idle`.
    pub fn run_frame(
        &mut self,
        clock: &mut impl FrameClock,
        request: FrameRequestId,
        timestamp_ms: f64,
        surface: &mut dyn Surface,
    ) -> bool {
        let Some(running) = self.running.as_mut() else {
            log::trace!("frame {request:?} after teardown ignored");
            return false;
        };
        if running.pending != request {
            log::trace!("stale frame {request:?} ignored");
            return false;
        }

        running.scene.advance(timestamp_ms);
        running.scene.draw(surface);
        let next = clock.request_frame();
        if let Ok(id) = &next {
            running.pending = *id;
        }

        self.frames_run += 1;
        self.timing.record_frame(timestamp_ms);
        if let Err(e) = next {
            log::error!("animation stopped after {} frames: {e}", self.frames_run);
            self.running = None;
        }
        true
    }

    /// Forward a host resize to the scene. Ignored while idle.
    pub fn notify_resize(&mut self, size: SurfaceSize) {
        if let Some(running) = self.running.as_mut() {
            running.scene.resize(size);
        }
    }

    /// Cancel the outstanding request and drop the scene.
    pub fn deactivate(&mut self, clock: &mut impl FrameClock) {
        if let Some(running) = self.running.take() {
            clock.cancel_frame(running.pending);
            log::info!("animation stopped after {} frames", self.frames_run);
        }
    }
}

impl<S, F> AnimationScheduler<S, F> {
    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        if self.running.is_some() {
            SchedulerState::Running
        } else {
            SchedulerState::Idle
        }
    }

    /// Whether a scene is active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// The outstanding frame request, if running.
    #[must_use]
    pub fn pending_request(&self) -> Option<FrameRequestId> {
        self.running.as_ref().map(|r| r.pending)
    }

    /// The active scene, if running.
    #[must_use]
    pub fn scene(&self) -> Option<&S> {
        self.running.as_ref().map(|r| &r.scene)
    }

    /// Frames run since the last activation. Frozen once deactivated.
    #[must_use]
    pub fn frames_run(&self) -> u64 {
        self.frames_run
    }

    /// Smoothed frame rate from the host timestamps.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.timing.fps()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::clock::ManualFrameClock;
    use crate::surface::{DrawCommand, RecordingSurface};

    #[derive(Debug, Default)]
    struct CountingScene {
        advanced: Vec<f64>,
        sizes: Vec<SurfaceSize>,
    }

    impl Scene for CountingScene {
        fn advance(&mut self, timestamp_ms: f64) {
            self.advanced.push(timestamp_ms);
        }

        fn draw(&self, surface: &mut dyn Surface) {
            surface.clear();
        }

        fn resize(&mut self, size: SurfaceSize) {
            self.sizes.push(size);
        }
    }

    fn scheduler() -> AnimationScheduler<CountingScene, impl FnMut(SurfaceSize) -> CountingScene> {
        AnimationScheduler::new(|size| CountingScene {
            sizes: vec![size],
            ..CountingScene::default()
        })
    }

    fn pump(
        scheduler: &mut AnimationScheduler<CountingScene, impl FnMut(SurfaceSize) -> CountingScene>,
        clock: &mut ManualFrameClock,
        surface: &mut RecordingSurface,
        frames: usize,
    ) {
        for _ in 0..frames {
            for (id, ts) in clock.tick() {
                let _ = scheduler.run_frame(clock, id, ts, surface);
            }
        }
    }

    const SIZE: SurfaceSize = SurfaceSize::new(320, 320);

    #[test]
    fn runs_one_frame_per_tick() {
        let mut s = scheduler();
        let mut clock = ManualFrameClock::new(16.0);
        let mut surface = RecordingSurface::new(SIZE);
        s.activate(&mut clock, Some(SIZE)).unwrap();
        assert_eq!(s.state(), SchedulerState::Running);

        pump(&mut s, &mut clock, &mut surface, 10);
        assert_eq!(s.frames_run(), 10);
        assert_eq!(s.scene().unwrap().advanced.len(), 10);
        assert_eq!(surface.commands().len(), 10);
        assert_eq!(clock.pending().len(), 1);
        assert!((s.fps() - 60.0).abs() < 5.0);
    }

    #[test]
    fn teardown_freezes_the_frame_counter() {
        let mut s = scheduler();
        let mut clock = ManualFrameClock::default();
        let mut surface = RecordingSurface::new(SIZE);
        s.activate(&mut clock, Some(SIZE)).unwrap();
        pump(&mut s, &mut clock, &mut surface, 5);

        let stale = s.pending_request().unwrap();
        s.deactivate(&mut clock);
        assert_eq!(s.state(), SchedulerState::Idle);
        assert!(clock.pending().is_empty());
        assert!(s.scene().is_none());

        pump(&mut s, &mut clock, &mut surface, 20);
        // Even a request id that leaked out before teardown does nothing.
        assert!(!s.run_frame(&mut clock, stale, 1e6, &mut surface));
        assert_eq!(s.frames_run(), 5);
        assert_eq!(surface.commands().len(), 5);
    }

    #[test]
    fn missing_surface_is_an_error() {
        let mut s = scheduler();
        let mut clock = ManualFrameClock::default();
        let err = s.activate(&mut clock, None).unwrap_err();
        assert!(matches!(err, VizError::SurfaceUnavailable));
        assert!(!s.is_running());
        assert!(clock.pending().is_empty());
    }

    #[test]
    fn stale_requests_are_ignored() {
        let mut s = scheduler();
        let mut clock = ManualFrameClock::default();
        let mut surface = RecordingSurface::new(SIZE);
        s.activate(&mut clock, Some(SIZE)).unwrap();
        let first = s.pending_request().unwrap();
        assert!(s.run_frame(&mut clock, first, 16.0, &mut surface));
        assert!(!s.run_frame(&mut clock, first, 32.0, &mut surface));
        assert_eq!(s.frames_run(), 1);
        assert_ne!(s.pending_request(), Some(first));
    }

    #[test]
    fn resize_reaches_the_scene_only_while_running() {
        let mut s = scheduler();
        let mut clock = ManualFrameClock::default();
        s.notify_resize(SurfaceSize::new(10, 10));
        s.activate(&mut clock, Some(SIZE)).unwrap();
        s.notify_resize(SurfaceSize::new(640, 480));
        assert_eq!(
            s.scene().unwrap().sizes,
            vec![SIZE, SurfaceSize::new(640, 480)]
        );
        s.deactivate(&mut clock);
        s.notify_resize(SurfaceSize::new(1, 1));
        assert!(s.scene().is_none());
    }

    #[test]
    fn reactivation_builds_a_fresh_scene() {
        let mut s = scheduler();
        let mut clock = ManualFrameClock::default();
        let mut surface = RecordingSurface::new(SIZE);
        s.activate(&mut clock, Some(SIZE)).unwrap();
        pump(&mut s, &mut clock, &mut surface, 3);

        // Activating twice keeps a single outstanding request.
        s.activate(&mut clock, Some(SIZE)).unwrap();
        assert_eq!(clock.pending().len(), 1);

        s.deactivate(&mut clock);
        s.deactivate(&mut clock);
        s.activate(&mut clock, Some(SurfaceSize::new(100, 50))).unwrap();
        assert_eq!(s.frames_run(), 0);
        assert!(s.scene().unwrap().advanced.is_empty());
        assert_eq!(s.scene().unwrap().sizes, vec![SurfaceSize::new(100, 50)]);

        pump(&mut s, &mut clock, &mut surface, 2);
        assert_eq!(s.frames_run(), 2);
        assert!(surface.commands().iter().all(|c| *c == DrawCommand::Clear));
    }

    #[test]
    fn refused_first_request_leaves_the_scheduler_idle() {
        let mut s = scheduler();
        let mut clock = ManualFrameClock::default();
        clock.refuse_requests(true);
        let err = s.activate(&mut clock, Some(SIZE)).unwrap_err();
        assert!(matches!(err, VizError::FrameRequest(_)));
        assert_eq!(s.state(), SchedulerState::Idle);
        assert!(s.scene().is_none());
    }

    #[test]
    fn refused_follow_up_request_stops_the_loop() {
        let mut s = scheduler();
        let mut clock = ManualFrameClock::default();
        let mut surface = RecordingSurface::new(SIZE);
        s.activate(&mut clock, Some(SIZE)).unwrap();
        pump(&mut s, &mut clock, &mut surface, 3);

        clock.refuse_requests(true);
        pump(&mut s, &mut clock, &mut surface, 1);
        assert!(!s.is_running());
        assert_eq!(s.pending_request(), None);
        assert_eq!(s.frames_run(), 4);

        clock.refuse_requests(false);
        pump(&mut s, &mut clock, &mut surface, 5);
        assert_eq!(s.frames_run(), 4);
        assert_eq!(surface.commands().len(), 4);
    }
}
