//! Standalone visualization window backed by winit.
//!
//! The selected scene is rasterized on the CPU every frame and presented
//! through wgpu. Frames are paced by winit redraw requests, which stand in
//! for the browser's `requestAnimationFrame`.
//!
//! ```no_run
//! # use fraudviz::{SceneKind, Viewer};
//! Viewer::builder()
//!     .with_scene(SceneKind::Particles)
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::{fmt, str::FromStr, sync::Arc};

use web_time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    animation::{AnimationScheduler, FrameClock, FrameRequestId},
    error::VizError,
    gpu::{
        present::PresentPass,
        render_context::{PresentOutcome, RenderContext},
    },
    options::Options,
    particles::ParticleField,
    scene::Scene,
    sphere::SphereScene,
    surface::{RasterSurface, SurfaceSize},
};

/// How often the smoothed frame rate is logged.
const FPS_LOG_INTERVAL: Duration = Duration::from_secs(5);

/// Which scene the viewer animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneKind {
    /// The rotating Fibonacci sphere on a fixed-size canvas.
    #[default]
    Sphere,
    /// The ambient particle field filling the window.
    Particles,
}

impl SceneKind {
    /// Size of the raster for a window of `window` pixels.
    #[must_use]
    pub fn raster_size(self, options: &Options, window: SurfaceSize) -> SurfaceSize {
        match self {
            Self::Sphere => SurfaceSize::new(
                options.sphere.canvas_width,
                options.sphere.canvas_height,
            ),
            Self::Particles => window,
        }
    }

    /// Whether the raster follows the window size.
    #[must_use]
    pub fn follows_window(self) -> bool {
        matches!(self, Self::Particles)
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sphere => write!(f, "sphere"),
            Self::Particles => write!(f, "particles"),
        }
    }
}

impl FromStr for SceneKind {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sphere" => Ok(Self::Sphere),
            "particles" => Ok(Self::Particles),
            other => Err(VizError::Viewer(format!(
                "unknown scene '{other}' (expected 'sphere' or 'particles')"
            ))),
        }
    }
}

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    scene: SceneKind,
    options: Option<Options>,
    title: String,
}

impl ViewerBuilder {
    /// Create a builder with sensible defaults (sphere scene, default
    /// options).
    fn new() -> Self {
        Self {
            scene: SceneKind::default(),
            options: None,
            title: "fraudviz".into(),
        }
    }

    /// Choose the scene to animate.
    #[must_use]
    pub fn with_scene(mut self, scene: SceneKind) -> Self {
        self.scene = scene;
        self
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            scene: self.scene,
            options: self.options.unwrap_or_default(),
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A standalone window that animates one scene.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    scene: SceneKind,
    options: Options,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    pub fn run(self) -> Result<(), VizError> {
        let event_loop =
            EventLoop::new().map_err(|e| VizError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut app = ViewerApp::new(self.scene, self.options, self.title);
        event_loop
            .run_app(&mut app)
            .map_err(|e| VizError::Viewer(e.to_string()))
    }
}

// ── Frame clock ──────────────────────────────────────────────────────────

/// [`FrameClock`] over winit redraw requests. One request is outstanding
/// at a time; it fires on the next `RedrawRequested`.
#[derive(Default)]
struct WindowFrameClock {
    window: Option<Arc<Window>>,
    next_id: u64,
    pending: Option<FrameRequestId>,
}

impl WindowFrameClock {
    /// The request due on this redraw, if any.
    fn take_due(&mut self) -> Option<FrameRequestId> {
        self.pending.take()
    }
}

impl FrameClock for WindowFrameClock {
    fn request_frame(&mut self) -> Result<FrameRequestId, VizError> {
        self.next_id += 1;
        let id = FrameRequestId(self.next_id);
        self.pending = Some(id);
        if let Some(window) = &self.window {
            window.request_redraw();
        }
        Ok(id)
    }

    fn cancel_frame(&mut self, id: FrameRequestId) {
        if self.pending == Some(id) {
            self.pending = None;
        }
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

type SceneBuilder = Box<dyn FnMut(SurfaceSize) -> Box<dyn Scene>>;

/// GPU state that only exists once a window does.
struct Presenter {
    context: RenderContext,
    pass: PresentPass,
}

/// Internal winit application handler.
struct ViewerApp {
    kind: SceneKind,
    options: Options,
    title: String,
    presenter: Option<Presenter>,
    clock: WindowFrameClock,
    scheduler: AnimationScheduler<Box<dyn Scene>, SceneBuilder>,
    raster: RasterSurface,
    started: Instant,
    last_fps_log: Instant,
}

impl ViewerApp {
    fn new(kind: SceneKind, options: Options, title: String) -> Self {
        let scene_options = options.clone();
        let build: SceneBuilder = Box::new(move |size| -> Box<dyn Scene> {
            match kind {
                SceneKind::Sphere => {
                    Box::new(SphereScene::from_options(&scene_options, size))
                }
                SceneKind::Particles => {
                    Box::new(ParticleField::from_options(&scene_options, size))
                }
            }
        });
        Self {
            kind,
            options,
            title,
            presenter: None,
            clock: WindowFrameClock::default(),
            scheduler: AnimationScheduler::new(build),
            raster: RasterSurface::new(SurfaceSize::new(0, 0)),
            started: Instant::now(),
            last_fps_log: Instant::now(),
        }
    }

    fn window_attributes(&self, event_loop: &ActiveEventLoop) -> winit::window::WindowAttributes {
        let attrs = Window::default_attributes().with_title(&self.title);
        match self.kind {
            SceneKind::Sphere => {
                // Shown at twice its canvas size; resizing letterboxes.
                let canvas = self.kind.raster_size(&self.options, SurfaceSize::new(0, 0));
                attrs.with_inner_size(winit::dpi::LogicalSize::new(
                    canvas.width * 2,
                    canvas.height * 2,
                ))
            }
            SceneKind::Particles => {
                let monitor = event_loop
                    .primary_monitor()
                    .or_else(|| event_loop.available_monitors().next());
                let Some(mon) = monitor else {
                    return attrs;
                };
                let mon_size = mon.size();
                let scale = mon.scale_factor();
                let logical_w = (f64::from(mon_size.width) / scale * 0.75) as u32;
                let logical_h = (f64::from(mon_size.height) / scale * 0.75) as u32;
                attrs.with_inner_size(winit::dpi::LogicalSize::new(logical_w, logical_h))
            }
        }
    }

    fn timestamp_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    fn resize(&mut self, size: SurfaceSize) {
        let Some(presenter) = &mut self.presenter else {
            return;
        };
        if presenter.context.resize(size) {
            presenter.pass.update_placement(&presenter.context);
        }
        if self.kind.follows_window() && !size.is_empty() {
            self.raster.resize(size);
            self.scheduler.notify_resize(size);
        }
    }

    fn redraw(&mut self) {
        let Some(request) = self.clock.take_due() else {
            return;
        };
        let timestamp = self.timestamp_ms();
        if !self
            .scheduler
            .run_frame(&mut self.clock, request, timestamp, &mut self.raster)
        {
            return;
        }
        let Some(presenter) = &mut self.presenter else {
            return;
        };
        presenter.pass.upload(&presenter.context, &self.raster);
        let pass = &presenter.pass;
        let outcome = presenter
            .context
            .present(|encoder, view| pass.render(encoder, view));
        if outcome != PresentOutcome::Presented {
            log::trace!("frame {} not presented: {outcome:?}", self.scheduler.frames_run());
        }

        if self.last_fps_log.elapsed() >= FPS_LOG_INTERVAL {
            log::debug!(
                "{} frames, {:.1} fps",
                self.scheduler.frames_run(),
                self.scheduler.fps()
            );
            self.last_fps_log = Instant::now();
        }
    }
}

fn surface_size(inner: winit::dpi::PhysicalSize<u32>) -> SurfaceSize {
    SurfaceSize::new(inner.width, inner.height)
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.presenter.is_some() {
            return;
        }

        let window = match event_loop.create_window(self.window_attributes(event_loop)) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let window_size = surface_size(window.inner_size());
        let context = match pollster::block_on(RenderContext::new(window.clone())) {
            Ok(c) => c,
            Err(e) => {
                log::error!("{}", VizError::from(e));
                event_loop.exit();
                return;
            }
        };

        let raster_size = self.kind.raster_size(&self.options, window_size);
        self.raster.resize(raster_size);
        let pass = PresentPass::new(&context, raster_size, self.options.palette.background);

        self.clock.window = Some(window);
        self.presenter = Some(Presenter { context, pass });

        let drawable = (!raster_size.is_empty()).then_some(raster_size);
        if let Err(e) = self.scheduler.activate(&mut self.clock, drawable) {
            log::error!("Failed to start {} scene: {e}", self.kind);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.scheduler.deactivate(&mut self.clock);
                event_loop.exit();
            }
            WindowEvent::Resized(size) => self.resize(surface_size(size)),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(presenter) = &self.presenter {
                    let size = surface_size(presenter.context.window().inner_size());
                    self.resize(size);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => (),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.scheduler.deactivate(&mut self.clock);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_kind_parses_case_insensitively() {
        assert_eq!("Sphere".parse::<SceneKind>().unwrap(), SceneKind::Sphere);
        assert_eq!("particles".parse::<SceneKind>().unwrap(), SceneKind::Particles);
        assert!("cube".parse::<SceneKind>().is_err());
        assert_eq!(SceneKind::Particles.to_string(), "particles");
    }

    #[test]
    fn raster_size_depends_on_the_scene() {
        let options = Options::default();
        let window = SurfaceSize::new(1280, 720);
        assert_eq!(
            SceneKind::Sphere.raster_size(&options, window),
            SurfaceSize::new(320, 320)
        );
        assert_eq!(SceneKind::Particles.raster_size(&options, window), window);
    }

    #[test]
    fn window_clock_keeps_one_request() {
        let mut clock = WindowFrameClock::default();
        let a = clock.request_frame().unwrap();
        let b = clock.request_frame().unwrap();
        clock.cancel_frame(a);
        assert_eq!(clock.take_due(), Some(b));
        assert_eq!(clock.take_due(), None);
        let c = clock.request_frame().unwrap();
        clock.cancel_frame(c);
        assert_eq!(clock.take_due(), None);
    }
}
