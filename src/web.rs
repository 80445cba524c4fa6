//! Browser entry points (`web` feature).
//!
//! Mounts a scene on an existing `<canvas>` and drives it from
//! `requestAnimationFrame`. The returned [`SceneHandle`] is the teardown
//! point: stopping it (or dropping it) cancels the pending animation frame
//! and removes the resize listener, after which no callback touches the
//! canvas again.

use std::{cell::RefCell, rc::Rc};

use wasm_bindgen::{closure::Closure, prelude::wasm_bindgen, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use crate::{
    animation::{AnimationScheduler, FrameClock, FrameRequestId},
    error::VizError,
    graph_style::{GraphLink, GraphNode, GraphStyle},
    options::Options,
    particles::ParticleField,
    scene::Scene,
    sphere::SphereScene,
    surface::{canvas::{js_message, CanvasSurface}, Surface, SurfaceSize},
};

impl From<VizError> for JsValue {
    fn from(e: VizError) -> Self {
        Self::from_str(&e.to_string())
    }
}

/// Route `log` output to the browser console and panics to
/// `console.error`. Safe to call more than once.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    // Already initialised on repeat calls.
    let _ = console_log::init_with_level(log::Level::Info);
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// [`FrameClock`] over `window.requestAnimationFrame`.
struct AnimationFrameClock {
    window: Window,
    callback: FrameCallback,
    next_id: u64,
    /// Our id and the browser's handle for the outstanding request.
    pending: Option<(FrameRequestId, i32)>,
}

impl AnimationFrameClock {
    /// The request whose callback is running now.
    fn take_fired(&mut self) -> Option<FrameRequestId> {
        self.pending.take().map(|(id, _)| id)
    }
}

impl FrameClock for AnimationFrameClock {
    fn request_frame(&mut self) -> Result<FrameRequestId, VizError> {
        let callback = self.callback.borrow();
        let closure = callback
            .as_ref()
            .ok_or_else(|| VizError::FrameRequest("animation frame callback missing".into()))?;
        let handle = self
            .window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .map_err(|e| VizError::FrameRequest(js_message(&e)))?;
        self.next_id += 1;
        let id = FrameRequestId(self.next_id);
        self.pending = Some((id, handle));
        Ok(id)
    }

    fn cancel_frame(&mut self, id: FrameRequestId) {
        if let Some((pending, handle)) = self.pending {
            if pending == id {
                if let Err(e) = self.window.cancel_animation_frame(handle) {
                    log::warn!("cancelAnimationFrame failed: {}", js_message(&e));
                }
                self.pending = None;
            }
        }
    }
}

type SceneBuilder = Box<dyn FnMut(SurfaceSize) -> Box<dyn Scene>>;

struct WebLoop {
    scheduler: AnimationScheduler<Box<dyn Scene>, SceneBuilder>,
    clock: AnimationFrameClock,
    surface: CanvasSurface,
}

impl WebLoop {
    fn on_frame(&mut self, timestamp_ms: f64) {
        let Some(request) = self.clock.take_fired() else {
            return;
        };
        let _ = self.scheduler.run_frame(
            &mut self.clock,
            request,
            timestamp_ms,
            &mut self.surface,
        );
    }

    fn stop(&mut self) {
        self.scheduler.deactivate(&mut self.clock);
    }
}

/// A running scene on a canvas. Call [`stop`](Self::stop) to tear it down.
#[wasm_bindgen]
pub struct SceneHandle {
    state: Rc<RefCell<WebLoop>>,
    window: Window,
    resize: Option<Closure<dyn FnMut()>>,
}

#[wasm_bindgen]
impl SceneHandle {
    /// Cancel the pending frame and detach the resize listener.
    pub fn stop(&mut self) {
        self.state.borrow_mut().stop();
        if let Some(listener) = self.resize.take() {
            if let Err(e) = self
                .window
                .remove_event_listener_with_callback("resize", listener.as_ref().unchecked_ref())
            {
                log::warn!("failed to remove resize listener: {}", js_message(&e));
            }
        }
    }

    /// Whether the animation loop is live.
    #[wasm_bindgen(js_name = isRunning)]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.borrow().scheduler.is_running()
    }

    /// Frames drawn since the scene started.
    #[wasm_bindgen(js_name = framesRun)]
    #[must_use]
    pub fn frames_run(&self) -> f64 {
        self.state.borrow().scheduler.frames_run() as f64
    }

    /// Smoothed frame rate.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.state.borrow().scheduler.fps()
    }
}

impl Drop for SceneHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start the rotating sphere on `canvas`, sized to the configured canvas.
/// `options_toml` optionally overrides the defaults.
///
/// # Errors
///
/// Fails when the options do not parse or the canvas has no 2D context.
#[wasm_bindgen(js_name = startSphere)]
pub fn start_sphere(
    canvas: HtmlCanvasElement,
    options_toml: Option<String>,
) -> Result<SceneHandle, JsValue> {
    let options = parse_options(options_toml.as_deref())?;
    let surface = CanvasSurface::new(canvas)?;
    surface.set_size(SurfaceSize::new(
        options.sphere.canvas_width,
        options.sphere.canvas_height,
    ));
    let build: SceneBuilder = Box::new(move |size| -> Box<dyn Scene> {
        Box::new(SphereScene::from_options(&options, size))
    });
    start(surface, build, false)
}

/// Start the particle background on `canvas`. The canvas backing store
/// tracks its CSS size across window resizes.
///
/// # Errors
///
/// Fails when the options do not parse, the canvas has no 2D context, or
/// the canvas has no layout size yet.
#[wasm_bindgen(js_name = startParticles)]
pub fn start_particles(
    canvas: HtmlCanvasElement,
    options_toml: Option<String>,
) -> Result<SceneHandle, JsValue> {
    let options = parse_options(options_toml.as_deref())?;
    let surface = CanvasSurface::new(canvas)?;
    surface.set_size(layout_size(surface.canvas()));
    let build: SceneBuilder = Box::new(move |size| -> Box<dyn Scene> {
        Box::new(ParticleField::from_options(&options, size))
    });
    start(surface, build, true)
}

fn parse_options(toml: Option<&str>) -> Result<Options, VizError> {
    toml.map_or_else(|| Ok(Options::default()), Options::from_toml)
}

fn layout_size(canvas: &HtmlCanvasElement) -> SurfaceSize {
    SurfaceSize::new(
        u32::try_from(canvas.offset_width()).unwrap_or(0),
        u32::try_from(canvas.offset_height()).unwrap_or(0),
    )
}

fn start(
    surface: CanvasSurface,
    build: SceneBuilder,
    track_resize: bool,
) -> Result<SceneHandle, JsValue> {
    let window = web_sys::window().ok_or(VizError::Web("no window".into()))?;
    let size = surface.size();
    let callback: FrameCallback = Rc::new(RefCell::new(None));

    let state = Rc::new(RefCell::new(WebLoop {
        scheduler: AnimationScheduler::new(build),
        clock: AnimationFrameClock {
            window: window.clone(),
            callback: callback.clone(),
            next_id: 0,
            pending: None,
        },
        surface,
    }));

    // The closure holds a weak reference so dropping the handle frees the
    // loop even while a frame is queued.
    let weak = Rc::downgrade(&state);
    *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp_ms: f64| {
        if let Some(state) = weak.upgrade() {
            state.borrow_mut().on_frame(timestamp_ms);
        }
    }) as Box<dyn FnMut(f64)>));

    {
        let mut guard = state.borrow_mut();
        let WebLoop {
            scheduler, clock, ..
        } = &mut *guard;
        scheduler.activate(clock, (!size.is_empty()).then_some(size))?;
    }

    let resize = if track_resize {
        let weak = Rc::downgrade(&state);
        let listener = Closure::wrap(Box::new(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let mut state = state.borrow_mut();
            let size = layout_size(state.surface.canvas());
            // A hidden canvas reports 0x0; keep the last real size.
            if size.is_empty() {
                return;
            }
            state.surface.set_size(size);
            state.scheduler.notify_resize(size);
        }) as Box<dyn FnMut()>);
        window
            .add_event_listener_with_callback("resize", listener.as_ref().unchecked_ref())?;
        Some(listener)
    } else {
        None
    };

    Ok(SceneHandle {
        state,
        window,
        resize,
    })
}

/// Styling callbacks for the transaction graph widget.
#[wasm_bindgen]
pub struct GraphStyler {
    style: GraphStyle,
}

#[wasm_bindgen]
impl GraphStyler {
    /// Styler for the default palette, or the one in `options_toml`.
    ///
    /// # Errors
    ///
    /// Fails when the options do not parse.
    #[wasm_bindgen(constructor)]
    pub fn new(options_toml: Option<String>) -> Result<GraphStyler, JsValue> {
        let options = parse_options(options_toml.as_deref())?;
        Ok(Self {
            style: GraphStyle::from_options(&options),
        })
    }

    /// CSS color of a node.
    #[wasm_bindgen(js_name = nodeColor)]
    #[must_use]
    pub fn node_color(&self, is_suspicious: bool) -> String {
        let node = GraphNode {
            is_suspicious,
            ..GraphNode::default()
        };
        self.style.node_color(&node).to_css()
    }

    /// Hover text for a node given as JSON.
    ///
    /// # Errors
    ///
    /// Fails when `node_json` is not a node record.
    #[wasm_bindgen(js_name = nodeLabel)]
    pub fn node_label(&self, node_json: &str) -> Result<String, JsValue> {
        let node: GraphNode = serde_json::from_str(node_json)
            .map_err(|e| VizError::Web(format!("bad node: {e}")))?;
        Ok(self.style.node_label(&node))
    }

    /// Stroke width of a link.
    #[wasm_bindgen(js_name = linkWidth)]
    #[must_use]
    pub fn link_width(&self, amount: f64) -> f64 {
        self.style.link_width(&link(amount, 0.0))
    }

    /// Hover text of a link.
    #[wasm_bindgen(js_name = linkLabel)]
    #[must_use]
    pub fn link_label(&self, amount: f64) -> String {
        self.style.link_label(&link(amount, 0.0))
    }

    /// CSS color of a link.
    #[wasm_bindgen(js_name = linkColor)]
    #[must_use]
    pub fn link_color(&self, age_days: f64) -> String {
        self.style.link_color(&link(0.0, age_days)).to_css()
    }

    /// Directional particles on a link.
    #[wasm_bindgen(js_name = linkParticles)]
    #[must_use]
    pub fn link_particles(&self, age_days: f64) -> u32 {
        self.style.link_particles(&link(0.0, age_days))
    }

    /// CSS color of the directional particles.
    #[wasm_bindgen(js_name = particleColor)]
    #[must_use]
    pub fn particle_color(&self) -> String {
        self.style.particle_color().to_css()
    }

    /// Paint the suspicious-node glow at `(x, y)` in graph space.
    ///
    /// # Errors
    ///
    /// Fails for a context detached from any canvas.
    #[wasm_bindgen(js_name = paintGlow)]
    pub fn paint_glow(
        &self,
        ctx: CanvasRenderingContext2d,
        x: f64,
        y: f64,
        is_suspicious: bool,
        timestamp_ms: f64,
    ) -> Result<(), JsValue> {
        let mut surface = CanvasSurface::from_context(ctx)?;
        let node = GraphNode {
            is_suspicious,
            x: Some(x),
            y: Some(y),
            ..GraphNode::default()
        };
        self.style.paint_glow(&node, timestamp_ms, &mut surface);
        Ok(())
    }
}

fn link(amount: f64, age_days: f64) -> GraphLink {
    GraphLink {
        amount,
        age_days,
        ..GraphLink::default()
    }
}
