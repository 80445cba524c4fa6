//! [`Surface`] over an HTML canvas 2D context.
//!
//! Every call maps onto one canvas path operation. Browser failures (a
//! gradient with a non-finite radius, say) are logged and the shape is
//! skipped so one bad frame never tears down the loop.

use std::f64::consts::TAU;

use glam::Vec2;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{Paint, Stroke, Surface, SurfaceSize};
use crate::error::VizError;

/// A canvas element and its 2D context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Acquire the 2D context of `canvas`.
    ///
    /// # Errors
    ///
    /// Returns [`VizError::Web`] if the browser refuses a 2D context.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, VizError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| VizError::Web(js_message(&e)))?
            .ok_or_else(|| VizError::Web("2d context unavailable".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| VizError::Web("context is not 2d".into()))?;
        Ok(Self { canvas, ctx })
    }

    /// Wrap a context someone else owns, such as the one a graph widget
    /// hands to its custom-paint callbacks.
    ///
    /// # Errors
    ///
    /// Returns [`VizError::Web`] for a context detached from any canvas.
    pub fn from_context(ctx: CanvasRenderingContext2d) -> Result<Self, VizError> {
        let canvas = ctx
            .canvas()
            .ok_or_else(|| VizError::Web("context has no canvas".into()))?;
        Ok(Self { canvas, ctx })
    }

    /// The backing canvas element.
    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Set the canvas backing-store size in pixels.
    pub fn set_size(&self, size: SurfaceSize) {
        self.canvas.set_width(size.width);
        self.canvas.set_height(size.height);
    }

    /// Select `paint` as the fill style. Returns `false` when the browser
    /// rejected a gradient.
    fn apply_fill(&self, paint: &Paint) -> bool {
        match paint {
            Paint::Solid(color) => {
                self.ctx.set_fill_style_str(&color.to_css());
                true
            }
            Paint::Radial(gradient) => {
                let (x, y) = (f64::from(gradient.center.x), f64::from(gradient.center.y));
                let result = self
                    .ctx
                    .create_radial_gradient(x, y, 0.0, x, y, f64::from(gradient.radius))
                    .and_then(|g| {
                        for stop in &gradient.stops {
                            g.add_color_stop(stop.offset, &stop.color.to_css())?;
                        }
                        Ok(g)
                    });
                match result {
                    Ok(g) => {
                        self.ctx.set_fill_style_canvas_gradient(&g);
                        true
                    }
                    Err(e) => {
                        log::warn!("gradient rejected: {}", js_message(&e));
                        false
                    }
                }
            }
        }
    }

    fn fill_path(&self, paint: &Paint, path: impl FnOnce(&CanvasRenderingContext2d) -> Result<(), JsValue>) {
        if !self.apply_fill(paint) {
            return;
        }
        self.ctx.begin_path();
        match path(&self.ctx) {
            Ok(()) => self.ctx.fill(),
            Err(e) => log::warn!("path rejected: {}", js_message(&e)),
        }
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.canvas.width(), self.canvas.height())
    }

    fn clear(&mut self) {
        let size = self.size();
        self.ctx
            .clear_rect(0.0, 0.0, f64::from(size.width), f64::from(size.height));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        self.fill_path(paint, |ctx| {
            ctx.arc(
                f64::from(center.x),
                f64::from(center.y),
                f64::from(radius.max(0.0)),
                0.0,
                TAU,
            )
        });
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, paint: &Paint) {
        self.fill_path(paint, |ctx| {
            ctx.ellipse(
                f64::from(center.x),
                f64::from(center.y),
                f64::from(radii.x.max(0.0)),
                f64::from(radii.y.max(0.0)),
                0.0,
                0.0,
                TAU,
            )
        });
    }

    fn stroke_polyline(&mut self, points: &[Vec2], closed: bool, stroke: &Stroke) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.ctx.begin_path();
        self.ctx.move_to(f64::from(first.x), f64::from(first.y));
        for p in rest {
            self.ctx.line_to(f64::from(p.x), f64::from(p.y));
        }
        if closed {
            self.ctx.close_path();
        }
        self.ctx.set_stroke_style_str(&stroke.color.to_css());
        self.ctx.set_line_width(f64::from(stroke.width));
        self.ctx.stroke();
    }
}

/// Best-effort text of a thrown JS value.
pub(crate) fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
