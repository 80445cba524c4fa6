//! Drawing boundary for the scenes.
//!
//! A [`Surface`] is a drawable rectangle offering exactly what the painters
//! need: clearing, filled circles and ellipses, stroked polylines, and
//! solid or radial-gradient paints. Scenes never learn which backend they
//! draw on.

mod raster;
mod recording;

#[cfg(feature = "web")]
pub mod canvas;

use glam::Vec2;
pub use raster::RasterSurface;
pub use recording::{DrawCommand, RecordingSurface};
use serde::{Deserialize, Serialize};

/// Pixel dimensions of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl SurfaceSize {
    /// Create a size from pixel dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Center point of the rectangle.
    #[must_use]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) * 0.5
    }

    /// Whether either dimension is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Straight-alpha color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Opacity.
    pub a: f32,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Create a color from channel values.
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from an RGB triple and an alpha.
    #[must_use]
    pub const fn from_rgb(rgb: [f32; 3], a: f32) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2], a)
    }

    /// Same color with a different alpha.
    #[must_use]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Same color, transparent. Gradients fade toward this so the hue does
    /// not drift through black.
    #[must_use]
    pub const fn faded(self) -> Self {
        self.with_alpha(0.0)
    }

    /// Component-wise linear interpolation, alpha included.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// CSS `rgba()` string, as accepted by canvas 2D contexts.
    #[must_use]
    pub fn to_css(self) -> String {
        format!(
            "rgba({},{},{},{})",
            to_u8(self.r),
            to_u8(self.g),
            to_u8(self.b),
            self.a.clamp(0.0, 1.0)
        )
    }
}

fn to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// One color stop of a gradient, `offset` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient.
    pub offset: f32,
    /// Color at that position.
    pub color: Rgba,
}

/// Radial gradient from `center` (offset 0) out to `radius` (offset 1).
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    /// Gradient origin in surface pixels.
    pub center: Vec2,
    /// Distance at which the last stop is reached.
    pub radius: f32,
    /// Stops sorted by offset.
    pub stops: Vec<GradientStop>,
}

impl RadialGradient {
    /// Two-stop gradient from `inner` at the center to `outer` at `radius`.
    #[must_use]
    pub fn new(center: Vec2, radius: f32, inner: Rgba, outer: Rgba) -> Self {
        Self {
            center,
            radius,
            stops: vec![
                GradientStop {
                    offset: 0.0,
                    color: inner,
                },
                GradientStop {
                    offset: 1.0,
                    color: outer,
                },
            ],
        }
    }

    /// Insert an intermediate stop, keeping stops ordered.
    #[must_use]
    pub fn with_stop(mut self, offset: f32, color: Rgba) -> Self {
        let at = self
            .stops
            .iter()
            .position(|s| s.offset > offset)
            .unwrap_or(self.stops.len());
        self.stops.insert(at, GradientStop { offset, color });
        self
    }

    /// Color at a point. Positions past the radius take the last stop.
    #[must_use]
    pub fn sample(&self, point: Vec2) -> Rgba {
        let t = if self.radius > 0.0 {
            (point.distance(self.center) / self.radius).clamp(0.0, 1.0)
        } else {
            1.0
        };
        sample_stops(&self.stops, t)
    }
}

fn sample_stops(stops: &[GradientStop], t: f32) -> Rgba {
    let Some(first) = stops.first() else {
        return Rgba::TRANSPARENT;
    };
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let local = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
            return a.color.lerp(b.color, local);
        }
    }
    stops.last().map_or(Rgba::TRANSPARENT, |s| s.color)
}

/// How a filled shape is colored.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    /// Uniform color.
    Solid(Rgba),
    /// Radial gradient evaluated per pixel.
    Radial(RadialGradient),
}

impl Paint {
    /// Color of the paint at a point.
    #[must_use]
    pub fn sample(&self, point: Vec2) -> Rgba {
        match self {
            Self::Solid(color) => *color,
            Self::Radial(gradient) => gradient.sample(point),
        }
    }
}

impl From<Rgba> for Paint {
    fn from(color: Rgba) -> Self {
        Self::Solid(color)
    }
}

impl From<RadialGradient> for Paint {
    fn from(gradient: RadialGradient) -> Self {
        Self::Radial(gradient)
    }
}

/// Line style for stroked shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    /// Line color.
    pub color: Rgba,
    /// Line width in pixels.
    pub width: f32,
}

impl Stroke {
    /// Create a stroke style.
    #[must_use]
    pub const fn new(color: Rgba, width: f32) -> Self {
        Self { color, width }
    }
}

/// A drawable rectangle. Each call composites over what is already there.
pub trait Surface {
    /// Current pixel dimensions.
    fn size(&self) -> SurfaceSize;

    /// Reset every pixel to transparent.
    fn clear(&mut self);

    /// Fill a circle.
    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint);

    /// Fill an axis-aligned ellipse with the given half-axes.
    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, paint: &Paint);

    /// Stroke a polyline, joining the last point back to the first when
    /// `closed`.
    fn stroke_polyline(&mut self, points: &[Vec2], closed: bool, stroke: &Stroke);

    /// Stroke a single segment.
    fn stroke_line(&mut self, from: Vec2, to: Vec2, stroke: &Stroke) {
        self.stroke_polyline(&[from, to], false, stroke);
    }
}
