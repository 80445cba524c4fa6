//! Palette blending.
//!
//! Node and edge colors interpolate between two palette stops by a per-node
//! `color_mix`; the alarm color replaces the blend during an alert flash.

use crate::options::PaletteOptions;
use crate::surface::Rgba;

/// A color ramp defined by evenly spaced RGB stops.
/// `t = 0` maps to the first stop, `t = 1` to the last.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    stops: Vec<[f32; 3]>,
}

impl ColorRamp {
    /// Ramp through the given stops. A single stop yields a flat color; an
    /// empty list samples as black.
    #[must_use]
    pub fn new(stops: Vec<[f32; 3]>) -> Self {
        Self { stops }
    }

    /// Primary-to-secondary ramp of a palette.
    #[must_use]
    pub fn from_palette(palette: &PaletteOptions) -> Self {
        Self::new(vec![palette.primary, palette.secondary])
    }

    /// Interpolate the ramp at position `t` in [0, 1].
    #[must_use]
    pub fn sample(&self, t: f32) -> [f32; 3] {
        let Some(last) = self.stops.len().checked_sub(1) else {
            return [0.0; 3];
        };
        if last == 0 {
            return self.stops[0];
        }
        let scaled = t.clamp(0.0, 1.0) * last as f32;
        let idx = (scaled as usize).min(last - 1);
        let frac = scaled - idx as f32;

        let a = &self.stops[idx];
        let b = &self.stops[idx + 1];
        [
            a[0] + (b[0] - a[0]) * frac,
            a[1] + (b[1] - a[1]) * frac,
            a[2] + (b[2] - a[2]) * frac,
        ]
    }

    /// Sample at `mix` with the given alpha.
    #[must_use]
    pub fn blend(&self, mix: f64, alpha: f64) -> Rgba {
        Rgba::from_rgb(self.sample(mix as f32), alpha as f32)
    }
}
