use serde::{Deserialize, Serialize};

use crate::surface::Rgba;

/// Shared palette for both scenes. Channels are in `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PaletteOptions {
    /// Mint green: `color_mix = 0` end of the blend, green particles.
    pub primary: [f32; 3],
    /// Signal blue: `color_mix = 1` end of the blend, other particles.
    pub secondary: [f32; 3],
    /// Cyan used by the third ring and the equator guide.
    pub accent: [f32; 3],
    /// Red used during alert flashes.
    pub alarm: [f32; 3],
    /// Page backdrop the transparent scene is composited over.
    pub background: [f32; 3],
    /// Stroke alpha of each ring, indexed like the rings (cycled).
    pub ring_alpha: Vec<f32>,
}

impl Default for PaletteOptions {
    fn default() -> Self {
        Self {
            primary: rgb8(0, 255, 178),
            secondary: rgb8(46, 139, 255),
            accent: rgb8(0, 229, 255),
            alarm: rgb8(255, 59, 59),
            background: rgb8(5, 10, 15),
            ring_alpha: vec![0.2, 0.22, 0.14],
        }
    }
}

impl PaletteOptions {
    /// Ring color cycle: primary, secondary, accent.
    #[must_use]
    pub fn ring_color(&self, index: usize) -> Rgba {
        let rgb = match index % 3 {
            0 => self.primary,
            1 => self.secondary,
            _ => self.accent,
        };
        Rgba::from_rgb(rgb, 1.0)
    }

    /// Stroke alpha for a ring, cycling through [`ring_alpha`](Self::ring_alpha).
    /// Falls back to 0.2 when the list is empty.
    #[must_use]
    pub fn ring_stroke_alpha(&self, index: usize) -> f32 {
        if self.ring_alpha.is_empty() {
            return 0.2;
        }
        self.ring_alpha[index % self.ring_alpha.len()]
    }
}

fn rgb8(r: u8, g: u8, b: u8) -> [f32; 3] {
    [f32::from(r) / 255.0, f32::from(g) / 255.0, f32::from(b) / 255.0]
}
