//! Software rasterizer backing the native viewer.
//!
//! Pixels are stored premultiplied so source-over compositing is a single
//! multiply-add per channel. Edges get one pixel of coverage falloff, which
//! is enough anti-aliasing for the thin strokes and small dots the scenes
//! draw.

use glam::Vec2;

use super::{Paint, Rgba, Stroke, Surface, SurfaceSize};

/// RGBA raster target implementing [`Surface`].
pub struct RasterSurface {
    size: SurfaceSize,
    /// Premultiplied RGBA, row-major.
    pixels: Vec<[f32; 4]>,
}

impl RasterSurface {
    /// Create a transparent surface.
    #[must_use]
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            pixels: vec![[0.0; 4]; pixel_count(size)],
        }
    }

    /// Reallocate for new dimensions. Contents are discarded.
    pub fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
        self.pixels = vec![[0.0; 4]; pixel_count(size)];
    }

    /// Straight-alpha color of one pixel, `None` outside the surface.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let [r, g, b, a] =
            self.pixels[(y * self.size.width + x) as usize];
        if a <= 0.0 {
            return Some(Rgba::TRANSPARENT);
        }
        Some(Rgba::new(r / a, g / a, b / a, a))
    }

    /// Flatten over an opaque backdrop into RGBA8 bytes, ready for upload.
    #[must_use]
    pub fn to_rgba8_over(&self, background: [f32; 3]) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for &[r, g, b, a] in &self.pixels {
            let keep = 1.0 - a;
            for (channel, bg) in [r, g, b].into_iter().zip(background) {
                out.push(unit_to_u8(channel + bg * keep));
            }
            out.push(u8::MAX);
        }
        out
    }

    /// Clamped pixel-space bounding box `[x0, x1) x [y0, y1)` around a
    /// shape, or `None` when it misses the surface.
    fn bounds(&self, min: Vec2, max: Vec2) -> Option<(u32, u32, u32, u32)> {
        let x0 = min.x.floor().max(0.0);
        let y0 = min.y.floor().max(0.0);
        let x1 = max.x.ceil().min(self.size.width as f32);
        let y1 = max.y.ceil().min(self.size.height as f32);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    /// Source-over one straight-alpha color at partial coverage.
    fn blend(&mut self, x: u32, y: u32, color: Rgba, coverage: f32) {
        let alpha = (color.a * coverage).clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let px = &mut self.pixels[(y * self.size.width + x) as usize];
        let keep = 1.0 - alpha;
        px[0] = color.r * alpha + px[0] * keep;
        px[1] = color.g * alpha + px[1] * keep;
        px[2] = color.b * alpha + px[2] * keep;
        px[3] = alpha + px[3] * keep;
    }

    /// Shade every pixel in a box whose coverage function is positive.
    fn shade(
        &mut self,
        min: Vec2,
        max: Vec2,
        paint: &Paint,
        coverage: impl Fn(Vec2) -> f32,
    ) {
        let Some((x0, y0, x1, y1)) = self.bounds(min, max) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let c = coverage(p);
                if c > 0.0 {
                    self.blend(x, y, paint.sample(p), c);
                }
            }
        }
    }

    fn stroke_segment(&mut self, a: Vec2, b: Vec2, stroke: &Stroke) {
        let half = stroke.width.max(1.0) * 0.5;
        // Hairlines are drawn one pixel wide at proportionally lower alpha.
        let weight = stroke.width.min(1.0);
        let pad = Vec2::splat(half + 1.0);
        let paint = Paint::Solid(stroke.color);
        self.shade(a.min(b) - pad, a.max(b) + pad, &paint, |p| {
            (half + 0.5 - distance_to_segment(p, a, b)).clamp(0.0, 1.0)
                * weight
        });
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn clear(&mut self) {
        self.pixels.fill([0.0; 4]);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        if radius <= 0.0 {
            return;
        }
        let pad = Vec2::splat(radius + 1.0);
        self.shade(center - pad, center + pad, paint, |p| {
            (radius + 0.5 - p.distance(center)).clamp(0.0, 1.0)
        });
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, paint: &Paint) {
        if radii.x <= 0.0 || radii.y <= 0.0 {
            return;
        }
        let pad = radii + Vec2::ONE;
        let min_radius = radii.x.min(radii.y);
        self.shade(center - pad, center + pad, paint, |p| {
            // Scaled radial distance approximates the signed edge distance.
            let k = ((p - center) / radii).length();
            (0.5 - (k - 1.0) * min_radius).clamp(0.0, 1.0)
        });
    }

    fn stroke_polyline(
        &mut self,
        points: &[Vec2],
        closed: bool,
        stroke: &Stroke,
    ) {
        if stroke.width <= 0.0 || stroke.color.a <= 0.0 {
            return;
        }
        for pair in points.windows(2) {
            self.stroke_segment(pair[0], pair[1], stroke);
        }
        if closed && points.len() > 2 {
            if let (Some(&last), Some(&first)) = (points.last(), points.first())
            {
                self.stroke_segment(last, first, stroke);
            }
        }
    }
}

fn pixel_count(size: SurfaceSize) -> usize {
    size.width as usize * size.height as usize
}

fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RadialGradient;

    fn white(a: f32) -> Rgba {
        Rgba::new(1.0, 1.0, 1.0, a)
    }

    #[test]
    fn new_surface_is_transparent() {
        let surface = RasterSurface::new(SurfaceSize::new(4, 3));
        assert_eq!(surface.pixel(3, 2), Some(Rgba::TRANSPARENT));
        assert_eq!(surface.pixel(4, 0), None);
    }

    #[test]
    fn circle_covers_center_not_corner() {
        let mut surface = RasterSurface::new(SurfaceSize::new(20, 20));
        surface.fill_circle(Vec2::splat(10.0), 4.0, &white(1.0).into());
        assert_eq!(surface.pixel(10, 10).unwrap().a, 1.0);
        assert_eq!(surface.pixel(0, 0).unwrap().a, 0.0);
    }

    #[test]
    fn source_over_accumulates_alpha() {
        let mut surface = RasterSurface::new(SurfaceSize::new(8, 8));
        let paint = Paint::Solid(white(0.5));
        surface.fill_circle(Vec2::splat(4.0), 3.0, &paint);
        surface.fill_circle(Vec2::splat(4.0), 3.0, &paint);
        let a = surface.pixel(4, 4).unwrap().a;
        assert!((a - 0.75).abs() < 1e-6);
    }

    #[test]
    fn clear_resets_pixels() {
        let mut surface = RasterSurface::new(SurfaceSize::new(8, 8));
        surface.fill_circle(Vec2::splat(4.0), 3.0, &white(1.0).into());
        surface.clear();
        assert_eq!(surface.pixel(4, 4), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn stroke_touches_only_the_line() {
        let mut surface = RasterSurface::new(SurfaceSize::new(16, 16));
        let stroke = Stroke::new(white(1.0), 1.0);
        surface.stroke_line(
            Vec2::new(0.0, 8.5),
            Vec2::new(16.0, 8.5),
            &stroke,
        );
        assert!(surface.pixel(5, 8).unwrap().a > 0.9);
        assert_eq!(surface.pixel(5, 2).unwrap().a, 0.0);
    }

    #[test]
    fn closed_polyline_draws_the_closing_edge() {
        let mut open = RasterSurface::new(SurfaceSize::new(16, 16));
        let mut closed = RasterSurface::new(SurfaceSize::new(16, 16));
        let pts = [
            Vec2::new(2.5, 2.5),
            Vec2::new(13.5, 2.5),
            Vec2::new(13.5, 13.5),
        ];
        let stroke = Stroke::new(white(1.0), 1.0);
        open.stroke_polyline(&pts, false, &stroke);
        closed.stroke_polyline(&pts, true, &stroke);
        // A pixel on the diagonal from the last point back to the first.
        assert_eq!(open.pixel(8, 8).unwrap().a, 0.0);
        assert!(closed.pixel(8, 8).unwrap().a > 0.5);
    }

    #[test]
    fn gradient_fill_fades_outward() {
        let mut surface = RasterSurface::new(SurfaceSize::new(32, 32));
        let center = Vec2::splat(16.0);
        let gradient =
            RadialGradient::new(center, 12.0, white(1.0), white(0.0));
        surface.fill_circle(center, 12.0, &gradient.into());
        let inner = surface.pixel(16, 16).unwrap().a;
        let outer = surface.pixel(25, 16).unwrap().a;
        assert!(inner > outer);
    }

    #[test]
    fn ellipse_respects_both_axes() {
        let mut surface = RasterSurface::new(SurfaceSize::new(40, 20));
        surface.fill_ellipse(
            Vec2::new(20.0, 10.0),
            Vec2::new(15.0, 3.0),
            &white(1.0).into(),
        );
        assert_eq!(surface.pixel(28, 10).unwrap().a, 1.0);
        assert_eq!(surface.pixel(20, 17).unwrap().a, 0.0);
    }

    #[test]
    fn flatten_over_background_is_opaque() {
        let surface = RasterSurface::new(SurfaceSize::new(2, 1));
        let bytes = surface.to_rgba8_over([1.0, 0.0, 0.0]);
        assert_eq!(bytes, vec![255, 0, 0, 255, 255, 0, 0, 255]);
    }

    #[test]
    fn shapes_off_surface_are_ignored() {
        let mut surface = RasterSurface::new(SurfaceSize::new(4, 4));
        surface.fill_circle(Vec2::splat(-50.0), 3.0, &white(1.0).into());
        surface.fill_circle(Vec2::splat(2.0), 0.0, &white(1.0).into());
        assert_eq!(surface.pixel(0, 0), Some(Rgba::TRANSPARENT));
    }
}
