use glam::Vec2;

use super::{Paint, Stroke, Surface, SurfaceSize};

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// [`Surface::clear`].
    Clear,
    /// [`Surface::fill_circle`].
    Circle {
        /// Circle center.
        center: Vec2,
        /// Circle radius.
        radius: f32,
        /// Fill paint.
        paint: Paint,
    },
    /// [`Surface::fill_ellipse`].
    Ellipse {
        /// Ellipse center.
        center: Vec2,
        /// Half-axes.
        radii: Vec2,
        /// Fill paint.
        paint: Paint,
    },
    /// [`Surface::stroke_polyline`] (and [`Surface::stroke_line`]).
    Polyline {
        /// Vertices in order.
        points: Vec<Vec2>,
        /// Whether the last vertex joins the first.
        closed: bool,
        /// Line style.
        stroke: Stroke,
    },
}

impl DrawCommand {
    /// Whether this is a stroke of exactly two points.
    #[must_use]
    pub fn is_segment(&self) -> bool {
        matches!(self, Self::Polyline { points, closed: false, .. } if points.len() == 2)
    }
}

/// A [`Surface`] that keeps every call instead of drawing it.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    size: SurfaceSize,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    /// Create an empty recorder reporting the given size.
    #[must_use]
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    /// Calls recorded so far, oldest first.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drop recorded calls.
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    /// Change the reported size.
    pub fn set_size(&mut self, size: SurfaceSize) {
        self.size = size;
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            paint: paint.clone(),
        });
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, paint: &Paint) {
        self.commands.push(DrawCommand::Ellipse {
            center,
            radii,
            paint: paint.clone(),
        });
    }

    fn stroke_polyline(
        &mut self,
        points: &[Vec2],
        closed: bool,
        stroke: &Stroke,
    ) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            closed,
            stroke: *stroke,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Rgba;

    #[test]
    fn records_calls_in_order() {
        let mut surface = RecordingSurface::new(SurfaceSize::new(10, 10));
        let stroke = Stroke::new(Rgba::new(1.0, 1.0, 1.0, 1.0), 1.0);
        surface.clear();
        surface.stroke_line(Vec2::ZERO, Vec2::ONE, &stroke);
        surface.fill_circle(Vec2::ONE, 2.0, &Rgba::TRANSPARENT.into());
        let cmds = surface.commands();
        assert_eq!(cmds.len(), 3);
        assert_eq!(cmds[0], DrawCommand::Clear);
        assert!(cmds[1].is_segment());
        assert!(matches!(cmds[2], DrawCommand::Circle { radius, .. } if radius == 2.0));
        surface.reset();
        assert!(surface.commands().is_empty());
    }
}
