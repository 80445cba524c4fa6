//! Weak-perspective projection of the rotating sphere.
//!
//! Points are yawed about +Y by the current rotation angle, pitched about
//! +X by a fixed tilt, then mapped to screen space with a depth-dependent
//! scale. There is no z-sorting; callers cull on [`Projected::depth`].

use glam::{DMat3, DVec2, DVec3, Vec2};

use crate::options::SphereOptions;

/// Result of projecting one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    /// Screen position in surface pixels.
    pub screen: DVec2,
    /// Rotated z; positive faces the viewer.
    pub depth: f64,
    /// Weak-perspective size factor, `1 + depth * k`.
    pub scale: f64,
}

impl Projected {
    /// Screen position in the surface's `f32` coordinates.
    #[must_use]
    pub fn point(&self) -> Vec2 {
        self.screen.as_vec2()
    }
}

/// Maps unit-sphere space to screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    center: DVec2,
    radius: f64,
    tilt: f64,
    perspective: f64,
}

impl Projector {
    /// Create a projector centered on `center` with a sphere radius in
    /// pixels.
    #[must_use]
    pub fn new(center: DVec2, radius: f64, tilt: f64, perspective: f64) -> Self {
        Self {
            center,
            radius,
            tilt,
            perspective,
        }
    }

    /// Projector for the sphere options, centered on a canvas of the given
    /// size.
    #[must_use]
    pub fn from_options(options: &SphereOptions, center: DVec2) -> Self {
        Self::new(center, options.radius, options.tilt, options.perspective)
    }

    /// Screen-space center of the sphere before the float offset.
    #[must_use]
    pub fn center(&self) -> DVec2 {
        self.center
    }

    /// Sphere radius in pixels.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Combined yaw-then-pitch rotation.
    #[must_use]
    pub fn rotation(&self, rotation_angle: f64) -> DMat3 {
        // Yaw is applied as x' = x cos - z sin, the negative of glam's
        // right-handed convention.
        DMat3::from_rotation_x(self.tilt) * DMat3::from_rotation_y(-rotation_angle)
    }

    /// Rotate a point into view space.
    #[must_use]
    pub fn rotate(&self, point: DVec3, rotation_angle: f64) -> DVec3 {
        self.rotation(rotation_angle) * point
    }

    /// Undo [`rotate`](Self::rotate).
    #[must_use]
    pub fn unrotate(&self, point: DVec3, rotation_angle: f64) -> DVec3 {
        self.rotation(rotation_angle).transpose() * point
    }

    /// Project a point given the current rotation and float offset.
    #[must_use]
    pub fn project(
        &self,
        point: DVec3,
        rotation_angle: f64,
        float_offset: f64,
    ) -> Projected {
        self.project_rotated(self.rotate(point, rotation_angle), float_offset)
    }

    /// Project a point that has already been rotated into view space.
    #[must_use]
    pub fn project_rotated(&self, rotated: DVec3, float_offset: f64) -> Projected {
        let scale = 1.0 + rotated.z * self.perspective;
        let screen = DVec2::new(
            self.center.x + rotated.x * scale * self.radius,
            self.center.y - rotated.y * scale * self.radius + float_offset,
        );
        Projected {
            screen,
            depth: rotated.z,
            scale,
        }
    }
}
