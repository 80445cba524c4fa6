//! Orbital rings: constants, tangent basis and sampling.

use std::f64::consts::TAU;

use glam::DVec3;

use crate::options::RingOptions;

/// Reference axis the tangent is derived from. Ring normals must not be
/// parallel to it.
pub const REFERENCE_AXIS: DVec3 = DVec3::Z;

/// Below this length a projected tangent is treated as degenerate.
const DEGENERATE_EPSILON: f64 = 1e-9;

/// Immutable description of one ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingSpec {
    /// Ring plane normal as configured (not necessarily unit length).
    pub normal: DVec3,
    /// Signed phase increment per frame, in radians.
    pub speed: f64,
    /// Radius relative to the sphere radius.
    pub radius: f64,
    /// Phase at activation.
    pub initial_phase: f64,
}

impl From<&RingOptions> for RingSpec {
    fn from(options: &RingOptions) -> Self {
        Self {
            normal: DVec3::from_array(options.normal),
            speed: options.speed,
            radius: options.radius,
            initial_phase: options.phase,
        }
    }
}

/// Orthonormal in-plane axes of a ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingBasis {
    /// First in-plane axis; phase 0 points along it.
    pub tangent: DVec3,
    /// Second in-plane axis, `normal × tangent`.
    pub bitangent: DVec3,
}

impl RingBasis {
    /// Build the basis by projecting [`REFERENCE_AXIS`] onto the ring
    /// plane. Returns `None` for a zero normal or one parallel to the
    /// reference axis.
    #[must_use]
    pub fn new(normal: DVec3) -> Option<Self> {
        let n = normal.try_normalize()?;
        let projected = REFERENCE_AXIS - n * REFERENCE_AXIS.dot(n);
        if projected.length() < DEGENERATE_EPSILON {
            return None;
        }
        let tangent = projected.normalize();
        Some(Self {
            tangent,
            bitangent: n.cross(tangent),
        })
    }

    /// Point on the ring at angle `a`, scaled by `radius`.
    #[must_use]
    pub fn point(&self, a: f64, radius: f64) -> DVec3 {
        (self.tangent * a.cos() + self.bitangent * a.sin()) * radius
    }

    /// `samples` evenly spaced points around the ring, starting at `phase`.
    pub fn samples(
        &self,
        samples: usize,
        phase: f64,
        radius: f64,
    ) -> impl Iterator<Item = DVec3> + '_ {
        let step = TAU / samples.max(1) as f64;
        (0..samples).map(move |i| self.point(i as f64 * step + phase, radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_is_orthonormal() {
        for options in crate::options::SphereOptions::default().rings {
            let spec = RingSpec::from(&options);
            let basis = RingBasis::new(spec.normal).unwrap();
            let n = spec.normal.normalize();
            assert!((basis.tangent.length() - 1.0).abs() < 1e-12);
            assert!((basis.bitangent.length() - 1.0).abs() < 1e-12);
            assert!(basis.tangent.dot(basis.bitangent).abs() < 1e-12);
            assert!(basis.tangent.dot(n).abs() < 1e-12);
            assert!(basis.bitangent.dot(n).abs() < 1e-12);
        }
    }

    #[test]
    fn zero_and_parallel_normals_are_degenerate() {
        assert!(RingBasis::new(DVec3::ZERO).is_none());
        assert!(RingBasis::new(DVec3::new(0.0, 0.0, 2.0)).is_none());
        assert!(RingBasis::new(DVec3::new(0.0, 0.0, -1.0)).is_none());
        assert!(RingBasis::new(DVec3::new(0.0, 0.1, 1.0)).is_some());
    }

    #[test]
    fn samples_stay_on_the_ring() {
        let basis = RingBasis::new(DVec3::new(0.3, 1.0, 0.2)).unwrap();
        let points: Vec<DVec3> = basis.samples(72, 0.7, 1.22).collect();
        assert_eq!(points.len(), 72);
        for p in &points {
            assert!((p.length() - 1.22).abs() < 1e-12);
        }
        assert!(points[0].distance(basis.point(0.7, 1.22)) < 1e-12);
    }
}
