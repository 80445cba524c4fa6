//! The rotating Fibonacci sphere.
//!
//! A fixed lattice of nodes on the unit sphere, joined by proximity edges,
//! rotates slowly while bobbing up and down. Three tilted orbital rings
//! circle it with a bright marker each, and every few seconds a brief
//! alarm flash recolors random nodes and edges.
//!
//! Geometry is generated once in [`SphereScene::new`]; per-frame state
//! lives in [`simulation::SceneSimulator`] and drawing in
//! [`painter::SpherePainter`].

pub mod geometry;
pub mod painter;
pub mod projection;
pub mod ring;
pub mod simulation;

use glam::DVec2;
use rand::{rngs::StdRng, Rng};

use crate::options::Options;
use crate::scene::Scene;
use crate::surface::{Surface, SurfaceSize};
use geometry::SphereGeometry;
use painter::SpherePainter;
use projection::Projector;
use ring::RingSpec;
use simulation::SceneSimulator;

/// The sphere scene: geometry, motion state and painter.
#[derive(Debug, Clone)]
pub struct SphereScene<R = StdRng> {
    geometry: SphereGeometry,
    projector: Projector,
    simulator: SceneSimulator<R>,
    painter: SpherePainter,
}

impl<R: Rng> SphereScene<R> {
    /// Generate the sphere for a surface of the given size. The sphere is
    /// centered on the surface; `rng` drives node attributes, pulse phases
    /// and the alert flash.
    pub fn new(options: &Options, size: SurfaceSize, mut rng: R) -> Self {
        let sphere = &options.sphere;
        let geometry = SphereGeometry::generate(sphere, &mut rng);
        let rings: Vec<RingSpec> = sphere.rings.iter().map(RingSpec::from).collect();
        let projector = Projector::from_options(sphere, size.center().as_dvec2());
        let painter = SpherePainter::new(sphere, &options.palette, &rings);
        let simulator =
            SceneSimulator::new(sphere, &options.alert, &geometry, &rings, rng);

        log::info!(
            "sphere scene: {} nodes, {} edges (mean degree {:.2}), {} rings",
            geometry.nodes.len(),
            geometry.edges.len(),
            geometry.mean_degree(),
            painter.drawable_rings()
        );

        Self {
            geometry,
            projector,
            simulator,
            painter,
        }
    }
}

impl SphereScene<StdRng> {
    /// Generate the sphere with the rng described by [`Options::rng`].
    #[must_use]
    pub fn from_options(options: &Options, size: SurfaceSize) -> Self {
        Self::new(options, size, options.rng())
    }
}

impl<R> SphereScene<R> {
    /// The generated nodes and edges.
    #[must_use]
    pub fn geometry(&self) -> &SphereGeometry {
        &self.geometry
    }

    /// Per-frame motion and alert state.
    #[must_use]
    pub fn simulator(&self) -> &SceneSimulator<R> {
        &self.simulator
    }

    /// Screen-space center of the sphere at rest.
    #[must_use]
    pub fn center(&self) -> DVec2 {
        self.projector.center()
    }
}

impl<R: Rng> Scene for SphereScene<R> {
    fn advance(&mut self, timestamp_ms: f64) {
        self.simulator.advance(timestamp_ms);
    }

    fn draw(&self, surface: &mut dyn Surface) {
        self.painter
            .paint(&self.geometry, &self.projector, &self.simulator, surface);
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::surface::{DrawCommand, RasterSurface, RecordingSurface};

    fn options() -> Options {
        Options {
            seed: Some(21),
            ..Options::default()
        }
    }

    #[test]
    fn scene_is_centered_on_the_surface() {
        let scene = SphereScene::from_options(&options(), SurfaceSize::new(320, 320));
        assert_eq!(scene.center(), DVec2::splat(160.0));
        assert_eq!(scene.geometry().nodes.len(), 88);
        assert_eq!(scene.geometry().edges.len(), 189);
    }

    #[test]
    fn reactivation_rebuilds_the_same_lattice() {
        let size = SurfaceSize::new(320, 320);
        let a = SphereScene::new(&options(), size, StdRng::seed_from_u64(1));
        let b = SphereScene::new(&options(), size, StdRng::seed_from_u64(2));
        assert_eq!(a.geometry().edges, b.geometry().edges);
        for (na, nb) in a.geometry().nodes.iter().zip(&b.geometry().nodes) {
            assert_eq!(na.position, nb.position);
        }
    }

    #[test]
    fn advance_then_draw_clears_first() {
        let mut scene = SphereScene::from_options(&options(), SurfaceSize::new(320, 320));
        let mut surface = RecordingSurface::new(SurfaceSize::new(320, 320));
        for frame in 0..3 {
            scene.advance(f64::from(frame) * 16.0);
            surface.reset();
            scene.draw(&mut surface);
            assert_eq!(surface.commands()[0], DrawCommand::Clear);
        }
        assert!((scene.simulator().clock().rotation_angle - 0.012).abs() < 1e-12);
    }

    #[test]
    fn raster_frame_lights_the_center() {
        let mut scene = SphereScene::from_options(&options(), SurfaceSize::new(320, 320));
        let mut surface = RasterSurface::new(SurfaceSize::new(320, 320));
        scene.advance(16.0);
        scene.draw(&mut surface);
        let center = surface.pixel(160, 160).unwrap();
        assert!(center.a > 0.0);
        let corner = surface.pixel(0, 0).unwrap();
        assert_eq!(corner.a, 0.0);
    }
}
