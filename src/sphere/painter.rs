//! Draws one frame of the sphere scene.
//!
//! Layers go back to front with no depth sorting: inner glow, orbital
//! rings, edges, equator guide, nodes, ground shadow. Back-facing elements
//! are dimmed or culled by depth instead. The painter holds no per-frame
//! state; alarm recoloring comes from flags the simulator rolled.

use std::f64::consts::TAU;

use glam::{DVec3, Vec2};

use crate::options::{PaletteOptions, SphereOptions};
use crate::sphere::geometry::SphereGeometry;
use crate::sphere::projection::{Projected, Projector};
use crate::sphere::ring::{RingBasis, RingSpec};
use crate::sphere::simulation::SceneSimulator;
use crate::surface::{Paint, RadialGradient, Rgba, Stroke, Surface};
use crate::util::color::ColorRamp;

/// Inner glow radius relative to the sphere radius.
const GLOW_RADIUS: f64 = 1.4;
const GLOW_CORE_ALPHA: f32 = 0.08;
const GLOW_MID_ALPHA: f32 = 0.05;

const RING_WIDTH: f32 = 0.8;
const MARKER_RADIUS: f32 = 3.0;
const MARKER_HALO_RADIUS: f32 = 10.0;
/// `0x60 / 255`.
const MARKER_HALO_ALPHA: f32 = 0.376;

const EDGE_WIDTH: f32 = 0.6;
const EDGE_MAX_ALPHA: f64 = 0.28;

const EQUATOR_ALPHA: f32 = 0.1;
const EQUATOR_WIDTH: f32 = 0.9;

const NODE_BASE_RADIUS: f64 = 1.6;
const NODE_PULSE_RADIUS: f64 = 1.5;
const NODE_HALO_SCALE: f64 = 5.0;
const NODE_HALO_ALPHA: f64 = 0.4;

/// Shadow sits this far below the sphere's lowest point.
const SHADOW_GAP: f64 = 14.0;
const SHADOW_RADII: Vec2 = Vec2::new(90.0, 18.0);
const SHADOW_ALPHA: f32 = 0.12;

/// A ring with its basis resolved once. `basis` is `None` for degenerate
/// normals and the ring is never drawn.
#[derive(Debug, Clone, Copy)]
struct PaintedRing {
    spec: RingSpec,
    basis: Option<RingBasis>,
}

/// Stateless renderer for the sphere scene.
#[derive(Debug, Clone)]
pub struct SpherePainter {
    palette: PaletteOptions,
    ramp: ColorRamp,
    rings: Vec<PaintedRing>,
    ring_samples: usize,
    equator_samples: usize,
    edge_cull_depth: f64,
    node_cull_depth: f64,
}

impl SpherePainter {
    /// Resolve ring bases and palette colors for painting.
    #[must_use]
    pub fn new(
        sphere: &SphereOptions,
        palette: &PaletteOptions,
        rings: &[RingSpec],
    ) -> Self {
        let rings = rings
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                let basis = RingBasis::new(spec.normal);
                if basis.is_none() {
                    log::warn!(
                        "ring {index} has degenerate normal {:?}; it will not be drawn",
                        spec.normal
                    );
                }
                PaintedRing { spec: *spec, basis }
            })
            .collect();
        Self {
            palette: palette.clone(),
            ramp: ColorRamp::from_palette(palette),
            rings,
            ring_samples: sphere.ring_samples,
            equator_samples: sphere.equator_samples,
            edge_cull_depth: sphere.edge_cull_depth,
            node_cull_depth: sphere.node_cull_depth,
        }
    }

    /// Number of rings that will actually be drawn.
    #[must_use]
    pub fn drawable_rings(&self) -> usize {
        self.rings.iter().filter(|r| r.basis.is_some()).count()
    }

    /// Clear the surface and paint every layer.
    pub fn paint<R>(
        &self,
        geometry: &SphereGeometry,
        projector: &Projector,
        simulator: &SceneSimulator<R>,
        surface: &mut dyn Surface,
    ) {
        let clock = simulator.clock();
        let frame = FrameProjection {
            projector,
            angle: clock.rotation_angle,
            float_offset: clock.float_offset,
        };
        let alert = simulator.alert_active();

        surface.clear();
        self.paint_glow(&frame, alert, surface);
        self.paint_rings(&frame, simulator.ring_phases(), surface);

        let projected: Vec<Projected> = geometry
            .nodes
            .iter()
            .map(|node| frame.project(node.position))
            .collect();
        self.paint_edges(geometry, &projected, simulator, surface);
        self.paint_equator(&frame, surface);
        self.paint_nodes(geometry, &projected, simulator, surface);
        self.paint_shadow(&frame, surface);
    }

    fn paint_glow(&self, frame: &FrameProjection<'_>, alert: bool, surface: &mut dyn Surface) {
        let center = frame.projector.center();
        let radius = (frame.projector.radius() * GLOW_RADIUS) as f32;
        let core = if alert {
            self.palette.alarm
        } else {
            self.palette.primary
        };
        let secondary = Rgba::from_rgb(self.palette.secondary, GLOW_MID_ALPHA);
        // The gradient stays anchored at the resting center while the disc
        // bobs with the float offset.
        let gradient = RadialGradient::new(
            center.as_vec2(),
            radius,
            Rgba::from_rgb(core, GLOW_CORE_ALPHA),
            secondary.faded(),
        )
        .with_stop(0.5, secondary);
        let disc_center = Vec2::new(center.x as f32, (center.y + frame.float_offset) as f32);
        surface.fill_circle(disc_center, radius, &gradient.into());
    }

    fn paint_rings(&self, frame: &FrameProjection<'_>, phases: &[f64], surface: &mut dyn Surface) {
        for (index, ring) in self.rings.iter().enumerate() {
            let Some(basis) = ring.basis else {
                log::trace!("skipping degenerate ring {index}");
                continue;
            };
            let phase = phases.get(index).copied().unwrap_or(ring.spec.initial_phase);
            let color = self.palette.ring_color(index);

            let points: Vec<Vec2> = basis
                .samples(self.ring_samples, phase, ring.spec.radius)
                .map(|p| frame.project(p).point())
                .collect();
            let stroke = Stroke::new(
                color.with_alpha(self.palette.ring_stroke_alpha(index)),
                RING_WIDTH,
            );
            surface.stroke_polyline(&points, true, &stroke);

            let marker = frame.project(basis.point(phase, ring.spec.radius)).point();
            surface.fill_circle(marker, MARKER_RADIUS, &Paint::Solid(color));
            let halo = RadialGradient::new(
                marker,
                MARKER_HALO_RADIUS,
                color.with_alpha(MARKER_HALO_ALPHA),
                color.faded(),
            );
            surface.fill_circle(marker, MARKER_HALO_RADIUS, &halo.into());
        }
    }

    fn paint_edges<R>(
        &self,
        geometry: &SphereGeometry,
        projected: &[Projected],
        simulator: &SceneSimulator<R>,
        surface: &mut dyn Surface,
    ) {
        for (index, edge) in geometry.edges.iter().enumerate() {
            let (a, b) = (&projected[edge.i], &projected[edge.j]);
            if a.depth < self.edge_cull_depth && b.depth < self.edge_cull_depth {
                continue;
            }
            let depth = (a.depth + b.depth) / 2.0;
            let alpha = depth_fade(depth) * EDGE_MAX_ALPHA;
            let color = if simulator.edge_alarmed(index) {
                Rgba::from_rgb(self.palette.alarm, alpha as f32)
            } else {
                let mix = (geometry.nodes[edge.i].color_mix
                    + geometry.nodes[edge.j].color_mix)
                    / 2.0;
                self.ramp.blend(mix, alpha)
            };
            surface.stroke_line(a.point(), b.point(), &Stroke::new(color, EDGE_WIDTH));
        }
    }

    fn paint_equator(&self, frame: &FrameProjection<'_>, surface: &mut dyn Surface) {
        let step = TAU / self.equator_samples.max(1) as f64;
        let points: Vec<Vec2> = (0..self.equator_samples)
            .map(|i| {
                let a = i as f64 * step;
                frame.project(DVec3::new(a.cos(), 0.0, a.sin())).point()
            })
            .collect();
        let stroke = Stroke::new(
            Rgba::from_rgb(self.palette.accent, EQUATOR_ALPHA),
            EQUATOR_WIDTH,
        );
        surface.stroke_polyline(&points, true, &stroke);
    }

    fn paint_nodes<R>(
        &self,
        geometry: &SphereGeometry,
        projected: &[Projected],
        simulator: &SceneSimulator<R>,
        surface: &mut dyn Surface,
    ) {
        let phases = simulator.pulse_phases();
        for (index, (node, p)) in geometry.nodes.iter().zip(projected).enumerate() {
            if p.depth < self.node_cull_depth {
                continue;
            }
            let pulse = (phases[index].sin() + 1.0) / 2.0;
            let radius = NODE_BASE_RADIUS * p.scale + NODE_PULSE_RADIUS * pulse;
            let alpha = depth_fade(p.depth) * (0.45 + 0.55 * pulse);
            let center = p.point();

            let halo = RadialGradient::new(
                center,
                (radius * NODE_HALO_SCALE) as f32,
                self.ramp.blend(node.color_mix, alpha * NODE_HALO_ALPHA),
                self.ramp.blend(node.color_mix, 0.0),
            );
            surface.fill_circle(center, (radius * NODE_HALO_SCALE) as f32, &halo.into());

            let core = if simulator.node_alarmed(index) {
                Rgba::from_rgb(self.palette.alarm, alpha as f32)
            } else {
                self.ramp.blend(node.color_mix, alpha)
            };
            surface.fill_circle(center, radius as f32, &Paint::Solid(core));
        }
    }

    fn paint_shadow(&self, frame: &FrameProjection<'_>, surface: &mut dyn Surface) {
        let center = frame.projector.center();
        let y = center.y + frame.projector.radius() + frame.float_offset + SHADOW_GAP;
        let shadow_center = Vec2::new(center.x as f32, y as f32);
        let primary = Rgba::from_rgb(self.palette.primary, SHADOW_ALPHA);
        let gradient = RadialGradient::new(
            shadow_center,
            SHADOW_RADII.x,
            primary,
            primary.faded(),
        );
        surface.fill_ellipse(shadow_center, SHADOW_RADII, &gradient.into());
    }
}

/// Maps depth in `[-1, 1]` to a `[0, 1]` fade.
fn depth_fade(depth: f64) -> f64 {
    ((depth + 1.0) / 2.0).max(0.0)
}

/// Rotation and float offset frozen for one frame.
struct FrameProjection<'a> {
    projector: &'a Projector,
    angle: f64,
    float_offset: f64,
}

impl FrameProjection<'_> {
    fn project(&self, point: DVec3) -> Projected {
        self.projector.project(point, self.angle, self.float_offset)
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec2;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::options::{AlertOptions, RingOptions};
    use crate::surface::{DrawCommand, RecordingSurface, SurfaceSize};

    struct Fixture {
        geometry: SphereGeometry,
        projector: Projector,
        simulator: SceneSimulator<StdRng>,
        painter: SpherePainter,
    }

    fn fixture(sphere: &SphereOptions) -> Fixture {
        let mut rng = StdRng::seed_from_u64(4);
        let geometry = SphereGeometry::generate(sphere, &mut rng);
        let rings: Vec<RingSpec> = sphere.rings.iter().map(RingSpec::from).collect();
        let simulator = SceneSimulator::new(
            sphere,
            &AlertOptions::default(),
            &geometry,
            &rings,
            rng,
        );
        Fixture {
            projector: Projector::from_options(sphere, DVec2::splat(160.0)),
            painter: SpherePainter::new(sphere, &PaletteOptions::default(), &rings),
            geometry,
            simulator,
        }
    }

    fn record(f: &Fixture) -> Vec<DrawCommand> {
        let mut surface = RecordingSurface::new(SurfaceSize::new(320, 320));
        f.painter.paint(&f.geometry, &f.projector, &f.simulator, &mut surface);
        surface.commands().to_vec()
    }

    fn closed_polylines(commands: &[DrawCommand], len: usize) -> Vec<usize> {
        commands
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                matches!(c, DrawCommand::Polyline { points, closed: true, .. } if points.len() == len)
            })
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn layers_are_painted_back_to_front() {
        let f = fixture(&SphereOptions::default());
        let commands = record(&f);

        assert_eq!(commands[0], DrawCommand::Clear);
        assert!(matches!(
            commands[1],
            DrawCommand::Circle { radius, .. } if (radius - 154.0).abs() < 1e-3
        ));
        assert!(matches!(commands.last(), Some(DrawCommand::Ellipse { .. })));

        // Three rings, each stroke followed by marker and halo.
        let rings = closed_polylines(&commands, 72);
        assert_eq!(rings, vec![2, 5, 8]);
        for &r in &rings {
            assert!(matches!(commands[r + 1], DrawCommand::Circle { radius, .. } if radius == 3.0));
            assert!(matches!(commands[r + 2], DrawCommand::Circle { radius, .. } if radius == 10.0));
        }

        // Edges sit between the rings and the equator, nodes after it.
        let equator = closed_polylines(&commands, 64);
        assert_eq!(equator.len(), 1);
        let equator = equator[0];
        assert!(commands[11..equator].iter().all(DrawCommand::is_segment));
        assert!(equator > 11);
        let nodes = &commands[equator + 1..commands.len() - 1];
        assert!(!nodes.is_empty());
        assert_eq!(nodes.len() % 2, 0);
        assert!(nodes.iter().all(|c| matches!(c, DrawCommand::Circle { .. })));
    }

    #[test]
    fn back_edges_and_nodes_are_culled() {
        let f = fixture(&SphereOptions::default());
        let commands = record(&f);
        let segments = commands.iter().filter(|c| c.is_segment()).count();
        assert!(segments > 0 && segments < f.geometry.edges.len());

        let equator = closed_polylines(&commands, 64)[0];
        let node_circles = commands.len() - 1 - (equator + 1);
        assert!(node_circles / 2 < f.geometry.nodes.len());
    }

    #[test]
    fn degenerate_ring_is_skipped() {
        let mut sphere = SphereOptions::default();
        sphere.rings.push(RingOptions {
            normal: [0.0, 0.0, 1.0],
            speed: 0.01,
            radius: 1.5,
            phase: 0.0,
        });
        sphere.rings.push(RingOptions {
            normal: [0.0, 0.0, 0.0],
            speed: 0.01,
            radius: 1.5,
            phase: 0.0,
        });
        let f = fixture(&sphere);
        assert_eq!(f.painter.drawable_rings(), 3);
        assert_eq!(closed_polylines(&record(&f), 72).len(), 3);
    }

    #[test]
    fn shadow_follows_the_float_offset() {
        let mut f = fixture(&SphereOptions::default());
        for frame in 0..200 {
            f.simulator.advance(f64::from(frame));
        }
        let offset = f.simulator.clock().float_offset;
        let commands = record(&f);
        let Some(DrawCommand::Ellipse { center, radii, .. }) = commands.last() else {
            panic!("shadow missing");
        };
        assert_eq!(*radii, SHADOW_RADII);
        assert!((f64::from(center.y) - (160.0 + 110.0 + 14.0 + offset)).abs() < 1e-3);
    }

    #[test]
    fn depth_fade_is_clamped() {
        assert_eq!(depth_fade(-3.0), 0.0);
        assert_eq!(depth_fade(1.0), 1.0);
        assert!((depth_fade(0.0) - 0.5).abs() < 1e-12);
    }
}
