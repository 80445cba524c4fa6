//! Ambient particle background.
//!
//! Free-drifting dots that bounce off the surface walls and pulse in
//! opacity. Every pair closer than the link distance is joined by a faint
//! line; that pairwise pass is O(n²) per frame and dominates the cost.
//! Independent from the sphere scene; shares only the palette.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{rngs::StdRng, Rng};

use crate::options::{Options, PaletteOptions, ParticleOptions};
use crate::scene::Scene;
use crate::surface::{Paint, Rgba, Stroke, Surface, SurfaceSize};

/// One drifting particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Position in surface pixels, kept inside the surface.
    pub position: Vec2,
    /// Displacement per frame, in pixels.
    pub velocity: Vec2,
    /// Circle radius in pixels.
    pub size: f32,
    /// Opacity before pulsing.
    pub base_alpha: f32,
    /// Opacity pulse phase, in radians.
    pub phase: f32,
    /// Color class: primary when `true`, secondary otherwise.
    pub green: bool,
}

impl Particle {
    /// Opacity at the current phase.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.base_alpha * (0.65 + 0.35 * self.phase.sin())
    }
}

/// A pair of particles close enough to be joined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    /// Lower particle index.
    pub i: usize,
    /// Higher particle index.
    pub j: usize,
    /// Euclidean distance in pixels.
    pub distance: f32,
}

/// The particle scene.
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    size: SurfaceSize,
    options: ParticleOptions,
    primary: [f32; 3],
    secondary: [f32; 3],
}

impl ParticleField {
    /// Scatter `options.count` particles uniformly over the surface.
    pub fn new(
        options: &ParticleOptions,
        palette: &PaletteOptions,
        size: SurfaceSize,
        rng: &mut impl Rng,
    ) -> Self {
        let (width, height) = bounds(size);
        let green_p = options.green_fraction.clamp(0.0, 1.0);
        let particles = (0..options.count)
            .map(|_| Particle {
                position: Vec2::new(
                    rng.random::<f32>() * width,
                    rng.random::<f32>() * height,
                ),
                velocity: Vec2::new(
                    (rng.random::<f32>() - 0.5) * options.max_speed,
                    (rng.random::<f32>() - 0.5) * options.max_speed,
                ),
                size: options.size_min + rng.random::<f32>() * options.size_jitter,
                base_alpha: options.alpha_min
                    + rng.random::<f32>() * options.alpha_jitter,
                phase: rng.random::<f32>() * TAU,
                green: rng.random_bool(green_p),
            })
            .collect();
        log::info!(
            "particle field: {} particles on {}x{}",
            options.count,
            size.width,
            size.height
        );
        Self::from_particles(options, palette, size, particles)
    }

    /// Field with the rng described by [`Options::rng`].
    #[must_use]
    pub fn from_options(options: &Options, size: SurfaceSize) -> Self {
        let mut rng: StdRng = options.rng();
        Self::new(&options.particles, &options.palette, size, &mut rng)
    }

    /// Field over explicit particles.
    #[must_use]
    pub fn from_particles(
        options: &ParticleOptions,
        palette: &PaletteOptions,
        size: SurfaceSize,
        particles: Vec<Particle>,
    ) -> Self {
        Self {
            particles,
            size,
            options: options.clone(),
            primary: palette.primary,
            secondary: palette.secondary,
        }
    }

    /// Current particles.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Surface the particles are confined to.
    #[must_use]
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Every unique pair closer than the link distance.
    #[must_use]
    pub fn links(&self) -> Vec<Link> {
        let max = self.options.link_distance;
        let mut links = Vec::new();
        for (i, a) in self.particles.iter().enumerate() {
            for (offset, b) in self.particles[i + 1..].iter().enumerate() {
                let distance = a.position.distance(b.position);
                if distance < max {
                    links.push(Link {
                        i,
                        j: i + 1 + offset,
                        distance,
                    });
                }
            }
        }
        links
    }

    fn color(&self, green: bool) -> [f32; 3] {
        if green {
            self.primary
        } else {
            self.secondary
        }
    }
}

impl Scene for ParticleField {
    fn advance(&mut self, _timestamp_ms: f64) {
        let (width, height) = bounds(self.size);
        for p in &mut self.particles {
            p.phase += self.options.pulse_step;
            p.position += p.velocity;
            reflect(&mut p.position.x, &mut p.velocity.x, width);
            reflect(&mut p.position.y, &mut p.velocity.y, height);
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear();
        for p in &self.particles {
            let color = Rgba::from_rgb(self.color(p.green), p.alpha());
            surface.fill_circle(p.position, p.size, &Paint::Solid(color));
        }
        let max = self.options.link_distance;
        for link in self.links() {
            let (a, b) = (&self.particles[link.i], &self.particles[link.j]);
            let alpha = self.options.link_alpha * (1.0 - link.distance / max);
            let stroke = Stroke::new(
                Rgba::from_rgb(self.color(a.green && b.green), alpha),
                self.options.link_width,
            );
            surface.stroke_line(a.position, b.position, &stroke);
        }
    }

    fn resize(&mut self, size: SurfaceSize) {
        // Hidden or collapsed hosts report 0x0; reflecting against that
        // would pile every particle onto the origin.
        if size.is_empty() {
            log::debug!("ignoring empty resize {}x{}", size.width, size.height);
            return;
        }
        log::debug!("particle field resized to {}x{}", size.width, size.height);
        self.size = size;
    }
}

fn bounds(size: SurfaceSize) -> (f32, f32) {
    (size.width as f32, size.height as f32)
}

/// Bounce one axis off the walls at `0` and `max`. A step that crosses a
/// wall is mirrored back inside and its velocity negated. A particle that
/// was already outside (the surface shrank under it) is put on the wall
/// and turned inward instead.
fn reflect(position: &mut f32, velocity: &mut f32, max: f32) {
    let previous = *position - *velocity;
    let was_inside = (0.0..=max).contains(&previous);
    if *position < 0.0 {
        *position = if was_inside { -*position } else { 0.0 };
        *velocity = velocity.abs();
    } else if *position > max {
        *position = if was_inside { 2.0 * max - *position } else { max };
        *velocity = -velocity.abs();
    } else {
        return;
    }
    *position = position.clamp(0.0, max);
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::surface::{DrawCommand, RecordingSurface};

    fn field(seed: u64, size: SurfaceSize) -> ParticleField {
        let mut rng = StdRng::seed_from_u64(seed);
        ParticleField::new(
            &ParticleOptions::default(),
            &PaletteOptions::default(),
            size,
            &mut rng,
        )
    }

    fn still(position: Vec2) -> Particle {
        Particle {
            position,
            velocity: Vec2::ZERO,
            size: 1.0,
            base_alpha: 0.5,
            phase: 0.0,
            green: true,
        }
    }

    fn in_bounds(field: &ParticleField) -> bool {
        let (w, h) = bounds(field.size());
        field.particles().iter().all(|p| {
            (0.0..=w).contains(&p.position.x) && (0.0..=h).contains(&p.position.y)
        })
    }

    #[test]
    fn initial_particles_match_the_options() {
        let f = field(1, SurfaceSize::new(800, 600));
        assert_eq!(f.particles().len(), 110);
        assert!(in_bounds(&f));
        for p in f.particles() {
            assert!(p.velocity.x.abs() <= 0.225 && p.velocity.y.abs() <= 0.225);
            assert!((0.4..=2.2).contains(&p.size));
            assert!((0.1..=0.65).contains(&p.base_alpha));
        }
    }

    #[test]
    fn particles_stay_inside_after_many_frames() {
        let mut f = field(2, SurfaceSize::new(300, 200));
        for frame in 0..20_000 {
            f.advance(f64::from(frame));
        }
        assert!(in_bounds(&f));
    }

    #[test]
    fn wall_crossing_flips_velocity_once() {
        let options = ParticleOptions::default();
        let mut p = still(Vec2::new(99.9, 50.0));
        p.velocity = Vec2::new(0.3, 0.0);
        let mut f = ParticleField::from_particles(
            &options,
            &PaletteOptions::default(),
            SurfaceSize::new(100, 100),
            vec![p],
        );

        f.advance(0.0);
        let after = f.particles()[0];
        assert!((after.velocity.x + 0.3).abs() < 1e-6);
        assert!((after.position.x - 99.8).abs() < 1e-4);

        // Heading back inside: no second flip on the following step.
        f.advance(16.0);
        assert!((f.particles()[0].velocity.x + 0.3).abs() < 1e-6);
        assert_eq!(f.particles()[0].velocity.y, 0.0);
    }

    #[test]
    fn shrink_clamps_stragglers_onto_the_wall() {
        let mut p = still(Vec2::new(700.0, 50.0));
        p.velocity = Vec2::new(0.2, 0.0);
        let mut f = ParticleField::from_particles(
            &ParticleOptions::default(),
            &PaletteOptions::default(),
            SurfaceSize::new(800, 100),
            vec![p],
        );
        f.resize(SurfaceSize::new(400, 100));
        assert_eq!(f.particles()[0].position.x, 700.0);

        f.advance(0.0);
        let p = f.particles()[0];
        assert_eq!(p.position.x, 400.0);
        assert!(p.velocity.x < 0.0);
        f.advance(16.0);
        assert!(f.particles()[0].position.x < 400.0);
    }

    #[test]
    fn resize_keeps_particles() {
        let mut f = field(3, SurfaceSize::new(640, 480));
        let before = f.particles().to_vec();
        f.resize(SurfaceSize::new(1280, 720));
        assert_eq!(f.particles(), before.as_slice());
        assert_eq!(f.size(), SurfaceSize::new(1280, 720));
    }

    #[test]
    fn empty_resize_keeps_the_spread() {
        let size = SurfaceSize::new(800, 600);
        let mut f = field(11, size);
        f.resize(SurfaceSize::new(0, 0));
        assert_eq!(f.size(), size);
        f.advance(16.0);
        f.resize(size);
        for frame in 0..60 {
            f.advance(32.0 + 16.0 * f64::from(frame));
        }

        let at_origin = f
            .particles()
            .iter()
            .filter(|p| p.position == Vec2::ZERO)
            .count();
        assert_eq!(at_origin, 0);
        let max_x = f
            .particles()
            .iter()
            .map(|p| p.position.x)
            .fold(0.0, f32::max);
        assert!(max_x > 400.0, "particles collapsed to x <= {max_x}");
        assert!(in_bounds(&f));
    }

    #[test]
    fn still_particles_link_by_fixed_distance() {
        // Spaced 100 px apart on a line: only neighbours are under 125 px.
        let particles: Vec<Particle> = (0..6)
            .map(|i| still(Vec2::new(10.0 + 100.0 * i as f32, 50.0)))
            .collect();
        let mut f = ParticleField::from_particles(
            &ParticleOptions::default(),
            &PaletteOptions::default(),
            SurfaceSize::new(700, 100),
            particles,
        );
        for frame in 0..10 {
            f.advance(f64::from(frame));
        }
        let links = f.links();
        assert_eq!(links.len(), 5);
        assert!(links.iter().all(|l| l.j == l.i + 1 && (l.distance - 100.0).abs() < 1e-3));
    }

    #[test]
    fn zero_velocity_link_count_matches_brute_force() {
        let mut f = field(4, SurfaceSize::new(1024, 768));
        for p in &mut f.particles {
            p.velocity = Vec2::ZERO;
        }
        let positions: Vec<Vec2> = f.particles().iter().map(|p| p.position).collect();
        let mut expected = 0;
        for i in 0..positions.len() {
            for j in i + 1..positions.len() {
                if positions[i].distance(positions[j]) < 125.0 {
                    expected += 1;
                }
            }
        }
        for frame in 0..30 {
            f.advance(f64::from(frame));
        }
        assert_eq!(f.links().len(), expected);
    }

    #[test]
    fn draw_paints_particles_then_links() {
        let particles = vec![
            still(Vec2::new(10.0, 10.0)),
            Particle {
                green: false,
                ..still(Vec2::new(60.0, 10.0))
            },
        ];
        let f = ParticleField::from_particles(
            &ParticleOptions::default(),
            &PaletteOptions::default(),
            SurfaceSize::new(100, 100),
            particles,
        );
        let mut surface = RecordingSurface::new(f.size());
        f.draw(&mut surface);
        let commands = surface.commands();
        assert_eq!(commands.len(), 4);
        assert_eq!(commands[0], DrawCommand::Clear);
        let DrawCommand::Polyline { stroke, .. } = &commands[3] else {
            panic!("expected link, got {:?}", commands[3]);
        };
        // Mixed pair uses the secondary color; alpha fades with distance.
        assert_eq!(stroke.color.b, PaletteOptions::default().secondary[2]);
        assert!((stroke.color.a - 0.1 * (1.0 - 50.0 / 125.0)).abs() < 1e-6);
        assert_eq!(stroke.width, 0.5);
    }
}
