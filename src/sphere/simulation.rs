//! Per-frame state of the sphere scene.
//!
//! Everything time-varying lives here: rotation, the float ping-pong,
//! ring and pulse phases, and the alert flash. Motion is frame-coupled
//! (fixed increments per call) rather than wall-clock-coupled; only the
//! alert flash reads the host timestamp.

use rand::Rng;

use crate::options::{AlertOptions, SphereOptions};
use crate::sphere::geometry::SphereGeometry;
use crate::sphere::ring::RingSpec;

/// Global motion state shared by every element of the sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationClock {
    /// Accumulated yaw in radians. Unbounded; only consumed through
    /// trigonometry.
    pub rotation_angle: f64,
    /// Vertical bob in pixels, within `[-amplitude, amplitude]`.
    pub float_offset: f64,
    /// Direction of the bob: `1.0` or `-1.0`.
    pub float_direction: f64,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self {
            rotation_angle: 0.0,
            float_offset: 0.0,
            float_direction: 1.0,
        }
    }
}

impl SimulationClock {
    /// Advance rotation and bob by one frame. Returns `true` when the bob
    /// reversed direction on this step.
    pub fn step(&mut self, rotation_step: f64, float_step: f64, amplitude: f64) -> bool {
        self.rotation_angle += rotation_step;
        self.float_offset += float_step * self.float_direction;
        if self.float_offset.abs() <= amplitude {
            return false;
        }
        // Mirror the overshoot back inside and reverse.
        let bound = amplitude.copysign(self.float_offset);
        self.float_offset = 2.0 * bound - self.float_offset;
        self.float_direction = -self.float_direction;
        true
    }
}

/// Randomly timed cosmetic alarm flash.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertWindow {
    last_start_ms: f64,
    window_end_ms: f64,
    next_wait_ms: f64,
}

impl AlertWindow {
    /// Closed window whose first wait is drawn from the rng.
    pub fn new(options: &AlertOptions, rng: &mut impl Rng) -> Self {
        Self {
            last_start_ms: 0.0,
            window_end_ms: 0.0,
            next_wait_ms: draw_wait(options, rng),
        }
    }

    /// Open a new window when the previous one has ended and the drawn
    /// wait has elapsed. Returns `true` when a window opened.
    pub fn update(
        &mut self,
        now_ms: f64,
        options: &AlertOptions,
        rng: &mut impl Rng,
    ) -> bool {
        if now_ms < self.window_end_ms
            || now_ms - self.last_start_ms <= self.next_wait_ms
        {
            return false;
        }
        self.last_start_ms = now_ms;
        self.window_end_ms = now_ms + options.duration_ms;
        self.next_wait_ms = draw_wait(options, rng);
        true
    }

    /// Whether a flash is showing at `now_ms`.
    #[must_use]
    pub fn is_open(&self, now_ms: f64) -> bool {
        now_ms >= self.last_start_ms && now_ms < self.window_end_ms
    }

    /// End of the current or most recent window.
    #[must_use]
    pub fn window_end_ms(&self) -> f64 {
        self.window_end_ms
    }

    /// Wait before the next window may open, measured from the last start.
    #[must_use]
    pub fn next_wait_ms(&self) -> f64 {
        self.next_wait_ms
    }
}

fn draw_wait(options: &AlertOptions, rng: &mut impl Rng) -> f64 {
    options.min_interval_ms + rng.random::<f64>() * options.jitter_ms
}

/// Advances every time-varying quantity of the sphere scene.
#[derive(Debug, Clone)]
pub struct SceneSimulator<R> {
    sphere: SphereOptions,
    alert_options: AlertOptions,
    clock: SimulationClock,
    alert: AlertWindow,
    alert_active: bool,
    ring_speeds: Vec<f64>,
    ring_phases: Vec<f64>,
    pulse_speeds: Vec<f64>,
    pulse_phases: Vec<f64>,
    alarm_edges: Vec<bool>,
    alarm_nodes: Vec<bool>,
    rng: R,
}

impl<R: Rng> SceneSimulator<R> {
    /// Initial state for freshly generated geometry. Pulse phases start at
    /// random offsets so the nodes do not throb in unison.
    pub fn new(
        sphere: &SphereOptions,
        alert: &AlertOptions,
        geometry: &SphereGeometry,
        rings: &[RingSpec],
        mut rng: R,
    ) -> Self {
        let pulse_phases = geometry
            .nodes
            .iter()
            .map(|_| rng.random::<f64>() * std::f64::consts::TAU)
            .collect();
        let alert_window = AlertWindow::new(alert, &mut rng);
        Self {
            sphere: sphere.clone(),
            alert_options: alert.clone(),
            clock: SimulationClock::default(),
            alert: alert_window,
            alert_active: false,
            ring_speeds: rings.iter().map(|r| r.speed).collect(),
            ring_phases: rings.iter().map(|r| r.initial_phase).collect(),
            pulse_speeds: geometry.nodes.iter().map(|n| n.pulse_speed).collect(),
            pulse_phases,
            alarm_edges: vec![false; geometry.edges.len()],
            alarm_nodes: vec![false; geometry.nodes.len()],
            rng,
        }
    }

    /// Advance one frame.
    pub fn advance(&mut self, timestamp_ms: f64) {
        let _ = self.clock.step(
            self.sphere.rotation_step,
            self.sphere.float_step,
            self.sphere.float_amplitude,
        );

        for (phase, speed) in self.ring_phases.iter_mut().zip(&self.ring_speeds) {
            *phase += speed;
        }
        for (phase, speed) in
            self.pulse_phases.iter_mut().zip(&self.pulse_speeds)
        {
            *phase += speed;
        }

        if self.alert.update(timestamp_ms, &self.alert_options, &mut self.rng) {
            log::debug!(
                "alert flash at {timestamp_ms:.0} ms, next in {:.0} ms",
                self.alert.next_wait_ms()
            );
        }
        self.alert_active = self.alert.is_open(timestamp_ms);
        self.roll_alarms();
    }

    /// Re-roll which elements flash. Not sticky: every frame of a window
    /// draws afresh, and outside a window nothing flashes.
    fn roll_alarms(&mut self) {
        if !self.alert_active {
            self.alarm_edges.fill(false);
            self.alarm_nodes.fill(false);
            return;
        }
        let edge_p = self.alert_options.edge_probability.clamp(0.0, 1.0);
        let node_p = self.alert_options.node_probability.clamp(0.0, 1.0);
        for flag in &mut self.alarm_edges {
            *flag = self.rng.random_bool(edge_p);
        }
        for flag in &mut self.alarm_nodes {
            *flag = self.rng.random_bool(node_p);
        }
    }

}

impl<R> SceneSimulator<R> {
    /// Current motion state.
    #[must_use]
    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Alert window state.
    #[must_use]
    pub fn alert(&self) -> &AlertWindow {
        &self.alert
    }

    /// Whether the alarm flash was showing on the last advanced frame.
    #[must_use]
    pub fn alert_active(&self) -> bool {
        self.alert_active
    }

    /// Phase of every ring, in ring order.
    #[must_use]
    pub fn ring_phases(&self) -> &[f64] {
        &self.ring_phases
    }

    /// Pulse phase of every node, in node order.
    #[must_use]
    pub fn pulse_phases(&self) -> &[f64] {
        &self.pulse_phases
    }

    /// Whether an edge is drawn in the alarm color this frame.
    #[must_use]
    pub fn edge_alarmed(&self, edge: usize) -> bool {
        self.alarm_edges.get(edge).copied().unwrap_or(false)
    }

    /// Whether a node is drawn in the alarm color this frame.
    #[must_use]
    pub fn node_alarmed(&self, node: usize) -> bool {
        self.alarm_nodes.get(node).copied().unwrap_or(false)
    }
}
