use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One orbital ring around the sphere.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RingOptions {
    /// Ring plane normal. Must be non-zero and not parallel to +Z, or the
    /// ring is skipped when drawn.
    pub normal: [f64; 3],
    /// Signed phase increment per frame, in radians.
    pub speed: f64,
    /// Ring radius as a multiple of the sphere radius.
    pub radius: f64,
    /// Phase at activation, in radians.
    pub phase: f64,
}

impl RingOptions {
    fn new(normal: [f64; 3], speed: f64, radius: f64, phase: f64) -> Self {
        Self {
            normal,
            speed,
            radius,
            phase,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Sphere", inline)]
#[serde(default)]
/// Layout, projection and motion parameters for the rotating sphere.
pub struct SphereOptions {
    /// Number of Fibonacci-sphere nodes.
    #[schemars(title = "Nodes", range(min = 1, max = 400))]
    pub node_count: usize,
    /// Squared unit-sphere distance below which two nodes are joined.
    #[schemars(title = "Edge Threshold", range(min = 0.0, max = 1.0), extend("step" = 0.01))]
    pub edge_threshold_sq: f64,
    /// Sphere radius in pixels.
    #[schemars(skip)]
    pub radius: f64,
    /// Canvas width the sphere is laid out for, in pixels.
    #[schemars(skip)]
    pub canvas_width: u32,
    /// Canvas height the sphere is laid out for, in pixels.
    #[schemars(skip)]
    pub canvas_height: u32,
    /// Yaw increment per frame, in radians.
    #[schemars(title = "Rotation Speed", range(min = 0.0, max = 0.05), extend("step" = 0.001))]
    pub rotation_step: f64,
    /// Vertical float increment per frame, in pixels.
    #[schemars(title = "Float Speed", range(min = 0.0, max = 0.2), extend("step" = 0.002))]
    pub float_step: f64,
    /// Bound of the vertical float ping-pong, in pixels.
    #[schemars(title = "Float Amplitude", range(min = 0.0, max = 20.0), extend("step" = 0.5))]
    pub float_amplitude: f64,
    /// Fixed pitch tilt, in radians.
    #[schemars(skip)]
    pub tilt: f64,
    /// Weak-perspective gain: `scale = 1 + depth * perspective`.
    #[schemars(skip)]
    pub perspective: f64,
    /// Minimum per-frame node pulse increment.
    #[schemars(skip)]
    pub pulse_speed_min: f64,
    /// Random extra pulse increment on top of the minimum.
    #[schemars(skip)]
    pub pulse_speed_jitter: f64,
    /// Edges whose endpoints are both below this depth are culled.
    #[schemars(skip)]
    pub edge_cull_depth: f64,
    /// Nodes below this depth are culled.
    #[schemars(skip)]
    pub node_cull_depth: f64,
    /// Samples per ring polyline.
    #[schemars(skip)]
    pub ring_samples: usize,
    /// Samples on the equator guide.
    #[schemars(skip)]
    pub equator_samples: usize,
    /// Orbital rings.
    #[schemars(skip)]
    pub rings: Vec<RingOptions>,
}

impl Default for SphereOptions {
    fn default() -> Self {
        Self {
            node_count: 88,
            edge_threshold_sq: 0.22,
            radius: 110.0,
            canvas_width: 320,
            canvas_height: 320,
            rotation_step: 0.004,
            float_step: 0.012,
            float_amplitude: 6.0,
            tilt: 0.28,
            perspective: 0.18,
            pulse_speed_min: 0.012,
            pulse_speed_jitter: 0.022,
            edge_cull_depth: -0.4,
            node_cull_depth: -0.55,
            ring_samples: 72,
            equator_samples: 64,
            rings: vec![
                RingOptions::new([0.3, 1.0, 0.2], 0.005, 1.22, 0.0),
                RingOptions::new([0.9, 0.2, 0.4], -0.007, 1.12, 1.8),
                RingOptions::new([0.1, 0.5, 0.85], 0.004, 1.32, 3.5),
            ],
        }
    }
}
