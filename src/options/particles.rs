use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Particles", inline)]
#[serde(default)]
/// Ambient particle field parameters.
pub struct ParticleOptions {
    /// Number of particles created at activation.
    #[schemars(title = "Count", range(min = 0, max = 400))]
    pub count: usize,
    /// Per-axis velocity is drawn from `[-max_speed / 2, max_speed / 2]`
    /// pixels per frame.
    #[schemars(title = "Speed", range(min = 0.0, max = 3.0), extend("step" = 0.05))]
    pub max_speed: f32,
    /// Smallest particle radius, in pixels.
    #[schemars(skip)]
    pub size_min: f32,
    /// Random extra radius on top of the minimum.
    #[schemars(skip)]
    pub size_jitter: f32,
    /// Smallest base alpha.
    #[schemars(skip)]
    pub alpha_min: f32,
    /// Random extra base alpha on top of the minimum.
    #[schemars(skip)]
    pub alpha_jitter: f32,
    /// Opacity pulse increment per frame, in radians.
    #[schemars(skip)]
    pub pulse_step: f32,
    /// Fraction of particles in the green color class.
    #[schemars(title = "Green Fraction", range(min = 0.0, max = 1.0), extend("step" = 0.05))]
    pub green_fraction: f64,
    /// Particles closer than this are linked, in pixels.
    #[schemars(title = "Link Distance", range(min = 0.0, max = 400.0), extend("step" = 5.0))]
    pub link_distance: f32,
    /// Link alpha at zero distance; fades linearly to zero at
    /// `link_distance`.
    #[schemars(skip)]
    pub link_alpha: f32,
    /// Link stroke width, in pixels.
    #[schemars(skip)]
    pub link_width: f32,
}

impl Default for ParticleOptions {
    fn default() -> Self {
        Self {
            count: 110,
            max_speed: 0.45,
            size_min: 0.4,
            size_jitter: 1.8,
            alpha_min: 0.1,
            alpha_jitter: 0.55,
            pulse_step: 0.018,
            green_fraction: 0.4,
            link_distance: 125.0,
            link_alpha: 0.1,
            link_width: 0.5,
        }
    }
}
