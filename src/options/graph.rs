use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Transaction Graph", inline)]
#[serde(default)]
/// Styling thresholds handed to the force-directed transaction graph.
pub struct GraphOptions {
    /// Links at most this many days old count as fresh.
    #[schemars(title = "Fresh (days)", range(min = 0.0, max = 90.0), extend("step" = 1.0))]
    pub fresh_days: f64,
    /// Links at most this many days old (and not fresh) count as recent.
    #[schemars(title = "Recent (days)", range(min = 0.0, max = 365.0), extend("step" = 1.0))]
    pub recent_days: f64,
    /// Narrowest link stroke, in pixels.
    #[schemars(title = "Min Link Width", range(min = 0.5, max = 5.0), extend("step" = 0.1))]
    pub min_link_width: f64,
    /// Opacity of links older than the recent tier.
    #[schemars(skip)]
    pub stale_link_alpha: f32,
    /// Directional particles running along each fresh link.
    #[schemars(title = "Fresh Link Particles", range(min = 0, max = 10))]
    pub fresh_link_particles: u32,
    /// Glow radius around a suspicious node at rest, in pixels.
    #[schemars(skip)]
    pub glow_radius: f32,
    /// How far the glow radius swings either way, in pixels.
    #[schemars(skip)]
    pub glow_amplitude: f32,
    /// Time constant of the glow swing: the radius follows
    /// `sin(t / glow_period_ms)`.
    #[schemars(skip)]
    pub glow_period_ms: f64,
    /// Glow opacity at the node center.
    #[schemars(skip)]
    pub glow_alpha: f32,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            fresh_days: 7.0,
            recent_days: 30.0,
            min_link_width: 1.2,
            stale_link_alpha: 0.35,
            fresh_link_particles: 3,
            glow_radius: 10.0,
            glow_amplitude: 3.5,
            glow_period_ms: 900.0,
            glow_alpha: 0.35,
        }
    }
}
