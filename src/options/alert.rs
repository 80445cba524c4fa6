use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Alert Flash", inline)]
#[serde(default)]
/// Timing of the cosmetic alarm flash on the sphere.
pub struct AlertOptions {
    /// Shortest wait between two flashes, in milliseconds.
    #[schemars(title = "Min Interval (ms)", range(min = 500.0, max = 30000.0), extend("step" = 100.0))]
    pub min_interval_ms: f64,
    /// Random extra wait added on top of the minimum, in milliseconds.
    #[schemars(title = "Jitter (ms)", range(min = 0.0, max = 10000.0), extend("step" = 100.0))]
    pub jitter_ms: f64,
    /// How long a flash lasts, in milliseconds.
    #[schemars(title = "Duration (ms)", range(min = 16.0, max = 2000.0), extend("step" = 4.0))]
    pub duration_ms: f64,
    /// Chance that an edge is drawn in the alarm color during a flash,
    /// re-rolled every frame.
    #[schemars(skip)]
    pub edge_probability: f64,
    /// Chance that a node is drawn in the alarm color during a flash,
    /// re-rolled every frame.
    #[schemars(skip)]
    pub node_probability: f64,
}

impl Default for AlertOptions {
    fn default() -> Self {
        Self {
            min_interval_ms: 4800.0,
            jitter_ms: 2200.0,
            duration_ms: 280.0,
            edge_probability: 0.08,
            node_probability: 0.1,
        }
    }
}
