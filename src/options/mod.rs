//! Centralized scene options with TOML preset support.
//!
//! Every tweakable constant of the two scenes (sphere layout, rotation and
//! float speeds, ring constants, alert-flash timing, particle counts,
//! transaction graph thresholds, the shared palette) is consolidated here.
//! Options serialize to/from TOML for presets stored in `assets/presets/`.

mod alert;
mod graph;
mod palette;
mod particles;
mod sphere;

use std::path::Path;

pub use alert::AlertOptions;
pub use graph::GraphOptions;
pub use palette::PaletteOptions;
pub use particles::ParticleOptions;
use rand::{rngs::StdRng, SeedableRng};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use sphere::{RingOptions, SphereOptions};

use crate::error::VizError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[particles]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Fixed RNG seed. `None` seeds from the operating system so every
    /// activation looks different.
    #[schemars(skip)]
    pub seed: Option<u64>,
    /// Sphere layout, motion and ring parameters.
    pub sphere: SphereOptions,
    /// Alert-flash timing and recolor probabilities.
    pub alert: AlertOptions,
    /// Ambient particle field parameters.
    pub particles: ParticleOptions,
    /// Transaction graph styling thresholds.
    pub graph: GraphOptions,
    /// Shared color palette.
    #[schemars(skip)]
    pub palette: PaletteOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, VizError> {
        let content = std::fs::read_to_string(path).map_err(VizError::Io)?;
        Self::from_toml(&content)
    }

    /// Parse options from TOML text. Missing fields use defaults.
    pub fn from_toml(content: &str) -> Result<Self, VizError> {
        toml::from_str(content)
            .map_err(|e| VizError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), VizError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| VizError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(VizError::Io)?;
        }
        std::fs::write(path, content).map_err(VizError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }

    /// Random source for a fresh scene activation: seeded when
    /// [`seed`](Self::seed) is set, OS entropy otherwise.
    #[must_use]
    pub fn rng(&self) -> StdRng {
        self.seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64)
    }
}
