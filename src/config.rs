//! Engine configuration

use crate::debug::DebugConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for [`crate::EventDirector`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Re-read every event's active page at the start of each frame
    pub refresh_handlers_each_frame: bool,
    /// Radius of a proximity trigger condition that omits one
    pub default_proximity_radius: i32,
    /// Seed for random variable operands; `None` seeds from entropy
    pub rng_seed: Option<u64>,
    pub debug: DebugConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            refresh_handlers_each_frame: true,
            default_proximity_radius: 1,
            rng_seed: None,
            debug: DebugConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load a JSON config file; missing fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid engine config")
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}
