//! Engine configuration
//!
//! All scheduling policy in one place. Defaults are authoritative; a
//! persisted override document in the data directory can replace individual
//! keys at startup. The loop itself never mutates config.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum minutes between reflections.
    pub reflection_interval_min: u64,
    /// Maximum minutes between reflections.
    pub reflection_interval_max: u64,
    /// Probability of a deep reflection (reserved tuning knob).
    pub deep_reflection_probability: f64,
    /// Daily cap enforced by the scheduler loop.
    pub max_reflections_per_day: u32,
    /// Quiet window start hour (0-23). A start after the end wraps midnight.
    pub quiet_hours_start: u32,
    /// Quiet window end hour (0-23).
    pub quiet_hours_end: u32,
    pub enable_creative_mode: bool,
    pub enable_philosophical_mode: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reflection_interval_min: 15,
            reflection_interval_max: 45,
            deep_reflection_probability: 0.3,
            max_reflections_per_day: 48,
            quiet_hours_start: 23,
            quiet_hours_end: 6,
            enable_creative_mode: true,
            enable_philosophical_mode: true,
        }
    }
}

impl EngineConfig {
    /// Load config from a JSON override document, falling back to defaults.
    /// Keys missing from the document keep their default values; unknown
    /// keys are ignored.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {} — using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("No config at {} — using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Render as a pretty JSON document (for `--dump-config`).
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
