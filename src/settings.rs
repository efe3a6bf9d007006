//! Simulation tuning
//!
//! Loaded once at startup from JSON. Every field has a default so a partial
//! file (or none at all) is fine; whatever is loaded is validated before the
//! simulation sees it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{ConfigError, require_positive};
use crate::sim::{DamagePolicy, DamageScaling};

/// Simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Cleaning ===
    /// Which targets a clean-hit lands on
    pub damage_policy: DamagePolicy,
    /// Damage per clean-hit before the tool's power multiplier
    pub base_power: f32,
    /// Per hit (edge-triggered input) or per second (held input)
    pub damage_scaling: DamageScaling,
    /// Honour each target's required tool
    pub require_correct_tool: bool,
    /// Tool kinds allowed to clean at all (empty = every kind)
    pub allowed_tool_kinds: Vec<String>,

    // === Reach ===
    /// Radius of the built-in dirt sensor
    pub interaction_range: f32,
    /// How far the agent can reach to pick something up
    pub pickup_range: f32,
    /// Distance in front of the agent where dropped items land
    pub drop_distance: f32,

    // === Autopilot ===
    /// Walking speed (units per second)
    pub agent_speed: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            damage_policy: DamagePolicy::SingleClosest,
            base_power: DEFAULT_BASE_POWER,
            damage_scaling: DamageScaling::PerHit,
            require_correct_tool: true,
            allowed_tool_kinds: Vec::new(),

            interaction_range: DEFAULT_INTERACTION_RANGE,
            pickup_range: DEFAULT_PICKUP_RANGE,
            drop_distance: DEFAULT_DROP_DISTANCE,

            agent_speed: DEFAULT_AGENT_SPEED,
        }
    }
}

impl Settings {
    /// Parse and validate settings from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("base_power", self.base_power)?;
        require_positive("interaction_range", self.interaction_range)?;
        require_positive("pickup_range", self.pickup_range)?;
        require_positive("agent_speed", self.agent_speed)?;
        if !self.drop_distance.is_finite() || self.drop_distance < 0.0 {
            return Err(ConfigError::invalid(
                "drop_distance",
                format!("{} must be finite and >= 0", self.drop_distance),
            ));
        }
        if let Some(empty) = self.allowed_tool_kinds.iter().position(|k| k.is_empty()) {
            return Err(ConfigError::invalid(
                format!("allowed_tool_kinds[{empty}]"),
                "tool kind must not be empty",
            ));
        }
        Ok(())
    }
}
