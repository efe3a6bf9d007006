//! Scene authoring format
//!
//! A scene lists the dirt, tools, props and doors to spawn, with the starting
//! values the simulation treats as fixed configuration. Scenes are either
//! loaded from JSON or generated from a seed.

use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{ConfigError, require_positive};

/// Tool kinds the generator hands out
pub const GENERATED_TOOL_KINDS: [&str; 3] = ["Sponge", "Mop", "Vacuum"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirtSpec {
    pub position: [f32; 3],
    #[serde(default = "default_dirt_health")]
    pub max_health: f32,
    /// Tool kind required to clean it (absent or empty = any)
    #[serde(default)]
    pub required_tool: Option<String>,
}

fn default_dirt_health() -> f32 {
    DEFAULT_DIRT_HEALTH
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub kind: String,
    #[serde(default = "default_tool_power")]
    pub power: f32,
    /// Charges; absent = unlimited
    #[serde(default)]
    pub remaining_uses: Option<u32>,
    pub position: [f32; 3],
}

fn default_tool_power() -> f32 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropSpec {
    pub position: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorSpec {
    pub position: [f32; 3],
    #[serde(default)]
    pub open: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub agent_start: [f32; 3],
    pub dirt: Vec<DirtSpec>,
    pub tools: Vec<ToolSpec>,
    pub props: Vec<PropSpec>,
    pub doors: Vec<DoorSpec>,
}

impl SceneConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let scene: Self = serde_json::from_str(json)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scene = Self::from_json_str(&json)?;
        log::info!("Loaded scene from {}", path.display());
        Ok(scene)
    }

    /// Check the data model invariants before anything is spawned
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_position("agent_start", self.agent_start)?;
        for (i, dirt) in self.dirt.iter().enumerate() {
            check_position(&format!("dirt[{i}].position"), dirt.position)?;
            require_positive(&format!("dirt[{i}].max_health"), dirt.max_health)?;
        }
        for (i, tool) in self.tools.iter().enumerate() {
            check_position(&format!("tools[{i}].position"), tool.position)?;
            require_positive(&format!("tools[{i}].power"), tool.power)?;
            if tool.kind.is_empty() {
                return Err(ConfigError::invalid(
                    format!("tools[{i}].kind"),
                    "tool kind must not be empty",
                ));
            }
            if tool.remaining_uses == Some(0) {
                return Err(ConfigError::invalid(
                    format!("tools[{i}].remaining_uses"),
                    "a tool must start with at least one use",
                ));
            }
        }
        for (i, prop) in self.props.iter().enumerate() {
            check_position(&format!("props[{i}].position"), prop.position)?;
        }
        for (i, door) in self.doors.iter().enumerate() {
            check_position(&format!("doors[{i}].position"), door.position)?;
        }
        Ok(())
    }

    /// Deterministic scene from a seed.
    ///
    /// One tool of each generated kind, so every dirt spot is cleanable. The
    /// sponge wears out, the others do not.
    pub fn generate(seed: u64, dirt_count: usize) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let extent = GENERATED_FLOOR_HALF_EXTENT;
        let floor_point = |rng: &mut Pcg32| -> [f32; 3] {
            [
                rng.random_range(-extent..extent),
                0.0,
                rng.random_range(-extent..extent),
            ]
        };

        let tools = GENERATED_TOOL_KINDS
            .iter()
            .map(|&kind| ToolSpec {
                kind: kind.to_string(),
                power: rng.random_range(1.0..2.0),
                remaining_uses: (kind == "Sponge").then(|| rng.random_range(20..40)),
                position: floor_point(&mut rng),
            })
            .collect();

        let dirt = (0..dirt_count)
            .map(|_| {
                // ~25% accept any tool
                let required_tool = if rng.random_bool(0.25) {
                    None
                } else {
                    let pick = rng.random_range(0..GENERATED_TOOL_KINDS.len());
                    Some(GENERATED_TOOL_KINDS[pick].to_string())
                };
                DirtSpec {
                    position: floor_point(&mut rng),
                    max_health: rng.random_range(5.0..20.0),
                    required_tool,
                }
            })
            .collect();

        let props = vec![PropSpec {
            position: floor_point(&mut rng),
        }];
        let doors = vec![DoorSpec {
            position: [0.0, 0.0, -extent],
            open: false,
        }];

        log::info!("Generated scene: seed={seed}, dirt={dirt_count}");
        Self {
            agent_start: [0.0, 0.0, 0.0],
            dirt,
            tools,
            props,
            doors,
        }
    }
}

fn check_position(field: &str, position: [f32; 3]) -> Result<(), ConfigError> {
    if position.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{position:?} is not finite")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_scene() {
        let scene = SceneConfig::from_json_str(
            r#"{
                "dirt": [
                    { "position": [1, 0, 0], "required_tool": "Sponge" },
                    { "position": [2, 0, 0], "max_health": 4 }
                ],
                "tools": [ { "kind": "Sponge", "position": [0, 0, 1], "remaining_uses": 3 } ]
            }"#,
        )
        .unwrap();
        assert_eq!(scene.dirt.len(), 2);
        assert_eq!(scene.dirt[0].max_health, DEFAULT_DIRT_HEALTH);
        assert_eq!(scene.dirt[1].required_tool, None);
        assert_eq!(scene.tools[0].power, 1.0);
        assert_eq!(scene.tools[0].remaining_uses, Some(3));
    }

    #[test]
    fn test_validation_errors() {
        let err = SceneConfig::from_json_str(r#"{ "tools": [ { "kind": "Mop", "power": 0, "position": [0,0,0] } ] }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "tools[0].power"));

        let err = SceneConfig::from_json_str(r#"{ "dirt": [ { "position": [0,0,0], "max_health": -1 } ] }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "dirt[0].max_health"));

        let err = SceneConfig::from_json_str(
            r#"{ "tools": [ { "kind": "Mop", "position": [0,0,0], "remaining_uses": 0 } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let a = SceneConfig::generate(42, 8);
        let b = SceneConfig::generate(42, 8);
        assert_eq!(a.dirt.len(), 8);
        for (da, db) in a.dirt.iter().zip(&b.dirt) {
            assert_eq!(da.position, db.position);
            assert_eq!(da.required_tool, db.required_tool);
        }
        assert!(a.validate().is_ok());
    }

    #[test]
    fn test_generated_dirt_is_always_cleanable() {
        let scene = SceneConfig::generate(7, 32);
        for dirt in &scene.dirt {
            if let Some(required) = &dirt.required_tool {
                assert!(scene.tools.iter().any(|t| &t.kind == required));
            }
        }
    }
}
