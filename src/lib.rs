//! Scrub - pick up a cleaning tool, find the dirt, scrub it away
//!
//! Core modules:
//! - `sim`: Tick-driven cleaning simulation (equip slot, proximity, damage resolution, progress)
//! - `settings`: Data-driven tuning (damage policy, ranges, tool rules)
//! - `scene`: Scene authoring format and seeded scene generation
//! - `error`: Configuration errors surfaced at startup

pub mod error;
pub mod scene;
pub mod settings;
pub mod sim;

pub use error::ConfigError;
pub use scene::SceneConfig;
pub use settings::Settings;

use glam::Vec3;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per rendered frame at 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Default damage per clean-hit before the tool's power multiplier
    pub const DEFAULT_BASE_POWER: f32 = 5.0;
    /// Default radius of the agent's dirt sensor
    pub const DEFAULT_INTERACTION_RANGE: f32 = 2.5;
    /// Default reach for picking up tools and props
    pub const DEFAULT_PICKUP_RANGE: f32 = 2.2;
    /// How far in front of the agent a dropped item lands
    pub const DEFAULT_DROP_DISTANCE: f32 = 1.0;
    /// Autopilot walking speed (units per second)
    pub const DEFAULT_AGENT_SPEED: f32 = 4.0;

    /// Default dirt health when a scene entry omits it
    pub const DEFAULT_DIRT_HEALTH: f32 = 10.0;
    /// Half-extent of the square floor used by the scene generator
    pub const GENERATED_FLOOR_HALF_EXTENT: f32 = 12.0;
}

/// Point `distance` units in front of `origin` along the planar part of `facing`
#[inline]
pub fn point_in_front(origin: Vec3, facing: Vec3, distance: f32) -> Vec3 {
    let flat = Vec3::new(facing.x, 0.0, facing.z).normalize_or_zero();
    origin + flat * distance
}
