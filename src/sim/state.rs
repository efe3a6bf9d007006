//! World state and scene setup
//!
//! Setup is two-phase. `SceneBuilder` is the registration phase: every dirt
//! target, tool, prop and door announces itself and gets an id. `bind` ends
//! registration, freezes the target count and hands back a `CleaningState`
//! whose services (progress, resolver, event bus) are plain fields passed to
//! the code that needs them.

use glam::Vec3;

use super::dirt::{DirtId, DirtTarget, Targets};
use super::equip::EquipSlot;
use super::events::EventBus;
use super::interact::{Door, DoorId, Prop, PropId};
use super::progress::ProgressAggregator;
use super::proximity::ProximitySet;
use super::resolver::CleaningResolver;
use super::tool::{PhysicsMode, ToolDescriptor, ToolId};
use crate::error::{ConfigError, require_positive};
use crate::scene::SceneConfig;
use crate::Settings;

/// The player-controlled agent's pose
#[derive(Debug, Clone, Copy)]
pub struct Agent {
    pub position: Vec3,
    /// Horizontal look direction, used for drop placement
    pub facing: Vec3,
}

impl Default for Agent {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            facing: Vec3::Z,
        }
    }
}

/// Registration phase
#[derive(Debug)]
pub struct SceneBuilder {
    state: CleaningState,
}

impl SceneBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            state: CleaningState {
                time_ticks: 0,
                agent: Agent::default(),
                targets: Targets::default(),
                tools: Vec::new(),
                props: Vec::new(),
                doors: Vec::new(),
                slot: EquipSlot::default(),
                carried: None,
                proximity: ProximitySet::default(),
                progress: ProgressAggregator::default(),
                resolver: CleaningResolver::from_settings(&settings),
                settings,
                events: EventBus::default(),
                next_id: 1,
            },
        }
    }

    /// Validate `scene` and register everything in it
    pub fn from_config(settings: Settings, scene: &SceneConfig) -> Result<Self, ConfigError> {
        settings.validate()?;
        scene.validate()?;

        let mut builder = Self::new(settings);
        builder.agent_at(scene.agent_start.into());
        for dirt in &scene.dirt {
            builder.add_dirt(dirt.position.into(), dirt.max_health, dirt.required_tool.clone())?;
        }
        for tool in &scene.tools {
            builder.add_tool(&tool.kind, tool.power, tool.remaining_uses, tool.position.into())?;
        }
        for prop in &scene.props {
            builder.add_prop(prop.position.into());
        }
        for door in &scene.doors {
            builder.add_door(door.position.into(), door.open);
        }
        log::info!(
            "scene registered: {} dirt, {} tools, {} props, {} doors",
            scene.dirt.len(),
            scene.tools.len(),
            scene.props.len(),
            scene.doors.len()
        );
        Ok(builder)
    }

    pub fn agent_at(&mut self, position: Vec3) -> &mut Self {
        self.state.agent.position = position;
        self
    }

    pub fn add_dirt(
        &mut self,
        position: Vec3,
        max_health: f32,
        required_tool: Option<String>,
    ) -> Result<DirtId, ConfigError> {
        self.state.insert_dirt(position, max_health, required_tool)
    }

    /// Register a tool lying at `position`. Power must be positive and a
    /// finite tool must start with at least one use.
    pub fn add_tool(
        &mut self,
        kind: &str,
        power: f32,
        remaining_uses: Option<u32>,
        position: Vec3,
    ) -> Result<ToolId, ConfigError> {
        require_positive("tool power", power)?;
        if kind.is_empty() {
            return Err(ConfigError::invalid("tool kind", "tool kind must not be empty"));
        }
        if remaining_uses == Some(0) {
            return Err(ConfigError::invalid(
                "tool remaining_uses",
                "a tool must start with at least one use",
            ));
        }
        let id = ToolId(self.state.next_entity_id());
        self.state
            .place_tool(ToolDescriptor::new(id, kind, power, remaining_uses).at(position));
        Ok(id)
    }

    pub fn add_prop(&mut self, position: Vec3) -> PropId {
        let id = PropId(self.state.next_entity_id());
        self.state.place_prop(Prop {
            id,
            position,
            physics: PhysicsMode::Free,
        });
        id
    }

    pub fn add_door(&mut self, position: Vec3, open: bool) -> DoorId {
        let id = DoorId(self.state.next_entity_id());
        self.state.doors.push(Door { id, position, open });
        id
    }

    /// Bind phase: registration is over, the simulation can run
    pub fn bind(mut self) -> CleaningState {
        let state = &mut self.state;
        state.progress.seal(&mut state.events);
        self.state
    }
}

/// Complete simulation state
#[derive(Debug)]
pub struct CleaningState {
    /// Simulation tick counter
    pub time_ticks: u64,
    pub agent: Agent,
    /// All dirt, destroyed targets included until reclaimed
    pub targets: Targets,
    /// Tools lying in the world (sorted by id)
    tools: Vec<ToolDescriptor>,
    /// Props lying in the world (sorted by id)
    props: Vec<Prop>,
    doors: Vec<Door>,
    /// The agent's tool hand
    pub slot: EquipSlot,
    /// Prop being carried, if any
    pub carried: Option<Prop>,
    pub proximity: ProximitySet,
    pub progress: ProgressAggregator,
    pub resolver: CleaningResolver,
    pub settings: Settings,
    /// Events emitted since the host last drained
    pub events: EventBus,
    /// Next entity ID
    next_id: u32,
}

impl CleaningState {
    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn insert_dirt(
        &mut self,
        position: Vec3,
        max_health: f32,
        required_tool: Option<String>,
    ) -> Result<DirtId, ConfigError> {
        require_positive("dirt max_health", max_health)?;
        let id = DirtId(self.next_entity_id());
        self.targets
            .insert(DirtTarget::new(id, position, max_health, required_tool));
        self.progress.register_target();
        Ok(id)
    }

    /// Add dirt after the scene is bound. Tolerated, but counted as late.
    pub fn spawn_dirt(
        &mut self,
        position: Vec3,
        max_health: f32,
        required_tool: Option<String>,
    ) -> Result<DirtId, ConfigError> {
        self.insert_dirt(position, max_health, required_tool)
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn props(&self) -> &[Prop] {
        &self.props
    }

    pub fn doors(&self) -> &[Door] {
        &self.doors
    }

    pub fn door_mut(&mut self, id: DoorId) -> Option<&mut Door> {
        self.doors.iter_mut().find(|d| d.id == id)
    }

    /// Hand a tool to the world, keeping id order
    pub fn place_tool(&mut self, tool: ToolDescriptor) {
        let at = self.tools.partition_point(|t| t.id < tool.id);
        self.tools.insert(at, tool);
    }

    /// Remove a tool from the world so someone else can own it
    pub fn take_tool(&mut self, id: ToolId) -> Option<ToolDescriptor> {
        let at = self.tools.iter().position(|t| t.id == id)?;
        Some(self.tools.remove(at))
    }

    pub fn place_prop(&mut self, prop: Prop) {
        let at = self.props.partition_point(|p| p.id < prop.id);
        self.props.insert(at, prop);
    }

    pub fn take_prop(&mut self, id: PropId) -> Option<Prop> {
        let at = self.props.iter().position(|p| p.id == id)?;
        Some(self.props.remove(at))
    }

    /// Spatial query: nearest live tool lying within `max_range` of `origin`
    pub fn find_nearest_tool(&self, origin: Vec3, max_range: f32) -> Option<ToolId> {
        let range_sq = max_range * max_range;
        let mut best: Option<(ToolId, f32)> = None;
        for tool in self.tools.iter().filter(|t| t.is_live()) {
            let dist_sq = tool.position.distance_squared(origin);
            if dist_sq > range_sq {
                continue;
            }
            match best {
                Some((_, best_sq)) if dist_sq >= best_sq => {}
                _ => best = Some((tool.id, dist_sq)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Another system destroyed a tool. A world tool disappears at once; the
    /// held tool stops counting as held and is cleared on the next tick.
    pub fn discard_tool(&mut self, id: ToolId) -> bool {
        if let Some(tool) = self.slot.held_mut().filter(|t| t.id == id) {
            tool.discard();
            return true;
        }
        self.take_tool(id).is_some()
    }

    /// Free storage of destroyed targets and forget any reach entries on them
    pub fn reclaim_destroyed(&mut self) -> usize {
        let reclaimed = self.targets.reclaim_destroyed();
        self.proximity.prune_destroyed(&self.targets);
        reclaimed
    }

    pub fn remaining_dirt(&self) -> usize {
        self.targets.live().count()
    }

    pub fn all_clean(&self) -> bool {
        self.progress.is_complete()
    }
}
