//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (by entity ID)
//! - Cross-object notifications go through the event bus, never callbacks
//! - No rendering or platform dependencies

pub mod dirt;
pub mod equip;
pub mod events;
pub mod interact;
pub mod progress;
pub mod proximity;
pub mod resolver;
pub mod state;
pub mod tick;
pub mod tool;

pub use dirt::{DamageResult, DirtId, DirtState, DirtTarget, Targets};
pub use equip::EquipSlot;
pub use events::{EventBus, GameEvent, GameEventKind};
pub use interact::{
    Door, DoorId, Interactable, Interaction, Prop, PropId, interact, interact_with, nearest_interactable,
};
pub use progress::ProgressAggregator;
pub use proximity::ProximitySet;
pub use resolver::{CleanOutcome, CleaningResolver, DamagePolicy, DamageScaling, HitReport, ResolveContext};
pub use state::{Agent, CleaningState, SceneBuilder};
pub use tick::{TickInput, TickReport, tick};
pub use tool::{PhysicsMode, ToolDescriptor, ToolId};
