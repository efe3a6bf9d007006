//! Notifications for presentation and UI collaborators
//!
//! The simulation never calls out to animation, VFX, audio or HUD code. It
//! records what happened this tick and the host drains the bus after `tick`
//! returns. Emitting is fire-and-forget and cannot re-enter the simulation.

use serde::{Deserialize, Serialize};

use super::dirt::DirtId;
use super::interact::{DoorId, PropId};
use super::tool::ToolId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Agent started or stopped holding a tool
    HoldingChanged(bool),
    /// Cleaning animation should start/stop (emitted on change only)
    CleaningActive(bool),
    /// Remaining dirt as a 0..1 ratio of max health
    HealthRatioChanged { target: DirtId, ratio: f32 },
    /// Target crossed into the destroyed state
    TargetDestroyed(DirtId),
    /// Progress counter moved
    ProgressChanged { cleaned: u32, total: u32 },
    /// Every registered target is clean (one-shot)
    AllClean,
    /// Held tool cannot clean this target
    IncompatibleTool { target: DirtId, tool_kind: String },
    /// Held tool used its last charge and is gone
    ToolDepleted { tool: ToolId, tool_kind: String },
    ToolEquipped(ToolId),
    ToolDropped(ToolId),
    PropPickedUp(PropId),
    PropDropped(PropId),
    DoorToggled { door: DoorId, open: bool },
    /// Pickup requested with nothing in reach
    NothingToInteract,
}

impl GameEvent {
    pub fn kind(&self) -> GameEventKind {
        match self {
            Self::HoldingChanged(_)
            | Self::CleaningActive(_)
            | Self::HealthRatioChanged { .. }
            | Self::TargetDestroyed(_) => GameEventKind::Presentation,
            Self::ProgressChanged { .. } | Self::AllClean => GameEventKind::Progress,
            Self::IncompatibleTool { .. } | Self::ToolDepleted { .. } => GameEventKind::Rejection,
            Self::ToolEquipped(_)
            | Self::ToolDropped(_)
            | Self::PropPickedUp(_)
            | Self::PropDropped(_)
            | Self::DoorToggled { .. }
            | Self::NothingToInteract => GameEventKind::Interaction,
        }
    }
}

/// Which collaborator an event is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEventKind {
    Presentation,
    Progress,
    Rejection,
    Interaction,
}

/// Per-tick event buffer
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    current_tick_events: Vec<GameEvent>,
}

impl EventBus {
    pub fn emit(&mut self, event: GameEvent) {
        log::trace!("event: {event:?}");
        self.current_tick_events.push(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.current_tick_events.iter()
    }

    pub fn len(&self) -> usize {
        self.current_tick_events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current_tick_events.is_empty()
    }

    /// Hand everything emitted so far to the host
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.current_tick_events)
    }

    pub fn count(&self, pred: impl Fn(&GameEvent) -> bool) -> usize {
        self.current_tick_events.iter().filter(|e| pred(e)).count()
    }
}
