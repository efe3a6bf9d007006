//! Pickup / drop / use
//!
//! Three kinds of things answer the interact button: tools, carryable props
//! and doors. The set is closed, so dispatch is a `match` on `Interactable`
//! instead of a trait object per kind.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::state::CleaningState;
use super::tool::{PhysicsMode, ToolId};
use crate::point_in_front;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PropId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DoorId(pub u32);

/// A loose object the agent can carry around (bucket, box, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prop {
    pub id: PropId,
    pub position: Vec3,
    pub physics: PhysicsMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Door {
    pub id: DoorId,
    pub position: Vec3,
    pub open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interactable {
    Tool(ToolId),
    Carryable(PropId),
    Door(DoorId),
}

/// What pressing interact did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    DroppedTool(ToolId),
    DroppedProp(PropId),
    EquippedTool(ToolId),
    PickedUpProp(PropId),
    ToggledDoor { door: DoorId, open: bool },
    /// Tool was in reach but the slot refused it
    EquipRejected(ToolId),
    Nothing,
}

/// Nearest interactable within `range` of `origin`.
///
/// Scans tools, then props, then doors, each in id order; on equal distance
/// the first one found wins.
pub fn nearest_interactable(state: &CleaningState, origin: Vec3, range: f32) -> Option<Interactable> {
    let range_sq = range * range;
    let tools = state
        .tools()
        .iter()
        .filter(|t| t.is_live())
        .map(|t| (Interactable::Tool(t.id), t.position));
    let props = state
        .props()
        .iter()
        .map(|p| (Interactable::Carryable(p.id), p.position));
    let doors = state
        .doors()
        .iter()
        .map(|d| (Interactable::Door(d.id), d.position));

    let mut best: Option<(Interactable, f32)> = None;
    for (candidate, position) in tools.chain(props).chain(doors) {
        let dist_sq = position.distance_squared(origin);
        if dist_sq > range_sq {
            continue;
        }
        match best {
            Some((_, best_sq)) if dist_sq >= best_sq => {}
            _ => best = Some((candidate, dist_sq)),
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Position of `candidate` if it is still in the world and usable
fn position_of(state: &CleaningState, candidate: Interactable) -> Option<Vec3> {
    match candidate {
        Interactable::Tool(id) => state
            .tools()
            .iter()
            .find(|t| t.id == id && t.is_live())
            .map(|t| t.position),
        Interactable::Carryable(id) => state.props().iter().find(|p| p.id == id).map(|p| p.position),
        Interactable::Door(id) => state.doors().iter().find(|d| d.id == id).map(|d| d.position),
    }
}

/// Handle one press of the interact button.
///
/// Full hands empty first (tool before prop); with empty hands the nearest
/// interactable in pickup reach is used.
pub fn interact(state: &mut CleaningState) -> Interaction {
    interact_with(state, None)
}

/// Same as `interact`, but with empty hands `preferred` wins over the nearest
/// interactable as long as it is within pickup reach.
pub fn interact_with(state: &mut CleaningState, preferred: Option<Interactable>) -> Interaction {
    // A tool destroyed elsewhere must not be dropped back into the world
    state.slot.release_discarded(&mut state.events);

    let drop_at = point_in_front(
        state.agent.position,
        state.agent.facing,
        state.settings.drop_distance,
    );

    if let Some(mut tool) = state.slot.unequip(&mut state.events) {
        let id = tool.id;
        tool.position = drop_at;
        state.events.emit(GameEvent::ToolDropped(id));
        state.place_tool(tool);
        return Interaction::DroppedTool(id);
    }

    if let Some(mut prop) = state.carried.take() {
        let id = prop.id;
        prop.position = drop_at;
        prop.physics = PhysicsMode::Free;
        log::info!("dropped prop {id:?}");
        state.events.emit(GameEvent::PropDropped(id));
        state.place_prop(prop);
        return Interaction::DroppedProp(id);
    }

    let reach = state.settings.pickup_range;
    let origin = state.agent.position;
    let preferred = preferred.filter(|&candidate| {
        position_of(state, candidate).is_some_and(|pos| pos.distance_squared(origin) <= reach * reach)
    });
    let Some(target) = preferred.or_else(|| nearest_interactable(state, origin, reach)) else {
        log::debug!("nothing to interact with");
        state.events.emit(GameEvent::NothingToInteract);
        return Interaction::Nothing;
    };

    match target {
        Interactable::Tool(id) => {
            let Some(tool) = state.take_tool(id) else {
                return Interaction::Nothing;
            };
            match state.slot.try_equip(tool, &mut state.events) {
                Ok(()) => Interaction::EquippedTool(id),
                Err(tool) => {
                    state.place_tool(tool);
                    Interaction::EquipRejected(id)
                }
            }
        }
        Interactable::Carryable(id) => {
            let Some(mut prop) = state.take_prop(id) else {
                return Interaction::Nothing;
            };
            prop.physics = PhysicsMode::Held;
            log::info!("picked up prop {id:?}");
            state.events.emit(GameEvent::PropPickedUp(id));
            state.carried = Some(prop);
            Interaction::PickedUpProp(id)
        }
        Interactable::Door(id) => {
            let Some(door) = state.door_mut(id) else {
                return Interaction::Nothing;
            };
            door.open = !door.open;
            let open = door.open;
            log::info!("door {id:?} {}", if open { "opened" } else { "closed" });
            state.events.emit(GameEvent::DoorToggled { door: id, open });
            Interaction::ToggledDoor { door: id, open }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use crate::sim::state::SceneBuilder;

    fn scene() -> CleaningState {
        let mut builder = SceneBuilder::new(Settings::default());
        builder.add_tool("Sponge", 1.0, None, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        builder.add_prop(Vec3::new(0.0, 0.0, 1.5));
        builder.add_door(Vec3::new(0.0, 0.0, -2.0), false);
        builder.bind()
    }

    #[test]
    fn test_pickup_nearest_then_drop() {
        let mut state = scene();
        state.agent.facing = Vec3::new(0.0, 0.0, -1.0);

        let first = interact(&mut state);
        let Interaction::EquippedTool(tool_id) = first else {
            panic!("expected the sponge, got {first:?}");
        };
        assert!(state.slot.is_holding());
        assert!(state.tools().is_empty());

        assert_eq!(interact(&mut state), Interaction::DroppedTool(tool_id));
        assert!(!state.slot.is_holding());
        let dropped = &state.tools()[0];
        assert_eq!(dropped.physics, PhysicsMode::Free);
        assert!((dropped.position - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_carry_prop_when_no_tool_nearby() {
        let mut builder = SceneBuilder::new(Settings::default());
        builder.add_prop(Vec3::new(0.5, 0.0, 0.0));
        let mut state = builder.bind();

        let Interaction::PickedUpProp(id) = interact(&mut state) else {
            panic!("expected prop pickup");
        };
        assert!(state.props().is_empty());
        assert_eq!(state.carried.as_ref().unwrap().physics, PhysicsMode::Held);

        assert_eq!(interact(&mut state), Interaction::DroppedProp(id));
        assert_eq!(state.props().len(), 1);
    }

    #[test]
    fn test_toggle_door() {
        let mut builder = SceneBuilder::new(Settings::default());
        let door = builder.add_door(Vec3::new(0.0, 0.0, 1.0), false);
        let mut state = builder.bind();

        assert_eq!(interact(&mut state), Interaction::ToggledDoor { door, open: true });
        assert_eq!(interact(&mut state), Interaction::ToggledDoor { door, open: false });
    }

    #[test]
    fn test_nothing_in_reach() {
        let mut builder = SceneBuilder::new(Settings::default());
        builder.add_tool("Mop", 1.0, None, Vec3::new(50.0, 0.0, 0.0)).unwrap();
        let mut state = builder.bind();
        state.events.drain();

        assert_eq!(interact(&mut state), Interaction::Nothing);
        assert_eq!(state.events.drain(), vec![GameEvent::NothingToInteract]);
    }

    #[test]
    fn test_discarded_tool_is_not_dropped_into_world() {
        let mut state = scene();
        let Interaction::EquippedTool(tool) = interact(&mut state) else {
            panic!("expected the sponge");
        };
        assert!(state.discard_tool(tool));
        state.events.drain();

        // Hands are empty now, so the press reaches for the prop instead
        assert!(matches!(interact(&mut state), Interaction::PickedUpProp(_)));
        assert!(state.tools().iter().all(|t| t.id != tool));
        assert_eq!(state.events.iter().next(), Some(&GameEvent::HoldingChanged(false)));
    }

    #[test]
    fn test_preferred_target_beats_nearest() {
        let mut builder = SceneBuilder::new(Settings::default());
        let near = builder.add_tool("Broom", 1.0, None, Vec3::ZERO).unwrap();
        let wanted = builder.add_tool("Sponge", 1.0, None, Vec3::ZERO).unwrap();
        let far = builder.add_tool("Mop", 1.0, None, Vec3::new(9.0, 0.0, 0.0)).unwrap();
        let mut state = builder.bind();

        // Out of reach falls back to the nearest
        assert_eq!(
            interact_with(&mut state, Some(Interactable::Tool(far))),
            Interaction::EquippedTool(near)
        );
        interact(&mut state);
        let dropped_near = state.tools().iter().find(|t| t.id == near).unwrap().position;
        assert!((dropped_near - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);

        // The sponge at the agent's feet is nearer, but the broom was asked for
        assert_eq!(
            nearest_interactable(&state, Vec3::ZERO, 2.0),
            Some(Interactable::Tool(wanted))
        );
        assert_eq!(
            interact_with(&mut state, Some(Interactable::Tool(near))),
            Interaction::EquippedTool(near)
        );
    }

    #[test]
    fn test_nearest_prefers_tool_on_tie() {
        let mut builder = SceneBuilder::new(Settings::default());
        builder.add_door(Vec3::new(1.0, 0.0, 0.0), false);
        let tool = builder.add_tool("Mop", 1.0, None, Vec3::new(-1.0, 0.0, 0.0)).unwrap();
        let state = builder.bind();

        assert_eq!(
            nearest_interactable(&state, Vec3::ZERO, 2.0),
            Some(Interactable::Tool(tool))
        );
        assert_eq!(nearest_interactable(&state, Vec3::ZERO, 0.5), None);
    }
}
