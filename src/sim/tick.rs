//! Fixed timestep simulation tick
//!
//! One call per rendered frame. Within a tick the order is fixed: pose,
//! proximity signals, stale-tool guard, interaction, clean-hit resolution.
//! Proximity changes for this frame are therefore always visible to this
//! frame's damage pass.

use glam::Vec3;

use super::dirt::DirtId;
use super::interact::{self, Interactable, Interaction};
use super::resolver::{CleanOutcome, ResolveContext};
use super::state::CleaningState;

/// Distance at which the autopilot counts as "there". Small enough that a
/// dirt goal is also the closest dirt to the agent.
const AUTOPILOT_ARRIVAL: f32 = 0.05;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// New agent position from the locomotion layer
    pub agent_position: Option<Vec3>,
    /// New look direction
    pub facing: Option<Vec3>,
    /// Clean action fired this tick (edge or level, the resolver does not care)
    pub clean: bool,
    /// Interact button pressed this tick
    pub pickup: bool,
    /// What the press is aimed at; falls back to the nearest interactable
    pub pickup_target: Option<Interactable>,
    /// Overlap-begin signals from the physics layer
    pub entered: Vec<DirtId>,
    /// Overlap-end signals from the physics layer
    pub exited: Vec<DirtId>,
    /// Derive enter/exit from `interaction_range` instead of physics signals
    pub sense_proximity: bool,
    /// Let the simulation drive the agent
    pub autopilot: bool,
}

/// What a tick did
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub interaction: Option<Interaction>,
    pub clean: CleanOutcome,
}

/// Advance the simulation by one fixed timestep
pub fn tick(state: &mut CleaningState, input: &TickInput, dt: f32) -> TickReport {
    let mut input = input.clone();
    if input.autopilot {
        autopilot(state, &mut input, dt);
    }
    let input = &input;

    state.time_ticks += 1;

    // Pose
    if let Some(position) = input.agent_position {
        state.agent.position = position;
    }
    if let Some(facing) = input.facing
        && facing.length_squared() > f32::EPSILON
    {
        state.agent.facing = facing;
    }

    // Proximity signals land before the damage pass
    for &id in &input.entered {
        state.proximity.add(id);
    }
    for &id in &input.exited {
        state.proximity.remove(id);
    }
    if input.sense_proximity {
        let (entered, exited) = state.proximity.sense(
            state.agent.position,
            state.settings.interaction_range,
            &state.targets,
        );
        for id in entered {
            state.proximity.add(id);
        }
        for id in exited {
            state.proximity.remove(id);
        }
    }

    // A held tool destroyed elsewhere since last tick
    state.slot.release_discarded(&mut state.events);

    let interaction = input
        .pickup
        .then(|| interact::interact_with(state, input.pickup_target));

    let clean = state.resolver.resolve(ResolveContext {
        slot: &mut state.slot,
        proximity: &mut state.proximity,
        targets: &mut state.targets,
        progress: &mut state.progress,
        events: &mut state.events,
        agent_position: state.agent.position,
        clean_triggered: input.clean,
        dt,
    });

    TickReport { interaction, clean }
}

/// Demo driver: fetch a tool that fits some remaining dirt, walk over, scrub.
///
/// Writes into `input` the way a player would; the tick then runs normally.
fn autopilot(state: &CleaningState, input: &mut TickInput, dt: f32) {
    input.sense_proximity = true;
    let agent = state.agent.position;

    // Hands must be free of props before fetching a tool
    if state.carried.is_some() {
        input.pickup = true;
        return;
    }

    if let Some(held) = state.slot.held() {
        let target = state
            .targets
            .live()
            .filter(|t| state.resolver.tool_fits(&held.kind, t))
            .min_by(|a, b| {
                a.position
                    .distance_squared(agent)
                    .total_cmp(&b.position.distance_squared(agent))
            });
        match target {
            Some(target) => {
                if target.position.distance(agent) <= AUTOPILOT_ARRIVAL {
                    input.clean = true;
                } else {
                    walk_toward(state, input, target.position, dt);
                }
            }
            // Nothing left this tool can clean
            None => input.pickup = true,
        }
        return;
    }

    let wanted = state
        .tools()
        .iter()
        .filter(|tool| tool.is_live())
        .filter(|tool| {
            state
                .targets
                .live()
                .any(|t| state.resolver.tool_fits(&tool.kind, t))
        })
        .min_by(|a, b| {
            a.position
                .distance_squared(agent)
                .total_cmp(&b.position.distance_squared(agent))
        });
    let Some(tool) = wanted else {
        return;
    };

    if tool.position.distance(agent) <= AUTOPILOT_ARRIVAL {
        input.pickup = true;
        input.pickup_target = Some(Interactable::Tool(tool.id));
    } else {
        walk_toward(state, input, tool.position, dt);
    }
}

fn walk_toward(state: &CleaningState, input: &mut TickInput, goal: Vec3, dt: f32) {
    let from = state.agent.position;
    let to_goal = goal - from;
    let dist = to_goal.length();
    if dist <= f32::EPSILON {
        return;
    }
    let step = (state.settings.agent_speed * dt).min(dist);
    input.agent_position = Some(from + to_goal / dist * step);
    input.facing = Some(to_goal);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use crate::consts::SIM_DT;
    use crate::scene::SceneConfig;
    use crate::sim::events::GameEvent;
    use crate::sim::state::SceneBuilder;

    #[test]
    fn test_idle_tick_only_advances_counter() {
        let mut builder = SceneBuilder::new(Settings::default());
        builder.add_dirt(Vec3::X, 10.0, None).unwrap();
        let mut state = builder.bind();
        state.events.drain();

        let report = tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.time_ticks, 1);
        assert_eq!(report.clean, CleanOutcome::Idle);
        assert_eq!(report.interaction, None);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_enter_signal_visible_same_tick() {
        let mut builder = SceneBuilder::new(Settings::default());
        let dirt = builder.add_dirt(Vec3::X, 10.0, None).unwrap();
        builder.add_tool("Sponge", 1.0, None, Vec3::ZERO).unwrap();
        let mut state = builder.bind();

        tick(
            &mut state,
            &TickInput {
                pickup: true,
                ..Default::default()
            },
            SIM_DT,
        );
        assert!(state.slot.is_holding());

        let report = tick(
            &mut state,
            &TickInput {
                clean: true,
                entered: vec![dirt],
                ..Default::default()
            },
            SIM_DT,
        );
        assert!(matches!(report.clean, CleanOutcome::Hit(_)));
        assert_eq!(state.targets.get(dirt).unwrap().health(), 5.0);
    }

    #[test]
    fn test_exit_signal_removes_before_damage() {
        let mut builder = SceneBuilder::new(Settings::default());
        let dirt = builder.add_dirt(Vec3::X, 10.0, None).unwrap();
        builder.add_tool("Sponge", 1.0, None, Vec3::ZERO).unwrap();
        let mut state = builder.bind();
        tick(
            &mut state,
            &TickInput {
                pickup: true,
                entered: vec![dirt],
                ..Default::default()
            },
            SIM_DT,
        );

        let report = tick(
            &mut state,
            &TickInput {
                clean: true,
                exited: vec![dirt],
                ..Default::default()
            },
            SIM_DT,
        );
        assert_eq!(report.clean, CleanOutcome::NothingInRange);
        assert_eq!(state.targets.get(dirt).unwrap().health(), 10.0);
    }

    #[test]
    fn test_discarded_held_tool_reads_as_empty() {
        let mut builder = SceneBuilder::new(Settings::default());
        let dirt = builder.add_dirt(Vec3::X, 10.0, None).unwrap();
        let tool = builder.add_tool("Sponge", 1.0, None, Vec3::ZERO).unwrap();
        let mut state = builder.bind();
        tick(
            &mut state,
            &TickInput {
                pickup: true,
                entered: vec![dirt],
                ..Default::default()
            },
            SIM_DT,
        );
        state.events.drain();

        assert!(state.discard_tool(tool));
        let report = tick(
            &mut state,
            &TickInput {
                clean: true,
                ..Default::default()
            },
            SIM_DT,
        );
        assert_eq!(report.clean, CleanOutcome::Idle);
        assert_eq!(state.targets.get(dirt).unwrap().health(), 10.0);
        assert_eq!(state.events.drain(), vec![GameEvent::HoldingChanged(false)]);
    }

    #[test]
    fn test_sensor_tracks_agent() {
        let mut builder = SceneBuilder::new(Settings::default());
        let dirt = builder.add_dirt(Vec3::new(10.0, 0.0, 0.0), 10.0, None).unwrap();
        let mut state = builder.bind();

        let sensing = TickInput {
            sense_proximity: true,
            ..Default::default()
        };
        tick(&mut state, &sensing, SIM_DT);
        assert!(!state.proximity.contains(dirt));

        let moved = TickInput {
            agent_position: Some(Vec3::new(9.0, 0.0, 0.0)),
            ..sensing.clone()
        };
        tick(&mut state, &moved, SIM_DT);
        assert!(state.proximity.contains(dirt));
    }

    #[test]
    fn test_autopilot_cleans_generated_scene() {
        // Any tool fits any dirt, so a worn-out sponge never strands the run
        let settings = Settings {
            require_correct_tool: false,
            ..Default::default()
        };
        let scene = SceneConfig::generate(2024, 6);
        let mut state = SceneBuilder::from_config(settings, &scene)
            .unwrap()
            .bind();

        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..20_000 {
            if state.all_clean() {
                break;
            }
            tick(&mut state, &input, SIM_DT);
        }
        assert!(state.all_clean(), "{} dirt left", state.remaining_dirt());
        assert_eq!(state.progress.cleaned(), 6);
    }

    #[test]
    fn test_autopilot_swaps_tool_for_matching_dirt() {
        let mut builder = SceneBuilder::new(Settings::default());
        let mop = builder.add_tool("Mop", 1.0, None, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        let sponge = builder.add_tool("Sponge", 1.0, None, Vec3::new(-3.0, 0.0, 0.0)).unwrap();
        builder.add_dirt(Vec3::new(2.0, 0.0, 0.0), 5.0, Some("Mop".into())).unwrap();
        builder.add_dirt(Vec3::new(-4.0, 0.0, 0.0), 5.0, Some("Sponge".into())).unwrap();
        let mut state = builder.bind();

        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        let mut equipped = Vec::new();
        for _ in 0..5_000 {
            if state.all_clean() {
                break;
            }
            if let Some(Interaction::EquippedTool(id)) = tick(&mut state, &input, SIM_DT).interaction {
                equipped.push(id);
            }
        }
        assert!(state.all_clean());
        assert_eq!(equipped, vec![mop, sponge]);
    }

    #[test]
    fn test_autopilot_ignores_useless_tool_on_same_spot() {
        let mut builder = SceneBuilder::new(Settings::default());
        // Lower id, same spot, fits nothing
        builder.add_tool("Broom", 1.0, None, Vec3::new(2.0, 0.0, 0.0)).unwrap();
        let sponge = builder.add_tool("Sponge", 1.0, None, Vec3::new(2.0, 0.0, 0.0)).unwrap();
        builder.add_dirt(Vec3::new(4.0, 0.0, 0.0), 5.0, Some("Sponge".into())).unwrap();
        let mut state = builder.bind();

        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        let mut equipped = Vec::new();
        for _ in 0..2_000 {
            if state.all_clean() {
                break;
            }
            if let Some(Interaction::EquippedTool(id)) = tick(&mut state, &input, SIM_DT).interaction {
                equipped.push(id);
            }
        }
        assert!(state.all_clean());
        assert_eq!(equipped, vec![sponge]);
    }

    #[test]
    fn test_determinism() {
        // Same scene and inputs give identical results
        let scene = SceneConfig::generate(99, 5);
        let mut state1 = SceneBuilder::from_config(Settings::default(), &scene)
            .unwrap()
            .bind();
        let mut state2 = SceneBuilder::from_config(Settings::default(), &scene)
            .unwrap()
            .bind();

        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..600 {
            tick(&mut state1, &input, SIM_DT);
            tick(&mut state2, &input, SIM_DT);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.progress.cleaned(), state2.progress.cleaned());
        assert!((state1.agent.position - state2.agent.position).length() < 1e-6);
    }
}
