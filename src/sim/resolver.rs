//! Clean-hit resolution
//!
//! Once per tick: given the held tool, the targets in reach and whether the
//! clean action fired, decide if a hit happens, on which targets, and apply
//! it. The order is fixed:
//!
//! 1. No live tool or no clean action: nothing happens.
//! 2. Prune stale proximity entries; nothing in reach: nothing happens.
//! 3. Spend a tool charge. If that wears the tool out, the hit is lost.
//! 4. Pick targets by policy, check the tool filter, apply damage.
//! 5. Prune again so targets destroyed now are gone next tick.
//!
//! A charge is spent before the filter check, so swinging the wrong tool at
//! the closest target still costs durability.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::dirt::{DamageResult, DirtId, DirtTarget, Targets};
use super::equip::EquipSlot;
use super::events::{EventBus, GameEvent};
use super::progress::ProgressAggregator;
use super::proximity::ProximitySet;
use super::tool::ToolId;
use crate::Settings;

/// Which targets a clean-hit lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DamagePolicy {
    /// Only the target nearest the agent
    #[default]
    SingleClosest,
    /// Every compatible target in reach
    AllInRange,
}

impl DamagePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DamagePolicy::SingleClosest => "SingleClosest",
            DamagePolicy::AllInRange => "AllInRange",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "singleclosest" | "single" | "closest" => Some(DamagePolicy::SingleClosest),
            "allinrange" | "all" => Some(DamagePolicy::AllInRange),
            _ => None,
        }
    }
}

/// How the damage amount relates to time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DamageScaling {
    /// Full amount per hit, for press-to-scrub input
    #[default]
    PerHit,
    /// Amount per second, multiplied by the tick length, for hold-to-scrub input
    PerSecond,
}

/// Result of one resolver pass
#[derive(Debug, Clone, PartialEq)]
pub enum CleanOutcome {
    /// No tool or no clean action this tick
    Idle,
    /// Clean action with a tool, but no dirt in reach
    NothingInRange,
    /// The tool wore out on this swing; no damage dealt
    ToolDepleted(ToolId),
    /// Closest target refuses the held tool (charge already spent)
    Incompatible(DirtId),
    Hit(HitReport),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitReport {
    pub damaged: Vec<DirtId>,
    pub destroyed: Vec<DirtId>,
    /// Targets in reach that refused the tool
    pub rejected: Vec<DirtId>,
}

/// Everything a resolver pass reads or writes
pub struct ResolveContext<'a> {
    pub slot: &'a mut EquipSlot,
    pub proximity: &'a mut ProximitySet,
    pub targets: &'a mut Targets,
    pub progress: &'a mut ProgressAggregator,
    pub events: &'a mut EventBus,
    pub agent_position: Vec3,
    pub clean_triggered: bool,
    pub dt: f32,
}

#[derive(Debug, Clone)]
pub struct CleaningResolver {
    pub policy: DamagePolicy,
    pub base_power: f32,
    pub scaling: DamageScaling,
    pub require_correct_tool: bool,
    pub allowed_tool_kinds: Vec<String>,
    /// Last `CleaningActive` state reported
    cleaning_active: bool,
}

impl Default for CleaningResolver {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl CleaningResolver {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            policy: settings.damage_policy,
            base_power: settings.base_power,
            scaling: settings.damage_scaling,
            require_correct_tool: settings.require_correct_tool,
            allowed_tool_kinds: settings.allowed_tool_kinds.clone(),
            cleaning_active: false,
        }
    }

    pub fn is_cleaning(&self) -> bool {
        self.cleaning_active
    }

    /// Whether a tool of `kind` may clean `target`
    pub fn tool_fits(&self, kind: &str, target: &DirtTarget) -> bool {
        if !self.allowed_tool_kinds.is_empty() && !self.allowed_tool_kinds.iter().any(|k| k == kind) {
            return false;
        }
        !self.require_correct_tool || target.accepts(kind)
    }

    /// Damage one hit deals with a tool of the given power
    pub fn damage_amount(&self, tool_power: f32, dt: f32) -> f32 {
        let amount = self.base_power * tool_power;
        match self.scaling {
            DamageScaling::PerHit => amount,
            DamageScaling::PerSecond => amount * dt,
        }
    }

    pub fn resolve(&mut self, ctx: ResolveContext<'_>) -> CleanOutcome {
        let ResolveContext {
            slot,
            proximity,
            targets,
            progress,
            events,
            agent_position,
            clean_triggered,
            dt,
        } = ctx;

        // A tool destroyed elsewhere reads as no tool
        let Some(tool) = slot.held() else {
            self.set_cleaning(false, events);
            return CleanOutcome::Idle;
        };
        if !clean_triggered {
            self.set_cleaning(false, events);
            return CleanOutcome::Idle;
        }
        let (tool_id, tool_kind, tool_power) = (tool.id, tool.kind.clone(), tool.power);

        proximity.prune_destroyed(targets);
        if proximity.is_empty() {
            self.set_cleaning(false, events);
            return CleanOutcome::NothingInRange;
        }

        if !slot.consume(events) {
            self.set_cleaning(false, events);
            return CleanOutcome::ToolDepleted(tool_id);
        }
        self.set_cleaning(true, events);

        let amount = self.damage_amount(tool_power, dt);
        let outcome = match self.policy {
            DamagePolicy::SingleClosest => {
                self.hit_closest(proximity, targets, progress, events, agent_position, &tool_kind, amount)
            }
            DamagePolicy::AllInRange => {
                self.hit_all(proximity, targets, progress, events, &tool_kind, amount)
            }
        };

        proximity.prune_destroyed(targets);
        outcome
    }

    #[allow(clippy::too_many_arguments)]
    fn hit_closest(
        &self,
        proximity: &ProximitySet,
        targets: &mut Targets,
        progress: &mut ProgressAggregator,
        events: &mut EventBus,
        agent_position: Vec3,
        tool_kind: &str,
        amount: f32,
    ) -> CleanOutcome {
        let Some(id) = proximity.closest_to(agent_position, targets) else {
            return CleanOutcome::NothingInRange;
        };
        let Some(target) = targets.get_mut(id) else {
            return CleanOutcome::NothingInRange;
        };

        if !self.tool_fits(tool_kind, target) {
            log::debug!("{tool_kind} cannot clean {id:?}");
            events.emit(GameEvent::IncompatibleTool {
                target: id,
                tool_kind: tool_kind.to_string(),
            });
            return CleanOutcome::Incompatible(id);
        }

        let mut report = HitReport::default();
        Self::record(&mut report, id, target.apply_damage(amount, progress, events));
        CleanOutcome::Hit(report)
    }

    fn hit_all(
        &self,
        proximity: &ProximitySet,
        targets: &mut Targets,
        progress: &mut ProgressAggregator,
        events: &mut EventBus,
        tool_kind: &str,
        amount: f32,
    ) -> CleanOutcome {
        // Snapshot ids so the pass never iterates a collection it mutates
        let in_reach: Vec<DirtId> = proximity.ids().collect();
        let mut report = HitReport::default();

        for id in in_reach {
            let Some(target) = targets.get_mut(id) else {
                continue;
            };
            if !self.tool_fits(tool_kind, target) {
                events.emit(GameEvent::IncompatibleTool {
                    target: id,
                    tool_kind: tool_kind.to_string(),
                });
                report.rejected.push(id);
                continue;
            }
            let result = target.apply_damage(amount, progress, events);
            Self::record(&mut report, id, result);
        }

        CleanOutcome::Hit(report)
    }

    fn record(report: &mut HitReport, id: DirtId, result: DamageResult) {
        match result {
            DamageResult::Ignored => {}
            DamageResult::Damaged { .. } => report.damaged.push(id),
            DamageResult::Destroyed => {
                report.damaged.push(id);
                report.destroyed.push(id);
            }
        }
    }

    fn set_cleaning(&mut self, active: bool, events: &mut EventBus) {
        if self.cleaning_active != active {
            self.cleaning_active = active;
            events.emit(GameEvent::CleaningActive(active));
        }
    }
}
