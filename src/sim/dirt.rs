//! Dirt targets and the arena that owns them
//!
//! A target is `Dirty` until its health reaches zero, then `Destroyed` forever.
//! Everything else (proximity entries, resolver passes) refers to targets by
//! `DirtId`, so a destroyed target can be looked up and skipped instead of
//! leaving a dangling reference behind.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::events::{EventBus, GameEvent};
use super::progress::ProgressAggregator;

/// Stable target identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DirtId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirtState {
    Dirty,
    /// Terminal
    Destroyed,
}

/// What a single `apply_damage` call did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageResult {
    /// Target was already destroyed; nothing changed
    Ignored,
    /// Health went down, target still dirty
    Damaged { ratio: f32 },
    /// This call crossed the zero boundary
    Destroyed,
}

/// A destructible region of dirt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirtTarget {
    pub id: DirtId,
    pub position: Vec3,
    health: f32,
    max_health: f32,
    /// Only this tool kind can clean it; `None` accepts any tool
    required_tool: Option<String>,
    state: DirtState,
}

impl DirtTarget {
    pub fn new(id: DirtId, position: Vec3, max_health: f32, required_tool: Option<String>) -> Self {
        // Empty string means "any tool", same as absent
        let required_tool = required_tool.filter(|kind| !kind.is_empty());
        Self {
            id,
            position,
            health: max_health,
            max_health,
            required_tool,
            state: DirtState::Dirty,
        }
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn required_tool(&self) -> Option<&str> {
        self.required_tool.as_deref()
    }

    pub fn state(&self) -> DirtState {
        self.state
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == DirtState::Destroyed
    }

    /// Remaining dirt in 0..1
    pub fn health_ratio(&self) -> f32 {
        let ratio = self.health / self.max_health;
        if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 }
    }

    /// Required-tool filter
    pub fn accepts(&self, tool_kind: &str) -> bool {
        self.required_tool
            .as_deref()
            .is_none_or(|required| required == tool_kind)
    }

    /// Scrub off `amount` health.
    ///
    /// The destroyed flag is set before the aggregator or any listener hears
    /// about it, so nothing notified during destruction can observe the target
    /// as still dirty and count it twice.
    pub fn apply_damage(
        &mut self,
        amount: f32,
        progress: &mut ProgressAggregator,
        events: &mut EventBus,
    ) -> DamageResult {
        if self.is_destroyed() {
            log::debug!("dirt {:?} already destroyed, ignoring hit", self.id);
            return DamageResult::Ignored;
        }

        let amount = if amount.is_finite() { amount.max(0.0) } else { 0.0 };
        self.health = (self.health - amount).max(0.0);

        let ratio = self.health_ratio();
        events.emit(GameEvent::HealthRatioChanged {
            target: self.id,
            ratio,
        });

        if self.health > 0.0 {
            log::debug!(
                "dirt {:?} took {:.2}, {:.2}/{:.2} left",
                self.id,
                amount,
                self.health,
                self.max_health
            );
            return DamageResult::Damaged { ratio };
        }

        self.state = DirtState::Destroyed;
        log::info!("dirt {:?} cleaned", self.id);
        progress.mark_cleaned(events);
        events.emit(GameEvent::TargetDestroyed(self.id));
        DamageResult::Destroyed
    }
}

/// Arena of all dirt targets, iterated in id order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Targets {
    by_id: BTreeMap<DirtId, DirtTarget>,
}

impl Targets {
    pub fn insert(&mut self, target: DirtTarget) {
        self.by_id.insert(target.id, target);
    }

    pub fn get(&self, id: DirtId) -> Option<&DirtTarget> {
        self.by_id.get(&id)
    }

    pub fn get_mut(&mut self, id: DirtId) -> Option<&mut DirtTarget> {
        self.by_id.get_mut(&id)
    }

    /// Present and not destroyed
    pub fn is_live(&self, id: DirtId) -> bool {
        self.get(id).is_some_and(|t| !t.is_destroyed())
    }

    pub fn iter(&self) -> impl Iterator<Item = &DirtTarget> {
        self.by_id.values()
    }

    pub fn live(&self) -> impl Iterator<Item = &DirtTarget> {
        self.iter().filter(|t| !t.is_destroyed())
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Drop destroyed targets from storage. Returns how many were removed.
    pub fn reclaim_destroyed(&mut self) -> usize {
        let before = self.by_id.len();
        self.by_id.retain(|_, t| !t.is_destroyed());
        before - self.by_id.len()
    }
}
