//! Cleaning tools
//!
//! A tool is owned by exactly one holder at a time: it lives in the world's
//! tool list until picked up, then it is moved into the agent's `EquipSlot`.
//! Moving the value is what enforces single ownership.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Stable tool identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ToolId(pub u32);

/// Whether the tool takes part in physics as a free-standing object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PhysicsMode {
    /// Lying in the world: collides, falls, can be knocked around
    #[default]
    Free,
    /// In the agent's hand: kinematic, ignores the agent's colliders
    Held,
}

/// A pickable cleaning implement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub id: ToolId,
    /// Identity tag matched against a target's required tool ("Sponge", "Mop", ...)
    pub kind: String,
    /// Damage multiplier, always > 0
    pub power: f32,
    /// Charges left; `None` means the tool never wears out
    remaining_uses: Option<u32>,
    /// Where the tool rests while in the world (ignored while held)
    pub position: Vec3,
    pub physics: PhysicsMode,
    /// Set when something outside the slot destroyed the tool
    #[serde(default)]
    discarded: bool,
}

impl ToolDescriptor {
    pub fn new(id: ToolId, kind: impl Into<String>, power: f32, remaining_uses: Option<u32>) -> Self {
        Self {
            id,
            kind: kind.into(),
            power,
            remaining_uses,
            position: Vec3::ZERO,
            physics: PhysicsMode::Free,
            discarded: false,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn remaining_uses(&self) -> Option<u32> {
        self.remaining_uses
    }

    /// Finite durability already at zero
    pub fn is_exhausted(&self) -> bool {
        self.remaining_uses == Some(0)
    }

    /// Still a valid object (not exhausted, not discarded by another system)
    pub fn is_live(&self) -> bool {
        !self.discarded && !self.is_exhausted()
    }

    pub fn is_discarded(&self) -> bool {
        self.discarded
    }

    pub(crate) fn discard(&mut self) {
        self.discarded = true;
    }

    /// Spend one charge. Returns true while the tool is still usable afterwards.
    ///
    /// Durability only ever goes down; unlimited tools are untouched.
    pub(crate) fn spend_use(&mut self) -> bool {
        match self.remaining_uses {
            None => true,
            Some(uses) => {
                let left = uses.saturating_sub(1);
                self.remaining_uses = Some(left);
                left > 0
            }
        }
    }
}
