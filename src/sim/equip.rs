//! The agent's hand
//!
//! Holds at most one tool. Equipping takes the tool by value, so a tool in
//! the slot cannot also be lying in the world.

use super::events::{EventBus, GameEvent};
use super::tool::{PhysicsMode, ToolDescriptor};

#[derive(Debug, Clone, Default)]
pub struct EquipSlot {
    current: Option<ToolDescriptor>,
}

impl EquipSlot {
    /// Take ownership of `tool`.
    ///
    /// Fails (handing the tool back) when something is already held or the
    /// tool is not live. On success the tool stops behaving as a free physics
    /// object.
    pub fn try_equip(
        &mut self,
        mut tool: ToolDescriptor,
        events: &mut EventBus,
    ) -> Result<(), ToolDescriptor> {
        if let Some(held) = &self.current {
            log::warn!(
                "cannot equip {:?}: already holding {:?}",
                tool.id,
                held.id
            );
            return Err(tool);
        }
        if !tool.is_live() {
            log::warn!("cannot equip {:?}: tool is spent or discarded", tool.id);
            return Err(tool);
        }

        tool.physics = PhysicsMode::Held;
        log::info!("equipped {} {:?}", tool.kind, tool.id);
        events.emit(GameEvent::ToolEquipped(tool.id));
        events.emit(GameEvent::HoldingChanged(true));
        self.current = Some(tool);
        Ok(())
    }

    /// Let go of the held tool, giving it back its free-standing physics
    pub fn unequip(&mut self, events: &mut EventBus) -> Option<ToolDescriptor> {
        let mut tool = self.current.take()?;
        tool.physics = PhysicsMode::Free;
        log::info!("unequipped {} {:?}", tool.kind, tool.id);
        events.emit(GameEvent::HoldingChanged(false));
        Some(tool)
    }

    /// Spend one charge of the held tool.
    ///
    /// Returns true if the tool is still usable. When this use exhausts it the
    /// slot is emptied on the spot, without restoring physics, and the spent
    /// tool is gone. An empty slot returns false.
    pub fn consume(&mut self, events: &mut EventBus) -> bool {
        let Some(tool) = self.current.as_mut() else {
            return false;
        };
        if tool.spend_use() {
            return true;
        }

        if let Some(spent) = self.current.take() {
            log::info!("{} {:?} worn out", spent.kind, spent.id);
            events.emit(GameEvent::ToolDepleted {
                tool: spent.id,
                tool_kind: spent.kind,
            });
            events.emit(GameEvent::HoldingChanged(false));
        }
        false
    }

    /// Held tool, if it is still a valid object
    pub fn held(&self) -> Option<&ToolDescriptor> {
        self.current.as_ref().filter(|tool| tool.is_live())
    }

    pub(crate) fn held_mut(&mut self) -> Option<&mut ToolDescriptor> {
        self.current.as_mut()
    }

    pub fn is_holding(&self) -> bool {
        self.held().is_some()
    }

    /// Clear a held tool that another system destroyed. Returns it so the
    /// caller can log or inspect it; it does not go back into the world.
    pub fn release_discarded(&mut self, events: &mut EventBus) -> Option<ToolDescriptor> {
        if !self.current.as_ref().is_some_and(|t| t.is_discarded()) {
            return None;
        }
        let tool = self.current.take()?;
        log::warn!("held {} {:?} was destroyed elsewhere", tool.kind, tool.id);
        events.emit(GameEvent::HoldingChanged(false));
        Some(tool)
    }
}
