//! Cleaning progress across the whole scene
//!
//! One aggregator per running session, owned by `CleaningState` and handed to
//! whoever needs it. Counts registered targets and cleaned targets, and fires
//! `AllClean` once when they meet.

use serde::{Deserialize, Serialize};

use super::events::{EventBus, GameEvent};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressAggregator {
    total: u32,
    cleaned: u32,
    /// Initial population finished registering
    sealed: bool,
    /// `AllClean` already fired
    completed: bool,
}

impl ProgressAggregator {
    /// Count one more target. Called once per target at creation.
    pub fn register_target(&mut self) {
        if self.sealed {
            log::warn!(
                "dirt registered after scene bind ({} -> {} targets)",
                self.total,
                self.total + 1
            );
        }
        self.total += 1;
    }

    /// End of the registration phase; announces the starting progress
    pub fn seal(&mut self, events: &mut EventBus) {
        self.sealed = true;
        log::info!("progress sealed with {} targets", self.total);
        events.emit(GameEvent::ProgressChanged {
            cleaned: self.cleaned,
            total: self.total,
        });
    }

    /// One target finished. Relies on `DirtTarget` never reporting twice.
    pub fn mark_cleaned(&mut self, events: &mut EventBus) {
        if self.cleaned >= self.total {
            log::warn!(
                "mark_cleaned with {} of {} already cleaned, ignoring",
                self.cleaned,
                self.total
            );
            return;
        }

        self.cleaned += 1;
        events.emit(GameEvent::ProgressChanged {
            cleaned: self.cleaned,
            total: self.total,
        });

        if self.cleaned == self.total && !self.completed {
            self.completed = true;
            log::info!("all {} targets clean", self.total);
            events.emit(GameEvent::AllClean);
        }
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn cleaned(&self) -> u32 {
        self.cleaned
    }

    /// Every registered target is clean right now. Unlike the one-shot
    /// `AllClean` event this goes back to false when dirt arrives late.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.cleaned == self.total
    }

    /// Fraction cleaned in [0, 1]; 0 for an empty scene
    pub fn progress(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.cleaned as f32 / self.total as f32
        }
    }
}
