//! Turn order state machine
//!
//! A turn is Active while the cursor points into the order and Done once it
//! has walked past the end. Nothing restarts a turn automatically; the driver
//! calls [`TurnManager::start_next_turn`] again when it sees Done.

use crate::error::GameError;
use crate::mob::{MobId, MobManager};

#[derive(Clone, Debug, Default)]
pub struct TurnManager {
    order: Vec<MobId>,
    current: usize,
    turn_number: u32,
}

impl TurnManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refill AP and rebuild the order from living mobs, lowest AP first
    pub fn start_next_turn(&mut self, mobs: &mut MobManager) {
        mobs.refill_ap();

        self.order = mobs.alive().map(|(id, _)| id).collect();
        // Stable: equal AP keeps arena order
        self.order
            .sort_by_key(|&id| mobs.mob(id).map(|m| m.ap()).unwrap_or(0));
        self.current = 0;
        self.turn_number += 1;

        tracing::debug!(
            "turn {} started with {} mobs",
            self.turn_number,
            self.order.len()
        );
    }

    pub fn is_turn_done(&self) -> bool {
        self.current >= self.order.len()
    }

    /// Mob whose turn it is
    pub fn current_mob(&self) -> Result<MobId, GameError> {
        self.order.get(self.current).copied().ok_or(GameError::TurnDone)
    }

    /// Advance to the next mob; returns whether the turn is still active
    pub fn move_next(&mut self) -> bool {
        if !self.is_turn_done() {
            self.current += 1;
        }
        !self.is_turn_done()
    }

    pub fn turn_order(&self) -> &[MobId] {
        &self.order
    }

    pub fn cursor(&self) -> usize {
        self.current
    }

    /// Number of turns started so far
    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }
}
