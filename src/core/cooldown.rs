//! World-scoped cooldown bookkeeping for repeating carriers.
//!
//! Cloud carriers (and their blind block probes) must not re-hit the same
//! target inside a cooldown window, no matter how their pulse ticks align.
//! The map records a next-eligible tick per target and lives on the world,
//! created and cleared with the owning session rather than as process-wide
//! state. A multi-threaded port would guard it with a mutex or shard it
//! per world.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geom::BlockPos;

/// What a cooldown entry is keyed on.
///
/// Entities are keyed by UUID so the window survives id churn across saves;
/// blocks are keyed by position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CooldownKey {
    Entity(Uuid),
    Block(BlockPos),
}

/// Target -> next-eligible-tick map with a combined check-and-claim.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CooldownMap {
    deadlines: FxHashMap<CooldownKey, u64>,
}

impl CooldownMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a target if it is eligible at `now`.
    ///
    /// Returns true and records `now + window` as the new deadline if the
    /// target was eligible; returns false without touching the deadline
    /// otherwise. Check and claim are one operation so interleaved pulse
    /// patterns cannot double-hit.
    pub fn try_claim(&mut self, key: CooldownKey, now: u64, window: u64) -> bool {
        match self.deadlines.get(&key) {
            Some(&deadline) if now < deadline => false,
            _ => {
                self.deadlines.insert(key, now + window);
                true
            }
        }
    }

    /// Whether a target is currently on cooldown.
    #[must_use]
    pub fn is_cooling(&self, key: &CooldownKey, now: u64) -> bool {
        self.deadlines.get(key).is_some_and(|&deadline| now < deadline)
    }

    /// Drop entries whose deadline has passed. Called opportunistically by
    /// the world tick so the map does not grow with session length.
    pub fn purge_expired(&mut self, now: u64) {
        self.deadlines.retain(|_, &mut deadline| now < deadline);
    }

    /// Clear everything. Tied to the owning session's teardown.
    pub fn clear(&mut self) {
        self.deadlines.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}
