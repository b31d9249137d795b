//! Entity identification and the mutable entity record.
//!
//! Live entities are addressed by `EntityId` within a running world. Across
//! ticks and saves they are addressed by UUID only: carriers and packages
//! never hold a live reference, they re-resolve through the world's UUID
//! index each time (see `World::resolve_actor`).

use glam::Vec3;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a live entity within one world session.
///
/// Not stable across saves; use the entity's UUID for anything persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Coarse allegiance tag used by carrier friend/enemy filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Friendly,
    Hostile,
}

/// Lingering status effects an Effect node can apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Slow,
    Weakness,
}

/// A living (or recently dead) thing in the world.
///
/// Carries exactly the state the Effect nodes mutate: health, burn timer,
/// status map. Position/velocity/extents serve the raycast and the carriers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub uuid: Uuid,
    pub pos: Vec3,
    pub vel: Vec3,
    /// Half-extents of the axis-aligned bounding box.
    pub half_extents: Vec3,
    /// Eye height above `pos` (the AABB bottom center).
    pub eye_height: f32,
    /// Unit look direction; the caster's aim.
    pub look: Vec3,
    /// Synchronous touch-delivery reach in blocks.
    pub reach: f32,
    pub health: f32,
    pub max_health: f32,
    pub team: Team,
    /// Remaining burn ticks (20 ticks per second of burning).
    pub burn_ticks: u32,
    /// Status -> remaining ticks.
    pub statuses: FxHashMap<Status, u32>,
}

impl Entity {
    /// Create an entity with default humanoid dimensions. The id is
    /// assigned by `World::spawn`.
    #[must_use]
    pub fn new(team: Team, pos: Vec3) -> Self {
        Self {
            id: EntityId(0),
            uuid: Uuid::new_v4(),
            pos,
            vel: Vec3::ZERO,
            half_extents: Vec3::new(0.3, 0.9, 0.3),
            eye_height: 1.6,
            look: Vec3::Z,
            reach: 4.0,
            health: 20.0,
            max_health: 20.0,
            team,
            burn_ticks: 0,
            statuses: FxHashMap::default(),
        }
    }

    /// Set the look direction (builder pattern). Normalized.
    #[must_use]
    pub fn with_look(mut self, look: Vec3) -> Self {
        self.look = look.try_normalize().unwrap_or(Vec3::Z);
        self
    }

    /// Set health and max health (builder pattern).
    #[must_use]
    pub fn with_health(mut self, health: f32) -> Self {
        self.health = health;
        self.max_health = health;
        self
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// World-space eye position.
    #[must_use]
    pub fn eye_pos(&self) -> Vec3 {
        self.pos + Vec3::Y * self.eye_height
    }

    /// Center of the bounding box.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.pos + Vec3::Y * self.half_extents.y
    }

    /// Bounding box, optionally inflated by `margin` on every side.
    #[must_use]
    pub fn aabb(&self, margin: f32) -> (Vec3, Vec3) {
        let center = self.center();
        let half = self.half_extents + Vec3::splat(margin);
        (center - half, center + half)
    }

    /// Apply damage. Returns true if any health was actually removed.
    pub fn damage(&mut self, amount: f32) -> bool {
        if amount <= 0.0 || !self.is_alive() {
            return false;
        }
        self.health = (self.health - amount).max(0.0);
        true
    }

    /// Restore health up to the maximum. Returns true if any was restored.
    pub fn heal(&mut self, amount: f32) -> bool {
        if amount <= 0.0 || !self.is_alive() || self.health >= self.max_health {
            return false;
        }
        self.health = (self.health + amount).min(self.max_health);
        true
    }

    /// Set the entity burning for at least `ticks`. Never shortens an
    /// existing burn.
    pub fn ignite(&mut self, ticks: u32) {
        self.burn_ticks = self.burn_ticks.max(ticks);
    }

    /// Apply a status for at least `ticks`.
    pub fn apply_status(&mut self, status: Status, ticks: u32) {
        let entry = self.statuses.entry(status).or_insert(0);
        *entry = (*entry).max(ticks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_display() {
        assert_eq!(format!("{}", EntityId(42)), "Entity(42)");
    }

    #[test]
    fn test_damage_and_heal() {
        let mut e = Entity::new(Team::Hostile, Vec3::ZERO).with_health(10.0);

        assert!(e.damage(4.0));
        assert_eq!(e.health, 6.0);

        assert!(e.heal(2.0));
        assert_eq!(e.health, 8.0);

        // Heal caps at max
        assert!(e.heal(100.0));
        assert_eq!(e.health, 10.0);
        assert!(!e.heal(1.0));
    }

    #[test]
    fn test_damage_kills() {
        let mut e = Entity::new(Team::Hostile, Vec3::ZERO).with_health(5.0);
        assert!(e.damage(50.0));
        assert_eq!(e.health, 0.0);
        assert!(!e.is_alive());

        // Dead entities take no further damage or healing
        assert!(!e.damage(1.0));
        assert!(!e.heal(1.0));
    }

    #[test]
    fn test_ignite_never_shortens() {
        let mut e = Entity::new(Team::Hostile, Vec3::ZERO);
        e.ignite(100);
        e.ignite(40);
        assert_eq!(e.burn_ticks, 100);
        e.ignite(160);
        assert_eq!(e.burn_ticks, 160);
    }

    #[test]
    fn test_status_stacking_keeps_longest() {
        let mut e = Entity::new(Team::Friendly, Vec3::ZERO);
        e.apply_status(Status::Slow, 60);
        e.apply_status(Status::Slow, 20);
        assert_eq!(e.statuses[&Status::Slow], 60);
    }

    #[test]
    fn test_aabb_inflation() {
        let e = Entity::new(Team::Friendly, Vec3::new(0.0, 10.0, 0.0));
        let (min, max) = e.aabb(0.3);
        assert!((max.x - min.x - 1.2).abs() < 1e-5);
        assert!((max.y - min.y - 2.4).abs() < 1e-5);
    }

    #[test]
    fn test_eye_pos() {
        let e = Entity::new(Team::Friendly, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(e.eye_pos(), Vec3::new(1.0, 3.6, 3.0));
    }
}
