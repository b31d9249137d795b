//! The world/session handle.
//!
//! `World` owns every piece of mutable session state the engine and the
//! carriers touch: the entity table with its UUID index, the block table,
//! the tick counter, the live carriers, the cooldown map, and the cast RNG.
//! One `World` is one session; dropping it drops all of that together.

use glam::Vec3;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::carrier::Carrier;

use super::cooldown::CooldownMap;
use super::entity::{Entity, EntityId};
use super::geom::{segment_aabb_entry, walk_voxels, BlockPos, Face, Target, Trajectory};
use super::rng::CastRng;

/// Opaque block type tag. The engine only compares kinds for equality
/// (plan surface fills) and reads hardness; hosts assign meaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockKind(pub u16);

impl BlockKind {
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }
}

/// A placed block.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    /// Break resistance; negative means unbreakable.
    pub hardness: f32,
}

impl Block {
    #[must_use]
    pub const fn new(kind: BlockKind, hardness: f32) -> Self {
        Self { kind, hardness }
    }
}

/// Margin by which entity bounding boxes are inflated for the raycast.
const HIT_MARGIN: f32 = 0.3;

/// One world session.
pub struct World {
    entities: FxHashMap<EntityId, Entity>,
    by_uuid: FxHashMap<Uuid, EntityId>,
    blocks: FxHashMap<BlockPos, Block>,
    carriers: Vec<Carrier>,
    next_id: u32,
    /// Current game tick.
    pub tick: u64,
    /// Shared cooldown state for cloud pulses and probes.
    pub cooldowns: CooldownMap,
    /// Deterministic randomness for scatter forks, probes, and wander.
    pub rng: CastRng,
}

impl World {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            entities: FxHashMap::default(),
            by_uuid: FxHashMap::default(),
            blocks: FxHashMap::default(),
            carriers: Vec::new(),
            next_id: 1,
            tick: 0,
            cooldowns: CooldownMap::new(),
            rng: CastRng::new(seed),
        }
    }

    // === Entities ===

    /// Insert an entity, assigning its id. Returns the assigned id.
    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        entity.id = id;
        self.by_uuid.insert(entity.uuid, id);
        self.entities.insert(id, entity);
        id
    }

    /// Remove an entity entirely.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(&id)?;
        self.by_uuid.remove(&entity.uuid);
        Some(entity)
    }

    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Resolve a persisted actor reference.
    ///
    /// Returns the live id only if the entity exists and is alive. This is
    /// the only way persisted state (packages, carriers) gets back to a
    /// live entity; ids are never held across ticks.
    #[must_use]
    pub fn resolve_actor(&self, uuid: Uuid) -> Option<EntityId> {
        let id = *self.by_uuid.get(&uuid)?;
        self.entities.get(&id).filter(|e| e.is_alive()).map(|e| e.id)
    }

    /// Alive entities whose AABB center is within `radius` of `center`.
    #[must_use]
    pub fn entities_in_radius(&self, center: Vec3, radius: f32) -> Vec<EntityId> {
        let r2 = radius * radius;
        let mut found: Vec<(f32, EntityId)> = self
            .entities
            .values()
            .filter(|e| e.is_alive())
            .filter_map(|e| {
                let d2 = e.center().distance_squared(center);
                (d2 <= r2).then_some((d2, e.id))
            })
            .collect();
        found.sort_by(|a, b| a.0.total_cmp(&b.0));
        found.into_iter().map(|(_, id)| id).collect()
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    // === Blocks ===

    pub fn set_block(&mut self, pos: BlockPos, block: Block) {
        self.blocks.insert(pos, block);
    }

    #[must_use]
    pub fn block(&self, pos: BlockPos) -> Option<&Block> {
        self.blocks.get(&pos)
    }

    #[must_use]
    pub fn has_block(&self, pos: BlockPos) -> bool {
        self.blocks.contains_key(&pos)
    }

    pub fn remove_block(&mut self, pos: BlockPos) -> Option<Block> {
        self.blocks.remove(&pos)
    }

    // === Queries ===

    /// Cast a ray against entities and blocks.
    ///
    /// Nearest hit wins; an entity hit beats a block hit at equal or
    /// shorter distance. Entity boxes are inflated by a small margin so
    /// near-grazes still count. `exclude` keeps a caster (or a carrier's
    /// owner) from striking itself.
    #[must_use]
    pub fn raycast(&self, traj: Trajectory, range: f32, exclude: Option<EntityId>) -> Target {
        let p0 = traj.origin;
        let p1 = traj.point_at(range);

        let mut block_hit: Option<(BlockPos, Face, f32)> = None;
        walk_voxels(p0, traj.direction, range, |pos, face, t| {
            if self.blocks.contains_key(&pos) {
                block_hit = Some((pos, face, t));
                true
            } else {
                false
            }
        });
        let block_dist = block_hit.map_or(f32::INFINITY, |(_, _, t)| t);

        let mut best_entity: Option<(EntityId, f32)> = None;
        for e in self.entities.values() {
            if !e.is_alive() || Some(e.id) == exclude {
                continue;
            }
            let (min, max) = e.aabb(HIT_MARGIN);
            if let Some(t) = segment_aabb_entry(p0, p1, min, max) {
                let dist = t * range;
                if best_entity.is_none_or(|(_, d)| dist < d) {
                    best_entity = Some((e.id, dist));
                }
            }
        }

        match (best_entity, block_hit) {
            (Some((id, dist)), _) if dist <= block_dist => Target::Entity {
                id,
                point: traj.point_at(dist),
            },
            (_, Some((pos, face, t))) => Target::Block {
                pos,
                face,
                point: traj.point_at(t),
            },
            (Some((id, dist)), None) => Target::Entity {
                id,
                point: traj.point_at(dist),
            },
            (None, None) => Target::Miss,
        }
    }

    /// True if no block obstructs the segment `from..to`.
    #[must_use]
    pub fn los_clear(&self, from: Vec3, to: Vec3) -> bool {
        let delta = to - from;
        let dist = delta.length();
        if dist < 1e-4 {
            return true;
        }
        let dir = delta / dist;
        let mut blocked = false;
        walk_voxels(from, dir, dist, |pos, _, _| {
            if self.blocks.contains_key(&pos) {
                blocked = true;
                true
            } else {
                false
            }
        });
        !blocked
    }

    // === Carriers ===

    pub fn push_carrier(&mut self, carrier: Carrier) {
        self.carriers.push(carrier);
    }

    #[must_use]
    pub fn carrier_count(&self) -> usize {
        self.carriers.len()
    }

    #[must_use]
    pub fn carriers(&self) -> &[Carrier] {
        &self.carriers
    }

    /// Detach the carrier list for ticking. `carrier::tick_all` takes the
    /// list, advances it, and puts survivors back; resumes that spawn new
    /// carriers push into the (empty) live list meanwhile.
    pub(crate) fn take_carriers(&mut self) -> Vec<Carrier> {
        std::mem::take(&mut self.carriers)
    }

    pub(crate) fn restore_carriers(&mut self, mut survivors: Vec<Carrier>) {
        survivors.append(&mut self.carriers);
        self.carriers = survivors;
    }

    // === Tick ===

    /// Advance world time by one tick: burn damage, status decay, cooldown
    /// purge. Carrier ticking is separate (`carrier::tick_all`) because it
    /// re-enters the engine.
    pub fn advance_tick(&mut self) {
        self.tick += 1;
        let tick = self.tick;

        for entity in self.entities.values_mut() {
            if entity.burn_ticks > 0 && entity.is_alive() {
                entity.burn_ticks -= 1;
                // One point of burn damage per second of burning.
                if entity.burn_ticks % 20 == 0 {
                    entity.damage(1.0);
                }
            }
            entity.statuses.retain(|_, ticks| {
                *ticks = ticks.saturating_sub(1);
                *ticks > 0
            });
        }

        if tick % 100 == 0 {
            self.cooldowns.purge_expired(tick);
        }
    }
}
