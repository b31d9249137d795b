//! Delivery carriers: entities that hold an unexecuted remainder of a
//! focus tree and resume it when their trigger fires.
//!
//! Every carrier shares one state machine
//! (`Spawned → Active → Triggered → Despawned`) and one per-tick shape:
//! revalidate first (TTL, owner resolvable), then advance kind-specific
//! logic, then feed any trigger back into the engine. Carriers persist the
//! remaining package and owner UUID verbatim; a carrier whose owner cannot
//! be resolved after a reload discards itself on its first tick instead of
//! resuming against a missing actor.

mod cloud;
mod mine;
mod projectile;
mod summon;

pub use cloud::CloudCarrier;
pub use mine::MineCarrier;
pub use projectile::{ProjectileCarrier, ProjectileOption};
pub use summon::SummonCarrier;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::core::entity::EntityId;
use crate::core::geom::{Target, Trajectory};
use crate::core::world::World;
use crate::engine;
use crate::node::{Node, NodeKey};
use crate::package::RemainingPackage;

/// Launch speed of a thrown projectile, blocks per tick.
pub(crate) const PROJECTILE_SPEED: f32 = 1.5;
/// Downward acceleration applied to falling carriers, blocks per tick².
pub(crate) const GRAVITY: f32 = 0.03;
/// Interval between target reacquisition attempts and proximity polls.
pub(crate) const SCAN_INTERVAL: u32 = 5;

const PROJECTILE_TTL: u32 = 100;
const MINE_TTL: u32 = 1200;
const SUMMON_TTL: u32 = 300;
const TICKS_PER_SECOND: u32 = 20;

/// Carrier lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CarrierState {
    Spawned,
    /// Flying, waiting, or persisting, depending on kind.
    Active,
    Triggered,
    Despawned,
}

/// Position and velocity shared by every carrier kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec3,
    pub vel: Vec3,
}

/// Kind-specific carrier state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum CarrierKind {
    Projectile(ProjectileCarrier),
    Mine(MineCarrier),
    Cloud(CloudCarrier),
    Summon(SummonCarrier),
}

/// What a kind-specific tick decided.
pub(crate) enum Step {
    Continue,
    Trigger {
        resumes: Vec<(Trajectory, Target)>,
        despawn: bool,
    },
}

/// An entity owning a suspended focus continuation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Carrier {
    pub kind: CarrierKind,
    pub remaining: RemainingPackage,
    /// Owner identity, persisted verbatim and re-resolved every tick.
    pub owner: Uuid,
    /// Power scalar bound at handoff time.
    pub power: f32,
    pub body: Body,
    /// Ticks lived so far.
    pub age: u32,
    /// Ticks after which the carrier discards itself.
    pub ttl: u32,
    pub state: CarrierState,
}

impl Carrier {
    /// Build the carrier for an intermediary node, launched along `traj`.
    ///
    /// `power` must already include the node's power multiplier; the
    /// engine applies it at handoff.
    #[must_use]
    pub fn spawn(node: &Node, traj: Trajectory, power: f32, remaining: RemainingPackage) -> Self {
        debug_assert!(node.key.has_intermediary());
        let owner = remaining.caster;
        let (kind, vel, ttl) = match node.key {
            NodeKey::Projectile => (
                CarrierKind::Projectile(ProjectileCarrier::new(ProjectileOption::from_setting(
                    node.setting("option"),
                ))),
                traj.direction * PROJECTILE_SPEED,
                PROJECTILE_TTL,
            ),
            NodeKey::Mine => (
                CarrierKind::Mine(MineCarrier::new(node.setting("target_friendly") == 1)),
                Vec3::ZERO,
                MINE_TTL,
            ),
            NodeKey::Cloud => (
                CarrierKind::Cloud(CloudCarrier::new(node.setting("radius") as f32)),
                Vec3::ZERO,
                node.setting("duration") as u32 * TICKS_PER_SECOND,
            ),
            NodeKey::SpellBat => (
                CarrierKind::Summon(SummonCarrier::new()),
                traj.direction * summon::SUMMON_SPEED,
                SUMMON_TTL,
            ),
            _ => unreachable!("spawn called for a non-intermediary node"),
        };
        Self {
            kind,
            remaining,
            owner,
            power,
            body: Body {
                pos: traj.origin,
                vel,
            },
            age: 0,
            ttl,
            state: CarrierState::Spawned,
        }
    }

    /// Advance one tick: revalidate, run kind logic, resume on trigger.
    pub fn tick(&mut self, world: &mut World) {
        if self.state == CarrierState::Despawned {
            return;
        }
        self.age += 1;

        if self.age >= self.ttl {
            debug!(owner = %self.owner, "carrier expired");
            self.state = CarrierState::Despawned;
            return;
        }
        let Some(owner_id) = world.resolve_actor(self.owner) else {
            debug!(owner = %self.owner, "carrier owner unresolvable, discarding");
            self.state = CarrierState::Despawned;
            return;
        };

        self.state = CarrierState::Active;
        let step = match &mut self.kind {
            CarrierKind::Projectile(p) => p.tick(world, &mut self.body, owner_id, self.age),
            CarrierKind::Mine(m) => m.tick(world, &mut self.body, owner_id, self.age),
            CarrierKind::Cloud(c) => c.tick(world, &mut self.body, owner_id, self.age),
            CarrierKind::Summon(s) => s.tick(world, &mut self.body, owner_id, self.age),
        };

        match step {
            Step::Continue => {}
            Step::Trigger { resumes, despawn } => {
                self.state = CarrierState::Triggered;
                for (traj, target) in resumes {
                    engine::resume(world, &self.remaining, self.power, &[traj], &[target]);
                }
                if despawn {
                    self.state = CarrierState::Despawned;
                }
            }
        }
    }
}

/// Tick every live carrier once.
///
/// The list is detached so resumes that spawn new carriers (a projectile
/// inside a projectile) land in the live list without aliasing the one
/// being walked. Carrier triggers across one tick are independent and run
/// in spawn order.
pub fn tick_all(world: &mut World) {
    let mut carriers = world.take_carriers();
    for carrier in &mut carriers {
        carrier.tick(world);
    }
    carriers.retain(|c| c.state != CarrierState::Despawned);
    world.restore_carriers(carriers);
}

/// Nearest live entity matching a friend/enemy filter with clear line of
/// sight, excluding the owner itself.
#[must_use]
pub(crate) fn acquire_target(
    world: &World,
    from: Vec3,
    owner: EntityId,
    friendly: bool,
    radius: f32,
) -> Option<EntityId> {
    let owner_team = world.entity(owner)?.team;
    world
        .entities_in_radius(from, radius)
        .into_iter()
        .filter(|&id| id != owner)
        .filter(|&id| {
            world
                .entity(id)
                .is_some_and(|e| (e.team == owner_team) == friendly)
        })
        .find(|&id| {
            world
                .entity(id)
                .is_some_and(|e| world.los_clear(from, e.center()))
        })
}

/// Whether an already-acquired entity is still a valid pursuit target.
#[must_use]
pub(crate) fn still_valid(world: &World, uuid: Uuid) -> Option<EntityId> {
    world.resolve_actor(uuid)
}
