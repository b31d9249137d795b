//! Core world model: entities, geometry, randomness, cooldowns, the world
//! session handle.

pub mod cooldown;
pub mod entity;
pub mod geom;
pub mod rng;
pub mod world;

pub use cooldown::{CooldownKey, CooldownMap};
pub use entity::{Entity, EntityId, Status, Team};
pub use geom::{BlockPos, Face, Target, Trajectory};
pub use rng::{CastRng, CastRngState};
pub use world::{Block, BlockKind, World};
