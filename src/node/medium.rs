//! Medium delivery behavior that resolves synchronously.
//!
//! Touch and Bolt are plain raycasts against the world (the preference for
//! entity hits lives in `World::raycast`); Plan turns one block hit into a
//! whole region of block targets. The intermediary mediums have no code
//! here: their behavior lives in the carrier module.

use glam::Vec3;

use crate::core::geom::{walk_voxels, BlockPos, Face, Target, Trajectory};
use crate::core::world::World;

/// Ray length of the bolt medium.
pub const BOLT_RANGE: f32 = 16.0;
/// Ray length plan uses to find its seed block.
pub const PLAN_RANGE: f32 = 8.0;

/// Volume fill: spread across any adjacent placed blocks.
pub const PLAN_MODE_VOLUME: i32 = 0;
/// Surface fill: spread across same-kind blocks exposed on the hit face.
pub const PLAN_MODE_SURFACE: i32 = 1;

/// First block struck along a trajectory, ignoring entities.
#[must_use]
pub fn first_block_hit(world: &World, traj: Trajectory, range: f32) -> Option<(BlockPos, Face, f32)> {
    let mut hit = None;
    walk_voxels(traj.origin, traj.direction, range, |pos, face, t| {
        if world.has_block(pos) {
            hit = Some((pos, face, t));
            true
        } else {
            false
        }
    });
    hit
}

/// Resolve a plan region into block targets.
///
/// Raycasts for a seed block, then flood-fills outward up to `size` blocks:
/// in volume mode across any placed neighbor, in surface mode across
/// same-kind neighbors that share the seed's exposed face. The result is
/// sorted by distance from the initial hit, nearest first, and every
/// target carries the seed's hit face.
#[must_use]
pub fn plan_targets(world: &World, traj: Trajectory, mode: i32, size: usize) -> Vec<Target> {
    let Some((seed, face, _)) = first_block_hit(world, traj, PLAN_RANGE) else {
        return Vec::new();
    };
    let seed_kind = match world.block(seed) {
        Some(block) => block.kind,
        None => return Vec::new(),
    };

    let surface = mode == PLAN_MODE_SURFACE;
    let mut region: Vec<BlockPos> = vec![seed];
    let mut seen = rustc_hash::FxHashSet::default();
    seen.insert(seed);
    let mut frontier = vec![seed];

    while region.len() < size && !frontier.is_empty() {
        let mut next = Vec::new();
        for pos in frontier {
            for neighbor in pos.neighbors() {
                if region.len() >= size || seen.contains(&neighbor) {
                    continue;
                }
                let Some(block) = world.block(neighbor) else {
                    continue;
                };
                if surface
                    && (block.kind != seed_kind || world.has_block(neighbor.offset(face)))
                {
                    continue;
                }
                seen.insert(neighbor);
                region.push(neighbor);
                next.push(neighbor);
            }
        }
        frontier = next;
    }

    region.sort_by(|a, b| {
        a.distance_squared(&seed)
            .total_cmp(&b.distance_squared(&seed))
    });

    region
        .into_iter()
        .map(|pos| Target::Block {
            pos,
            face,
            point: pos.center() + face.normal() * 0.5,
        })
        .collect()
}

/// Continuation trajectory after a hit: same heading, rebased at the point
/// of impact (nudged slightly back so a follow-up ray does not start inside
/// the struck volume).
#[must_use]
pub fn continuation(traj: Trajectory, point: Vec3) -> Trajectory {
    traj.rebased(point - traj.direction * 0.01)
}
