//! Thrown projectile: ballistic flight with optional bounce or seeking.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::entity::EntityId;
use crate::core::geom::{segment_aabb_entry, walk_voxels, Target, Trajectory};
use crate::core::world::World;

use super::{acquire_target, still_valid, Body, Step, GRAVITY, SCAN_INTERVAL};

/// Radius in which a seeking projectile looks for a pursuit target.
const SEEK_RADIUS: f32 = 16.0;
/// Fraction of the heading steered toward the target each tick.
const STEER_BLEND: f32 = 0.25;
/// Speed retained across a bounce.
const BOUNCE_DAMPING: f32 = 0.6;
/// Below this speed a bouncy projectile bursts where it rests.
const MIN_BOUNCE_SPEED: f32 = 0.05;
/// Margin by which entity boxes are inflated for flight collision,
/// matching the engine raycast.
const HIT_MARGIN: f32 = 0.3;

/// Flight behavior chosen by the projectile node's `option` setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileOption {
    Normal,
    /// Reflects off block faces instead of triggering, losing speed.
    Bouncy,
    /// Curves toward the nearest visible ally.
    SeekFriend,
    /// Curves toward the nearest visible enemy.
    SeekFoe,
}

impl ProjectileOption {
    /// Map the node setting value. Out-of-range values were clamped by the
    /// node layer, so every value it can hand us is covered.
    #[must_use]
    pub fn from_setting(value: i32) -> Self {
        match value {
            1 => Self::Bouncy,
            2 => Self::SeekFriend,
            3 => Self::SeekFoe,
            _ => Self::Normal,
        }
    }

    #[must_use]
    pub fn is_seeking(self) -> bool {
        matches!(self, Self::SeekFriend | Self::SeekFoe)
    }

    #[must_use]
    pub fn seeks_friendly(self) -> bool {
        self == Self::SeekFriend
    }
}

/// A projectile in flight.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectileCarrier {
    pub option: ProjectileOption,
    /// Current pursuit target, revalidated every tick.
    seek: Option<Uuid>,
}

impl ProjectileCarrier {
    #[must_use]
    pub fn new(option: ProjectileOption) -> Self {
        Self { option, seek: None }
    }

    pub(crate) fn tick(
        &mut self,
        world: &mut World,
        body: &mut Body,
        owner: EntityId,
        age: u32,
    ) -> Step {
        if self.option.is_seeking() {
            self.steer(world, body, owner, age);
        }

        body.vel.y -= GRAVITY;
        let p0 = body.pos;
        let p1 = p0 + body.vel;
        let seg_len = body.vel.length();
        if seg_len < 1e-6 {
            body.pos = p1;
            return Step::Continue;
        }
        let dir = body.vel / seg_len;

        let mut block_hit = None;
        walk_voxels(p0, dir, seg_len, |pos, face, t| {
            if world.has_block(pos) {
                block_hit = Some((pos, face, t));
                true
            } else {
                false
            }
        });
        let block_dist = block_hit.map_or(f32::INFINITY, |(_, _, t)| t);

        let mut best_entity: Option<(EntityId, f32)> = None;
        for e in world.entities() {
            if !e.is_alive() || e.id == owner {
                continue;
            }
            let (min, max) = e.aabb(HIT_MARGIN);
            if let Some(t) = segment_aabb_entry(p0, p1, min, max) {
                let dist = t * seg_len;
                if best_entity.is_none_or(|(_, d)| dist < d) {
                    best_entity = Some((e.id, dist));
                }
            }
        }

        match (best_entity, block_hit) {
            (Some((id, dist)), _) if dist <= block_dist => {
                let point = p0 + dir * dist;
                Step::Trigger {
                    resumes: vec![(Trajectory::new(p0, dir), Target::Entity { id, point })],
                    despawn: true,
                }
            }
            (_, Some((pos, face, t))) => {
                let point = p0 + dir * t;
                if self.option == ProjectileOption::Bouncy {
                    let n = face.normal();
                    // Rest just off the struck face so the next segment
                    // starts outside the block.
                    body.pos = p0 + dir * (t - 0.01).max(0.0);
                    body.vel = (body.vel - n * (2.0 * body.vel.dot(n))) * BOUNCE_DAMPING;
                    if body.vel.length() < MIN_BOUNCE_SPEED {
                        return Step::Trigger {
                            resumes: vec![(
                                Trajectory::new(p0, dir),
                                Target::Block { pos, face, point },
                            )],
                            despawn: true,
                        };
                    }
                    Step::Continue
                } else {
                    Step::Trigger {
                        resumes: vec![(Trajectory::new(p0, dir), Target::Block { pos, face, point })],
                        despawn: true,
                    }
                }
            }
            (Some((id, dist)), None) => {
                let point = p0 + dir * dist;
                Step::Trigger {
                    resumes: vec![(Trajectory::new(p0, dir), Target::Entity { id, point })],
                    despawn: true,
                }
            }
            (None, None) => {
                body.pos = p1;
                Step::Continue
            }
        }
    }

    /// Revalidate the pursuit target, reacquire on the scan cadence, and
    /// blend the heading toward it. A lost target leaves the projectile
    /// flying its last heading until the next scan.
    fn steer(&mut self, world: &World, body: &mut Body, owner: EntityId, age: u32) {
        if let Some(uuid) = self.seek {
            if still_valid(world, uuid).is_none() {
                self.seek = None;
            }
        }
        if self.seek.is_none() && age % SCAN_INTERVAL == 0 {
            if let Some(id) = acquire_target(
                world,
                body.pos,
                owner,
                self.option.seeks_friendly(),
                SEEK_RADIUS,
            ) {
                self.seek = world.entity(id).map(|e| e.uuid);
            }
        }

        let Some(uuid) = self.seek else { return };
        let Some(id) = still_valid(world, uuid) else { return };
        let Some(target) = world.entity(id) else { return };

        let speed = body.vel.length();
        if speed < 1e-6 {
            return;
        }
        if let Some(to_target) = (target.center() - body.pos).try_normalize() {
            let heading = body.vel / speed;
            body.vel = heading.lerp(to_target, STEER_BLEND).normalize() * speed;
        }
    }
}
