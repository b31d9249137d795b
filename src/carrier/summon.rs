//! Summoned spell-bat: a short-lived homing carrier that delivers its
//! remainder on contact with the first enemy it catches.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::entity::EntityId;
use crate::core::geom::{segment_sphere_hit, Target, Trajectory};
use crate::core::world::World;

use super::{acquire_target, still_valid, Body, Step, SCAN_INTERVAL};

/// Flight speed, blocks per tick.
pub(crate) const SUMMON_SPEED: f32 = 0.5;
/// Distance at which contact counts and the remainder fires.
const CONTACT_RADIUS: f32 = 1.0;
/// Radius in which the bat hunts for prey.
const SEEK_RADIUS: f32 = 16.0;
/// Ticks between heading changes while wandering without prey.
const WANDER_INTERVAL: u32 = 10;

/// A spell-bat in flight.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SummonCarrier {
    /// Current prey, revalidated every tick.
    target: Option<Uuid>,
}

impl SummonCarrier {
    #[must_use]
    pub fn new() -> Self {
        Self { target: None }
    }

    pub(crate) fn tick(
        &mut self,
        world: &mut World,
        body: &mut Body,
        owner: EntityId,
        age: u32,
    ) -> Step {
        if let Some(uuid) = self.target {
            if still_valid(world, uuid).is_none() {
                self.target = None;
            }
        }
        if self.target.is_none() && age % SCAN_INTERVAL == 0 {
            if let Some(id) = acquire_target(world, body.pos, owner, false, SEEK_RADIUS) {
                self.target = world.entity(id).map(|e| e.uuid);
            }
        }

        let prey = self
            .target
            .and_then(|uuid| still_valid(world, uuid))
            .and_then(|id| world.entity(id).map(|e| (id, e.center())));
        match prey {
            Some((id, center)) => {
                let to_prey = center - body.pos;
                body.vel = to_prey.normalize_or(Vec3::Y) * SUMMON_SPEED;
                let next = body.pos + body.vel;
                // Contact is checked over the whole movement segment so a
                // fast closing pass cannot slip through the radius.
                if segment_sphere_hit(body.pos, next, center, CONTACT_RADIUS) {
                    return Step::Trigger {
                        resumes: vec![(
                            Trajectory::new(body.pos, to_prey),
                            Target::Entity { id, point: center },
                        )],
                        despawn: true,
                    };
                }
                body.pos = next;
            }
            None => {
                if age % WANDER_INTERVAL == 0 {
                    let jitter = Vec3::new(
                        world.rng.gen_range_f32(-1.0..1.0),
                        world.rng.gen_range_f32(-0.3..0.3),
                        world.rng.gen_range_f32(-1.0..1.0),
                    );
                    let heading = (body.vel + jitter * 0.5).normalize_or(Vec3::Z);
                    body.vel = heading * SUMMON_SPEED;
                }
                body.pos += body.vel;
            }
        }
        Step::Continue
    }
}

impl Default for SummonCarrier {
    fn default() -> Self {
        Self::new()
    }
}
