//! Cloud carrier: a stationary volume that pulses its remainder onto
//! whatever lingers inside it.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::cooldown::CooldownKey;
use crate::core::entity::EntityId;
use crate::core::geom::{BlockPos, Face, Target, Trajectory};
use crate::core::world::World;

use super::{Body, Step};

/// Ticks between pulses.
const PULSE_INTERVAL: u32 = 5;
/// Per-target cooldown window, in world ticks. Shared between entity hits
/// and block probes through the world cooldown map, so a target hit by one
/// pulse is immune to the next few regardless of pulse phase.
const COOLDOWN_WINDOW: u64 = 20;
/// Random block positions sampled inside the volume per pulse.
const PROBES_PER_PULSE: u32 = 2;

/// A lingering cloud volume.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CloudCarrier {
    pub radius: f32,
}

impl CloudCarrier {
    #[must_use]
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }

    pub(crate) fn tick(
        &mut self,
        world: &mut World,
        body: &mut Body,
        _owner: EntityId,
        age: u32,
    ) -> Step {
        if age % PULSE_INTERVAL != 0 {
            return Step::Continue;
        }
        let now = world.tick;
        let center = body.pos;
        let mut resumes = Vec::new();

        for id in world.entities_in_radius(center, self.radius) {
            let Some(e) = world.entity(id) else { continue };
            let (uuid, point) = (e.uuid, e.center());
            if world
                .cooldowns
                .try_claim(CooldownKey::Entity(uuid), now, COOLDOWN_WINDOW)
            {
                resumes.push((
                    Trajectory::new(center, point - center),
                    Target::Entity { id, point },
                ));
            }
        }

        // Blind probes give block-facing remainders (break, etc.) a chance
        // to land without scanning the whole volume every pulse.
        for _ in 0..PROBES_PER_PULSE {
            let offset = Vec3::new(
                world.rng.gen_range_f32(-self.radius..self.radius),
                world.rng.gen_range_f32(-self.radius..self.radius),
                world.rng.gen_range_f32(-self.radius..self.radius),
            );
            let pos = BlockPos::containing(center + offset);
            if world.has_block(pos)
                && world
                    .cooldowns
                    .try_claim(CooldownKey::Block(pos), now, COOLDOWN_WINDOW)
            {
                let point = pos.center() + Vec3::Y * 0.5;
                resumes.push((
                    Trajectory::new(center, point - center),
                    Target::Block {
                        pos,
                        face: Face::Up,
                        point,
                    },
                ));
            }
        }

        if resumes.is_empty() {
            Step::Continue
        } else {
            Step::Trigger {
                resumes,
                despawn: false,
            }
        }
    }
}
