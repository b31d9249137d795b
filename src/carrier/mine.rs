//! Mine carrier: falls, lands, arms after a delay, detonates once.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::entity::EntityId;
use crate::core::geom::{walk_voxels, BlockPos, Target, Trajectory};
use crate::core::world::World;

use super::{Body, Step, GRAVITY, SCAN_INTERVAL};

/// Ticks between landing and the mine going live.
pub(crate) const ARM_DELAY: u32 = 40;
/// Detonation radius around the resting position.
const TRIGGER_RADIUS: f32 = 1.0;

/// A placed (or still falling) mine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MineCarrier {
    /// Detonate for allies of the owner instead of enemies.
    pub target_friendly: bool,
    landed: bool,
    /// Age at which the mine goes live, set on landing.
    armed_at: Option<u32>,
}

impl MineCarrier {
    #[must_use]
    pub fn new(target_friendly: bool) -> Self {
        Self {
            target_friendly,
            landed: false,
            armed_at: None,
        }
    }

    #[must_use]
    pub fn is_armed(&self, age: u32) -> bool {
        self.armed_at.is_some_and(|at| age >= at)
    }

    pub(crate) fn tick(
        &mut self,
        world: &mut World,
        body: &mut Body,
        owner: EntityId,
        age: u32,
    ) -> Step {
        if !self.landed {
            self.fall(world, body, age);
            return Step::Continue;
        }
        if !self.is_armed(age) || age % SCAN_INTERVAL != 0 {
            return Step::Continue;
        }

        let Some(owner_team) = world.entity(owner).map(|e| e.team) else {
            return Step::Continue;
        };
        let victims: Vec<EntityId> = world
            .entities_in_radius(body.pos, TRIGGER_RADIUS)
            .into_iter()
            .filter(|&id| id != owner)
            .filter(|&id| {
                world
                    .entity(id)
                    .is_some_and(|e| (e.team == owner_team) == self.target_friendly)
            })
            .collect();
        if victims.is_empty() {
            return Step::Continue;
        }

        // Single-shot: one detonation covers everyone inside the radius.
        let resumes = victims
            .into_iter()
            .filter_map(|id| {
                let center = world.entity(id)?.center();
                Some((
                    Trajectory::new(body.pos, center - body.pos),
                    Target::Entity { id, point: center },
                ))
            })
            .collect();
        Step::Trigger {
            resumes,
            despawn: true,
        }
    }

    fn fall(&mut self, world: &World, body: &mut Body, age: u32) {
        body.vel.y -= GRAVITY;
        let next = body.pos + body.vel;

        // Walk every cell the fall segment crosses so a fast drop cannot
        // skip past a thin floor between ticks.
        let mut rest_y = None;
        walk_voxels(body.pos, Vec3::NEG_Y, -body.vel.y, |cell, _, _| {
            if world.has_block(cell) {
                rest_y = Some(cell.y as f32 + 1.0);
                return true;
            }
            false
        });
        if rest_y.is_none() {
            // Settle early when hovering within a sliver of a surface
            // without crossing a cell boundary this tick.
            let below = BlockPos::containing(next - Vec3::Y * 0.05);
            if world.has_block(below) && !world.has_block(BlockPos::containing(next)) {
                rest_y = Some(below.y as f32 + 1.0);
            }
        }

        match rest_y {
            Some(y) => {
                body.pos = Vec3::new(body.pos.x, y, body.pos.z);
                body.vel = Vec3::ZERO;
                self.landed = true;
                self.armed_at = Some(age + ARM_DELAY);
            }
            None => body.pos = next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::{Entity, Team};
    use crate::core::world::{Block, BlockKind};

    fn floored_world() -> World {
        let mut world = World::new(1);
        for x in -4..5 {
            for z in -4..5 {
                world.set_block(BlockPos::new(x, 0, z), Block::new(BlockKind(1), 1.0));
            }
        }
        world
    }

    fn land(mine: &mut MineCarrier, world: &mut World, body: &mut Body, owner: EntityId) -> u32 {
        let mut age = 0;
        while !mine.landed {
            age += 1;
            assert!(age < 1000, "mine never landed");
            mine.tick(world, body, owner, age);
        }
        age
    }

    #[test]
    fn test_falls_until_landing() {
        let mut world = floored_world();
        let owner = world.spawn(Entity::new(Team::Friendly, Vec3::new(3.0, 1.0, 3.0)));

        let mut mine = MineCarrier::new(false);
        let mut body = Body {
            pos: Vec3::new(0.5, 5.0, 0.5),
            vel: Vec3::ZERO,
        };
        land(&mut mine, &mut world, &mut body, owner);

        assert_eq!(body.pos.y, 1.0);
        assert_eq!(body.vel, Vec3::ZERO);
        assert!(mine.armed_at.is_some());
    }

    #[test]
    fn test_high_drop_lands_on_thin_floor() {
        // From this height the per-tick drop exceeds a full block well
        // before impact, so the fall segment must be scanned cell by cell.
        let mut world = floored_world();
        let owner = world.spawn(Entity::new(Team::Friendly, Vec3::new(3.0, 1.0, 3.0)));

        let mut mine = MineCarrier::new(false);
        let mut body = Body {
            pos: Vec3::new(0.5, 120.5, 0.5),
            vel: Vec3::ZERO,
        };
        land(&mut mine, &mut world, &mut body, owner);

        assert_eq!(body.pos, Vec3::new(0.5, 1.0, 0.5));
        assert_eq!(body.vel, Vec3::ZERO);
    }

    #[test]
    fn test_no_detonation_before_arm_delay() {
        let mut world = floored_world();
        let owner = world.spawn(Entity::new(Team::Friendly, Vec3::new(3.0, 1.0, 3.0)));
        world.spawn(Entity::new(Team::Hostile, Vec3::new(0.5, 1.0, 0.5)));

        let mut mine = MineCarrier::new(false);
        let mut body = Body {
            pos: Vec3::new(0.5, 1.2, 0.5),
            vel: Vec3::ZERO,
        };
        let landed_at = land(&mut mine, &mut world, &mut body, owner);

        // Enemy is standing right on top, but the mine is not yet live.
        for age in (landed_at + 1)..(landed_at + ARM_DELAY) {
            let step = mine.tick(&mut world, &mut body, owner, age);
            assert!(matches!(step, Step::Continue));
        }
    }

    #[test]
    fn test_detonates_once_armed() {
        let mut world = floored_world();
        let owner = world.spawn(Entity::new(Team::Friendly, Vec3::new(3.0, 1.0, 3.0)));
        let victim = world.spawn(Entity::new(Team::Hostile, Vec3::new(0.5, 1.0, 0.5)));

        let mut mine = MineCarrier::new(false);
        let mut body = Body {
            pos: Vec3::new(0.5, 1.2, 0.5),
            vel: Vec3::ZERO,
        };
        let landed_at = land(&mut mine, &mut world, &mut body, owner);

        let mut fired = None;
        for age in (landed_at + ARM_DELAY)..(landed_at + ARM_DELAY + SCAN_INTERVAL + 1) {
            if let Step::Trigger { resumes, despawn } = mine.tick(&mut world, &mut body, owner, age)
            {
                assert!(despawn);
                assert_eq!(resumes.len(), 1);
                assert_eq!(resumes[0].1.entity(), Some(victim));
                fired = Some(age);
                break;
            }
        }
        assert!(fired.is_some(), "armed mine never detonated");
    }

    #[test]
    fn test_ignores_owner_and_wrong_team() {
        let mut world = floored_world();
        // Owner and an ally stand on the mine; it targets enemies.
        let owner = world.spawn(Entity::new(Team::Friendly, Vec3::new(0.5, 1.0, 0.5)));
        world.spawn(Entity::new(Team::Friendly, Vec3::new(0.6, 1.0, 0.6)));

        let mut mine = MineCarrier::new(false);
        let mut body = Body {
            pos: Vec3::new(0.5, 1.2, 0.5),
            vel: Vec3::ZERO,
        };
        let landed_at = land(&mut mine, &mut world, &mut body, owner);

        for age in (landed_at + ARM_DELAY)..(landed_at + ARM_DELAY + 20) {
            assert!(matches!(
                mine.tick(&mut world, &mut body, owner, age),
                Step::Continue
            ));
        }
    }

    #[test]
    fn test_friendly_mode_detonates_for_allies() {
        let mut world = floored_world();
        let owner = world.spawn(Entity::new(Team::Friendly, Vec3::new(3.0, 1.0, 3.0)));
        let ally = world.spawn(Entity::new(Team::Friendly, Vec3::new(0.5, 1.0, 0.5)));

        let mut mine = MineCarrier::new(true);
        let mut body = Body {
            pos: Vec3::new(0.5, 1.2, 0.5),
            vel: Vec3::ZERO,
        };
        let landed_at = land(&mut mine, &mut world, &mut body, owner);

        let mut hit = false;
        for age in (landed_at + ARM_DELAY)..(landed_at + ARM_DELAY + SCAN_INTERVAL + 1) {
            if let Step::Trigger { resumes, .. } = mine.tick(&mut world, &mut body, owner, age) {
                assert_eq!(resumes[0].1.entity(), Some(ally));
                hit = true;
                break;
            }
        }
        assert!(hit);
    }
}
