//! Effect leaves: concrete world and entity mutations.
//!
//! `apply` is the single dispatch point the engine calls per (effect node,
//! target) pair. It returns whether the effect actually changed anything;
//! a `false` is a local no-op and never aborts sibling branches. Internal
//! failures are logged and swallowed here so a bad leaf cannot kill the
//! walk or the hosting carrier.

use tracing::debug;

use crate::core::geom::Target;
use crate::core::entity::Status;
use crate::core::world::World;

use super::{Node, NodeKey};

/// Ticks per second of game time.
const TPS: u32 = 20;

/// Apply an effect node to one resolved target at the given power.
///
/// Damage, healing, and durations scale linearly with `power`; the closed
/// forms per kind are documented inline. Non-applicable pairings (a heal
/// aimed at a block, a break aimed at an entity, any effect on a miss)
/// return false.
pub fn apply(world: &mut World, node: &Node, power: f32, target: &Target) -> bool {
    debug_assert!(matches!(node.key.family(), super::NodeFamily::Effect));
    match target {
        Target::Entity { id, .. } => apply_to_entity(world, node, power, *id),
        Target::Block { pos, .. } => match node.key {
            NodeKey::Break => {
                let Some(block) = world.block(*pos) else {
                    return false;
                };
                // Negative hardness is unbreakable; otherwise break strength
                // scales with power.
                if block.hardness < 0.0 || block.hardness > power * 2.0 {
                    debug!(pos = %pos, hardness = block.hardness, "break failed");
                    return false;
                }
                world.remove_block(*pos).is_some()
            }
            _ => false,
        },
        Target::Miss => false,
    }
}

fn apply_to_entity(
    world: &mut World,
    node: &Node,
    power: f32,
    id: crate::core::entity::EntityId,
) -> bool {
    let Some(entity) = world.entity_mut(id) else {
        debug!(%id, key = %node.key, "effect target vanished");
        return false;
    };
    if !entity.is_alive() {
        debug!(%id, key = %node.key, "effect target already dead");
        return false;
    }

    let p = node.setting("power");
    let d = node.setting("duration");

    match node.key {
        // Fire: damage (power+3)*p, burn (1 + duration*2)*p seconds.
        NodeKey::Fire => {
            let dealt = entity.damage((p + 3) as f32 * power);
            let burn_secs = (1 + d * 2) as f32 * power;
            if burn_secs > 0.0 {
                entity.ignite((burn_secs * TPS as f32) as u32);
            }
            dealt
        }
        // Frost: damage (power+1)*p, slow (2 + duration*2)*p seconds.
        NodeKey::Frost => {
            let dealt = entity.damage((p + 1) as f32 * power);
            let slow_secs = (2 + d * 2) as f32 * power;
            entity.apply_status(Status::Slow, (slow_secs * TPS as f32) as u32);
            dealt
        }
        // Heal: restore (power+2)*p.
        NodeKey::Heal => entity.heal((p + 2) as f32 * power),
        // Curse: damage power*p, weakness (2 + duration*2)*p seconds.
        NodeKey::Curse => {
            let dealt = entity.damage(p as f32 * power);
            let weak_secs = (2 + d * 2) as f32 * power;
            entity.apply_status(Status::Weakness, (weak_secs * TPS as f32) as u32);
            dealt
        }
        NodeKey::Break => false,
        _ => false,
    }
}
