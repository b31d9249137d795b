//! Cast-time and resume-time execution.
//!
//! One depth-first walk serves both entry points. Each node transforms the
//! incoming trajectory/target set and recurses; intermediary nodes stop the
//! recursion and hand their unexecuted children to a spawned carrier
//! instead. Every walk runs to completion synchronously within the calling
//! tick.
//!
//! Nothing in here errors. An unresolvable caster aborts the whole cast
//! silently; a branch with no valid hit applies nothing; a failing effect
//! leaf is swallowed (and logged) without touching its siblings.

use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::carrier::Carrier;
use crate::core::entity::EntityId;
use crate::core::geom::{Target, Trajectory};
use crate::core::rng::CastRng;
use crate::core::world::World;
use crate::node::{effect, medium, modifier, Node, NodeFamily, NodeKey};
use crate::package::{FocusPackage, RemainingPackage};

/// The trajectory/target set a node receives from its ancestor chain.
#[derive(Clone, Debug, Default)]
pub struct BranchInput {
    pub trajectories: Vec<Trajectory>,
    pub targets: Vec<Target>,
}

/// What a completed cast did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CastOutcome {
    /// Vis consumed. Charged whether or not anything was hit.
    pub vis_cost: f32,
    /// Effect applications that actually changed something.
    pub effects_applied: u32,
    /// Carriers spawned for deferred branches.
    pub carriers_spawned: u32,
    /// True when the caster could not be resolved and nothing ran.
    pub aborted: bool,
}

/// What a completed resume did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ResumeOutcome {
    pub effects_applied: u32,
    pub carriers_spawned: u32,
}

struct ExecCtx<'w> {
    world: &'w mut World,
    caster_uuid: Uuid,
    caster: Option<EntityId>,
    /// Walk-local randomness, forked off the world stream on entry so the
    /// number of draws inside one walk never shifts world-level randomness.
    rng: CastRng,
    effects_applied: u32,
    carriers_spawned: u32,
}

/// Execute a focus package on behalf of its caster.
///
/// `power` is the initial power scalar, already net of equipment discounts
/// (the equipment collaborator owns that computation). The initial
/// trajectory is the caster's aim from their eye position.
pub fn cast(world: &mut World, package: &FocusPackage, power: f32) -> CastOutcome {
    let vis_cost = package.vis_cost();

    let Some(caster_id) = world.resolve_actor(package.caster()) else {
        debug!(caster = %package.caster(), "cast aborted: caster unresolvable");
        return CastOutcome {
            vis_cost,
            aborted: true,
            ..CastOutcome::default()
        };
    };
    let Some(caster) = world.entity(caster_id) else {
        return CastOutcome {
            vis_cost,
            aborted: true,
            ..CastOutcome::default()
        };
    };

    let input = BranchInput {
        trajectories: vec![Trajectory::new(caster.eye_pos(), caster.look)],
        targets: Vec::new(),
    };

    let rng = world.rng.fork();
    let mut ctx = ExecCtx {
        world,
        caster_uuid: package.caster(),
        caster: Some(caster_id),
        rng,
        effects_applied: 0,
        carriers_spawned: 0,
    };
    for child in &package.root().children {
        execute(&mut ctx, child, &input, power);
    }

    CastOutcome {
        vis_cost,
        effects_applied: ctx.effects_applied,
        carriers_spawned: ctx.carriers_spawned,
        aborted: false,
    }
}

/// Re-enter execution of a suspended remainder.
///
/// Invoked by a triggered carrier with the trajectories/targets it
/// resolved, in place of anything derived from a caster's aim. The caster
/// is still resolved by UUID for raycast self-exclusion; a caster that has
/// vanished since the cast silently aborts the resume.
pub fn resume(
    world: &mut World,
    remaining: &RemainingPackage,
    power: f32,
    trajectories: &[Trajectory],
    targets: &[Target],
) -> ResumeOutcome {
    let caster = world.resolve_actor(remaining.caster);
    if caster.is_none() {
        debug!(caster = %remaining.caster, "resume aborted: caster unresolvable");
        return ResumeOutcome::default();
    }

    let input = BranchInput {
        trajectories: trajectories.to_vec(),
        targets: targets.to_vec(),
    };

    let rng = world.rng.fork();
    let mut ctx = ExecCtx {
        world,
        caster_uuid: remaining.caster,
        caster,
        rng,
        effects_applied: 0,
        carriers_spawned: 0,
    };
    for node in &remaining.nodes {
        execute(&mut ctx, node, &input, power);
    }

    ResumeOutcome {
        effects_applied: ctx.effects_applied,
        carriers_spawned: ctx.carriers_spawned,
    }
}

/// Depth-first execution of one node against its incoming set.
fn execute(ctx: &mut ExecCtx<'_>, node: &Node, input: &BranchInput, power: f32) {
    trace!(key = %node.key, power, "executing node");
    match node.key.family() {
        // A root inside a branch would have failed assembly; ignore it
        // rather than derive a second aim.
        NodeFamily::MediumRoot => {
            warn!("root node inside a branch, skipping");
        }

        NodeFamily::Medium if node.key.has_intermediary() => {
            let remaining = RemainingPackage::from_children(node, ctx.caster_uuid);
            let handoff_power = power * node.power_multiplier();
            for traj in &input.trajectories {
                let carrier = Carrier::spawn(node, *traj, handoff_power, remaining.clone());
                ctx.world.push_carrier(carrier);
                ctx.carriers_spawned += 1;
            }
        }

        NodeFamily::Medium => {
            let next = match node.key {
                NodeKey::Touch => {
                    let range = touch_range(ctx);
                    raycast_delivery(ctx, input, range)
                }
                NodeKey::Bolt => raycast_delivery(ctx, input, medium::BOLT_RANGE),
                NodeKey::Plan => BranchInput {
                    trajectories: input.trajectories.clone(),
                    targets: input
                        .trajectories
                        .iter()
                        .flat_map(|traj| {
                            medium::plan_targets(
                                ctx.world,
                                *traj,
                                node.setting("mode"),
                                node.setting("size") as usize,
                            )
                        })
                        .collect(),
                },
                _ => unreachable!("non-intermediary medium"),
            };
            for child in &node.children {
                execute(ctx, child, &next, power);
            }
        }

        NodeFamily::Effect => {
            for target in &input.targets {
                if effect::apply(ctx.world, node, power, target) {
                    ctx.effects_applied += 1;
                } else {
                    // Swallowed by design: a failing leaf never aborts
                    // sibling branches.
                    trace!(key = %node.key, "effect did not apply");
                }
            }
        }

        NodeFamily::Mod => {
            let (next, power) = match node.key {
                NodeKey::Scatter => {
                    let forks = node.setting("forks") as usize;
                    let forked = input
                        .trajectories
                        .iter()
                        .flat_map(|traj| modifier::scatter_fork(&mut ctx.rng, *traj, forks))
                        .collect();
                    (
                        BranchInput {
                            trajectories: forked,
                            targets: input.targets.clone(),
                        },
                        power * node.power_multiplier(),
                    )
                }
                // Splits fork execution, not values: each child runs as an
                // independent branch over the same set.
                NodeKey::SplitTarget | NodeKey::SplitTrajectory => (input.clone(), power),
                _ => unreachable!("unknown mod"),
            };
            for child in &node.children {
                execute(ctx, child, &next, power);
            }
        }
    }
}

/// Raycast every incoming trajectory; hits become (target, continuation
/// trajectory) pairs, misses drop out of the branch.
fn raycast_delivery(ctx: &mut ExecCtx<'_>, input: &BranchInput, range: f32) -> BranchInput {
    let mut next = BranchInput::default();
    for traj in &input.trajectories {
        let hit = ctx.world.raycast(*traj, range, ctx.caster);
        if let Some(point) = hit.point() {
            next.targets.push(hit);
            next.trajectories.push(medium::continuation(*traj, point));
        }
    }
    next
}

/// Touch delivers at the caster's own reach; without a live caster (a
/// carrier resume) it falls back to the default reach.
fn touch_range(ctx: &ExecCtx<'_>) -> f32 {
    ctx.caster
        .and_then(|id| ctx.world.entity(id))
        .map_or(4.0, |e| e.reach)
}
