//! The focus engine: assembly validation and tree-walking execution.
//!
//! Validation happens once, at equip time: capability chains, exclusivity,
//! and the complexity cap are all checked before a focus may be installed,
//! and nothing partially assembles. Execution happens at cast time (or at
//! carrier trigger time, through [`resume`]) and never errors: a branch
//! that cannot proceed simply applies nothing.

mod exec;

pub use exec::{cast, resume, BranchInput, CastOutcome, ResumeOutcome};

use rustc_hash::FxHashMap;

use crate::error::AssemblyError;
use crate::node::{Capability, Node, NodeKey};
use crate::package::FocusPackage;

/// What assembly validation reports back to the equipment collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FocusSummary {
    pub complexity: i32,
    pub vis_cost: f32,
}

/// Total complexity of a tree. Pure query for UI display.
#[must_use]
pub fn total_complexity(root: &Node) -> i32 {
    root.total_complexity()
}

/// Vis consumed per cast of a tree. Pure query for UI display.
#[must_use]
pub fn vis_cost(root: &Node) -> f32 {
    root.total_complexity() as f32 / 5.0
}

/// Validate a package against the caster tool's complexity cap.
///
/// Checks, in order: the root contract (exactly one `root`, at the top),
/// every node's required capabilities against the union of its ancestors'
/// supplies, exclusivity, and the complexity cap. The first violation
/// rejects the whole focus.
pub fn validate(package: &FocusPackage, complexity_cap: i32) -> Result<FocusSummary, AssemblyError> {
    let root = package.root();
    if root.key != NodeKey::Root {
        return Err(AssemblyError::MisplacedRoot);
    }

    let mut supplied: Vec<Capability> = Vec::new();
    check_chain(root, &mut supplied, true)?;

    let mut exclusive_counts: FxHashMap<NodeKey, usize> = FxHashMap::default();
    root.walk(&mut |node| {
        if node.key.is_exclusive() {
            *exclusive_counts.entry(node.key).or_insert(0) += 1;
        }
    });
    for (key, count) in exclusive_counts {
        if count > 1 {
            return Err(AssemblyError::ExclusivityViolation { key, count });
        }
    }

    let total = root.total_complexity();
    if total > complexity_cap {
        return Err(AssemblyError::ComplexityExceeded {
            total,
            cap: complexity_cap,
        });
    }

    Ok(FocusSummary {
        complexity: total,
        vis_cost: package.vis_cost(),
    })
}

/// Walk the tree verifying `requires() ⊆ union(ancestor supplies())`.
///
/// A node's own supplies serve its descendants, never itself.
fn check_chain(
    node: &Node,
    supplied: &mut Vec<Capability>,
    is_top: bool,
) -> Result<(), AssemblyError> {
    if node.key == NodeKey::Root && !is_top {
        return Err(AssemblyError::MisplacedRoot);
    }

    for &needed in node.key.requires() {
        if !supplied.contains(&needed) {
            return Err(AssemblyError::MissingCapability {
                node: node.key,
                missing: needed,
            });
        }
    }

    let mut added = 0;
    for &cap in node.key.supplies() {
        if !supplied.contains(&cap) {
            supplied.push(cap);
            added += 1;
        }
    }

    for child in &node.children {
        check_chain(child, supplied, false)?;
    }

    supplied.truncate(supplied.len() - added);
    Ok(())
}
