//! The focus package: a sealed node tree plus the caster's identity.
//!
//! A `FocusPackage` is both the "spell" a focus item carries and, in its
//! remaining form, the suspended continuation a carrier resumes later. The
//! caster is identified by UUID only and resolved lazily against the world;
//! a live entity reference is never part of the package. The persisted
//! shape is exactly (root node, caster UUID); the aggregate complexity and
//! vis cost are recomputed when a package is rebuilt from storage, so
//! serialize → deserialize → serialize is byte-for-byte stable.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::node::Node;

/// Divisor mapping total complexity to vis cost.
const VIS_PER_COMPLEXITY: f32 = 5.0;

/// A complete focus: root tree, caster identity, cached aggregates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "PackageRepr", into = "PackageRepr")]
pub struct FocusPackage {
    root: Node,
    caster: Uuid,
    complexity: i32,
    vis_cost: f32,
}

/// Persisted shape: the tree and the caster, nothing else.
#[derive(Clone, Serialize, Deserialize)]
struct PackageRepr {
    root: Node,
    caster: Uuid,
}

impl From<PackageRepr> for FocusPackage {
    fn from(repr: PackageRepr) -> Self {
        Self::new(repr.root, repr.caster)
    }
}

impl From<FocusPackage> for PackageRepr {
    fn from(pkg: FocusPackage) -> Self {
        Self {
            root: pkg.root,
            caster: pkg.caster,
        }
    }
}

impl FocusPackage {
    /// Build a package, computing the cached aggregates once.
    #[must_use]
    pub fn new(root: Node, caster: Uuid) -> Self {
        let complexity = root.total_complexity();
        Self {
            root,
            caster,
            complexity,
            vis_cost: complexity as f32 / VIS_PER_COMPLEXITY,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    #[must_use]
    pub fn caster(&self) -> Uuid {
        self.caster
    }

    /// Total complexity over the whole tree, cached at assembly.
    #[must_use]
    pub fn complexity(&self) -> i32 {
        self.complexity
    }

    /// Vis consumed per cast. Charged whether or not anything is hit.
    #[must_use]
    pub fn vis_cost(&self) -> f32 {
        self.vis_cost
    }

    /// Compact persisted form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Rebuild from the persisted form, recomputing cached aggregates.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

/// The unexecuted remainder of a focus tree, bound to its caster.
///
/// Created when an intermediary node hands its children to a carrier;
/// resumed by the engine when the carrier triggers. The nodes are the
/// untouched child subtrees in declared order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemainingPackage {
    pub nodes: Vec<Node>,
    pub caster: Uuid,
}

impl RemainingPackage {
    #[must_use]
    pub fn new(nodes: Vec<Node>, caster: Uuid) -> Self {
        Self { nodes, caster }
    }

    /// Capture a node's unexecuted children as a continuation.
    #[must_use]
    pub fn from_children(node: &Node, caster: Uuid) -> Self {
        Self {
            nodes: node.children.clone(),
            caster,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
