//! Assembly-time failures.
//!
//! These are the only errors the engine surfaces. A focus that fails
//! assembly is rejected outright and never partially installs; everything
//! that can go wrong at cast or resume time degrades to a silent no-op
//! instead (see the engine module).

use thiserror::Error;

use crate::node::{Capability, NodeKey};

/// Why a focus tree was rejected at assembly time.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AssemblyError {
    /// A node requires a capability no ancestor supplies.
    #[error("node '{node}' requires {missing:?}, which no ancestor supplies")]
    MissingCapability { node: NodeKey, missing: Capability },

    /// An exclusive node appears more than once in the tree.
    #[error("exclusive node '{key}' appears {count} times, at most one allowed")]
    ExclusivityViolation { key: NodeKey, count: usize },

    /// Total complexity exceeds the caster tool's cap.
    #[error("total complexity {total} exceeds the cap of {cap}")]
    ComplexityExceeded { total: i32, cap: i32 },

    /// The tree must have exactly one root node, at the top.
    #[error("focus tree must start with a single root node, and roots may not nest")]
    MisplacedRoot,
}
