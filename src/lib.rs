//! # focus-engine
//!
//! A spell-composition and execution engine built around editable node
//! trees ("focuses") rather than fixed spell lists.
//!
//! ## Design Principles
//!
//! 1. **Two failure tiers**: Assembly is strict: capability chains,
//!    exclusivity, and the complexity cap are validated up front and reject
//!    the whole tree. Casting never errors; anything that cannot proceed
//!    at runtime degrades to a silent no-op.
//!
//! 2. **Identity by UUID**: Packages and carriers never hold live entity
//!    references. Actors are re-resolved through the world each tick, so
//!    suspended spells survive saves, deaths, and id churn.
//!
//! 3. **Immutable flow values**: Trajectories and targets passed between
//!    nodes are values; every transform produces a new one.
//!
//! ## Architecture
//!
//! A focus is a tree of nodes: a single root, mediums that resolve
//! trajectories into targets, effects that mutate what was hit, and
//! modifiers that fork or reshape the flow. Casting walks the tree
//! depth-first. Intermediary mediums (projectile, mine, cloud, spell-bat)
//! stop the walk and hand their unexecuted children to a spawned carrier,
//! which resumes them ticks later when its trigger fires.
//!
//! ## Modules
//!
//! - `core`: world session, entities, geometry, cooldowns, cast RNG
//! - `node`: the node taxonomy (kinds, settings, capabilities, complexity)
//! - `package`: the sealed focus package and its suspended remainder form
//! - `engine`: assembly validation and the cast/resume tree walk
//! - `carrier`: deferred-delivery entities (projectile, mine, cloud, bat)
//! - `error`: assembly-time rejection reasons

pub mod carrier;
pub mod core;
pub mod engine;
pub mod error;
pub mod node;
pub mod package;

// Re-export commonly used types
pub use crate::core::{
    Block, BlockKind, BlockPos, CastRng, CastRngState, CooldownKey, CooldownMap, Entity, EntityId,
    Face, Status, Target, Team, Trajectory, World,
};

pub use crate::node::{Capability, Node, NodeFamily, NodeKey, SettingDef};

pub use crate::package::{FocusPackage, RemainingPackage};

pub use crate::engine::{
    cast, resume, validate, BranchInput, CastOutcome, FocusSummary, ResumeOutcome,
};

pub use crate::carrier::{
    tick_all, Carrier, CarrierKind, CarrierState, CloudCarrier, MineCarrier, ProjectileCarrier,
    ProjectileOption, SummonCarrier,
};

pub use crate::error::AssemblyError;
