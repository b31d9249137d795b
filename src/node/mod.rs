//! The focus node taxonomy.
//!
//! A focus is a tree of nodes. Every node has a key identifying its kind,
//! an ordered map of integer settings, and an ordered list of children.
//! Kind behavior is dispatched over the closed [`NodeKey`] enum: supplies,
//! requires, exclusivity, intermediary delivery, power multiplier, and the
//! closed-form complexity function all live here so the engine can match
//! exhaustively instead of going through virtual dispatch.
//!
//! Three variant families plus the root:
//! - **MediumRoot** (`root`): the single entry point, deriving the initial
//!   trajectory from the caster's aim.
//! - **Medium**: delivery mechanisms. Touch/Bolt resolve synchronously by
//!   raycast; Projectile/Mine/Cloud/SpellBat hand off to a carrier; Plan
//!   flood-fills a block region.
//! - **Effect**: leaves that mutate world or entity state.
//! - **Mod**: Scatter forks trajectories, the Split variants fork execution.

pub mod effect;
pub mod medium;
pub mod modifier;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Capability a node can supply to, or require from, its ancestor chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Target,
    Trajectory,
}

/// Which variant family a key belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeFamily {
    MediumRoot,
    Medium,
    Effect,
    Mod,
}

/// Declared bounds for one node setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettingDef {
    pub name: &'static str,
    pub min: i32,
    pub max: i32,
    pub default: i32,
}

impl SettingDef {
    #[must_use]
    pub const fn new(name: &'static str, min: i32, max: i32, default: i32) -> Self {
        Self {
            name,
            min,
            max,
            default,
        }
    }

    #[must_use]
    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }
}

/// Closed set of node kinds, serialized as the element's string key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKey {
    /// The caster entry point; exactly one, always at the top.
    Root,
    /// Short-range synchronous delivery at the caster's reach.
    Touch,
    /// Long-range synchronous delivery, preferring entities along the ray.
    Bolt,
    /// Thrown carrier; triggers on first collision.
    Projectile,
    /// Placed carrier; arms, then triggers on proximity.
    Mine,
    /// Persisting carrier; pulses over an area.
    Cloud,
    /// Summoned homing carrier.
    SpellBat,
    /// Flood-fills a block volume or connected surface into targets.
    Plan,
    Fire,
    Frost,
    Heal,
    Curse,
    Break,
    /// Forks one trajectory into several inside a cone.
    Scatter,
    /// Executes each child as an independent branch over the same targets.
    SplitTarget,
    /// Executes each child as an independent branch over the same trajectories.
    SplitTrajectory,
}

impl NodeKey {
    pub const ALL: [NodeKey; 16] = [
        NodeKey::Root,
        NodeKey::Touch,
        NodeKey::Bolt,
        NodeKey::Projectile,
        NodeKey::Mine,
        NodeKey::Cloud,
        NodeKey::SpellBat,
        NodeKey::Plan,
        NodeKey::Fire,
        NodeKey::Frost,
        NodeKey::Heal,
        NodeKey::Curse,
        NodeKey::Break,
        NodeKey::Scatter,
        NodeKey::SplitTarget,
        NodeKey::SplitTrajectory,
    ];

    #[must_use]
    pub const fn family(self) -> NodeFamily {
        match self {
            NodeKey::Root => NodeFamily::MediumRoot,
            NodeKey::Touch
            | NodeKey::Bolt
            | NodeKey::Projectile
            | NodeKey::Mine
            | NodeKey::Cloud
            | NodeKey::SpellBat
            | NodeKey::Plan => NodeFamily::Medium,
            NodeKey::Fire | NodeKey::Frost | NodeKey::Heal | NodeKey::Curse | NodeKey::Break => {
                NodeFamily::Effect
            }
            NodeKey::Scatter | NodeKey::SplitTarget | NodeKey::SplitTrajectory => NodeFamily::Mod,
        }
    }

    /// Capabilities this node makes available to its descendants.
    #[must_use]
    pub const fn supplies(self) -> &'static [Capability] {
        match self {
            NodeKey::Root => &[Capability::Trajectory],
            NodeKey::Touch
            | NodeKey::Bolt
            | NodeKey::Projectile
            | NodeKey::Mine
            | NodeKey::Cloud
            | NodeKey::SpellBat => &[Capability::Target, Capability::Trajectory],
            NodeKey::Plan => &[Capability::Target],
            NodeKey::Scatter | NodeKey::SplitTrajectory => &[Capability::Trajectory],
            NodeKey::SplitTarget => &[Capability::Target],
            NodeKey::Fire | NodeKey::Frost | NodeKey::Heal | NodeKey::Curse | NodeKey::Break => &[],
        }
    }

    /// Capabilities this node needs from the union of its ancestors.
    #[must_use]
    pub const fn requires(self) -> &'static [Capability] {
        match self {
            NodeKey::Root => &[],
            NodeKey::Touch
            | NodeKey::Bolt
            | NodeKey::Projectile
            | NodeKey::Mine
            | NodeKey::Cloud
            | NodeKey::SpellBat
            | NodeKey::Plan
            | NodeKey::Scatter
            | NodeKey::SplitTrajectory => &[Capability::Trajectory],
            NodeKey::SplitTarget
            | NodeKey::Fire
            | NodeKey::Frost
            | NodeKey::Heal
            | NodeKey::Curse
            | NodeKey::Break => &[Capability::Target],
        }
    }

    /// At most one instance per tree.
    #[must_use]
    pub const fn is_exclusive(self) -> bool {
        matches!(self, NodeKey::Scatter | NodeKey::Plan)
    }

    /// Whether execution hands off to a spawned carrier instead of
    /// recursing synchronously.
    #[must_use]
    pub const fn has_intermediary(self) -> bool {
        matches!(
            self,
            NodeKey::Projectile | NodeKey::Mine | NodeKey::Cloud | NodeKey::SpellBat
        )
    }

    /// Cosmetic/research classification tag.
    #[must_use]
    pub const fn aspect(self) -> &'static str {
        match self {
            NodeKey::Root => "caster",
            NodeKey::Touch => "contact",
            NodeKey::Bolt => "energy",
            NodeKey::Projectile => "motion",
            NodeKey::Mine => "trap",
            NodeKey::Cloud => "air",
            NodeKey::SpellBat => "beast",
            NodeKey::Plan => "craft",
            NodeKey::Fire => "fire",
            NodeKey::Frost => "cold",
            NodeKey::Heal => "life",
            NodeKey::Curse => "death",
            NodeKey::Break => "entropy",
            NodeKey::Scatter | NodeKey::SplitTarget | NodeKey::SplitTrajectory => "order",
        }
    }

    /// Declared settings for this kind, in serialization order.
    #[must_use]
    pub const fn setting_defs(self) -> &'static [SettingDef] {
        // 0 = normal, 1 = bouncy, 2 = seek friend, 3 = seek foe
        const PROJECTILE: &[SettingDef] = &[SettingDef::new("option", 0, 3, 0)];
        // 0 = trigger on enemies, 1 = trigger on friendlies
        const MINE: &[SettingDef] = &[SettingDef::new("target_friendly", 0, 1, 0)];
        const CLOUD: &[SettingDef] = &[
            SettingDef::new("radius", 1, 5, 3),
            SettingDef::new("duration", 1, 10, 5),
        ];
        // 0 = volume fill, 1 = same-type surface fill
        const PLAN: &[SettingDef] = &[
            SettingDef::new("mode", 0, 1, 0),
            SettingDef::new("size", 1, 32, 9),
        ];
        const FIRE: &[SettingDef] = &[
            SettingDef::new("power", 1, 5, 1),
            SettingDef::new("duration", 0, 4, 0),
        ];
        const FROST: &[SettingDef] = &[
            SettingDef::new("power", 1, 5, 1),
            SettingDef::new("duration", 0, 4, 1),
        ];
        const HEAL: &[SettingDef] = &[SettingDef::new("power", 1, 5, 1)];
        const CURSE: &[SettingDef] = &[
            SettingDef::new("power", 1, 5, 1),
            SettingDef::new("duration", 0, 4, 1),
        ];
        const SCATTER: &[SettingDef] = &[SettingDef::new("forks", 2, 8, 4)];

        match self {
            NodeKey::Projectile => PROJECTILE,
            NodeKey::Mine => MINE,
            NodeKey::Cloud => CLOUD,
            NodeKey::Plan => PLAN,
            NodeKey::Fire => FIRE,
            NodeKey::Frost => FROST,
            NodeKey::Heal => HEAL,
            NodeKey::Curse => CURSE,
            NodeKey::Scatter => SCATTER,
            _ => &[],
        }
    }

    #[must_use]
    pub fn setting_def(self, name: &str) -> Option<&'static SettingDef> {
        self.setting_defs().iter().find(|d| d.name == name)
    }
}

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The serde string key doubles as the display form.
        let s = match self {
            NodeKey::Root => "root",
            NodeKey::Touch => "touch",
            NodeKey::Bolt => "bolt",
            NodeKey::Projectile => "projectile",
            NodeKey::Mine => "mine",
            NodeKey::Cloud => "cloud",
            NodeKey::SpellBat => "spell_bat",
            NodeKey::Plan => "plan",
            NodeKey::Fire => "fire",
            NodeKey::Frost => "frost",
            NodeKey::Heal => "heal",
            NodeKey::Curse => "curse",
            NodeKey::Break => "break",
            NodeKey::Scatter => "scatter",
            NodeKey::SplitTarget => "split_target",
            NodeKey::SplitTrajectory => "split_trajectory",
        };
        f.write_str(s)
    }
}

/// One node of a focus tree.
///
/// Settings are kept in an ordered map so the persisted shape round-trips
/// byte for byte. Unknown or out-of-range values are tolerated in the map
/// and clamped on read, so deserializing never rewrites the stored form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub key: NodeKey,
    pub settings: IndexMap<String, i32>,
    pub children: Vec<Node>,
}

impl Node {
    /// Create a node with its declared default settings.
    #[must_use]
    pub fn new(key: NodeKey) -> Self {
        let settings = key
            .setting_defs()
            .iter()
            .map(|d| (d.name.to_string(), d.default))
            .collect();
        Self {
            key,
            settings,
            children: Vec::new(),
        }
    }

    /// Set a declared setting (builder pattern). Values are clamped to the
    /// setting's bounds; unknown names are ignored.
    #[must_use]
    pub fn with_setting(mut self, name: &str, value: i32) -> Self {
        if let Some(def) = self.key.setting_def(name) {
            self.settings.insert(name.to_string(), def.clamp(value));
        }
        self
    }

    /// Append a child (builder pattern).
    #[must_use]
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Read a setting, clamped to its declared bounds, falling back to the
    /// default when absent. Unknown names read as 0.
    #[must_use]
    pub fn setting(&self, name: &str) -> i32 {
        let Some(def) = self.key.setting_def(name) else {
            return 0;
        };
        self.settings
            .get(name)
            .map_or(def.default, |&v| def.clamp(v))
    }

    /// This node's complexity: a pure closed-form function of its settings.
    #[must_use]
    pub fn complexity(&self) -> i32 {
        match self.key {
            NodeKey::Root => 0,
            NodeKey::Touch => 1,
            NodeKey::Bolt => 4,
            NodeKey::Projectile => 6 + self.setting("option") * 2,
            NodeKey::Mine => 8,
            NodeKey::Cloud => self.setting("radius") + self.setting("duration") * 2,
            NodeKey::SpellBat => 10,
            NodeKey::Plan => 5 + self.setting("size"),
            NodeKey::Fire | NodeKey::Frost => self.setting("duration") + self.setting("power") * 2,
            NodeKey::Heal => self.setting("power") * 3,
            NodeKey::Curse => self.setting("duration") * 2 + self.setting("power") * 2,
            NodeKey::Break => 4,
            NodeKey::Scatter => self.setting("forks") * 2,
            NodeKey::SplitTarget | NodeKey::SplitTrajectory => 2,
        }
    }

    /// Factor applied to the running power when execution passes through
    /// this node. Defaults to 1.0.
    #[must_use]
    pub fn power_multiplier(&self) -> f32 {
        match self.key {
            NodeKey::Cloud => 0.5,
            NodeKey::SpellBat => 0.75,
            // Documented as dividing power by forks/2.
            NodeKey::Scatter => 2.0 / self.setting("forks") as f32,
            _ => 1.0,
        }
    }

    /// Sum of complexity over this node and all descendants.
    #[must_use]
    pub fn total_complexity(&self) -> i32 {
        self.complexity() + self.children.iter().map(Node::total_complexity).sum::<i32>()
    }

    /// Number of nodes in this subtree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Node::node_count).sum::<usize>()
    }

    /// Depth-first iteration over this node and all descendants.
    pub fn walk(&self, visit: &mut impl FnMut(&Node)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}
