//! Trajectory and hit-result geometry.
//!
//! These are the immutable values passed between focus nodes during
//! execution: a `Trajectory` is an origin plus unit direction, a `Target`
//! is the resolved outcome of aiming it at the world. Intersection helpers
//! live here too so both the engine raycast and carrier collision share one
//! set of primitives.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::entity::EntityId;

/// An origin point plus a unit direction.
///
/// Trajectories are immutable: every transform (scatter fork, raycast
/// continuation) produces a new value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Trajectory {
    /// Create a trajectory. The direction is normalized; a zero direction
    /// falls back to +Y so a degenerate aim never produces NaNs downstream.
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let direction = direction.try_normalize().unwrap_or(Vec3::Y);
        Self { origin, direction }
    }

    /// Point at parametric distance `t` along the trajectory.
    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Same heading, new origin.
    #[must_use]
    pub fn rebased(&self, origin: Vec3) -> Self {
        Self {
            origin,
            direction: self.direction,
        }
    }
}

/// Integer block coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Block containing a world-space point.
    #[must_use]
    pub fn containing(point: Vec3) -> Self {
        Self {
            x: point.x.floor() as i32,
            y: point.y.floor() as i32,
            z: point.z.floor() as i32,
        }
    }

    /// Center of the block in world space.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        Vec3::new(
            self.x as f32 + 0.5,
            self.y as f32 + 0.5,
            self.z as f32 + 0.5,
        )
    }

    /// Minimum corner of the block.
    #[must_use]
    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    /// The six axis-aligned neighbors.
    #[must_use]
    pub fn neighbors(&self) -> [BlockPos; 6] {
        [
            Self::new(self.x + 1, self.y, self.z),
            Self::new(self.x - 1, self.y, self.z),
            Self::new(self.x, self.y + 1, self.z),
            Self::new(self.x, self.y - 1, self.z),
            Self::new(self.x, self.y, self.z + 1),
            Self::new(self.x, self.y, self.z - 1),
        ]
    }

    /// Neighbor one step along `face`.
    #[must_use]
    pub fn offset(&self, face: Face) -> BlockPos {
        let n = face.normal();
        Self::new(
            self.x + n.x as i32,
            self.y + n.y as i32,
            self.z + n.z as i32,
        )
    }

    /// Squared distance between block centers.
    #[must_use]
    pub fn distance_squared(&self, other: &BlockPos) -> f32 {
        self.center().distance_squared(other.center())
    }
}

impl std::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Face of a block, identified by its outward normal axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl Face {
    /// Outward unit normal of the face.
    #[must_use]
    pub const fn normal(self) -> Vec3 {
        match self {
            Face::Down => Vec3::NEG_Y,
            Face::Up => Vec3::Y,
            Face::North => Vec3::NEG_Z,
            Face::South => Vec3::Z,
            Face::West => Vec3::NEG_X,
            Face::East => Vec3::X,
        }
    }

    /// Face whose normal opposes the given step direction on `axis`
    /// (0 = x, 1 = y, 2 = z). Used by the voxel ray stepper: stepping +X
    /// enters through the West face.
    #[must_use]
    pub const fn entered_from(axis: usize, step_positive: bool) -> Self {
        match (axis, step_positive) {
            (0, true) => Face::West,
            (0, false) => Face::East,
            (1, true) => Face::Down,
            (1, false) => Face::Up,
            (2, true) => Face::North,
            _ => Face::South,
        }
    }
}

/// Resolved outcome of aiming a trajectory at the world.
///
/// Nearest hit wins; entity hits are preferred over block hits at equal or
/// shorter distance (the raycast in `World` enforces this).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Target {
    /// An entity was struck.
    Entity { id: EntityId, point: Vec3 },
    /// A block face was struck.
    Block {
        pos: BlockPos,
        face: Face,
        point: Vec3,
    },
    /// Nothing within range.
    Miss,
}

impl Target {
    /// The world-space point of impact, if any.
    #[must_use]
    pub fn point(&self) -> Option<Vec3> {
        match self {
            Target::Entity { point, .. } | Target::Block { point, .. } => Some(*point),
            Target::Miss => None,
        }
    }

    #[must_use]
    pub fn is_hit(&self) -> bool {
        !matches!(self, Target::Miss)
    }

    /// The struck entity, if this is an entity hit.
    #[must_use]
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            Target::Entity { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// The struck block position, if this is a block hit.
    #[must_use]
    pub fn block(&self) -> Option<BlockPos> {
        match self {
            Target::Block { pos, .. } => Some(*pos),
            _ => None,
        }
    }
}

/// Entry parameter of segment `p0..p1` into an AABB, if it intersects.
///
/// Returns `t` in `[0, 1]` such that `p0 + (p1 - p0) * t` is the entry
/// point (0.0 when the segment starts inside the box).
#[must_use]
pub fn segment_aabb_entry(p0: Vec3, p1: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let d = p1 - p0;
    let mut tmin = 0.0f32;
    let mut tmax = 1.0f32;
    for axis in 0..3 {
        let s = p0[axis];
        let dir = d[axis];
        if dir.abs() < 1e-6 {
            if s < min[axis] || s > max[axis] {
                return None;
            }
        } else {
            let inv = 1.0 / dir;
            let mut t0 = (min[axis] - s) * inv;
            let mut t1 = (max[axis] - s) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            tmin = tmin.max(t0);
            tmax = tmax.min(t1);
            if tmin > tmax {
                return None;
            }
        }
    }
    Some(tmin)
}

/// True if segment `p0..p1` passes within `radius` of `center`.
#[must_use]
pub fn segment_sphere_hit(p0: Vec3, p1: Vec3, center: Vec3, radius: f32) -> bool {
    let d = p1 - p0;
    let m = p0 - center;
    let a = d.dot(d);
    if a <= 1e-6 {
        return m.length() <= radius;
    }
    let t = (-m.dot(d) / a).clamp(0.0, 1.0);
    (p0 + d * t - center).length() <= radius
}

/// Step through the voxel grid along a ray (Amanatides & Woo traversal),
/// calling `visit(pos, entry_face, t)` for each cell entered after the
/// starting one, until `visit` returns `true` or `max_t` is exceeded.
pub fn walk_voxels(
    origin: Vec3,
    direction: Vec3,
    max_t: f32,
    mut visit: impl FnMut(BlockPos, Face, f32) -> bool,
) {
    let mut cell = BlockPos::containing(origin);
    let step = [
        if direction.x > 0.0 { 1i32 } else { -1 },
        if direction.y > 0.0 { 1 } else { -1 },
        if direction.z > 0.0 { 1 } else { -1 },
    ];
    let mut t_next = [f32::INFINITY; 3];
    let mut t_delta = [f32::INFINITY; 3];
    let cell_min = [cell.x as f32, cell.y as f32, cell.z as f32];
    let origins = [origin.x, origin.y, origin.z];
    let dirs = [direction.x, direction.y, direction.z];
    for axis in 0..3 {
        if dirs[axis].abs() > 1e-6 {
            let boundary = if step[axis] > 0 {
                cell_min[axis] + 1.0
            } else {
                cell_min[axis]
            };
            t_next[axis] = (boundary - origins[axis]) / dirs[axis];
            t_delta[axis] = 1.0 / dirs[axis].abs();
        }
    }

    loop {
        let axis = if t_next[0] <= t_next[1] && t_next[0] <= t_next[2] {
            0
        } else if t_next[1] <= t_next[2] {
            1
        } else {
            2
        };
        let t = t_next[axis];
        if t > max_t {
            return;
        }
        match axis {
            0 => cell.x += step[0],
            1 => cell.y += step[1],
            _ => cell.z += step[2],
        }
        let face = Face::entered_from(axis, step[axis] > 0);
        if visit(cell, face, t) {
            return;
        }
        t_next[axis] += t_delta[axis];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trajectory_normalizes() {
        let t = Trajectory::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0));
        assert!((t.direction.length() - 1.0).abs() < 1e-6);
        assert_eq!(t.direction, Vec3::Z);
    }

    #[test]
    fn test_trajectory_zero_direction_fallback() {
        let t = Trajectory::new(Vec3::ZERO, Vec3::ZERO);
        assert_eq!(t.direction, Vec3::Y);
    }

    #[test]
    fn test_point_at() {
        let t = Trajectory::new(Vec3::new(1.0, 0.0, 0.0), Vec3::X);
        assert_eq!(t.point_at(2.5), Vec3::new(3.5, 0.0, 0.0));
    }

    #[test]
    fn test_block_pos_containing() {
        assert_eq!(
            BlockPos::containing(Vec3::new(1.9, -0.1, 3.0)),
            BlockPos::new(1, -1, 3)
        );
    }

    #[test]
    fn test_face_normals_are_unit() {
        for face in [
            Face::Down,
            Face::Up,
            Face::North,
            Face::South,
            Face::West,
            Face::East,
        ] {
            assert!((face.normal().length() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_segment_aabb_entry() {
        let min = Vec3::new(2.0, -1.0, -1.0);
        let max = Vec3::new(3.0, 1.0, 1.0);

        let t = segment_aabb_entry(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), min, max);
        assert!(t.is_some());
        assert!((t.unwrap() - 0.2).abs() < 1e-5);

        // Pointing away
        assert!(segment_aabb_entry(Vec3::ZERO, Vec3::new(-10.0, 0.0, 0.0), min, max).is_none());

        // Starting inside
        let inside = segment_aabb_entry(Vec3::new(2.5, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0), min, max);
        assert_eq!(inside, Some(0.0));
    }

    #[test]
    fn test_segment_sphere() {
        let center = Vec3::new(5.0, 0.0, 0.0);
        assert!(segment_sphere_hit(
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            center,
            0.5
        ));
        assert!(!segment_sphere_hit(
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(5.0, 2.0, 0.0),
            0.5
        ));
        // Degenerate segment inside the sphere
        assert!(segment_sphere_hit(center, center, center, 0.1));
    }

    #[test]
    fn test_walk_voxels_straight_line() {
        let mut visited = Vec::new();
        walk_voxels(Vec3::new(0.5, 0.5, 0.5), Vec3::X, 3.0, |pos, face, _| {
            visited.push((pos, face));
            false
        });
        assert_eq!(
            visited,
            vec![
                (BlockPos::new(1, 0, 0), Face::West),
                (BlockPos::new(2, 0, 0), Face::West),
                (BlockPos::new(3, 0, 0), Face::West),
            ]
        );
    }

    #[test]
    fn test_walk_voxels_stops_on_true() {
        let mut count = 0;
        walk_voxels(Vec3::new(0.5, 0.5, 0.5), Vec3::X, 100.0, |_, _, _| {
            count += 1;
            count == 2
        });
        assert_eq!(count, 2);
    }

    #[test]
    fn test_target_accessors() {
        let hit = Target::Entity {
            id: EntityId(7),
            point: Vec3::ONE,
        };
        assert!(hit.is_hit());
        assert_eq!(hit.entity(), Some(EntityId(7)));
        assert_eq!(hit.block(), None);
        assert_eq!(hit.point(), Some(Vec3::ONE));

        assert!(!Target::Miss.is_hit());
        assert_eq!(Target::Miss.point(), None);
    }

    #[test]
    fn test_target_serialization() {
        let target = Target::Block {
            pos: BlockPos::new(1, 2, 3),
            face: Face::Up,
            point: Vec3::new(1.5, 3.0, 3.5),
        };
        let json = serde_json::to_string(&target).unwrap();
        let back: Target = serde_json::from_str(&json).unwrap();
        assert_eq!(target, back);
    }
}
