//! Mod nodes that reshape trajectories.
//!
//! Scatter is the only mod with real geometry: it forks one trajectory into
//! several inside a cone using Gaussian angular jitter. The Split variants
//! carry no transform at all; the engine handles their fork-of-execution
//! directly.

use glam::Vec3;

use crate::core::geom::Trajectory;
use crate::core::rng::CastRng;

/// Standard deviation of the scatter jitter, radians per axis.
pub const SCATTER_SPREAD: f32 = 0.15;

/// Orthonormal basis perpendicular to `dir`.
fn perpendicular_basis(dir: Vec3) -> (Vec3, Vec3) {
    let up = if dir.y.abs() < 0.99 { Vec3::Y } else { Vec3::X };
    let u = dir.cross(up).normalize();
    let v = dir.cross(u);
    (u, v)
}

/// Fork a trajectory into `forks` jittered copies.
///
/// Each fork deflects the original direction by independent Gaussian
/// offsets on two perpendicular axes, so forks cluster around the original
/// heading and thin out toward the cone edge. Origins are unchanged.
#[must_use]
pub fn scatter_fork(rng: &mut CastRng, traj: Trajectory, forks: usize) -> Vec<Trajectory> {
    let (u, v) = perpendicular_basis(traj.direction);
    (0..forks)
        .map(|_| {
            let du = rng.gauss() * SCATTER_SPREAD;
            let dv = rng.gauss() * SCATTER_SPREAD;
            Trajectory::new(traj.origin, traj.direction + u * du + v * dv)
        })
        .collect()
}
