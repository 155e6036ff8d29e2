//! Ray–sphere entry: the parametric range inside the outer shell and the
//! voxel the traversal starts in.

use sphertrace_grid::{SphericalVoxelGrid, WedgePlanes};
use sphertrace_math::{StepTolerance, Vec2};

use super::shell_roots;
use crate::Ray;

/// Result of clipping a ray against the grid's outer shell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereEntry {
    /// Parameter at which the traversal starts.
    pub t_enter: f64,
    /// Parameter at which it must end: the sphere exit, clamped by the
    /// caller's `t_max`.
    pub t_exit: f64,
    /// Initial radial voxel (1 = outermost).
    pub radial: usize,
    /// Initial polar wedge.
    pub polar: usize,
    /// Initial azimuthal wedge.
    pub azimuthal: usize,
}

/// Clip `ray` against the grid's outer shell and locate the starting
/// voxel.
///
/// Returns `None` when the ray misses the sphere, the sphere lies behind
/// the origin, or the clipped range `[max(0, t_-), min(t_+, t_max)]` is
/// empty (which includes grazing tangents on the outer shell). A ray
/// whose origin sits inside the excluded core of a hollow grid starts at
/// the core's exit parameter instead.
pub fn sphere_entry(
    ray: &Ray,
    grid: &SphericalVoxelGrid,
    t_max: f64,
    tol: &StepTolerance,
) -> Option<SphereEntry> {
    let v = ray.origin() - grid.center();
    let d = ray.direction();

    let (t0, t1) = shell_roots(&v, &d, grid.shell_radius_sq(grid.n_radial()))?;
    if t1 <= 0.0 {
        return None;
    }
    let mut t_enter = t0.max(0.0);
    let t_exit = t1.min(t_max);
    if t_enter >= t_exit {
        return None;
    }

    let eps_sq = tol.radius_sq(grid.r_max());
    let mut dv = ray.at(t_enter) - grid.center();

    // Origin inside the excluded core: fast-forward to where the ray
    // leaves it.
    if grid.r_min() > 0.0 && dv.norm_squared() + eps_sq < grid.shell_radius_sq(0) {
        let (_, core_exit) = shell_roots(&v, &d, grid.shell_radius_sq(0))?;
        if core_exit >= t_exit {
            return None;
        }
        t_enter = core_exit;
        dv = ray.at(t_enter) - grid.center();
    }

    let radial = initial_radial(grid, dv.norm_squared(), dv.dot(&d), eps_sq);
    let polar = wedge_or_direction(
        grid.polar_planes(),
        Vec2::new(dv.x, dv.y),
        Vec2::new(d.x, d.y),
        tol.world,
    );
    let azimuthal = wedge_or_direction(
        grid.azimuthal_planes(),
        Vec2::new(dv.x, dv.z),
        Vec2::new(d.x, d.z),
        tol.world,
    );

    Some(SphereEntry {
        t_enter,
        t_exit,
        radial,
        polar,
        azimuthal,
    })
}

/// Radial voxel containing a point at squared center distance `dist_sq`.
///
/// `radial_rate` is the sign carrier of `d/dt |P(t) - C|²` at the point:
/// when the point sits exactly on a shell boundary and the distance is
/// shrinking, the voxel inside that shell is chosen — the one the ray is
/// about to occupy. Entry on the outer shell from outside is the common
/// case of this rule.
fn initial_radial(grid: &SphericalVoxelGrid, dist_sq: f64, radial_rate: f64, eps_sq: f64) -> usize {
    let n = grid.n_radial();
    let k = grid.containing_shell(dist_sq, eps_sq).unwrap_or(0);
    if radial_rate < 0.0 && k >= 1 && (dist_sq - grid.shell_radius_sq(k)).abs() <= eps_sq {
        return n - k + 1;
    }
    (n - k).clamp(1, n)
}

/// Wedge containing the in-plane offset `offset`, falling back to the
/// travel direction when the point lies on the family's axis.
fn wedge_or_direction(planes: &WedgePlanes, offset: Vec2, dir: Vec2, eps: f64) -> usize {
    if offset.norm_squared() > eps * eps {
        planes.wedge_of(offset)
    } else if dir.norm_squared() > 0.0 {
        planes.wedge_of(dir)
    } else {
        0
    }
}
