//! Radial shell crossing: the next parameter at which the ray crosses
//! the current voxel's inner or outer bounding shell.

use sphertrace_grid::SphericalVoxelGrid;
use sphertrace_math::{StepTolerance, Vec3};

use super::shell_roots;

/// How a radial crossing changes the radial index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadialStep {
    /// Crossing the inner shell toward the center: index + 1.
    Inward,
    /// Crossing the outer shell away from the center: index - 1.
    Outward,
    /// Grazing the inner shell: the radial direction reverses with the
    /// index unchanged. Still a transition event, so the angular steps
    /// stay synchronized with it.
    Tangent,
}

/// The next radial boundary crossing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialCrossing {
    /// Ray parameter of the crossing.
    pub t: f64,
    /// Index update it implies.
    pub step: RadialStep,
}

/// Compute the next radial crossing strictly after `t_cur` for a ray in
/// radial voxel `radial` (1 = outermost).
///
/// The inward/outward decision is re-derived from the inner and outer
/// shell quadratics on every call instead of being carried as a mutable
/// sign, which keeps tangencies and center passes from desynchronizing
/// the step direction. While inside the voxel, the only crossings ahead
/// are the inner shell's first root (entering it) and the outer shell's
/// second root (leaving it); a zero-radius inner shell contributes
/// nothing.
pub fn next_radial_crossing(
    v: &Vec3,
    d: &Vec3,
    grid: &SphericalVoxelGrid,
    radial: usize,
    t_cur: f64,
    tol: &StepTolerance,
) -> Option<RadialCrossing> {
    let after = t_cur + tol.t;
    let mut best: Option<RadialCrossing> = None;

    let inner_sq = grid.shell_radius_sq(grid.inner_shell_of(radial));
    if inner_sq > 0.0 {
        if let Some((t0, t1)) = shell_roots(v, d, inner_sq) {
            if t0 > after {
                let step = if t1 - t0 <= tol.t {
                    RadialStep::Tangent
                } else {
                    RadialStep::Inward
                };
                best = Some(RadialCrossing { t: t0, step });
            }
        }
    }

    if let Some((_, t1)) = shell_roots(v, d, grid.shell_radius_sq(grid.outer_shell_of(radial))) {
        if t1 > after && best.map_or(true, |b| t1 < b.t) {
            best = Some(RadialCrossing {
                t: t1,
                step: RadialStep::Outward,
            });
        }
    }

    best
}
