//! Angular half-plane crossing, shared by the polar (XY) and azimuthal
//! (XZ) families through their 2D projections.

use sphertrace_grid::WedgePlanes;
use sphertrace_math::{StepTolerance, Vec2};

/// How an angular crossing changes the wedge index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngularStep {
    /// Ordinary crossing of a boundary half-plane into the named wedge.
    Boundary(usize),
    /// The ray crosses the family's central axis; the destination wedge
    /// is the one containing the projected travel direction.
    Axis,
}

/// The next angular boundary crossing for one family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngularCrossing {
    /// Ray parameter of the crossing.
    pub t: f64,
    /// Index update it implies.
    pub step: AngularStep,
}

/// Compute the next crossing of the current wedge's two boundary
/// half-planes strictly after `t_cur`.
///
/// `o` and `d` are the ray's origin offset from the sphere center and its
/// direction, projected onto the family's plane. Boundary `k` has the
/// in-plane direction `(cos θ_k, sin θ_k)` and the normal
/// `(-sin θ_k, cos θ_k)` oriented toward increasing angle; the plane
/// equation gives `t = -(n_k · o) / (n_k · d)`.
///
/// Hits on a boundary's antipodal half-plane are rejected; a hit whose
/// point lies on the axis itself is an [`AngularStep::Axis`] crossing. A
/// single-wedge family never steps, and neither does a ray whose
/// projection is degenerate (parallel to the axis).
pub fn next_angular_crossing(
    o: Vec2,
    d: Vec2,
    planes: &WedgePlanes,
    wedge: usize,
    t_cur: f64,
    tol: &StepTolerance,
) -> Option<AngularCrossing> {
    let n = planes.count();
    let d_norm = d.norm();
    if n < 2 || d_norm == 0.0 {
        return None;
    }
    let after = t_cur + tol.t;
    let parallel = 1e-12 * d_norm;
    let mut best: Option<AngularCrossing> = None;

    for k in [wedge, (wedge + 1) % n] {
        let (cos_b, sin_b) = planes.boundary(k);
        let denom = -sin_b * d.x + cos_b * d.y;
        if denom.abs() <= parallel {
            continue;
        }
        let t = -(-sin_b * o.x + cos_b * o.y) / denom;
        if t <= after {
            continue;
        }
        let hit = o + d * t;
        if hit.x * cos_b + hit.y * sin_b < -tol.world {
            // Antipodal half of the plane.
            continue;
        }
        if best.map_or(true, |b| t < b.t) {
            let step = if hit.norm_squared() <= tol.world * tol.world {
                AngularStep::Axis
            } else if denom > 0.0 {
                AngularStep::Boundary(k)
            } else {
                AngularStep::Boundary((k + n - 1) % n)
            };
            best = Some(AngularCrossing { t, step });
        }
    }

    best
}
