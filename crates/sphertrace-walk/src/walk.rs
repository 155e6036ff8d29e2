//! The traversal state machine.
//!
//! Coordinates the three boundary intersectors: at each position it takes
//! the nearest upcoming radial, polar, and azimuthal crossing, applies
//! every crossing tied at that parameter, and emits one record per voxel
//! visited. Spherical-coordinate generalization of Amanatides–Woo grid
//! stepping.

use sphertrace_grid::SphericalVoxelGrid;
use sphertrace_math::{StepTolerance, Vec2};

use crate::intersect::{
    next_angular_crossing, next_radial_crossing, sphere_entry, AngularStep, RadialStep,
};
use crate::{Ray, WalkError};

/// Voxel indices in a spherical grid.
///
/// `radial` runs from 1 at the outermost shell interval to `n_radial` at
/// the innermost (0 would denote "outside the grid" and is never
/// emitted); `polar` and `azimuthal` are wedge indices counted from each
/// family's range start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SphericalVoxel {
    /// Radial interval index, 1 = outermost.
    pub radial: usize,
    /// Polar wedge index.
    pub polar: usize,
    /// Azimuthal wedge index.
    pub azimuthal: usize,
}

/// One visited voxel together with the parametric range spent in it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelSpan {
    /// The voxel occupied over `[t_enter, t_exit]`.
    pub voxel: SphericalVoxel,
    /// Parameter at which the ray enters the voxel.
    pub t_enter: f64,
    /// Parameter at which it leaves; equals the next record's `t_enter`.
    pub t_exit: f64,
}

/// Walk a ray through the grid, emitting every voxel it enters in order.
///
/// The returned sequence is deterministic for fixed inputs and empty when
/// the ray misses the sphere within `[0, t_max]`. The grid is never
/// mutated; concurrent walks over one grid are safe. The only error a
/// well-formed input can produce is [`WalkError::Diverged`], raised when
/// the sequence exceeds `8 * (n_radial + n_polar + n_azimuthal)` records.
///
/// Tied crossings (parameters within `ε_t` of the minimum, with
/// `ε_t = 1e-12 * max(1, min(t_exit_sphere, t_max))`) are applied in a
/// single step; applying them serially would emit zero-extent records. A
/// tangency on a shell splits the record without changing the radial
/// index, so consecutive records may coincide in all three indices there.
pub fn walk_spherical_volume(
    ray: &Ray,
    grid: &SphericalVoxelGrid,
    t_max: f64,
) -> Result<Vec<VoxelSpan>, WalkError> {
    if !(t_max > 0.0) {
        return Ok(Vec::new());
    }

    let entry_tol = StepTolerance::for_walk(t_max, grid.r_max());
    let Some(entry) = sphere_entry(ray, grid, t_max, &entry_tol) else {
        return Ok(Vec::new());
    };
    let tol = StepTolerance::for_walk(entry.t_exit, grid.r_max());

    let v = ray.origin() - grid.center();
    let d = ray.direction();
    let o_xy = Vec2::new(v.x, v.y);
    let d_xy = Vec2::new(d.x, d.y);
    let o_xz = Vec2::new(v.x, v.z);
    let d_xz = Vec2::new(d.x, d.z);

    let budget = grid.n_radial() + grid.n_polar() + grid.n_azimuthal();
    let cap = 8 * budget;
    let mut spans = Vec::with_capacity(budget);

    let mut radial = entry.radial;
    let mut polar = entry.polar;
    let mut azimuthal = entry.azimuthal;
    let mut t_cur = entry.t_enter;
    let t_end = entry.t_exit;

    loop {
        let r_hit = next_radial_crossing(&v, &d, grid, radial, t_cur, &tol);
        let p_hit = next_angular_crossing(o_xy, d_xy, grid.polar_planes(), polar, t_cur, &tol);
        let a_hit = next_angular_crossing(o_xz, d_xz, grid.azimuthal_planes(), azimuthal, t_cur, &tol);

        let mut t_min = f64::INFINITY;
        for t in [
            r_hit.map(|h| h.t),
            p_hit.map(|h| h.t),
            a_hit.map(|h| h.t),
        ]
        .into_iter()
        .flatten()
        {
            t_min = t_min.min(t);
        }

        let voxel = SphericalVoxel {
            radial,
            polar,
            azimuthal,
        };

        // No crossing ahead of the sphere exit (or of t_max): close out
        // the current voxel and stop.
        if t_min >= t_end - tol.t {
            if t_end > t_cur + tol.t {
                spans.push(VoxelSpan {
                    voxel,
                    t_enter: t_cur,
                    t_exit: t_end,
                });
            }
            return Ok(spans);
        }

        spans.push(VoxelSpan {
            voxel,
            t_enter: t_cur,
            t_exit: t_min,
        });
        if spans.len() > cap {
            return Err(WalkError::Diverged {
                emitted: spans.len(),
                cap,
            });
        }

        // Apply every crossing tied at t_min in one step.
        let mut next_radial = radial as isize;
        if let Some(hit) = r_hit {
            if hit.t <= t_min + tol.t {
                next_radial += match hit.step {
                    RadialStep::Inward => 1,
                    RadialStep::Outward => -1,
                    RadialStep::Tangent => 0,
                };
            }
        }
        if let Some(hit) = p_hit {
            if hit.t <= t_min + tol.t {
                polar = match hit.step {
                    AngularStep::Boundary(wedge) => wedge,
                    AngularStep::Axis => grid.polar_planes().wedge_of(d_xy),
                };
            }
        }
        if let Some(hit) = a_hit {
            if hit.t <= t_min + tol.t {
                azimuthal = match hit.step {
                    AngularStep::Boundary(wedge) => wedge,
                    AngularStep::Axis => grid.azimuthal_planes().wedge_of(d_xz),
                };
            }
        }

        // Radially off the grid: outward through the outer shell, or
        // inward into the excluded core of a hollow grid.
        if next_radial < 1 || next_radial > grid.n_radial() as isize {
            return Ok(spans);
        }
        radial = next_radial as usize;
        t_cur = t_min;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use sphertrace_grid::SphereBound;
    use sphertrace_math::{Point3, Vec3};

    fn grid(r_max: f64, n_r: usize, n_p: usize, n_a: usize) -> SphericalVoxelGrid {
        SphericalVoxelGrid::new(Point3::origin(), SphereBound::full(r_max), n_r, n_p, n_a).unwrap()
    }

    fn ray(origin: (f64, f64, f64), dir: (f64, f64, f64)) -> Ray {
        Ray::new(
            Point3::new(origin.0, origin.1, origin.2),
            Vec3::new(dir.0, dir.1, dir.2),
        )
        .unwrap()
    }

    /// Bounds, contiguity, radial adjacency, and monotone parameters for
    /// every record of a traversal.
    fn assert_walk_invariants(grid: &SphericalVoxelGrid, spans: &[VoxelSpan]) {
        for (i, span) in spans.iter().enumerate() {
            let v = span.voxel;
            assert!(
                (1..=grid.n_radial()).contains(&v.radial),
                "record {i}: radial {} out of range",
                v.radial
            );
            assert!(v.polar < grid.n_polar(), "record {i}: polar {}", v.polar);
            assert!(
                v.azimuthal < grid.n_azimuthal(),
                "record {i}: azimuthal {}",
                v.azimuthal
            );
            assert!(
                span.t_enter < span.t_exit,
                "record {i}: no extent ({} .. {})",
                span.t_enter,
                span.t_exit
            );
            if i > 0 {
                let prev = &spans[i - 1];
                assert_eq!(prev.t_exit, span.t_enter, "records {} and {i} not contiguous", i - 1);
                assert!(
                    prev.voxel.radial.abs_diff(v.radial) <= 1,
                    "records {} and {i} not radially adjacent",
                    i - 1
                );
            }
        }
    }

    fn radials(spans: &[VoxelSpan]) -> Vec<usize> {
        spans.iter().map(|s| s.voxel.radial).collect()
    }

    #[test]
    fn test_miss_is_empty() {
        let grid = grid(1.0, 4, 4, 4);
        let r = ray((2.0, 2.0, 0.0), (0.0, 0.0, 1.0));
        assert!(walk_spherical_volume(&r, &grid, 100.0).unwrap().is_empty());
    }

    #[test]
    fn test_central_axial_ray() {
        // Straight through the middle of a 4x4x4 grid: in through every
        // shell, the innermost voxel split in two at the center by the
        // azimuthal axis crossing, back out through every shell.
        let grid = grid(4.0, 4, 4, 4);
        let r = ray((0.0, 0.0, -5.0), (0.0, 0.0, 1.0));
        let spans = walk_spherical_volume(&r, &grid, 100.0).unwrap();
        assert_walk_invariants(&grid, &spans);

        assert_eq!(radials(&spans), [1, 2, 3, 4, 4, 3, 2, 1]);
        for (i, span) in spans.iter().enumerate() {
            assert!((span.t_enter - (1.0 + i as f64)).abs() < 1e-10);
        }
        assert!((spans[7].t_exit - 9.0).abs() < 1e-10);

        // Polar never steps (the direction has no XY component); the
        // azimuthal wedge flips to the antipode at the center.
        for span in &spans[..4] {
            assert_eq!(span.voxel.polar, 0);
            assert_eq!(span.voxel.azimuthal, 3);
        }
        for span in &spans[4..] {
            assert_eq!(span.voxel.polar, 0);
            assert_eq!(span.voxel.azimuthal, 1);
        }
    }

    #[test]
    fn test_tangent_ray() {
        // Grazes the outer shell: empty clipped range, no records.
        let grid = grid(1.0, 4, 4, 4);
        let r = ray((0.0, 1.0, -5.0), (0.0, 0.0, 1.0));
        assert!(walk_spherical_volume(&r, &grid, 100.0).unwrap().is_empty());
    }

    #[test]
    fn test_inside_origin_ray() {
        // Starts at the center of a 2-shell ball and runs out along +x.
        let grid = grid(10.0, 2, 4, 4);
        let r = ray((0.0, 0.0, 0.0), (1.0, 0.0, 0.0));
        let spans = walk_spherical_volume(&r, &grid, 100.0).unwrap();
        assert_walk_invariants(&grid, &spans);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].voxel.radial, 2);
        assert_eq!(spans[0].t_enter, 0.0);
        assert_eq!(spans.last().unwrap().voxel.radial, 1);
        assert!((spans.last().unwrap().t_exit - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_t_max_truncates() {
        let grid = grid(4.0, 4, 4, 4);
        let r = ray((0.0, 0.0, -5.0), (0.0, 0.0, 1.0));
        let spans = walk_spherical_volume(&r, &grid, 3.5).unwrap();
        assert_walk_invariants(&grid, &spans);
        // Cut off in the third voxel.
        assert_eq!(radials(&spans), [1, 2, 3]);
        assert!((spans.last().unwrap().t_exit - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_non_positive_t_max_is_empty() {
        let grid = grid(4.0, 4, 4, 4);
        let r = ray((0.0, 0.0, -5.0), (0.0, 0.0, 1.0));
        assert!(walk_spherical_volume(&r, &grid, 0.0).unwrap().is_empty());
        assert!(walk_spherical_volume(&r, &grid, -1.0).unwrap().is_empty());
    }

    #[test]
    fn test_polar_axis_crossing_triple_tie() {
        // O = (-5, 0, 1) along +x through a radius-2 ball: at t = 5 the
        // ray simultaneously grazes the inner shell (r = 1 at (0,0,1)),
        // crosses the polar axis, and crosses an azimuthal boundary. All
        // three apply in one step.
        let grid = grid(2.0, 2, 4, 4);
        let r = ray((-5.0, 0.0, 1.0), (1.0, 0.0, 0.0));
        let spans = walk_spherical_volume(&r, &grid, 100.0).unwrap();
        assert_walk_invariants(&grid, &spans);

        assert_eq!(spans.len(), 2);
        let sqrt3 = 3.0_f64.sqrt();
        assert!((spans[0].t_enter - (5.0 - sqrt3)).abs() < 1e-10);
        assert!((spans[0].t_exit - 5.0).abs() < 1e-10);
        assert!((spans[1].t_exit - (5.0 + sqrt3)).abs() < 1e-10);

        // Tangency keeps the radial index; the polar wedge jumps to the
        // antipode (the one magnitude-2 jump the meridian allows); the
        // azimuthal wedge steps by one.
        assert_eq!(spans[0].voxel, SphericalVoxel { radial: 1, polar: 2, azimuthal: 1 });
        assert_eq!(spans[1].voxel, SphericalVoxel { radial: 1, polar: 0, azimuthal: 0 });
    }

    #[test]
    fn test_polar_adjacency_off_axis() {
        // A ray crossing the grid without touching the polar axis steps
        // the polar wedge one at a time.
        let grid = grid(4.0, 2, 8, 8);
        let r = ray((-10.0, 1.5, 0.5), (1.0, 0.0, 0.0));
        let spans = walk_spherical_volume(&r, &grid, 100.0).unwrap();
        assert_walk_invariants(&grid, &spans);
        assert!(!spans.is_empty());
        let n = grid.n_polar();
        for pair in spans.windows(2) {
            let a = pair[0].voxel.polar;
            let b = pair[1].voxel.polar;
            let d = a.abs_diff(b);
            assert!(d.min(n - d) <= 1, "polar jump {a} -> {b}");
        }
    }

    #[test]
    fn test_hollow_core_terminates_at_inner_shell() {
        // Diametral ray through a hollow grid: the walk ends where the
        // ray enters the excluded core and does not resume beyond it.
        let grid = SphericalVoxelGrid::new(
            Point3::origin(),
            SphereBound::hollow(2.0, 6.0),
            4,
            4,
            4,
        )
        .unwrap();
        let r = ray((-10.0, 0.0, 0.0), (1.0, 0.0, 0.0));
        let spans = walk_spherical_volume(&r, &grid, 100.0).unwrap();
        assert_walk_invariants(&grid, &spans);
        assert_eq!(radials(&spans), [1, 2, 3, 4]);
        assert!((spans[0].t_enter - 4.0).abs() < 1e-10);
        assert!((spans.last().unwrap().t_exit - 8.0).abs() < 1e-10);
    }

    #[test]
    fn test_hollow_chord_stays_in_grid() {
        // A chord that never reaches the core crosses in and back out.
        let grid = SphericalVoxelGrid::new(
            Point3::origin(),
            SphereBound::hollow(2.0, 6.0),
            4,
            4,
            4,
        )
        .unwrap();
        let r = ray((-10.0, 3.5, 0.0), (1.0, 0.0, 0.0));
        let spans = walk_spherical_volume(&r, &grid, 100.0).unwrap();
        assert_walk_invariants(&grid, &spans);
        assert!(!spans.is_empty());
        // Deepest voxel reached is the one containing |y| = 3.5.
        let deepest = spans.iter().map(|s| s.voxel.radial).max().unwrap();
        assert_eq!(deepest, 3);
        assert_eq!(spans.first().unwrap().voxel.radial, 1);
        assert_eq!(spans.last().unwrap().voxel.radial, 1);
    }

    #[test]
    fn test_orthographic_sweep() {
        // 64^2 parallel +z rays through a 64^3 grid, covering a square
        // inscribed in the sphere's silhouette: every ray crosses fully.
        let grid = grid(4.0, 64, 64, 64);
        let n = 64;
        let half = 0.7 * grid.r_max();
        let mut total = 0usize;
        for row in 0..n {
            for col in 0..n {
                let fx = col as f64 / (n - 1) as f64;
                let fy = row as f64 / (n - 1) as f64;
                let r = ray(
                    (-half + 2.0 * half * fx, -half + 2.0 * half * fy, -5.0),
                    (0.0, 0.0, 1.0),
                );
                let spans = walk_spherical_volume(&r, &grid, 100.0).unwrap();
                assert!(!spans.is_empty(), "ray ({row}, {col}) missed");
                assert_walk_invariants(&grid, &spans);
                assert_eq!(spans.first().unwrap().voxel.radial, 1);
                assert_eq!(spans.last().unwrap().voxel.radial, 1);

                // Orthographic +z rays never step the polar family and
                // step the azimuthal family one wedge at a time.
                let n_a = grid.n_azimuthal();
                for pair in spans.windows(2) {
                    assert_eq!(pair[0].voxel.polar, pair[1].voxel.polar);
                    let d = pair[0].voxel.azimuthal.abs_diff(pair[1].voxel.azimuthal);
                    assert!(d.min(n_a - d) <= 1);
                }
                total += spans.len();
            }
        }
        // Sanity: the sweep visits a substantial share of the grid.
        assert!(total > n * n * 2);
    }

    #[test]
    fn test_idempotent() {
        let grid = grid(4.0, 8, 8, 8);
        let r = ray((-7.0, 1.3, 0.4), (2.0, -0.3, 0.1));
        let a = walk_spherical_volume(&r, &grid, 100.0).unwrap();
        let b = walk_spherical_volume(&r, &grid, 100.0).unwrap();
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }

    #[test]
    fn test_reversal_symmetry() {
        // Walking back from the exit point visits the same voxels in
        // reverse. Near-tie configurations (any record thinner than
        // 1e-6) are skipped; tie resolution at exactly coincident
        // boundaries is covered by the dedicated tie tests.
        let grid = grid(4.0, 8, 8, 8);
        let mut rng = SmallRng::seed_from_u64(7);
        let mut checked = 0;
        while checked < 40 {
            let origin = 12.0 * rand_unit(&mut rng);
            let target = rng.gen_range(0.0..3.0) * rand_unit(&mut rng);
            let dir = target - origin;
            let forward_ray = Ray::new(Point3::from(origin), dir).unwrap();
            let forward = walk_spherical_volume(&forward_ray, &grid, 100.0).unwrap();
            if forward.is_empty()
                || forward.iter().any(|s| s.t_exit - s.t_enter < 1e-6)
            {
                continue;
            }
            assert_walk_invariants(&grid, &forward);

            let t_end = forward.last().unwrap().t_exit;
            let backward_ray = Ray::new(forward_ray.at(t_end), -dir).unwrap();
            let backward = walk_spherical_volume(&backward_ray, &grid, 100.0).unwrap();
            assert_walk_invariants(&grid, &backward);

            let fwd: Vec<SphericalVoxel> = forward.iter().map(|s| s.voxel).collect();
            let mut bwd: Vec<SphericalVoxel> = backward.iter().map(|s| s.voxel).collect();
            bwd.reverse();
            assert_eq!(fwd, bwd);
            checked += 1;
        }
    }

    fn rand_unit(rng: &mut SmallRng) -> Vec3 {
        loop {
            let v = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            let n_sq = v.norm_squared();
            if n_sq > 1e-3 && n_sq < 1.0 {
                return v / n_sq.sqrt();
            }
        }
    }
}
