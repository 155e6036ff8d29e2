//! Orthographic sweep: march a square bundle of parallel rays through a
//! spherical grid and summarize what they visit.

use sphertrace::{walk_spherical_volume, Point3, Ray, SphereBound, SphericalVoxelGrid, Vec3};

fn main() {
    let grid = SphericalVoxelGrid::new(Point3::origin(), SphereBound::full(4.0), 64, 64, 64)
        .expect("valid grid");

    let n = 64;
    let half = 0.7 * grid.r_max();
    let mut total_records = 0usize;
    let mut full_crossings = 0usize;
    let started = std::time::Instant::now();

    for row in 0..n {
        for col in 0..n {
            let x = -half + 2.0 * half * (col as f64 / (n - 1) as f64);
            let y = -half + 2.0 * half * (row as f64 / (n - 1) as f64);
            let ray = Ray::new(Point3::new(x, y, -5.0), Vec3::new(0.0, 0.0, 1.0))
                .expect("finite ray");
            let spans = walk_spherical_volume(&ray, &grid, 100.0).expect("bounded walk");
            if spans.first().map(|s| s.voxel.radial) == Some(1)
                && spans.last().map(|s| s.voxel.radial) == Some(1)
            {
                full_crossings += 1;
            }
            total_records += spans.len();
        }
    }

    let elapsed = started.elapsed();
    println!(
        "{} rays through a {}x{}x{} grid: {} voxel records, {} full crossings, {:.2?}",
        n * n,
        grid.n_radial(),
        grid.n_polar(),
        grid.n_azimuthal(),
        total_records,
        full_crossings,
        elapsed
    );
}
