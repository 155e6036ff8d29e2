//! sphertrace CLI — drive spherical volume traversals from the terminal.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use sphertrace::{
    walk_spherical_volume, Point3, Ray, SphereBound, SphericalVoxelGrid, Vec3,
};

#[derive(Parser)]
#[command(name = "sphertrace")]
#[command(about = "Spherical volume ray traversal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GridArgs {
    /// Sphere center as "x,y,z"
    #[arg(long, default_value = "0,0,0")]
    center: String,

    /// Outer radius
    #[arg(long, default_value_t = 10.0)]
    radius: f64,

    /// Inner (hollow core) radius
    #[arg(long, default_value_t = 0.0)]
    min_radius: f64,

    /// Number of radial shells
    #[arg(long, default_value_t = 8)]
    shells: usize,

    /// Number of polar wedges
    #[arg(long, default_value_t = 8)]
    polar: usize,

    /// Number of azimuthal wedges
    #[arg(long, default_value_t = 8)]
    azimuthal: usize,
}

impl GridArgs {
    fn build(&self) -> Result<SphericalVoxelGrid> {
        let (x, y, z) = parse_triple(&self.center).context("invalid --center")?;
        let bound = if self.min_radius > 0.0 {
            SphereBound::hollow(self.min_radius, self.radius)
        } else {
            SphereBound::full(self.radius)
        };
        SphericalVoxelGrid::new(Point3::new(x, y, z), bound, self.shells, self.polar, self.azimuthal)
            .context("invalid grid")
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Walk a single ray and print the voxels it enters
    Trace {
        #[command(flatten)]
        grid: GridArgs,

        /// Ray origin as "x,y,z"
        #[arg(long)]
        origin: String,

        /// Ray direction as "x,y,z"
        #[arg(long)]
        dir: String,

        /// Upper bound on the ray parameter
        #[arg(long, default_value_t = 1e6)]
        t_max: f64,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Orthographic ray sweep through the grid (benchmark)
    Sweep {
        #[command(flatten)]
        grid: GridArgs,

        /// Rays per side of the square bundle (total rays = n^2)
        #[arg(long, default_value_t = 64)]
        rays: usize,

        /// Upper bound on the ray parameter
        #[arg(long, default_value_t = 1e6)]
        t_max: f64,
    },
    /// Print a grid's shell radii and wedge spacing
    Info {
        #[command(flatten)]
        grid: GridArgs,
    },
}

/// One traversal record, flattened for JSON output.
#[derive(Serialize)]
struct SpanOut {
    radial: usize,
    polar: usize,
    azimuthal: usize,
    t_enter: f64,
    t_exit: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Trace {
            grid,
            origin,
            dir,
            t_max,
            json,
        } => run_trace(&grid, &origin, &dir, t_max, json),
        Commands::Sweep { grid, rays, t_max } => run_sweep(&grid, rays, t_max),
        Commands::Info { grid } => run_info(&grid),
    }
}

fn run_trace(grid_args: &GridArgs, origin: &str, dir: &str, t_max: f64, json: bool) -> Result<()> {
    let grid = grid_args.build()?;
    let (ox, oy, oz) = parse_triple(origin).context("invalid --origin")?;
    let (dx, dy, dz) = parse_triple(dir).context("invalid --dir")?;
    let ray = Ray::new(Point3::new(ox, oy, oz), Vec3::new(dx, dy, dz)).context("invalid ray")?;

    let spans = walk_spherical_volume(&ray, &grid, t_max)?;

    if json {
        let out: Vec<SpanOut> = spans
            .iter()
            .map(|s| SpanOut {
                radial: s.voxel.radial,
                polar: s.voxel.polar,
                azimuthal: s.voxel.azimuthal,
                t_enter: s.t_enter,
                t_exit: s.t_exit,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if spans.is_empty() {
        println!("no intersection");
        return Ok(());
    }
    println!(
        "{:>6} {:>6} {:>6} {:>14} {:>14}",
        "radial", "polar", "azim", "t_enter", "t_exit"
    );
    for s in &spans {
        println!(
            "{:>6} {:>6} {:>6} {:>14.6} {:>14.6}",
            s.voxel.radial, s.voxel.polar, s.voxel.azimuthal, s.t_enter, s.t_exit
        );
    }
    println!(
        "{} voxels over t = [{:.6}, {:.6}]",
        spans.len(),
        spans[0].t_enter,
        spans[spans.len() - 1].t_exit
    );
    Ok(())
}

fn run_sweep(grid_args: &GridArgs, rays: usize, t_max: f64) -> Result<()> {
    let grid = grid_args.build()?;
    if rays == 0 {
        bail!("--rays must be at least 1");
    }
    let r = grid.r_max();
    let c = grid.center();
    let half = 0.7 * r;
    let frac = |j: usize| {
        if rays == 1 {
            0.5
        } else {
            j as f64 / (rays - 1) as f64
        }
    };

    let started = std::time::Instant::now();
    let results: Vec<(usize, bool)> = (0..rays * rays)
        .into_par_iter()
        .map(|i| {
            let x = c.x - half + 2.0 * half * frac(i % rays);
            let y = c.y - half + 2.0 * half * frac(i / rays);
            let Ok(ray) = Ray::new(Point3::new(x, y, c.z - (r + 1.0)), Vec3::new(0.0, 0.0, 1.0))
            else {
                return (0, false);
            };
            match walk_spherical_volume(&ray, &grid, t_max) {
                Ok(spans) => {
                    let through = spans.first().map(|s| s.voxel.radial) == Some(1)
                        && spans.last().map(|s| s.voxel.radial) == Some(1);
                    (spans.len(), through)
                }
                Err(_) => (0, false),
            }
        })
        .collect();
    let elapsed = started.elapsed();

    let records: usize = results.iter().map(|(n, _)| n).sum();
    let crossings = results.iter().filter(|(_, through)| *through).count();
    println!(
        "{} rays, {} voxel records, {} full crossings in {:.2?}",
        rays * rays,
        records,
        crossings,
        elapsed
    );
    Ok(())
}

fn run_info(grid_args: &GridArgs) -> Result<()> {
    let grid = grid_args.build()?;
    let c = grid.center();
    let bound = grid.bound();
    println!("center            ({}, {}, {})", c.x, c.y, c.z);
    println!("radial extent     [{}, {}]", bound.r_min, bound.r_max);
    println!(
        "polar range       [{:.6}, {:.6}] rad",
        bound.polar_min, bound.polar_max
    );
    println!(
        "azimuthal range   [{:.6}, {:.6}] rad",
        bound.azimuthal_min, bound.azimuthal_max
    );
    println!(
        "voxels            {} radial x {} polar x {} azimuthal = {}",
        grid.n_radial(),
        grid.n_polar(),
        grid.n_azimuthal(),
        grid.voxel_count()
    );
    println!("shell spacing     {:.6}", grid.radial_extent());
    println!("polar spacing     {:.6} rad", grid.polar_planes().delta());
    println!(
        "azimuthal spacing {:.6} rad",
        grid.azimuthal_planes().delta()
    );
    println!(
        "cell solid angle  {:.6} sr",
        grid.mean_voxel_solid_angle()
    );
    let n_shells = grid.n_radial() + 1;
    if n_shells <= 10 {
        let radii: Vec<f64> = (0..n_shells).map(|k| grid.shell_radius(k)).collect();
        println!("shells            {:?}", radii);
    } else {
        println!(
            "shells            [{}, {}, .., {}, {}]",
            grid.shell_radius(0),
            grid.shell_radius(1),
            grid.shell_radius(n_shells - 2),
            grid.shell_radius(n_shells - 1)
        );
    }
    Ok(())
}

fn parse_triple(s: &str) -> Result<(f64, f64, f64)> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        bail!("expected three comma-separated numbers, got {s:?}");
    }
    let x = parts[0].trim().parse()?;
    let y = parts[1].trim().parse()?;
    let z = parts[2].trim().parse()?;
    Ok((x, y, z))
}
