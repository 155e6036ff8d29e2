#![warn(missing_docs)]

//! Spherical volume ray traversal.
//!
//! sphertrace walks rays through a sphere partitioned into radial shells,
//! polar wedges, and azimuthal wedges, reporting every voxel a ray enters
//! in order along with the parametric range spent inside it. This crate
//! is the facade: it re-exports the grid, math, and traversal crates
//! behind one dependency.
//!
//! # Example
//!
//! ```
//! use sphertrace::{walk_spherical_volume, Point3, Ray, SphereBound, SphericalVoxelGrid, Vec3};
//!
//! // A solid ball of radius 4 cut into 4 shells and 4 wedges per
//! // angular family.
//! let grid = SphericalVoxelGrid::new(
//!     Point3::origin(),
//!     SphereBound::full(4.0),
//!     4,
//!     4,
//!     4,
//! )
//! .unwrap();
//!
//! // A ray straight through the middle.
//! let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0)).unwrap();
//! let spans = walk_spherical_volume(&ray, &grid, 100.0).unwrap();
//!
//! // In through every shell and back out, with the innermost voxel
//! // split in two around the center.
//! let radials: Vec<usize> = spans.iter().map(|s| s.voxel.radial).collect();
//! assert_eq!(radials, [1, 2, 3, 4, 4, 3, 2, 1]);
//! assert_eq!(spans[0].t_enter, 1.0);
//! assert_eq!(spans[7].t_exit, 9.0);
//! ```

pub use sphertrace_grid;
pub use sphertrace_math;
pub use sphertrace_walk;

pub use sphertrace_grid::{GridError, SphereBound, SphericalVoxelGrid, WedgePlanes};
pub use sphertrace_math::{Point3, StepTolerance, Vec2, Vec3};
pub use sphertrace_walk::{
    walk_spherical_volume, Ray, RayError, SphericalVoxel, VoxelSpan, WalkError,
};
