#![warn(missing_docs)]

//! Spherical volume ray traversal for the sphertrace engine.
//!
//! Given a [`Ray`] and a [`SphericalVoxelGrid`](sphertrace_grid::SphericalVoxelGrid),
//! [`walk_spherical_volume`] produces the ordered sequence of voxels the
//! ray enters, each with the parametric range spent in it. The algorithm
//! generalizes Amanatides–Woo grid stepping to spherical coordinates:
//! the driver repeatedly asks the radial, polar, and azimuthal
//! intersectors for their next boundary crossing, advances to the
//! nearest, and updates every index tied at that parameter.
//!
//! # Architecture
//!
//! - [`Ray`] — validated origin/direction pair
//! - [`intersect`] — per-family boundary intersectors (outer-shell entry,
//!   radial shells, angular half-planes)
//! - [`walk_spherical_volume`] — the traversal state machine
//!
//! # Example
//!
//! ```
//! use sphertrace_grid::{SphereBound, SphericalVoxelGrid};
//! use sphertrace_math::{Point3, Vec3};
//! use sphertrace_walk::{walk_spherical_volume, Ray};
//!
//! let grid = SphericalVoxelGrid::new(
//!     Point3::origin(),
//!     SphereBound::full(4.0),
//!     4,
//!     4,
//!     4,
//! )
//! .unwrap();
//! let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0)).unwrap();
//!
//! let spans = walk_spherical_volume(&ray, &grid, 100.0).unwrap();
//! let radials: Vec<usize> = spans.iter().map(|s| s.voxel.radial).collect();
//! assert_eq!(radials, [1, 2, 3, 4, 4, 3, 2, 1]);
//! ```

mod error;
mod ray;
mod walk;

pub mod intersect;

pub use error::{RayError, WalkError};
pub use ray::Ray;
pub use walk::{walk_spherical_volume, SphericalVoxel, VoxelSpan};
