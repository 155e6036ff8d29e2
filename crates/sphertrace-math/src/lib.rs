#![warn(missing_docs)]

//! Math types for the sphertrace traversal engine.
//!
//! Thin wrappers around nalgebra providing the types the spherical
//! traversal works in: 3D points and vectors, 2D projections onto the
//! polar and azimuthal planes, and the tolerance model shared by the
//! three boundary step functions.

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = nalgebra::Vector3<f64>;

/// A vector in one of the 2D projection planes (XY for the polar family,
/// XZ for the azimuthal family).
pub type Vec2 = nalgebra::Vector2<f64>;

/// Tolerances used by the traversal state machine.
///
/// A single parametric epsilon is shared by the radial and angular step
/// functions so that "strictly after the current position" and tie
/// detection mean the same thing across the three coordinate families;
/// asymmetric epsilons would make ties order-dependent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepTolerance {
    /// Parametric tolerance: crossings at `t <= t_cur + t` are rejected,
    /// and candidates within `t` of the minimum are treated as tied.
    pub t: f64,
    /// World-space tolerance for classifying a point as lying on a shell
    /// boundary or on an angular family's central axis.
    pub world: f64,
}

impl StepTolerance {
    /// Relative parametric epsilon, scaled by the traversal's parameter
    /// range.
    pub const T_REL: f64 = 1e-12;

    /// Relative world epsilon, scaled by the sphere's maximum radius.
    pub const WORLD_REL: f64 = 1e-9;

    /// Tolerances for a traversal bounded by `t_limit` through a sphere
    /// of maximum radius `r_max`.
    ///
    /// The parametric epsilon is `1e-12 * max(1, t_limit)`; the world
    /// epsilon is `1e-9 * max(1, r_max)`.
    pub fn for_walk(t_limit: f64, r_max: f64) -> Self {
        Self {
            t: Self::T_REL * t_limit.max(1.0),
            world: Self::WORLD_REL * r_max.max(1.0),
        }
    }

    /// Tolerance for comparing squared distances against squared shell
    /// radii: a world-space band of `world` around a shell of radius
    /// `r_max` or less.
    pub fn radius_sq(&self, r_max: f64) -> f64 {
        2.0 * r_max * self.world
    }
}
