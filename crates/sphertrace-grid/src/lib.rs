#![warn(missing_docs)]

//! Spherical voxel grid description for the sphertrace engine.
//!
//! An immutable partition of a (possibly hollow) ball into radial shell
//! intervals, polar wedges, and azimuthal wedges. Boundary trig tables
//! and squared shell radii are computed once at construction so the
//! traversal inner loop is a handful of multiplies and adds per step.

use std::f64::consts::PI;

use sphertrace_math::{Point3, Vec2};
use thiserror::Error;

// =============================================================================
// Errors
// =============================================================================

/// Errors from grid construction.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GridError {
    /// A voxel count is zero.
    #[error("voxel count for the {0} dimension must be at least 1")]
    ZeroCount(&'static str),

    /// Radial extent is empty, inverted, or extends below zero.
    #[error("invalid radial extent [{r_min}, {r_max}]: need 0 <= r_min < r_max")]
    InvalidRadialExtent {
        /// Requested inner radius.
        r_min: f64,
        /// Requested outer radius.
        r_max: f64,
    },

    /// An angular range is inverted or leaves `[0, 2π]`.
    #[error("invalid {family} range [{min}, {max}]: must be a subinterval of [0, 2*pi]")]
    InvalidAngularRange {
        /// Which angular family the range belongs to.
        family: &'static str,
        /// Requested range start.
        min: f64,
        /// Requested range end.
        max: f64,
    },

    /// The center or a bound contains a NaN or infinite component.
    #[error("grid geometry must be finite")]
    NonFinite,
}

// =============================================================================
// Sphere bound
// =============================================================================

/// The spatial extent of a spherical grid: a radial interval and the
/// polar and azimuthal angular ranges, each a subinterval of `[0, 2π]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereBound {
    /// Inner radius of the grid (0 for a solid ball).
    pub r_min: f64,
    /// Outer radius of the grid.
    pub r_max: f64,
    /// Start of the polar range (angle in the XY plane).
    pub polar_min: f64,
    /// End of the polar range.
    pub polar_max: f64,
    /// Start of the azimuthal range (angle in the XZ plane).
    pub azimuthal_min: f64,
    /// End of the azimuthal range.
    pub azimuthal_max: f64,
}

impl SphereBound {
    /// A solid ball of radius `r_max` with full angular coverage.
    pub fn full(r_max: f64) -> Self {
        Self::hollow(0.0, r_max)
    }

    /// A hollow ball `[r_min, r_max]` with full angular coverage.
    pub fn hollow(r_min: f64, r_max: f64) -> Self {
        Self {
            r_min,
            r_max,
            polar_min: 0.0,
            polar_max: 2.0 * PI,
            azimuthal_min: 0.0,
            azimuthal_max: 2.0 * PI,
        }
    }

    fn validate(&self) -> Result<(), GridError> {
        let fields = [
            self.r_min,
            self.r_max,
            self.polar_min,
            self.polar_max,
            self.azimuthal_min,
            self.azimuthal_max,
        ];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(GridError::NonFinite);
        }
        if !(0.0 <= self.r_min && self.r_min < self.r_max) {
            return Err(GridError::InvalidRadialExtent {
                r_min: self.r_min,
                r_max: self.r_max,
            });
        }
        for (family, min, max) in [
            ("polar", self.polar_min, self.polar_max),
            ("azimuthal", self.azimuthal_min, self.azimuthal_max),
        ] {
            if !(0.0 <= min && min < max && max <= 2.0 * PI) {
                return Err(GridError::InvalidAngularRange { family, min, max });
            }
        }
        Ok(())
    }
}

// =============================================================================
// Angular wedge tables
// =============================================================================

/// Boundary half-plane directions for one angular family.
///
/// Entry `k` holds `(cos θ_k, sin θ_k)` for the uniformly spaced boundary
/// angle `θ_k = start + k·delta`; wedge `k` lies between boundaries `k`
/// and `(k + 1) mod count`. For the polar family the components live in
/// the XY plane, for the azimuthal family in the XZ plane.
#[derive(Debug, Clone, PartialEq)]
pub struct WedgePlanes {
    cos_sin: Vec<(f64, f64)>,
    start: f64,
    delta: f64,
}

impl WedgePlanes {
    fn new(start: f64, end: f64, count: usize) -> Self {
        let delta = (end - start) / count as f64;
        let cos_sin = (0..count)
            .map(|k| {
                let (sin, cos) = (start + k as f64 * delta).sin_cos();
                (cos, sin)
            })
            .collect();
        Self {
            cos_sin,
            start,
            delta,
        }
    }

    /// Number of wedges (and of boundary planes) in this family.
    #[inline]
    pub fn count(&self) -> usize {
        self.cos_sin.len()
    }

    /// `(cos, sin)` of boundary plane `k`.
    #[inline]
    pub fn boundary(&self, k: usize) -> (f64, f64) {
        self.cos_sin[k]
    }

    /// Angular width of one wedge.
    #[inline]
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Wedge index containing the in-plane direction `v`.
    ///
    /// Wedges are lower-inclusive: a direction exactly on boundary `k`
    /// belongs to wedge `k`. Directions outside a partial angular range
    /// clamp into the nearest wedge. `v` must not be the zero vector for
    /// the result to be meaningful; callers substitute the travel
    /// direction when locating a point on the axis.
    pub fn wedge_of(&self, v: Vec2) -> usize {
        let mut angle = v.y.atan2(v.x);
        if angle < self.start {
            angle += 2.0 * PI;
        }
        let n = self.cos_sin.len();
        let idx = (((angle - self.start) / self.delta) as usize).min(n - 1);

        // The angle arithmetic can land just below a boundary the
        // direction itself sits on. Re-test against the boundary's own
        // trig entry, the same side test the traversal steps with, so
        // location and stepping agree on boundary directions.
        let upper = (idx + 1) % n;
        if upper != 0 {
            let (cos_b, sin_b) = self.cos_sin[upper];
            if cos_b * v.y - sin_b * v.x >= 0.0 {
                return upper;
            }
        }
        idx
    }
}

// =============================================================================
// Spherical voxel grid
// =============================================================================

/// An immutable spherical voxel grid.
///
/// Radial voxel `i` (1 = outermost, `n_radial` = innermost) spans the
/// interval between shells `n_radial - i` and `n_radial - i + 1` of the
/// uniformly spaced shell radii; shell 0 sits at `r_min` and shell
/// `n_radial` at `r_max`. The grid is freely shareable across concurrent
/// traversals.
#[derive(Debug, Clone, PartialEq)]
pub struct SphericalVoxelGrid {
    center: Point3,
    bound: SphereBound,
    shell_radii: Vec<f64>,
    shell_radii_sq: Vec<f64>,
    polar: WedgePlanes,
    azimuthal: WedgePlanes,
}

impl SphericalVoxelGrid {
    /// Build a grid from its bound and per-dimension voxel counts.
    pub fn new(
        center: Point3,
        bound: SphereBound,
        n_radial: usize,
        n_polar: usize,
        n_azimuthal: usize,
    ) -> Result<Self, GridError> {
        for (name, n) in [
            ("radial", n_radial),
            ("polar", n_polar),
            ("azimuthal", n_azimuthal),
        ] {
            if n == 0 {
                return Err(GridError::ZeroCount(name));
            }
        }
        bound.validate()?;
        if !center.coords.iter().all(|c| c.is_finite()) {
            return Err(GridError::NonFinite);
        }

        let dr = (bound.r_max - bound.r_min) / n_radial as f64;
        let shell_radii: Vec<f64> = (0..=n_radial)
            .map(|k| bound.r_min + k as f64 * dr)
            .collect();
        let shell_radii_sq = shell_radii.iter().map(|r| r * r).collect();

        Ok(Self {
            center,
            bound,
            shell_radii,
            shell_radii_sq,
            polar: WedgePlanes::new(bound.polar_min, bound.polar_max, n_polar),
            azimuthal: WedgePlanes::new(bound.azimuthal_min, bound.azimuthal_max, n_azimuthal),
        })
    }

    /// Sphere center.
    #[inline]
    pub fn center(&self) -> Point3 {
        self.center
    }

    /// The bound the grid was constructed from.
    #[inline]
    pub fn bound(&self) -> &SphereBound {
        &self.bound
    }

    /// Inner radius (0 for a solid ball).
    #[inline]
    pub fn r_min(&self) -> f64 {
        self.bound.r_min
    }

    /// Outer radius.
    #[inline]
    pub fn r_max(&self) -> f64 {
        self.bound.r_max
    }

    /// Number of radial voxels.
    #[inline]
    pub fn n_radial(&self) -> usize {
        self.shell_radii.len() - 1
    }

    /// Number of polar wedges.
    #[inline]
    pub fn n_polar(&self) -> usize {
        self.polar.count()
    }

    /// Number of azimuthal wedges.
    #[inline]
    pub fn n_azimuthal(&self) -> usize {
        self.azimuthal.count()
    }

    /// Total voxel count.
    pub fn voxel_count(&self) -> usize {
        self.n_radial() * self.n_polar() * self.n_azimuthal()
    }

    /// Radius of shell `k` (0 = `r_min`, `n_radial` = `r_max`).
    #[inline]
    pub fn shell_radius(&self, k: usize) -> f64 {
        self.shell_radii[k]
    }

    /// Squared radius of shell `k`.
    #[inline]
    pub fn shell_radius_sq(&self, k: usize) -> f64 {
        self.shell_radii_sq[k]
    }

    /// All shell radii, innermost first.
    #[inline]
    pub fn shells(&self) -> &[f64] {
        &self.shell_radii
    }

    /// Width of one radial voxel.
    #[inline]
    pub fn radial_extent(&self) -> f64 {
        self.shell_radii[1] - self.shell_radii[0]
    }

    /// Shell index of radial voxel `radial`'s inner boundary.
    #[inline]
    pub fn inner_shell_of(&self, radial: usize) -> usize {
        self.n_radial() - radial
    }

    /// Shell index of radial voxel `radial`'s outer boundary.
    #[inline]
    pub fn outer_shell_of(&self, radial: usize) -> usize {
        self.n_radial() - radial + 1
    }

    /// Inner and outer radius of radial voxel `radial`.
    pub fn radial_bounds(&self, radial: usize) -> (f64, f64) {
        (
            self.shell_radii[self.inner_shell_of(radial)],
            self.shell_radii[self.outer_shell_of(radial)],
        )
    }

    /// Mean solid angle subtended by one angular cell, in steradians.
    ///
    /// With uniform spacing every cell shares it: `Δθ·Δφ/π`, so the
    /// `n_polar · n_azimuthal` cells of a full-coverage grid tile the
    /// sphere's 4π steradians.
    pub fn mean_voxel_solid_angle(&self) -> f64 {
        self.polar.delta() * self.azimuthal.delta() / PI
    }

    /// Largest shell index `k` with `r_k² <= dist_sq + eps_sq`, or `None`
    /// when `dist_sq` lies inside even the innermost shell (the excluded
    /// core of a hollow grid).
    pub fn containing_shell(&self, dist_sq: f64, eps_sq: f64) -> Option<usize> {
        self.shell_radii_sq
            .iter()
            .rposition(|&r_sq| r_sq <= dist_sq + eps_sq)
    }

    /// Boundary table of the polar family (XY plane).
    #[inline]
    pub fn polar_planes(&self) -> &WedgePlanes {
        &self.polar
    }

    /// Boundary table of the azimuthal family (XZ plane).
    #[inline]
    pub fn azimuthal_planes(&self) -> &WedgePlanes {
        &self.azimuthal
    }
}
