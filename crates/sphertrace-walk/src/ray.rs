//! Ray representation.

use sphertrace_math::{Point3, Vec3};

use crate::RayError;

/// A ray `P(t) = origin + t * direction`.
///
/// The direction is kept exactly as supplied — it need not be unit
/// length — so the parameter values the traversal reports stay in the
/// caller's own parameterization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    origin: Point3,
    direction: Vec3,
}

impl Ray {
    /// Create a ray, rejecting zero-length or non-finite geometry.
    pub fn new(origin: Point3, direction: Vec3) -> Result<Self, RayError> {
        let finite = origin.coords.iter().all(|c| c.is_finite())
            && direction.iter().all(|c| c.is_finite());
        if !finite {
            return Err(RayError::NonFinite);
        }
        if direction.norm_squared() == 0.0 {
            return Err(RayError::ZeroDirection);
        }
        Ok(Self { origin, direction })
    }

    /// Origin point.
    #[inline]
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// Direction vector, exactly as supplied.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Evaluate the ray at parameter `t`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }
}
