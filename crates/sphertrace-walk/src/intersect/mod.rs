//! Boundary intersectors for the three spherical coordinate families.
//!
//! Each family has a dedicated intersector that produces the parameter of
//! the next boundary crossing strictly after the current position, if
//! any. The traversal driver takes the minimum of the three.

mod halfplane;
mod shell;
mod sphere;

pub use halfplane::{next_angular_crossing, AngularCrossing, AngularStep};
pub use shell::{next_radial_crossing, RadialCrossing, RadialStep};
pub use sphere::{sphere_entry, SphereEntry};

use sphertrace_math::Vec3;

/// Roots of the shell quadratic `|v + t·d|² = r²`, sorted ascending.
///
/// `None` when the ray's line misses the shell entirely. A double root
/// (tangency) comes back as two equal values.
pub(crate) fn shell_roots(v: &Vec3, d: &Vec3, radius_sq: f64) -> Option<(f64, f64)> {
    let a = d.dot(d);
    let b = 2.0 * v.dot(d);
    let c = v.dot(v) - radius_sq;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_disc = discriminant.sqrt();
    let t0 = (-b - sqrt_disc) / (2.0 * a);
    let t1 = (-b + sqrt_disc) / (2.0 * a);
    Some((t0, t1))
}
