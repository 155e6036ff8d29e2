//! Error types for ray construction and traversal.

use thiserror::Error;

/// Errors from [`Ray`](crate::Ray) construction.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RayError {
    /// The direction vector has zero length.
    #[error("ray direction must be non-zero")]
    ZeroDirection,

    /// A component of the origin or direction is NaN or infinite.
    #[error("ray origin and direction must be finite")]
    NonFinite,
}

/// Errors from a traversal call.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum WalkError {
    /// The state machine emitted more records than the safety bound
    /// allows. The partial sequence is discarded.
    #[error("traversal diverged: emitted {emitted} records, safety bound {cap}")]
    Diverged {
        /// Records emitted when the bound tripped.
        emitted: usize,
        /// The bound, `8 * (n_radial + n_polar + n_azimuthal)`.
        cap: usize,
    },
}
