//! # Utility Module
//!
//! Tolerance helpers for plane matching and point deduplication.
//!
//! Geometry is never compared bit-for-bit. Scalars are compared with an
//! absolute tolerance, and points are hashed through [`quantize`], which
//! snaps each coordinate onto a grid of `epsilon` sized cells.

use crate::utils::geometry::Vec3;

/// Returns true if `a` and `b` differ by at most `epsilon`.
///
/// # Examples
///
/// ```
/// use collision_compiler::utils::util::approx_eq;
///
/// assert!(approx_eq(1.0, 1.000001, 1e-5));
/// assert!(!approx_eq(1.0, 1.001, 1e-5));
/// ```
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}

/// Hash key for a point: each coordinate rounded to a multiple of `epsilon`.
pub fn quantize(point: &Vec3, epsilon: f64) -> (i64, i64, i64) {
    let snap = |value: f64| (value / epsilon).round() as i64;
    (snap(point.x), snap(point.y), snap(point.z))
}
