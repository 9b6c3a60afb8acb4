//! Spherical/Cartesian conversions, angle wrapping, and frame rotations
//!
//! All celestial directions in this crate are unit `Vector3<f64>` values.
//! The rotation constructors here build direction-cosine matrices in the
//! frame-rotation sense: applying the matrix to a vector expresses that
//! vector in axes rotated by the given angle, so composed transforms read
//! right-to-left in the order the frames are chained.

use nalgebra::{Matrix3, Vector3};
use std::f64::consts::{PI, TAU};

/// Convert spherical coordinates to a unit direction vector.
///
/// # Arguments
/// * `theta` — Longitude-like angle in radians (right ascension, -HA, ...)
/// * `phi` — Latitude-like angle in radians (declination, elevation, ...)
pub fn unit_vector(theta: f64, phi: f64) -> Vector3<f64> {
    let cp = phi.cos();
    Vector3::new(theta.cos() * cp, theta.sin() * cp, phi.sin())
}

/// Convert a direction vector to spherical coordinates `(theta, phi)`.
///
/// The vector need not be normalized. A vector along the pole (or the zero
/// vector) has no defined longitude; 0 is returned for the degenerate angle
/// rather than an indeterminate `atan2`.
pub fn spherical(p: &Vector3<f64>) -> (f64, f64) {
    let d2 = p.x * p.x + p.y * p.y;
    let theta = if d2 == 0.0 { 0.0 } else { p.y.atan2(p.x) };
    let phi = if p.z == 0.0 { 0.0 } else { p.z.atan2(d2.sqrt()) };
    (theta, phi)
}

/// Wrap an angle into the range [0, 2π).
pub fn wrap_to_2pi(a: f64) -> f64 {
    let w = a.rem_euclid(TAU);
    if w == TAU {
        0.0
    } else {
        w
    }
}

/// Wrap an angle into the range ±π.
pub fn wrap_to_pm_pi(a: f64) -> f64 {
    let mut w = a % TAU;
    if w.abs() >= PI {
        w -= TAU.copysign(a);
    }
    w
}

/// Frame rotation about the x-axis by `phi` radians.
pub fn rx(phi: f64) -> Matrix3<f64> {
    let (s, c) = phi.sin_cos();
    #[rustfmt::skip]
    let m = Matrix3::new(
        1.0, 0.0, 0.0,
        0.0,   c,   s,
        0.0,  -s,   c,
    );
    m
}

/// Frame rotation about the y-axis by `theta` radians.
pub fn ry(theta: f64) -> Matrix3<f64> {
    let (s, c) = theta.sin_cos();
    #[rustfmt::skip]
    let m = Matrix3::new(
          c, 0.0,  -s,
        0.0, 1.0, 0.0,
          s, 0.0,   c,
    );
    m
}

/// Frame rotation about the z-axis by `psi` radians.
pub fn rz(psi: f64) -> Matrix3<f64> {
    let (s, c) = psi.sin_cos();
    #[rustfmt::skip]
    let m = Matrix3::new(
          c,   s, 0.0,
         -s,   c, 0.0,
        0.0, 0.0, 1.0,
    );
    m
}
