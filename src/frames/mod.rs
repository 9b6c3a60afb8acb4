//! Rotation matrices locating the intermediate and terrestrial frames
//!
//! Builds the CIO-based celestial-to-intermediate matrix from Celestial
//! Intermediate Pole coordinates, the polar-motion matrix from published
//! pole offsets, and the equation of the origins. The underlying series for
//! the pole coordinates, locators, and rotation angle live with the caller;
//! this module only assembles rotations from supplied angles.
//!
//! References: IAU 2000 Resolution B1.8; Capitaine & Wallace, Astron.
//! Astrophys. 450, 855 (2006); IERS Conventions (2010), Chapter 5.

use nalgebra::Matrix3;

use crate::sphere::{rx, ry, rz};

/// Form the celestial-to-intermediate matrix from CIP coordinates.
///
/// Given the Celestial Intermediate Pole direction cosines `x`, `y` and the
/// CIO locator `s` (radians), returns the rotation taking GCRS directions
/// into the celestial intermediate frame of date.
///
/// # Arguments
/// * `x`, `y` — CIP coordinates in the GCRS (unit-vector components)
/// * `s` — CIO locator in radians
pub fn intermediate_frame_matrix(x: f64, y: f64, s: f64) -> Matrix3<f64> {
    // Spherical position angle and colatitude of the CIP
    let r2 = x * x + y * y;
    let e = if r2 > 0.0 { y.atan2(x) } else { 0.0 };
    let d = (r2 / (1.0 - r2)).sqrt().atan();

    rz(-(e + s)) * ry(d) * rz(e)
}

/// Form the polar-motion matrix for pole offsets `xp`, `yp` and the TIO
/// locator `sp` (all radians).
///
/// The result carries ITRS positions into the terrestrial intermediate
/// frame of date.
pub fn polar_motion_matrix(xp: f64, yp: f64, sp: f64) -> Matrix3<f64> {
    rx(-yp) * ry(-xp) * rz(sp)
}

/// Equation of the origins, given the classical bias-precession-nutation
/// matrix and the CIO locator `s`.
///
/// Returns the angle from the Celestial Intermediate Origin to the equinox
/// of date, measured along the intermediate equator (radians). Equal to
/// ERA − GST.
pub fn equation_of_origins(rnpb: &Matrix3<f64>, s: f64) -> f64 {
    let x = rnpb[(2, 0)];
    let ax = x / (1.0 + rnpb[(2, 2)]);
    let xs = 1.0 - ax * x;
    let ys = -ax * rnpb[(2, 1)];
    let zs = -x;
    let p = rnpb[(0, 0)] * xs + rnpb[(0, 1)] * ys + rnpb[(0, 2)] * zs;
    let q = rnpb[(1, 0)] * xs + rnpb[(1, 1)] * ys + rnpb[(1, 2)] * zs;
    if p != 0.0 || q != 0.0 {
        s - q.atan2(p)
    } else {
        s
    }
}
