//! Relativistic corrections for astrometry
//!
//! Gravitational light bending (IAU 2000 resolutions, post-Newtonian
//! single-body form) and stellar aberration (relativistic, via the
//! reciprocal Lorentz factor). Both operate on unit direction vectors and
//! are formulated so that a parameter bundle computed once per epoch serves
//! any number of sources.

use nalgebra::Vector3;

use crate::constants::{LIGHT_TIME_AU_DAYS, SUN_SCHWARZSCHILD_AU};

/// Reciprocal masses of solar system bodies (mass of Sun / mass of body).
///
/// Used to scale gravitational deflection for bodies other than the Sun.
pub const RECIPROCAL_MASSES: &[(&str, f64)] = &[
    ("sun", 1.0),
    ("mercury", 6023600.0),
    ("venus", 408523.71),
    ("earth", 332946.050895),
    ("moon", 27068700.387534),
    ("mars", 3098708.0),
    ("jupiter", 1047.3486),
    ("saturn", 3497.898),
    ("uranus", 22902.98),
    ("neptune", 19412.24),
];

/// Look up a body's mass in solar masses.
pub fn solar_mass(name: &str) -> Option<f64> {
    RECIPROCAL_MASSES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, rm)| 1.0 / rm)
}

/// A gravitating body contributing light deflection.
#[derive(Debug, Clone)]
pub struct DeflectingBody {
    /// Mass in solar masses
    pub mass_solar: f64,
    /// Deflection limiter: floor for the geometry factor q·(q+e), capping
    /// the correction for rays that graze or transit the body
    pub limiter: f64,
    /// Barycentric position at the epoch (au)
    pub position: Vector3<f64>,
    /// Barycentric velocity at the epoch (au/day)
    pub velocity: Vector3<f64>,
}

/// Deflect a light ray by a single gravitating body.
///
/// # Arguments
/// * `mass_solar` — Deflecting body mass in solar masses
/// * `p` — Observer-to-source unit direction
/// * `q` — Body-to-source unit direction
/// * `e` — Body-to-observer unit direction
/// * `em` — Body-to-observer distance in au
/// * `limiter` — Floor for q·(q+e), preventing blow-up when the source is
///   seen through the body
///
/// Returns the deflected direction. The output is a unit vector to the
/// accuracy of the correction itself, which is everywhere small.
pub fn light_deflection(
    mass_solar: f64,
    p: &Vector3<f64>,
    q: &Vector3<f64>,
    e: &Vector3<f64>,
    em: f64,
    limiter: f64,
) -> Vector3<f64> {
    let qpe = q + e;
    let qdqpe = q.dot(&qpe);
    let w = mass_solar * SUN_SCHWARZSCHILD_AU / em / qdqpe.max(limiter);

    // Correction lies along p × (e × q)
    let eq = e.cross(q);
    let peq = p.cross(&eq);
    p + w * peq
}

/// Deflect a light ray by the Sun.
///
/// The limiter is scaled with the inverse square of the Sun-observer
/// distance so that the cap engages only within the solar disc as seen
/// from the observer (about 5 arcminutes at 1 au, shrinking for more
/// distant observers).
///
/// # Arguments
/// * `p` — Observer-to-source unit direction
/// * `e` — Sun-to-observer unit direction
/// * `em` — Sun-to-observer distance in au
pub fn solar_deflection(p: &Vector3<f64>, e: &Vector3<f64>, em: f64) -> Vector3<f64> {
    let em2 = (em * em).max(1.0);
    light_deflection(1.0, p, p, e, em, 1e-6 / em2)
}

/// Deflect a light ray by an ordered list of bodies.
///
/// Contributions compose sequentially, each body seeing the direction
/// already updated by the bodies before it. For every body the light ray
/// is traced back to the instant it passed closest, and the body's motion
/// over that interval is accounted for; sources "behind" the observer
/// relative to a body are left untouched.
///
/// # Arguments
/// * `bodies` — Deflectors, ordered by decreasing importance
/// * `observer` — Barycentric position of the observer in au
/// * `direction` — Observer-to-source unit direction
pub fn deflect_by_bodies(
    bodies: &[DeflectingBody],
    observer: &Vector3<f64>,
    direction: &Vector3<f64>,
) -> Vector3<f64> {
    let mut p = *direction;
    for body in bodies {
        // Time since the light passed the body (days, non-positive)
        let v = observer - body.position;
        let dt = (p.dot(&v) * LIGHT_TIME_AU_DAYS).min(0.0);

        // Body position when the light was passing it
        let ev = observer - (body.position + dt * body.velocity);
        let em = ev.norm();
        let e = ev / em;

        p = light_deflection(body.mass_solar, &p, &p, &e, em, body.limiter);
    }
    p
}

/// Apply stellar aberration to a natural direction.
///
/// Relativistic formulation in terms of the observer velocity `v`
/// (in units of c) and the reciprocal Lorentz factor `bm1` = √(1−|v|²),
/// including the light-bending cross term that keeps the aberrated
/// direction consistent with the solar deflection already applied.
///
/// # Arguments
/// * `pnat` — Natural (post-deflection) unit direction
/// * `v` — Observer barycentric velocity in units of c
/// * `s` — Observer distance from the Sun in au
/// * `bm1` — Reciprocal Lorentz factor √(1−|v|²)
///
/// Returns the proper direction as a unit vector.
pub fn aberration(pnat: &Vector3<f64>, v: &Vector3<f64>, s: f64, bm1: f64) -> Vector3<f64> {
    let pdv = pnat.dot(v);
    let w1 = 1.0 + pdv / (1.0 + bm1);
    let w2 = SUN_SCHWARZSCHILD_AU / s;
    let p = pnat * bm1 + w1 * v + w2 * (v - pdv * pnat);
    p / p.norm()
}
