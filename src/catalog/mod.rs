//! Catalog star entries and the catalog ↔ intermediate-frame transforms
//!
//! The forward chain applies, in order: space motion and parallax, solar
//! (or multi-body) gravitational light deflection, stellar aberration, and
//! the bias-precession-nutation rotation. The inverse chain undoes the
//! rotation algebraically; the two physical corrections have no closed-form
//! inverse (each is defined as a displacement depending on its own output)
//! and are undone by fixed-point iteration instead.

use nalgebra::Vector3;

use crate::astrom::EpochContext;
use crate::constants::{ASEC2RAD, KM_S_TO_AU_YEAR, LIGHT_TIME_AU_YEARS};
use crate::relativity::{aberration, deflect_by_bodies, solar_deflection, DeflectingBody};
use crate::sphere::{spherical, unit_vector, wrap_to_2pi};

/// Fixed iteration count for inverting aberration.
///
/// The fixed-point series converges geometrically in |v| ~ 1e-4, so two
/// passes leave a residual far below observational precision. The count is
/// part of the numerical contract; do not replace it with a convergence
/// test.
const ABERRATION_INVERSE_ITERATIONS: usize = 2;

/// Fixed iteration count for inverting light deflection; see
/// [`ABERRATION_INVERSE_ITERATIONS`].
const DEFLECTION_INVERSE_ITERATIONS: usize = 5;

/// A catalog star with space-motion parameters, referred to the ICRS.
#[derive(Debug, Clone, Copy)]
pub struct Star {
    /// Right ascension at the catalog epoch (radians)
    pub ra: f64,
    /// Declination at the catalog epoch (radians)
    pub dec: f64,
    /// Proper motion dRA/dt, radians per Julian year (not × cos δ)
    pub pm_ra: f64,
    /// Proper motion dDec/dt, radians per Julian year
    pub pm_dec: f64,
    /// Parallax in arcseconds
    pub parallax: f64,
    /// Radial velocity in km/s, positive receding
    pub rv: f64,
}

impl Star {
    /// Create a star from radian/arcsecond catalog parameters.
    pub fn new(ra: f64, dec: f64, pm_ra: f64, pm_dec: f64, parallax: f64, rv: f64) -> Self {
        Star {
            ra,
            dec,
            pm_ra,
            pm_dec,
            parallax,
            rv,
        }
    }

    /// Create a star from the units most catalogs publish.
    ///
    /// # Arguments
    /// * `ra_degrees`, `dec_degrees` — ICRS position in degrees
    /// * `pm_ra_cosdec_mas` — Proper motion in RA × cos δ, mas/yr
    /// * `pm_dec_mas` — Proper motion in Dec, mas/yr
    /// * `parallax_mas` — Parallax in milliarcseconds
    /// * `rv_km_s` — Radial velocity in km/s, positive receding
    pub fn from_catalog(
        ra_degrees: f64,
        dec_degrees: f64,
        pm_ra_cosdec_mas: f64,
        pm_dec_mas: f64,
        parallax_mas: f64,
        rv_km_s: f64,
    ) -> Self {
        let dec = dec_degrees.to_radians();
        let cd = dec.cos();
        // dRA/dt from the on-sky component; degenerate only exactly at a pole
        let pm_ra = if cd != 0.0 {
            pm_ra_cosdec_mas * 1e-3 * ASEC2RAD / cd
        } else {
            0.0
        };
        Star {
            ra: ra_degrees.to_radians(),
            dec,
            pm_ra,
            pm_dec: pm_dec_mas * 1e-3 * ASEC2RAD,
            parallax: parallax_mas * 1e-3,
            rv: rv_km_s,
        }
    }

    /// A motionless source: zero proper motion, parallax, and radial
    /// velocity.
    pub fn fixed(ra: f64, dec: f64) -> Self {
        Star::new(ra, dec, 0.0, 0.0, 0.0, 0.0)
    }
}

/// Propagate a star's catalog position through space motion and parallax.
///
/// Builds the barycentric "coordinate" direction at the epoch: the catalog
/// unit vector advanced by proper motion and radial velocity over the
/// bundle's motion interval (Rømer-corrected by the projection of the
/// observer's barycentric position on the star direction), then shifted by
/// parallax against the observer offset.
///
/// # Arguments
/// * `star` — Catalog entry
/// * `pmt` — Proper-motion time interval in Julian years
/// * `eb` — Barycentric observer position in au
pub fn space_motion_direction(star: &Star, pmt: f64, eb: &Vector3<f64>) -> Vector3<f64> {
    let (sr, cr) = star.ra.sin_cos();
    let (sd, cd) = star.dec.sin_cos();
    let p = Vector3::new(cr * cd, sr * cd, sd);

    // Rømer-corrected interval since the catalog epoch
    let dt = pmt + p.dot(eb) * LIGHT_TIME_AU_YEARS;

    // Space-motion vector: proper motion plus the radial term scaled by
    // parallax (radians per year along each axis)
    let pxr = star.parallax * ASEC2RAD;
    let w = KM_S_TO_AU_YEAR * star.rv * pxr;
    let pdz = star.pm_dec * p.z;
    let pm = Vector3::new(
        -star.pm_ra * p.y - pdz * cr + w * p.x,
        star.pm_ra * p.x - pdz * sr + w * p.y,
        star.pm_dec * cd + w * p.z,
    );

    let p = p + dt * pm - pxr * eb;
    p.normalize()
}

/// Transform a catalog star to the geocentric intermediate frame.
///
/// Returns `(ri, di)`: the intermediate-frame right ascension in [0, 2π)
/// and declination, both radians. Only the Sun deflects; for planetary
/// deflection use [`to_intermediate_with_bodies`].
pub fn to_intermediate(star: &Star, ctx: &EpochContext) -> (f64, f64) {
    let pco = space_motion_direction(star, ctx.pmt, &ctx.eb);
    let pnat = solar_deflection(&pco, &ctx.eh, ctx.em);
    let ppr = aberration(&pnat, &ctx.v, ctx.em, ctx.bm1);
    let pi = ctx.bpn * ppr;
    let (w, di) = spherical(&pi);
    (wrap_to_2pi(w), di)
}

/// Transform an ICRS direction without space motion to the intermediate
/// frame.
///
/// For sources with negligible proper motion and parallax (quasars, or
/// positions already propagated to the epoch).
pub fn icrs_to_intermediate(rc: f64, dc: f64, ctx: &EpochContext) -> (f64, f64) {
    let pco = unit_vector(rc, dc);
    let pnat = solar_deflection(&pco, &ctx.eh, ctx.em);
    let ppr = aberration(&pnat, &ctx.v, ctx.em, ctx.bm1);
    let pi = ctx.bpn * ppr;
    let (w, di) = spherical(&pi);
    (wrap_to_2pi(w), di)
}

/// Transform a catalog star to the intermediate frame, deflecting by an
/// ordered body list instead of the Sun alone.
///
/// To include the Sun, put it in the list (typically first).
pub fn to_intermediate_with_bodies(
    star: &Star,
    ctx: &EpochContext,
    bodies: &[DeflectingBody],
) -> (f64, f64) {
    let pco = space_motion_direction(star, ctx.pmt, &ctx.eb);
    let pnat = deflect_by_bodies(bodies, &ctx.eb, &pco);
    let ppr = aberration(&pnat, &ctx.v, ctx.em, ctx.bm1);
    let pi = ctx.bpn * ppr;
    let (w, di) = spherical(&pi);
    (wrap_to_2pi(w), di)
}

/// Invert one displacement-style correction by fixed-point iteration.
///
/// `forward` re-applies the forward correction to the current guess; the
/// displacement estimate starts at zero and is refined a fixed number of
/// times. Returns the normalized pre-correction direction.
fn invert_by_iteration<F>(observed: &Vector3<f64>, iterations: usize, forward: F) -> Vector3<f64>
where
    F: Fn(&Vector3<f64>) -> Vector3<f64>,
{
    let mut d = Vector3::zeros();
    let mut guess = *observed;
    for _ in 0..iterations {
        let before = (observed - d).normalize();
        let after = forward(&before);
        d = after - before;
        guess = (observed - d).normalize();
    }
    guess
}

/// Transform an intermediate-frame position back to the ICRS.
///
/// Returns the astrometric `(rc, dc)` — the coordinate direction at the
/// epoch, with aberration and solar deflection removed. Space motion is
/// not involved: a catalog position at another epoch is a separate,
/// star-specific concern.
pub fn from_intermediate(ri: f64, di: f64, ctx: &EpochContext) -> (f64, f64) {
    let pi = unit_vector(ri, di);
    let ppr = ctx.bpn.transpose() * pi;

    let pnat = invert_by_iteration(&ppr, ABERRATION_INVERSE_ITERATIONS, |p| {
        aberration(p, &ctx.v, ctx.em, ctx.bm1)
    });
    let pco = invert_by_iteration(&pnat, DEFLECTION_INVERSE_ITERATIONS, |p| {
        solar_deflection(p, &ctx.eh, ctx.em)
    });

    let (w, dc) = spherical(&pco);
    (wrap_to_2pi(w), dc)
}

/// Invert [`to_intermediate_with_bodies`]: recover the ICRS coordinate
/// direction against an ordered deflector list.
pub fn from_intermediate_with_bodies(
    ri: f64,
    di: f64,
    ctx: &EpochContext,
    bodies: &[DeflectingBody],
) -> (f64, f64) {
    let pi = unit_vector(ri, di);
    let ppr = ctx.bpn.transpose() * pi;

    let pnat = invert_by_iteration(&ppr, ABERRATION_INVERSE_ITERATIONS, |p| {
        aberration(p, &ctx.v, ctx.em, ctx.bm1)
    });
    let pco = invert_by_iteration(&pnat, DEFLECTION_INVERSE_ITERATIONS, |p| {
        deflect_by_bodies(bodies, &ctx.eb, p)
    });

    let (w, dc) = spherical(&pco);
    (wrap_to_2pi(w), dc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astrom::StateVector;
    use crate::constants::J2000;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Identity bundle: motionless observer at the barycenter, unit
    /// distance from the Sun, no frame rotation.
    fn identity_context() -> EpochContext {
        EpochContext {
            pmt: 0.0,
            eb: Vector3::zeros(),
            eh: Vector3::new(0.0, 1.0, 0.0),
            em: 1.0,
            v: Vector3::zeros(),
            bm1: 1.0,
            bpn: nalgebra::Matrix3::identity(),
        }
    }

    /// A bundle with realistic orbital velocity and solar geometry.
    fn moving_context() -> EpochContext {
        let earth = StateVector::new(
            Vector3::new(0.9, -0.4, 0.0),
            Vector3::new(0.007, 0.0157, 0.0),
        );
        let ehp = Vector3::new(0.9, -0.4, 0.0);
        EpochContext::geocentric(J2000 + 123.0, 0.5, &earth, &ehp)
    }

    // Barnard's Star: large proper motion and parallax
    fn barnard() -> Star {
        Star::from_catalog(269.452_083, 4.693_391, -798.71, 10337.77, 545.4, -110.6)
    }

    #[test]
    fn test_from_catalog_units() {
        let s = barnard();
        assert_relative_eq!(s.ra, 269.452_083f64.to_radians(), epsilon = 1e-12);
        assert_relative_eq!(s.parallax, 0.5454, epsilon = 1e-12);
        // dDec/dt ~ 10.3 arcsec/yr in radians
        assert_relative_eq!(s.pm_dec, 10.337_77 * ASEC2RAD, epsilon = 1e-12);
    }

    #[test]
    fn test_no_motion_space_motion_is_identity() {
        let star = Star::fixed(1.1, -0.4);
        let p = space_motion_direction(&star, 5.0, &Vector3::new(0.3, -0.8, 0.1));
        let expected = unit_vector(1.1, -0.4);
        assert_relative_eq!((p - expected).norm(), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_proper_motion_moves_star() {
        let star = barnard();
        let p0 = space_motion_direction(&star, 0.0, &Vector3::zeros());
        let p10 = space_motion_direction(&star, 10.0, &Vector3::zeros());
        // ~10.4 arcsec/yr over 10 years
        let angle = p0.cross(&p10).norm();
        assert!(
            angle > 100.0 * ASEC2RAD && angle < 110.0 * ASEC2RAD,
            "moved {} arcsec",
            angle / ASEC2RAD
        );
    }

    #[test]
    fn test_parallax_shift_magnitude() {
        // 0.5454 arcsec parallax with a 1 au baseline perpendicular to the
        // line of sight shifts the star by about its parallax angle
        let star = barnard();
        let p0 = space_motion_direction(&star, 0.0, &Vector3::zeros());
        let baseline = p0.cross(&Vector3::z()).normalize();
        let p1 = space_motion_direction(&star, 0.0, &baseline);
        let angle = p0.cross(&p1).norm();
        assert!(
            angle > 0.5 * ASEC2RAD && angle < 0.6 * ASEC2RAD,
            "parallax shift {} arcsec",
            angle / ASEC2RAD
        );
    }

    /// A single deflector of zero mass: the deflection step becomes the
    /// identity map regardless of geometry.
    fn massless_body() -> [DeflectingBody; 1] {
        [DeflectingBody {
            mass_solar: 0.0,
            limiter: 1e-6,
            position: Vector3::new(0.0, 1.0, 0.0),
            velocity: Vector3::zeros(),
        }]
    }

    #[test]
    fn test_identity_scenario() {
        // Identity bundle, massless deflector, origin star, no motion:
        // output exactly (0, 0)
        let ctx = identity_context();
        let star = Star::fixed(0.0, 0.0);
        let (ri, di) = to_intermediate_with_bodies(&star, &ctx, &massless_body());
        assert_relative_eq!(ri, 0.0, epsilon = 1e-15);
        assert_relative_eq!(di, 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_solar_deflection_in_default_path() {
        // The Sun-only path bends a quadrature star by ~4 mas even in an
        // otherwise identity bundle
        let ctx = identity_context();
        let (ri, di) = to_intermediate(&Star::fixed(0.0, 0.0), &ctx);
        let sep = unit_vector(ri, di).cross(&unit_vector(0.0, 0.0)).norm();
        assert!(
            sep > 3.9e-3 * ASEC2RAD && sep < 4.2e-3 * ASEC2RAD,
            "solar bend {} arcsec",
            sep / ASEC2RAD
        );
    }

    #[test]
    fn test_aberration_dominates_moving_context() {
        // With v ~ 1e-4 c the intermediate place differs from the catalog
        // place at the tens-of-arcseconds level
        let ctx = moving_context();
        let star = Star::fixed(2.0, 0.5);
        let (ri, di) = to_intermediate(&star, &ctx);
        let shift = unit_vector(ri, di).cross(&unit_vector(2.0, 0.5)).norm();
        assert!(
            shift > 1.0 * ASEC2RAD && shift < 30.0 * ASEC2RAD,
            "shift {} arcsec",
            shift / ASEC2RAD
        );
    }

    #[test]
    fn test_round_trip_fixed_stars() {
        // Forward then inverse must return the catalog direction to well
        // below a microarcsecond for motionless sources
        let ctx = moving_context();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let rc = rng.gen::<f64>() * std::f64::consts::TAU;
            let dc = (2.0 * rng.gen::<f64>() - 1.0).asin();
            let (ri, di) = to_intermediate(&Star::fixed(rc, dc), &ctx);
            let (rc2, dc2) = from_intermediate(ri, di, &ctx);
            let sep = unit_vector(rc, dc).cross(&unit_vector(rc2, dc2)).norm();
            assert!(sep < 5e-12, "round trip residual {} rad at ({}, {})", sep, rc, dc);
        }
    }

    #[test]
    fn test_inverse_recovers_propagated_direction() {
        // For a star with space motion, the inverse lands on the
        // epoch-propagated coordinate direction, not the catalog position
        let ctx = moving_context();
        let star = barnard();
        let (ri, di) = to_intermediate(&star, &ctx);
        let (rc2, dc2) = from_intermediate(ri, di, &ctx);
        let propagated = space_motion_direction(&star, ctx.pmt, &ctx.eb);
        let sep = propagated.cross(&unit_vector(rc2, dc2)).norm();
        assert!(sep < 5e-12, "residual {} rad", sep);
    }

    #[test]
    fn test_round_trip_with_bodies() {
        let ctx = moving_context();
        let bodies = [
            DeflectingBody {
                mass_solar: 1.0,
                limiter: 1e-6,
                position: Vector3::zeros(),
                velocity: Vector3::zeros(),
            },
            DeflectingBody {
                mass_solar: crate::relativity::solar_mass("jupiter").unwrap(),
                limiter: 1e-9,
                position: Vector3::new(-4.0, 3.0, 0.1),
                velocity: Vector3::new(-2e-3, -4e-3, 0.0),
            },
        ];
        let star = Star::fixed(4.0, -1.0);
        let (ri, di) = to_intermediate_with_bodies(&star, &ctx, &bodies);
        let (rc2, dc2) = from_intermediate_with_bodies(ri, di, &ctx, &bodies);
        let sep = unit_vector(4.0, -1.0).cross(&unit_vector(rc2, dc2)).norm();
        assert!(sep < 5e-12, "residual {} rad", sep);
    }

    #[test]
    fn test_icrs_matches_fixed_star_path() {
        let ctx = moving_context();
        let (r1, d1) = to_intermediate(&Star::fixed(3.3, 0.9), &ctx);
        let (r2, d2) = icrs_to_intermediate(3.3, 0.9, &ctx);
        // Differ only by the parallax/pm machinery running on zeros
        assert_relative_eq!(r1, r2, epsilon = 1e-13);
        assert_relative_eq!(d1, d2, epsilon = 1e-13);
    }

    #[test]
    fn test_frame_rotation_applied_last() {
        // With a pure frame rotation and no physics, output = rotated input
        let mut ctx = identity_context();
        ctx.bpn = crate::sphere::rz(0.25);
        let star = Star::fixed(1.0, 0.2);
        let (ri, di) = to_intermediate_with_bodies(&star, &ctx, &massless_body());
        assert_relative_eq!(ri, 1.0 - 0.25, epsilon = 1e-13);
        assert_relative_eq!(di, 0.2, epsilon = 1e-13);
    }

    #[test]
    fn test_ra_wrapped_into_full_turn() {
        let ctx = identity_context();
        let star = Star::fixed(-0.5, 0.1);
        let (ri, _) = to_intermediate_with_bodies(&star, &ctx, &massless_body());
        assert!(ri >= 0.0 && ri < std::f64::consts::TAU);
        assert_relative_eq!(ri, std::f64::consts::TAU - 0.5, epsilon = 1e-13);
    }
}
