//! Astrometry parameter bundles
//!
//! A bundle gathers every frame- and observer-dependent quantity needed to
//! transform any number of star positions for one instant, so the expensive
//! per-epoch work is paid once and amortized across a whole catalog.
//!
//! Two bundle variants keep the mutually exclusive aberration treatments
//! apart by construction:
//!
//! - [`EpochContext`] carries the full relativistic chain (catalog →
//!   intermediate frame): observer barycentric state, solar geometry, and
//!   the bias-precession-nutation rotation.
//! - [`SiteContext`] carries the intermediate → observed chain: local Earth
//!   rotation, polar motion resolved into the meridian, refraction
//!   constants, plus (only when built standalone) the first-order diurnal
//!   aberration term.
//! - [`TopoContext`] composes both for the complete catalog → observed
//!   chain; there the diurnal term is zero because the observer's full
//!   velocity, site rotation included, is already in the epoch context.
//!
//! Bundles are immutable after construction, with one documented exception:
//! the Earth-rotation-only update for tracking loops
//! ([`SiteContext::update_earth_rotation`]).

use nalgebra::{Matrix3, Vector3};

use crate::constants::{AU_M, C, DAY_S, J2000, JULIAN_YEAR_DAYS, LIGHT_TIME_AU_DAYS};
use crate::frames::intermediate_frame_matrix;
use crate::site::GeographicPosition;
use crate::sphere::{rx, ry, rz, wrap_to_pm_pi};

/// A position/velocity pair in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

impl StateVector {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        StateVector { position, velocity }
    }

    pub fn zero() -> Self {
        StateVector {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
        }
    }
}

/// Frame- and observer-dependent parameters for the catalog → intermediate
/// transform at one epoch.
///
/// Read-only once built; share freely across threads and stars.
#[derive(Debug, Clone)]
pub struct EpochContext {
    /// Proper-motion time interval since J2000.0 in Julian years,
    /// Rømer-corrected per star at transform time
    pub pmt: f64,
    /// Barycentric position of the observer (au)
    pub eb: Vector3<f64>,
    /// Sun-to-observer unit direction
    pub eh: Vector3<f64>,
    /// Sun-to-observer distance (au)
    pub em: f64,
    /// Barycentric velocity of the observer in units of c
    pub v: Vector3<f64>,
    /// Reciprocal Lorentz factor √(1−|v|²)
    pub bm1: f64,
    /// Bias-precession-nutation rotation into the intermediate frame
    pub bpn: Matrix3<f64>,
}

impl EpochContext {
    /// Build the context for an observer at the geocenter.
    ///
    /// # Arguments
    /// * `tt1`, `tt2` — TT epoch as a two-part Julian date
    /// * `earth` — Barycentric Earth state (au, au/day)
    /// * `ehp` — Heliocentric Earth position (au)
    ///
    /// The frame rotation is left at identity; follow with
    /// [`with_intermediate_frame`](Self::with_intermediate_frame) for
    /// intermediate-frame output.
    pub fn geocentric(tt1: f64, tt2: f64, earth: &StateVector, ehp: &Vector3<f64>) -> Self {
        Self::for_observer(tt1, tt2, &StateVector::zero(), earth, ehp)
    }

    /// Build the context for an observer offset from the geocenter.
    ///
    /// # Arguments
    /// * `tt1`, `tt2` — TT epoch as a two-part Julian date
    /// * `observer` — Geocentric observer state in meters and m/s (GCRS)
    /// * `earth` — Barycentric Earth state (au, au/day)
    /// * `ehp` — Heliocentric Earth position (au)
    pub fn for_observer(
        tt1: f64,
        tt2: f64,
        observer: &StateVector,
        earth: &StateVector,
        ehp: &Vector3<f64>,
    ) -> Self {
        // au/day in m/s
        let au_day_ms = AU_M / DAY_S;

        let pmt = ((tt1 - J2000) + tt2) / JULIAN_YEAR_DAYS;

        // Adjust the Earth ephemeris to the observer
        let dp = observer.position / AU_M;
        let dv = observer.velocity / au_day_ms;
        let eb = earth.position + dp;
        let vb = earth.velocity + dv;
        let ph = ehp + dp;

        let em = ph.norm();
        let eh = ph / em;

        // Velocity in units of c, and the reciprocal Lorentz factor
        let v = vb * LIGHT_TIME_AU_DAYS;
        let bm1 = (1.0 - v.norm_squared()).sqrt();

        EpochContext {
            pmt,
            eb,
            eh,
            em,
            v,
            bm1,
            bpn: Matrix3::identity(),
        }
    }

    /// Install the CIO-based intermediate-frame rotation from CIP
    /// coordinates `x`, `y` and the CIO locator `s`.
    pub fn with_intermediate_frame(mut self, x: f64, y: f64, s: f64) -> Self {
        self.bpn = intermediate_frame_matrix(x, y, s);
        self
    }
}

/// Local-horizon parameters for the intermediate → observed transform.
///
/// Built standalone via [`SiteContext::observed_only`] (diurnal aberration
/// populated) or as part of a [`TopoContext`] (diurnal aberration zero).
#[derive(Debug, Clone)]
pub struct SiteContext {
    /// Adjusted site longitude: local minus Greenwich Earth rotation angle
    pub along: f64,
    /// Geodetic latitude (radians)
    pub phi: f64,
    /// Sine of the geodetic latitude
    pub sphi: f64,
    /// Cosine of the geodetic latitude
    pub cphi: f64,
    /// Polar-motion offsets resolved into the local meridian (radians)
    pub xpl: f64,
    pub ypl: f64,
    /// Local Earth rotation angle (radians)
    pub eral: f64,
    /// First-order diurnal aberration magnitude (site speed / c)
    pub diurab: f64,
    /// Refraction model coefficient A (radians)
    pub refa: f64,
    /// Refraction model coefficient B (radians)
    pub refb: f64,
}

/// Solve the composed CIRS → local [HA,Dec] rotation by inspection.
///
/// Returns `(eral, xpl, ypl, along)`. The matrix is Rz(elong) · Rx(−yp) ·
/// Ry(−xp) · Rz(θ + s′); the angles fall out of individual entries via
/// `atan2`, with zero-vector guards at the degenerate poles.
fn solve_local_frame(theta: f64, sp: f64, xp: f64, yp: f64, elong: f64) -> (f64, f64, f64, f64) {
    let r = rz(elong) * rx(-yp) * ry(-xp) * rz(theta + sp);

    let a = r[(0, 0)];
    let b = r[(0, 1)];
    let eral = if a != 0.0 || b != 0.0 {
        b.atan2(a)
    } else {
        0.0
    };

    let c = r[(0, 2)];
    let xpl = c.atan2((a * a + b * b).sqrt());
    let a = r[(1, 2)];
    let b = r[(2, 2)];
    let ypl = if a != 0.0 || b != 0.0 {
        -a.atan2(b)
    } else {
        0.0
    };

    let along = wrap_to_pm_pi(eral - theta);
    (eral, xpl, ypl, along)
}

impl SiteContext {
    /// Build the CIRS-only observed chain for a site.
    ///
    /// Use when the caller supplies intermediate-frame coordinates directly
    /// and no barycentric state is involved; annual aberration is then the
    /// caller's business and only the first-order diurnal term is applied
    /// here.
    ///
    /// # Arguments
    /// * `theta` — Earth rotation angle (radians)
    /// * `site` — Geodetic observing site
    /// * `xp`, `yp` — Polar motion offsets (radians)
    /// * `sp` — TIO locator (radians)
    /// * `refa`, `refb` — Refraction model coefficients (radians)
    pub fn observed_only(
        theta: f64,
        site: &GeographicPosition,
        xp: f64,
        yp: f64,
        sp: f64,
        refa: f64,
        refb: f64,
    ) -> Self {
        let (eral, xpl, ypl, along) = solve_local_frame(theta, sp, xp, yp, site.longitude);

        // Site rotational speed, for the first-order diurnal aberration
        let (_, vel) = site.position_velocity(xp, yp, sp, theta);
        let diurab = (vel.x * vel.x + vel.y * vel.y).sqrt() / C;

        SiteContext {
            along,
            phi: site.latitude,
            sphi: site.latitude.sin(),
            cphi: site.latitude.cos(),
            xpl,
            ypl,
            eral,
            diurab,
            refa,
            refb,
        }
    }

    /// Re-aim the bundle at a new Earth rotation angle.
    ///
    /// Recomputes only `eral = theta + along`; every other field is left
    /// untouched. This is the one sanctioned mutation of a built bundle,
    /// for tracking loops that re-evaluate many times per second; do not
    /// call it while other threads read the same instance.
    pub fn update_earth_rotation(&mut self, theta: f64) {
        self.eral = theta + self.along;
    }
}

/// Complete catalog → observed parameter bundle for a terrestrial site.
#[derive(Debug, Clone)]
pub struct TopoContext {
    /// Catalog → intermediate parameters
    pub epoch: EpochContext,
    /// Intermediate → observed parameters (`diurab` = 0 in this chain)
    pub site: SiteContext,
}

impl TopoContext {
    /// Build the full-chain bundle for a terrestrial observer.
    ///
    /// # Arguments
    /// * `tt1`, `tt2` — TT epoch as a two-part Julian date
    /// * `earth` — Barycentric Earth state (au, au/day)
    /// * `ehp` — Heliocentric Earth position (au)
    /// * `x`, `y`, `s` — CIP coordinates and CIO locator (radians)
    /// * `theta` — Earth rotation angle (radians)
    /// * `site` — Geodetic observing site
    /// * `xp`, `yp` — Polar motion offsets (radians)
    /// * `sp` — TIO locator (radians)
    /// * `refa`, `refb` — Refraction model coefficients (radians)
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tt1: f64,
        tt2: f64,
        earth: &StateVector,
        ehp: &Vector3<f64>,
        x: f64,
        y: f64,
        s: f64,
        theta: f64,
        site: &GeographicPosition,
        xp: f64,
        yp: f64,
        sp: f64,
        refa: f64,
        refb: f64,
    ) -> Self {
        let (eral, xpl, ypl, along) = solve_local_frame(theta, sp, xp, yp, site.longitude);

        let bpn = intermediate_frame_matrix(x, y, s);

        // Observer geocentric state: site rotation in the intermediate
        // frame of date, carried back into the GCRS
        let (pos, vel) = site.position_velocity(xp, yp, sp, theta);
        let observer = StateVector::new(bpn.transpose() * pos, bpn.transpose() * vel);

        let mut epoch = EpochContext::for_observer(tt1, tt2, &observer, earth, ehp);
        epoch.bpn = bpn;

        // The observer velocity above carries the site rotation, so the
        // separate diurnal term stays disabled in this chain
        let site_ctx = SiteContext {
            along,
            phi: site.latitude,
            sphi: site.latitude.sin(),
            cphi: site.latitude.cos(),
            xpl,
            ypl,
            eral,
            diurab: 0.0,
            refa,
            refb,
        };

        TopoContext {
            epoch,
            site: site_ctx,
        }
    }

    /// Re-aim at a new Earth rotation angle; see
    /// [`SiteContext::update_earth_rotation`].
    pub fn update_earth_rotation(&mut self, theta: f64) {
        self.site.update_earth_rotation(theta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ASEC2RAD;
    use crate::site::WGS84;
    use approx::assert_relative_eq;

    fn earth_state() -> (StateVector, Vector3<f64>) {
        // Circular 1 au orbit, speed ~ 0.0172 au/day
        let earth = StateVector::new(
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0172, 0.0),
        );
        let ehp = Vector3::new(1.0, 0.0, 0.0);
        (earth, ehp)
    }

    #[test]
    fn test_geocentric_context_basics() {
        let (earth, ehp) = earth_state();
        let ctx = EpochContext::geocentric(J2000, 0.25, &earth, &ehp);

        // A quarter day past J2000.0 in years
        assert_relative_eq!(ctx.pmt, 0.25 / JULIAN_YEAR_DAYS, epsilon = 1e-15);
        assert_relative_eq!(ctx.em, 1.0, epsilon = 1e-12);
        assert_relative_eq!(ctx.eh.x, 1.0, epsilon = 1e-12);
        // |v| ~ 1e-4 c
        assert!(ctx.v.norm() > 0.9e-4 && ctx.v.norm() < 1.1e-4);
        assert!(ctx.bm1 > 0.0 && ctx.bm1 <= 1.0);
        assert!(ctx.bm1 < 1.0, "moving observer must have bm1 < 1");
        // Frame rotation starts at identity
        assert_relative_eq!(ctx.bpn[(0, 0)], 1.0, epsilon = 1e-15);
        assert_relative_eq!(ctx.bpn[(0, 1)], 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_observer_offset_shifts_barycentric_position() {
        let (earth, ehp) = earth_state();
        let geo = EpochContext::geocentric(J2000, 0.0, &earth, &ehp);
        let offset = StateVector::new(Vector3::new(6.378e6, 0.0, 0.0), Vector3::zeros());
        let topo = EpochContext::for_observer(J2000, 0.0, &offset, &earth, &ehp);

        let shift_m = (topo.eb - geo.eb).norm() * AU_M;
        assert_relative_eq!(shift_m, 6.378e6, epsilon = 1.0);
        // Distance to the Sun also grows by one Earth radius here
        assert!(topo.em > geo.em);
    }

    #[test]
    fn test_with_intermediate_frame_is_orthogonal() {
        let (earth, ehp) = earth_state();
        let ctx = EpochContext::geocentric(J2000, 0.0, &earth, &ehp).with_intermediate_frame(
            300.0 * ASEC2RAD,
            -20.0 * ASEC2RAD,
            -0.005 * ASEC2RAD,
        );
        let product = ctx.bpn.transpose() * ctx.bpn;
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(product[(i, j)], expected, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_solve_local_frame_no_polar_motion() {
        // Without polar motion the local ERA is just theta + longitude
        let elong = 0.5f64;
        let theta = 2.0f64;
        let (eral, xpl, ypl, along) = solve_local_frame(theta, 0.0, 0.0, 0.0, elong);
        assert_relative_eq!(eral, wrap_to_pm_pi(theta + elong), epsilon = 1e-12);
        assert_relative_eq!(xpl, 0.0, epsilon = 1e-15);
        assert_relative_eq!(ypl, 0.0, epsilon = 1e-15);
        assert_relative_eq!(along, elong, epsilon = 1e-12);
    }

    #[test]
    fn test_solve_local_frame_small_polar_motion() {
        // Sub-arcsecond pole offsets must resolve to sub-arcsecond
        // local-meridian components, not disturb eral at leading order
        let xp = 0.3 * ASEC2RAD;
        let yp = -0.2 * ASEC2RAD;
        let (eral, xpl, ypl, _) = solve_local_frame(1.0, 0.0, xp, yp, 0.0);
        assert!(xpl.abs() < 1.0 * ASEC2RAD);
        assert!(ypl.abs() < 1.0 * ASEC2RAD);
        assert_relative_eq!(eral, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_observed_only_has_diurnal_aberration() {
        let site = WGS84.latlon(0.0, 0.0, 0.0);
        let ctx = SiteContext::observed_only(0.7, &site, 0.0, 0.0, 0.0, 0.0, 0.0);
        // Equatorial site: ~465 m/s over c ≈ 1.55e-6
        assert!(
            ctx.diurab > 1.5e-6 && ctx.diurab < 1.6e-6,
            "diurab = {}",
            ctx.diurab
        );
        assert_relative_eq!(ctx.phi, 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_topo_context_disables_diurnal_aberration() {
        let (earth, ehp) = earth_state();
        let site = WGS84.latlon(30.0, 45.0, 100.0);
        let ctx = TopoContext::new(
            J2000, 0.0, &earth, &ehp, 0.0, 0.0, 0.0, 0.7, &site, 0.0, 0.0, 0.0, 0.0, 0.0,
        );
        assert_eq!(ctx.site.diurab, 0.0);
        // But the epoch velocity now carries the site rotation on top of
        // the orbital velocity
        let orbital = 0.0172 * LIGHT_TIME_AU_DAYS;
        assert!((ctx.epoch.v.norm() - orbital).abs() > 1e-10);
    }

    #[test]
    fn test_update_earth_rotation_touches_only_eral() {
        let site = WGS84.latlon(-33.0, 18.0, 400.0);
        let mut ctx = SiteContext::observed_only(0.7, &site, 1e-6, -2e-6, 0.0, 2.8e-4, -3e-7);
        let before = ctx.clone();

        ctx.update_earth_rotation(1.9);

        assert_relative_eq!(ctx.eral, 1.9 + ctx.along, epsilon = 1e-15);
        assert_eq!(ctx.along, before.along);
        assert_eq!(ctx.xpl, before.xpl);
        assert_eq!(ctx.ypl, before.ypl);
        assert_eq!(ctx.diurab, before.diurab);
        assert_eq!(ctx.refa, before.refa);
        assert_eq!(ctx.refb, before.refb);
        assert_eq!(ctx.sphi, before.sphi);
    }

    #[test]
    fn test_update_earth_rotation_consistent_with_rebuild() {
        // Re-aiming must agree with building fresh at the new angle
        let site = WGS84.latlon(50.0, -5.0, 0.0);
        let mut updated = SiteContext::observed_only(0.3, &site, 0.0, 0.0, 0.0, 0.0, 0.0);
        updated.update_earth_rotation(1.1);
        let rebuilt = SiteContext::observed_only(1.1, &site, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert_relative_eq!(
            wrap_to_pm_pi(updated.eral - rebuilt.eral),
            0.0,
            epsilon = 1e-12
        );
    }
}
