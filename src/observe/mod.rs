//! One-call observation pipeline over the provider seams
//!
//! Builds parameter bundles for a validated [`Epoch`] and chains the
//! catalog ↔ intermediate ↔ observed transforms, so a caller with
//! providers in hand can go from a catalog entry to a pointing (or back)
//! in a single call. Paths that involve the intermediate frame also return
//! the equation of the origins, for callers that want equinox-based
//! right ascension (`wrap_to_2pi(ri - eo)`).
//!
//! Everything here is a thin composition of the bundle builders and
//! transforms; after the `Epoch` is constructed nothing can fail.

use crate::astrom::{EpochContext, SiteContext, TopoContext};
use crate::catalog::{self, Star};
use crate::frames::equation_of_origins;
use crate::horizon::{self, ObservedKind, ObservedPlace};
use crate::providers::{EarthOrientation, Ephemerides, Epoch, SplitDate};
use crate::refraction::refraction_constants;
use crate::site::GeographicPosition;

/// Ambient conditions at the observer, for the refraction model.
#[derive(Debug, Clone, Copy)]
pub struct ObservingConditions {
    /// Pressure at the observer in hPa
    pub pressure_hpa: f64,
    /// Ambient temperature in degrees Celsius
    pub temperature_c: f64,
    /// Relative humidity, 0–1
    pub humidity: f64,
    /// Observing wavelength in micrometers
    pub wavelength_um: f64,
}

impl ObservingConditions {
    /// The two-constant refraction coefficients for these conditions.
    pub fn refraction_constants(&self) -> (f64, f64) {
        refraction_constants(
            self.pressure_hpa,
            self.temperature_c,
            self.humidity,
            self.wavelength_um,
        )
    }

    /// In-vacuum sentinel: no refraction applied.
    pub fn vacuum() -> Self {
        ObservingConditions {
            pressure_hpa: 0.0,
            temperature_c: 0.0,
            humidity: 0.0,
            wavelength_um: 0.55,
        }
    }
}

/// Geocentric bundle with no frame rotation (GCRS output).
pub fn geocentric_context(epoch: &Epoch, eph: &impl Ephemerides) -> EpochContext {
    let earth = eph.earth_barycentric(epoch.tt);
    let ehp = eph.earth_heliocentric(epoch.tt);
    EpochContext::geocentric(epoch.tt.d1, epoch.tt.d2, &earth, &ehp)
}

/// Geocentric bundle oriented to the intermediate frame, plus the equation
/// of the origins.
pub fn intermediate_context(
    epoch: &Epoch,
    orient: &impl EarthOrientation,
    eph: &impl Ephemerides,
) -> (EpochContext, f64) {
    let rnpb = orient.bpn_matrix(epoch.tt);
    let (x, y) = orient.cip_xy(epoch.tt);
    let s = orient.cio_locator(epoch.tt, x, y);

    let ctx = geocentric_context(epoch, eph).with_intermediate_frame(x, y, s);
    (ctx, equation_of_origins(&rnpb, s))
}

/// Full-chain topocentric bundle with explicit refraction coefficients,
/// plus the equation of the origins.
///
/// # Arguments
/// * `site` — Geodetic observing site
/// * `pole` — Polar motion `(xp, yp)` in radians
/// * `refa`, `refb` — Two-constant refraction coefficients (radians)
pub fn topocentric_context_with_refraction(
    epoch: &Epoch,
    orient: &impl EarthOrientation,
    eph: &impl Ephemerides,
    site: &GeographicPosition,
    pole: (f64, f64),
    refa: f64,
    refb: f64,
) -> (TopoContext, f64) {
    let earth = eph.earth_barycentric(epoch.tt);
    let ehp = eph.earth_heliocentric(epoch.tt);

    let rnpb = orient.bpn_matrix(epoch.tt);
    let (x, y) = orient.cip_xy(epoch.tt);
    let s = orient.cio_locator(epoch.tt, x, y);
    let theta = orient.earth_rotation_angle(epoch.ut1);
    let sp = orient.tio_locator(epoch.tt);

    let ctx = TopoContext::new(
        epoch.tt.d1,
        epoch.tt.d2,
        &earth,
        &ehp,
        x,
        y,
        s,
        theta,
        site,
        pole.0,
        pole.1,
        sp,
        refa,
        refb,
    );
    (ctx, equation_of_origins(&rnpb, s))
}

/// Full-chain topocentric bundle for given ambient conditions.
pub fn topocentric_context(
    epoch: &Epoch,
    orient: &impl EarthOrientation,
    eph: &impl Ephemerides,
    site: &GeographicPosition,
    pole: (f64, f64),
    conditions: &ObservingConditions,
) -> (TopoContext, f64) {
    let (refa, refb) = conditions.refraction_constants();
    topocentric_context_with_refraction(epoch, orient, eph, site, pole, refa, refb)
}

/// CIRS-only observed bundle (diurnal aberration populated).
pub fn observed_context(
    epoch: &Epoch,
    orient: &impl EarthOrientation,
    site: &GeographicPosition,
    pole: (f64, f64),
    conditions: &ObservingConditions,
) -> SiteContext {
    let theta = orient.earth_rotation_angle(epoch.ut1);
    let sp = orient.tio_locator(epoch.tt);
    let (refa, refb) = conditions.refraction_constants();
    SiteContext::observed_only(theta, site, pole.0, pole.1, sp, refa, refb)
}

/// Catalog star to intermediate-frame `(ri, di)`, plus the equation of the
/// origins.
pub fn catalog_to_intermediate(
    star: &Star,
    epoch: &Epoch,
    orient: &impl EarthOrientation,
    eph: &impl Ephemerides,
) -> (f64, f64, f64) {
    let (ctx, eo) = intermediate_context(epoch, orient, eph);
    let (ri, di) = catalog::to_intermediate(star, &ctx);
    (ri, di, eo)
}

/// Intermediate-frame position back to astrometric ICRS `(rc, dc)`, plus
/// the equation of the origins.
pub fn intermediate_to_catalog(
    ri: f64,
    di: f64,
    epoch: &Epoch,
    orient: &impl EarthOrientation,
    eph: &impl Ephemerides,
) -> (f64, f64, f64) {
    let (ctx, eo) = intermediate_context(epoch, orient, eph);
    let (rc, dc) = catalog::from_intermediate(ri, di, &ctx);
    (rc, dc, eo)
}

/// Catalog star straight through to the observed place, plus the equation
/// of the origins.
#[allow(clippy::too_many_arguments)]
pub fn catalog_to_observed(
    star: &Star,
    epoch: &Epoch,
    orient: &impl EarthOrientation,
    eph: &impl Ephemerides,
    site: &GeographicPosition,
    pole: (f64, f64),
    conditions: &ObservingConditions,
) -> (ObservedPlace, f64) {
    let (ctx, eo) = topocentric_context(epoch, orient, eph, site, pole, conditions);
    let (ri, di) = catalog::to_intermediate(star, &ctx.epoch);
    (horizon::to_observed(ri, di, &ctx.site), eo)
}

/// Observed coordinates straight back to astrometric ICRS `(rc, dc)`.
#[allow(clippy::too_many_arguments)]
pub fn observed_to_catalog(
    kind: ObservedKind,
    ob1: f64,
    ob2: f64,
    epoch: &Epoch,
    orient: &impl EarthOrientation,
    eph: &impl Ephemerides,
    site: &GeographicPosition,
    pole: (f64, f64),
    conditions: &ObservingConditions,
) -> (f64, f64) {
    let (ctx, _) = topocentric_context(epoch, orient, eph, site, pole, conditions);
    let (ri, di) = horizon::from_observed(kind, ob1, ob2, &ctx.site);
    catalog::from_intermediate(ri, di, &ctx.epoch)
}

/// Intermediate-frame position to the observed place through the
/// CIRS-only chain.
pub fn intermediate_to_observed(
    ri: f64,
    di: f64,
    epoch: &Epoch,
    orient: &impl EarthOrientation,
    site: &GeographicPosition,
    pole: (f64, f64),
    conditions: &ObservingConditions,
) -> ObservedPlace {
    let ctx = observed_context(epoch, orient, site, pole, conditions);
    horizon::to_observed(ri, di, &ctx)
}

/// Observed coordinates back to the intermediate frame through the
/// CIRS-only chain.
#[allow(clippy::too_many_arguments)]
pub fn observed_to_intermediate(
    kind: ObservedKind,
    ob1: f64,
    ob2: f64,
    epoch: &Epoch,
    orient: &impl EarthOrientation,
    site: &GeographicPosition,
    pole: (f64, f64),
    conditions: &ObservingConditions,
) -> (f64, f64) {
    let ctx = observed_context(epoch, orient, site, pole, conditions);
    horizon::from_observed(kind, ob1, ob2, &ctx)
}

/// Re-aim a site bundle at a new UT1 instant.
///
/// The one sanctioned in-place update: only the local Earth rotation angle
/// changes, making this cheap enough for tracking loops.
pub fn update_earth_rotation_from_ut1(
    ctx: &mut SiteContext,
    ut1: SplitDate,
    orient: &impl EarthOrientation,
) {
    ctx.update_earth_rotation(orient.earth_rotation_angle(ut1));
}
