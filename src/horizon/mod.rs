//! Intermediate-frame ↔ observed horizon transforms
//!
//! The forward transform carries an intermediate-frame (CIRS) position to
//! what a terrestrial observer actually measures: local hour angle via the
//! Earth rotation angle, polar motion, first-order diurnal aberration (when
//! the bundle carries it), rotation to the horizon, and atmospheric
//! refraction. The inverse runs the same geometry backwards; refraction is
//! inverted algebraically by evaluating the two-constant model at the
//! observed zenith distance, which is accurate to the same order as the
//! forward model without iteration.
//!
//! Near-degenerate geometry is clamped, not rejected: directions at the
//! zenith or the pole pass through guarded `atan2` calls, and the
//! refraction trigonometry floors the horizontal and vertical components
//! before dividing.

use nalgebra::Vector3;

use crate::astrom::SiteContext;
use crate::sphere::{spherical, unit_vector, wrap_to_2pi};

/// Floor for cos(altitude) in the refraction geometry.
const CELMIN: f64 = 1e-6;

/// Floor for sin(altitude) in the refraction geometry.
const SELMIN: f64 = 0.05;

/// Which coordinate pair an observed position is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObservedKind {
    /// CIO-based right ascension and declination
    RightAscensionDeclination,
    /// Hour angle and declination
    HourAngleDeclination,
    /// Azimuth (north origin, east positive) and zenith distance
    #[default]
    AzimuthZenithDistance,
}

impl ObservedKind {
    /// Lenient single-letter parsing: `r`/`R` and `h`/`H` select the
    /// equatorial kinds; anything else means azimuth/zenith-distance.
    pub fn from_tag(tag: char) -> Self {
        match tag.to_ascii_lowercase() {
            'r' => ObservedKind::RightAscensionDeclination,
            'h' => ObservedKind::HourAngleDeclination,
            _ => ObservedKind::AzimuthZenithDistance,
        }
    }
}

/// An observed place: every coordinate pair a pointing system might want.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservedPlace {
    /// Azimuth in radians, north origin, east positive, in [0, 2π)
    pub azimuth: f64,
    /// Observed zenith distance in radians
    pub zenith_distance: f64,
    /// Observed hour angle in radians
    pub hour_angle: f64,
    /// Observed declination in radians
    pub declination: f64,
    /// Observed CIO-based right ascension in radians, in [0, 2π)
    pub right_ascension: f64,
}

/// Transform an intermediate-frame position to the observed place.
///
/// # Arguments
/// * `ri`, `di` — Intermediate-frame right ascension and declination
/// * `site` — Local-horizon parameter bundle
pub fn to_observed(ri: f64, di: f64, site: &SiteContext) -> ObservedPlace {
    // Intermediate RA,Dec to Cartesian -HA,Dec
    let v = unit_vector(ri - site.eral, di);

    // Polar motion, first order
    let xhd = v.x + site.xpl * v.z;
    let yhd = v.y - site.ypl * v.z;
    let zhd = v.z - site.xpl * v.x + site.ypl * v.y;

    // Diurnal aberration (zero in the full-chain bundle)
    let f = 1.0 - site.diurab * yhd;
    let xhdt = f * xhd;
    let yhdt = f * (yhd + site.diurab);
    let zhdt = f * zhd;

    // To Cartesian az/el, south origin east positive
    let xaet = site.sphi * xhdt - site.cphi * zhdt;
    let yaet = yhdt;
    let zaet = site.cphi * xhdt + site.sphi * zhdt;

    // Azimuth, north origin
    let azobs = if xaet != 0.0 || yaet != 0.0 {
        yaet.atan2(-xaet)
    } else {
        0.0
    };

    // Refraction: floor the geometry away from zenith and horizon
    let r = (xaet * xaet + yaet * yaet).sqrt().max(CELMIN);
    let z = zaet.max(SELMIN);
    let tz = r / z;
    let w = site.refb * tz * tz;
    let del = (site.refa + w) * tz / (1.0 + (site.refa + 3.0 * w) / (z * z));

    // Rotate the vector by del in the vertical plane
    let cosdel = 1.0 - del * del / 2.0;
    let fr = cosdel - del * z / r;
    let xaeo = xaet * fr;
    let yaeo = yaet * fr;
    let zaeo = cosdel * zaet + del * r;

    let zdobs = (xaeo * xaeo + yaeo * yaeo).sqrt().atan2(zaeo);

    // Back to -HA,Dec for the equatorial outputs
    let vo = Vector3::new(
        site.sphi * xaeo + site.cphi * zaeo,
        yaeo,
        -site.cphi * xaeo + site.sphi * zaeo,
    );
    let (hmobs, dcobs) = spherical(&vo);

    ObservedPlace {
        azimuth: wrap_to_2pi(azobs),
        zenith_distance: zdobs,
        hour_angle: -hmobs,
        declination: dcobs,
        right_ascension: wrap_to_2pi(site.eral + hmobs),
    }
}

/// Transform an observed coordinate pair back to the intermediate frame.
///
/// Accepts any of the three observed coordinate kinds; the refraction is
/// removed algebraically at the observed zenith distance.
///
/// # Arguments
/// * `kind` — Which pair `ob1`, `ob2` is
/// * `ob1`, `ob2` — The observed coordinates in radians
/// * `site` — Local-horizon parameter bundle
///
/// Returns `(ri, di)` with `ri` in [0, 2π).
pub fn from_observed(kind: ObservedKind, ob1: f64, ob2: f64, site: &SiteContext) -> (f64, f64) {
    // Standardize to Cartesian az/el, south origin east positive
    let (xaeo, yaeo, zaeo) = match kind {
        ObservedKind::AzimuthZenithDistance => {
            let ce = ob2.sin();
            (-ob1.cos() * ce, ob1.sin() * ce, ob2.cos())
        }
        ObservedKind::RightAscensionDeclination | ObservedKind::HourAngleDeclination => {
            let ha = if kind == ObservedKind::RightAscensionDeclination {
                site.eral - ob1
            } else {
                ob1
            };
            let v = unit_vector(-ha, ob2);
            (
                site.sphi * v.x - site.cphi * v.z,
                v.y,
                site.cphi * v.x + site.sphi * v.z,
            )
        }
    };

    // Azimuth, south origin
    let az = if xaeo != 0.0 || yaeo != 0.0 {
        yaeo.atan2(xaeo)
    } else {
        0.0
    };

    // Observed zenith distance
    let sz = (xaeo * xaeo + yaeo * yaeo).sqrt();
    let zdo = sz.atan2(zaeo);

    // Remove refraction: two-constant model at the observed zenith distance
    let tz = sz / zaeo.max(SELMIN);
    let dref = (site.refa + site.refb * tz * tz) * tz;
    let zdt = zdo + dref;

    // Rebuild the unrefracted az/el vector
    let ce = zdt.sin();
    let xaet = az.cos() * ce;
    let yaet = az.sin() * ce;
    let zaet = zdt.cos();

    // To Cartesian -HA,Dec
    let xmhda = site.sphi * xaet + site.cphi * zaet;
    let ymhda = yaet;
    let zmhda = -site.cphi * xaet + site.sphi * zaet;

    // Diurnal aberration, inverted to first order
    let f = 1.0 + site.diurab * ymhda;
    let xhd = f * xmhda;
    let yhd = f * (ymhda - site.diurab);
    let zhd = f * zmhda;

    // Polar motion, full small rotation
    let (sx, cx) = site.xpl.sin_cos();
    let (sy, cy) = site.ypl.sin_cos();
    let v = Vector3::new(
        cx * xhd + sx * sy * yhd - sx * cy * zhd,
        cy * yhd + sy * zhd,
        sx * xhd - cx * sy * yhd + cx * cy * zhd,
    );

    let (hma, di) = spherical(&v);
    (wrap_to_2pi(site.eral + hma), di)
}
