//! Narrow interfaces to the external collaborators
//!
//! The pipeline consumes, but never reimplements, time-scale conversion,
//! the Earth-orientation series (bias-precession-nutation, locators, Earth
//! rotation angle), and solar-system ephemerides. Each seam is a small
//! trait; production callers back them with their chosen tables and series
//! while tests can substitute fixed models.

use nalgebra::{Matrix3, Vector3};

use crate::astrom::StateVector;
use crate::errors::Result;

/// A two-part quasi-Julian date.
///
/// Keeping the date split between two doubles preserves microsecond
/// resolution over historical spans; the parts may be apportioned any way
/// the producer likes (day + fraction is typical).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitDate {
    pub d1: f64,
    pub d2: f64,
}

impl SplitDate {
    pub fn new(d1: f64, d2: f64) -> Self {
        SplitDate { d1, d2 }
    }

    /// The combined Julian date (loses the split precision).
    pub fn value(&self) -> f64 {
        self.d1 + self.d2
    }
}

/// Outcome of a time-scale conversion.
///
/// A conversion either fails outright (unrepresentable date, surfaced as
/// [`crate::errors::Error::UnacceptableDate`]) or succeeds, possibly
/// flagged `dubious` for epochs outside the well-determined range of the
/// underlying tables — proceed, but treat the result with suspicion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Converted {
    pub date: SplitDate,
    pub dubious: bool,
}

/// Time-scale conversion seam.
pub trait TimeScales {
    /// UTC to Terrestrial Time.
    fn tt_from_utc(&self, utc: SplitDate) -> Result<Converted>;

    /// UTC to UT1, given UT1−UTC in seconds.
    fn ut1_from_utc(&self, utc: SplitDate, dut1: f64) -> Result<Converted>;
}

/// Earth-orientation seam: everything needed to orient the intermediate
/// frames at an epoch.
pub trait EarthOrientation {
    /// Classical bias-precession-nutation matrix (GCRS → true equator and
    /// equinox of date) at a TT epoch.
    fn bpn_matrix(&self, tt: SplitDate) -> Matrix3<f64>;

    /// Celestial Intermediate Pole coordinates, as unit-vector components
    /// in the GCRS. Defaults to reading the bottom row of the NPB matrix.
    fn cip_xy(&self, tt: SplitDate) -> (f64, f64) {
        let m = self.bpn_matrix(tt);
        (m[(2, 0)], m[(2, 1)])
    }

    /// CIO locator s (radians) for the given CIP coordinates.
    fn cio_locator(&self, tt: SplitDate, x: f64, y: f64) -> f64;

    /// Earth rotation angle (radians) at a UT1 epoch.
    fn earth_rotation_angle(&self, ut1: SplitDate) -> f64;

    /// TIO locator s′ (radians) at a TT epoch.
    fn tio_locator(&self, tt: SplitDate) -> f64;
}

/// Solar-system ephemeris seam.
///
/// Epochs are TDB; TT is accepted in its place throughout the convenience
/// layer, the difference being far below the pipeline's accuracy floor.
pub trait Ephemerides {
    /// Barycentric Earth state in au and au/day.
    fn earth_barycentric(&self, tdb: SplitDate) -> StateVector;

    /// Heliocentric Earth position in au.
    fn earth_heliocentric(&self, tdb: SplitDate) -> Vector3<f64>;
}

/// A validated observation instant: TT and UT1 both resolved from UTC.
///
/// Construction is the single place a bad date can stop the pipeline; once
/// an `Epoch` exists, every downstream transform is infallible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Epoch {
    /// Terrestrial Time as a two-part Julian date
    pub tt: SplitDate,
    /// UT1 as a two-part Julian date
    pub ut1: SplitDate,
    /// Set when either conversion flagged the year as dubious
    pub dubious: bool,
}

impl Epoch {
    /// Resolve a UTC instant into TT and UT1.
    ///
    /// # Arguments
    /// * `ts` — Time-scale conversion backend
    /// * `utc` — UTC as a two-part quasi-Julian date
    /// * `dut1` — UT1−UTC in seconds
    pub fn from_utc(ts: &impl TimeScales, utc: SplitDate, dut1: f64) -> Result<Epoch> {
        let tt = ts.tt_from_utc(utc)?;
        let ut1 = ts.ut1_from_utc(utc, dut1)?;
        Ok(Epoch {
            tt: tt.date,
            ut1: ut1.date,
            dubious: tt.dubious || ut1.dubious,
        })
    }

    /// Build directly from already-converted TT and UT1 dates.
    pub fn from_tt_ut1(tt: SplitDate, ut1: SplitDate) -> Epoch {
        Epoch {
            tt,
            ut1,
            dubious: false,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixed-model collaborators for exercising the pipeline in tests.

    use super::*;
    use crate::constants::{DAY_S, J2000, JULIAN_YEAR_DAYS};
    use crate::errors::Error;
    use std::f64::consts::TAU;

    /// Offsets and simple series standing in for real tables: TT−UTC fixed
    /// at 69.184 s, a circular 1 au Earth orbit, and the standard linear
    /// Earth-rotation-angle polynomial.
    pub struct FixedProviders;

    /// Start of the well-determined range used by the fixed tables (1972).
    const TABLE_START_JD: f64 = 2441317.5;

    /// Earliest representable date (Gregorian reform).
    const EARLIEST_JD: f64 = 2299160.5;

    impl TimeScales for FixedProviders {
        fn tt_from_utc(&self, utc: SplitDate) -> Result<Converted> {
            let jd = utc.value();
            if jd < EARLIEST_JD {
                return Err(Error::UnacceptableDate { jd });
            }
            Ok(Converted {
                date: SplitDate::new(utc.d1, utc.d2 + 69.184 / DAY_S),
                dubious: jd < TABLE_START_JD,
            })
        }

        fn ut1_from_utc(&self, utc: SplitDate, dut1: f64) -> Result<Converted> {
            let jd = utc.value();
            if jd < EARLIEST_JD {
                return Err(Error::UnacceptableDate { jd });
            }
            Ok(Converted {
                date: SplitDate::new(utc.d1, utc.d2 + dut1 / DAY_S),
                dubious: jd < TABLE_START_JD,
            })
        }
    }

    impl EarthOrientation for FixedProviders {
        fn bpn_matrix(&self, _tt: SplitDate) -> Matrix3<f64> {
            Matrix3::identity()
        }

        fn cio_locator(&self, _tt: SplitDate, _x: f64, _y: f64) -> f64 {
            0.0
        }

        fn earth_rotation_angle(&self, ut1: SplitDate) -> f64 {
            // IAU 2000 linear expression in the UT1 day fraction
            let t = (ut1.d1 - J2000) + ut1.d2;
            (TAU * (0.779_057_273_264_0 + 1.002_737_811_911_354_48 * t)).rem_euclid(TAU)
        }

        fn tio_locator(&self, _tt: SplitDate) -> f64 {
            0.0
        }
    }

    impl Ephemerides for FixedProviders {
        fn earth_barycentric(&self, tdb: SplitDate) -> StateVector {
            let n = TAU / JULIAN_YEAR_DAYS;
            let l = n * ((tdb.d1 - J2000) + tdb.d2);
            StateVector::new(
                Vector3::new(l.cos(), l.sin(), 0.0),
                Vector3::new(-n * l.sin(), n * l.cos(), 0.0),
            )
        }

        fn earth_heliocentric(&self, tdb: SplitDate) -> Vector3<f64> {
            self.earth_barycentric(tdb).position
        }
    }
}
