//! Physical and angular constants shared across the crate
//!
//! Values follow the IAU 2009/2012 resolutions (astronomical unit, speed of
//! light) and the IERS Conventions (2010) for Earth figure and rotation.

/// J2000.0 reference epoch as a TT Julian date
pub const J2000: f64 = 2451545.0;

/// Seconds per day
pub const DAY_S: f64 = 86400.0;

/// Days per Julian year
pub const JULIAN_YEAR_DAYS: f64 = 365.25;

/// Astronomical unit in meters (IAU 2012 exact value)
pub const AU_M: f64 = 149_597_870_700.0;

/// Astronomical unit in kilometers
pub const AU_KM: f64 = AU_M / 1000.0;

/// Speed of light in m/s (exact)
pub const C: f64 = 299_792_458.0;

/// Light travel time for one astronomical unit, in seconds
pub const LIGHT_TIME_AU_S: f64 = AU_M / C;

/// Light travel time for one astronomical unit, in days
pub const LIGHT_TIME_AU_DAYS: f64 = LIGHT_TIME_AU_S / DAY_S;

/// Light travel time for one astronomical unit, in Julian years
pub const LIGHT_TIME_AU_YEARS: f64 = LIGHT_TIME_AU_DAYS / JULIAN_YEAR_DAYS;

/// Schwarzschild radius of the Sun in au: 2 G M_sun / c^2
///
/// Sets the scale of gravitational light deflection; the value uses the
/// DE405 heliocentric gravitational constant.
pub const SUN_SCHWARZSCHILD_AU: f64 = 1.974_125_743_36e-8;

/// Arcseconds to radians
pub const ASEC2RAD: f64 = 4.848_136_811_095_359_935_899_141e-6;

/// Kilometers per second to astronomical units per Julian year
pub const KM_S_TO_AU_YEAR: f64 = 1000.0 * DAY_S * JULIAN_YEAR_DAYS / AU_M;

/// Ratio of Earth's rotation rate to the UT1 day: revolutions per UT1 day
pub const EARTH_ROTATION_RATIO: f64 = 1.002_737_811_911_354_48;

/// Earth rotation rate in radians per UT1 second
pub const EARTH_ANGVEL: f64 = EARTH_ROTATION_RATIO * core::f64::consts::TAU / DAY_S;
