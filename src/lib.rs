//! # starpath
//!
//! Sub-arcsecond astrometric transformations between a star's catalog
//! (ICRS) position and what an observer actually sees: space motion and
//! parallax, gravitational light deflection, stellar aberration, Earth
//! orientation, and atmospheric refraction.
//!
//! The central idea is the *parameter bundle*: every frame- and
//! observer-dependent quantity for one instant is computed once
//! ([`astrom::EpochContext`], [`astrom::SiteContext`],
//! [`astrom::TopoContext`]) and then shared, read-only, across any number
//! of star transforms. The transforms themselves are pure functions:
//!
//! 1. catalog → intermediate frame ([`catalog::to_intermediate`]) and its
//!    fixed-point inverse ([`catalog::from_intermediate`]);
//! 2. intermediate frame → observed place ([`horizon::to_observed`]) and
//!    its algebraic inverse ([`horizon::from_observed`]).
//!
//! Time-scale conversion, the Earth-orientation series, and solar-system
//! ephemerides are consumed through the trait seams in [`providers`]; the
//! [`observe`] module chains everything into one-call paths.
//!
//! # Example
//!
//! ```ignore
//! use starpath::catalog::Star;
//! use starpath::observe::{catalog_to_observed, ObservingConditions};
//! use starpath::providers::{Epoch, SplitDate};
//! use starpath::site::WGS84;
//!
//! let epoch = Epoch::from_utc(&my_time_scales, SplitDate::new(utc1, utc2), dut1)?;
//! let site = WGS84.latlon(28.76, -17.88, 2326.0);
//! let star = Star::from_catalog(269.45, 4.69, -798.7, 10337.8, 545.4, -110.6);
//!
//! let (observed, eo) = catalog_to_observed(
//!     &star, &epoch, &orientation, &ephemerides, &site,
//!     (xp, yp), &ObservingConditions {
//!         pressure_hpa: 775.0, temperature_c: 5.2,
//!         humidity: 0.3, wavelength_um: 0.55,
//!     },
//! );
//! println!("az {} zd {}", observed.azimuth, observed.zenith_distance);
//! ```

pub mod astrom;
pub mod catalog;
pub mod constants;
pub mod errors;
pub mod frames;
pub mod horizon;
pub mod observe;
pub mod providers;
pub mod refraction;
pub mod relativity;
pub mod site;
pub mod sphere;

pub use astrom::{EpochContext, SiteContext, StateVector, TopoContext};
pub use catalog::Star;
pub use errors::{Error, Result};
pub use horizon::{ObservedKind, ObservedPlace};
pub use providers::{Epoch, SplitDate};
