//! Geodetic observing sites and their geocentric state
//!
//! Represents an observer at a geographic location and computes the site's
//! position and velocity in the terrestrial/celestial intermediate frames,
//! including polar motion and Earth rotation. The transformation chain is:
//!
//! ```text
//! Geodetic (lon/lat/height) → ITRS xyz → polar motion → spin by ERA → CIRS
//! ```

use nalgebra::Vector3;

use crate::constants::EARTH_ANGVEL;
use crate::frames::polar_motion_matrix;

/// An Earth ellipsoid model used for geodetic-to-geocentric conversion.
#[derive(Debug, Clone)]
pub struct ReferenceEllipsoid {
    /// Name of the ellipsoid model
    pub name: &'static str,
    /// Equatorial radius in meters
    pub radius_m: f64,
    /// Inverse flattening (a / (a - b))
    pub inverse_flattening: f64,
    /// (1 - f)^2, precomputed
    one_minus_flattening_squared: f64,
}

impl ReferenceEllipsoid {
    /// Create a new ellipsoid model.
    pub const fn new(name: &'static str, radius_m: f64, inverse_flattening: f64) -> Self {
        let f = 1.0 / inverse_flattening;
        let omf = 1.0 - f;
        ReferenceEllipsoid {
            name,
            radius_m,
            inverse_flattening,
            one_minus_flattening_squared: omf * omf,
        }
    }

    /// Create a geographic position on this ellipsoid.
    ///
    /// # Arguments
    /// * `latitude_degrees` — Geodetic latitude in degrees (positive north)
    /// * `longitude_degrees` — Geodetic longitude in degrees (positive east)
    /// * `height_m` — Height above the ellipsoid in meters
    pub fn latlon(
        &self,
        latitude_degrees: f64,
        longitude_degrees: f64,
        height_m: f64,
    ) -> GeographicPosition {
        self.site(
            longitude_degrees.to_radians(),
            latitude_degrees.to_radians(),
            height_m,
        )
    }

    /// Create a geographic position from radian coordinates.
    ///
    /// # Arguments
    /// * `longitude` — Geodetic longitude in radians (positive east)
    /// * `latitude` — Geodetic latitude in radians (positive north)
    /// * `height_m` — Height above the ellipsoid in meters
    pub fn site(&self, longitude: f64, latitude: f64, height_m: f64) -> GeographicPosition {
        let sphi = latitude.sin();
        let cphi = latitude.cos();

        // Radius of curvature in the prime vertical
        let d = cphi * cphi + sphi * sphi * self.one_minus_flattening_squared;
        let ac = self.radius_m / d.sqrt();
        let als = self.one_minus_flattening_squared * ac;

        // ITRS position in meters
        let r = (ac + height_m) * cphi;
        let xyz = Vector3::new(
            r * longitude.cos(),
            r * longitude.sin(),
            (als + height_m) * sphi,
        );

        GeographicPosition {
            longitude,
            latitude,
            height_m,
            itrs_xyz_m: xyz,
        }
    }
}

/// WGS84 ellipsoid (GPS standard)
pub const WGS84: ReferenceEllipsoid = ReferenceEllipsoid::new("WGS84", 6_378_137.0, 298.257_223_563);

/// GRS80 ellipsoid
pub const GRS80: ReferenceEllipsoid = ReferenceEllipsoid::new("GRS80", 6_378_137.0, 298.257_222_101);

/// A geographic observing site on Earth's surface.
///
/// Holds the geodetic coordinates and the precomputed ITRS position vector.
#[derive(Debug, Clone)]
pub struct GeographicPosition {
    /// Geodetic longitude in radians, positive east
    pub longitude: f64,
    /// Geodetic latitude in radians, positive north
    pub latitude: f64,
    /// Height above the ellipsoid in meters
    pub height_m: f64,
    /// ITRS position in meters
    pub itrs_xyz_m: Vector3<f64>,
}

impl GeographicPosition {
    /// Position and velocity of the rotating site in the celestial
    /// intermediate frame of date.
    ///
    /// Applies polar motion to the ITRS position and spins the result by
    /// the Earth rotation angle; the velocity is the site's instantaneous
    /// rotational speed about the intermediate pole.
    ///
    /// # Arguments
    /// * `xp`, `yp` — Polar motion offsets in radians
    /// * `sp` — TIO locator in radians
    /// * `theta` — Earth rotation angle in radians
    ///
    /// Returns `(position_m, velocity_m_per_s)`.
    pub fn position_velocity(
        &self,
        xp: f64,
        yp: f64,
        sp: f64,
        theta: f64,
    ) -> (Vector3<f64>, Vector3<f64>) {
        // ITRS to the terrestrial intermediate frame
        let rpm = polar_motion_matrix(xp, yp, sp);
        let tio = rpm.transpose() * self.itrs_xyz_m;

        let (s, c) = theta.sin_cos();
        let position = Vector3::new(c * tio.x - s * tio.y, s * tio.x + c * tio.y, tio.z);
        let velocity = Vector3::new(
            EARTH_ANGVEL * (-s * tio.x - c * tio.y),
            EARTH_ANGVEL * (c * tio.x - s * tio.y),
            0.0,
        );
        (position, velocity)
    }
}

impl std::fmt::Display for GeographicPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lat_d = self.latitude.to_degrees();
        let lon_d = self.longitude.to_degrees();
        let ns = if lat_d >= 0.0 { "N" } else { "S" };
        let ew = if lon_d >= 0.0 { "E" } else { "W" };
        write!(
            f,
            "{:.4}° {}, {:.4}° {}, {:.1} m",
            lat_d.abs(),
            ns,
            lon_d.abs(),
            ew,
            self.height_m
        )
    }
}
