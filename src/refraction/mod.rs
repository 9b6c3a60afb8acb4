//! Two-constant atmospheric refraction model
//!
//! Derives the A and B coefficients of the `dZ = A tan Z + B tan^3 Z`
//! refraction law from the ambient conditions at the observer, covering
//! both optical/IR and radio wavelengths. The development follows
//! Hohenkerk & Sinclair (NAO Technical Note 63, 1985), Stone (PASP 108,
//! 1051, 1996) for the optical refractivity, and Green, "Spherical
//! Astronomy" (1987) for the conversion to the two-constant form.
//!
//! The coefficients are good to a few hundredths of an arcsecond at
//! moderate zenith distances, degrading to the arcsecond level by Z = 80°.

/// Wavelength above which the radio refractivity model is used (µm)
const OPTICAL_RADIO_BOUNDARY_UM: f64 = 100.0;

/// Refraction coefficients `(refa, refb)` for the two-constant model.
///
/// # Arguments
/// * `pressure_hpa` — Pressure at the observer in hPa (millibars)
/// * `temperature_c` — Ambient temperature in degrees Celsius
/// * `relative_humidity` — Relative humidity in the range 0–1
/// * `wavelength_um` — Observing wavelength in micrometers
///
/// Out-of-range inputs are clamped to physically plausible bounds rather
/// than rejected; zero pressure yields zero coefficients.
pub fn refraction_constants(
    pressure_hpa: f64,
    temperature_c: f64,
    relative_humidity: f64,
    wavelength_um: f64,
) -> (f64, f64) {
    let t = temperature_c.clamp(-150.0, 200.0);
    let p = pressure_hpa.clamp(0.0, 10000.0);
    let r = relative_humidity.clamp(0.0, 1.0);
    let w = wavelength_um.clamp(0.1, 1e6);

    // Water-vapour partial pressure at the observer
    let pw = if p > 0.0 {
        let ps = 10f64.powf((0.7859 + 0.03477 * t) / (1.0 + 0.00412 * t))
            * (1.0 + p * (4.5e-6 + 6e-10 * t * t));
        r * ps / (1.0 - (1.0 - r) * ps / p)
    } else {
        0.0
    };

    // Refractive index minus 1 at the observer
    let tk = t + 273.15;
    let optical = w <= OPTICAL_RADIO_BOUNDARY_UM;
    let gamma = if optical {
        let wlsq = w * w;
        ((77.534_84e-6 + (4.391_08e-7 + 3.666e-9 / wlsq) / wlsq) * p - 11.2684e-6 * pw) / tk
    } else {
        (77.6890e-6 * p - (6.3938e-6 - 0.375463 / tk) * pw) / tk
    };

    // Stone's beta, with the empirical adjustment for the radio regime
    let mut beta = 4.4474e-6 * tk;
    if !optical {
        beta -= 0.0074 * pw * beta;
    }

    // Two-constant coefficients, after Green
    let refa = gamma * (1.0 - beta);
    let refb = -gamma * (beta - gamma / 2.0);
    (refa, refb)
}
