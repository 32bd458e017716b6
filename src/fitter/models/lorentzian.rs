//! Unit-area Lorentzian (Cauchy) peak term.

use std::f64::consts::PI;

/// `(area / pi) * (gamma / 2) / ((x - centroid)^2 + (gamma / 2)^2)`
///
/// `gamma` is the full width at half maximum; the integral over all
/// energies equals `area`.
pub fn peak(x: f64, area: f64, centroid: f64, gamma: f64) -> f64 {
    let half_gamma = 0.5 * gamma;
    (area / PI) * half_gamma / ((x - centroid).powi(2) + half_gamma * half_gamma)
}

/// The width parameter of a Lorentzian is already its FWHM.
pub fn fwhm(gamma: f64) -> f64 {
    gamma
}
