//! Unit-area Gaussian peak term.

use std::f64::consts::PI;

/// FWHM = 2 * sqrt(2 * ln 2) * sigma.
pub const FWHM_PER_SIGMA: f64 = 2.354_820_045_030_949_3;

/// `area * (1 / sqrt(2 pi sigma^2)) * exp(-0.5 * (x - centroid)^2 / sigma^2)`
///
/// Normalized so the integral over all energies equals `area`.
pub fn peak(x: f64, area: f64, centroid: f64, sigma: f64) -> f64 {
    let norm = 1.0 / (2.0 * PI * sigma * sigma).sqrt();
    area * norm * (-0.5 * (x - centroid).powi(2) / (sigma * sigma)).exp()
}

pub fn fwhm(sigma: f64) -> f64 {
    FWHM_PER_SIGMA * sigma
}
