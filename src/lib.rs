//! Parametric photopeak fitting for gamma-ray spectra.
//!
//! Fits one or two peaks (Gaussian or Lorentzian) on a linear background to
//! a windowed slice of an energy/count histogram with a bounded
//! Levenberg-Marquardt solver, and reports parameter uncertainties from the
//! converged Jacobian.

pub mod error;
pub mod fitter;

pub use error::FitError;
pub use fitter::common::{Data, Value};
pub use fitter::models::{PeakModel, PeakShape};
pub use fitter::peak_fitter::{FitRequest, PeakFit, PeakParams, fit_gaussian, fit_lorentzian};
pub use fitter::solver::SolverSettings;
