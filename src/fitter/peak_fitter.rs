//! Windowed photopeak fits: validation, data selection and orchestration.

use crate::error::FitError;
use crate::fitter::common::{Data, Value};
use crate::fitter::models::{PeakModel, PeakShape, gaussian};
use crate::fitter::solver::{self, SolverSettings};
use crate::fitter::statistics;

/// Optional fit inputs with their defaults: one peak, no bounds.
///
/// The parameter vector, and both bound vectors when present, follow the
/// layout `[bg_const, bg_slope, area, centroid, width, ...]` with three
/// slots per peak.
#[derive(PartialEq, Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct FitRequest {
    pub peaks: usize,
    pub lower_bounds: Option<Vec<f64>>,
    pub upper_bounds: Option<Vec<f64>>,
    pub solver: SolverSettings,
}

impl Default for FitRequest {
    fn default() -> Self {
        Self {
            peaks: 1,
            lower_bounds: None,
            upper_bounds: None,
            solver: SolverSettings::default(),
        }
    }
}

impl FitRequest {
    pub fn with_peaks(peaks: usize) -> Self {
        Self {
            peaks,
            ..Self::default()
        }
    }

    pub fn with_bounds(peaks: usize, lower: Vec<f64>, upper: Vec<f64>) -> Self {
        Self {
            peaks,
            lower_bounds: Some(lower),
            upper_bounds: Some(upper),
            ..Self::default()
        }
    }
}

/// One fitted peak summarized as physical quantities.
#[derive(PartialEq, Default, Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct PeakParams {
    pub area: Value,
    pub centroid: Value,
    pub width: Value,
    pub fwhm: Value,
}

/// A converged fit: optimized parameters, their standard errors, and the
/// model they belong to. The model is stateless, so `predict` works with
/// any energy, inside or outside the fit window.
#[derive(PartialEq, Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct PeakFit {
    pub params: Vec<f64>,
    pub uncertainties: Vec<f64>,
    pub model: PeakModel,
    pub sum_squares: f64,
    pub iterations: usize,
}

impl PeakFit {
    /// Predicted count at energy `x` using the fitted parameters.
    pub fn predict(&self, x: f64) -> f64 {
        self.model.eval(x, &self.params)
    }

    /// Fitted background constant and slope.
    pub fn background(&self) -> (Value, Value) {
        (
            Value::new(self.params[0], self.uncertainties[0]),
            Value::new(self.params[1], self.uncertainties[1]),
        )
    }

    /// Per-peak area, centroid, width and FWHM.
    pub fn peaks(&self) -> Vec<PeakParams> {
        (0..self.model.peaks)
            .map(|peak| {
                let base = 3 * peak + 2;
                let width = Value::new(self.params[base + 2], self.uncertainties[base + 2]);
                let fwhm = match self.model.shape {
                    PeakShape::Gaussian => Value::new(
                        gaussian::fwhm(width.value),
                        gaussian::FWHM_PER_SIGMA * width.uncertainty,
                    ),
                    PeakShape::Lorentzian => width.clone(),
                };
                PeakParams {
                    area: Value::new(self.params[base], self.uncertainties[base]),
                    centroid: Value::new(self.params[base + 1], self.uncertainties[base + 1]),
                    width,
                    fwhm,
                }
            })
            .collect()
    }

    /// Evaluate the fitted curve on a uniform grid, for plotting by the caller.
    pub fn fit_line_points(&self, xmin: f64, xmax: f64, points: usize) -> Vec<[f64; 2]> {
        let step = (xmax - xmin) / points as f64;
        (0..=points)
            .map(|i| {
                let x = xmin + step * i as f64;
                [x, self.predict(x)]
            })
            .collect()
    }
}

/// Fit Gaussian peaks on a linear background to the rows of `data` whose
/// energy lies strictly inside `(xlow, xhigh)`.
pub fn fit_gaussian(
    data: &[[f64; 2]],
    xlow: f64,
    xhigh: f64,
    initial: &[f64],
    request: &FitRequest,
) -> Result<PeakFit, FitError> {
    fit(PeakShape::Gaussian, data, xlow, xhigh, initial, request)
}

/// Fit Lorentzian peaks on a linear background to the rows of `data` whose
/// energy lies strictly inside `(xlow, xhigh)`.
pub fn fit_lorentzian(
    data: &[[f64; 2]],
    xlow: f64,
    xhigh: f64,
    initial: &[f64],
    request: &FitRequest,
) -> Result<PeakFit, FitError> {
    fit(PeakShape::Lorentzian, data, xlow, xhigh, initial, request)
}

/// Shape-generic entry point behind `fit_gaussian` / `fit_lorentzian`.
pub fn fit(
    shape: PeakShape,
    data: &[[f64; 2]],
    xlow: f64,
    xhigh: f64,
    initial: &[f64],
    request: &FitRequest,
) -> Result<PeakFit, FitError> {
    validate(initial, request)?;

    let model = PeakModel::new(shape, request.peaks);
    let windowed = Data::windowed(data, xlow, xhigh);
    log::info!(
        "fitting {shape:?} model with {} peak(s) to {} points in ({xlow}, {xhigh})",
        request.peaks,
        windowed.len()
    );

    let bounds = match (&request.lower_bounds, &request.upper_bounds) {
        (Some(lower), Some(upper)) => Some((lower.as_slice(), upper.as_slice())),
        _ => None,
    };
    let solution = solver::least_squares(
        &windowed,
        |x, p| model.eval(x, p),
        initial,
        bounds,
        &request.solver,
    )?;
    let uncertainties = statistics::standard_errors(&solution.jacobian, &solution.residuals)?;

    log::info!(
        "fit converged after {} iteration(s), ssq {:.6e}",
        solution.iterations,
        solution.sum_squares
    );
    Ok(PeakFit {
        params: solution.params,
        uncertainties,
        model,
        sum_squares: solution.sum_squares,
        iterations: solution.iterations,
    })
}

/// Structural preconditions, checked before any numerical work.
///
/// Check order is parameter length, then bounds pairing, then the peak-count
/// ceiling, so the first violated condition is the one reported.
fn validate(initial: &[f64], request: &FitRequest) -> Result<(), FitError> {
    let expected = 3 * request.peaks + 2;
    if initial.len() != expected {
        return Err(FitError::Shape {
            actual: initial.len(),
            expected,
        });
    }
    match (&request.lower_bounds, &request.upper_bounds) {
        (Some(_), None) | (None, Some(_)) => return Err(FitError::BoundsMismatch),
        _ => {}
    }
    for bounds in [&request.lower_bounds, &request.upper_bounds] {
        if let Some(bounds) = bounds {
            if bounds.len() != expected {
                return Err(FitError::Shape {
                    actual: bounds.len(),
                    expected,
                });
            }
        }
    }
    if request.peaks > 2 {
        return Err(FitError::UnsupportedPeakCount {
            peaks: request.peaks,
        });
    }
    Ok(())
}
