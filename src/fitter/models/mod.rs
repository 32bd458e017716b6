pub mod gaussian;
pub mod lorentzian;

/// Closed set of supported peak shapes.
#[derive(PartialEq, Eq, Debug, Clone, Copy, serde::Deserialize, serde::Serialize)]
pub enum PeakShape {
    Gaussian,
    Lorentzian,
}

/// A peak model bound to a shape and a peak count (1 or 2).
///
/// Parameter layout, shared by initial guesses, bounds and fit output:
/// `[bg_const, bg_slope, area_1, centroid_1, width_1, area_2, centroid_2, width_2]`
/// with the second peak's three slots present only for a two-peak model.
/// The model itself is stateless; `eval` works with any parameter slice of
/// the matching length.
#[derive(PartialEq, Eq, Debug, Clone, Copy, serde::Deserialize, serde::Serialize)]
pub struct PeakModel {
    pub shape: PeakShape,
    pub peaks: usize,
}

impl PeakModel {
    pub fn new(shape: PeakShape, peaks: usize) -> Self {
        Self { shape, peaks }
    }

    /// Expected parameter vector length: 3 per peak plus 2 for the background.
    pub fn param_len(&self) -> usize {
        3 * self.peaks + 2
    }

    /// Predicted count at energy `x`: linear background plus the peak terms.
    pub fn eval(&self, x: f64, params: &[f64]) -> f64 {
        let mut y = params[0] + params[1] * x;
        for peak in 0..self.peaks {
            let area = params[3 * peak + 2];
            let centroid = params[3 * peak + 3];
            let width = params[3 * peak + 4];
            y += match self.shape {
                PeakShape::Gaussian => gaussian::peak(x, area, centroid, width),
                PeakShape::Lorentzian => lorentzian::peak(x, area, centroid, width),
            };
        }
        y
    }

    /// Element-wise evaluation over an energy slice.
    pub fn eval_many(&self, x: &[f64], params: &[f64]) -> Vec<f64> {
        x.iter().map(|&xi| self.eval(xi, params)).collect()
    }

    /// Full width at half maximum for one peak's width parameter.
    pub fn fwhm(&self, width: f64) -> f64 {
        match self.shape {
            PeakShape::Gaussian => gaussian::fwhm(width),
            PeakShape::Lorentzian => lorentzian::fwhm(width),
        }
    }
}
