//! Standard errors from the converged solver state.

use nalgebra::{DMatrix, DVector};

use crate::error::FitError;

/// Per-parameter standard errors from the final Jacobian and residuals.
///
/// Uses the residual variance estimate `s^2 = r^T r / max(m - k, 1)` and the
/// approximate covariance `C = s^2 (J^T J)^-1`, returning the square roots of
/// the diagonal in parameter order. Requires `m > k`; a singular `J^T J` is
/// reported rather than propagated as NaN.
pub fn standard_errors(
    jacobian: &DMatrix<f64>,
    residuals: &DVector<f64>,
) -> Result<Vec<f64>, FitError> {
    let m = jacobian.nrows();
    let k = jacobian.ncols();
    if m <= k {
        return Err(FitError::InsufficientData {
            points: m,
            params: k,
        });
    }

    let dof = (m - k).max(1) as f64;
    let variance = residuals.norm_squared() / dof;

    let jtj = jacobian.tr_mul(jacobian);
    let covariance = jtj
        .try_inverse()
        .ok_or(FitError::SingularCovariance)?
        * variance;

    // Diagonal entries can dip just below zero for a near-singular system.
    Ok((0..k).map(|i| covariance[(i, i)].max(0.0).sqrt()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn zero_residuals_give_zero_errors() {
        let jacobian = DMatrix::from_fn(6, 2, |i, j| if j == 0 { 1.0 } else { i as f64 });
        let residuals = DVector::zeros(6);
        let errors = standard_errors(&jacobian, &residuals).unwrap();
        assert_eq!(errors.len(), 2);
        for e in errors {
            assert_abs_diff_eq!(e, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn errors_scale_with_residual_size() {
        let jacobian = DMatrix::from_fn(8, 2, |i, j| if j == 0 { 1.0 } else { i as f64 });
        let small = DVector::from_element(8, 0.1);
        let large = DVector::from_element(8, 1.0);
        let errors_small = standard_errors(&jacobian, &small).unwrap();
        let errors_large = standard_errors(&jacobian, &large).unwrap();
        for (s, l) in errors_small.iter().zip(&errors_large) {
            assert_abs_diff_eq!(l / s, 10.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn ordinary_mean_error_matches_closed_form() {
        // Fitting a constant to m points: stderr = s / sqrt(m).
        let m = 5;
        let jacobian = DMatrix::from_element(m, 1, 1.0);
        let residuals = DVector::from_vec(vec![1.0, -1.0, 1.0, -1.0, 0.0]);
        let errors = standard_errors(&jacobian, &residuals).unwrap();
        let s2 = 4.0 / (m - 1) as f64;
        assert_abs_diff_eq!(errors[0], (s2 / m as f64).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn too_few_points_is_insufficient_data() {
        let jacobian = DMatrix::from_element(2, 2, 1.0);
        let residuals = DVector::zeros(2);
        let err = standard_errors(&jacobian, &residuals).unwrap_err();
        assert_eq!(
            err,
            FitError::InsufficientData {
                points: 2,
                params: 2
            }
        );
    }

    #[test]
    fn singular_normal_matrix_is_reported() {
        let jacobian = DMatrix::zeros(4, 2);
        let residuals = DVector::zeros(4);
        let err = standard_errors(&jacobian, &residuals).unwrap_err();
        assert_eq!(err, FitError::SingularCovariance);
    }
}
