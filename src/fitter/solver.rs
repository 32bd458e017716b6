//! Bounded nonlinear least-squares engine.
//!
//! Levenberg-Marquardt damped Gauss-Newton: at each iteration solve
//! `(J^T J + lambda I) delta = J^T r` for a step, clamp the proposal into the
//! bounds, and accept it only if it reduces the sum of squared residuals.
//! Accepted steps relax the damping, rejected ones tighten it and retry.
//! The Jacobian is taken by forward differences with a relative step, so the
//! model is treated as a black box.

use nalgebra::{DMatrix, DVector};

use crate::error::FitError;
use crate::fitter::common::Data;

const LAMBDA_MIN: f64 = 1e-12;
const LAMBDA_MAX: f64 = 1e12;

/// Iteration controls for the Levenberg-Marquardt loop.
#[derive(PartialEq, Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct SolverSettings {
    /// Iteration budget; exceeding it is a solver failure.
    pub max_iterations: usize,
    /// Relative tolerance on the sum-of-squares reduction and the step norm.
    pub tolerance: f64,
    /// Starting damping value.
    pub lambda_init: f64,
    /// Multiplier applied to lambda when a step is rejected.
    pub lambda_up: f64,
    /// Divisor applied to lambda when a step is accepted.
    pub lambda_down: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-8,
            lambda_init: 1e-3,
            lambda_up: 10.0,
            lambda_down: 10.0,
        }
    }
}

/// Converged state handed to the covariance estimator.
#[derive(Debug, Clone)]
pub struct Solution {
    pub params: Vec<f64>,
    pub jacobian: DMatrix<f64>,
    pub residuals: DVector<f64>,
    pub sum_squares: f64,
    pub iterations: usize,
}

/// Minimize `sum_i (y_i - f(x_i, p))^2` over `p`, clamped into `bounds`
/// when they are given.
///
/// Fails when the data cannot constrain the parameters (`m < k`), when the
/// bounds leave no feasible region, when the model goes non-finite, or when
/// the iteration budget runs out before convergence.
pub fn least_squares<F>(
    data: &Data,
    f: F,
    initial: &[f64],
    bounds: Option<(&[f64], &[f64])>,
    settings: &SolverSettings,
) -> Result<Solution, FitError>
where
    F: Fn(f64, &[f64]) -> f64,
{
    let m = data.len();
    let k = initial.len();
    if m < k {
        return Err(FitError::Solver(format!(
            "{m} data points cannot constrain {k} parameters"
        )));
    }
    if let Some((lower, upper)) = bounds {
        for i in 0..k {
            if lower[i] > upper[i] {
                return Err(FitError::BoundsInfeasible {
                    index: i,
                    lower: lower[i],
                    upper: upper[i],
                });
            }
        }
    }

    let mut params = initial.to_vec();
    clamp_into(&mut params, bounds);

    let mut residuals = residual_vector(data, &f, &params);
    let mut sum_squares = residuals.norm_squared();
    if !sum_squares.is_finite() {
        return Err(FitError::Solver(
            "model is not finite at the starting parameters".to_owned(),
        ));
    }

    let mut lambda = settings.lambda_init;
    for iteration in 1..=settings.max_iterations {
        let jacobian = jacobian(data, &f, &params);
        if jacobian.iter().any(|v| !v.is_finite()) {
            return Err(FitError::Solver(format!(
                "Jacobian is not finite at iteration {iteration}"
            )));
        }
        let jtj = jacobian.tr_mul(&jacobian);
        let jtr = jacobian.tr_mul(&residuals);
        let p_norm = DVector::from_column_slice(&params).norm();

        // Tighten the damping until a step is accepted or the step collapses.
        loop {
            let mut damped = jtj.clone();
            for i in 0..k {
                damped[(i, i)] += lambda;
            }
            let Some(cholesky) = damped.cholesky() else {
                lambda *= settings.lambda_up;
                if lambda > LAMBDA_MAX {
                    return Err(FitError::Solver(
                        "normal equations are singular".to_owned(),
                    ));
                }
                continue;
            };
            let delta = cholesky.solve(&jtr);

            if delta.norm() <= settings.tolerance * (p_norm + settings.tolerance) {
                log::debug!(
                    "converged on step norm after {iteration} iteration(s), ssq {sum_squares:.6e}"
                );
                return Ok(Solution {
                    params,
                    jacobian,
                    residuals,
                    sum_squares,
                    iterations: iteration,
                });
            }

            let mut trial: Vec<f64> = params
                .iter()
                .zip(delta.iter())
                .map(|(p, d)| p + d)
                .collect();
            clamp_into(&mut trial, bounds);
            let trial_residuals = residual_vector(data, &f, &trial);
            let trial_sum_squares = trial_residuals.norm_squared();

            if trial_sum_squares.is_finite() && trial_sum_squares < sum_squares {
                let reduction = sum_squares - trial_sum_squares;
                params = trial;
                residuals = trial_residuals;
                lambda = (lambda / settings.lambda_down).max(LAMBDA_MIN);
                log::debug!(
                    "iteration {iteration}: ssq {sum_squares:.6e} -> {trial_sum_squares:.6e}, lambda {lambda:.1e}"
                );
                let converged =
                    reduction <= settings.tolerance * sum_squares.max(f64::MIN_POSITIVE);
                sum_squares = trial_sum_squares;
                if converged {
                    let jacobian = self::jacobian(data, &f, &params);
                    return Ok(Solution {
                        params,
                        jacobian,
                        residuals,
                        sum_squares,
                        iterations: iteration,
                    });
                }
                break;
            }

            if lambda >= LAMBDA_MAX {
                // No damping produces a descent step. With bounds active this
                // is a constrained stationary point, so report the current
                // state as converged.
                log::debug!(
                    "converged on exhausted damping after {iteration} iteration(s), ssq {sum_squares:.6e}"
                );
                return Ok(Solution {
                    params,
                    jacobian,
                    residuals,
                    sum_squares,
                    iterations: iteration,
                });
            }
            lambda = (lambda * settings.lambda_up).min(LAMBDA_MAX);
        }
    }

    Err(FitError::Solver(format!(
        "no convergence within {} iterations",
        settings.max_iterations
    )))
}

fn residual_vector<F>(data: &Data, f: &F, params: &[f64]) -> DVector<f64>
where
    F: Fn(f64, &[f64]) -> f64,
{
    DVector::from_iterator(
        data.len(),
        data.x
            .iter()
            .zip(&data.y)
            .map(|(&x, &y)| y - f(x, params)),
    )
}

/// Forward-difference Jacobian of the model predictions, one column per
/// parameter, with a step relative to the parameter magnitude.
fn jacobian<F>(data: &Data, f: &F, params: &[f64]) -> DMatrix<f64>
where
    F: Fn(f64, &[f64]) -> f64,
{
    let m = data.len();
    let k = params.len();
    let base: Vec<f64> = data.x.iter().map(|&x| f(x, params)).collect();

    let mut jac = DMatrix::zeros(m, k);
    let mut work = params.to_vec();
    for j in 0..k {
        let saved = work[j];
        let step = f64::EPSILON.sqrt() * saved.abs().max(1.0);
        work[j] = saved + step;
        let actual = work[j] - saved;
        for i in 0..m {
            jac[(i, j)] = (f(data.x[i], &work) - base[i]) / actual;
        }
        work[j] = saved;
    }
    jac
}

fn clamp_into(params: &mut [f64], bounds: Option<(&[f64], &[f64])>) {
    if let Some((lower, upper)) = bounds {
        for (i, p) in params.iter_mut().enumerate() {
            *p = p.clamp(lower[i], upper[i]);
        }
    }
}
