use thiserror::Error;

/// Everything that can go wrong during a photopeak fit.
///
/// Validation errors (`Shape`, `BoundsMismatch`, `UnsupportedPeakCount`) are
/// raised before any numerical work, in that order, so the first violated
/// precondition is the one reported. Solver and covariance errors can only
/// occur after validation and windowing have passed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// Parameter vector length does not match `3 * peaks + 2`.
    #[error("parameter vector has length {actual}, expected 3 * peaks + 2 = {expected}")]
    Shape { actual: usize, expected: usize },

    /// Exactly one of the lower/upper bound vectors was supplied.
    #[error("lower and upper bounds must be supplied together or not at all")]
    BoundsMismatch,

    /// More simultaneous peaks requested than the model supports.
    #[error("{peaks} peaks requested, at most 2 are supported")]
    UnsupportedPeakCount { peaks: usize },

    /// A bound pair with `lower > upper` leaves no feasible region.
    #[error("infeasible bounds at parameter {index}: lower {lower} > upper {upper}")]
    BoundsInfeasible {
        index: usize,
        lower: f64,
        upper: f64,
    },

    /// The solver could not produce a converged parameter vector.
    #[error("solver failed: {0}")]
    Solver(String),

    /// `J^T J` at the solution is singular, so the covariance is undefined.
    #[error("covariance matrix is singular, standard errors are undefined")]
    SingularCovariance,

    /// Not enough data points for a standard-error estimate.
    #[error("{points} data points with {params} parameters leaves no degrees of freedom")]
    InsufficientData { points: usize, params: usize },
}
