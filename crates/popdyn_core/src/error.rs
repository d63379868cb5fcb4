use thiserror::Error;

/// Failures of the competition-model phase-space analysis.
///
/// The integrators never fail; they are total over floats and report
/// divergence through the values they return.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhaseSpaceError {
    #[error("parameter {name} must be finite and positive, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// `1 - α1·α2 = 0`: the isoclines are parallel and the interior fixed
    /// point formula divides by zero.
    #[error(
        "interaction coefficients are degenerate: alpha1 * alpha2 = {alpha1} * {alpha2} = 1, \
         so the interior fixed point is undefined"
    )]
    DegenerateInteraction { alpha1: f64, alpha2: f64 },

    #[error(
        "no competition regime matches K1 = {k1}, K2 = {k2}, alpha1 = {alpha1}, alpha2 = {alpha2}"
    )]
    UnclassifiedRegime {
        k1: f64,
        k2: f64,
        alpha1: f64,
        alpha2: f64,
    },

    #[error(
        "vector field grid of {cols} x {rows} nodes exceeds the limit of {limit}; \
         reduce K1, K2 or raise alpha1, alpha2"
    )]
    FieldTooLarge { cols: f64, rows: f64, limit: usize },

    #[error("Jacobian at ({n1}, {n2}) has non-finite entries; cannot linearize")]
    NonFiniteJacobian { n1: f64, n2: f64 },
}
