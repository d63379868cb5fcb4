use crate::{
    autodiff::{jacobian, Dual},
    error::PhaseSpaceError,
    traits::DynamicalSystem,
};
use nalgebra::{Complex, DMatrix};
use serde::{Deserialize, Serialize};

/// Real parts within this distance of zero are treated as zero.
const NEUTRAL_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexNumber {
    pub re: f64,
    pub im: f64,
}

impl From<Complex<f64>> for ComplexNumber {
    fn from(value: Complex<f64>) -> Self {
        Self {
            re: value.re,
            im: value.im,
        }
    }
}

/// Local character of a fixed point, read off the Jacobian spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stability {
    StableNode,
    StableFocus,
    UnstableNode,
    UnstableFocus,
    Saddle,
    Center,
    /// At least one eigenvalue with zero real part alongside others; linear
    /// analysis is inconclusive.
    Degenerate,
}

impl Stability {
    pub fn is_attracting(self) -> bool {
        matches!(self, Stability::StableNode | Stability::StableFocus)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Linearization {
    pub state: Vec<f64>,
    /// Row-major, `dimension × dimension`.
    pub jacobian: Vec<f64>,
    pub eigenvalues: Vec<ComplexNumber>,
    pub stability: Stability,
}

/// Linearizes `system` about `state` and classifies the fixed point.
///
/// `state` is assumed to be an equilibrium; no residual check is made, since
/// callers obtain it in closed form.
pub fn linearize<S>(system: &S, state: &[f64]) -> Result<Linearization, PhaseSpaceError>
where
    S: DynamicalSystem<Dual>,
{
    let dim = state.len();
    let jac = jacobian(system, 0.0, state);
    if jac.iter().any(|v| !v.is_finite()) {
        return Err(PhaseSpaceError::NonFiniteJacobian {
            n1: state.first().copied().unwrap_or(f64::NAN),
            n2: state.get(1).copied().unwrap_or(f64::NAN),
        });
    }

    let matrix = DMatrix::from_row_slice(dim, dim, &jac);
    let eigenvalues: Vec<ComplexNumber> = matrix
        .complex_eigenvalues()
        .iter()
        .map(|lambda| ComplexNumber::from(*lambda))
        .collect();
    let stability = classify_spectrum(&eigenvalues);

    Ok(Linearization {
        state: state.to_vec(),
        jacobian: jac,
        eigenvalues,
        stability,
    })
}

pub fn classify_spectrum(eigenvalues: &[ComplexNumber]) -> Stability {
    let negative = eigenvalues
        .iter()
        .filter(|e| e.re < -NEUTRAL_TOLERANCE)
        .count();
    let positive = eigenvalues
        .iter()
        .filter(|e| e.re > NEUTRAL_TOLERANCE)
        .count();
    let neutral = eigenvalues.len() - negative - positive;
    let rotating = eigenvalues
        .iter()
        .any(|e| e.im.abs() > NEUTRAL_TOLERANCE);

    if neutral == eigenvalues.len() && rotating {
        return Stability::Center;
    }
    if neutral > 0 {
        return Stability::Degenerate;
    }
    match (negative, positive, rotating) {
        (_, 0, false) => Stability::StableNode,
        (_, 0, true) => Stability::StableFocus,
        (0, _, false) => Stability::UnstableNode,
        (0, _, true) => Stability::UnstableFocus,
        _ => Stability::Saddle,
    }
}
