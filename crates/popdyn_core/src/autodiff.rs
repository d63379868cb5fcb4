use crate::traits::DynamicalSystem;
use num_traits::{Num, One, Zero};
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};

/// Dual number for forward-mode differentiation.
/// val: real part
/// eps: infinitesimal part
///
/// Only the ring and field operations are provided; the population models
/// are rational functions of their state, so nothing transcendental is needed.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Dual {
    pub val: f64,
    pub eps: f64,
}

impl Dual {
    pub fn new(val: f64, eps: f64) -> Self {
        Self { val, eps }
    }

    /// A constant: no sensitivity to any input.
    pub fn constant(val: f64) -> Self {
        Self::new(val, 0.0)
    }

    /// An input variable seeded with unit sensitivity.
    pub fn variable(val: f64) -> Self {
        Self::new(val, 1.0)
    }
}

impl From<f64> for Dual {
    fn from(val: f64) -> Self {
        Self::constant(val)
    }
}

impl Zero for Dual {
    fn zero() -> Self {
        Self::constant(0.0)
    }
    fn is_zero(&self) -> bool {
        self.val == 0.0 && self.eps == 0.0
    }
}

impl One for Dual {
    fn one() -> Self {
        Self::constant(1.0)
    }
}

impl Add for Dual {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.val + rhs.val, self.eps + rhs.eps)
    }
}

impl Sub for Dual {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.val - rhs.val, self.eps - rhs.eps)
    }
}

impl Mul for Dual {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.val * rhs.val, self.val * rhs.eps + self.eps * rhs.val)
    }
}

impl Div for Dual {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        Self::new(
            self.val / rhs.val,
            (self.eps * rhs.val - self.val * rhs.eps) / (rhs.val * rhs.val),
        )
    }
}

impl Neg for Dual {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.val, -self.eps)
    }
}

impl Rem for Dual {
    type Output = Self;
    fn rem(self, rhs: Self) -> Self {
        // Piecewise constant offset, so the slope carries through unchanged.
        Self::new(self.val % rhs.val, self.eps)
    }
}

impl Num for Dual {
    type FromStrRadixErr = <f64 as Num>::FromStrRadixErr;
    fn from_str_radix(str: &str, radix: u32) -> Result<Self, Self::FromStrRadixErr> {
        f64::from_str_radix(str, radix).map(Self::constant)
    }
}

/// Computes the Jacobian of `system` at `state`, row-major (`J[i * n + j] = ∂f_i/∂x_j`).
///
/// One forward pass per column: x_j is seeded with eps = 1, all others with 0.
pub fn jacobian<S: DynamicalSystem<Dual>>(system: &S, t: f64, state: &[f64]) -> Vec<f64> {
    let n = state.len();
    let mut jacobian = vec![0.0; n * n];
    let mut dual_x = vec![Dual::zero(); n];
    let mut dual_out = vec![Dual::zero(); n];
    let t_dual = Dual::constant(t);

    for j in 0..n {
        for i in 0..n {
            dual_x[i] = if i == j {
                Dual::variable(state[i])
            } else {
                Dual::constant(state[i])
            };
        }
        system.apply(t_dual, &dual_x, &mut dual_out);
        for i in 0..n {
            jacobian[i * n + j] = dual_out[i].eps;
        }
    }

    jacobian
}
