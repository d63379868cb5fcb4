use num_traits::Num;
use std::fmt::Debug;
use std::ops::Neg;

/// A trait for types that can be used as scalars in the population models.
/// Implemented by `f64` for plain integration and by `Dual` for Jacobians,
/// so a single vector field yields both values and derivatives.
pub trait Scalar: Num + Neg<Output = Self> + From<f64> + Copy + Debug + 'static {}

impl<T: Num + Neg<Output = T> + From<f64> + Copy + Debug + 'static> Scalar for T {}

/// Represents a continuous-time dynamical system dx/dt = f(t, x).
pub trait DynamicalSystem<T: Scalar> {
    /// Returns the dimension of the state space.
    fn dimension(&self) -> usize;

    /// Evaluates the vector field.
    /// x: current state
    /// t: current time
    /// out: buffer to write dx/dt into
    fn apply(&self, t: T, x: &[T], out: &mut [T]);
}

/// A trait for fixed-step solvers that advance a system in place.
pub trait Steppable<T: Scalar> {
    /// Performs one step of size dt.
    /// t: current time (updated after step)
    /// state: current state (updated after step)
    /// dt: step size
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T);
}
