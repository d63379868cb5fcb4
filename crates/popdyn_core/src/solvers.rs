use crate::traits::{DynamicalSystem, Scalar, Steppable};

/// Explicit (forward) Euler: one vector-field evaluation per step.
pub struct Euler<T: Scalar> {
    k: Vec<T>,
}

impl<T: Scalar> Euler<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            k: vec![T::zero(); dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for Euler<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T) {
        let t0 = *t;

        // k = f(t, y)
        system.apply(t0, state, &mut self.k);

        // y_next = y + k*dt
        for i in 0..state.len() {
            state[i] = state[i] + self.k[i] * dt;
        }

        *t = t0 + dt;
    }
}

/// Heun's method (improved Euler): Euler predictor, then a corrector that
/// averages the slopes at the current and predicted states.
pub struct Heun<T: Scalar> {
    k1: Vec<T>,
    k2: Vec<T>,
    tmp: Vec<T>,
}

impl<T: Scalar> Heun<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            k1: vec![T::zero(); dim],
            k2: vec![T::zero(); dim],
            tmp: vec![T::zero(); dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for Heun<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T) {
        let two = T::one() + T::one();
        let t0 = *t;

        // k1 = f(t, y)
        system.apply(t0, state, &mut self.k1);

        // predictor: y_e = y + k1*dt
        for i in 0..state.len() {
            self.tmp[i] = state[i] + self.k1[i] * dt;
        }

        // k2 = f(t + dt, y_e)
        system.apply(t0 + dt, &self.tmp, &mut self.k2);

        // y_next = y + dt*(k1 + k2)/2
        for i in 0..state.len() {
            state[i] = state[i] + dt * (self.k1[i] + self.k2[i]) / two;
        }

        *t = t0 + dt;
    }
}

/// Runs `stepper` for exactly `steps` fixed steps from `initial` and returns
/// the state after each step. The initial condition itself is not recorded,
/// so `steps == 0` yields an empty trajectory.
pub fn integrate<T, S, P>(
    system: &S,
    stepper: &mut P,
    initial: &[T],
    t0: T,
    steps: usize,
    dt: T,
) -> Vec<Vec<T>>
where
    T: Scalar,
    S: DynamicalSystem<T>,
    P: Steppable<T>,
{
    let mut state = initial.to_vec();
    let mut t = t0;
    let mut history = Vec::with_capacity(steps);
    for _ in 0..steps {
        stepper.step(system, &mut t, &mut state, dt);
        history.push(state.clone());
    }
    history
}
