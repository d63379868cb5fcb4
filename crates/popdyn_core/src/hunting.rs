//! Predator-prey dynamics with a hunter population that harvests predators.
//!
//! Every step first applies the discrete harvest, then takes one Euler step of
//! the Lotka-Volterra pair using the harvested predator count. The order is
//! part of the model: swapping it changes the trajectory.

use crate::{
    solvers::Euler,
    sweep::{run_sweep, Sweep, SweepGrid},
    traits::{DynamicalSystem, Scalar, Steppable},
};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Per-step harvesting rate: each hunter removes this fraction of the
/// predators, and this fraction of the hunters is lost every step.
pub const HARVEST_RATE: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HunterState {
    pub prey: f64,
    pub predators: f64,
    pub hunters: f64,
}

impl HunterState {
    pub const INITIAL: HunterState = HunterState {
        prey: 50.0,
        predators: 100.0,
        hunters: 40.0,
    };

    /// Applies one round of harvesting. Prey are untouched.
    pub fn harvest(self) -> Self {
        let predators_killed = self.hunters * HARVEST_RATE * self.predators;
        let hunters_killed = self.hunters * HARVEST_RATE;
        Self {
            prey: self.prey,
            predators: self.predators - predators_killed,
            hunters: self.hunters - hunters_killed,
        }
    }

    /// Full transition: harvest, then a single Euler step of size `h` on
    /// (prey, predators). Hunters neither reproduce nor die naturally.
    pub fn advance(self, params: &HunterParams, h: f64) -> Self {
        self.advance_with(&PredatorPrey::from(params), &mut Euler::new(2), h)
    }

    fn advance_with(self, model: &PredatorPrey, stepper: &mut Euler<f64>, h: f64) -> Self {
        let harvested = self.harvest();
        let mut t = 0.0;
        let mut pair = [harvested.prey, harvested.predators];
        stepper.step(model, &mut t, &mut pair, h);
        Self {
            prey: pair[0],
            predators: pair[1],
            hunters: harvested.hunters,
        }
    }

    pub fn is_physical(&self) -> bool {
        [self.prey, self.predators, self.hunters]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HunterParams {
    /// Prey birth rate.
    pub alpha: f64,
    /// Predation rate.
    pub beta: f64,
    /// Predator death rate.
    pub gamma: f64,
    /// Predator growth per prey consumed.
    pub delta: f64,
}

impl Default for HunterParams {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            beta: 0.002,
            gamma: 0.3,
            delta: 0.01,
        }
    }
}

/// Lotka-Volterra vector field over `[P, D]`:
/// dP/dt = α·P − β·P·D, dD/dt = δ·P·D − γ·D.
#[derive(Debug, Clone, Copy)]
pub struct PredatorPrey {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub delta: f64,
}

impl From<&HunterParams> for PredatorPrey {
    fn from(params: &HunterParams) -> Self {
        Self {
            alpha: params.alpha,
            beta: params.beta,
            gamma: params.gamma,
            delta: params.delta,
        }
    }
}

impl<T: Scalar> DynamicalSystem<T> for PredatorPrey {
    fn dimension(&self) -> usize {
        2
    }

    fn apply(&self, _t: T, x: &[T], out: &mut [T]) {
        let (p, d) = (x[0], x[1]);
        out[0] = T::from(self.alpha) * p - T::from(self.beta) * p * d;
        out[1] = T::from(self.delta) * p * d - T::from(self.gamma) * d;
    }
}

/// Runs `steps` transitions from [`HunterState::INITIAL`] and returns the
/// state after each one.
pub fn predator_prey_hunter(params: &HunterParams, steps: usize, h: f64) -> Vec<HunterState> {
    let model = PredatorPrey::from(params);
    let mut stepper = Euler::new(2);
    let mut state = HunterState::INITIAL;
    let mut history = Vec::with_capacity(steps);
    for _ in 0..steps {
        state = state.advance_with(&model, &mut stepper, h);
        history.push(state);
    }
    history
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HunterSweepConfig {
    pub alpha: f64,
    pub gamma: f64,
    pub delta: f64,
    pub steps: usize,
    pub grid: SweepGrid,
}

impl Default for HunterSweepConfig {
    fn default() -> Self {
        let params = HunterParams::default();
        Self {
            alpha: params.alpha,
            gamma: params.gamma,
            delta: params.delta,
            steps: 1000,
            grid: SweepGrid::new(vec![0.002, 0.005, 0.008], vec![0.1, 0.2, 0.3]),
        }
    }
}

impl HunterSweepConfig {
    pub fn params_for(&self, beta: f64) -> HunterParams {
        HunterParams {
            alpha: self.alpha,
            beta,
            gamma: self.gamma,
            delta: self.delta,
        }
    }
}

pub fn hunter_sweep(config: &HunterSweepConfig) -> Result<Sweep<HunterState>> {
    for (name, value) in [
        ("alpha", config.alpha),
        ("gamma", config.gamma),
        ("delta", config.delta),
    ] {
        if !value.is_finite() {
            bail!("Hunter model {} must be finite, got {}.", name, value);
        }
    }

    run_sweep(&config.grid, |beta, h| {
        let trajectory = predator_prey_hunter(&config.params_for(beta), config.steps, h);
        if let Some(step) = trajectory.iter().position(|s| !s.is_physical()) {
            warn!(
                beta,
                step_size = h,
                step,
                "predator-prey-hunter trajectory left the non-negative orthant"
            );
        }
        trajectory
    })
}
