//! Susceptible-Infected-Susceptible compartment model.
//!
//! dI/dt = β·S·I − γ·I, dS/dt = −dI/dt. No clamping is applied: at large step
//! sizes or transmission rates both compartments may go negative or diverge,
//! which is exactly the sensitivity the Euler/Heun comparison exposes.

use crate::{
    solvers::{integrate, Euler, Heun},
    sweep::{run_sweep, Sweep, SweepGrid},
    traits::{DynamicalSystem, Scalar},
};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SisState {
    pub susceptible: f64,
    pub infected: f64,
}

impl SisState {
    pub fn total(&self) -> f64 {
        self.susceptible + self.infected
    }

    /// Both compartments finite and non-negative.
    pub fn is_physical(&self) -> bool {
        [self.susceptible, self.infected]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SisParams {
    pub initial_susceptible: f64,
    pub initial_infected: f64,
    /// Transmission rate.
    pub beta: f64,
    /// Recovery rate.
    pub gamma: f64,
}

impl Default for SisParams {
    fn default() -> Self {
        Self {
            initial_susceptible: 90.0,
            initial_infected: 10.0,
            beta: 0.03,
            gamma: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationMethod {
    Euler,
    Heun,
}

impl IntegrationMethod {
    pub fn name(self) -> &'static str {
        match self {
            IntegrationMethod::Euler => "euler",
            IntegrationMethod::Heun => "heun",
        }
    }
}

/// Vector field over the state `[S, I]`.
#[derive(Debug, Clone, Copy)]
pub struct SisModel {
    pub beta: f64,
    pub gamma: f64,
}

impl<T: Scalar> DynamicalSystem<T> for SisModel {
    fn dimension(&self) -> usize {
        2
    }

    fn apply(&self, _t: T, x: &[T], out: &mut [T]) {
        let (s, i) = (x[0], x[1]);
        let beta = T::from(self.beta);
        let gamma = T::from(self.gamma);
        out[1] = beta * s * i - gamma * i;
        out[0] = -(beta * s * i - gamma * i);
    }
}

pub fn simulate_sis(
    params: &SisParams,
    method: IntegrationMethod,
    steps: usize,
    h: f64,
) -> Vec<SisState> {
    let model = SisModel {
        beta: params.beta,
        gamma: params.gamma,
    };
    let initial = [params.initial_susceptible, params.initial_infected];
    let history = match method {
        IntegrationMethod::Euler => integrate(&model, &mut Euler::new(2), &initial, 0.0, steps, h),
        IntegrationMethod::Heun => integrate(&model, &mut Heun::new(2), &initial, 0.0, steps, h),
    };
    history
        .into_iter()
        .map(|x| SisState {
            susceptible: x[0],
            infected: x[1],
        })
        .collect()
}

pub fn sis_euler(params: &SisParams, steps: usize, h: f64) -> Vec<SisState> {
    simulate_sis(params, IntegrationMethod::Euler, steps, h)
}

pub fn sis_heun(params: &SisParams, steps: usize, h: f64) -> Vec<SisState> {
    simulate_sis(params, IntegrationMethod::Heun, steps, h)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SisSweepConfig {
    pub initial_susceptible: f64,
    pub initial_infected: f64,
    pub gamma: f64,
    pub steps: usize,
    pub grid: SweepGrid,
}

impl Default for SisSweepConfig {
    fn default() -> Self {
        let params = SisParams::default();
        Self {
            initial_susceptible: params.initial_susceptible,
            initial_infected: params.initial_infected,
            gamma: params.gamma,
            steps: 50,
            grid: SweepGrid::new(vec![0.03, 0.06, 0.1], vec![0.01, 0.5, 2.0]),
        }
    }
}

impl SisSweepConfig {
    pub fn params_for(&self, beta: f64) -> SisParams {
        SisParams {
            initial_susceptible: self.initial_susceptible,
            initial_infected: self.initial_infected,
            beta,
            gamma: self.gamma,
        }
    }
}

/// Runs the SIS model with `method` over every (β, h) cell of the grid.
pub fn sis_sweep(config: &SisSweepConfig, method: IntegrationMethod) -> Result<Sweep<SisState>> {
    for (name, value) in [
        ("initial_susceptible", config.initial_susceptible),
        ("initial_infected", config.initial_infected),
        ("gamma", config.gamma),
    ] {
        if !value.is_finite() {
            bail!("SIS {} must be finite, got {}.", name, value);
        }
    }

    run_sweep(&config.grid, |beta, h| {
        let trajectory = simulate_sis(&config.params_for(beta), method, config.steps, h);
        if let Some(step) = trajectory.iter().position(|s| !s.is_physical()) {
            warn!(
                method = method.name(),
                beta,
                step_size = h,
                step,
                "SIS trajectory left the non-negative orthant"
            );
        }
        trajectory
    })
}
