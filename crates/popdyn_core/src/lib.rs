pub mod autodiff;
pub mod competition;
pub mod epidemic;
pub mod equilibrium;
pub mod error;
pub mod hunting;
pub mod solvers;
pub mod sweep;
/// The `popdyn_core` crate holds the numerical side of three classical
/// population models. Nothing here touches the filesystem; every pipeline is a
/// function of a parameter struct that returns plain data for a renderer.
///
/// Key components:
/// - **Traits**: `Scalar` (f64 or `Dual`), `DynamicalSystem` (vector fields), `Steppable` (fixed-step solvers).
/// - **Solvers**: explicit Euler and Heun, plus `integrate` for fixed step counts.
/// - **Autodiff**: `Dual` numbers and a Jacobian helper used for equilibrium linearization.
/// - **Models**: Lotka-Volterra competition (`competition`), SIS epidemic (`epidemic`),
///   predator-prey with hunters (`hunting`).
/// - **Sweep**: runs a model over a β × step-size grid.
pub mod traits;

pub use competition::{phase_space, CompetitionParams, PhaseSpace, Regime};
pub use epidemic::{sis_euler, sis_heun, sis_sweep, IntegrationMethod, SisParams, SisState, SisSweepConfig};
pub use error::PhaseSpaceError;
pub use hunting::{hunter_sweep, predator_prey_hunter, HunterParams, HunterState, HunterSweepConfig};
pub use sweep::{Sweep, SweepCell, SweepGrid};
