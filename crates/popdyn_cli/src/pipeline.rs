use crate::config::PopdynConfig;
use anyhow::{Context, Result};
use clap::ValueEnum;
use popdyn_core::{
    hunter_sweep, phase_space, sis_sweep, HunterState, IntegrationMethod, PhaseSpace, SisState,
    Sweep,
};
use tracing::info;

/// The figures the tool knows how to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Figure {
    /// Competition-model phase portrait.
    Phase,
    /// SIS sweep integrated with explicit Euler.
    Euler,
    /// SIS sweep integrated with Heun's method.
    Heun,
    /// Predator-prey-hunter sweep.
    Hunter,
}

impl Figure {
    pub const ALL: [Figure; 4] = [Figure::Phase, Figure::Euler, Figure::Heun, Figure::Hunter];

    pub fn file_stem(self) -> &'static str {
        match self {
            Figure::Phase => "phase_space",
            Figure::Euler => "euler_plots",
            Figure::Heun => "heun_plots",
            Figure::Hunter => "hunter_plots",
        }
    }
}

/// One subplot: a title plus named population series indexed by time step.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub series: Vec<(&'static str, Vec<f64>)>,
}

/// A `rows × cols` grid of panels, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct GridFigure {
    pub figure: Figure,
    pub rows: usize,
    pub cols: usize,
    pub panels: Vec<Panel>,
}

impl GridFigure {
    pub fn from_sis(figure: Figure, sweep: &Sweep<SisState>) -> Self {
        let panels = sweep
            .cells
            .iter()
            .map(|cell| Panel {
                title: format!("h: {}, Beta: {}", cell.step_size, cell.beta),
                series: vec![
                    (
                        "Susceptible",
                        cell.trajectory.iter().map(|s| s.susceptible).collect(),
                    ),
                    ("Infected", cell.trajectory.iter().map(|s| s.infected).collect()),
                ],
            })
            .collect();
        Self {
            figure,
            rows: sweep.rows,
            cols: sweep.cols,
            panels,
        }
    }

    pub fn from_hunter(sweep: &Sweep<HunterState>) -> Self {
        let panels = sweep
            .cells
            .iter()
            .map(|cell| Panel {
                title: format!("h: {} Beta: {}", cell.step_size, cell.beta),
                series: vec![
                    ("Prey", cell.trajectory.iter().map(|s| s.prey).collect()),
                    (
                        "Predators",
                        cell.trajectory.iter().map(|s| s.predators).collect(),
                    ),
                    ("Hunters", cell.trajectory.iter().map(|s| s.hunters).collect()),
                ],
            })
            .collect();
        Self {
            figure: Figure::Hunter,
            rows: sweep.rows,
            cols: sweep.cols,
            panels,
        }
    }
}

/// Downstream consumer of pipeline output. The PNG renderer is one
/// implementation; tests swap in a recorder.
pub trait FigureSink {
    fn phase_space(&mut self, space: &PhaseSpace) -> Result<()>;
    fn population_grid(&mut self, grid: &GridFigure) -> Result<()>;
}

/// Runs the selected pipelines in a fixed order and hands each result to `sink`.
/// An empty selection means every figure.
pub fn run_pipelines(
    config: &PopdynConfig,
    selection: &[Figure],
    sink: &mut impl FigureSink,
) -> Result<()> {
    let wanted = |figure: Figure| selection.is_empty() || selection.contains(&figure);

    for figure in Figure::ALL.into_iter().filter(|f| wanted(*f)) {
        match figure {
            Figure::Phase => {
                let space = phase_space(&config.phase_space)
                    .context("Competition phase-space analysis failed")?;
                info!(regime = space.label.as_str(), "phase space ready");
                sink.phase_space(&space)?;
            }
            Figure::Euler | Figure::Heun => {
                let method = if figure == Figure::Euler {
                    IntegrationMethod::Euler
                } else {
                    IntegrationMethod::Heun
                };
                let sweep = sis_sweep(&config.sis, method)
                    .with_context(|| format!("SIS {} sweep failed", method.name()))?;
                info!(method = method.name(), cells = sweep.cells.len(), "SIS sweep ready");
                sink.population_grid(&GridFigure::from_sis(figure, &sweep))?;
            }
            Figure::Hunter => {
                let sweep =
                    hunter_sweep(&config.hunter).context("Predator-prey-hunter sweep failed")?;
                info!(cells = sweep.cells.len(), "predator-prey-hunter sweep ready");
                sink.population_grid(&GridFigure::from_hunter(&sweep))?;
            }
        }
    }
    Ok(())
}
