use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Cross product of transmission/predation rates (rows) and step sizes (columns).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepGrid {
    pub betas: Vec<f64>,
    pub step_sizes: Vec<f64>,
}

impl SweepGrid {
    pub fn new(betas: Vec<f64>, step_sizes: Vec<f64>) -> Self {
        Self { betas, step_sizes }
    }

    pub fn rows(&self) -> usize {
        self.betas.len()
    }

    pub fn cols(&self) -> usize {
        self.step_sizes.len()
    }

    pub fn validate(&self) -> Result<()> {
        if self.betas.is_empty() {
            bail!("Sweep needs at least one beta value.");
        }
        if self.step_sizes.is_empty() {
            bail!("Sweep needs at least one step size.");
        }
        if let Some(beta) = self.betas.iter().find(|b| !b.is_finite()) {
            bail!("Beta values must be finite, got {}.", beta);
        }
        if let Some(h) = self.step_sizes.iter().find(|h| !h.is_finite() || **h <= 0.0) {
            bail!("Step sizes must be finite and positive, got {}.", h);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepCell<S> {
    pub row: usize,
    pub col: usize,
    pub beta: f64,
    pub step_size: f64,
    pub trajectory: Vec<S>,
}

/// Results of a full sweep, row-major: `cells[row * cols + col]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sweep<S> {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<SweepCell<S>>,
}

impl<S> Sweep<S> {
    pub fn cell(&self, row: usize, col: usize) -> Option<&SweepCell<S>> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col)
    }
}

/// Runs `run(beta, step_size)` once per grid cell, beta outer, step size inner.
/// Cells are independent; nothing is carried from one run into the next.
pub fn run_sweep<S>(grid: &SweepGrid, mut run: impl FnMut(f64, f64) -> Vec<S>) -> Result<Sweep<S>> {
    grid.validate()?;

    let mut cells = Vec::with_capacity(grid.rows() * grid.cols());
    for (row, &beta) in grid.betas.iter().enumerate() {
        for (col, &step_size) in grid.step_sizes.iter().enumerate() {
            let trajectory = run(beta, step_size);
            debug!(
                row,
                col,
                beta,
                step_size,
                steps = trajectory.len(),
                "sweep cell finished"
            );
            cells.push(SweepCell {
                row,
                col,
                beta,
                step_size,
                trajectory,
            });
        }
    }

    Ok(Sweep {
        rows: grid.rows(),
        cols: grid.cols(),
        cells,
    })
}
