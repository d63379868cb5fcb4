use crate::pipeline::{Figure, FigureSink, GridFigure, Panel};
use anyhow::{Context, Result};
use plotters::prelude::*;
use popdyn_core::PhaseSpace;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Line colors for successive series in a panel.
const SERIES_COLORS: [RGBColor; 3] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
];
const FIELD_COLOR: RGBColor = RGBColor(150, 150, 150);
const REFERENCE_COLOR: RGBColor = RGBColor(128, 0, 128);
/// Target number of arrows along each axis of the phase portrait.
const ARROWS_PER_AXIS: usize = 25;

/// Writes each figure as `<out_dir>/<stem>.png`.
pub struct PngSink {
    out_dir: PathBuf,
}

impl PngSink {
    pub fn new(out_dir: &Path) -> Result<Self> {
        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;
        Ok(Self {
            out_dir: out_dir.to_path_buf(),
        })
    }

    fn path_for(&self, figure: Figure) -> PathBuf {
        self.out_dir.join(format!("{}.png", figure.file_stem()))
    }
}

impl FigureSink for PngSink {
    fn phase_space(&mut self, space: &PhaseSpace) -> Result<()> {
        let path = self.path_for(Figure::Phase);
        draw_phase_space(&path, space)
            .with_context(|| format!("Failed to render {}", path.display()))?;
        info!(path = %path.display(), "wrote figure");
        Ok(())
    }

    fn population_grid(&mut self, grid: &GridFigure) -> Result<()> {
        let path = self.path_for(grid.figure);
        draw_grid(&path, grid).with_context(|| format!("Failed to render {}", path.display()))?;
        info!(path = %path.display(), "wrote figure");
        Ok(())
    }
}

fn draw_phase_space(path: &Path, space: &PhaseSpace) -> Result<()> {
    let p = &space.params;
    let x_max = p.n1_extent() * 1.05;
    let y_max = p.n2_extent() * 1.05;

    let root = BitMapBackend::new(path, (900, 900)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Lotka-Volterra Model: {}", space.label),
            ("sans-serif", 24),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc("N1")
        .y_desc("N2")
        .x_label_formatter(&|x| tick_label(*x))
        .y_label_formatter(&|y| tick_label(*y))
        .draw()?;

    let field = &space.field;
    let stride = (field.cols().max(field.rows()) / ARROWS_PER_AXIS).max(1);
    let length = 0.6 * stride as f64;
    let mut shafts = Vec::new();
    for row in (0..field.rows()).step_by(stride) {
        for col in (0..field.cols()).step_by(stride) {
            let Some([x, y, dx, dy]) = field.at(row, col) else {
                continue;
            };
            let norm = dx.hypot(dy);
            if !norm.is_finite() || norm == 0.0 {
                continue;
            }
            shafts.push(((x, y), (x + length * dx / norm, y + length * dy / norm)));
        }
    }
    chart.draw_series(
        shafts
            .iter()
            .map(|(tail, head)| PathElement::new(vec![*tail, *head], FIELD_COLOR)),
    )?;
    chart.draw_series(
        shafts
            .iter()
            .map(|(_, head)| Circle::new(*head, 2, FIELD_COLOR.filled())),
    )?;

    let n2 = space.n2_isocline;
    chart
        .draw_series(LineSeries::new(
            vec![(n2.from[0], n2.from[1]), (n2.to[0], n2.to[1])],
            RED.stroke_width(2),
        ))?
        .label("N2 Isocline")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    let n1 = space.n1_isocline;
    chart
        .draw_series(LineSeries::new(
            vec![(n1.from[0], n1.from[1]), (n1.to[0], n1.to[1])],
            BLUE.stroke_width(2),
        ))?
        .label("N1 Isocline")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    let reference = space.reference_line;
    chart
        .draw_series(LineSeries::new(
            vec![
                (reference.from[0], reference.from[1]),
                (reference.to[0], reference.to[1]),
            ],
            REFERENCE_COLOR.stroke_width(2),
        ))?
        .label("N2 = (K1²α1)/(K2²α2) N1")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], REFERENCE_COLOR));

    chart
        .draw_series(
            space
                .equilibria
                .iter()
                .map(|e| Circle::new((e.point[0], e.point[1]), 6, BLACK.filled())),
        )?
        .label("Equilibrium Points")
        .legend(|(x, y)| Circle::new((x, y), 5, BLACK.filled()));

    let i = &space.intercepts;
    let font = ("sans-serif", 16);
    chart.draw_series([
        Text::new("K1".to_string(), (i.k1, 0.0), font),
        Text::new("K2/α1".to_string(), (i.k2_over_alpha1, 0.0), font),
        Text::new("K2".to_string(), (0.0, i.k2), font),
        Text::new("K1/α2".to_string(), (0.0, i.k1_over_alpha2), font),
    ])?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_grid(path: &Path, grid: &GridFigure) -> Result<()> {
    let root = BitMapBackend::new(path, (1200, 1200)).into_drawing_area();
    root.fill(&WHITE)?;
    let areas = root.split_evenly((grid.rows, grid.cols));
    for (area, panel) in areas.iter().zip(grid.panels.iter()) {
        draw_panel(area, panel)?;
    }
    root.present()?;
    Ok(())
}

fn draw_panel(area: &DrawingArea<BitMapBackend, plotters::coord::Shift>, panel: &Panel) -> Result<()> {
    let steps = panel.series.iter().map(|(_, v)| v.len()).max().unwrap_or(0);
    let (y_min, y_max) = finite_range(panel.series.iter().flat_map(|(_, v)| v.iter().copied()));

    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, ("sans-serif", 14))
        .margin(8)
        .x_label_area_size(30)
        .y_label_area_size(45)
        .build_cartesian_2d(0.0..(steps.max(2) - 1) as f64, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Time Steps")
        .y_desc("Population")
        .label_style(("sans-serif", 10))
        .x_label_formatter(&|x| format!("{x:.0}"))
        .y_label_formatter(&|y| tick_label(*y))
        .draw()?;

    for (idx, (name, values)) in panel.series.iter().enumerate() {
        let color = SERIES_COLORS[idx % SERIES_COLORS.len()];
        // Diverged runs end in inf/NaN; those points are left out.
        let points = values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(step, v)| (step as f64, *v));
        chart
            .draw_series(LineSeries::new(points, color))?
            .label(*name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], color));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(("sans-serif", 10))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

/// Fixed-point below 1e4, scientific notation above.
fn tick_label(value: f64) -> String {
    if value.abs() < 1e4 {
        format!("{value:.1}")
    } else {
        format!("{value:.2e}")
    }
}

/// Padded `[min, max]` over the finite values, or `[0, 1]` if there are none.
fn finite_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        return (0.0, 1.0);
    }
    let pad = (0.05 * max - 0.05 * min).max(1e-9);
    ((min - pad).max(f64::MIN), (max + pad).min(f64::MAX))
}

#[cfg(test)]
mod tests {
    use super::{finite_range, tick_label, PngSink};
    use crate::config::PopdynConfig;
    use crate::pipeline::{run_pipelines, Figure};
    use popdyn_core::SweepGrid;
    use std::fs;
    use std::path::Path;

    fn assert_png_written(dir: &Path, stem: &str) {
        let path = dir.join(format!("{stem}.png"));
        let meta = fs::metadata(&path)
            .unwrap_or_else(|err| panic!("{} missing: {err}", path.display()));
        assert!(meta.len() > 0, "{} is empty", path.display());
    }

    #[test]
    fn default_pipelines_write_every_figure() {
        let dir = tempfile::tempdir().expect("temp dir");
        let out_dir = dir.path().join("Figures");
        let mut sink = PngSink::new(&out_dir).expect("output dir created");
        run_pipelines(&PopdynConfig::default(), &[], &mut sink).expect("figures render");

        for figure in Figure::ALL {
            assert_png_written(&out_dir, figure.file_stem());
        }
    }

    #[test]
    fn diverged_sweeps_still_render() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut config = PopdynConfig::default();
        // Both cells blow up to inf/NaN within 50 steps.
        config.sis.grid = SweepGrid::new(vec![0.1], vec![0.5, 2.0]);
        let mut sink = PngSink::new(dir.path()).expect("output dir created");
        run_pipelines(&config, &[Figure::Euler, Figure::Heun], &mut sink)
            .expect("figures render");

        assert_png_written(dir.path(), "euler_plots");
        assert_png_written(dir.path(), "heun_plots");
        assert!(!dir.path().join("phase_space.png").exists());
    }

    #[test]
    fn tick_labels_stay_short() {
        assert_eq!(tick_label(0.0), "0.0");
        assert_eq!(tick_label(89.99999999999997), "90.0");
        assert_eq!(tick_label(-25.129881206071694), "-25.1");
        assert_eq!(tick_label(4.514832739205483e212), "4.51e212");
        assert_eq!(tick_label(-1.4714019330759755e182), "-1.47e182");
        assert!(tick_label(f64::MAX).len() <= 10);
    }

    #[test]
    fn finite_range_spans_huge_magnitudes() {
        let (lo, hi) = finite_range([-f64::MAX, f64::MAX].into_iter());
        assert_eq!((lo, hi), (f64::MIN, f64::MAX));
        let (lo, hi) = finite_range([-4.5e212, 4.5e212].into_iter());
        assert!(lo.is_finite() && hi.is_finite() && lo < -4.5e212 && hi > 4.5e212);
    }

    #[test]
    fn finite_range_ignores_diverged_values() {
        let (lo, hi) = finite_range([1.0, f64::NAN, 3.0, f64::INFINITY].into_iter());
        assert!((lo - 0.9).abs() < 1e-12);
        assert!((hi - 3.1).abs() < 1e-12);
    }

    #[test]
    fn finite_range_falls_back_for_empty_or_flat_series() {
        assert_eq!(finite_range(std::iter::empty()), (0.0, 1.0));
        assert_eq!(finite_range([f64::NAN].into_iter()), (0.0, 1.0));
        let (lo, hi) = finite_range([40.0, 40.0].into_iter());
        assert!(lo < 40.0 && hi > 40.0);
    }
}
