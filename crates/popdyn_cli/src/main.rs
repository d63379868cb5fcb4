//! `popdyn`: runs the population-model pipelines and renders their figures.
//!
//! Usage: `popdyn [--config FILE.json] [--out DIR] [--only phase|euler|heun|hunter]...`

mod config;
mod pipeline;
mod render;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use config::PopdynConfig;
use pipeline::{run_pipelines, Figure};
use render::PngSink;

#[derive(Parser, Debug)]
#[command(name = "popdyn")]
#[command(about = "Integrate classical population models and plot the results")]
struct Args {
    /// JSON file overriding any of the default model parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory the PNG figures are written to
    #[arg(long = "out", default_value = "Figures")]
    out_dir: PathBuf,

    /// Only produce the given figure (repeatable); all figures by default
    #[arg(long, value_enum)]
    only: Vec<Figure>,
}

/// Used when `RUST_LOG` is unset or unparsable.
const DEFAULT_LOG_FILTER: &str = "info";

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    fmt().with_env_filter(filter).with_target(false).init();
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            PopdynConfig::load(path)?
        }
        None => PopdynConfig::default(),
    };

    let mut sink = PngSink::new(&args.out_dir)?;
    run_pipelines(&config, &args.only, &mut sink)?;
    info!(out_dir = %args.out_dir.display(), "done");
    Ok(())
}

fn main() {
    init_logging();

    let args = Args::parse();
    if let Err(err) = run(args) {
        error!("{err:#}");
        process::exit(1);
    }
}
