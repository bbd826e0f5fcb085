//! Integrates a small two-state model and writes its trajectory to a text file.
//!
//! ```bash
//! test_ode --model rc --scheme implicit --output test_ode_ie.txt
//! ```

use std::f64::consts::PI;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ode_core::models::{HarmonicOscillator, RcNetwork};
use ode_core::{IntegrationSettings, NonlinearFunction};
use ode_demos::config::DemoConfig;
use ode_demos::output::TrajectoryWriter;
use ode_demos::{init_logging, run_scheme, Scheme};
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Model {
    /// x0' = x1, x1' = -x0 starting from (1, 0)
    Oscillator,
    /// RC circuit driven at 50 Hz, state (t, u_C) starting from (0, 0)
    Rc,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_enum, default_value_t = Model::Oscillator)]
    model: Model,

    #[arg(short, long, value_enum, default_value_t = Scheme::Implicit)]
    scheme: Scheme,

    /// End time (default 4π)
    #[arg(long)]
    t_end: Option<f64>,

    /// Number of uniform steps (default 1000)
    #[arg(long)]
    steps: Option<usize>,

    /// JSON settings file with `integration` and `newton` sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, default_value = "test_ode.txt")]
    output: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let fallback = DemoConfig {
        integration: IntegrationSettings::new(4.0 * PI, 1000),
        ..DemoConfig::default()
    };
    let config = DemoConfig::load(args.config.as_deref(), fallback)?
        .with_overrides(args.t_end, args.steps);

    let (rhs, mut y): (Box<dyn NonlinearFunction>, Vec<f64>) = match args.model {
        Model::Oscillator => (Box::new(HarmonicOscillator), vec![1.0, 0.0]),
        Model::Rc => (Box::new(RcNetwork::default()), vec![0.0, 0.0]),
    };

    let mut writer = TrajectoryWriter::create(&args.output)?;
    let report = run_scheme(args.scheme, rhs.as_ref(), &mut y, &config, |t, y| {
        writer.record(t, y)
    })
    .with_context(|| format!("{:?} integration of {:?} failed", args.scheme, args.model))?;
    writer.finish()?;

    info!(
        steps = report.steps,
        newton_iterations = report.newton_iterations,
        output = %args.output.display(),
        "trajectory written"
    );
    Ok(())
}
