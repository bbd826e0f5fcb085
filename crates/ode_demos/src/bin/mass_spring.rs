//! Swinging chain of masses hanging from a fixed point in the plane.
//!
//! The chain starts horizontal with unstretched springs and falls under
//! gravity. Each output line holds `t` followed by the mass positions
//! `x0 y0 x1 y1 ...`.

use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use nalgebra::Vector2;
use ode_core::linalg::{row, row_count};
use ode_core::models::{Fix, Mass, MassSpringFunction, MassSpringSystem, Spring};
use ode_core::{FirstOrderForm, IntegrationSettings, NonlinearFunction};
use ode_demos::config::DemoConfig;
use ode_demos::output::TrajectoryWriter;
use ode_demos::{init_logging, run_scheme, Scheme};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of masses in the chain
    #[arg(short = 'n', long, default_value_t = 3)]
    masses: usize,

    /// Spring stiffness in N/m
    #[arg(short = 'k', long, default_value_t = 200.0)]
    stiffness: f64,

    #[arg(short, long, value_enum, default_value_t = Scheme::Implicit)]
    scheme: Scheme,

    /// End time (default 10)
    #[arg(long)]
    t_end: Option<f64>,

    /// Number of uniform steps (default 2000)
    #[arg(long)]
    steps: Option<usize>,

    /// JSON settings file with `integration` and `newton` sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, default_value = "mass_spring.txt")]
    output: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn build_chain(masses: usize, stiffness: f64) -> MassSpringSystem<2> {
    let mut system = MassSpringSystem::new();
    system.set_gravity(Vector2::new(0.0, -9.81));

    let mut previous = system.add_fix(Fix::new(Vector2::zeros()));
    for i in 0..masses {
        let mass = system.add_mass(Mass::new(1.0, Vector2::new((i + 1) as f64, 0.0)));
        system.add_spring(Spring::new(1.0, stiffness, previous, mass));
        previous = mass;
    }
    system
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);
    ensure!(args.masses > 0, "the chain needs at least one mass");

    let fallback = DemoConfig {
        integration: IntegrationSettings::new(10.0, 2000),
        ..DemoConfig::default()
    };
    let config = DemoConfig::load(args.config.as_deref(), fallback)?
        .with_overrides(args.t_end, args.steps);

    let mut system = build_chain(args.masses, args.stiffness);
    debug!("initial system:\n{system}");

    let n = system.state_dimension();
    let mut y = vec![0.0; 2 * n];
    let mut accelerations = vec![0.0; n];
    {
        let (positions, velocities) = y.split_at_mut(n);
        system.get_state(positions, velocities, &mut accelerations)?;
    }

    let report = {
        let rhs = FirstOrderForm::new(MassSpringFunction::new(&system));
        let mut writer = TrajectoryWriter::create(&args.output)?;
        let report = run_scheme(args.scheme, &rhs, &mut y, &config, |t, y| {
            writer.record(t, &y[..n])
        })
        .with_context(|| format!("{:?} integration of the chain failed", args.scheme))?;
        writer.finish()?;

        rhs.inner.evaluate(&y[..n], &mut accelerations);
        report
    };

    let (positions, velocities) = y.split_at(n);
    system.set_state(positions, velocities, &accelerations)?;
    let tip = row::<2>(positions, row_count::<2>(positions) - 1);
    info!(x = tip[0], y = tip[1], "final position of the last mass");
    info!(
        steps = report.steps,
        newton_iterations = report.newton_iterations,
        output = %args.output.display(),
        "trajectory written"
    );
    debug!("final system:\n{system}");
    Ok(())
}
