//! Shared plumbing for the demo programs: settings files, logging, the
//! integration scheme switch and trajectory output.

pub mod config;
pub mod output;

use clap::ValueEnum;
use ode_core::{
    solve_ode_explicit_euler, solve_ode_implicit_euler, IntegrationReport, NonlinearFunction,
};
use tracing_subscriber::EnvFilter;

use crate::config::DemoConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scheme {
    Explicit,
    Implicit,
}

/// Runs `rhs` from the state in `y` with the selected scheme.
pub fn run_scheme<F, O>(
    scheme: Scheme,
    rhs: &F,
    y: &mut [f64],
    config: &DemoConfig,
    observer: O,
) -> ode_core::Result<IntegrationReport>
where
    F: NonlinearFunction + ?Sized,
    O: FnMut(f64, &[f64]) -> anyhow::Result<()>,
{
    match scheme {
        Scheme::Explicit => solve_ode_explicit_euler(rhs, y, config.integration, observer),
        Scheme::Implicit => {
            solve_ode_implicit_euler(rhs, y, config.integration, config.newton, observer)
        }
    }
}

/// Installs the `tracing` subscriber for a demo binary.
///
/// `RUST_LOG` is honoured unless `debug` is set, which forces `debug` level.
pub fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use ode_core::models::LinearDecay;
    use ode_core::IntegrationSettings;

    #[test]
    fn run_scheme_dispatches_to_both_integrators() {
        let config = DemoConfig {
            integration: IntegrationSettings::new(1.0, 4),
            ..DemoConfig::default()
        };
        let rhs = LinearDecay::new(-1.0);

        let mut explicit = [1.0];
        let report = run_scheme(Scheme::Explicit, &rhs, &mut explicit, &config, |_, _| Ok(()))
            .expect("integration should succeed");
        assert_eq!(report.newton_iterations, 0);
        assert!((explicit[0] - 0.75_f64.powi(4)).abs() < 1e-14);

        let mut implicit = [1.0];
        let report = run_scheme(Scheme::Implicit, &rhs, &mut implicit, &config, |_, _| Ok(()))
            .expect("integration should succeed");
        assert!(report.newton_iterations > 0);
        assert!((implicit[0] - 0.8_f64.powi(4)).abs() < 1e-14);
    }
}
