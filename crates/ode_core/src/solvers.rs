use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{ensure_dimension, OdeError, Result};
use crate::newton::{newton_solve, NewtonSettings};
use crate::traits::{DerivativeKind, NonlinearFunction, Steppable};

/// Forward Euler: `y_{n+1} = y_n + dt * F(y_n)`.
/// Stable only for `dt` small relative to the stiffness of `F`.
pub struct ExplicitEuler {
    rate: Vec<f64>,
}

impl ExplicitEuler {
    pub fn new(dim: usize) -> Self {
        Self {
            rate: vec![0.0; dim],
        }
    }
}

impl Steppable for ExplicitEuler {
    const NAME: &'static str = "explicit Euler";

    fn step<F>(&mut self, rhs: &F, t: &mut f64, state: &mut [f64], dt: f64) -> Result<usize>
    where
        F: NonlinearFunction + ?Sized,
    {
        ensure_dimension("explicit Euler work buffer", self.rate.len(), state.len())?;
        ensure_dimension("explicit Euler right-hand side input", rhs.dim_x(), state.len())?;
        ensure_dimension("explicit Euler right-hand side output", rhs.dim_f(), state.len())?;

        rhs.evaluate(state, &mut self.rate);
        for (y, rate) in state.iter_mut().zip(&self.rate) {
            *y += dt * rate;
        }

        *t += dt;
        Ok(0)
    }
}

/// Backward Euler: solves `y_{n+1} - y_n - dt * F(y_{n+1}) = 0` with Newton,
/// seeded with `y_n`.
pub struct ImplicitEuler {
    previous: Vec<f64>,
    settings: NewtonSettings,
}

impl ImplicitEuler {
    pub fn new(dim: usize) -> Self {
        Self::with_settings(dim, NewtonSettings::default())
    }

    pub fn with_settings(dim: usize, settings: NewtonSettings) -> Self {
        Self {
            previous: vec![0.0; dim],
            settings,
        }
    }
}

impl Steppable for ImplicitEuler {
    const NAME: &'static str = "implicit Euler";

    fn step<F>(&mut self, rhs: &F, t: &mut f64, state: &mut [f64], dt: f64) -> Result<usize>
    where
        F: NonlinearFunction + ?Sized,
    {
        ensure_dimension("implicit Euler work buffer", self.previous.len(), state.len())?;
        ensure_dimension("implicit Euler right-hand side input", rhs.dim_x(), state.len())?;
        ensure_dimension("implicit Euler right-hand side output", rhs.dim_f(), state.len())?;

        self.previous.copy_from_slice(state);
        let residual = BackwardEulerResidual {
            rhs,
            previous: &self.previous,
            dt,
        };
        let report = newton_solve(&residual, state, self.settings)?;

        *t += dt;
        Ok(report.iterations)
    }
}

/// `G(z) = z - y_prev - dt * F(z)` with `G'(z) = I - dt * F'(z)`.
///
/// Built fresh for every implicit step; borrows the right-hand side and the
/// previous accepted state.
pub struct BackwardEulerResidual<'a, F: ?Sized> {
    pub rhs: &'a F,
    pub previous: &'a [f64],
    pub dt: f64,
}

impl<F> NonlinearFunction for BackwardEulerResidual<'_, F>
where
    F: NonlinearFunction + ?Sized,
{
    fn dim_x(&self) -> usize {
        self.rhs.dim_x()
    }

    fn dim_f(&self) -> usize {
        self.rhs.dim_f()
    }

    fn evaluate(&self, z: &[f64], f: &mut [f64]) {
        self.rhs.evaluate(z, f);
        for ((g, z), previous) in f.iter_mut().zip(z).zip(self.previous) {
            *g = z - previous - self.dt * *g;
        }
    }

    fn evaluate_deriv(&self, z: &[f64], df: &mut DMatrix<f64>) {
        self.rhs.evaluate_deriv(z, df);
        df.scale_mut(-self.dt);
        for i in 0..df.nrows().min(df.ncols()) {
            df[(i, i)] += 1.0;
        }
    }

    fn derivative_kind(&self) -> DerivativeKind {
        self.rhs.derivative_kind()
    }
}

/// Time horizon and resolution of a fixed-step integration starting at `t = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationSettings {
    pub t_end: f64,
    pub steps: usize,
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        Self {
            t_end: 1.0,
            steps: 100,
        }
    }
}

impl IntegrationSettings {
    pub fn new(t_end: f64, steps: usize) -> Self {
        Self { t_end, steps }
    }

    pub fn step_size(&self) -> f64 {
        self.t_end / self.steps as f64
    }

    pub fn validate(&self) -> Result<()> {
        if self.steps == 0 {
            return Err(OdeError::invalid_settings("steps must be at least 1."));
        }
        if !(self.t_end > 0.0) || !self.t_end.is_finite() {
            return Err(OdeError::invalid_settings(format!(
                "t_end must be positive and finite, got {}.",
                self.t_end
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegrationReport {
    pub steps: usize,
    pub t_end: f64,
    /// Total Newton iterations over all steps (0 for explicit schemes).
    pub newton_iterations: usize,
}

/// Advances `y` from `t = 0` to `settings.t_end` in `settings.steps` uniform steps.
///
/// `observer(t, y)` runs once after every accepted step, in increasing `t`. An
/// observer error or a failed step aborts the run; `y` is then left at the last
/// state the stepper produced.
pub fn integrate<S, F, O>(
    stepper: &mut S,
    rhs: &F,
    y: &mut [f64],
    settings: IntegrationSettings,
    mut observer: O,
) -> Result<IntegrationReport>
where
    S: Steppable,
    F: NonlinearFunction + ?Sized,
    O: FnMut(f64, &[f64]) -> anyhow::Result<()>,
{
    settings.validate()?;
    ensure_dimension("right-hand side (dim_f vs dim_x)", rhs.dim_x(), rhs.dim_f())?;
    ensure_dimension("initial state", rhs.dim_x(), y.len())?;

    let h = settings.step_size();
    debug!(
        scheme = S::NAME,
        steps = settings.steps,
        step_size = h,
        dim = y.len(),
        "integration started"
    );

    let mut newton_iterations = 0;
    for n in 0..settings.steps {
        let mut t = n as f64 * h;
        newton_iterations += stepper.step(rhs, &mut t, y, h)?;

        // Recompute from the index so rounding does not accumulate over the run.
        t = if n + 1 == settings.steps {
            settings.t_end
        } else {
            (n + 1) as f64 * h
        };
        trace!(step = n + 1, t, "step accepted");
        observer(t, y).map_err(OdeError::Observer)?;
    }

    debug!(newton_iterations, "integration completed");
    Ok(IntegrationReport {
        steps: settings.steps,
        t_end: settings.t_end,
        newton_iterations,
    })
}

/// Integrates `y' = rhs(y)` with [`ExplicitEuler`].
pub fn solve_ode_explicit_euler<F, O>(
    rhs: &F,
    y: &mut [f64],
    settings: IntegrationSettings,
    observer: O,
) -> Result<IntegrationReport>
where
    F: NonlinearFunction + ?Sized,
    O: FnMut(f64, &[f64]) -> anyhow::Result<()>,
{
    let mut stepper = ExplicitEuler::new(y.len());
    integrate(&mut stepper, rhs, y, settings, observer)
}

/// Integrates `y' = rhs(y)` with [`ImplicitEuler`].
pub fn solve_ode_implicit_euler<F, O>(
    rhs: &F,
    y: &mut [f64],
    settings: IntegrationSettings,
    newton: NewtonSettings,
    observer: O,
) -> Result<IntegrationReport>
where
    F: NonlinearFunction + ?Sized,
    O: FnMut(f64, &[f64]) -> anyhow::Result<()>,
{
    let mut stepper = ImplicitEuler::with_settings(y.len(), newton);
    integrate(&mut stepper, rhs, y, settings, observer)
}
