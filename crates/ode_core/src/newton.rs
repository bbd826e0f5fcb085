//! Newton-Raphson root finder.
//!
//! Plain full-step Newton: no damping, no line search, Jacobian recomputed every
//! iteration. The iterate is updated in place on the caller's buffer.
//!
//! Convergence convention: the error reported for iteration `i` is `‖F(x_i)‖₂`,
//! the norm of the residual that produced the step just applied. When that error
//! drops below the tolerance the solver returns right away, so the returned `x`
//! is `x_{i+1}`, one Newton step past the last checked residual.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{ensure_dimension, OdeError, Result};
use crate::linalg::{l2_norm, solve_dense};
use crate::traits::NonlinearFunction;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtonSettings {
    pub tolerance: f64,
    pub max_steps: usize,
}

impl Default for NewtonSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_steps: 20,
        }
    }
}

impl NewtonSettings {
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(OdeError::invalid_settings(
                "max_steps must be greater than zero.",
            ));
        }
        if !(self.tolerance > 0.0) {
            return Err(OdeError::invalid_settings("tolerance must be positive."));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewtonReport {
    /// Number of Newton steps applied to `x`.
    pub iterations: usize,
    /// Norm of the last checked residual (see the module docs).
    pub residual_norm: f64,
}

/// Drives `func` to zero starting from `x`, overwriting `x` with the root.
pub fn newton_solve<F>(func: &F, x: &mut [f64], settings: NewtonSettings) -> Result<NewtonReport>
where
    F: NonlinearFunction + ?Sized,
{
    newton_loop(func, x, settings, None)
}

/// Like [`newton_solve`], calling `callback(iteration, residual_norm, x)` after
/// every update of `x`.
pub fn newton_solve_with_callback<F, C>(
    func: &F,
    x: &mut [f64],
    settings: NewtonSettings,
    mut callback: C,
) -> Result<NewtonReport>
where
    F: NonlinearFunction + ?Sized,
    C: FnMut(usize, f64, &[f64]),
{
    let callback: &mut dyn FnMut(usize, f64, &[f64]) = &mut callback;
    newton_loop(func, x, settings, Some(callback))
}

fn newton_loop<F>(
    func: &F,
    x: &mut [f64],
    settings: NewtonSettings,
    mut callback: Option<&mut dyn FnMut(usize, f64, &[f64])>,
) -> Result<NewtonReport>
where
    F: NonlinearFunction + ?Sized,
{
    settings.validate()?;
    let dim = func.dim_x();
    ensure_dimension("Newton residual (dim_f vs dim_x)", dim, func.dim_f())?;
    ensure_dimension("Newton initial guess", dim, x.len())?;

    let mut residual = vec![0.0; dim];
    let mut jacobian = DMatrix::zeros(dim, dim);
    let mut err = f64::INFINITY;

    for iteration in 0..settings.max_steps {
        func.evaluate(x, &mut residual);
        func.evaluate_deriv(x, &mut jacobian);

        // The LU decomposition consumes its matrix; the buffer is refilled next round.
        let lu_input = std::mem::replace(&mut jacobian, DMatrix::zeros(dim, dim));
        let delta =
            solve_dense(lu_input, &residual).ok_or(OdeError::SingularJacobian { iteration })?;
        for (xi, di) in x.iter_mut().zip(delta.iter()) {
            *xi -= di;
        }

        err = l2_norm(&residual);
        trace!(iteration, residual_norm = err, "newton iteration");
        if let Some(cb) = callback.as_mut() {
            cb(iteration, err, x);
        }
        if err < settings.tolerance {
            debug!(
                iterations = iteration + 1,
                residual_norm = err,
                derivative = ?func.derivative_kind(),
                "newton converged"
            );
            return Ok(NewtonReport {
                iterations: iteration + 1,
                residual_norm: err,
            });
        }
    }

    warn!(
        max_steps = settings.max_steps,
        residual_norm = err,
        "newton did not converge"
    );
    Err(OdeError::ConvergenceFailure {
        iterations: settings.max_steps,
        residual: err,
    })
}
