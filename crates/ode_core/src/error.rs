//! Error type shared by the Newton solver, the integrators and the model adapters.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OdeError>;

#[derive(Debug, Error)]
pub enum OdeError {
    /// Newton iteration exhausted its step budget without the residual norm
    /// dropping below the tolerance.
    #[error("Newton did not converge after {iterations} iterations (‖F(x)‖ = {residual:.3e})")]
    ConvergenceFailure { iterations: usize, residual: f64 },

    /// The dense LU solve of the Newton step failed.
    #[error("Jacobian is singular at Newton iteration {iteration}")]
    SingularJacobian { iteration: usize },

    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// The per-step observer failed; the integration was aborted.
    #[error("Observer failed: {0}")]
    Observer(#[source] anyhow::Error),
}

impl OdeError {
    pub fn dimension_mismatch(context: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            actual,
        }
    }

    pub fn invalid_settings(message: impl Into<String>) -> Self {
        Self::InvalidSettings(message.into())
    }
}

/// Fails with [`OdeError::DimensionMismatch`] unless `actual == expected`.
pub(crate) fn ensure_dimension(context: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(OdeError::dimension_mismatch(context, expected, actual));
    }
    Ok(())
}
