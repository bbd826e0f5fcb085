use std::rc::Rc;
use std::sync::Arc;

use nalgebra::DMatrix;

use crate::error::Result;

/// Perturbation used by the default finite-difference Jacobian.
pub const FINITE_DIFFERENCE_EPS: f64 = 1e-8;

/// How a [`NonlinearFunction`] produces its Jacobian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivativeKind {
    /// `evaluate_deriv` is an analytic derivative of `evaluate`.
    Exact,
    /// `evaluate_deriv` is the central finite-difference fallback.
    FiniteDifference,
}

/// A vector-valued function `F: R^dim_x -> R^dim_f`.
///
/// Used both as the right-hand side of `y' = F(y)` and as the residual driven to
/// zero by the Newton solver. All methods take `&self`: a function is read-only
/// for the duration of a solve and may be shared between several solves.
pub trait NonlinearFunction {
    /// Dimension of the input state.
    fn dim_x(&self) -> usize;

    /// Dimension of the output residual.
    fn dim_f(&self) -> usize;

    /// Writes `F(x)` into `f`.
    /// x: state of length `dim_x`, not modified
    /// f: buffer of length `dim_f`
    fn evaluate(&self, x: &[f64], f: &mut [f64]);

    /// Writes the `dim_f x dim_x` Jacobian `dF/dx` at `x` into `df`.
    ///
    /// Defaults to central finite differences with [`FINITE_DIFFERENCE_EPS`],
    /// which costs `2 * dim_x` extra evaluations. Implementations that override
    /// this with an analytic derivative should also override
    /// [`derivative_kind`](Self::derivative_kind).
    fn evaluate_deriv(&self, x: &[f64], df: &mut DMatrix<f64>) {
        central_difference_jacobian(self, x, FINITE_DIFFERENCE_EPS, df);
    }

    fn derivative_kind(&self) -> DerivativeKind {
        DerivativeKind::FiniteDifference
    }
}

/// Approximates the Jacobian of `func` at `x` column by column:
/// `df[:, i] = (F(x + eps e_i) - F(x - eps e_i)) / (2 eps)`.
pub fn central_difference_jacobian<F>(func: &F, x: &[f64], eps: f64, df: &mut DMatrix<f64>)
where
    F: NonlinearFunction + ?Sized,
{
    let dim_x = func.dim_x();
    let dim_f = func.dim_f();
    debug_assert_eq!(x.len(), dim_x);
    debug_assert_eq!(df.shape(), (dim_f, dim_x));

    let mut x_left = x.to_vec();
    let mut x_right = x.to_vec();
    let mut f_left = vec![0.0; dim_f];
    let mut f_right = vec![0.0; dim_f];
    let scale = 1.0 / (2.0 * eps);

    for i in 0..dim_x {
        x_left[i] = x[i] - eps;
        x_right[i] = x[i] + eps;
        func.evaluate(&x_left, &mut f_left);
        func.evaluate(&x_right, &mut f_right);
        for row in 0..dim_f {
            df[(row, i)] = scale * (f_right[row] - f_left[row]);
        }
        x_left[i] = x[i];
        x_right[i] = x[i];
    }
}

macro_rules! forward_nonlinear_function {
    ($($pointer:ty),*) => {
        $(
            impl<F: NonlinearFunction + ?Sized> NonlinearFunction for $pointer {
                fn dim_x(&self) -> usize {
                    (**self).dim_x()
                }

                fn dim_f(&self) -> usize {
                    (**self).dim_f()
                }

                fn evaluate(&self, x: &[f64], f: &mut [f64]) {
                    (**self).evaluate(x, f)
                }

                fn evaluate_deriv(&self, x: &[f64], df: &mut DMatrix<f64>) {
                    (**self).evaluate_deriv(x, df)
                }

                fn derivative_kind(&self) -> DerivativeKind {
                    (**self).derivative_kind()
                }
            }
        )*
    };
}

forward_nonlinear_function!(&F, Box<F>, Rc<F>, Arc<F>);

/// A fixed-step time stepper.
pub trait Steppable {
    const NAME: &'static str;

    /// Performs one step of size `dt` on `y' = rhs(y)`.
    /// t: current time (updated after step)
    /// state: current state (updated after step)
    ///
    /// Returns the number of corrector iterations the step needed (0 for
    /// explicit schemes).
    fn step<F>(&mut self, rhs: &F, t: &mut f64, state: &mut [f64], dt: f64) -> Result<usize>
    where
        F: NonlinearFunction + ?Sized;
}
