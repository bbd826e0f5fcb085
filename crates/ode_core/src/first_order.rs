use nalgebra::DMatrix;

use crate::traits::{DerivativeKind, NonlinearFunction};

/// Turns a second-order system `x'' = a(x)` into the first-order system
/// `y' = (v, a(x))` on `y = (x, v)`.
///
/// `inner` is the acceleration function; it must be square (`dim_x == dim_f`).
/// The Jacobian is `[[0, I], [a'(x), 0]]`, with `a'` taken from `inner`.
pub struct FirstOrderForm<S> {
    pub inner: S,
}

impl<S: NonlinearFunction> FirstOrderForm<S> {
    pub fn new(inner: S) -> Self {
        debug_assert_eq!(inner.dim_x(), inner.dim_f());
        Self { inner }
    }

    fn half(&self) -> usize {
        self.inner.dim_x()
    }
}

impl<S: NonlinearFunction> NonlinearFunction for FirstOrderForm<S> {
    fn dim_x(&self) -> usize {
        2 * self.half()
    }

    fn dim_f(&self) -> usize {
        2 * self.half()
    }

    fn evaluate(&self, y: &[f64], f: &mut [f64]) {
        let n = self.half();
        let (positions, velocities) = y.split_at(n);
        let (dx, dv) = f.split_at_mut(n);
        dx.copy_from_slice(velocities);
        self.inner.evaluate(positions, dv);
    }

    fn evaluate_deriv(&self, y: &[f64], df: &mut DMatrix<f64>) {
        let n = self.half();
        let mut acceleration_jacobian = DMatrix::zeros(n, n);
        self.inner.evaluate_deriv(&y[..n], &mut acceleration_jacobian);

        df.fill(0.0);
        df.view_mut((0, n), (n, n)).fill_diagonal(1.0);
        df.view_mut((n, 0), (n, n)).copy_from(&acceleration_jacobian);
    }

    fn derivative_kind(&self) -> DerivativeKind {
        self.inner.derivative_kind()
    }
}
