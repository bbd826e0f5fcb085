use nalgebra::DMatrix;

use crate::traits::{DerivativeKind, NonlinearFunction};

/// Undamped unit oscillator `x0' = x1`, `x1' = -x0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HarmonicOscillator;

impl NonlinearFunction for HarmonicOscillator {
    fn dim_x(&self) -> usize {
        2
    }

    fn dim_f(&self) -> usize {
        2
    }

    fn evaluate(&self, x: &[f64], f: &mut [f64]) {
        f[0] = x[1];
        f[1] = -x[0];
    }

    fn evaluate_deriv(&self, _x: &[f64], df: &mut DMatrix<f64>) {
        df.fill(0.0);
        df[(0, 1)] = 1.0;
        df[(1, 0)] = -1.0;
    }

    fn derivative_kind(&self) -> DerivativeKind {
        DerivativeKind::Exact
    }
}

/// Scalar linear ODE `y' = rate * y`.
#[derive(Debug, Clone, Copy)]
pub struct LinearDecay {
    pub rate: f64,
}

impl LinearDecay {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }
}

impl NonlinearFunction for LinearDecay {
    fn dim_x(&self) -> usize {
        1
    }

    fn dim_f(&self) -> usize {
        1
    }

    fn evaluate(&self, x: &[f64], f: &mut [f64]) {
        f[0] = self.rate * x[0];
    }

    fn evaluate_deriv(&self, _x: &[f64], df: &mut DMatrix<f64>) {
        df[(0, 0)] = self.rate;
    }

    fn derivative_kind(&self) -> DerivativeKind {
        DerivativeKind::Exact
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::central_difference_jacobian;

    #[test]
    fn exact_derivatives_agree_with_finite_differences() {
        let x = [0.3, -1.2];
        let mut exact = DMatrix::zeros(2, 2);
        let mut approx = DMatrix::zeros(2, 2);
        HarmonicOscillator.evaluate_deriv(&x, &mut exact);
        central_difference_jacobian(&HarmonicOscillator, &x, 1e-6, &mut approx);
        assert!((exact - approx).amax() < 1e-8);

        let decay = LinearDecay::new(-2.5);
        let mut exact = DMatrix::zeros(1, 1);
        let mut approx = DMatrix::zeros(1, 1);
        decay.evaluate_deriv(&[4.0], &mut exact);
        central_difference_jacobian(&decay, &[4.0], 1e-6, &mut approx);
        assert!((exact[(0, 0)] - approx[(0, 0)]).abs() < 1e-8);
    }

    #[test]
    fn oscillator_rotates_state() {
        let mut f = [0.0; 2];
        HarmonicOscillator.evaluate(&[1.0, 0.0], &mut f);
        assert_eq!(f, [0.0, -1.0]);
    }
}
