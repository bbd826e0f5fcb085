use std::f64::consts::PI;

use nalgebra::DMatrix;

use crate::traits::{DerivativeKind, NonlinearFunction};

/// Series RC circuit driven by `cos(ω t)`, time carried in the state.
///
/// State is `(t, u_C)`:
/// `t' = 1`, `u_C' = (cos(ω t) - u_C) / (R C)`.
#[derive(Debug, Clone, Copy)]
pub struct RcNetwork {
    /// Ohm
    pub resistance: f64,
    /// Farad
    pub capacitance: f64,
    /// rad/s
    pub drive_angular_frequency: f64,
}

impl Default for RcNetwork {
    fn default() -> Self {
        Self {
            resistance: 1.0,
            capacitance: 1e-3,
            drive_angular_frequency: 100.0 * PI,
        }
    }
}

impl RcNetwork {
    pub fn time_constant(&self) -> f64 {
        self.resistance * self.capacitance
    }
}

impl NonlinearFunction for RcNetwork {
    fn dim_x(&self) -> usize {
        2
    }

    fn dim_f(&self) -> usize {
        2
    }

    fn evaluate(&self, x: &[f64], f: &mut [f64]) {
        let omega = self.drive_angular_frequency;
        f[0] = 1.0;
        f[1] = ((omega * x[0]).cos() - x[1]) / self.time_constant();
    }

    fn evaluate_deriv(&self, x: &[f64], df: &mut DMatrix<f64>) {
        let omega = self.drive_angular_frequency;
        let inv_tau = 1.0 / self.time_constant();
        df.fill(0.0);
        df[(1, 0)] = -inv_tau * omega * (omega * x[0]).sin();
        df[(1, 1)] = -inv_tau;
    }

    fn derivative_kind(&self) -> DerivativeKind {
        DerivativeKind::Exact
    }
}
