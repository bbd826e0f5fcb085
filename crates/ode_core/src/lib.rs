//! The `ode_core` crate is the numerical engine behind the demo programs.
//! It advances first-order systems `y' = F(y)` over a fixed horizon in uniform steps.
//!
//! Key components:
//! - **Traits**: `NonlinearFunction` (value + Jacobian, finite-difference fallback), `Steppable` (time steppers).
//! - **Newton**: Newton-Raphson root finder, used as the corrector of implicit steps.
//! - **Solvers**: Explicit and implicit Euler steppers and the `integrate` driver with per-step observers.
//! - **Models**: Harmonic oscillator, driven RC network and mass-spring networks as example right-hand sides.

pub mod error;
pub mod first_order;
pub mod linalg;
pub mod models;
pub mod newton;
pub mod solvers;
pub mod traits;

pub use error::{OdeError, Result};
pub use first_order::FirstOrderForm;
pub use newton::{newton_solve, newton_solve_with_callback, NewtonReport, NewtonSettings};
pub use solvers::{
    integrate, solve_ode_explicit_euler, solve_ode_implicit_euler, ExplicitEuler, ImplicitEuler,
    IntegrationReport, IntegrationSettings,
};
pub use traits::{DerivativeKind, NonlinearFunction, Steppable};
