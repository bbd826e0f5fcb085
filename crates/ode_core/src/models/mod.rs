//! Example right-hand sides built on [`NonlinearFunction`](crate::traits::NonlinearFunction).
//!
//! Integrators and the Newton solver only see the trait; nothing in the core
//! depends on a concrete model.

mod linear;
mod mass_spring;
mod rc_network;

pub use linear::{HarmonicOscillator, LinearDecay};
pub use mass_spring::{
    Connector, ConnectorKind, Fix, Mass, MassSpringFunction, MassSpringSystem, Spring,
};
pub use rc_network::RcNetwork;
