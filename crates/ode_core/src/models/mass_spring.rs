//! Networks of point masses joined by linear springs, in `D` dimensions.
//!
//! The flat state layout used everywhere here is `N x D` row-major: entry
//! `i * D + k` is coordinate `k` of mass `i`.

use std::fmt;

use nalgebra::SVector;

use crate::error::{ensure_dimension, Result};
use crate::linalg::{add_to_row, row, scale_row, set_row};
use crate::traits::NonlinearFunction;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mass<const D: usize> {
    pub mass: f64,
    pub pos: SVector<f64, D>,
    pub vel: SVector<f64, D>,
    pub acc: SVector<f64, D>,
}

impl<const D: usize> Mass<D> {
    /// A mass at rest at `pos`.
    pub fn new(mass: f64, pos: SVector<f64, D>) -> Self {
        Self {
            mass,
            pos,
            vel: SVector::zeros(),
            acc: SVector::zeros(),
        }
    }
}

/// Immovable anchor point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix<const D: usize> {
    pub pos: SVector<f64, D>,
}

impl<const D: usize> Fix<D> {
    pub fn new(pos: SVector<f64, D>) -> Self {
        Self { pos }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorKind {
    Fix,
    Mass,
}

/// Reference to a spring endpoint: either a fix or a mass, by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connector {
    pub kind: ConnectorKind,
    pub index: usize,
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ConnectorKind::Fix => "fix",
            ConnectorKind::Mass => "mass",
        };
        write!(f, "kind = {kind}, index = {}", self.index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    /// Rest length.
    pub length: f64,
    pub stiffness: f64,
    pub connections: [Connector; 2],
}

impl Spring {
    pub fn new(length: f64, stiffness: f64, first: Connector, second: Connector) -> Self {
        Self {
            length,
            stiffness,
            connections: [first, second],
        }
    }
}

#[derive(Debug, Clone)]
pub struct MassSpringSystem<const D: usize> {
    fixes: Vec<Fix<D>>,
    masses: Vec<Mass<D>>,
    springs: Vec<Spring>,
    gravity: SVector<f64, D>,
}

impl<const D: usize> Default for MassSpringSystem<D> {
    fn default() -> Self {
        Self {
            fixes: Vec::new(),
            masses: Vec::new(),
            springs: Vec::new(),
            gravity: SVector::zeros(),
        }
    }
}

impl<const D: usize> MassSpringSystem<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_gravity(&mut self, gravity: SVector<f64, D>) {
        self.gravity = gravity;
    }

    pub fn gravity(&self) -> SVector<f64, D> {
        self.gravity
    }

    pub fn add_fix(&mut self, fix: Fix<D>) -> Connector {
        self.fixes.push(fix);
        Connector {
            kind: ConnectorKind::Fix,
            index: self.fixes.len() - 1,
        }
    }

    pub fn add_mass(&mut self, mass: Mass<D>) -> Connector {
        self.masses.push(mass);
        Connector {
            kind: ConnectorKind::Mass,
            index: self.masses.len() - 1,
        }
    }

    /// Returns the index of the new spring.
    pub fn add_spring(&mut self, spring: Spring) -> usize {
        self.springs.push(spring);
        self.springs.len() - 1
    }

    pub fn masses(&self) -> &[Mass<D>] {
        &self.masses
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    /// Length of a flat position (or velocity, acceleration) buffer: `D * N`.
    pub fn state_dimension(&self) -> usize {
        D * self.masses.len()
    }

    /// Copies positions, velocities and accelerations of all masses into three
    /// flat `N x D` buffers.
    pub fn get_state(
        &self,
        values: &mut [f64],
        dvalues: &mut [f64],
        ddvalues: &mut [f64],
    ) -> Result<()> {
        self.check_buffers(values.len(), dvalues.len(), ddvalues.len())?;
        for (i, mass) in self.masses.iter().enumerate() {
            set_row(values, i, &mass.pos);
            set_row(dvalues, i, &mass.vel);
            set_row(ddvalues, i, &mass.acc);
        }
        Ok(())
    }

    /// Inverse of [`get_state`](Self::get_state).
    pub fn set_state(&mut self, values: &[f64], dvalues: &[f64], ddvalues: &[f64]) -> Result<()> {
        self.check_buffers(values.len(), dvalues.len(), ddvalues.len())?;
        for (i, mass) in self.masses.iter_mut().enumerate() {
            mass.pos = row(values, i);
            mass.vel = row(dvalues, i);
            mass.acc = row(ddvalues, i);
        }
        Ok(())
    }

    fn check_buffers(&self, values: usize, dvalues: usize, ddvalues: usize) -> Result<()> {
        let dim = self.state_dimension();
        ensure_dimension("mass-spring positions", dim, values)?;
        ensure_dimension("mass-spring velocities", dim, dvalues)?;
        ensure_dimension("mass-spring accelerations", dim, ddvalues)
    }

    fn endpoint(&self, connector: Connector, positions: &[f64]) -> SVector<f64, D> {
        match connector.kind {
            ConnectorKind::Fix => self.fixes[connector.index].pos,
            ConnectorKind::Mass => row(positions, connector.index),
        }
    }
}

impl<const D: usize> fmt::Display for MassSpringSystem<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "fixes:")?;
        for fix in &self.fixes {
            writeln!(f, "{:?}", fix.pos.as_slice())?;
        }
        writeln!(f, "masses:")?;
        for mass in &self.masses {
            writeln!(f, "m = {}, pos = {:?}", mass.mass, mass.pos.as_slice())?;
        }
        writeln!(f, "springs:")?;
        for spring in &self.springs {
            writeln!(
                f,
                "length = {}, stiffness = {}, C1 = {}, C2 = {}",
                spring.length, spring.stiffness, spring.connections[0], spring.connections[1]
            )?;
        }
        Ok(())
    }
}

/// Accelerations of all masses as a function of their positions.
///
/// Each mass feels `m * gravity` plus, for every attached spring, a Hooke force
/// `k (|p2 - p1| - L)` along the spring. Coincident spring endpoints are outside
/// the domain. The Jacobian is the finite-difference default.
pub struct MassSpringFunction<'a, const D: usize> {
    system: &'a MassSpringSystem<D>,
}

impl<'a, const D: usize> MassSpringFunction<'a, D> {
    pub fn new(system: &'a MassSpringSystem<D>) -> Self {
        Self { system }
    }
}

impl<const D: usize> NonlinearFunction for MassSpringFunction<'_, D> {
    fn dim_x(&self) -> usize {
        self.system.state_dimension()
    }

    fn dim_f(&self) -> usize {
        self.system.state_dimension()
    }

    fn evaluate(&self, x: &[f64], f: &mut [f64]) {
        debug_assert_eq!(x.len(), self.dim_x());
        debug_assert_eq!(f.len(), self.dim_f());

        let masses = self.system.masses();
        for (i, mass) in masses.iter().enumerate() {
            set_row(f, i, &(mass.mass * self.system.gravity()));
        }

        for spring in self.system.springs() {
            let [c1, c2] = spring.connections;
            let p1 = self.system.endpoint(c1, x);
            let p2 = self.system.endpoint(c2, x);

            let delta = p2 - p1;
            let distance = delta.norm();
            let force = spring.stiffness * (distance - spring.length);
            let dir12 = delta / distance;

            if c1.kind == ConnectorKind::Mass {
                add_to_row(f, c1.index, &(force * dir12));
            }
            if c2.kind == ConnectorKind::Mass {
                add_to_row(f, c2.index, &(-force * dir12));
            }
        }

        for (i, mass) in masses.iter().enumerate() {
            scale_row::<D>(f, i, 1.0 / mass.mass);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::newton::{newton_solve, NewtonSettings};
    use crate::traits::DerivativeKind;
    use nalgebra::{Vector2, Vector3};

    fn hanging_mass() -> MassSpringSystem<2> {
        let mut system = MassSpringSystem::new();
        system.set_gravity(Vector2::new(0.0, -9.81));
        let anchor = system.add_fix(Fix::new(Vector2::new(0.0, 0.0)));
        let bob = system.add_mass(Mass::new(1.0, Vector2::new(0.0, -1.5)));
        system.add_spring(Spring::new(1.0, 10.0, anchor, bob));
        system
    }

    fn assert_err_contains<T: std::fmt::Debug>(result: Result<T>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    #[test]
    fn builders_return_connectors_and_indices() {
        let mut system = MassSpringSystem::<3>::new();
        let fix = system.add_fix(Fix::new(Vector3::zeros()));
        let first = system.add_mass(Mass::new(1.0, Vector3::new(1.0, 0.0, 0.0)));
        let second = system.add_mass(Mass::new(2.0, Vector3::new(2.0, 0.0, 0.0)));

        assert_eq!(fix, Connector { kind: ConnectorKind::Fix, index: 0 });
        assert_eq!(second, Connector { kind: ConnectorKind::Mass, index: 1 });
        assert_eq!(system.add_spring(Spring::new(1.0, 1.0, fix, first)), 0);
        assert_eq!(system.add_spring(Spring::new(1.0, 1.0, first, second)), 1);
        assert_eq!(system.state_dimension(), 6);
        assert_eq!(format!("{second}"), "kind = mass, index = 1");
    }

    #[test]
    fn set_state_then_get_state_round_trips() {
        let mut system = MassSpringSystem::<3>::new();
        for i in 0..4 {
            system.add_mass(Mass::new(1.0 + i as f64, Vector3::zeros()));
        }
        let n = system.state_dimension();
        assert_eq!(n, 12);

        let values: Vec<f64> = (0..n).map(|i| i as f64 * 0.5).collect();
        let dvalues: Vec<f64> = (0..n).map(|i| -(i as f64)).collect();
        let ddvalues: Vec<f64> = (0..n).map(|i| (i as f64).sqrt()).collect();
        system
            .set_state(&values, &dvalues, &ddvalues)
            .expect("buffers have the right size");

        assert_eq!(system.masses()[1].pos, Vector3::new(1.5, 2.0, 2.5));

        let mut out = (vec![0.0; n], vec![0.0; n], vec![0.0; n]);
        system
            .get_state(&mut out.0, &mut out.1, &mut out.2)
            .expect("buffers have the right size");
        assert_eq!(out.0, values);
        assert_eq!(out.1, dvalues);
        assert_eq!(out.2, ddvalues);
    }

    #[test]
    fn state_buffers_must_match_mass_count() {
        let mut system = hanging_mass();
        let mut short = vec![0.0; 1];
        let mut ok = vec![0.0; 2];
        let mut ok2 = vec![0.0; 2];
        assert_err_contains(
            system.get_state(&mut short, &mut ok, &mut ok2),
            "mass-spring positions",
        );
        assert_err_contains(
            system.set_state(&[0.0; 2], &[0.0; 2], &[0.0; 3]),
            "mass-spring accelerations",
        );
    }

    #[test]
    fn stretched_spring_pulls_mass_towards_anchor() {
        let mut system = hanging_mass();
        system.set_gravity(Vector2::zeros());
        let function = MassSpringFunction::new(&system);
        let mut acc = [0.0; 2];
        function.evaluate(&[0.0, -1.5], &mut acc);

        assert!(acc[0].abs() < 1e-15);
        assert!((acc[1] - 5.0).abs() < 1e-12);
        assert_eq!(function.derivative_kind(), DerivativeKind::FiniteDifference);
    }

    #[test]
    fn newton_finds_static_equilibrium_of_hanging_chain() {
        let mut system = MassSpringSystem::<2>::new();
        system.set_gravity(Vector2::new(0.0, -9.81));
        let anchor = system.add_fix(Fix::new(Vector2::zeros()));
        let upper = system.add_mass(Mass::new(1.0, Vector2::new(0.0, -1.2)));
        let lower = system.add_mass(Mass::new(0.5, Vector2::new(0.1, -2.3)));
        system.add_spring(Spring::new(1.0, 40.0, anchor, upper));
        system.add_spring(Spring::new(1.0, 40.0, upper, lower));

        let function = MassSpringFunction::new(&system);
        let mut x = vec![0.0; system.state_dimension()];
        let mut v = x.clone();
        let mut a = x.clone();
        system.get_state(&mut x, &mut v, &mut a).expect("buffers have the right size");

        newton_solve(&function, &mut x, NewtonSettings::default())
            .expect("equilibrium should be found");

        // Upper spring carries both masses, lower spring only the lower one.
        let upper_stretch = 1.5 * 9.81 / 40.0;
        let lower_stretch = 0.5 * 9.81 / 40.0;
        assert!(x[0].abs() < 1e-8);
        assert!((x[1] + 1.0 + upper_stretch).abs() < 1e-8);
        assert!(x[2].abs() < 1e-8);
        assert!((x[3] + 2.0 + upper_stretch + lower_stretch).abs() < 1e-8);
    }

    #[test]
    fn display_lists_all_parts() {
        let text = format!("{}", hanging_mass());
        assert!(text.contains("fixes:"));
        assert!(text.contains("m = 1, pos = [0.0, -1.5]"));
        assert!(text.contains("C1 = kind = fix, index = 0, C2 = kind = mass, index = 0"));
    }
}
