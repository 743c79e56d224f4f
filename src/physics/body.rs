//! Three-body state types

use crate::physics::math::{Scalar, Vector};
use std::ops::{Index, IndexMut};

/// Number of bodies in a system
pub const BODY_COUNT: usize = 3;

/// A unit-mass body in phase space
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Body {
    pub position: Vector,
    pub velocity: Vector,
}

impl Body {
    pub fn new(position: Vector, velocity: Vector) -> Self {
        Self { position, velocity }
    }

    #[inline]
    pub fn speed(&self) -> Scalar {
        self.velocity.length()
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

/// Exactly three bodies, advanced in place by an integrator.
///
/// Every orbit computation owns its own system, which is what allows
/// independent orbits to be computed in parallel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThreeBodySystem {
    pub bodies: [Body; BODY_COUNT],
}

impl ThreeBodySystem {
    pub fn new(bodies: [Body; BODY_COUNT]) -> Self {
        Self { bodies }
    }

    /// Three bodies at rest on the vertices of an equilateral triangle in the
    /// xy plane, centered on the origin.
    pub fn equilateral(radius: Scalar) -> Self {
        let body_at = |angle: Scalar| {
            Body::new(
                Vector::new(radius * libm::cos(angle), radius * libm::sin(angle), 0.0),
                Vector::ZERO,
            )
        };

        let third = 2.0 * std::f64::consts::PI / 3.0;
        Self::new([body_at(0.0), body_at(third), body_at(2.0 * third)])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.bodies.iter_mut()
    }

    pub fn is_finite(&self) -> bool {
        self.bodies.iter().all(Body::is_finite)
    }

    /// Largest absolute difference in any phase-space coordinate
    pub fn max_abs_difference(&self, other: &Self) -> Scalar {
        self.bodies
            .iter()
            .zip(other.bodies.iter())
            .map(|(a, b)| {
                (a.position - b.position)
                    .abs()
                    .max_element()
                    .max((a.velocity - b.velocity).abs().max_element())
            })
            .fold(0.0, Scalar::max)
    }

    /// Total energy of the system with unit masses and G = 1
    pub fn energy(&self) -> Scalar {
        let kinetic: Scalar = self
            .bodies
            .iter()
            .map(|b| 0.5 * b.velocity.length_squared())
            .sum();

        let mut potential = 0.0;
        for i in 0..BODY_COUNT {
            for j in (i + 1)..BODY_COUNT {
                let distance = self.bodies[i].position.distance(self.bodies[j].position);
                if distance > 0.0 {
                    potential -= 1.0 / distance;
                }
            }
        }

        kinetic + potential
    }
}

impl Index<usize> for ThreeBodySystem {
    type Output = Body;

    fn index(&self, index: usize) -> &Body {
        &self.bodies[index]
    }
}

impl IndexMut<usize> for ThreeBodySystem {
    fn index_mut(&mut self, index: usize) -> &mut Body {
        &mut self.bodies[index]
    }
}

/// One acceleration per body, recomputed from the current positions
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SystemAccels(pub [Vector; BODY_COUNT]);

impl SystemAccels {
    pub const ZERO: Self = Self([Vector::ZERO; BODY_COUNT]);
}

impl Index<usize> for SystemAccels {
    type Output = Vector;

    fn index(&self, index: usize) -> &Vector {
        &self.0[index]
    }
}

impl IndexMut<usize> for SystemAccels {
    fn index_mut(&mut self, index: usize) -> &mut Vector {
        &mut self.0[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equilateral_layout() {
        let system = ThreeBodySystem::equilateral(1.0);

        for body in system.iter() {
            assert!((body.position.length() - 1.0).abs() < 1e-12);
            assert_eq!(body.velocity, Vector::ZERO);
        }

        let side = 3.0_f64.sqrt();
        assert!((system[0].position.distance(system[1].position) - side).abs() < 1e-12);
        assert!((system[1].position.distance(system[2].position) - side).abs() < 1e-12);
        assert!((system[2].position.distance(system[0].position) - side).abs() < 1e-12);
    }

    #[test]
    fn test_max_abs_difference() {
        let a = ThreeBodySystem::equilateral(1.0);
        let mut b = a;
        assert_eq!(a.max_abs_difference(&b), 0.0);

        b[2].velocity.y += 0.25;
        assert_eq!(a.max_abs_difference(&b), 0.25);
    }

    #[test]
    fn test_energy_of_resting_triangle() {
        let system = ThreeBodySystem::equilateral(1.0);
        let expected = -3.0 / 3.0_f64.sqrt();
        assert!((system.energy() - expected).abs() < 1e-12);
    }
}
