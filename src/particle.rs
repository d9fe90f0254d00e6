//! Grain particle state.

use crate::geometry::SENTINEL_Y;
use glam::Vec3;

/// A single grain particle.
///
/// `layer` and `initial_position` are fixed at creation; the latter is the
/// only thing a reset reads from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Stable identity: `layer * particles_per_layer + index_in_layer`.
    pub id: u32,
    /// Silo-local position.
    pub position: Vec3,
    /// Current velocity.
    pub velocity: Vec3,
    layer: u32,
    initial_position: Vec3,
}

impl Particle {
    /// Create a particle at rest at its initial position.
    pub fn new(id: u32, layer: u32, initial_position: Vec3) -> Self {
        Self {
            id,
            position: initial_position,
            velocity: Vec3::ZERO,
            layer,
            initial_position,
        }
    }

    #[inline]
    pub fn layer(&self) -> u32 {
        self.layer
    }

    #[inline]
    pub fn initial_position(&self) -> Vec3 {
        self.initial_position
    }

    /// Put the particle back where it started, at rest.
    #[inline]
    pub fn reset(&mut self) {
        self.position = self.initial_position;
        self.velocity = Vec3::ZERO;
    }

    /// Whether the particle has been parked at the sentinel.
    #[inline]
    pub fn is_recycled(&self) -> bool {
        self.position.y <= SENTINEL_Y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SENTINEL;

    #[test]
    fn test_particle_creation() {
        let p = Particle::new(3, 1, Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(p.position, Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(p.velocity, Vec3::ZERO);
        assert_eq!(p.layer(), 1);
        assert!(!p.is_recycled());
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut p = Particle::new(0, 0, Vec3::ONE);
        p.position = SENTINEL;
        p.velocity = Vec3::new(0.0, -4.0, 0.0);
        assert!(p.is_recycled());

        p.reset();
        assert_eq!(p.position, Vec3::ONE);
        assert_eq!(p.velocity, Vec3::ZERO);
        assert_eq!(p.initial_position(), Vec3::ONE);
    }
}
