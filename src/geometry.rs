//! Silo boundary queries.
//!
//! A silo is a cylinder standing on an inverted cone (a frustum, since the
//! apex is cut off at the outlet). All queries here are pure and total: they
//! return a sensible value for every finite height.

use crate::config::SiloConfig;
use glam::{Vec2, Vec3};

/// Radial distances below this are treated as "on the axis".
pub(crate) const AXIS_EPSILON: f32 = 1e-6;

/// Height recycled particles are parked at, far below anything visible.
pub const SENTINEL_Y: f32 = -1000.0;

/// Parking spot for recycled particles.
pub const SENTINEL: Vec3 = Vec3::new(0.0, SENTINEL_Y, 0.0);

/// Boundary description of one silo, in silo-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiloGeometry {
    pub radius: f32,
    pub cylinder_height: f32,
    pub cone_height: f32,
    pub outlet_radius: f32,
    pub wall_margin: f32,
    outlet_exit_y: f32,
    kill_y: f32,
}

impl SiloGeometry {
    pub fn new(config: &SiloConfig) -> Self {
        Self {
            radius: config.radius,
            cylinder_height: config.cylinder_height,
            cone_height: config.cone_height,
            outlet_radius: config.outlet_radius,
            wall_margin: config.wall_margin,
            outlet_exit_y: -config.cone_height - config.outlet_exit_drop,
            kill_y: config.kill_y,
        }
    }

    /// Height of the outlet (bottom of the cone).
    #[inline]
    pub fn cone_bottom(&self) -> f32 {
        -self.cone_height
    }

    /// Height of the top of the cylinder.
    #[inline]
    pub fn top(&self) -> f32 {
        self.cylinder_height
    }

    /// Below this height a particle has left the silo and falls freely.
    #[inline]
    pub fn outlet_exit_y(&self) -> f32 {
        self.outlet_exit_y
    }

    /// Below this height a falling particle is recycled.
    #[inline]
    pub fn kill_y(&self) -> f32 {
        self.kill_y
    }

    /// How far up the cone `y` sits: 0 at the outlet, 1 at the cone top.
    ///
    /// Clamped, so heights above the cone give 1 and heights below give 0.
    #[inline]
    pub fn cone_progress(&self, y: f32) -> f32 {
        ((y - self.cone_bottom()) / self.cone_height).clamp(0.0, 1.0)
    }

    /// Wall radius at height `y`.
    ///
    /// Constant in the cylinder, linear in the cone, and the outlet radius
    /// below the cone bottom.
    pub fn max_radius_at(&self, y: f32) -> f32 {
        if y >= 0.0 {
            self.radius
        } else {
            self.outlet_radius + (self.radius - self.outlet_radius) * self.cone_progress(y)
        }
    }

    /// Largest radius a particle may occupy at height `y`.
    #[inline]
    pub fn allowed_radius_at(&self, y: f32) -> f32 {
        (self.max_radius_at(y) - self.wall_margin).max(0.0)
    }

    /// Whether `position` is still inside the silo body.
    #[inline]
    pub fn is_in_body(&self, position: Vec3) -> bool {
        position.y >= self.outlet_exit_y
    }

    /// Whether `position` lies within the wall bound at its height.
    pub fn within_wall(&self, position: Vec3) -> bool {
        radial(position).length() <= self.allowed_radius_at(position.y) + AXIS_EPSILON
    }

    /// Position pushed back inside the wall, or `None` if already inside.
    ///
    /// A particle on the axis never needs pushing.
    pub fn clamp_radial(&self, position: Vec3) -> Option<Vec3> {
        let horizontal = radial(position);
        let distance = horizontal.length();
        let allowed = self.allowed_radius_at(position.y);
        if distance <= allowed || distance < AXIS_EPSILON {
            return None;
        }
        let scaled = horizontal * (allowed / distance);
        Some(Vec3::new(scaled.x, position.y, scaled.y))
    }
}

/// Horizontal (XZ) offset of `position` from the silo axis.
#[inline]
pub fn radial(position: Vec3) -> Vec2 {
    Vec2::new(position.x, position.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> SiloGeometry {
        SiloGeometry::new(&SiloConfig::default())
    }

    #[test]
    fn test_cylinder_radius_is_constant() {
        let g = geometry();
        assert_eq!(g.max_radius_at(0.0), 1.2);
        assert_eq!(g.max_radius_at(2.5), 1.2);
        assert_eq!(g.max_radius_at(100.0), 1.2);
    }

    #[test]
    fn test_cone_interpolates_linearly() {
        let g = geometry();
        assert!((g.max_radius_at(-1.5) - 0.18).abs() < 1e-6);
        let mid = 0.18 + (1.2 - 0.18) * 0.5;
        assert!((g.max_radius_at(-0.75) - mid).abs() < 1e-6);
        assert!(g.max_radius_at(-0.1) < 1.2);
    }

    #[test]
    fn test_below_outlet_uses_outlet_radius() {
        let g = geometry();
        assert!((g.max_radius_at(-2.0) - 0.18).abs() < 1e-6);
        assert!((g.max_radius_at(-1e6) - 0.18).abs() < 1e-6);
    }

    #[test]
    fn test_exit_and_kill_heights() {
        let g = geometry();
        assert!((g.outlet_exit_y() - (-1.55)).abs() < 1e-6);
        assert!(g.kill_y() < g.outlet_exit_y());
        assert!(SENTINEL_Y < g.kill_y());
    }

    #[test]
    fn test_clamp_radial() {
        let g = geometry();
        let outside = Vec3::new(3.0, 1.0, 4.0);
        let clamped = g.clamp_radial(outside).unwrap();
        assert!((radial(clamped).length() - (1.2 - 0.04)).abs() < 1e-5);
        assert_eq!(clamped.y, 1.0);
        // Direction is preserved
        assert!((clamped.x / clamped.z - 0.75).abs() < 1e-5);

        assert_eq!(g.clamp_radial(Vec3::new(0.1, 1.0, 0.1)), None);
    }

    #[test]
    fn test_clamp_on_axis_is_noop() {
        let g = geometry();
        assert_eq!(g.clamp_radial(Vec3::new(0.0, -1.5, 0.0)), None);
        assert_eq!(g.clamp_radial(SENTINEL), None);
        assert!(g.within_wall(SENTINEL));
    }
}
