//! The per-particle integration step.
//!
//! Each particle is advanced independently of every other one, so the step
//! is a plain function over one particle and a shared, read-only context.
//!
//! Order of operations for a particle still in the silo:
//!
//! 1. gravity (scaled by flow speed)
//! 2. funnel damping by radial band
//! 3. pull toward the axis inside the cone
//! 4. position integration
//! 5. wall clamp
//!
//! Once a particle drops below the outlet it only falls straight down until
//! it is recycled at the kill height.

use crate::config::FunnelTuning;
use crate::controls::{FlowControls, Mode};
use crate::geometry::{radial, SiloGeometry, AXIS_EPSILON, SENTINEL};
use crate::particle::Particle;
use glam::Vec3;

/// Where a particle ended up after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Inside the silo body.
    InSilo,
    /// Below the outlet, falling toward the bin.
    Falling,
    /// Parked at the sentinel until the next reset.
    Recycled,
}

/// Shared inputs for one frame's worth of steps.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub geometry: &'a SiloGeometry,
    pub tuning: &'a FunnelTuning,
    pub controls: FlowControls,
    pub dt: f32,
}

impl StepContext<'_> {
    /// Velocity fraction kept by a particle `r` from the axis at height `y`.
    pub fn retention(&self, r: f32, y: f32) -> f32 {
        let t = self.tuning;
        let active = (self.geometry.max_radius_at(y) * t.core_fraction).max(self.geometry.outlet_radius);
        if r <= active {
            t.core_keep
        } else if r <= active * t.middle_band {
            t.middle_keep
        } else {
            t.outer_keep
        }
    }

    /// Strength of the axis pull at height `y`, before flow speed and dt.
    ///
    /// Zero above the cone; grows toward the outlet.
    pub fn pull_strength(&self, y: f32) -> f32 {
        if y >= 0.0 {
            return 0.0;
        }
        let bias = 1.0 - self.geometry.cone_progress(y);
        self.tuning.inward_pull * (self.tuning.pull_floor + bias)
    }
}

/// Advance one particle by one frame.
pub fn step_particle(p: &mut Particle, ctx: &StepContext<'_>) -> Phase {
    let geometry = ctx.geometry;
    let flow = ctx.controls.flow_speed;
    let dt = ctx.dt;

    if ctx.controls.mode == Mode::Idle && geometry.is_in_body(p.position) {
        p.velocity = Vec3::ZERO;
        return Phase::InSilo;
    }

    p.velocity.y -= ctx.tuning.gravity * flow * dt;

    if !geometry.is_in_body(p.position) {
        p.velocity.x = 0.0;
        p.velocity.z = 0.0;
        p.position += p.velocity * dt * flow;
        if p.position.y < geometry.kill_y() {
            p.position = SENTINEL;
            p.velocity = Vec3::ZERO;
            return Phase::Recycled;
        }
        return Phase::Falling;
    }

    let horizontal = radial(p.position);
    let r = horizontal.length();
    p.velocity *= ctx.retention(r, p.position.y);

    if p.position.y < 0.0 && r > AXIS_EPSILON {
        let inward = -horizontal / r * ctx.pull_strength(p.position.y) * flow * dt;
        p.velocity.x += inward.x;
        p.velocity.z += inward.y;
    }

    p.position += p.velocity * dt * flow;

    if let Some(clamped) = geometry.clamp_radial(p.position) {
        p.position = clamped;
        p.velocity.x *= 0.5;
        p.velocity.z *= 0.5;
    }

    if geometry.is_in_body(p.position) {
        Phase::InSilo
    } else {
        Phase::Falling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiloConfig;

    fn setup() -> (SiloGeometry, FunnelTuning) {
        let config = SiloConfig::default();
        (SiloGeometry::new(&config), config.tuning)
    }

    #[test]
    fn test_idle_particle_in_silo_stays_put() {
        let (geometry, tuning) = setup();
        let ctx = StepContext {
            geometry: &geometry,
            tuning: &tuning,
            controls: FlowControls::idle(1.0),
            dt: 1.0 / 60.0,
        };
        let mut p = Particle::new(0, 0, Vec3::new(0.3, 1.0, 0.2));
        p.velocity = Vec3::new(1.0, -2.0, 0.5);

        assert_eq!(step_particle(&mut p, &ctx), Phase::InSilo);
        assert_eq!(p.position, Vec3::new(0.3, 1.0, 0.2));
        assert_eq!(p.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_idle_does_not_hold_falling_particles() {
        let (geometry, tuning) = setup();
        let ctx = StepContext {
            geometry: &geometry,
            tuning: &tuning,
            controls: FlowControls::idle(1.0),
            dt: 1.0 / 60.0,
        };
        let mut p = Particle::new(0, 0, Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(step_particle(&mut p, &ctx), Phase::Falling);
        assert!(p.position.y < -2.0);
    }

    #[test]
    fn test_gravity_in_cylinder_core() {
        let (geometry, tuning) = setup();
        let dt = 0.1;
        let ctx = StepContext {
            geometry: &geometry,
            tuning: &tuning,
            controls: FlowControls::discharging(0.5),
            dt,
        };
        let mut p = Particle::new(0, 0, Vec3::new(0.0, 1.0, 0.0));
        step_particle(&mut p, &ctx);

        let vy = -9.8 * 0.5 * dt;
        assert!((p.velocity.y - vy).abs() < 1e-6);
        assert!((p.position.y - (1.0 + vy * dt * 0.5)).abs() < 1e-6);
        assert_eq!(p.position.x, 0.0);
    }

    #[test]
    fn test_retention_bands() {
        let (geometry, tuning) = setup();
        let ctx = StepContext {
            geometry: &geometry,
            tuning: &tuning,
            controls: FlowControls::discharging(1.0),
            dt: 1.0 / 60.0,
        };
        let active = 1.2 * tuning.core_fraction;
        assert_eq!(ctx.retention(0.0, 1.0), tuning.core_keep);
        assert_eq!(ctx.retention(active * 1.5, 1.0), tuning.middle_keep);
        assert_eq!(ctx.retention(active * 2.5, 1.0), tuning.outer_keep);
        // Near the outlet the core never gets narrower than the outlet itself.
        assert_eq!(ctx.retention(geometry.outlet_radius, -1.49), tuning.core_keep);
    }

    #[test]
    fn test_pull_grows_toward_outlet() {
        let (geometry, tuning) = setup();
        let ctx = StepContext {
            geometry: &geometry,
            tuning: &tuning,
            controls: FlowControls::discharging(1.0),
            dt: 1.0 / 60.0,
        };
        assert_eq!(ctx.pull_strength(0.5), 0.0);
        assert!(ctx.pull_strength(-1.4) > ctx.pull_strength(-0.2));
        assert!(ctx.pull_strength(-0.01) > 0.0);
    }

    #[test]
    fn test_cone_particle_is_pulled_inward() {
        let (geometry, tuning) = setup();
        let ctx = StepContext {
            geometry: &geometry,
            tuning: &tuning,
            controls: FlowControls::discharging(1.0),
            dt: 1.0 / 60.0,
        };
        let mut p = Particle::new(0, 0, Vec3::new(0.1, -1.0, 0.0));
        step_particle(&mut p, &ctx);
        assert!(p.velocity.x < 0.0);
        assert_eq!(p.velocity.z, 0.0);
    }

    #[test]
    fn test_wall_contact_halves_horizontal_velocity() {
        let (geometry, tuning) = setup();
        let dt = 1.0 / 60.0;
        let ctx = StepContext {
            geometry: &geometry,
            tuning: &tuning,
            controls: FlowControls::discharging(1.0),
            dt,
        };
        let edge = geometry.allowed_radius_at(1.0);
        let mut p = Particle::new(0, 0, Vec3::new(edge, 1.0, 0.0));
        p.velocity = Vec3::new(6.0, 0.0, 0.0);
        step_particle(&mut p, &ctx);

        assert!((radial(p.position).length() - edge).abs() < 1e-5);
        let expected = 6.0 * tuning.outer_keep * 0.5;
        assert!((p.velocity.x - expected).abs() < 1e-5);
    }

    #[test]
    fn test_falling_particle_drops_straight() {
        let (geometry, tuning) = setup();
        let ctx = StepContext {
            geometry: &geometry,
            tuning: &tuning,
            controls: FlowControls::discharging(1.0),
            dt: 1.0 / 60.0,
        };
        let mut p = Particle::new(0, 0, Vec3::new(0.05, -2.0, 0.05));
        p.velocity = Vec3::new(0.4, -1.0, -0.4);
        assert_eq!(step_particle(&mut p, &ctx), Phase::Falling);
        assert_eq!(p.velocity.x, 0.0);
        assert_eq!(p.velocity.z, 0.0);
        assert_eq!(p.position.x, 0.05);
        assert_eq!(p.position.z, 0.05);
    }

    #[test]
    fn test_recycle_below_kill_height() {
        let (geometry, tuning) = setup();
        let ctx = StepContext {
            geometry: &geometry,
            tuning: &tuning,
            controls: FlowControls::discharging(1.0),
            dt: 1.0 / 60.0,
        };
        let mut p = Particle::new(0, 0, Vec3::new(0.05, -2.99, 0.0));
        p.velocity = Vec3::new(0.0, -5.0, 0.0);
        assert_eq!(step_particle(&mut p, &ctx), Phase::Recycled);
        assert_eq!(p.position, SENTINEL);
        assert_eq!(p.velocity, Vec3::ZERO);

        // Stays parked on later frames.
        assert_eq!(step_particle(&mut p, &ctx), Phase::Recycled);
        assert_eq!(p.position, SENTINEL);
    }
}
