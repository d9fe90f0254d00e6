//! The particle field of one silo.
//!
//! A [`ParticleField`] owns every particle of a silo, advances them once per
//! frame, and keeps one position buffer per layer for the renderer. Buffer
//! slot `i` of layer `l` always holds the same particle, so a renderer only
//! ever rewrites transforms and never reallocates.
//!
//! # Example
//!
//! ```
//! use silo_flow::{FlowControls, ParticleField, SiloConfig};
//!
//! let config = SiloConfig {
//!     particles_per_layer: 100,
//!     seed: Some(1),
//!     ..Default::default()
//! };
//! let mut field = ParticleField::new(config).unwrap();
//!
//! let report = field.advance(1.0 / 60.0, FlowControls::discharging(1.0));
//! assert_eq!(report.total(), 300);
//! assert_eq!(field.layer_positions(0).len(), 100);
//!
//! field.reset_now();
//! ```

use crate::config::SiloConfig;
use crate::controls::FlowControls;
use crate::error::ConfigError;
use crate::flow::{step_particle, Phase, StepContext};
use crate::geometry::SiloGeometry;
use crate::particle::Particle;
use crate::spawn::SpawnContext;
use glam::Vec3;
use log::{debug, info};

/// What a frame did to the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Particles still inside the silo body.
    pub in_silo: usize,
    /// Particles below the outlet, still visible.
    pub falling: usize,
    /// Particles parked at the sentinel.
    pub recycled: usize,
    /// True on the first frame in which every particle is recycled.
    pub newly_emptied: bool,
}

impl FrameReport {
    pub fn total(&self) -> usize {
        self.in_silo + self.falling + self.recycled
    }

    /// Fraction of particles that have left the silo body.
    pub fn discharged_fraction(&self) -> f32 {
        match self.total() {
            0 => 0.0,
            total => (self.falling + self.recycled) as f32 / total as f32,
        }
    }

    fn count(&mut self, phase: Phase) {
        match phase {
            Phase::InSilo => self.in_silo += 1,
            Phase::Falling => self.falling += 1,
            Phase::Recycled => self.recycled += 1,
        }
    }
}

/// All particles of one silo.
pub struct ParticleField {
    config: SiloConfig,
    geometry: SiloGeometry,
    /// Layer-major: particle `id` lives at index `id`.
    particles: Vec<Particle>,
    layer_buffers: Vec<Vec<Vec3>>,
    emptied: bool,
    last_reset_trigger: Option<u64>,
}

impl ParticleField {
    /// Build a field, sampling every particle inside the silo.
    pub fn new(config: SiloConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let geometry = SiloGeometry::new(&config);
        let mut ctx = SpawnContext::for_config(&config);

        let per_layer = config.particles_per_layer;
        let mut particles = Vec::with_capacity(config.particle_count());
        for layer in 0..config.layers {
            for i in 0..per_layer {
                let position = ctx.silo_point(&config, &geometry, layer);
                particles.push(Particle::new(layer * per_layer + i, layer, position));
            }
        }

        info!(
            "Silo field created: {} layers x {} particles",
            config.layers, per_layer
        );
        Ok(Self::assemble(config, geometry, particles))
    }

    /// Build a field from explicit initial positions, one list per layer.
    ///
    /// Every list must hold exactly `particles_per_layer` positions, each
    /// inside the silo body and within the wall bound.
    pub fn from_layers(config: SiloConfig, layers: Vec<Vec<Vec3>>) -> Result<Self, ConfigError> {
        config.validate()?;
        let expected = config.particles_per_layer as usize;
        if layers.len() != config.layers as usize {
            return Err(ConfigError::LayerCount {
                expected: config.layers,
                actual: layers.len(),
            });
        }
        if let Some((layer, positions)) = layers.iter().enumerate().find(|(_, p)| p.len() != expected) {
            return Err(ConfigError::LayerSize {
                layer,
                expected,
                actual: positions.len(),
            });
        }

        let geometry = SiloGeometry::new(&config);
        for (layer, positions) in layers.iter().enumerate() {
            if let Some(index) = positions.iter().position(|&p| !fits_inside(&geometry, p)) {
                return Err(ConfigError::PositionOutsideSilo { layer, index });
            }
        }

        let particles = layers
            .into_iter()
            .enumerate()
            .flat_map(|(layer, positions)| {
                positions.into_iter().enumerate().map(move |(i, position)| {
                    let id = (layer * expected + i) as u32;
                    Particle::new(id, layer as u32, position)
                })
            })
            .collect();

        Ok(Self::assemble(config, geometry, particles))
    }

    fn assemble(config: SiloConfig, geometry: SiloGeometry, particles: Vec<Particle>) -> Self {
        let per_layer = config.particles_per_layer as usize;
        let mut field = Self {
            layer_buffers: vec![vec![Vec3::ZERO; per_layer]; config.layers as usize],
            config,
            geometry,
            particles,
            emptied: false,
            last_reset_trigger: None,
        };
        field.write_layer_buffers();
        field
    }

    #[inline]
    pub fn config(&self) -> &SiloConfig {
        &self.config
    }

    #[inline]
    pub fn geometry(&self) -> &SiloGeometry {
        &self.geometry
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[inline]
    pub fn layer_count(&self) -> usize {
        self.layer_buffers.len()
    }

    /// Current positions of one layer, index-stable across frames.
    ///
    /// # Panics
    ///
    /// Panics if `layer` is out of range.
    #[inline]
    pub fn layer_positions(&self, layer: usize) -> &[Vec3] {
        &self.layer_buffers[layer]
    }

    /// Put every particle back at its initial position, at rest.
    pub fn reset_now(&mut self) {
        for p in &mut self.particles {
            p.reset();
        }
        self.emptied = false;
        self.write_layer_buffers();
        info!("Silo field reset: {} particles", self.particles.len());
    }

    /// Reset if `trigger` differs from the value seen on the previous call.
    ///
    /// For hosts that signal resets with a counter. The first value seen is
    /// only recorded. Returns whether a reset happened.
    pub fn sync_reset_trigger(&mut self, trigger: u64) -> bool {
        let changed = matches!(self.last_reset_trigger, Some(last) if last != trigger);
        self.last_reset_trigger = Some(trigger);
        if changed {
            self.reset_now();
        }
        changed
    }

    /// Advance every particle by `dt` seconds.
    pub fn advance(&mut self, dt: f32, controls: FlowControls) -> FrameReport {
        let ctx = StepContext {
            geometry: &self.geometry,
            tuning: &self.config.tuning,
            controls,
            dt,
        };

        let mut report = step_all(&mut self.particles, &ctx);

        if report.recycled == self.particles.len() && !self.emptied {
            self.emptied = true;
            report.newly_emptied = true;
            debug!("Silo field emptied");
        }

        self.write_layer_buffers();
        report
    }

    fn write_layer_buffers(&mut self) {
        let per_layer = self.config.particles_per_layer as usize;
        for (buffer, chunk) in self
            .layer_buffers
            .iter_mut()
            .zip(self.particles.chunks(per_layer))
        {
            for (slot, p) in buffer.iter_mut().zip(chunk) {
                *slot = p.position;
            }
        }
    }
}

fn fits_inside(geometry: &SiloGeometry, p: Vec3) -> bool {
    (geometry.cone_bottom()..=geometry.top()).contains(&p.y) && geometry.within_wall(p)
}

#[cfg(not(feature = "parallel"))]
fn step_all(particles: &mut [Particle], ctx: &StepContext<'_>) -> FrameReport {
    let mut report = FrameReport::default();
    for p in particles.iter_mut() {
        report.count(step_particle(p, ctx));
    }
    report
}

#[cfg(feature = "parallel")]
fn step_all(particles: &mut [Particle], ctx: &StepContext<'_>) -> FrameReport {
    use rayon::prelude::*;

    particles
        .par_iter_mut()
        .fold(FrameReport::default, |mut report, p| {
            report.count(step_particle(p, ctx));
            report
        })
        .reduce(FrameReport::default, |a, b| FrameReport {
            in_silo: a.in_silo + b.in_silo,
            falling: a.falling + b.falling,
            recycled: a.recycled + b.recycled,
            newly_emptied: false,
        })
}
