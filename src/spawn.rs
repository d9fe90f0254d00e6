//! Initial particle placement.
//!
//! Particles are sampled once per silo, layer by layer, inside the silo
//! volume. Layer boundaries are deliberately blurred so the strata look
//! poured rather than sliced.

use crate::config::SiloConfig;
use crate::geometry::SiloGeometry;
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Random source and helpers for placing particles in a silo.
pub struct SpawnContext {
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a context with a fixed seed, for reproducible placement.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Create a context seeded from the clock, different each run.
    pub fn from_clock() -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42);
        Self::seeded(seed)
    }

    /// Use the configured seed if there is one.
    pub fn for_config(config: &SiloConfig) -> Self {
        match config.seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_clock(),
        }
    }

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 between -1.0 and 1.0.
    #[inline]
    pub fn random_signed(&mut self) -> f32 {
        self.rng.gen_range(-1.0..1.0)
    }

    /// Random point inside a disk in the XZ plane at height `y`.
    ///
    /// Uses the square root of a uniform sample for the radius so density
    /// is uniform over the area rather than bunched at the center.
    pub fn random_in_disk(&mut self, radius: f32, y: f32) -> Vec3 {
        let theta = self.rng.gen_range(0.0..TAU);
        let r = radius * self.rng.gen::<f32>().sqrt();
        Vec3::new(r * theta.cos(), y, r * theta.sin())
    }

    /// Height for a particle of `layer`, blurred across neighbouring layers
    /// and clamped to the silo.
    pub fn layer_height(&mut self, config: &SiloConfig, geometry: &SiloGeometry, layer: u32) -> f32 {
        let band_start = geometry.cone_bottom() + layer as f32 * config.layer_height;
        let y = band_start + self.random() * config.layer_height;
        let blur = self.random_signed() * config.layer_height * config.mix_ratio;
        (y + blur).clamp(geometry.cone_bottom(), geometry.top())
    }

    /// Random point for a particle of `layer` inside the silo volume.
    pub fn silo_point(&mut self, config: &SiloConfig, geometry: &SiloGeometry, layer: u32) -> Vec3 {
        let y = self.layer_height(config, geometry, layer);
        self.random_in_disk(geometry.allowed_radius_at(y), y)
    }
}
