//! Configuration types for silos and plants.
//!
//! These types describe silo geometry, the empirical funnel tuning, and the
//! layout of a whole plant. All of them can be serialized to JSON and loaded
//! by the runner.

use crate::error::{ConfigError, LoadError};
use crate::geometry::SENTINEL_Y;
use crate::visuals::{default_palette, LotColor};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn require_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    // Written this way so NaN is rejected as well.
    if !(value > 0.0) {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(())
}

fn require_unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::RetentionOutOfRange { field, value });
    }
    Ok(())
}

/// Geometry and population of a single silo.
///
/// Heights are measured from the top of the cone (`y = 0`). The cylinder
/// extends up to `cylinder_height`, the cone down to `-cone_height`.
///
/// ```text
///        +-------+   y = cylinder_height
///        |       |
///        |       |   radius
///        +-------+   y = 0
///         \     /
///          \   /
///           +-+      y = -cone_height (outlet_radius)
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiloConfig {
    /// Number of stacked layers (lots).
    pub layers: u32,
    /// Particles sampled per layer.
    pub particles_per_layer: u32,
    /// Radius of the cylindrical body.
    pub radius: f32,
    /// Height of the cylindrical body above the cone.
    pub cylinder_height: f32,
    /// Height of the conical hopper.
    pub cone_height: f32,
    /// Radius of the outlet at the cone apex.
    pub outlet_radius: f32,
    /// Vertical thickness of each layer band.
    pub layer_height: f32,
    /// Fraction of `layer_height` by which layer boundaries are blurred.
    pub mix_ratio: f32,
    /// Distance kept between particles and the wall.
    pub wall_margin: f32,
    /// How far below the cone bottom a particle counts as having exited.
    pub outlet_exit_drop: f32,
    /// Height below which falling particles are recycled.
    pub kill_y: f32,
    /// Fixed RNG seed for reproducible initial placement.
    pub seed: Option<u64>,
    /// Funnel damping and gravity constants.
    pub tuning: FunnelTuning,
}

impl Default for SiloConfig {
    fn default() -> Self {
        Self {
            layers: 3,
            particles_per_layer: 5_000,
            radius: 1.2,
            cylinder_height: 3.0,
            cone_height: 1.5,
            outlet_radius: 0.18,
            layer_height: 1.4,
            mix_ratio: 0.15,
            wall_margin: 0.04,
            outlet_exit_drop: 0.05,
            // Floor of the collection bin below the silos.
            kill_y: -3.0,
            seed: None,
            tuning: FunnelTuning::default(),
        }
    }
}

impl SiloConfig {
    /// Total number of particles in the silo.
    pub fn particle_count(&self) -> usize {
        self.layers as usize * self.particles_per_layer as usize
    }

    /// Check that the configuration describes a usable silo.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.layers == 0 {
            return Err(ConfigError::NoLayers);
        }
        if self.particles_per_layer == 0 {
            return Err(ConfigError::NoParticles);
        }
        require_positive("radius", self.radius)?;
        require_positive("cylinder_height", self.cylinder_height)?;
        require_positive("cone_height", self.cone_height)?;
        require_positive("outlet_radius", self.outlet_radius)?;
        require_positive("layer_height", self.layer_height)?;
        require_positive("wall_margin", self.wall_margin)?;
        require_positive("outlet_exit_drop", self.outlet_exit_drop)?;
        if !(self.mix_ratio >= 0.0) {
            return Err(ConfigError::NonPositive {
                field: "mix_ratio",
                value: self.mix_ratio,
            });
        }
        if self.outlet_radius >= self.radius {
            return Err(ConfigError::OutletTooWide {
                outlet_radius: self.outlet_radius,
                radius: self.radius,
            });
        }
        if self.wall_margin >= self.outlet_radius {
            return Err(ConfigError::MarginTooLarge {
                wall_margin: self.wall_margin,
                outlet_radius: self.outlet_radius,
            });
        }
        let outlet_exit_y = -self.cone_height - self.outlet_exit_drop;
        if !(self.kill_y < outlet_exit_y) {
            return Err(ConfigError::KillAboveOutlet {
                kill_y: self.kill_y,
                outlet_exit_y,
            });
        }
        // Parked particles must already be below the kill height.
        if self.kill_y <= SENTINEL_Y {
            return Err(ConfigError::KillBelowSentinel {
                kill_y: self.kill_y,
                sentinel_y: SENTINEL_Y,
            });
        }
        self.tuning.validate()
    }

    /// Load a silo configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Empirical constants that shape the discharge.
///
/// None of these have a physical derivation; they were tuned until the
/// funnel looked right and should be preserved rather than re-derived.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FunnelTuning {
    /// Base gravity magnitude, multiplied by flow speed.
    pub gravity: f32,
    /// Active funnel radius as a fraction of the wall radius at that height.
    pub core_fraction: f32,
    /// Outer edge of the middle damping band, as a multiple of the active radius.
    pub middle_band: f32,
    /// Velocity retained per frame inside the active radius.
    pub core_keep: f32,
    /// Velocity retained per frame in the middle band.
    pub middle_keep: f32,
    /// Velocity retained per frame outside the middle band.
    pub outer_keep: f32,
    /// Strength of the pull toward the axis inside the cone.
    pub inward_pull: f32,
    /// Pull applied at the top of the cone, before the height bias.
    pub pull_floor: f32,
}

impl Default for FunnelTuning {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            core_fraction: 0.35,
            middle_band: 2.0,
            core_keep: 1.0,
            middle_keep: 0.85,
            outer_keep: 0.6,
            inward_pull: 1.5,
            pull_floor: 0.25,
        }
    }
}

impl FunnelTuning {
    /// Check the tuning constants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("gravity", self.gravity)?;
        require_positive("core_fraction", self.core_fraction)?;
        if !(self.middle_band >= 1.0) {
            return Err(ConfigError::NonPositive {
                field: "middle_band",
                value: self.middle_band,
            });
        }
        require_unit("core_keep", self.core_keep)?;
        require_unit("middle_keep", self.middle_keep)?;
        require_unit("outer_keep", self.outer_keep)?;
        if !(self.inward_pull >= 0.0) {
            return Err(ConfigError::NonPositive {
                field: "inward_pull",
                value: self.inward_pull,
            });
        }
        if !(self.pull_floor >= 0.0) {
            return Err(ConfigError::NonPositive {
                field: "pull_floor",
                value: self.pull_floor,
            });
        }
        Ok(())
    }
}

/// One silo placed in a plant.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SiloPlacement {
    /// World-space offset of the silo axis.
    pub position: Vec3,
    /// One color per layer, bottom layer first.
    pub colors: Vec<LotColor>,
    /// Whether this silo running empty stops the whole plant.
    #[serde(default)]
    pub stops_plant_when_empty: bool,
    #[serde(default)]
    pub silo: SiloConfig,
}

impl SiloPlacement {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.silo.validate()?;
        if self.colors.len() != self.silo.layers as usize {
            return Err(ConfigError::ColorCount {
                layers: self.silo.layers,
                colors: self.colors.len(),
            });
        }
        Ok(())
    }
}

/// A row of silos sharing one control panel.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlantConfig {
    pub name: String,
    pub silos: Vec<SiloPlacement>,
}

impl Default for PlantConfig {
    fn default() -> Self {
        let silos = [-5.0, 0.0, 5.0]
            .into_iter()
            .enumerate()
            .map(|(i, x)| SiloPlacement {
                position: Vec3::new(x, 0.0, 0.0),
                colors: default_palette(i).to_vec(),
                // Only the first silo ends the discharge when it runs dry.
                stops_plant_when_empty: i == 0,
                silo: SiloConfig::default(),
            })
            .collect();

        Self {
            name: "Three silo row".into(),
            silos,
        }
    }
}

impl PlantConfig {
    /// Check every silo in the plant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.silos.iter().try_for_each(SiloPlacement::validate)
    }

    /// Load a plant configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Total number of lots across all silos.
    pub fn lot_count(&self) -> usize {
        self.silos.iter().map(|s| s.colors.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_silo_is_valid() {
        assert_eq!(SiloConfig::default().validate(), Ok(()));
        assert_eq!(SiloConfig::default().particle_count(), 15_000);
    }

    #[test]
    fn test_rejects_wide_outlet() {
        let config = SiloConfig {
            outlet_radius: 2.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutletTooWide { .. })
        ));
    }

    #[test]
    fn test_rejects_nan_radius() {
        let config = SiloConfig {
            radius: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "radius", .. })
        ));
    }

    #[test]
    fn test_rejects_kill_above_outlet() {
        let config = SiloConfig {
            kill_y: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::KillAboveOutlet { .. })
        ));
    }

    #[test]
    fn test_rejects_kill_below_parking_height() {
        let config = SiloConfig {
            kill_y: -2000.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::KillBelowSentinel {
                kill_y: -2000.0,
                sentinel_y: SENTINEL_Y,
            })
        );

        let config = SiloConfig {
            kill_y: SENTINEL_Y + 1.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_rejects_retention_above_one() {
        let mut config = SiloConfig::default();
        config.tuning.outer_keep = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RetentionOutOfRange { field: "outer_keep", .. })
        ));
    }

    #[test]
    fn test_default_plant() {
        let plant = PlantConfig::default();
        assert_eq!(plant.silos.len(), 3);
        assert_eq!(plant.lot_count(), 9);
        assert!(plant.silos[0].stops_plant_when_empty);
        assert!(!plant.silos[1].stops_plant_when_empty);
        assert_eq!(plant.validate(), Ok(()));
    }

    #[test]
    fn test_color_count_mismatch() {
        let mut plant = PlantConfig::default();
        plant.silos[1].colors.pop();
        assert_eq!(
            plant.validate(),
            Err(ConfigError::ColorCount { layers: 3, colors: 2 })
        );
    }

    #[test]
    fn test_plant_json_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plant.json");

        let plant = PlantConfig::default();
        plant.save(&path).unwrap();
        let loaded = PlantConfig::load(&path).unwrap();
        assert_eq!(loaded, plant);
    }

    #[test]
    fn test_partial_silo_json_uses_defaults() {
        let config: SiloConfig = serde_json::from_str(r#"{ "layers": 5, "seed": 7 }"#).unwrap();
        assert_eq!(config.layers, 5);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.radius, SiloConfig::default().radius);
    }
}
