//! A row of silos sharing one control panel.
//!
//! Every frame the plant applies a pending reset, advances each silo with the
//! panel's controls, and stops the discharge when a silo marked
//! [`stops_plant_when_empty`](crate::config::SiloPlacement::stops_plant_when_empty)
//! runs dry.

use crate::config::{PlantConfig, SiloPlacement};
use crate::controls::ControlPanel;
use crate::error::ConfigError;
use crate::field::{FrameReport, ParticleField};
use crate::visuals::{LotColor, ParticleInstance};
use glam::Vec3;
use log::{debug, info};

/// Default rendered size of one grain.
pub const DEFAULT_GRAIN_SIZE: f32 = 0.025;

/// One silo placed in the world.
pub struct SiloUnit {
    pub position: Vec3,
    pub colors: Vec<LotColor>,
    pub stops_plant_when_empty: bool,
    field: ParticleField,
}

impl SiloUnit {
    pub fn new(placement: SiloPlacement) -> Result<Self, ConfigError> {
        placement.validate()?;
        Ok(Self {
            position: placement.position,
            colors: placement.colors,
            stops_plant_when_empty: placement.stops_plant_when_empty,
            field: ParticleField::new(placement.silo)?,
        })
    }

    #[inline]
    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    /// Refill `out` with world-space instances for one layer.
    ///
    /// `out` keeps its allocation between calls.
    ///
    /// # Panics
    ///
    /// Panics if `layer` is out of range.
    pub fn write_instances(&self, layer: usize, size: f32, out: &mut Vec<ParticleInstance>) {
        let color = self.colors[layer];
        out.clear();
        out.extend(
            self.field
                .layer_positions(layer)
                .iter()
                .map(|&p| ParticleInstance::new(self.position + p, size, color)),
        );
    }
}

/// Reports for every silo after a plant frame.
#[derive(Debug, Clone, Default)]
pub struct PlantReport {
    pub silos: Vec<FrameReport>,
    /// Whether this frame stopped the discharge.
    pub stopped: bool,
}

impl PlantReport {
    /// Fraction of all grain in the plant that has left its silo.
    pub fn discharged_fraction(&self) -> f32 {
        let total: usize = self.silos.iter().map(FrameReport::total).sum();
        if total == 0 {
            return 0.0;
        }
        let out: usize = self.silos.iter().map(|r| r.falling + r.recycled).sum();
        out as f32 / total as f32
    }
}

/// Several silos driven by one control panel.
pub struct SiloPlant {
    pub name: String,
    pub panel: ControlPanel,
    units: Vec<SiloUnit>,
}

impl SiloPlant {
    pub fn new(config: PlantConfig) -> Result<Self, ConfigError> {
        let units = config
            .silos
            .into_iter()
            .map(SiloUnit::new)
            .collect::<Result<Vec<_>, _>>()?;
        info!("Plant {:?} built with {} silos", config.name, units.len());
        Ok(Self {
            name: config.name,
            panel: ControlPanel::new(),
            units,
        })
    }

    #[inline]
    pub fn units(&self) -> &[SiloUnit] {
        &self.units
    }

    /// Advance every silo by `dt` seconds.
    pub fn frame(&mut self, dt: f32) -> PlantReport {
        if self.panel.take_reset() {
            info!("Plant reset #{}", self.panel.reset_generation());
            for unit in &mut self.units {
                unit.field.reset_now();
            }
        }

        let controls = self.panel.controls();
        let mut report = PlantReport::default();
        for unit in &mut self.units {
            let silo = unit.field.advance(dt, controls);
            if silo.newly_emptied && unit.stops_plant_when_empty {
                debug!("Silo at {} ran empty, stopping discharge", unit.position);
                report.stopped = true;
            }
            report.silos.push(silo);
        }

        if report.stopped {
            self.panel.stop();
        }
        report
    }

    /// Refill `out` with world-space instances for one layer of one silo.
    ///
    /// # Panics
    ///
    /// Panics if `unit` or `layer` is out of range.
    pub fn write_instances(&self, unit: usize, layer: usize, out: &mut Vec<ParticleInstance>) {
        self.units[unit].write_instances(layer, DEFAULT_GRAIN_SIZE, out);
    }

    /// Every lot color in legend order.
    pub fn lot_colors(&self) -> Vec<LotColor> {
        self.units.iter().flat_map(|u| u.colors.iter().copied()).collect()
    }

    /// Change one lot color, addressed by its position in the legend.
    ///
    /// Returns `false` if `lot` is past the last lot.
    pub fn set_lot_color(&mut self, lot: usize, color: LotColor) -> bool {
        let mut index = lot;
        for unit in &mut self.units {
            if let Some(slot) = unit.colors.get_mut(index) {
                *slot = color;
                return true;
            }
            index -= unit.colors.len();
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiloConfig;
    use crate::controls::Mode;

    fn tiny_plant() -> PlantConfig {
        let mut config = PlantConfig::default();
        for (i, silo) in config.silos.iter_mut().enumerate() {
            silo.silo = SiloConfig {
                particles_per_layer: 50,
                seed: Some(i as u64),
                ..Default::default()
            };
        }
        config
    }

    #[test]
    fn test_build_plant() {
        let plant = SiloPlant::new(tiny_plant()).unwrap();
        assert_eq!(plant.units().len(), 3);
        assert_eq!(plant.lot_colors().len(), 9);
        assert_eq!(plant.panel.mode(), Mode::Idle);
    }

    #[test]
    fn test_instances_are_offset() {
        let plant = SiloPlant::new(tiny_plant()).unwrap();
        let mut out = Vec::new();
        plant.write_instances(2, 1, &mut out);
        assert_eq!(out.len(), 50);

        let local = plant.units()[2].field().layer_positions(1)[0];
        assert_eq!(out[0].position(), local + Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(out[0].color, plant.units()[2].colors[1].to_rgba());

        // Reuses the buffer rather than appending
        plant.write_instances(0, 0, &mut out);
        assert_eq!(out.len(), 50);
    }

    #[test]
    fn test_set_lot_color_spans_silos() {
        let mut plant = SiloPlant::new(tiny_plant()).unwrap();
        let white = LotColor::from_rgb8(255, 255, 255);
        assert!(plant.set_lot_color(4, white));
        assert_eq!(plant.units()[1].colors[1], white);
        assert!(plant.set_lot_color(8, white));
        assert_eq!(plant.units()[2].colors[2], white);
        assert!(!plant.set_lot_color(9, white));
    }

    #[test]
    fn test_reset_applies_to_all_silos() {
        let mut plant = SiloPlant::new(tiny_plant()).unwrap();
        plant.panel.toggle_discharge();
        for _ in 0..20 {
            plant.frame(1.0 / 60.0);
        }
        plant.panel.reset();
        plant.frame(1.0 / 60.0);

        assert_eq!(plant.panel.mode(), Mode::Idle);
        for unit in plant.units() {
            for p in unit.field().particles() {
                assert_eq!(p.position, p.initial_position());
            }
        }
    }
}
