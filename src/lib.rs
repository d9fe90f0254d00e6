//! # Silo Flow
//!
//! Procedural animation of grain discharging from conical-bottomed silos.
//!
//! Each silo is a dense cloud of point particles arranged in colored layers
//! (lots). Once per rendered frame the host advances every silo; the crate
//! moves the grain and hands back one index-stable position buffer per layer
//! for instanced drawing. The motion is a plausible-looking animation, not a
//! granular solver: there are no particle-particle contacts.
//!
//! ## Quick Start
//!
//! ```
//! use silo_flow::prelude::*;
//!
//! let mut plant = SiloPlant::new(PlantConfig::default()).unwrap();
//! plant.panel.toggle_discharge();
//! plant.panel.set_flow_speed(0.8);
//!
//! let report = plant.frame(1.0 / 60.0);
//! println!("discharged: {:.1}%", report.discharged_fraction() * 100.0);
//!
//! let mut instances = Vec::new();
//! plant.write_instances(0, 0, &mut instances);
//! ```
//!
//! ## Per-frame update
//!
//! | Where the particle is | What happens |
//! |-----------------------|--------------|
//! | In silo, mode idle | nothing; velocity zeroed |
//! | In silo, discharging | gravity, funnel damping, cone pull, wall clamp |
//! | Below the outlet | straight free fall |
//! | Below the kill height | parked at [`geometry::SENTINEL`] until reset |
//!
//! Resets are explicit: call [`ParticleField::reset_now`], or press reset on
//! the plant's [`ControlPanel`].
//!
//! ## Features
//!
//! - `parallel`: step particles on the `rayon` thread pool.

pub mod config;
pub mod controls;
pub mod error;
pub mod field;
pub mod flow;
pub mod geometry;
pub mod particle;
pub mod plant;
pub mod spawn;
pub mod time;
pub mod visuals;

pub use bytemuck;
pub use config::{FunnelTuning, PlantConfig, SiloConfig, SiloPlacement};
pub use controls::{ControlPanel, FlowControls, Mode};
pub use error::{ColorError, ConfigError, LoadError};
pub use field::{FrameReport, ParticleField};
pub use geometry::SiloGeometry;
pub use glam::Vec3;
pub use particle::Particle;
pub use plant::{PlantReport, SiloPlant, SiloUnit};
pub use visuals::{LotColor, ParticleInstance};

/// Convenient re-exports for common usage.
///
/// ```
/// use silo_flow::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{FunnelTuning, PlantConfig, SiloConfig, SiloPlacement};
    pub use crate::controls::{ControlPanel, FlowControls, Mode};
    pub use crate::field::{FrameReport, ParticleField};
    pub use crate::geometry::SiloGeometry;
    pub use crate::plant::{PlantReport, SiloPlant, SiloUnit};
    pub use crate::time::FrameClock;
    pub use crate::visuals::{LotColor, ParticleInstance};
    pub use crate::Vec3;
}
