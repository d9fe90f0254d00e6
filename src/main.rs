//! Silo Flow headless runner
//!
//! Loads a plant config from JSON (or uses the stock three-silo row), starts
//! the discharge, and steps the plant until it stops or a frame limit is hit.
//!
//! Usage: `silo-flow [plant.json] [max_frames] [flow_speed]`

use log::{error, info};
use silo_flow::prelude::*;
use silo_flow::visuals::lot_label;
use std::env;
use std::process::ExitCode;

const DEFAULT_MAX_FRAMES: u64 = 3_600;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = match args.first() {
        Some(path) => match PlantConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => PlantConfig::default(),
    };
    let max_frames = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_MAX_FRAMES);

    let mut plant = match SiloPlant::new(config) {
        Ok(plant) => plant,
        Err(e) => {
            error!("Invalid plant: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(speed) = args.get(2).and_then(|s| s.parse().ok()) {
        plant.panel.set_flow_speed(speed);
    }

    // Step at a steady 60 Hz so runs are comparable across machines.
    let mut clock = FrameClock::new();
    clock.set_fixed_delta(Some(1.0 / 60.0));

    for (lot, color) in plant.lot_colors().iter().enumerate() {
        info!("{}: {}", lot_label(lot), color);
    }

    info!(
        "{} for {} at flow speed {:.2}",
        plant.panel.mode().button_label(),
        plant.name,
        plant.panel.flow_speed()
    );
    plant.panel.toggle_discharge();

    let mut instances = Vec::new();
    while clock.frame() < max_frames {
        let report = plant.frame(clock.tick());

        for unit in 0..plant.units().len() {
            for layer in 0..plant.units()[unit].field().layer_count() {
                plant.write_instances(unit, layer, &mut instances);
            }
        }

        if clock.frame() % 60 == 0 {
            info!(
                "t={:.1}s discharged {:.1}%",
                clock.elapsed(),
                report.discharged_fraction() * 100.0
            );
        }
        if report.stopped {
            info!(
                "Discharge complete after {} frames, panel shows {:?}",
                clock.frame(),
                plant.panel.mode().button_label()
            );
            break;
        }
    }

    ExitCode::SUCCESS
}
