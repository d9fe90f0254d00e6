//! Host-side discharge controls.
//!
//! [`FlowControls`] is what a field reads every frame. [`ControlPanel`] holds
//! the plant-wide state behind the buttons and slider: it turns a reset
//! request into a single pending edge, so several resets between two frames
//! collapse into one and none are missed.

use serde::{Deserialize, Serialize};

/// Flow speed the panel starts at and returns to on reset.
pub const DEFAULT_FLOW_SPEED: f32 = 0.45;
/// Slowest flow speed the slider allows.
pub const MIN_FLOW_SPEED: f32 = 0.3;
/// Fastest flow speed the slider allows.
pub const MAX_FLOW_SPEED: f32 = 1.5;
/// Slider increment.
pub const FLOW_SPEED_STEP: f32 = 0.05;

/// Whether grain is allowed to leave the silos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Grain inside the silos stays put.
    #[default]
    Idle,
    /// Grain falls through the outlets.
    Discharging,
}

impl Mode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Mode::Idle => Mode::Discharging,
            Mode::Discharging => Mode::Idle,
        }
    }

    /// Label for a start/stop button in this mode.
    pub fn button_label(self) -> &'static str {
        match self {
            Mode::Idle => "Start Discharge",
            Mode::Discharging => "Stop Discharge",
        }
    }
}

/// Per-frame inputs a particle field reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowControls {
    pub mode: Mode,
    /// Multiplier on both gravity and position integration.
    ///
    /// Not validated; keeping it in a sane range is the host's job.
    pub flow_speed: f32,
}

impl Default for FlowControls {
    fn default() -> Self {
        Self {
            mode: Mode::Idle,
            flow_speed: DEFAULT_FLOW_SPEED,
        }
    }
}

impl FlowControls {
    pub fn discharging(flow_speed: f32) -> Self {
        Self {
            mode: Mode::Discharging,
            flow_speed,
        }
    }

    pub fn idle(flow_speed: f32) -> Self {
        Self {
            mode: Mode::Idle,
            flow_speed,
        }
    }
}

/// Plant-wide control state: discharge toggle, flow slider, reset button.
#[derive(Debug, Clone, Default)]
pub struct ControlPanel {
    controls: FlowControls,
    reset_generation: u64,
    reset_pending: bool,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current per-frame controls.
    #[inline]
    pub fn controls(&self) -> FlowControls {
        self.controls
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.controls.mode
    }

    #[inline]
    pub fn flow_speed(&self) -> f32 {
        self.controls.flow_speed
    }

    /// Number of resets requested so far.
    #[inline]
    pub fn reset_generation(&self) -> u64 {
        self.reset_generation
    }

    /// Start or stop the discharge.
    pub fn toggle_discharge(&mut self) {
        self.controls.mode = self.controls.mode.toggled();
    }

    /// Stop the discharge.
    pub fn stop(&mut self) {
        self.controls.mode = Mode::Idle;
    }

    /// Move the flow slider. The value is clamped to the slider range and
    /// snapped to its step; returns the value actually applied.
    pub fn set_flow_speed(&mut self, speed: f32) -> f32 {
        let snapped = if speed.is_nan() {
            DEFAULT_FLOW_SPEED
        } else {
            let steps = ((speed - MIN_FLOW_SPEED) / FLOW_SPEED_STEP).round();
            (MIN_FLOW_SPEED + steps * FLOW_SPEED_STEP).clamp(MIN_FLOW_SPEED, MAX_FLOW_SPEED)
        };
        self.controls.flow_speed = snapped;
        snapped
    }

    /// Press reset: stop, restore the default flow speed, and queue a
    /// particle reset for the next frame.
    pub fn reset(&mut self) {
        self.controls = FlowControls::default();
        self.reset_generation += 1;
        self.reset_pending = true;
    }

    /// Consume the pending reset, if any.
    ///
    /// Returns `true` at most once per batch of [`reset`](Self::reset) calls.
    pub fn take_reset(&mut self) -> bool {
        std::mem::take(&mut self.reset_pending)
    }
}
