//! Error types for Silo Flow.
//!
//! The particle step itself never fails. Errors only come from building a
//! silo out of bad configuration, parsing lot colors, or loading config files.

use std::fmt;

/// A configuration value that cannot describe a usable silo.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A length that must be strictly positive was zero, negative, or NaN.
    NonPositive { field: &'static str, value: f32 },
    /// The outlet must be narrower than the silo body.
    OutletTooWide { outlet_radius: f32, radius: f32 },
    /// The wall margin would leave no room at the outlet.
    MarginTooLarge { wall_margin: f32, outlet_radius: f32 },
    /// The kill height must sit below the outlet exit height.
    KillAboveOutlet { kill_y: f32, outlet_exit_y: f32 },
    /// The kill height must sit above the recycled-particle parking height.
    KillBelowSentinel { kill_y: f32, sentinel_y: f32 },
    /// A silo needs at least one layer.
    NoLayers,
    /// Each layer needs at least one particle.
    NoParticles,
    /// A velocity retention factor was outside `[0, 1]`.
    RetentionOutOfRange { field: &'static str, value: f32 },
    /// The number of layer colors does not match the layer count.
    ColorCount { layers: u32, colors: usize },
    /// Explicit placements name a different number of layers than configured.
    LayerCount { expected: u32, actual: usize },
    /// Explicit placements do not match the configured layer layout.
    LayerSize { layer: usize, expected: usize, actual: usize },
    /// An explicit initial position lies outside the silo volume.
    PositionOutsideSilo { layer: usize, index: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositive { field, value } => {
                write!(f, "`{}` must be positive, got {}", field, value)
            }
            ConfigError::OutletTooWide { outlet_radius, radius } => write!(
                f,
                "Outlet radius {} must be smaller than silo radius {}",
                outlet_radius, radius
            ),
            ConfigError::MarginTooLarge { wall_margin, outlet_radius } => write!(
                f,
                "Wall margin {} leaves no room inside outlet radius {}",
                wall_margin, outlet_radius
            ),
            ConfigError::KillAboveOutlet { kill_y, outlet_exit_y } => write!(
                f,
                "Kill height {} must be below outlet exit height {}",
                kill_y, outlet_exit_y
            ),
            ConfigError::KillBelowSentinel { kill_y, sentinel_y } => write!(
                f,
                "Kill height {} must be above the parking height {}",
                kill_y, sentinel_y
            ),
            ConfigError::NoLayers => write!(f, "A silo needs at least one layer"),
            ConfigError::NoParticles => write!(f, "Each layer needs at least one particle"),
            ConfigError::RetentionOutOfRange { field, value } => {
                write!(f, "`{}` must be within [0, 1], got {}", field, value)
            }
            ConfigError::ColorCount { layers, colors } => write!(
                f,
                "Silo has {} layers but {} colors were given",
                layers, colors
            ),
            ConfigError::LayerCount { expected, actual } => write!(
                f,
                "Silo has {} layers but {} were placed",
                expected, actual
            ),
            ConfigError::LayerSize { layer, expected, actual } => write!(
                f,
                "Layer {} should hold {} particles, got {}",
                layer, expected, actual
            ),
            ConfigError::PositionOutsideSilo { layer, index } => write!(
                f,
                "Particle {} of layer {} starts outside the silo",
                index, layer
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors that can occur when parsing a lot color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    /// The string is not of the form `#RRGGBB`.
    Malformed(String),
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorError::Malformed(s) => {
                write!(f, "Expected a color like \"#RRGGBB\", got {:?}", s)
            }
        }
    }
}

impl std::error::Error for ColorError {}

/// Errors that can occur when loading or saving a configuration file.
#[derive(Debug)]
pub enum LoadError {
    /// Failed to read or write the file.
    Io(std::io::Error),
    /// The file is not valid JSON for the expected config type.
    Json(serde_json::Error),
    /// The file parsed but describes an unusable silo.
    Config(ConfigError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "Failed to access config file: {}", e),
            LoadError::Json(e) => write!(f, "Failed to parse config: {}", e),
            LoadError::Config(e) => write!(f, "Invalid config: {}", e),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            LoadError::Json(e) => Some(e),
            LoadError::Config(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Json(e)
    }
}

impl From<ConfigError> for LoadError {
    fn from(e: ConfigError) -> Self {
        LoadError::Config(e)
    }
}
