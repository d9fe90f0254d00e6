//! Lot colors and per-particle instance records.
//!
//! The renderer draws one instance per particle. This module provides the
//! colors each layer is drawn with and the plain-old-data record the
//! renderer uploads for every instance.
//!
//! # Example
//!
//! ```
//! use silo_flow::visuals::{LotColor, ParticleInstance};
//! use glam::Vec3;
//!
//! let gold: LotColor = "#FFD700".parse().unwrap();
//! let instance = ParticleInstance::new(Vec3::new(0.0, 1.0, 0.0), 0.03, gold);
//! let bytes: &[u8] = bytemuck::bytes_of(&instance);
//! assert_eq!(bytes.len(), 80);
//! ```

use crate::error::ColorError;
use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A lot color, stored as 8-bit sRGB channels.
///
/// Serialized as a `"#RRGGBB"` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LotColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl LotColor {
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels scaled to `0.0..=1.0`.
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r as f32, self.g as f32, self.b as f32) / 255.0
    }

    /// Channels scaled to `0.0..=1.0` with full alpha.
    pub fn to_rgba(self) -> [f32; 4] {
        let c = self.to_vec3();
        [c.x, c.y, c.z, 1.0]
    }
}

impl FromStr for LotColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ColorError::Malformed(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(malformed)?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(malformed());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| malformed());
        Ok(Self::from_rgb8(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for LotColor {
    type Error = ColorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<LotColor> for String {
    fn from(c: LotColor) -> Self {
        c.to_string()
    }
}

impl fmt::Display for LotColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

const PALETTES: [[LotColor; 3]; 3] = [
    [
        LotColor::from_rgb8(0xFF, 0xD7, 0x00), // Gold
        LotColor::from_rgb8(0xFF, 0x6B, 0x35), // Orange
        LotColor::from_rgb8(0x4E, 0xCD, 0xC4), // Teal
    ],
    [
        LotColor::from_rgb8(0xF3, 0x81, 0x81), // Pink
        LotColor::from_rgb8(0x9B, 0x59, 0xB6), // Purple
        LotColor::from_rgb8(0x34, 0x98, 0xDB), // Blue
    ],
    [
        LotColor::from_rgb8(0x2E, 0xCC, 0x71), // Green
        LotColor::from_rgb8(0xE7, 0x4C, 0x3C), // Coral
        LotColor::from_rgb8(0xF3, 0x9C, 0x12), // Amber
    ],
];

/// Default layer colors for the silo at `index` in a plant.
///
/// The three stock palettes do not share any color; plants with more than
/// three silos cycle through them.
pub fn default_palette(index: usize) -> [LotColor; 3] {
    PALETTES[index % PALETTES.len()]
}

/// Legend label for a lot, numbered from 1 across the whole plant.
pub fn lot_label(index: usize) -> String {
    format!("Lot {}", index + 1)
}

/// Per-instance data uploaded for instanced particle drawing.
///
/// `model` is a column-major transform (uniform scale, then translation).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl ParticleInstance {
    pub fn new(position: Vec3, size: f32, color: LotColor) -> Self {
        let model = Mat4::from_scale_rotation_translation(Vec3::splat(size), Quat::IDENTITY, position);
        Self {
            model: model.to_cols_array_2d(),
            color: color.to_rgba(),
        }
    }

    /// Translation part of the model matrix.
    pub fn position(&self) -> Vec3 {
        let t = self.model[3];
        Vec3::new(t[0], t[1], t[2])
    }
}
