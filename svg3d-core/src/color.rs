//! RGB colours shared by materials, shaders and output surfaces.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const GRAY: Color = Color::new(0x88, 0x88, 0x88);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    pub const fn from_hex(hex: u32) -> Self {
        Self::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Build from float channels in 0..=255, truncating toward zero and clamping.
    pub fn from_f32(r: f32, g: f32, b: f32) -> Self {
        Self::new(channel(r), channel(g), channel(b))
    }

    pub fn to_f32(self) -> [f32; 3] {
        [self.r as f32, self.g as f32, self.b as f32]
    }

    /// Linear blend toward `other`; `t = 0` keeps `self`, `t = 1` gives `other`.
    pub fn mix(self, other: Color, t: f32) -> Self {
        let [r0, g0, b0] = self.to_f32();
        let [r1, g1, b1] = other.to_f32();
        Self::from_f32(
            r0 * (1.0 - t) + r1 * t,
            g0 * (1.0 - t) + g1 * t,
            b0 * (1.0 - t) + b1 * t,
        )
    }

    /// Add the same signed amount to every channel.
    pub fn offset(self, amount: f32) -> Self {
        let [r, g, b] = self.to_f32();
        Self::from_f32(r + amount, g + amount, b + amount)
    }

    /// Component-wise integer average of three colours, truncating.
    pub fn average(a: Color, b: Color, c: Color) -> Self {
        let avg = |x: u8, y: u8, z: u8| ((x as u16 + y as u16 + z as u16) / 3) as u8;
        Self::new(avg(a.r, b.r, c.r), avg(a.g, b.g, c.g), avg(a.b, b.b, c.b))
    }

    /// Relative luminance in 0.0..=1.0.
    pub fn luminance(self) -> f32 {
        (0.2126 * self.r as f32 + 0.7152 * self.g as f32 + 0.0722 * self.b as f32) / 255.0
    }

    pub fn to_hex_string(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

fn channel(value: f32) -> u8 {
    // `as` saturates and maps NaN to 0
    value.trunc().clamp(0.0, 255.0) as u8
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Accepts `#rgb`, `#rrggbb` and `rgb(r, g, b)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidColor(s.to_string());
        let trimmed = s.trim();

        if let Some(hex) = trimmed.strip_prefix('#') {
            if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            let value = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
            return match hex.len() {
                6 => Ok(Self::from_hex(value)),
                3 => {
                    let expand = |nibble: u32| ((nibble & 0xf) * 0x11) as u8;
                    Ok(Self::new(expand(value >> 8), expand(value >> 4), expand(value)))
                }
                _ => Err(invalid()),
            };
        }

        let inner = trimmed
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;
        let mut parts = inner.split(',').map(|p| p.trim().parse::<u8>());
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(Ok(r)), Some(Ok(g)), Some(Ok(b)), None) => Ok(Self::new(r, g, b)),
            _ => Err(invalid()),
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_string())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
