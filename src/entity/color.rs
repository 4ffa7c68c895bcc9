use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Text is drawn black on notes brighter than this component sum
const LIGHT_BACKGROUND_THRESHOLD: u16 = 250;

/// Note background color, persisted as an `"r,g,b"` string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextColor {
    Black,
    White,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from arbitrary integers, clamping each channel to 0..=255
    pub fn clamped(r: i64, g: i64, b: i64) -> Self {
        let channel = |v: i64| v.clamp(0, 255) as u8;
        Self {
            r: channel(r),
            g: channel(g),
            b: channel(b),
        }
    }

    pub fn text_color(&self) -> TextColor {
        let sum = self.r as u16 + self.g as u16 + self.b as u16;
        if sum > LIGHT_BACKGROUND_THRESHOLD {
            TextColor::Black
        } else {
            TextColor::White
        }
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::new(255, 231, 110)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(format!("expected 'r,g,b', got '{}'", s));
        }

        let mut channels = [0i64; 3];
        for (slot, part) in channels.iter_mut().zip(&parts) {
            // Older records carry fractional channels
            let value: f64 = part
                .parse()
                .map_err(|_| format!("invalid color channel '{}'", part))?;
            if value.is_nan() {
                return Err(format!("invalid color channel '{}'", part));
            }
            *slot = value.round() as i64;
        }

        Ok(Self::clamped(channels[0], channels[1], channels[2]))
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TextColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextColor::Black => write!(f, "black"),
            TextColor::White => write!(f, "white"),
        }
    }
}
