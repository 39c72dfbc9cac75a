//! Colors, fills and the contrast check

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Contrast ratios below this value are flagged as hard to scan.
pub const LOW_CONTRAST_THRESHOLD: f32 = 3.0;

/// An sRGB color with straight (non-premultiplied) alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel
    pub a: u8,
}

impl Color {
    /// Opaque black
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Opaque white
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Opaque color from RGB channels
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(value: &str) -> Result<Self> {
        let hex = value.trim().trim_start_matches('#');
        let invalid = || Error::InvalidColor(value.to_string());
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

        if !hex.is_ascii() {
            return Err(invalid());
        }

        match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            6 | 8 => {
                let a = if hex.len() == 8 {
                    channel(&hex[6..8])?
                } else {
                    255
                };
                Ok(Self {
                    r: channel(&hex[0..2])?,
                    g: channel(&hex[2..4])?,
                    b: channel(&hex[4..6])?,
                    a,
                })
            }
            _ => Err(invalid()),
        }
    }

    /// WCAG relative luminance in `0.0..=1.0`.
    pub fn relative_luminance(&self) -> f32 {
        fn linear(channel: u8) -> f32 {
            let c = channel as f32 / 255.0;
            if c <= 0.039_28 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }

    pub(crate) fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// WCAG contrast ratio between two colors, always `>= 1.0`.
pub fn contrast_ratio(a: Color, b: Color) -> f32 {
    let la = a.relative_luminance();
    let lb = b.relative_luminance();
    let (hi, lo) = if la >= lb { (la, lb) } else { (lb, la) };
    (hi + 0.05) / (lo + 0.05)
}

/// Whether a fill is a single color or a two-stop gradient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    /// Single color; the secondary color is ignored
    #[default]
    Solid,
    /// Gradient from the primary to the secondary color
    Gradient,
}

/// Gradient orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientDirection {
    /// Top to bottom
    #[default]
    Vertical,
    /// Left to right
    Horizontal,
    /// Top-left to bottom-right
    Diagonal,
    /// Center outwards
    Radial,
}

impl FromStr for GradientDirection {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "vertical" => Ok(Self::Vertical),
            "horizontal" => Ok(Self::Horizontal),
            "diagonal" => Ok(Self::Diagonal),
            "radial" => Ok(Self::Radial),
            _ => Err(format!("Unknown gradient direction '{value}'")),
        }
    }
}

/// Paint description for the foreground or background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fill {
    /// Solid or gradient
    pub mode: FillMode,
    /// First color (the only one used in solid mode)
    pub primary: Color,
    /// Second gradient stop
    pub secondary: Color,
    /// Gradient orientation
    pub direction: GradientDirection,
}

impl Default for Fill {
    fn default() -> Self {
        Self::solid(Color::BLACK)
    }
}

impl Fill {
    /// Single-color fill
    pub fn solid(color: Color) -> Self {
        Self {
            mode: FillMode::Solid,
            primary: color,
            secondary: color,
            direction: GradientDirection::Vertical,
        }
    }

    /// Two-color gradient fill
    pub fn gradient(primary: Color, secondary: Color, direction: GradientDirection) -> Self {
        Self {
            mode: FillMode::Gradient,
            primary,
            secondary,
            direction,
        }
    }

    /// Colors that actually appear in this fill
    pub fn colors(&self) -> Vec<Color> {
        match self.mode {
            FillMode::Solid => vec![self.primary],
            FillMode::Gradient => vec![self.primary, self.secondary],
        }
    }
}

/// Outcome of comparing foreground and background fills
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContrastReport {
    /// Worst-case ratio over every foreground/background color pair
    pub ratio: f32,
    /// Set when `ratio` is below [`LOW_CONTRAST_THRESHOLD`]
    pub low_contrast: bool,
}

/// Compare every foreground color against every background color.
pub fn check_contrast(foreground: &Fill, background: &Fill) -> ContrastReport {
    let ratio = foreground
        .colors()
        .into_iter()
        .flat_map(|fg| background.colors().into_iter().map(move |bg| contrast_ratio(fg, bg)))
        .fold(f32::INFINITY, f32::min);

    ContrastReport {
        ratio,
        low_contrast: ratio < LOW_CONTRAST_THRESHOLD,
    }
}
