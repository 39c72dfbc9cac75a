//! Render configuration: everything that decides how a code looks
//!
//! A [`RenderConfig`] is plain data. The renderer reads it and never
//! mutates it; the only behaviour here is the error-correction policy that
//! follows a logo being attached or removed.

mod color;

pub use color::{
    Color, ContrastReport, Fill, FillMode, GradientDirection, LOW_CONTRAST_THRESHOLD,
    check_contrast, contrast_ratio,
};

use crate::qr::ErrorCorrection;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Shape drawn for every dark data module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleShape {
    /// Plain squares
    #[default]
    Square,
    /// Inscribed circles
    Dots,
    /// Squares with a 0.25 cell corner radius
    Rounded,
    /// Squares with a 0.45 cell corner radius
    ExtraRounded,
    /// Top-left and bottom-right corners rounded
    Classy,
    /// Top-right and bottom-left corners rounded
    ClassyInverted,
    /// Rhombus through the edge midpoints
    Diamond,
    /// Plus sign
    Cross,
}

impl ModuleShape {
    /// Every variant, in declaration order.
    pub const ALL: [ModuleShape; 8] = [
        Self::Square,
        Self::Dots,
        Self::Rounded,
        Self::ExtraRounded,
        Self::Classy,
        Self::ClassyInverted,
        Self::Diamond,
        Self::Cross,
    ];
}

impl FromStr for ModuleShape {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().replace('_', "-").as_str() {
            "square" => Ok(Self::Square),
            "dots" => Ok(Self::Dots),
            "rounded" => Ok(Self::Rounded),
            "extra-rounded" => Ok(Self::ExtraRounded),
            "classy" => Ok(Self::Classy),
            "classy-inverted" => Ok(Self::ClassyInverted),
            "diamond" => Ok(Self::Diamond),
            "cross" => Ok(Self::Cross),
            _ => Err(format!("Unknown module shape '{value}'")),
        }
    }
}

/// Shape of the three finder patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EyeShape {
    /// Rectangular ring and block
    #[default]
    Square,
    /// Annulus with a round center
    Circle,
    /// Rounded ring and block
    Rounded,
    /// Rounded except the top-right and bottom-left corners
    Leaf,
}

impl EyeShape {
    /// Every variant, in declaration order.
    pub const ALL: [EyeShape; 4] = [Self::Square, Self::Circle, Self::Rounded, Self::Leaf];

    /// Whether common decoders locate and read codes with these finder
    /// patterns. Only square eyes keep the 1:1:3:1:1 run ratio intact.
    pub fn reliably_scannable(self) -> bool {
        matches!(self, Self::Square)
    }
}

impl FromStr for EyeShape {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "square" => Ok(Self::Square),
            "circle" => Ok(Self::Circle),
            "rounded" => Ok(Self::Rounded),
            "leaf" => Ok(Self::Leaf),
            _ => Err(format!("Unknown eye shape '{value}'")),
        }
    }
}

/// Clip mask applied to the logo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoShape {
    /// Drawn as-is
    #[default]
    None,
    /// Clipped to the inscribed circle
    Circle,
    /// Clipped to a rounded rectangle
    Rounded,
    /// Clipped to its square bounds
    Square,
}

impl FromStr for LogoShape {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "circle" => Ok(Self::Circle),
            "rounded" => Ok(Self::Rounded),
            "square" => Ok(Self::Square),
            _ => Err(format!("Unknown logo shape '{value}'")),
        }
    }
}

/// Logo to composite over the center of the code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoOptions {
    /// Image file to load
    pub path: PathBuf,
    /// Clip mask
    #[serde(default)]
    pub shape: LogoShape,
}

/// Where the label band sits relative to the code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelPosition {
    /// Above the code; the code shifts down
    Top,
    /// Below the code
    #[default]
    Bottom,
}

impl FromStr for LabelPosition {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            _ => Err(format!("Unknown label position '{value}'")),
        }
    }
}

/// Single line of text drawn in a band above or below the code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelOptions {
    /// Text to draw
    pub text: String,
    /// Band placement
    pub position: LabelPosition,
    /// Font family looked up in the system font database
    pub font_family: Option<String>,
    /// Explicit font file, takes precedence over `font_family`
    pub font_path: Option<PathBuf>,
    /// Font size relative to a 300 px code; scaled with the output size
    pub font_size: f32,
    /// Text color
    pub color: Color,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            text: String::new(),
            position: LabelPosition::Bottom,
            font_family: None,
            font_path: None,
            font_size: 16.0,
            color: Color::BLACK,
        }
    }
}

/// Full description of one styled code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Text to encode; empty renders nothing
    pub content: String,
    /// Error-correction level passed to the encoder
    pub error_correction: ErrorCorrection,
    /// Adjust `error_correction` when a logo is attached or removed
    pub auto_error_correction: bool,
    /// Width and height of the code region in pixels
    pub size: u32,
    /// Paint for modules and eyes
    pub foreground: Fill,
    /// Paint for the whole canvas behind the code
    pub background: Fill,
    /// Data module shape
    pub module_shape: ModuleShape,
    /// Finder pattern shape
    pub eye_shape: EyeShape,
    /// Optional centered logo
    pub logo: Option<LogoOptions>,
    /// Optional text label
    pub label: Option<LabelOptions>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            content: String::new(),
            error_correction: ErrorCorrection::Medium,
            auto_error_correction: true,
            size: 512,
            foreground: Fill::solid(Color::BLACK),
            background: Fill::solid(Color::WHITE),
            module_shape: ModuleShape::Square,
            eye_shape: EyeShape::Square,
            logo: None,
            label: None,
        }
    }
}

impl RenderConfig {
    /// Config encoding `content` with every other field at its default.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Attach a logo, raising error correction to high when it was low or medium.
    pub fn attach_logo(&mut self, logo: LogoOptions) {
        if self.auto_error_correction && self.error_correction <= ErrorCorrection::Medium {
            tracing::debug!(
                from = %self.error_correction,
                "Raising error correction to high for logo"
            );
            self.error_correction = ErrorCorrection::High;
        }
        self.logo = Some(logo);
    }

    /// Remove the logo, resetting error correction to medium.
    pub fn detach_logo(&mut self) {
        if self.logo.take().is_some() && self.auto_error_correction {
            self.error_correction = ErrorCorrection::Medium;
        }
    }

    /// The label, if one is configured with non-empty text.
    pub fn active_label(&self) -> Option<&LabelOptions> {
        self.label.as_ref().filter(|label| !label.text.trim().is_empty())
    }

    /// Compare foreground and background fills.
    pub fn contrast(&self) -> ContrastReport {
        check_contrast(&self.foreground, &self.background)
    }
}
