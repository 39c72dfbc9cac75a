//! Pixel layout of the code and its label band

use crate::error::{Error, Result};
use crate::style::{LabelOptions, LabelPosition};

/// Quiet-zone width in modules on every side of the code.
pub const MARGIN_MODULES: usize = 2;

/// Label band height as a multiple of the scaled font size.
pub const LABEL_BAND_RATIO: f32 = 2.5;

/// Output size at which label font sizes are taken literally.
pub const LABEL_REFERENCE_SIZE: f32 = 300.0;

/// Vertical strip reserved for the label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelBand {
    /// Top edge in canvas pixels
    pub top: f32,
    /// Band height in pixels
    pub height: f32,
    /// Font size in pixels after scaling to the output size
    pub font_px: f32,
}

impl LabelBand {
    /// Vertical center of the band.
    pub fn center_y(&self) -> f32 {
        self.top + self.height / 2.0
    }
}

/// Resolved layout for one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// Modules per side (N)
    pub modules: usize,
    /// Margin in modules (M)
    pub margin: usize,
    /// Side of the square code region in pixels (S)
    pub size: f32,
    /// Pixel size of one module
    pub cell: f32,
    /// How far the code region is pushed down by a top label
    pub qr_offset_y: f32,
    /// Label band, when a label is present
    pub label: Option<LabelBand>,
}

impl Geometry {
    /// Plan the standard layout with a two-module margin.
    pub fn plan(modules: usize, size: u32, label: Option<&LabelOptions>) -> Result<Self> {
        Self::plan_with_margin(modules, size, MARGIN_MODULES, label)
    }

    /// Plan a layout with an explicit margin.
    pub fn plan_with_margin(
        modules: usize,
        size: u32,
        margin: usize,
        label: Option<&LabelOptions>,
    ) -> Result<Self> {
        let size = size as f32;
        let span = (modules + 2 * margin) as f32;
        let cell = size / span;
        if modules == 0 || cell < 1.0 {
            return Err(Error::Render(format!(
                "output size {size}px is too small for {modules} modules plus margin"
            )));
        }

        let mut qr_offset_y = 0.0;
        let label = label.map(|options| {
            let font_px = options.font_size.max(1.0) * size / LABEL_REFERENCE_SIZE;
            let height = LABEL_BAND_RATIO * font_px;
            let top = match options.position {
                LabelPosition::Top => {
                    qr_offset_y = height;
                    0.0
                }
                LabelPosition::Bottom => size,
            };
            LabelBand {
                top,
                height,
                font_px,
            }
        });

        Ok(Self {
            modules,
            margin,
            size,
            cell,
            qr_offset_y,
            label,
        })
    }

    /// Canvas width in whole pixels.
    pub fn canvas_width(&self) -> u32 {
        self.size.ceil() as u32
    }

    /// Canvas height in whole pixels, label band included.
    pub fn canvas_height(&self) -> u32 {
        let band = self.label.map(|b| b.height).unwrap_or(0.0);
        (self.size + band).ceil() as u32
    }

    /// Top-left pixel of the module at `row`, `col`.
    pub fn module_origin(&self, row: usize, col: usize) -> (f32, f32) {
        let x = (self.margin + col) as f32 * self.cell;
        let y = self.qr_offset_y + (self.margin + row) as f32 * self.cell;
        (x, y)
    }

    /// The code region as `(x, y, width, height)`.
    pub fn qr_rect(&self) -> (f32, f32, f32, f32) {
        (0.0, self.qr_offset_y, self.size, self.size)
    }
}
