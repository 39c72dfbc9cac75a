//! Styled QR rendering
//!
//! [`render`] is a pure function of a [`RenderConfig`] and preloaded
//! [`RenderAssets`]. It runs a single pass over a fresh canvas:
//!
//! 1. encode the content into a [`ModuleMatrix`]
//! 2. plan the [`Geometry`]
//! 3. paint the background
//! 4. paint data modules, skipping finder zones and the logo zone
//! 5. paint the three eyes
//! 6. composite the logo
//! 7. draw the label

pub mod canvas;
pub mod eyes;
pub mod fill;
pub mod geometry;
pub mod label;
pub mod logo;
pub mod modules;

pub use geometry::{Geometry, LabelBand, MARGIN_MODULES};
pub use logo::ExclusionZone;

use crate::error::{Error, Result};
use crate::qr::{ModuleMatrix, QrEncoder};
use crate::style::RenderConfig;
use ab_glyph::FontArc;
use canvas::Canvas;
use fill::FillTarget;
use image::RgbaImage;
use std::path::Path;
use std::time::Instant;
use tiny_skia::{FillRule, PathBuilder, Pixmap};

/// External inputs a render needs besides its configuration.
#[derive(Clone, Default)]
pub struct RenderAssets {
    /// Decoded logo, if one was configured and loaded
    pub logo: Option<RgbaImage>,
    /// Label font, if a label was configured and a font resolved
    pub font: Option<FontArc>,
}

impl std::fmt::Debug for RenderAssets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderAssets")
            .field("logo", &self.logo.as_ref().map(|l| l.dimensions()))
            .field("font", &self.font.is_some())
            .finish()
    }
}

impl RenderAssets {
    /// Load the logo and font named by `config` on the current thread.
    ///
    /// Failures are logged and leave the corresponding asset empty.
    pub fn load_blocking(config: &RenderConfig) -> Self {
        let logo = config.logo.as_ref().and_then(|options| {
            logo::load_logo(&options.path)
                .map_err(|err| {
                    tracing::warn!(
                        path = %options.path.display(),
                        "Logo unavailable, rendering without it: {err}"
                    )
                })
                .ok()
        });

        let font = config.active_label().and_then(|label| {
            label::load_font(label.font_family.as_deref(), label.font_path.as_deref())
                .map_err(|err| tracing::warn!("Label font unavailable: {err}"))
                .ok()
        });

        Self { logo, font }
    }

    /// Load assets on a blocking worker; resolves once, successfully or not.
    pub async fn load(config: &RenderConfig) -> Self {
        if config.logo.is_none() && config.active_label().is_none() {
            return Self::default();
        }
        let config = config.clone();
        match tokio::task::spawn_blocking(move || Self::load_blocking(&config)).await {
            Ok(assets) => assets,
            Err(err) => {
                tracing::warn!("Asset loading task failed: {err}");
                Self::default()
            }
        }
    }
}

/// Encoded matrix plus layout, before any pixels are touched.
#[derive(Debug, Clone)]
pub struct RenderPlan {
    /// Encoded modules
    pub matrix: ModuleMatrix,
    /// Pixel layout
    pub geometry: Geometry,
    /// Modules left blank under the logo
    pub exclusion: Option<ExclusionZone>,
}

impl RenderPlan {
    /// Plan a render. `Ok(None)` when there is no content to encode.
    pub fn new(config: &RenderConfig, with_logo: bool) -> Result<Option<Self>> {
        if config.content.is_empty() {
            return Ok(None);
        }

        let matrix = QrEncoder::with_level(config.error_correction).encode_str(&config.content)?;
        let geometry = Geometry::plan(matrix.size(), config.size, config.active_label())?;
        let exclusion = if with_logo {
            ExclusionZone::for_logo(&geometry)
        } else {
            None
        };

        Ok(Some(Self {
            matrix,
            geometry,
            exclusion,
        }))
    }

    /// Modules the data pass paints.
    pub fn data_modules(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        modules::data_modules(&self.matrix, self.exclusion.as_ref())
    }
}

/// Finished raster plus the layout it was drawn with.
pub struct RenderedImage {
    pixmap: Pixmap,
    /// Layout used for this image
    pub geometry: Geometry,
}

impl std::fmt::Debug for RenderedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderedImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("geometry", &self.geometry)
            .finish()
    }
}

impl RenderedImage {
    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Straight-alpha RGBA copy.
    pub fn to_rgba_image(&self) -> RgbaImage {
        canvas::rgba_from_pixmap(&self.pixmap)
    }

    /// PNG-encoded bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| Error::Image(format!("PNG encoding failed: {e}")))
    }

    /// Write a PNG file.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        let bytes = self.to_png()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// Render `config` into an image. `Ok(None)` when the content is empty.
pub fn render(config: &RenderConfig, assets: &RenderAssets) -> Result<Option<RenderedImage>> {
    let started = Instant::now();

    let logo = config
        .logo
        .as_ref()
        .zip(assets.logo.as_ref())
        .map(|(options, image)| (options.shape, image));

    let Some(plan) = RenderPlan::new(config, logo.is_some())? else {
        tracing::debug!("Empty content, nothing to render");
        return Ok(None);
    };
    let geometry = plan.geometry;
    let cell = geometry.cell;

    let mut canvas = Canvas::new(geometry.canvas_width(), geometry.canvas_height())?;

    let full = FillTarget::from_rect((
        0.0,
        0.0,
        canvas.width() as f32,
        canvas.height() as f32,
    ));
    canvas.fill_all(&fill::resolve(&config.background, full));

    let fg = fill::resolve(&config.foreground, FillTarget::from_rect(geometry.qr_rect()));

    let mut body = PathBuilder::new();
    for (row, col) in plan.data_modules() {
        let (x, y) = geometry.module_origin(row, col);
        modules::draw_module(&mut body, config.module_shape, x, y, cell);
    }
    canvas.fill(body, &fg, FillRule::Winding);

    let mut rings = PathBuilder::new();
    let mut blocks = PathBuilder::new();
    for (row, col) in plan.matrix.finder_origins() {
        let (x, y) = geometry.module_origin(row, col);
        eyes::draw_ring(&mut rings, config.eye_shape, x, y, cell);
        eyes::draw_block(&mut blocks, config.eye_shape, x, y, cell);
    }
    canvas.fill(rings, &fg, FillRule::EvenOdd);
    canvas.fill(blocks, &fg, FillRule::Winding);

    if let (Some((shape, image)), Some(zone)) = (logo, plan.exclusion.as_ref()) {
        if let Err(err) = logo::composite(&mut canvas, image, shape, zone, &geometry) {
            tracing::warn!("Skipping logo: {err}");
        }
    }

    if let (Some(options), Some(band)) = (config.active_label(), geometry.label.as_ref()) {
        match assets.font.as_ref() {
            Some(font) => label::draw(&mut canvas, font, options, band),
            None => tracing::warn!(text = %options.text, "No font loaded, label left blank"),
        }
    }

    tracing::debug!(
        modules = plan.matrix.size(),
        width = canvas.width(),
        height = canvas.height(),
        module_shape = ?config.module_shape,
        eye_shape = ?config.eye_shape,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Rendered QR code"
    );

    Ok(Some(RenderedImage {
        pixmap: canvas.into_pixmap(),
        geometry,
    }))
}
