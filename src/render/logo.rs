//! Logo exclusion zone and compositing

use super::canvas::{Canvas, CornerRadii, PathSink, pixmap_from_rgba, rect, rounded_rect};
use super::geometry::Geometry;
use crate::error::{Error, Result};
use crate::qr::FINDER_SIZE;
use crate::style::LogoShape;
use image::RgbaImage;
use image::imageops::FilterType;
use std::path::Path;
use tiny_skia::{FillRule, FilterQuality, Paint, PathBuilder, Pattern, SpreadMode, Transform};

/// Logo width as a fraction of the code region.
pub const LOGO_FRACTION: f32 = 0.25;

/// Corner radius of a `rounded` logo mask as a fraction of the logo side.
pub const ROUNDED_LOGO_RADIUS: f32 = 0.2;

/// Odd-sized square of modules centered on the matrix, left blank for the logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExclusionZone {
    /// First excluded row and column
    pub start: usize,
    /// Side length in modules (always odd)
    pub span: usize,
}

impl ExclusionZone {
    /// Centered zone of `span` modules in an `n`×`n` matrix.
    ///
    /// Even spans are bumped up by one. Returns `None` when the zone would
    /// reach into the finder patterns.
    pub fn centered(n: usize, span: usize) -> Option<Self> {
        let span = if span % 2 == 0 { span + 1 } else { span };
        if n % 2 == 0 || span == 0 || span + 2 * FINDER_SIZE > n {
            return None;
        }
        Some(Self {
            start: (n - span) / 2,
            span,
        })
    }

    /// Zone large enough to hold a logo covering [`LOGO_FRACTION`] of the code.
    pub fn for_logo(geometry: &Geometry) -> Option<Self> {
        let n = geometry.modules;
        let wanted = (geometry.size * LOGO_FRACTION / geometry.cell).ceil() as usize;
        let max_span = n.saturating_sub(2 * FINDER_SIZE);
        let span = wanted.max(1);
        let span = if span % 2 == 0 { span + 1 } else { span };
        Self::centered(n, span.min(max_span))
    }

    /// Whether `row`, `col` is inside the zone.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        let end = self.start + self.span;
        (self.start..end).contains(&row) && (self.start..end).contains(&col)
    }

    /// Pixel bounds `(x, y, side)` of the zone.
    pub fn pixel_bounds(&self, geometry: &Geometry) -> (f32, f32, f32) {
        let (x, y) = geometry.module_origin(self.start, self.start);
        (x, y, self.span as f32 * geometry.cell)
    }
}

/// Read and decode a logo image, blocking the current thread.
pub fn load_logo(path: &Path) -> Result<RgbaImage> {
    let bytes = std::fs::read(path).map_err(|e| {
        Error::Image(format!("Failed to read logo {}: {e}", path.display()))
    })?;
    let image = image::load_from_memory(&bytes)?;
    tracing::debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "Loaded logo"
    );
    Ok(image.to_rgba8())
}

/// Append the clip outline for `shape` over the `w`×`h` box at `x`, `y`.
pub fn clip_path<S: PathSink + ?Sized>(
    sink: &mut S,
    shape: LogoShape,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
) {
    match shape {
        LogoShape::Circle => sink.circle(x + w / 2.0, y + h / 2.0, w.min(h) / 2.0),
        LogoShape::Rounded => rounded_rect(
            sink,
            x,
            y,
            w,
            h,
            CornerRadii::uniform(w.min(h) * ROUNDED_LOGO_RADIUS),
        ),
        LogoShape::Square | LogoShape::None => rect(sink, x, y, w, h),
    }
}

/// Draw `logo` centered in `zone`, scaled to fit the logo box and clipped to `shape`.
pub fn composite(
    canvas: &mut Canvas,
    logo: &RgbaImage,
    shape: LogoShape,
    zone: &ExclusionZone,
    geometry: &Geometry,
) -> Result<()> {
    if logo.width() == 0 || logo.height() == 0 {
        return Err(Error::Image("logo image is empty".to_string()));
    }

    let (zx, zy, side) = zone.pixel_bounds(geometry);
    let target = (geometry.size * LOGO_FRACTION).min(side);

    let scale = (target / logo.width() as f32).min(target / logo.height() as f32);
    let w = ((logo.width() as f32 * scale).round() as u32).max(1);
    let h = ((logo.height() as f32 * scale).round() as u32).max(1);
    let resized = image::imageops::resize(logo, w, h, FilterType::Lanczos3);
    let pixmap = pixmap_from_rgba(&resized)?;

    let x = (zx + (side - w as f32) / 2.0).round();
    let y = (zy + (side - h as f32) / 2.0).round();

    let paint = Paint {
        shader: Pattern::new(
            pixmap.as_ref(),
            SpreadMode::Pad,
            FilterQuality::Nearest,
            1.0,
            Transform::from_translate(x, y),
        ),
        anti_alias: true,
        ..Paint::default()
    };

    let mut pb = PathBuilder::new();
    clip_path(&mut pb, shape, x, y, w as f32, h as f32);
    canvas.fill(pb, &paint, FillRule::Winding);

    tracing::debug!(x, y, w, h, ?shape, span = zone.span, "Composited logo");
    Ok(())
}
