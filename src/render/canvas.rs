//! Minimal vector drawing surface
//!
//! Shape code only talks to [`PathSink`], so it can be exercised against a
//! recording sink in tests and against `tiny-skia` when rendering.

use crate::error::{Error, Result};
use image::RgbaImage;
use tiny_skia::{ColorU8, FillRule, Paint, Path, PathBuilder, Pixmap, Transform};

/// Path construction primitives used by the shape renderers.
pub trait PathSink {
    /// Start a new subpath.
    fn move_to(&mut self, x: f32, y: f32);
    /// Straight segment to `x`, `y`.
    fn line_to(&mut self, x: f32, y: f32);
    /// Quadratic curve through control point `cx`, `cy` to `x`, `y`.
    fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32);
    /// Closed full circle as its own subpath.
    fn circle(&mut self, cx: f32, cy: f32, r: f32);
    /// Close the current subpath.
    fn close(&mut self);
}

impl PathSink for PathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        PathBuilder::move_to(self, x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        PathBuilder::line_to(self, x, y);
    }

    fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        PathBuilder::quad_to(self, cx, cy, x, y);
    }

    fn circle(&mut self, cx: f32, cy: f32, r: f32) {
        if r > 0.0 {
            self.push_circle(cx, cy, r);
        }
    }

    fn close(&mut self) {
        PathBuilder::close(self);
    }
}

/// Axis-aligned rectangle subpath.
pub fn rect<S: PathSink + ?Sized>(sink: &mut S, x: f32, y: f32, w: f32, h: f32) {
    sink.move_to(x, y);
    sink.line_to(x + w, y);
    sink.line_to(x + w, y + h);
    sink.line_to(x, y + h);
    sink.close();
}

/// Corner radii in clockwise order from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerRadii {
    /// Top-left
    pub top_left: f32,
    /// Top-right
    pub top_right: f32,
    /// Bottom-right
    pub bottom_right: f32,
    /// Bottom-left
    pub bottom_left: f32,
}

impl CornerRadii {
    /// Same radius on every corner.
    pub fn uniform(r: f32) -> Self {
        Self {
            top_left: r,
            top_right: r,
            bottom_right: r,
            bottom_left: r,
        }
    }

    /// Round the top-left/bottom-right diagonal only.
    pub fn main_diagonal(r: f32) -> Self {
        Self {
            top_left: r,
            top_right: 0.0,
            bottom_right: r,
            bottom_left: 0.0,
        }
    }

    /// Round the top-right/bottom-left diagonal only.
    pub fn anti_diagonal(r: f32) -> Self {
        Self {
            top_left: 0.0,
            top_right: r,
            bottom_right: 0.0,
            bottom_left: r,
        }
    }

    fn clamped(self, w: f32, h: f32) -> Self {
        let max = (w.min(h) / 2.0).max(0.0);
        let clamp = |r: f32| r.clamp(0.0, max);
        Self {
            top_left: clamp(self.top_left),
            top_right: clamp(self.top_right),
            bottom_right: clamp(self.bottom_right),
            bottom_left: clamp(self.bottom_left),
        }
    }
}

/// Rectangle subpath with per-corner quadratic rounding.
pub fn rounded_rect<S: PathSink + ?Sized>(
    sink: &mut S,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    radii: CornerRadii,
) {
    let r = radii.clamped(w, h);
    sink.move_to(x + r.top_left, y);
    sink.line_to(x + w - r.top_right, y);
    if r.top_right > 0.0 {
        sink.quad_to(x + w, y, x + w, y + r.top_right);
    }
    sink.line_to(x + w, y + h - r.bottom_right);
    if r.bottom_right > 0.0 {
        sink.quad_to(x + w, y + h, x + w - r.bottom_right, y + h);
    }
    sink.line_to(x + r.bottom_left, y + h);
    if r.bottom_left > 0.0 {
        sink.quad_to(x, y + h, x, y + h - r.bottom_left);
    }
    sink.line_to(x, y + r.top_left);
    if r.top_left > 0.0 {
        sink.quad_to(x, y, x + r.top_left, y);
    }
    sink.close();
}

/// Raster target for one rendered code.
pub struct Canvas {
    pixmap: Pixmap,
}

impl Canvas {
    /// Transparent canvas of the given pixel size.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            Error::Render(format!("cannot allocate a {width}x{height} canvas"))
        })?;
        Ok(Self { pixmap })
    }

    /// Canvas width in pixels.
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Canvas height in pixels.
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Paint the whole canvas.
    pub fn fill_all(&mut self, paint: &Paint<'_>) {
        let mut pb = PathBuilder::new();
        rect(&mut pb, 0.0, 0.0, self.width() as f32, self.height() as f32);
        self.fill(pb, paint, FillRule::Winding);
    }

    /// Fill everything accumulated in `builder`. Empty builders are a no-op.
    pub fn fill(&mut self, builder: PathBuilder, paint: &Paint<'_>, rule: FillRule) {
        if let Some(path) = builder.finish() {
            self.fill_path(&path, paint, rule);
        }
    }

    /// Fill a finished path.
    pub fn fill_path(&mut self, path: &Path, paint: &Paint<'_>, rule: FillRule) {
        self.pixmap
            .fill_path(path, paint, rule, Transform::identity(), None);
    }

    /// Blend `color` into one pixel with `coverage` in `0.0..=1.0`.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: crate::style::Color, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return;
        }
        let alpha = (coverage.clamp(0.0, 1.0) * color.a as f32 / 255.0).clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }

        let idx = (y as u32 * self.width() + x as u32) as usize;
        let bg = self.pixmap.pixels()[idx].demultiply();
        let mix = |fg: u8, bg: u8| (fg as f32 * alpha + bg as f32 * (1.0 - alpha)).round() as u8;
        let out_alpha = (alpha * 255.0 + bg.alpha() as f32 * (1.0 - alpha)).round() as u8;
        self.pixmap.pixels_mut()[idx] = ColorU8::from_rgba(
            mix(color.r, bg.red()),
            mix(color.g, bg.green()),
            mix(color.b, bg.blue()),
            out_alpha,
        )
        .premultiply();
    }

    /// Borrow the underlying pixmap.
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Mutably borrow the underlying pixmap.
    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// Finish drawing.
    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }
}

/// Copy a straight-alpha image into a premultiplied pixmap.
pub fn pixmap_from_rgba(image: &RgbaImage) -> Result<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height()).ok_or_else(|| {
        Error::Render(format!(
            "cannot allocate a {}x{} pixmap",
            image.width(),
            image.height()
        ))
    })?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
    }
    Ok(pixmap)
}

/// Copy a premultiplied pixmap out to a straight-alpha image.
pub fn rgba_from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image
}

/// Records path commands; used to check shape geometry without rasterising.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct PathRecorder {
    pub points: Vec<(f32, f32)>,
    pub controls: Vec<(f32, f32)>,
    pub circles: Vec<(f32, f32, f32)>,
    pub subpaths: usize,
}

#[cfg(test)]
impl PathRecorder {
    /// Whether a vertex lies within 1e-4 of `(x, y)`.
    pub fn has_point(&self, x: f32, y: f32) -> bool {
        self.points
            .iter()
            .any(|&(px, py)| (px - x).abs() < 1e-4 && (py - y).abs() < 1e-4)
    }

    /// Bounding box `(min_x, min_y, max_x, max_y)` over every recorded point and circle.
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        let mut b = (f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
        let mut grow = |x: f32, y: f32| {
            b.0 = b.0.min(x);
            b.1 = b.1.min(y);
            b.2 = b.2.max(x);
            b.3 = b.3.max(y);
        };
        for &(x, y) in self.points.iter().chain(&self.controls) {
            grow(x, y);
        }
        for &(cx, cy, r) in &self.circles {
            grow(cx - r, cy - r);
            grow(cx + r, cy + r);
        }
        b
    }
}

#[cfg(test)]
impl PathSink for PathRecorder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.subpaths += 1;
        self.points.push((x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.points.push((x, y));
    }

    fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        self.controls.push((cx, cy));
        self.points.push((x, y));
    }

    fn circle(&mut self, cx: f32, cy: f32, r: f32) {
        self.subpaths += 1;
        self.circles.push((cx, cy, r));
    }

    fn close(&mut self) {}
}
