//! Label text: font lookup and glyph rasterisation

use super::canvas::Canvas;
use super::geometry::LabelBand;
use crate::error::{Error, Result};
use crate::style::LabelOptions;
use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use fontdb::{Database, Family, Query, Source};
use std::fs;
use std::path::Path;

/// Resolve a font from an explicit file, a family name, or any sans-serif face.
pub fn load_font(family: Option<&str>, path: Option<&Path>) -> Result<FontArc> {
    if let Some(path) = path {
        let data = fs::read(path)
            .map_err(|e| Error::Font(format!("Failed to read font {}: {e}", path.display())))?;
        return FontArc::try_from_vec(data)
            .map_err(|e| Error::Font(format!("Failed to parse font {}: {e}", path.display())));
    }

    let mut db = Database::new();
    db.load_system_fonts();

    let mut families = Vec::new();
    if let Some(name) = family {
        families.push(Family::Name(name));
    }
    families.push(Family::SansSerif);

    for candidate in families {
        if let Some(id) = db.query(&Query {
            families: &[candidate],
            ..Default::default()
        }) {
            if let Some(font) = load_face(&db, id)? {
                return Ok(font);
            }
        }
    }

    for face in db.faces() {
        if let Some(font) = load_face(&db, face.id)? {
            return Ok(font);
        }
    }

    Err(Error::Font(format!(
        "no usable system font found (requested {})",
        family.unwrap_or("sans-serif")
    )))
}

fn load_face(db: &Database, id: fontdb::ID) -> Result<Option<FontArc>> {
    let Some(face) = db.face(id) else {
        return Ok(None);
    };
    // Collections (.ttc) need the face index, which `FontArc` cannot take.
    if face.index != 0 {
        return Ok(None);
    }
    let data = match &face.source {
        Source::Binary(data) => data.as_ref().as_ref().to_vec(),
        Source::File(path) => fs::read(path)
            .map_err(|e| Error::Font(format!("Failed to read font {}: {e}", path.display())))?,
        Source::SharedFile(_, data) => data.as_ref().as_ref().to_vec(),
    };
    Ok(FontArc::try_from_vec(data).ok())
}

/// Horizontal advance of `text` at `px`, kerning included.
pub fn measure(font: &FontArc, px: f32, text: &str) -> f32 {
    let scaled = font.as_scaled(PxScale::from(px));
    let mut width = 0.0;
    let mut previous = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        previous = Some(id);
    }
    width
}

/// Draw `label` centered horizontally on the canvas and vertically in `band`.
pub fn draw(canvas: &mut Canvas, font: &FontArc, label: &LabelOptions, band: &LabelBand) {
    let text = label.text.trim();
    let scale = PxScale::from(band.font_px);
    let scaled = font.as_scaled(scale);

    let width = measure(font, band.font_px, text);
    let mut x = (canvas.width() as f32 - width) / 2.0;
    // Center the ascent..descent box on the band midline.
    let baseline = band.center_y() + (scaled.ascent() + scaled.descent()) / 2.0;

    let mut previous = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            x += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, point(x, baseline));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                canvas.blend_pixel(
                    bounds.min.x as i32 + gx as i32,
                    bounds.min.y as i32 + gy as i32,
                    label.color,
                    coverage,
                );
            });
        }
        x += scaled.h_advance(id);
        previous = Some(id);
    }

    tracing::debug!(text, width, font_px = band.font_px, "Drew label");
}
