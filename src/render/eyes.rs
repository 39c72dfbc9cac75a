//! Finder pattern ("eye") shapes
//!
//! Each eye is a ring (7×7 outline with a 5×5 hole) filled with the even-odd
//! rule, plus a solid 3×3 block in the middle.

use super::canvas::{CornerRadii, PathSink, rect, rounded_rect};
use crate::style::EyeShape;

const OUTER_RADIUS: f32 = 2.0;
const HOLE_RADIUS: f32 = 1.5;
const BLOCK_RADIUS: f32 = 1.0;

/// Append the ring of one eye whose top-left corner is at `x`, `y`.
///
/// The outline and the hole are separate subpaths; fill with `FillRule::EvenOdd`.
pub fn draw_ring<S: PathSink + ?Sized>(
    sink: &mut S,
    shape: EyeShape,
    x: f32,
    y: f32,
    cell: f32,
) {
    let outer = 7.0 * cell;
    let hole = 5.0 * cell;
    match shape {
        EyeShape::Square => {
            rect(sink, x, y, outer, outer);
            rect(sink, x + cell, y + cell, hole, hole);
        }
        EyeShape::Circle => {
            let c = outer / 2.0;
            sink.circle(x + c, y + c, outer / 2.0);
            sink.circle(x + c, y + c, hole / 2.0);
        }
        EyeShape::Rounded | EyeShape::Leaf => {
            rounded_rect(sink, x, y, outer, outer, radii(shape, OUTER_RADIUS * cell));
            rounded_rect(
                sink,
                x + cell,
                y + cell,
                hole,
                hole,
                radii(shape, HOLE_RADIUS * cell),
            );
        }
    }
}

/// Append the 3×3 center block of one eye whose top-left corner is at `x`, `y`.
pub fn draw_block<S: PathSink + ?Sized>(
    sink: &mut S,
    shape: EyeShape,
    x: f32,
    y: f32,
    cell: f32,
) {
    let side = 3.0 * cell;
    let bx = x + 2.0 * cell;
    let by = y + 2.0 * cell;
    match shape {
        EyeShape::Square => rect(sink, bx, by, side, side),
        EyeShape::Circle => sink.circle(bx + side / 2.0, by + side / 2.0, side / 2.0),
        EyeShape::Rounded | EyeShape::Leaf => {
            rounded_rect(sink, bx, by, side, side, radii(shape, BLOCK_RADIUS * cell))
        }
    }
}

fn radii(shape: EyeShape, r: f32) -> CornerRadii {
    match shape {
        EyeShape::Leaf => CornerRadii::main_diagonal(r),
        _ => CornerRadii::uniform(r),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::canvas::{Canvas, PathRecorder, rgba_from_pixmap};
    use tiny_skia::{FillRule, Paint, PathBuilder};

    #[test]
    fn ring_has_outline_and_hole() {
        for shape in EyeShape::ALL {
            let mut rec = PathRecorder::default();
            draw_ring(&mut rec, shape, 0.0, 0.0, 10.0);
            assert_eq!(rec.subpaths, 2, "{shape:?}");
            let (x0, y0, x1, y1) = rec.bounds();
            assert!(x0 >= -1e-4 && y0 >= -1e-4 && x1 <= 70.0 + 1e-4 && y1 <= 70.0 + 1e-4);
        }
    }

    #[test]
    fn circle_eye_is_concentric() {
        let mut rec = PathRecorder::default();
        draw_ring(&mut rec, EyeShape::Circle, 0.0, 0.0, 10.0);
        draw_block(&mut rec, EyeShape::Circle, 0.0, 0.0, 10.0);
        assert_eq!(
            rec.circles,
            vec![(35.0, 35.0, 35.0), (35.0, 35.0, 25.0), (35.0, 35.0, 15.0)]
        );
    }

    #[test]
    fn leaf_keeps_top_right_and_bottom_left_sharp() {
        let mut rec = PathRecorder::default();
        draw_ring(&mut rec, EyeShape::Leaf, 0.0, 0.0, 10.0);
        // Sharp outer corners are path vertices.
        assert!(rec.has_point(70.0, 0.0));
        assert!(rec.has_point(0.0, 70.0));
        // Rounded outer corners start 2 cells in.
        assert!(rec.has_point(20.0, 0.0));
        assert!(rec.has_point(70.0, 50.0));
    }

    #[test]
    fn block_sits_two_cells_in() {
        let mut rec = PathRecorder::default();
        draw_block(&mut rec, EyeShape::Square, 5.0, 5.0, 10.0);
        assert_eq!(rec.bounds(), (25.0, 25.0, 55.0, 55.0));
    }

    #[test]
    fn even_odd_ring_leaves_hole_clear() {
        let cell = 10.0;
        let mut canvas = Canvas::new(70, 70).unwrap();
        canvas.pixmap_mut().fill(tiny_skia::Color::WHITE);

        let mut paint = Paint::default();
        paint.set_color_rgba8(0, 0, 0, 255);

        let mut ring = PathBuilder::new();
        draw_ring(&mut ring, EyeShape::Square, 0.0, 0.0, cell);
        canvas.fill(ring, &paint, FillRule::EvenOdd);
        let mut block = PathBuilder::new();
        draw_block(&mut block, EyeShape::Square, 0.0, 0.0, cell);
        canvas.fill(block, &paint, FillRule::Winding);

        let image = rgba_from_pixmap(canvas.pixmap());
        // Ring
        assert_eq!(image.get_pixel(5, 35)[0], 0);
        // Gap between ring and block
        assert_eq!(image.get_pixel(15, 35)[0], 255);
        // Block
        assert_eq!(image.get_pixel(35, 35)[0], 0);
    }
}
