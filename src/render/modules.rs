//! Data module shapes

use super::canvas::{CornerRadii, PathSink, rect, rounded_rect};
use super::logo::ExclusionZone;
use crate::qr::ModuleMatrix;
use crate::style::ModuleShape;

/// Overdraw for square modules so neighbours meet without hairline seams.
const SQUARE_BLEED: f32 = 0.5;
/// Corner radius of `rounded` modules, in cells.
const ROUNDED_RADIUS: f32 = 0.25;
/// Corner radius of `extra-rounded` modules, in cells.
const EXTRA_ROUNDED_RADIUS: f32 = 0.45;
/// Corner radius of the rounded corners of `classy` modules, in cells.
const CLASSY_RADIUS: f32 = 0.5;
/// Bar thickness of `cross` modules, in cells.
const CROSS_BAR: f32 = 0.35;

/// Append one module of `shape` with its top-left corner at `x`, `y`.
pub fn draw_module<S: PathSink + ?Sized>(
    sink: &mut S,
    shape: ModuleShape,
    x: f32,
    y: f32,
    cell: f32,
) {
    match shape {
        ModuleShape::Square => rect(sink, x, y, cell + SQUARE_BLEED, cell + SQUARE_BLEED),
        ModuleShape::Dots => {
            let r = cell / 2.0;
            sink.circle(x + r, y + r, r);
        }
        ModuleShape::Rounded => rounded_rect(
            sink,
            x,
            y,
            cell,
            cell,
            CornerRadii::uniform(cell * ROUNDED_RADIUS),
        ),
        ModuleShape::ExtraRounded => rounded_rect(
            sink,
            x,
            y,
            cell,
            cell,
            CornerRadii::uniform(cell * EXTRA_ROUNDED_RADIUS),
        ),
        ModuleShape::Classy => rounded_rect(
            sink,
            x,
            y,
            cell,
            cell,
            CornerRadii::main_diagonal(cell * CLASSY_RADIUS),
        ),
        ModuleShape::ClassyInverted => rounded_rect(
            sink,
            x,
            y,
            cell,
            cell,
            CornerRadii::anti_diagonal(cell * CLASSY_RADIUS),
        ),
        ModuleShape::Diamond => {
            let half = cell / 2.0;
            sink.move_to(x + half, y);
            sink.line_to(x + cell, y + half);
            sink.line_to(x + half, y + cell);
            sink.line_to(x, y + half);
            sink.close();
        }
        ModuleShape::Cross => {
            let bar = cell * CROSS_BAR;
            let inset = (cell - bar) / 2.0;
            rect(sink, x, y + inset, cell, bar);
            rect(sink, x + inset, y, bar, cell);
        }
    }
}

/// Dark modules that the data pass paints: finder zones and the exclusion
/// zone are left to their dedicated steps.
pub fn data_modules<'a>(
    matrix: &'a ModuleMatrix,
    exclusion: Option<&'a ExclusionZone>,
) -> impl Iterator<Item = (usize, usize)> + 'a {
    matrix.dark_modules().filter(move |&(row, col)| {
        !matrix.in_finder_zone(row, col) && !exclusion.is_some_and(|zone| zone.contains(row, col))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::{ErrorCorrection, QrEncoder};
    use crate::render::canvas::PathRecorder;

    fn bounds_of(shape: ModuleShape) -> (f32, f32, f32, f32) {
        let mut rec = PathRecorder::default();
        draw_module(&mut rec, shape, 10.0, 20.0, 8.0);
        rec.bounds()
    }

    #[test]
    fn every_shape_stays_within_its_cell() {
        for shape in ModuleShape::ALL {
            let (x0, y0, x1, y1) = bounds_of(shape);
            let bleed = if shape == ModuleShape::Square { SQUARE_BLEED } else { 0.0 };
            assert!(x0 >= 10.0 && y0 >= 20.0, "{shape:?} starts outside the cell");
            assert!(
                x1 <= 18.0 + bleed + 1e-4 && y1 <= 28.0 + bleed + 1e-4,
                "{shape:?} ends outside the cell"
            );
        }
    }

    #[test]
    fn square_bleeds_half_a_pixel() {
        assert_eq!(bounds_of(ModuleShape::Square), (10.0, 20.0, 18.5, 28.5));
    }

    #[test]
    fn dots_are_inscribed() {
        let mut rec = PathRecorder::default();
        draw_module(&mut rec, ModuleShape::Dots, 0.0, 0.0, 10.0);
        assert_eq!(rec.circles, vec![(5.0, 5.0, 5.0)]);
    }

    #[test]
    fn diamond_touches_edge_midpoints() {
        let mut rec = PathRecorder::default();
        draw_module(&mut rec, ModuleShape::Diamond, 0.0, 0.0, 10.0);
        assert_eq!(rec.points, vec![(5.0, 0.0), (10.0, 5.0), (5.0, 10.0), (0.0, 5.0)]);
    }

    #[test]
    fn cross_is_two_centered_bars() {
        let mut rec = PathRecorder::default();
        draw_module(&mut rec, ModuleShape::Cross, 0.0, 0.0, 20.0);
        assert_eq!(rec.subpaths, 2);
        // Horizontal bar spans y 6.5..13.5, vertical bar x 6.5..13.5.
        assert!(rec.has_point(0.0, 6.5));
        assert!(rec.has_point(20.0, 13.5));
        assert!(rec.has_point(6.5, 0.0));
        assert!(rec.has_point(13.5, 20.0));
    }

    #[test]
    fn classy_variants_round_opposite_diagonals() {
        let mut classy = PathRecorder::default();
        draw_module(&mut classy, ModuleShape::Classy, 0.0, 0.0, 10.0);
        assert_eq!(classy.controls, vec![(10.0, 10.0), (0.0, 0.0)]);
        assert!(classy.has_point(10.0, 0.0));
        assert!(classy.has_point(0.0, 10.0));

        let mut inverted = PathRecorder::default();
        draw_module(&mut inverted, ModuleShape::ClassyInverted, 0.0, 0.0, 10.0);
        assert_eq!(inverted.controls, vec![(10.0, 0.0), (0.0, 10.0)]);
        assert!(inverted.has_point(0.0, 0.0));
        assert!(inverted.has_point(10.0, 10.0));
    }

    #[test]
    fn rounded_radii_scale_with_cell() {
        let mut rounded = PathRecorder::default();
        draw_module(&mut rounded, ModuleShape::Rounded, 0.0, 0.0, 20.0);
        assert!(rounded.has_point(5.0, 0.0));

        let mut extra = PathRecorder::default();
        draw_module(&mut extra, ModuleShape::ExtraRounded, 0.0, 0.0, 20.0);
        assert!(extra.has_point(9.0, 0.0));
        assert_eq!(extra.controls.len(), 4);
    }

    #[test]
    fn data_modules_skip_finder_zones() {
        let matrix = QrEncoder::with_level(ErrorCorrection::High)
            .encode_str("https://example.com/finder-skip")
            .unwrap();
        let n = matrix.size();
        let drawn: Vec<_> = data_modules(&matrix, None).collect();

        assert!(!drawn.is_empty());
        for (r, c) in &drawn {
            let (r, c) = (*r, *c);
            let in_finder = (r < 7 && c < 7) || (r < 7 && c >= n - 7) || (r >= n - 7 && c < 7);
            assert!(!in_finder, "module ({r}, {c}) lies in a finder zone");
            assert!(matrix.is_dark(r, c));
        }
    }

    #[test]
    fn data_modules_skip_exclusion_zone() {
        let matrix = QrEncoder::with_level(ErrorCorrection::High)
            .encode_str("https://example.com/exclusion")
            .unwrap();
        let zone = ExclusionZone::centered(matrix.size(), 5).unwrap();
        let drawn: Vec<_> = data_modules(&matrix, Some(&zone)).collect();

        assert!(drawn.iter().all(|&(r, c)| !zone.contains(r, c)));
        let without_zone = data_modules(&matrix, None).count();
        let inside = data_modules(&matrix, None)
            .filter(|&(r, c)| zone.contains(r, c))
            .count();
        assert_eq!(drawn.len(), without_zone - inside);
    }
}
