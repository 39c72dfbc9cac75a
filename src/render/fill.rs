//! Turns a [`Fill`] into a `tiny-skia` paint for a target rectangle

use crate::style::{Fill, FillMode, GradientDirection};
use tiny_skia::{
    GradientStop, LinearGradient, Paint, Point, RadialGradient, Shader, SpreadMode, Transform,
};

/// Inner radius of a radial gradient as a fraction of the target width.
pub const RADIAL_INNER_FRACTION: f32 = 0.1;
/// Outer radius of a radial gradient as a fraction of the larger target side.
pub const RADIAL_OUTER_FRACTION: f32 = 0.8;

/// Rectangle a fill is stretched over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillTarget {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl FillTarget {
    /// Target from an `(x, y, width, height)` tuple.
    pub fn from_rect((x, y, width, height): (f32, f32, f32, f32)) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Where a gradient starts and ends in canvas space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientGeometry {
    /// Linear from `start` to `end`
    Linear {
        /// Start point
        start: (f32, f32),
        /// End point
        end: (f32, f32),
    },
    /// Concentric circles around `center`
    Radial {
        /// Shared center
        center: (f32, f32),
        /// Radius where the first color ends
        inner: f32,
        /// Radius where the second color starts
        outer: f32,
    },
}

/// Gradient endpoints for `direction` over `target`.
pub fn gradient_geometry(direction: GradientDirection, target: FillTarget) -> GradientGeometry {
    let FillTarget {
        x,
        y,
        width: w,
        height: h,
    } = target;
    match direction {
        GradientDirection::Vertical => GradientGeometry::Linear {
            start: (x, y),
            end: (x, y + h),
        },
        GradientDirection::Horizontal => GradientGeometry::Linear {
            start: (x, y),
            end: (x + w, y),
        },
        GradientDirection::Diagonal => GradientGeometry::Linear {
            start: (x, y),
            end: (x + w, y + h),
        },
        GradientDirection::Radial => GradientGeometry::Radial {
            center: (x + w / 2.0, y + h / 2.0),
            inner: w * RADIAL_INNER_FRACTION,
            outer: w.max(h) * RADIAL_OUTER_FRACTION,
        },
    }
}

/// Build the paint for `fill` over `target`.
pub fn resolve(fill: &Fill, target: FillTarget) -> Paint<'static> {
    let shader = match fill.mode {
        FillMode::Solid => Shader::SolidColor(fill.primary.to_skia()),
        FillMode::Gradient => gradient_shader(fill, target).unwrap_or_else(|| {
            tracing::debug!(?target, "Degenerate gradient, falling back to solid fill");
            Shader::SolidColor(fill.primary.to_skia())
        }),
    };

    Paint {
        shader,
        anti_alias: true,
        ..Paint::default()
    }
}

fn gradient_shader(fill: &Fill, target: FillTarget) -> Option<Shader<'static>> {
    let first = fill.primary.to_skia();
    let second = fill.secondary.to_skia();

    match gradient_geometry(fill.direction, target) {
        GradientGeometry::Linear { start, end } => LinearGradient::new(
            Point::from_xy(start.0, start.1),
            Point::from_xy(end.0, end.1),
            vec![GradientStop::new(0.0, first), GradientStop::new(1.0, second)],
            SpreadMode::Pad,
            Transform::identity(),
        ),
        GradientGeometry::Radial {
            center,
            inner,
            outer,
        } => {
            if outer <= 0.0 {
                return None;
            }
            // Everything inside the inner radius keeps the first color.
            let inner_stop = (inner / outer).clamp(0.0, 1.0);
            let center = Point::from_xy(center.0, center.1);
            RadialGradient::new(
                center,
                center,
                outer,
                vec![
                    GradientStop::new(inner_stop, first),
                    GradientStop::new(1.0, second),
                ],
                SpreadMode::Pad,
                Transform::identity(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::canvas::{Canvas, rgba_from_pixmap};
    use crate::style::Color;

    fn target() -> FillTarget {
        FillTarget {
            x: 0.0,
            y: 100.0,
            width: 400.0,
            height: 300.0,
        }
    }

    #[test]
    fn radial_uses_center_and_fixed_radii() {
        match gradient_geometry(GradientDirection::Radial, target()) {
            GradientGeometry::Radial {
                center,
                inner,
                outer,
            } => {
                assert_eq!(center, (200.0, 250.0));
                assert!((inner - 40.0).abs() < 1e-4);
                assert!((outer - 320.0).abs() < 1e-4);
            }
            other => panic!("expected radial geometry, got {other:?}"),
        }
    }

    #[test]
    fn linear_directions_follow_target() {
        assert_eq!(
            gradient_geometry(GradientDirection::Horizontal, target()),
            GradientGeometry::Linear {
                start: (0.0, 100.0),
                end: (400.0, 100.0)
            }
        );
        assert_eq!(
            gradient_geometry(GradientDirection::Diagonal, target()),
            GradientGeometry::Linear {
                start: (0.0, 100.0),
                end: (400.0, 400.0)
            }
        );
    }

    #[test]
    fn solid_ignores_secondary_color() {
        let mut fill = Fill::gradient(
            Color::rgb(255, 0, 0),
            Color::rgb(0, 0, 255),
            GradientDirection::Horizontal,
        );
        fill.mode = FillMode::Solid;

        let mut canvas = Canvas::new(40, 10).unwrap();
        canvas.fill_all(&resolve(&fill, FillTarget::from_rect((0.0, 0.0, 40.0, 10.0))));
        let image = rgba_from_pixmap(canvas.pixmap());
        assert_eq!(image.get_pixel(0, 5).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(39, 5).0, [255, 0, 0, 255]);
    }

    #[test]
    fn horizontal_gradient_blends_across() {
        let fill = Fill::gradient(Color::BLACK, Color::WHITE, GradientDirection::Horizontal);
        let mut canvas = Canvas::new(100, 4).unwrap();
        canvas.fill_all(&resolve(&fill, FillTarget::from_rect((0.0, 0.0, 100.0, 4.0))));
        let image = rgba_from_pixmap(canvas.pixmap());
        let left = image.get_pixel(1, 2)[0];
        let mid = image.get_pixel(50, 2)[0];
        let right = image.get_pixel(98, 2)[0];
        assert!(left < mid && mid < right, "{left} {mid} {right}");
    }
}
