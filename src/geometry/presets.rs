//! Contour formulas for the supported presets.

use super::{ClosedPath, ContourBuilder, Point};
use crate::units::Rect;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Default `adj` of `roundRect`: 16.667% of the shorter side.
pub(crate) const DEFAULT_ROUND_RECT_ADJUST: f64 = 0.16667;

/// Cubic Bezier handle length for a quarter circle.
const KAPPA: f64 = 0.552_284_749_8;

/// Arrow head length as a fraction of the arrow's long axis.
const ARROW_HEAD_RATIO: f64 = 0.3;

/// Arrow shaft thickness as a fraction of the arrow's short axis.
const ARROW_SHAFT_RATIO: f64 = 0.6;

/// Star inner radius relative to the outer radius.
const STAR_INNER_RATIO: f64 = 0.4;

/// Direction an arrow points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArrowDirection {
    Right,
    Left,
    Up,
    Down,
    LeftRight,
    UpDown,
}

/// Closed polyline through `points`.
fn polygon(points: impl IntoIterator<Item = Point>) -> ClosedPath {
    let mut builder = ContourBuilder::new();
    let mut points = points.into_iter();
    if let Some(first) = points.next() {
        builder.move_to(first);
        for p in points {
            builder.line_to(p);
        }
    }
    builder.close()
}

pub fn rectangle(bounds: Rect) -> ClosedPath {
    polygon([
        Point::new(bounds.x, bounds.y),
        Point::new(bounds.right(), bounds.y),
        Point::new(bounds.right(), bounds.bottom()),
        Point::new(bounds.x, bounds.bottom()),
    ])
}

/// Ellipse inscribed in `bounds`, four cubic arcs clockwise from 3 o'clock.
pub fn ellipse(bounds: Rect) -> ClosedPath {
    let (cx, cy) = bounds.center();
    let rx = bounds.width / 2.0;
    let ry = bounds.height / 2.0;
    let kx = rx * KAPPA;
    let ky = ry * KAPPA;

    let mut b = ContourBuilder::new();
    b.move_to(Point::new(cx + rx, cy));
    b.cubic_to(
        Point::new(cx + rx, cy + ky),
        Point::new(cx + kx, cy + ry),
        Point::new(cx, cy + ry),
    );
    b.cubic_to(
        Point::new(cx - kx, cy + ry),
        Point::new(cx - rx, cy + ky),
        Point::new(cx - rx, cy),
    );
    b.cubic_to(
        Point::new(cx - rx, cy - ky),
        Point::new(cx - kx, cy - ry),
        Point::new(cx, cy - ry),
    );
    b.cubic_to(
        Point::new(cx + kx, cy - ry),
        Point::new(cx + rx, cy - ky),
        Point::new(cx + rx, cy),
    );
    b.close()
}

/// Rectangle with circular corners of `radius`, clamped to half the shorter side.
pub fn rounded_rectangle(bounds: Rect, radius: f64) -> ClosedPath {
    let r = radius.clamp(0.0, bounds.width.min(bounds.height) / 2.0);
    let k = r * KAPPA;
    let (x, y, right, bottom) = (bounds.x, bounds.y, bounds.right(), bounds.bottom());

    let mut b = ContourBuilder::new();
    b.move_to(Point::new(x + r, y));
    b.line_to(Point::new(right - r, y));
    b.cubic_to(
        Point::new(right - r + k, y),
        Point::new(right, y + r - k),
        Point::new(right, y + r),
    );
    b.line_to(Point::new(right, bottom - r));
    b.cubic_to(
        Point::new(right, bottom - r + k),
        Point::new(right - r + k, bottom),
        Point::new(right - r, bottom),
    );
    b.line_to(Point::new(x + r, bottom));
    b.cubic_to(
        Point::new(x + r - k, bottom),
        Point::new(x, bottom - r + k),
        Point::new(x, bottom - r),
    );
    b.line_to(Point::new(x, y + r));
    b.cubic_to(
        Point::new(x, y + r - k),
        Point::new(x + r - k, y),
        Point::new(x + r, y),
    );
    b.close()
}

/// Point on a circle around `(cx, cy)`; angle in degrees, 0 at 3 o'clock,
/// growing clockwise (Y points down).
fn polar(cx: f64, cy: f64, radius: f64, degrees: f64) -> Point {
    let radians = degrees * PI / 180.0;
    Point::new(cx + radius * radians.cos(), cy + radius * radians.sin())
}

/// Regular polygon centered in `bounds` with `sides` clamped to 3..=12.
/// The first vertex points straight up.
pub fn regular_polygon(bounds: Rect, sides: u8) -> ClosedPath {
    let n = sides.clamp(3, 12) as usize;
    let (cx, cy) = bounds.center();
    let radius = bounds.width.min(bounds.height) / 2.0;
    let step = 360.0 / n as f64;
    polygon((0..n).map(|k| polar(cx, cy, radius, -90.0 + k as f64 * step)))
}

/// Triangle filling `bounds`: base along the bottom edge, apex on the top
/// edge at `apex` (0 left, 1 right).
pub fn isosceles_triangle(bounds: Rect, apex: f64) -> ClosedPath {
    polygon([
        Point::new(bounds.x + bounds.width * apex.clamp(0.0, 1.0), bounds.y),
        Point::new(bounds.right(), bounds.bottom()),
        Point::new(bounds.x, bounds.bottom()),
    ])
}

/// Rhombus through the midpoints of the edges of `bounds`, clockwise from
/// the top.
pub fn diamond(bounds: Rect) -> ClosedPath {
    let (cx, cy) = bounds.center();
    polygon([
        Point::new(cx, bounds.y),
        Point::new(bounds.right(), cy),
        Point::new(cx, bounds.bottom()),
        Point::new(bounds.x, cy),
    ])
}

/// Star with `points` tips, alternating outer and inner radius.
pub fn star(bounds: Rect, points: u8) -> ClosedPath {
    let n = points.max(2) as usize * 2;
    let (cx, cy) = bounds.center();
    let outer = bounds.width.min(bounds.height) / 2.0;
    let inner = outer * STAR_INNER_RATIO;
    let step = 360.0 / n as f64;
    polygon((0..n).map(|k| {
        let radius = if k % 2 == 0 { outer } else { inner };
        polar(cx, cy, radius, -90.0 + k as f64 * step)
    }))
}

/// Heart built from four cubic segments with fixed control-point ratios.
pub fn heart(bounds: Rect) -> ClosedPath {
    let at = |u: f64, v: f64| Point::new(bounds.x + u * bounds.width, bounds.y + v * bounds.height);

    let mut b = ContourBuilder::new();
    b.move_to(at(0.5, 1.0));
    b.cubic_to(at(0.2, 0.75), at(0.0, 0.55), at(0.0, 0.3));
    b.cubic_to(at(0.0, 0.05), at(0.35, 0.0), at(0.5, 0.2));
    b.cubic_to(at(0.65, 0.0), at(1.0, 0.05), at(1.0, 0.3));
    b.cubic_to(at(1.0, 0.55), at(0.8, 0.75), at(0.5, 1.0));
    b.close()
}

/// Canonical right arrow in unit space: shaft then a triangular head.
fn right_arrow_unit() -> Vec<(f64, f64)> {
    let neck = 1.0 - ARROW_HEAD_RATIO;
    let top = (1.0 - ARROW_SHAFT_RATIO) / 2.0;
    let bottom = 1.0 - top;
    vec![
        (0.0, top),
        (neck, top),
        (neck, 0.0),
        (1.0, 0.5),
        (neck, 1.0),
        (neck, bottom),
        (0.0, bottom),
    ]
}

/// Canonical double-headed horizontal arrow in unit space.
fn left_right_arrow_unit() -> Vec<(f64, f64)> {
    let head = ARROW_HEAD_RATIO;
    let neck = 1.0 - ARROW_HEAD_RATIO;
    let top = (1.0 - ARROW_SHAFT_RATIO) / 2.0;
    let bottom = 1.0 - top;
    vec![
        (0.0, 0.5),
        (head, 0.0),
        (head, top),
        (neck, top),
        (neck, 0.0),
        (1.0, 0.5),
        (neck, 1.0),
        (neck, bottom),
        (head, bottom),
        (head, 1.0),
    ]
}

/// Block arrow. Only the right-pointing and double horizontal arrows are
/// derived; the other directions mirror or transpose those unit contours
/// into `bounds`.
pub fn arrow(bounds: Rect, direction: ArrowDirection) -> ClosedPath {
    let (unit, place): (Vec<(f64, f64)>, fn(f64, f64) -> (f64, f64)) = match direction {
        ArrowDirection::Right => (right_arrow_unit(), |u, v| (u, v)),
        ArrowDirection::Left => (right_arrow_unit(), |u, v| (1.0 - u, v)),
        ArrowDirection::Down => (right_arrow_unit(), |u, v| (v, u)),
        ArrowDirection::Up => (right_arrow_unit(), |u, v| (v, 1.0 - u)),
        ArrowDirection::LeftRight => (left_right_arrow_unit(), |u, v| (u, v)),
        ArrowDirection::UpDown => (left_right_arrow_unit(), |u, v| (v, u)),
    };
    polygon(unit.into_iter().map(|(u, v)| {
        let (fx, fy) = place(u, v);
        Point::new(bounds.x + fx * bounds.width, bounds.y + fy * bounds.height)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance(p: Point, cx: f64, cy: f64) -> f64 {
        ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
    }

    #[test]
    fn test_star5_alternates_radii() {
        let path = star(Rect::new(0.0, 0.0, 200.0, 200.0), 5);
        let vertices = path.vertices();
        assert_eq!(vertices.len(), 10);
        for (k, v) in vertices.iter().enumerate() {
            let expected = if k % 2 == 0 { 100.0 } else { 40.0 };
            assert!((distance(*v, 100.0, 100.0) - expected).abs() < 1e-9);
        }
        // First tip points straight up
        assert!((vertices[0].x - 100.0).abs() < 1e-9);
        assert!(vertices[0].y.abs() < 1e-9);
    }

    #[test]
    fn test_hexagon_vertices() {
        let path = regular_polygon(Rect::new(0.0, 0.0, 100.0, 60.0), 6);
        let vertices = path.vertices();
        assert_eq!(vertices.len(), 6);
        for v in &vertices {
            assert!((distance(*v, 50.0, 30.0) - 30.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_triangle_fills_wide_bounds() {
        let bounds = Rect::new(10.0, 20.0, 300.0, 80.0);
        let vertices = isosceles_triangle(bounds, 0.5).vertices();
        assert_eq!(
            vertices,
            vec![Point::new(160.0, 20.0), Point::new(310.0, 100.0), Point::new(10.0, 100.0)]
        );
        let skewed = isosceles_triangle(bounds, 0.0).vertices();
        assert_eq!(skewed[0], Point::new(10.0, 20.0));
    }

    #[test]
    fn test_diamond_touches_every_edge() {
        let bounds = Rect::new(0.0, 0.0, 40.0, 160.0);
        let vertices = diamond(bounds).vertices();
        assert_eq!(
            vertices,
            vec![
                Point::new(20.0, 0.0),
                Point::new(40.0, 80.0),
                Point::new(20.0, 160.0),
                Point::new(0.0, 80.0),
            ]
        );
    }

    #[test]
    fn test_polygon_sides_are_clamped() {
        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(regular_polygon(bounds, 1).vertices().len(), 3);
        assert_eq!(regular_polygon(bounds, 40).vertices().len(), 12);
    }

    #[test]
    fn test_right_arrow_ratios() {
        let path = arrow(Rect::new(0.0, 0.0, 100.0, 50.0), ArrowDirection::Right);
        let v = path.vertices();
        assert_eq!(v.len(), 7);
        let close = |p: Point, x: f64, y: f64| (p.x - x).abs() < 1e-9 && (p.y - y).abs() < 1e-9;
        assert!(close(v[0], 0.0, 10.0));
        assert!(close(v[1], 70.0, 10.0));
        assert!(close(v[3], 100.0, 25.0));
        assert!(close(v[6], 0.0, 40.0));
    }

    #[test]
    fn test_left_arrow_mirrors_right() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        let right = arrow(bounds, ArrowDirection::Right).vertices();
        let left = arrow(bounds, ArrowDirection::Left).vertices();
        for (r, l) in right.iter().zip(&left) {
            assert!((l.x - (100.0 - r.x)).abs() < 1e-9);
            assert!((l.y - r.y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_up_arrow_tip_on_top() {
        let path = arrow(Rect::new(0.0, 0.0, 40.0, 100.0), ArrowDirection::Up);
        let tip = path
            .vertices()
            .into_iter()
            .min_by(|a, b| a.y.total_cmp(&b.y))
            .unwrap();
        assert_eq!(tip, Point::new(20.0, 0.0));
    }

    #[test]
    fn test_rounded_rectangle_zero_radius_is_rectangle() {
        let bounds = Rect::new(0.0, 0.0, 10.0, 5.0);
        let path = rounded_rectangle(bounds, 0.0);
        assert_eq!(path.vertices(), rectangle(bounds).vertices());
    }

    #[test]
    fn test_heart_has_four_curves() {
        let path = heart(Rect::new(0.0, 0.0, 100.0, 100.0));
        let curves = path
            .commands
            .iter()
            .filter(|c| matches!(c, super::super::PathCommand::CubicTo { .. }))
            .count();
        assert_eq!(curves, 4);
    }
}
