//! Preset shape geometry.
//!
//! Pure functions from a preset keyword and a bounding box to a closed
//! vector contour. Every contour produced here starts with a `MoveTo`, ends
//! with `Close`, and never repeats the same point in two consecutive
//! commands.

mod presets;

pub use presets::{
    arrow, diamond, ellipse, heart, isosceles_triangle, rectangle, regular_polygon, rounded_rectangle, star,
    ArrowDirection,
};

use crate::error::{Error, Result};
use crate::units::Rect;
use serde::{Deserialize, Serialize};

/// A point in points, Y growing downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn approx_eq(&self, other: &Point) -> bool {
        (self.x - other.x).abs() < 1e-9 && (self.y - other.y).abs() < 1e-9
    }
}

/// One drawing command of a contour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    CubicTo { c1: Point, c2: Point, to: Point },
    Close,
}

impl PathCommand {
    /// End point of the command, if it has one.
    pub fn end_point(&self) -> Option<Point> {
        match self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => Some(*p),
            PathCommand::CubicTo { to, .. } => Some(*to),
            PathCommand::Close => None,
        }
    }

    fn map(self, f: &impl Fn(Point) -> Point) -> PathCommand {
        match self {
            PathCommand::MoveTo(p) => PathCommand::MoveTo(f(p)),
            PathCommand::LineTo(p) => PathCommand::LineTo(f(p)),
            PathCommand::CubicTo { c1, c2, to } => PathCommand::CubicTo {
                c1: f(c1),
                c2: f(c2),
                to: f(to),
            },
            PathCommand::Close => PathCommand::Close,
        }
    }
}

/// A single closed contour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClosedPath {
    pub commands: Vec<PathCommand>,
}

impl ClosedPath {
    /// End points of all commands, in order.
    pub fn vertices(&self) -> Vec<Point> {
        self.commands.iter().filter_map(PathCommand::end_point).collect()
    }

    /// Whether the contour starts with `MoveTo` and ends with `Close`.
    pub fn is_closed(&self) -> bool {
        matches!(self.commands.first(), Some(PathCommand::MoveTo(_)))
            && matches!(self.commands.last(), Some(PathCommand::Close))
    }

    /// Whether any two consecutive commands end on the same point.
    pub fn has_duplicate_consecutive_points(&self) -> bool {
        self.vertices().windows(2).any(|w| w[0].approx_eq(&w[1]))
    }

    /// Copy with every point moved by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> ClosedPath {
        self.mapped(|p| Point::new(p.x + dx, p.y + dy))
    }

    /// Copy with every point passed through `f`.
    pub fn mapped(&self, f: impl Fn(Point) -> Point) -> ClosedPath {
        ClosedPath {
            commands: self.commands.iter().map(|c| c.map(&f)).collect(),
        }
    }

    /// Axis-aligned bounds of all points, control points included.
    pub fn bounds(&self) -> Option<Rect> {
        let mut points = Vec::new();
        for command in &self.commands {
            match command {
                PathCommand::MoveTo(p) | PathCommand::LineTo(p) => points.push(*p),
                PathCommand::CubicTo { c1, c2, to } => points.extend([*c1, *c2, *to]),
                PathCommand::Close => {}
            }
        }
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }
}

/// Builds a [`ClosedPath`] while dropping degenerate segments.
#[derive(Debug, Default)]
pub(crate) struct ContourBuilder {
    commands: Vec<PathCommand>,
    start: Option<Point>,
    current: Option<Point>,
}

impl ContourBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn move_to(&mut self, p: Point) {
        self.commands.push(PathCommand::MoveTo(p));
        self.start = Some(p);
        self.current = Some(p);
    }

    pub(crate) fn line_to(&mut self, p: Point) {
        if self.current.is_some_and(|c| c.approx_eq(&p)) {
            return;
        }
        self.commands.push(PathCommand::LineTo(p));
        self.current = Some(p);
    }

    pub(crate) fn cubic_to(&mut self, c1: Point, c2: Point, to: Point) {
        if self.current.is_some_and(|c| c.approx_eq(&to) && c.approx_eq(&c1) && c.approx_eq(&c2)) {
            return;
        }
        self.commands.push(PathCommand::CubicTo { c1, c2, to });
        self.current = Some(to);
    }

    /// Close the contour. A trailing straight segment back to the start is
    /// implied by `Close`, so it is removed.
    pub(crate) fn close(mut self) -> ClosedPath {
        if let (Some(start), Some(PathCommand::LineTo(last))) = (self.start, self.commands.last()) {
            if last.approx_eq(&start) {
                self.commands.pop();
            }
        }
        self.commands.push(PathCommand::Close);
        ClosedPath {
            commands: self.commands,
        }
    }
}

/// Preset shapes the library can synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PresetGeometry {
    Rectangle,
    Ellipse,
    RoundedRectangle,
    /// Triangle with its apex on the top edge
    Triangle,
    Diamond,
    /// Regular polygon with 3 to 12 sides
    Polygon(u8),
    /// Star with the given number of points
    Star(u8),
    Heart,
    Arrow(ArrowDirection),
}

/// Parameters that refine a preset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeometryParams {
    /// Primary adjust value as a fraction (`adj` / 100000)
    pub adjust: Option<f64>,
}

impl GeometryParams {
    /// Build from an `a:avLst` guide value such as `16667`.
    pub fn from_adjust(value: Option<i64>) -> Self {
        Self {
            adjust: value.map(|v| v as f64 / 100_000.0),
        }
    }
}

impl PresetGeometry {
    /// Decode a preset keyword (`a:prstGeom/@prst`).
    pub fn from_keyword(keyword: &str) -> Result<Self> {
        let preset = match keyword {
            "rect" => PresetGeometry::Rectangle,
            "ellipse" => PresetGeometry::Ellipse,
            "roundRect" => PresetGeometry::RoundedRectangle,
            "triangle" => PresetGeometry::Triangle,
            "diamond" => PresetGeometry::Diamond,
            "pentagon" => PresetGeometry::Polygon(5),
            "hexagon" => PresetGeometry::Polygon(6),
            "heptagon" => PresetGeometry::Polygon(7),
            "octagon" => PresetGeometry::Polygon(8),
            "decagon" => PresetGeometry::Polygon(10),
            "dodecagon" => PresetGeometry::Polygon(12),
            "heart" => PresetGeometry::Heart,
            "rightArrow" => PresetGeometry::Arrow(ArrowDirection::Right),
            "leftArrow" => PresetGeometry::Arrow(ArrowDirection::Left),
            "upArrow" => PresetGeometry::Arrow(ArrowDirection::Up),
            "downArrow" => PresetGeometry::Arrow(ArrowDirection::Down),
            "leftRightArrow" => PresetGeometry::Arrow(ArrowDirection::LeftRight),
            "upDownArrow" => PresetGeometry::Arrow(ArrowDirection::UpDown),
            other => match other.strip_prefix("star").and_then(|n| n.parse::<u8>().ok()) {
                Some(points) if (4..=32).contains(&points) => PresetGeometry::Star(points),
                _ => return Err(Error::InvalidGeometry(keyword.to_string())),
            },
        };
        Ok(preset)
    }

    /// Synthesize the contour for `bounds`.
    pub fn path(&self, bounds: Rect, params: &GeometryParams) -> ClosedPath {
        match *self {
            PresetGeometry::Rectangle => rectangle(bounds),
            PresetGeometry::Ellipse => ellipse(bounds),
            PresetGeometry::RoundedRectangle => {
                let ratio = params.adjust.unwrap_or(presets::DEFAULT_ROUND_RECT_ADJUST);
                let radius = bounds.width.min(bounds.height) * ratio.clamp(0.0, 0.5);
                rounded_rectangle(bounds, radius)
            }
            PresetGeometry::Triangle => isosceles_triangle(bounds, params.adjust.unwrap_or(0.5)),
            PresetGeometry::Diamond => diamond(bounds),
            PresetGeometry::Polygon(sides) => regular_polygon(bounds, sides),
            PresetGeometry::Star(points) => star(bounds, points),
            PresetGeometry::Heart => heart(bounds),
            PresetGeometry::Arrow(direction) => arrow(bounds, direction),
        }
    }
}

/// Contour for a preset keyword. Unknown keywords fail with
/// [`Error::InvalidGeometry`]; callers fall back to [`rectangle`].
pub fn preset_path(keyword: &str, bounds: Rect, params: &GeometryParams) -> Result<ClosedPath> {
    Ok(PresetGeometry::from_keyword(keyword)?.path(bounds, params))
}
