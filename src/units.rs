//! Length units and rectangles.
//!
//! Slide XML stores lengths as integer EMUs (English Metric Units, 1/914,400
//! inch). Everything that leaves the crate is expressed in floating-point
//! points (1/72 inch).

use serde::{Deserialize, Serialize};

/// EMUs per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// EMUs per point.
pub const EMU_PER_POINT: f64 = 12_700.0;

/// Default slide width (16:9, 13.333 in).
pub const DEFAULT_SLIDE_WIDTH_EMU: i64 = 12_192_000;

/// Default slide height (16:9, 7.5 in).
pub const DEFAULT_SLIDE_HEIGHT_EMU: i64 = 6_858_000;

/// Convert EMUs to points.
pub fn emu_to_points(emu: i64) -> f64 {
    emu as f64 / EMU_PER_POINT
}

/// Convert points to EMUs, rounding to the nearest EMU.
pub fn points_to_emu(points: f64) -> i64 {
    (points * EMU_PER_POINT).round() as i64
}

/// A rectangle in EMUs, as found in `a:off`/`a:ext`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmuRect {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl EmuRect {
    pub fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx, cy }
    }

    /// Whether the rectangle has no area.
    pub fn is_empty(&self) -> bool {
        self.cx <= 0 || self.cy <= 0
    }

    /// Convert to a rectangle in points.
    pub fn to_points(&self) -> Rect {
        Rect::new(
            emu_to_points(self.x),
            emu_to_points(self.y),
            emu_to_points(self.cx),
            emu_to_points(self.cy),
        )
    }
}

/// A rectangle in points. Origin top-left, Y grows downward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Shrink by the given insets, never going below zero size.
    pub fn inset(&self, left: f64, top: f64, right: f64, bottom: f64) -> Rect {
        Rect::new(
            self.x + left,
            self.y + top,
            (self.width - left - right).max(0.0),
            (self.height - top - bottom).max(0.0),
        )
    }

    /// Largest rectangle with the given aspect ratio that fits inside `self`,
    /// centered.
    pub fn aspect_fit(&self, content_width: f64, content_height: f64) -> Rect {
        if content_width <= 0.0 || content_height <= 0.0 || self.is_empty() {
            return *self;
        }
        let scale = (self.width / content_width).min(self.height / content_height);
        let width = content_width * scale;
        let height = content_height * scale;
        Rect::new(
            self.x + (self.width - width) / 2.0,
            self.y + (self.height - height) / 2.0,
            width,
            height,
        )
    }
}

/// A size in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn from_emu(cx: i64, cy: i64) -> Self {
        Self::new(emu_to_points(cx), emu_to_points(cy))
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::from_emu(DEFAULT_SLIDE_WIDTH_EMU, DEFAULT_SLIDE_HEIGHT_EMU)
    }
}

/// Parse an integer attribute value, tolerating surrounding whitespace.
pub(crate) fn parse_i64(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_emu_round_trip() {
        for points in [0.0, 0.5, 1.0, 12.25, 72.0, 540.0, 959.999, -30.0] {
            let back = emu_to_points(points_to_emu(points));
            assert!((back - points).abs() < 1e-4, "{points} -> {back}");
        }
    }

    #[test]
    fn test_inch_is_72_points() {
        assert!((emu_to_points(EMU_PER_INCH) - 72.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_default_slide_size() {
        let size = Size::default();
        assert!((size.width - 960.0).abs() < 1e-9);
        assert!((size.height - 540.0).abs() < 1e-9);
    }

    #[test]
    fn test_aspect_fit_wide_frame() {
        let frame = Rect::new(0.0, 0.0, 200.0, 100.0);
        let fitted = frame.aspect_fit(50.0, 50.0);
        assert_eq!(fitted, Rect::new(50.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_aspect_fit_tall_frame() {
        let frame = Rect::new(10.0, 10.0, 100.0, 300.0);
        let fitted = frame.aspect_fit(400.0, 200.0);
        assert_eq!(fitted, Rect::new(10.0, 135.0, 100.0, 50.0));
    }

    #[test]
    fn test_inset_clamps() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0).inset(8.0, 0.0, 8.0, 0.0);
        assert_eq!(r.width, 0.0);
    }
}
