//! The seam between slide space and the physical drawing surface.
//!
//! Slide space is in points with the origin at the top-left and Y growing
//! downward. A surface may store rows top-down or bottom-up. The only place
//! an axis flip happens is [`device_transform`]; everything drawn goes
//! through it exactly once.

use crate::error::{Error, Result};
use crate::units::Size;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tiny_skia::{Pixmap, Transform};

/// Where row zero of the surface sits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SurfaceOrigin {
    /// Row zero is the top of the slide
    #[default]
    TopLeft,
    /// Row zero is the bottom of the slide
    BottomLeft,
}

/// Map slide points to surface pixels.
pub fn device_transform(slide: Size, width_px: u32, height_px: u32, origin: SurfaceOrigin) -> Transform {
    let sx = if slide.width > 0.0 {
        width_px as f32 / slide.width as f32
    } else {
        1.0
    };
    let sy = if slide.height > 0.0 {
        height_px as f32 / slide.height as f32
    } else {
        1.0
    };
    match origin {
        SurfaceOrigin::TopLeft => Transform::from_scale(sx, sy),
        SurfaceOrigin::BottomLeft => Transform::from_row(sx, 0.0, 0.0, -sy, 0.0, height_px as f32),
    }
}

/// A rendered slide.
pub struct Bitmap {
    pixmap: Pixmap,
    origin: SurfaceOrigin,
}

impl Bitmap {
    pub(crate) fn new(pixmap: Pixmap, origin: SurfaceOrigin) -> Self {
        Self { pixmap, origin }
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn origin(&self) -> SurfaceOrigin {
        self.origin
    }

    /// Premultiplied RGBA in surface row order.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Straight RGBA of the pixel at (`x`, `y`), with `y` counted from the
    /// top of the slide regardless of the surface origin.
    pub fn pixel_top_down(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if y >= self.height() {
            return None;
        }
        let row = match self.origin {
            SurfaceOrigin::TopLeft => y,
            SurfaceOrigin::BottomLeft => self.height() - 1 - y,
        };
        let color = self.pixmap.pixel(x, row)?.demultiply();
        Some([color.red(), color.green(), color.blue(), color.alpha()])
    }

    /// Straight RGBA, top row first.
    pub fn to_rgba_top_down(&self) -> Vec<u8> {
        let width = self.width() as usize;
        let height = self.height() as usize;
        let mut out = Vec::with_capacity(width * height * 4);
        let pixels = self.pixmap.pixels();
        for y in 0..height {
            let row = match self.origin {
                SurfaceOrigin::TopLeft => y,
                SurfaceOrigin::BottomLeft => height - 1 - y,
            };
            for pixel in &pixels[row * width..(row + 1) * width] {
                let c = pixel.demultiply();
                out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
            }
        }
        out
    }

    /// PNG bytes, always top row first.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        match self.origin {
            SurfaceOrigin::TopLeft => self
                .pixmap
                .encode_png()
                .map_err(|e| Error::Serialization(e.to_string())),
            SurfaceOrigin::BottomLeft => {
                let image = image::RgbaImage::from_raw(self.width(), self.height(), self.to_rgba_top_down())
                    .ok_or_else(|| Error::Serialization("pixel buffer size mismatch".to_string()))?;
                let mut bytes = Vec::new();
                image
                    .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
                    .map_err(|e| Error::Serialization(e.to_string()))?;
                Ok(bytes)
            }
        }
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.encode_png()?)?;
        Ok(())
    }
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("origin", &self.origin)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::Point;

    fn map(t: Transform, x: f32, y: f32) -> (f32, f32) {
        let mut p = [Point::from_xy(x, y)];
        t.map_points(&mut p);
        (p[0].x, p[0].y)
    }

    #[test]
    fn test_top_left_scales_only() {
        let t = device_transform(Size::new(100.0, 50.0), 200, 100, SurfaceOrigin::TopLeft);
        assert_eq!(map(t, 0.0, 0.0), (0.0, 0.0));
        assert_eq!(map(t, 100.0, 50.0), (200.0, 100.0));
    }

    #[test]
    fn test_bottom_left_flips_once() {
        let t = device_transform(Size::new(100.0, 50.0), 200, 100, SurfaceOrigin::BottomLeft);
        // Slide top lands on the last surface row
        assert_eq!(map(t, 0.0, 0.0), (0.0, 100.0));
        assert_eq!(map(t, 100.0, 50.0), (200.0, 0.0));
    }

    #[test]
    fn test_top_down_reads_undo_bottom_left_storage() {
        let mut pixmap = Pixmap::new(1, 2).unwrap();
        // Surface row 1 is the slide top for a bottom-left bitmap
        pixmap.fill_rect(
            tiny_skia::Rect::from_xywh(0.0, 1.0, 1.0, 1.0).unwrap(),
            &tiny_skia::Paint::default(),
            Transform::identity(),
            None,
        );
        let bitmap = Bitmap::new(pixmap, SurfaceOrigin::BottomLeft);
        assert_eq!(bitmap.pixel_top_down(0, 0).unwrap()[3], 255);
        assert_eq!(bitmap.pixel_top_down(0, 1).unwrap()[3], 0);
        assert_eq!(&bitmap.to_rgba_top_down()[..4], &[0, 0, 0, 255]);
    }
}
