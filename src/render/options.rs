//! Rendering options configuration.

use super::surface::SurfaceOrigin;
use crate::theme::Rgb;
use crate::units::Size;

/// Largest accepted device scale.
pub const MAX_DEVICE_SCALE: f64 = 8.0;

/// Smallest accepted device scale.
pub const MIN_DEVICE_SCALE: f64 = 0.1;

/// Largest surface edge in pixels.
pub const MAX_SURFACE_EDGE: u32 = 16_384;

/// Rendering quality tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Quality {
    /// Flat fills, no shadows, no anti-aliasing
    Low,
    /// Gradients, shadows and anti-aliasing
    #[default]
    Balanced,
    /// As balanced, with bicubic image filtering
    High,
}

impl Quality {
    /// Whether gradients and shadows are drawn.
    pub fn effects(&self) -> bool {
        !matches!(self, Quality::Low)
    }

    pub fn anti_alias(&self) -> bool {
        !matches!(self, Quality::Low)
    }

    pub(crate) fn filter(&self) -> tiny_skia::FilterQuality {
        match self {
            Quality::Low => tiny_skia::FilterQuality::Nearest,
            Quality::Balanced => tiny_skia::FilterQuality::Bilinear,
            Quality::High => tiny_skia::FilterQuality::Bicubic,
        }
    }
}

impl std::str::FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Quality::Low),
            "balanced" => Ok(Quality::Balanced),
            "high" => Ok(Quality::High),
            other => Err(format!("unknown quality tier: {other}")),
        }
    }
}

/// Options for rasterizing a slide.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Target width in pixels before device scaling (None = from height or slide size)
    pub width_px: Option<u32>,

    /// Target height in pixels before device scaling (None = from width or slide size)
    pub height_px: Option<u32>,

    /// Multiplier applied to the pixel size
    pub device_scale: f64,

    pub quality: Quality,

    /// Row order of the output surface
    pub origin: SurfaceOrigin,

    /// Color the surface is cleared with
    pub background: Rgb,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width_px: None,
            height_px: None,
            device_scale: 1.0,
            quality: Quality::Balanced,
            origin: SurfaceOrigin::TopLeft,
            background: Rgb::WHITE,
        }
    }
}

impl RenderOptions {
    /// Create new render options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target width; height follows the slide aspect ratio unless set.
    pub fn with_width(mut self, width: u32) -> Self {
        self.width_px = Some(width.clamp(1, MAX_SURFACE_EDGE));
        self
    }

    /// Set the target height; width follows the slide aspect ratio unless set.
    pub fn with_height(mut self, height: u32) -> Self {
        self.height_px = Some(height.clamp(1, MAX_SURFACE_EDGE));
        self
    }

    /// Set both target dimensions.
    pub fn with_size(self, width: u32, height: u32) -> Self {
        self.with_width(width).with_height(height)
    }

    pub fn with_device_scale(mut self, scale: f64) -> Self {
        self.device_scale = if scale.is_finite() {
            scale.clamp(MIN_DEVICE_SCALE, MAX_DEVICE_SCALE)
        } else {
            1.0
        };
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_origin(mut self, origin: SurfaceOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_background(mut self, background: Rgb) -> Self {
        self.background = background;
        self
    }

    /// Surface size in pixels for a slide of `slide` points.
    ///
    /// Without explicit dimensions one point maps to one pixel.
    pub fn pixel_size(&self, slide: Size) -> (u32, u32) {
        let aspect = if slide.width > 0.0 && slide.height > 0.0 {
            slide.height / slide.width
        } else {
            1.0
        };
        let (width, height) = match (self.width_px, self.height_px) {
            (Some(w), Some(h)) => (f64::from(w), f64::from(h)),
            (Some(w), None) => (f64::from(w), f64::from(w) * aspect),
            (None, Some(h)) => (f64::from(h) / aspect, f64::from(h)),
            (None, None) => (slide.width, slide.height),
        };
        let scale = |v: f64| ((v * self.device_scale).round() as u32).clamp(1, MAX_SURFACE_EDGE);
        (scale(width), scale(height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = RenderOptions::default();
        assert!(opts.width_px.is_none());
        assert_eq!(opts.quality, Quality::Balanced);
        assert_eq!(opts.origin, SurfaceOrigin::TopLeft);
        assert_eq!(opts.background, Rgb::WHITE);
    }

    #[test]
    fn test_builder_pattern() {
        let opts = RenderOptions::new()
            .with_width(1280)
            .with_quality(Quality::High)
            .with_origin(SurfaceOrigin::BottomLeft);

        assert_eq!(opts.width_px, Some(1280));
        assert_eq!(opts.quality, Quality::High);
        assert_eq!(opts.origin, SurfaceOrigin::BottomLeft);
    }

    #[test]
    fn test_device_scale_clamp() {
        let opts = RenderOptions::new().with_device_scale(100.0);
        assert_eq!(opts.device_scale, MAX_DEVICE_SCALE);

        let opts = RenderOptions::new().with_device_scale(0.0);
        assert_eq!(opts.device_scale, MIN_DEVICE_SCALE);

        let opts = RenderOptions::new().with_device_scale(f64::NAN);
        assert_eq!(opts.device_scale, 1.0);
    }

    #[test]
    fn test_pixel_size_follows_aspect() {
        let slide = Size::new(960.0, 540.0);
        assert_eq!(RenderOptions::new().pixel_size(slide), (960, 540));
        assert_eq!(RenderOptions::new().with_width(1920).pixel_size(slide), (1920, 1080));
        assert_eq!(RenderOptions::new().with_height(270).pixel_size(slide), (480, 270));
        assert_eq!(
            RenderOptions::new().with_width(480).with_device_scale(2.0).pixel_size(slide),
            (960, 540)
        );
    }

    #[test]
    fn test_quality_from_str() {
        assert_eq!("LOW".parse::<Quality>(), Ok(Quality::Low));
        assert!("ultra".parse::<Quality>().is_err());
        assert!(!Quality::Low.effects());
        assert!(Quality::High.effects());
    }
}
