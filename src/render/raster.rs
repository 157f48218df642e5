//! Rasterizer: composites render elements onto a pixel surface.

use super::fonts::{FontBook, GlyphPathBuilder};
use super::options::{Quality, RenderOptions};
use super::surface::{device_transform, Bitmap};
use super::text_layout::{layout_text, PlacedFragment};
use super::tree::{
    DecodedImage, ElementContent, ImageContent, RenderElement, ShapeContent, TextContent, TextFont,
    TextParagraph, TextSpan,
};
use crate::error::{Error, Result};
use crate::geometry::{ClosedPath, PathCommand, Point};
use crate::model::{Fill, GradientFill, ShapeTransform, TextAlignment, VerticalAnchor};
use crate::theme::Rgb;
use crate::units::{Rect, Size};
use tiny_skia::{
    Color, FillRule, IntSize, LinearGradient, Paint, PathBuilder, Pattern, Pixmap, Shader,
    SpreadMode, Stroke, Transform,
};

/// Flat color used for pattern fills.
pub const PATTERN_FALLBACK: Rgb = Rgb::GRAY;

const PLACEHOLDER_FILL: Rgb = Rgb::new(0xE6, 0xE6, 0xE6);
const PLACEHOLDER_INK: Rgb = Rgb::new(0x99, 0x99, 0x99);
const HATCH_SPACING: f64 = 8.0;

/// Draws render trees. Holds the font book; otherwise stateless, so one
/// instance can render any number of slides.
#[derive(Debug)]
pub struct Rasterizer {
    fonts: FontBook,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer {
    /// Rasterizer using the system fonts.
    pub fn new() -> Self {
        Self::with_font_book(FontBook::system())
    }

    pub fn with_font_book(fonts: FontBook) -> Self {
        Self { fonts }
    }

    pub fn font_book(&self) -> &FontBook {
        &self.fonts
    }

    /// Render `elements` of a slide measuring `slide` points.
    pub fn render(&self, elements: &[RenderElement], slide: Size, options: &RenderOptions) -> Result<Bitmap> {
        let (width, height) = options.pixel_size(slide);
        let mut pixmap =
            Pixmap::new(width, height).ok_or(Error::SurfaceAllocationFailed { width, height })?;
        pixmap.fill(color(options.background, 1.0));

        let device = device_transform(slide, width, height, options.origin);
        let mut canvas = Canvas {
            pixmap: &mut pixmap,
            device,
            quality: options.quality,
            fonts: &self.fonts,
        };
        for element in elements {
            canvas.draw_element(element);
        }
        log::debug!(width, height, elements = elements.len(); "Rasterized slide");
        Ok(Bitmap::new(pixmap, options.origin))
    }
}

/// Per-render drawing state.
struct Canvas<'a> {
    pixmap: &'a mut Pixmap,
    /// Slide space to surface, including every enclosing group transform
    device: Transform,
    quality: Quality,
    fonts: &'a FontBook,
}

impl Canvas<'_> {
    fn draw_element(&mut self, element: &RenderElement) {
        if element.frame.is_empty() && !matches!(element.content, ElementContent::Group(_)) {
            return;
        }
        match &element.content {
            ElementContent::Shape(shape) => {
                let local = element_transform(&element.frame, &element.transform);
                self.draw_shape(shape, &element.frame, local);
            }
            ElementContent::Text(text) => {
                // Flips mirror the shape, never its text
                let rotation = ShapeTransform {
                    rotation: element.transform.rotation,
                    ..Default::default()
                };
                let local = element_transform(&element.frame, &rotation);
                self.draw_text(text, &element.frame, local);
            }
            ElementContent::Image(ImageContent::Decoded(image)) => {
                let local = element_transform(&element.frame, &element.transform);
                if !self.draw_image(image, &element.frame, local) {
                    let diagnostic = format!("{}: undecodable pixels", image.source);
                    self.draw_placeholder(&diagnostic, &element.frame, local);
                }
            }
            ElementContent::Image(ImageContent::Placeholder { diagnostic }) => {
                let local = element_transform(&element.frame, &element.transform);
                self.draw_placeholder(diagnostic, &element.frame, local);
            }
            ElementContent::Group(children) => {
                // Children draw in slide space, turned with the group about its center
                let parent = self.device;
                self.device = parent.pre_concat(element_transform(&element.frame, &element.transform));
                for child in children {
                    self.draw_element(child);
                }
                self.device = parent;
            }
        }
    }

    fn draw_shape(&mut self, shape: &ShapeContent, frame: &Rect, local: Transform) {
        let Some(path) = skia_path(&shape.path.translated(frame.x, frame.y)) else {
            log::debug!(frame:?; "Skipping shape with an empty path");
            return;
        };
        let anti_alias = self.quality.anti_alias();
        let transform = self.device.pre_concat(local);

        if let Some(shadow) = shape.shadow.filter(|_| self.quality.effects()) {
            if shape.fill.is_visible() {
                let offset = self
                    .device
                    .pre_concat(Transform::from_translate(shadow.dx as f32, shadow.dy as f32))
                    .pre_concat(local);
                let paint = solid_paint(shadow.color, shadow.alpha * 0.5, anti_alias);
                self.pixmap.fill_path(&path, &paint, FillRule::Winding, offset, None);
            }
        }

        let bounds = shape.path.bounds().unwrap_or_default();
        let bounds = Rect::new(bounds.x + frame.x, bounds.y + frame.y, bounds.width, bounds.height);
        if let Some(mut paint) = self.fill_paint(&shape.fill, &bounds) {
            paint.anti_alias = anti_alias;
            self.pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
        }

        if let Some(stroke) = shape.stroke.filter(|s| s.width > 0.0) {
            let paint = solid_paint(stroke.color, 1.0, anti_alias);
            let style = Stroke {
                width: stroke.width as f32,
                ..Stroke::default()
            };
            self.pixmap.stroke_path(&path, &paint, &style, transform, None);
        }
    }

    fn fill_paint(&self, fill: &Fill, bounds: &Rect) -> Option<Paint<'static>> {
        match fill {
            Fill::None => None,
            Fill::Solid(rgb) => Some(solid_paint(*rgb, 1.0, true)),
            Fill::Gradient(gradient) if !self.quality.effects() => gradient
                .stops
                .first()
                .map(|stop| solid_paint(stop.color, 1.0, true)),
            Fill::Gradient(gradient) => gradient_shader(gradient, bounds).map(|shader| Paint {
                shader,
                ..Paint::default()
            }),
            Fill::Pattern { .. } => Some(solid_paint(PATTERN_FALLBACK, 1.0, true)),
        }
    }

    fn draw_text(&mut self, text: &TextContent, frame: &Rect, local: Transform) {
        let layout = layout_text(text, frame, self.fonts);
        let transform = self.device.pre_concat(local);
        let anti_alias = self.quality.anti_alias();
        for line in &layout.lines {
            for fragment in &line.fragments {
                if fragment.text.trim().is_empty() {
                    continue;
                }
                let paint = solid_paint(fragment.color, 1.0, anti_alias);
                if let Some(path) = self.glyph_path(fragment, line.baseline) {
                    self.pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
                }
                if fragment.font.underline {
                    let size = fragment.font.size;
                    let rect = tiny_skia::Rect::from_xywh(
                        fragment.x as f32,
                        (line.baseline + size * 0.1) as f32,
                        fragment.width as f32,
                        (size * 0.05).max(0.5) as f32,
                    );
                    if let Some(rect) = rect {
                        self.pixmap.fill_rect(rect, &paint, transform, None);
                    }
                }
            }
        }
    }

    /// Outline of a fragment's glyphs in slide points; `None` without a
    /// matching face.
    fn glyph_path(&self, fragment: &PlacedFragment, baseline: f64) -> Option<tiny_skia::Path> {
        self.fonts
            .with_face(&fragment.font, |face| {
                let scale = fragment.font.size / f64::from(face.units_per_em().max(1));
                let mut builder = GlyphPathBuilder::new(fragment.x, baseline, scale);
                let mut x = fragment.x;
                for ch in fragment.text.chars() {
                    let advance = match face.glyph_index(ch) {
                        Some(glyph) => {
                            builder.set_origin_x(x);
                            face.outline_glyph(glyph, &mut builder);
                            face.glyph_hor_advance(glyph)
                                .map(|a| f64::from(a) * scale)
                                .unwrap_or(fragment.font.size * 0.5)
                        }
                        None => fragment.font.size * 0.5,
                    };
                    x += advance;
                }
                builder.finish()
            })
            .flatten()
    }

    /// Blit an image aspect-fit into its frame. Returns false when the
    /// pixel buffer cannot be used.
    fn draw_image(&mut self, image: &DecodedImage, frame: &Rect, local: Transform) -> bool {
        let Some(source) = image_pixmap(image) else {
            return false;
        };
        let fitted = frame.aspect_fit(f64::from(image.width), f64::from(image.height));
        let Some(rect) =
            tiny_skia::Rect::from_xywh(fitted.x as f32, fitted.y as f32, fitted.width as f32, fitted.height as f32)
        else {
            return true;
        };
        let placement = Transform::from_row(
            (fitted.width / f64::from(image.width)) as f32,
            0.0,
            0.0,
            (fitted.height / f64::from(image.height)) as f32,
            fitted.x as f32,
            fitted.y as f32,
        );
        let paint = Paint {
            shader: Pattern::new(
                source.as_ref(),
                SpreadMode::Pad,
                self.quality.filter(),
                1.0,
                placement,
            ),
            anti_alias: self.quality.anti_alias(),
            ..Paint::default()
        };
        self.pixmap
            .fill_rect(rect, &paint, self.device.pre_concat(local), None);
        true
    }

    fn draw_placeholder(&mut self, diagnostic: &str, frame: &Rect, local: Transform) {
        let transform = self.device.pre_concat(local);
        let anti_alias = self.quality.anti_alias();
        if let Some(rect) =
            tiny_skia::Rect::from_xywh(frame.x as f32, frame.y as f32, frame.width as f32, frame.height as f32)
        {
            self.pixmap
                .fill_rect(rect, &solid_paint(PLACEHOLDER_FILL, 1.0, anti_alias), transform, None);

            let ink = solid_paint(PLACEHOLDER_INK, 1.0, anti_alias);
            let thin = Stroke {
                width: 0.75,
                ..Stroke::default()
            };
            if let Some(hatch) = hatch_path(frame, HATCH_SPACING) {
                self.pixmap.stroke_path(&hatch, &ink, &thin, transform, None);
            }
            let border = PathBuilder::from_rect(rect);
            self.pixmap.stroke_path(&border, &ink, &thin, transform, None);
        }

        let size = (frame.height / 4.0).clamp(4.0, 12.0);
        let label = TextContent {
            paragraphs: vec![TextParagraph {
                alignment: TextAlignment::Center,
                spans: vec![TextSpan {
                    text: diagnostic.to_string(),
                    font: TextFont {
                        family: "Arial".to_string(),
                        size,
                        bold: false,
                        italic: false,
                        underline: false,
                    },
                    color: Rgb::new(0x40, 0x40, 0x40),
                }],
                line_spacing: 1.0,
                space_before: 0.0,
                space_after: 0.0,
                indent: 0.0,
            }],
            insets: [4.0; 4],
            anchor: VerticalAnchor::Middle,
            wrap: true,
        };
        self.draw_text(&label, frame, local);
    }
}

/// Rotation about the frame center, then flips about the same center.
fn element_transform(frame: &Rect, transform: &ShapeTransform) -> Transform {
    let (cx, cy) = frame.center();
    let (cx, cy) = (cx as f32, cy as f32);
    let mut local = Transform::identity();
    if transform.rotation != 0.0 {
        local = Transform::from_rotate_at(transform.rotation as f32, cx, cy);
    }
    if transform.flip_h || transform.flip_v {
        let sx = if transform.flip_h { -1.0 } else { 1.0 };
        let sy = if transform.flip_v { -1.0 } else { 1.0 };
        let flip = Transform::from_row(sx, 0.0, 0.0, sy, cx * (1.0 - sx), cy * (1.0 - sy));
        local = local.pre_concat(flip);
    }
    local
}

/// Start and end of a linear gradient across `bounds`.
///
/// Angles follow the drawing convention: 0 runs left to right and angles
/// grow clockwise. Cardinal angles run edge to edge through the center;
/// any other angle runs corner to corner along the diagonal of its
/// quadrant.
pub fn gradient_endpoints(bounds: &Rect, angle: f64) -> (Point, Point) {
    let (cx, cy) = bounds.center();
    let (left, top, right, bottom) = (bounds.x, bounds.y, bounds.right(), bounds.bottom());
    let angle = angle.rem_euclid(360.0);
    let cardinal = |a: f64| (angle - a).abs() < 1e-6;
    let (start, end) = if cardinal(0.0) {
        ((left, cy), (right, cy))
    } else if cardinal(90.0) {
        ((cx, top), (cx, bottom))
    } else if cardinal(180.0) {
        ((right, cy), (left, cy))
    } else if cardinal(270.0) {
        ((cx, bottom), (cx, top))
    } else if angle < 90.0 {
        ((left, top), (right, bottom))
    } else if angle < 180.0 {
        ((right, top), (left, bottom))
    } else if angle < 270.0 {
        ((right, bottom), (left, top))
    } else {
        ((left, bottom), (right, top))
    };
    (Point::new(start.0, start.1), Point::new(end.0, end.1))
}

fn gradient_shader(gradient: &GradientFill, bounds: &Rect) -> Option<Shader<'static>> {
    let (start, end) = gradient_endpoints(bounds, gradient.angle);
    let stops = gradient
        .stops
        .iter()
        .map(|s| tiny_skia::GradientStop::new(s.position.clamp(0.0, 1.0) as f32, color(s.color, 1.0)))
        .collect::<Vec<_>>();
    LinearGradient::new(
        tiny_skia::Point::from_xy(start.x as f32, start.y as f32),
        tiny_skia::Point::from_xy(end.x as f32, end.y as f32),
        stops,
        SpreadMode::Pad,
        Transform::identity(),
    )
}

fn color(rgb: Rgb, alpha: f64) -> Color {
    Color::from_rgba8(rgb.r, rgb.g, rgb.b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn solid_paint(rgb: Rgb, alpha: f64, anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color(rgb, alpha));
    paint.anti_alias = anti_alias;
    paint
}

fn skia_path(path: &ClosedPath) -> Option<tiny_skia::Path> {
    let mut builder = PathBuilder::new();
    for command in &path.commands {
        match *command {
            PathCommand::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathCommand::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathCommand::CubicTo { c1, c2, to } => builder.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                to.x as f32,
                to.y as f32,
            ),
            PathCommand::Close => builder.close(),
        }
    }
    builder.finish()
}

/// Diagonal hatch lines clipped to `frame`.
fn hatch_path(frame: &Rect, spacing: f64) -> Option<tiny_skia::Path> {
    let (x0, y0, x1, y1) = (frame.x, frame.y, frame.right(), frame.bottom());
    let mut builder = PathBuilder::new();
    // Lines x + y = c
    let mut c = x0 + y0 + spacing;
    while c < x1 + y1 {
        let start_x = x0.max(c - y1);
        let end_x = x1.min(c - y0);
        if start_x < end_x {
            builder.move_to(start_x as f32, (c - start_x) as f32);
            builder.line_to(end_x as f32, (c - end_x) as f32);
        }
        c += spacing;
    }
    builder.finish()
}

/// Premultiplied pixmap of a decoded image.
fn image_pixmap(image: &DecodedImage) -> Option<Pixmap> {
    if !image.is_complete() {
        return None;
    }
    let mut data = image.rgba.to_vec();
    for pixel in data.chunks_exact_mut(4) {
        let alpha = u16::from(pixel[3]);
        for channel in &mut pixel[..3] {
            *channel = ((u16::from(*channel) * alpha + 127) / 255) as u8;
        }
    }
    Pixmap::from_vec(data, IntSize::from_wh(image.width, image.height)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ellipse, rectangle};
    use crate::model::{GradientStop, Shadow};
    use crate::render::surface::SurfaceOrigin;

    fn rasterizer() -> Rasterizer {
        Rasterizer::with_font_book(FontBook::empty())
    }

    fn shape(frame: Rect, fill: Fill) -> RenderElement {
        RenderElement::new(
            frame,
            ElementContent::Shape(ShapeContent {
                path: rectangle(Rect::new(0.0, 0.0, frame.width, frame.height)),
                fill,
                stroke: None,
                shadow: None,
            }),
        )
    }

    fn rgb_at(bitmap: &Bitmap, x: u32, y: u32) -> [u8; 3] {
        let [r, g, b, _] = bitmap.pixel_top_down(x, y).unwrap();
        [r, g, b]
    }

    #[test]
    fn test_solid_fill_lands_in_frame() {
        let red = Rgb::new(255, 0, 0);
        let elements = vec![shape(Rect::new(10.0, 10.0, 20.0, 20.0), Fill::Solid(red))];
        let bitmap = rasterizer()
            .render(&elements, Size::new(100.0, 50.0), &RenderOptions::default())
            .unwrap();
        assert_eq!((bitmap.width(), bitmap.height()), (100, 50));
        assert_eq!(rgb_at(&bitmap, 20, 20), [255, 0, 0]);
        assert_eq!(rgb_at(&bitmap, 50, 20), [255, 255, 255]);
    }

    #[test]
    fn test_later_elements_paint_on_top() {
        let elements = vec![
            shape(Rect::new(0.0, 0.0, 40.0, 40.0), Fill::Solid(Rgb::new(255, 0, 0))),
            shape(Rect::new(10.0, 10.0, 20.0, 20.0), Fill::Solid(Rgb::new(0, 0, 255))),
        ];
        let bitmap = rasterizer()
            .render(&elements, Size::new(50.0, 50.0), &RenderOptions::default())
            .unwrap();
        assert_eq!(rgb_at(&bitmap, 20, 20), [0, 0, 255]);
        assert_eq!(rgb_at(&bitmap, 5, 5), [255, 0, 0]);
    }

    #[test]
    fn test_gradient_endpoints_cardinal() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        let (s, e) = gradient_endpoints(&bounds, 0.0);
        assert_eq!((s.x, s.y, e.x, e.y), (0.0, 25.0, 100.0, 25.0));
        let (s, e) = gradient_endpoints(&bounds, 90.0);
        assert_eq!((s.x, s.y, e.x, e.y), (50.0, 0.0, 50.0, 50.0));
        let (s, e) = gradient_endpoints(&bounds, 270.0);
        assert_eq!((s.y, e.y), (50.0, 0.0));
        let (s, e) = gradient_endpoints(&bounds, -90.0);
        assert_eq!((s.y, e.y), (50.0, 0.0));
    }

    #[test]
    fn test_gradient_endpoints_diagonal_buckets() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        let (s, e) = gradient_endpoints(&bounds, 45.0);
        assert_eq!((s.x, s.y, e.x, e.y), (0.0, 0.0, 100.0, 50.0));
        let (s, e) = gradient_endpoints(&bounds, 135.0);
        assert_eq!((s.x, s.y, e.x, e.y), (100.0, 0.0, 0.0, 50.0));
    }

    #[test]
    fn test_gradient_runs_between_stops() {
        let gradient = Fill::Gradient(GradientFill {
            stops: vec![
                GradientStop { color: Rgb::new(255, 0, 0), position: 0.0 },
                GradientStop { color: Rgb::new(0, 0, 255), position: 1.0 },
            ],
            angle: 0.0,
        });
        let elements = vec![shape(Rect::new(0.0, 0.0, 100.0, 10.0), gradient)];
        let bitmap = rasterizer()
            .render(&elements, Size::new(100.0, 10.0), &RenderOptions::default())
            .unwrap();
        let left = rgb_at(&bitmap, 1, 5);
        let right = rgb_at(&bitmap, 98, 5);
        assert!(left[0] > 200 && left[2] < 50);
        assert!(right[2] > 200 && right[0] < 50);

        // Low quality paints the first stop flat
        let low = RenderOptions::default().with_quality(Quality::Low);
        let bitmap = rasterizer().render(&elements, Size::new(100.0, 10.0), &low).unwrap();
        assert_eq!(rgb_at(&bitmap, 98, 5), [255, 0, 0]);
    }

    #[test]
    fn test_pattern_fill_is_gray() {
        let pattern = Fill::Pattern {
            foreground: Rgb::BLACK,
            background: Rgb::WHITE,
        };
        let elements = vec![shape(Rect::new(0.0, 0.0, 10.0, 10.0), pattern)];
        let bitmap = rasterizer()
            .render(&elements, Size::new(10.0, 10.0), &RenderOptions::default())
            .unwrap();
        assert_eq!(rgb_at(&bitmap, 5, 5), [0x80, 0x80, 0x80]);
    }

    #[test]
    fn test_shadow_only_with_effects() {
        let mut element = shape(Rect::new(0.0, 0.0, 10.0, 10.0), Fill::Solid(Rgb::WHITE));
        if let ElementContent::Shape(content) = &mut element.content {
            content.shadow = Some(Shadow {
                color: Rgb::BLACK,
                alpha: 1.0,
                dx: 10.0,
                dy: 0.0,
                blur: 0.0,
            });
        }
        let slide = Size::new(30.0, 10.0);
        let bitmap = rasterizer()
            .render(std::slice::from_ref(&element), slide, &RenderOptions::default())
            .unwrap();
        assert!(rgb_at(&bitmap, 15, 5)[0] < 255);

        let low = RenderOptions::default().with_quality(Quality::Low);
        let bitmap = rasterizer().render(&[element], slide, &low).unwrap();
        assert_eq!(rgb_at(&bitmap, 15, 5), [255, 255, 255]);
    }

    #[test]
    fn test_orientation_is_identical_top_down() {
        // Red band across the top fifth of the slide
        let elements = vec![shape(Rect::new(0.0, 0.0, 50.0, 10.0), Fill::Solid(Rgb::new(255, 0, 0)))];
        let slide = Size::new(50.0, 50.0);
        let top = rasterizer()
            .render(&elements, slide, &RenderOptions::default())
            .unwrap();
        let bottom = rasterizer()
            .render(
                &elements,
                slide,
                &RenderOptions::default().with_origin(SurfaceOrigin::BottomLeft),
            )
            .unwrap();

        assert_eq!(rgb_at(&top, 25, 2), [255, 0, 0]);
        assert_eq!(rgb_at(&bottom, 25, 2), [255, 0, 0]);
        assert_eq!(rgb_at(&bottom, 25, 45), [255, 255, 255]);
        assert_eq!(top.to_rgba_top_down(), bottom.to_rgba_top_down());
        // Storage differs: a bottom-left surface keeps the band in its last rows
        assert_ne!(top.data(), bottom.data());
    }

    #[test]
    fn test_image_is_aspect_fit() {
        let green = DecodedImage::new("g.png", 2, 1, [0u8, 255, 0, 255].repeat(2));
        let elements = vec![RenderElement::new(
            Rect::new(0.0, 0.0, 40.0, 40.0),
            ElementContent::Image(ImageContent::Decoded(green)),
        )];
        let bitmap = rasterizer()
            .render(&elements, Size::new(40.0, 40.0), &RenderOptions::default())
            .unwrap();
        // 2:1 image in a square frame spans rows 10..30
        assert_eq!(rgb_at(&bitmap, 20, 20), [0, 255, 0]);
        assert_eq!(rgb_at(&bitmap, 20, 3), [255, 255, 255]);
        assert_eq!(rgb_at(&bitmap, 20, 36), [255, 255, 255]);
    }

    #[test]
    fn test_placeholder_is_drawn() {
        let elements = vec![RenderElement::new(
            Rect::new(0.0, 0.0, 40.0, 40.0),
            ElementContent::Image(ImageContent::Placeholder {
                diagnostic: "missing".into(),
            }),
        )];
        let bitmap = rasterizer()
            .render(&elements, Size::new(40.0, 40.0), &RenderOptions::default())
            .unwrap();
        assert_ne!(rgb_at(&bitmap, 3, 20), [255, 255, 255]);
    }

    #[test]
    fn test_rotation_about_center() {
        let mut element = shape(Rect::new(20.0, 0.0, 10.0, 50.0), Fill::Solid(Rgb::BLACK));
        element.transform.rotation = 90.0;
        let bitmap = rasterizer()
            .render(&[element], Size::new(50.0, 50.0), &RenderOptions::default())
            .unwrap();
        // Vertical bar becomes horizontal through the same center
        assert_eq!(rgb_at(&bitmap, 5, 25), [0, 0, 0]);
        assert_eq!(rgb_at(&bitmap, 25, 5), [255, 255, 255]);
    }

    #[test]
    fn test_group_children_are_drawn() {
        let child = RenderElement::new(
            Rect::new(0.0, 0.0, 10.0, 10.0),
            ElementContent::Shape(ShapeContent {
                path: ellipse(Rect::new(0.0, 0.0, 10.0, 10.0)),
                fill: Fill::Solid(Rgb::BLACK),
                stroke: None,
                shadow: None,
            }),
        );
        let group = RenderElement::new(Rect::default(), ElementContent::Group(vec![child]));
        let bitmap = rasterizer()
            .render(&[group], Size::new(10.0, 10.0), &RenderOptions::default())
            .unwrap();
        assert_eq!(rgb_at(&bitmap, 5, 5), [0, 0, 0]);
    }

    #[test]
    fn test_group_rotation_turns_children() {
        let bar = shape(Rect::new(18.0, 0.0, 4.0, 40.0), Fill::Solid(Rgb::BLACK));
        let group = RenderElement::new(Rect::new(0.0, 0.0, 40.0, 40.0), ElementContent::Group(vec![bar]))
            .with_transform(ShapeTransform {
                rotation: 90.0,
                ..ShapeTransform::default()
            });
        let bitmap = rasterizer()
            .render(&[group], Size::new(40.0, 40.0), &RenderOptions::default())
            .unwrap();
        // The vertical bar lies across the group after a quarter turn
        assert_eq!(rgb_at(&bitmap, 5, 20), [0, 0, 0]);
        assert_eq!(rgb_at(&bitmap, 35, 20), [0, 0, 0]);
        assert_eq!(rgb_at(&bitmap, 20, 5), [255, 255, 255]);
        assert_eq!(rgb_at(&bitmap, 20, 35), [255, 255, 255]);
    }

    #[test]
    fn test_hatch_stays_inside_frame() {
        let frame = Rect::new(10.0, 10.0, 30.0, 20.0);
        let hatch = hatch_path(&frame, 8.0).unwrap();
        let bounds = hatch.bounds();
        assert!(bounds.left() >= 10.0 && bounds.right() <= 40.0);
        assert!(bounds.top() >= 10.0 && bounds.bottom() <= 30.0);
    }
}
