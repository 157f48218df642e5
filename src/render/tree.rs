//! Render tree: the drawable intermediate representation.
//!
//! Frames are in points, slide space, origin top-left, Y down. Shape paths
//! are local to their element's frame (origin at the frame's top-left).

use crate::geometry::ClosedPath;
use crate::model::{Fill, Shadow, ShapeTransform, Stroke, TextAlignment, VerticalAnchor};
use crate::theme::Rgb;
use crate::units::Rect;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Kind of a render element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Shape,
    Text,
    Image,
    Group,
}

/// One drawable element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderElement {
    pub frame: Rect,
    #[serde(default)]
    pub transform: ShapeTransform,
    pub content: ElementContent,
}

impl RenderElement {
    pub fn new(frame: Rect, content: ElementContent) -> Self {
        Self {
            frame,
            transform: ShapeTransform::default(),
            content,
        }
    }

    pub fn with_transform(mut self, transform: ShapeTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn kind(&self) -> ElementKind {
        match &self.content {
            ElementContent::Shape(_) => ElementKind::Shape,
            ElementContent::Text(_) => ElementKind::Text,
            ElementContent::Image(_) => ElementKind::Image,
            ElementContent::Group(_) => ElementKind::Group,
        }
    }

    /// Text of a text element, paragraphs joined by newlines.
    pub fn text(&self) -> Option<String> {
        match &self.content {
            ElementContent::Text(text) => Some(text.text()),
            _ => None,
        }
    }

    /// Visit this element and its group children depth-first.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a RenderElement)) {
        visit(self);
        if let ElementContent::Group(children) = &self.content {
            for child in children {
                child.walk(visit);
            }
        }
    }
}

/// What an element draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum ElementContent {
    Shape(ShapeContent),
    Text(TextContent),
    Image(ImageContent),
    Group(Vec<RenderElement>),
}

/// A filled and/or stroked contour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeContent {
    /// Contour relative to the frame origin
    pub path: ClosedPath,
    pub fill: Fill,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
}

/// Resolved font request of a span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFont {
    pub family: String,
    /// Size in points
    pub size: f64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub underline: bool,
}

/// Text sharing one font and color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    pub font: TextFont,
    pub color: Rgb,
}

/// A laid-out-ready paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextParagraph {
    pub alignment: TextAlignment,
    pub spans: Vec<TextSpan>,
    /// Multiplier on the 1.2 line height
    pub line_spacing: f64,
    /// Points before the first line
    #[serde(default)]
    pub space_before: f64,
    /// Points after the last line
    #[serde(default)]
    pub space_after: f64,
    /// Horizontal offset from the content box, in points
    #[serde(default)]
    pub indent: f64,
}

impl TextParagraph {
    /// Concatenated span text.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Largest span size, or `fallback` for a paragraph without spans.
    pub fn max_font_size(&self, fallback: f64) -> f64 {
        self.spans
            .iter()
            .map(|s| s.font.size)
            .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.max(s))))
            .unwrap_or(fallback)
    }
}

/// Text drawn inside a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub paragraphs: Vec<TextParagraph>,
    /// Insets from the frame in points: left, top, right, bottom
    #[serde(default)]
    pub insets: [f64; 4],
    #[serde(default)]
    pub anchor: VerticalAnchor,
    pub wrap: bool,
}

impl TextContent {
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(TextParagraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Box the text is laid out in.
    pub fn content_box(&self, frame: &Rect) -> Rect {
        let [left, top, right, bottom] = self.insets;
        frame.inset(left, top, right, bottom)
    }
}

/// Decoded RGBA pixels of a picture.
///
/// The pixel buffer is shared, so cloning an element is cheap. It is not
/// serialized; the IR carries the source path and size only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedImage {
    /// Archive path the image was read from
    pub source: String,
    pub width: u32,
    pub height: u32,
    /// Straight (non-premultiplied) RGBA, row-major, top row first
    #[serde(skip)]
    pub rgba: Arc<Vec<u8>>,
}

impl DecodedImage {
    pub fn new(source: impl Into<String>, width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            source: source.into(),
            width,
            height,
            rgba: Arc::new(rgba),
        }
    }

    /// Whether the buffer holds `width * height` pixels.
    pub fn is_complete(&self) -> bool {
        self.rgba.len() == self.width as usize * self.height as usize * 4
    }
}

/// Picture content: decoded pixels or a labeled placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageContent {
    Decoded(DecodedImage),
    Placeholder { diagnostic: String },
}

impl ImageContent {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, ImageContent::Placeholder { .. })
    }
}
