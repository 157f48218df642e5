//! Shape, fill and picture models.

use super::{TableInfo, TextBoxInfo};
use crate::theme::Rgb;
use crate::units::EmuRect;
use serde::{Deserialize, Serialize};

/// One stop of a gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub color: Rgb,
    /// Position along the gradient in `[0, 1]`
    pub position: f64,
}

/// A linear gradient fill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradientFill {
    pub stops: Vec<GradientStop>,
    /// Direction in degrees, clockwise from left-to-right
    pub angle: f64,
}

impl GradientFill {
    /// Sort stops by position. The sort is stable, so stops sharing a
    /// position keep their document order.
    pub fn sort_stops(&mut self) {
        self.stops
            .sort_by(|a, b| a.position.total_cmp(&b.position));
    }

    /// Whether positions are non-decreasing.
    pub fn is_sorted(&self) -> bool {
        self.stops.windows(2).all(|w| w[0].position <= w[1].position)
    }
}

/// Shape fill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fill {
    #[default]
    None,
    Solid(Rgb),
    Gradient(GradientFill),
    /// Pattern fill; drawn as a flat color by the rasterizer
    Pattern { foreground: Rgb, background: Rgb },
}

impl Fill {
    /// Whether the fill paints anything.
    pub fn is_visible(&self) -> bool {
        !matches!(self, Fill::None)
    }
}

/// Shape outline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Rgb,
    /// Width in points
    pub width: f64,
}

/// Outer shadow (`a:outerShdw`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub color: Rgb,
    /// Opacity in `[0, 1]`
    pub alpha: f64,
    /// Horizontal offset in points
    pub dx: f64,
    /// Vertical offset in points
    pub dy: f64,
    /// Blur radius in points
    pub blur: f64,
}

/// Visual properties of an auto shape (`p:spPr` plus `p:style`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeProperties {
    /// Preset geometry keyword (`a:prstGeom/@prst`)
    pub geometry: String,

    /// Adjust values from `a:avLst`, as `(name, value)`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub adjustments: Vec<(String, i64)>,

    pub fill: Fill,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
}

impl Default for ShapeProperties {
    fn default() -> Self {
        Self {
            geometry: "rect".to_string(),
            adjustments: Vec::new(),
            fill: Fill::None,
            stroke: None,
            shadow: None,
        }
    }
}

impl ShapeProperties {
    /// Look up an adjust value by guide name.
    pub fn adjustment(&self, name: &str) -> Option<i64> {
        self.adjustments
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Whether the shape draws anything besides its text.
    pub fn is_visible(&self) -> bool {
        self.fill.is_visible() || self.stroke.is_some() || self.geometry != "rect"
    }
}

/// A picture (`p:pic`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PictureInfo {
    /// Relationship id of the embedded image (`a:blip/@r:embed`)
    pub relationship_id: String,
    pub frame: EmuRect,
    /// Alternative text (`p:cNvPr/@descr`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Rotation and flips of a shape (`a:xfrm`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeTransform {
    /// Clockwise rotation in degrees
    pub rotation: f64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub flip_h: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub flip_v: bool,
}

impl ShapeTransform {
    pub fn is_identity(&self) -> bool {
        self.rotation == 0.0 && !self.flip_h && !self.flip_v
    }
}

/// Placeholder role of a shape (`p:ph/@type`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaceholderRole {
    Title,
    CenterTitle,
    Subtitle,
    Body,
    Other(String),
}

impl PlaceholderRole {
    /// Decode `p:ph/@type`. A placeholder without a type is a body placeholder.
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            None | Some("body") | Some("obj") => PlaceholderRole::Body,
            Some("title") => PlaceholderRole::Title,
            Some("ctrTitle") => PlaceholderRole::CenterTitle,
            Some("subTitle") => PlaceholderRole::Subtitle,
            Some(other) => PlaceholderRole::Other(other.to_string()),
        }
    }
}

/// What a shape is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeVariant {
    /// Text with no visible geometry of its own
    TextBox(TextBoxInfo),
    Picture(PictureInfo),
    /// Auto shape with visible geometry and optional text
    Shape {
        properties: ShapeProperties,
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<TextBoxInfo>,
    },
    Table(TableInfo),
    /// Group shape; child frames are already mapped into slide space
    Group(Vec<ShapeInfo>),
}

/// A shape parsed from a slide, in document (z) order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeInfo {
    /// Shape id (`p:cNvPr/@id`), unique within the slide
    pub id: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Frame in EMUs, slide space
    pub frame: EmuRect,
    #[serde(default)]
    pub transform: ShapeTransform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<PlaceholderRole>,
    pub variant: ShapeVariant,
}

impl ShapeInfo {
    /// Visit this shape and all nested group children depth-first.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a ShapeInfo)) {
        visit(self);
        if let ShapeVariant::Group(children) = &self.variant {
            for child in children {
                child.walk(visit);
            }
        }
    }

    /// Text body carried by the shape, if any.
    pub fn text(&self) -> Option<&TextBoxInfo> {
        match &self.variant {
            ShapeVariant::TextBox(text) => Some(text),
            ShapeVariant::Shape { text, .. } => text.as_ref(),
            _ => None,
        }
    }
}

/// Everything parsed from one slide part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedSlide {
    /// Slide background (`p:bg`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Fill>,
    pub shapes: Vec<ShapeInfo>,
}
