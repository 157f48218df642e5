//! From parsed shapes to pixels.
//!
//! [`RenderTreeBuilder`] turns [`ShapeInfo`](crate::model::ShapeInfo) lists
//! into an ordered [`RenderElement`] tree; [`Rasterizer`] composites that
//! tree onto a [`Bitmap`]. The tree can also be exported as JSON for other
//! rasterizers.
//!
//! # Example
//!
//! ```no_run
//! use unslide::pptx::SlideParser;
//! use unslide::render::{Rasterizer, RenderOptions, RenderTreeBuilder};
//! use unslide::units::Size;
//!
//! let xml = std::fs::read("slide1.xml")?;
//! let shapes = SlideParser::new(None).parse(&xml)?;
//! let elements = RenderTreeBuilder::new().build(&shapes);
//!
//! let bitmap = Rasterizer::new().render(&elements, Size::default(), &RenderOptions::default())?;
//! bitmap.save_png("slide1.png")?;
//! # Ok::<(), unslide::Error>(())
//! ```

mod builder;
mod fonts;
mod image;
mod json;
mod options;
mod raster;
mod surface;
mod text_layout;
mod tree;

pub use builder::{RenderTreeBuilder, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE};
pub use fonts::{DefaultFontSubstitution, FallbackMeasure, FontBook, FontSubstitution, GenericFamily, TextMeasure};
pub use image::{decode_image, ArchiveImageLoader, ImageLoader};
pub use json::{from_json, to_json, to_json_default, JsonFormat};
pub use options::{Quality, RenderOptions};
pub use raster::{gradient_endpoints, Rasterizer, PATTERN_FALLBACK};
pub use surface::{device_transform, Bitmap, SurfaceOrigin};
pub use text_layout::{layout_text, LaidOutLine, PlacedFragment, TextLayout, LINE_HEIGHT_FACTOR};
pub use tree::{
    DecodedImage, ElementContent, ElementKind, ImageContent, RenderElement, ShapeContent,
    TextContent, TextFont, TextParagraph, TextSpan,
};
