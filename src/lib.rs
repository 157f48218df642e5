//! # unslide
//!
//! Render PowerPoint (PPTX) slides to raster images without an office suite.
//!
//! The pipeline for one slide: slide XML is parsed into
//! [`ShapeInfo`](model::ShapeInfo) values, the render tree builder turns
//! those into ordered [`RenderElement`](render::RenderElement)s, and the
//! rasterizer composites the elements onto a [`Bitmap`](render::Bitmap).
//!
//! ## Quick Start
//!
//! ```no_run
//! use unslide::render::{Rasterizer, RenderOptions};
//!
//! let presentation = unslide::open("deck.pptx")?;
//! let rasterizer = Rasterizer::new();
//! for index in 0..presentation.slide_count() {
//!     let bitmap = presentation.render_slide(index, &rasterizer, &RenderOptions::default())?;
//!     bitmap.save_png(format!("slide{}.png", index + 1))?;
//! }
//! # Ok::<(), unslide::Error>(())
//! ```
//!
//! ## Stage by Stage
//!
//! ```no_run
//! use unslide::pptx::SlideParser;
//! use unslide::render::{to_json, JsonFormat, RenderTreeBuilder};
//! use unslide::theme::Theme;
//!
//! let theme = Theme::parse(&std::fs::read("theme1.xml")?)?;
//! let shapes = SlideParser::new(Some(&theme)).parse(&std::fs::read("slide1.xml")?)?;
//! let elements = RenderTreeBuilder::new().with_theme(Some(&theme)).build(&shapes);
//! println!("{}", to_json(&elements, JsonFormat::Pretty)?);
//! # Ok::<(), unslide::Error>(())
//! ```

pub mod container;
pub mod error;
pub mod geometry;
pub mod model;
pub mod pptx;
pub mod render;
pub mod theme;
pub mod units;

// Re-exports
pub use container::{OoxmlContainer, PartSource, Relationship, Relationships};
pub use error::{Error, Result};
pub use pptx::{Presentation, SlideParser};
pub use units::{emu_to_points, points_to_emu};

use std::path::Path;

/// Open a presentation file.
///
/// # Example
///
/// ```no_run
/// let presentation = unslide::open("deck.pptx")?;
/// println!("Slides: {}", presentation.slide_count());
/// # Ok::<(), unslide::Error>(())
/// ```
pub fn open(path: impl AsRef<Path>) -> Result<Presentation> {
    Presentation::open(path)
}

/// Render tree of one slide (zero-based `index`).
///
/// # Example
///
/// ```no_run
/// let elements = unslide::render_tree("deck.pptx", 0)?;
/// println!("Elements: {}", elements.len());
/// # Ok::<(), unslide::Error>(())
/// ```
pub fn render_tree(path: impl AsRef<Path>, index: usize) -> Result<Vec<render::RenderElement>> {
    open(path)?.render_elements(index)
}

/// Render one slide to PNG bytes using the system fonts.
///
/// # Example
///
/// ```no_run
/// use unslide::render::RenderOptions;
///
/// let png = unslide::render_png("deck.pptx", 0, &RenderOptions::new().with_width(1920))?;
/// std::fs::write("slide1.png", png)?;
/// # Ok::<(), unslide::Error>(())
/// ```
pub fn render_png(path: impl AsRef<Path>, index: usize, options: &render::RenderOptions) -> Result<Vec<u8>> {
    let presentation = open(path)?;
    let rasterizer = render::Rasterizer::new();
    presentation.render_slide(index, &rasterizer, options)?.encode_png()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file() {
        assert!(matches!(open("does-not-exist.pptx"), Err(Error::Io(_))));
    }
}
