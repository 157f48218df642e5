//! PPTX (PowerPoint) slide parsing.
//!
//! [`SlideParser`] turns one slide part into [`ShapeInfo`](crate::model::ShapeInfo)
//! values; [`Presentation`] finds the slides, the slide size and the theme
//! inside a package.

mod element;
mod placeholder;
mod presentation;
mod slide;

pub use placeholder::PlaceholderDefaults;
pub use presentation::Presentation;
pub use slide::{extract_text_lines, parse_slide, SlideParser};
