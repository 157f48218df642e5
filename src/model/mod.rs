//! Intermediate slide model.
//!
//! The slide parser turns slide XML into these structures; the render tree
//! builder consumes them. All frames are in EMUs and all lists keep document
//! order, which is also the drawing (z) order.

mod shape;
mod table;
mod text;

pub use shape::*;
pub use table::*;
pub use text::*;
