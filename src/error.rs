//! Error types for the unslide library.

use std::io;
use thiserror::Error;

/// Result type alias for unslide operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing or rendering slides.
///
/// Only [`Error::MalformedInput`] and [`Error::SurfaceAllocationFailed`] abort
/// work for a whole slide. Resource and geometry errors are caught next to the
/// element that produced them and replaced by a placeholder or a fallback.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// The XML could not be tokenized or is structurally broken.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A relationship target or archive part is absent, or could not be decoded.
    #[error("Missing resource: {0}")]
    MissingResource(String),

    /// A preset geometry keyword is not recognized.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The drawing surface could not be allocated.
    #[error("Surface allocation failed for {width}x{height} pixels")]
    SurfaceAllocationFailed { width: u32, height: u32 },

    /// Error while serializing the render tree.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Whether the error should be handled next to the element that caused it
    /// rather than failing the whole slide.
    pub fn is_local(&self) -> bool {
        matches!(self, Error::MissingResource(_) | Error::InvalidGeometry(_))
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::MalformedInput(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::MalformedInput(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
