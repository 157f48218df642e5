//! JSON export of the render tree.

use super::tree::RenderElement;
use crate::error::Result;

/// JSON output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Compact single-line JSON
    Compact,
    /// Pretty-printed with 2-space indentation
    #[default]
    Pretty,
}

/// Convert render elements to JSON.
pub fn to_json(elements: &[RenderElement], format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Compact => serde_json::to_string(elements)?,
        JsonFormat::Pretty => serde_json::to_string_pretty(elements)?,
    };
    Ok(json)
}

/// Convert render elements to JSON with default formatting.
pub fn to_json_default(elements: &[RenderElement]) -> Result<String> {
    to_json(elements, JsonFormat::Pretty)
}

/// Read render elements back. Decoded image pixels are not part of the JSON,
/// so images come back with empty buffers.
pub fn from_json(json: &str) -> Result<Vec<RenderElement>> {
    Ok(serde_json::from_str(json)?)
}
