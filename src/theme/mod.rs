//! Theme parsing and scheme color resolution.
//!
//! A [`Theme`] is parsed once per presentation and then shared read-only by
//! every slide parse, so it is plain data (`Send + Sync`) with no interior
//! mutability.

mod color;

pub use color::{Rgb, SchemeSlot};
pub(crate) use color::percent_value;

use crate::container::decode_xml_bytes;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Color scheme and font scheme of a presentation theme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Theme name (`a:theme/@name`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Scheme colors present in the theme
    pub colors: BTreeMap<SchemeSlot, Rgb>,

    /// Latin typeface for headings (`+mj-lt`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major_font: Option<String>,

    /// Latin typeface for body text (`+mn-lt`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minor_font: Option<String>,
}

#[derive(Clone, Copy, PartialEq)]
enum FontTarget {
    Major,
    Minor,
}

impl Theme {
    /// Create an empty theme; every slot resolves through the fallback table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a theme part (`ppt/theme/themeN.xml`).
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let xml = decode_xml_bytes(xml)?;
        let mut reader = quick_xml::Reader::from_str(&xml);
        reader.config_mut().trim_text(true);

        let mut theme = Theme::new();
        let mut buf = Vec::new();
        let mut in_color_scheme = false;
        let mut current_slot: Option<SchemeSlot> = None;
        let mut font_target: Option<FontTarget> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(ref e))
                | Ok(quick_xml::events::Event::Empty(ref e)) => {
                    let name = e.name();
                    match name.local_name().as_ref() {
                        b"theme" => {
                            for attr in e.attributes().flatten() {
                                if attr.key.local_name().as_ref() == b"name" {
                                    theme.name =
                                        Some(String::from_utf8_lossy(&attr.value).to_string());
                                }
                            }
                        }
                        b"clrScheme" => in_color_scheme = true,
                        b"majorFont" => font_target = Some(FontTarget::Major),
                        b"minorFont" => font_target = Some(FontTarget::Minor),
                        b"latin" => {
                            if let Some(target) = font_target {
                                let typeface = e
                                    .attributes()
                                    .flatten()
                                    .find(|a| a.key.local_name().as_ref() == b"typeface")
                                    .map(|a| String::from_utf8_lossy(&a.value).to_string())
                                    .filter(|t| !t.is_empty());
                                match target {
                                    FontTarget::Major => theme.major_font = typeface,
                                    FontTarget::Minor => theme.minor_font = typeface,
                                }
                            }
                        }
                        b"srgbClr" | b"sysClr" if current_slot.is_some() => {
                            let is_sys = name.local_name().as_ref() == b"sysClr";
                            let mut value = None;
                            for attr in e.attributes().flatten() {
                                let key = attr.key.local_name();
                                let wanted: &[u8] = if is_sys { b"lastClr" } else { b"val" };
                                if key.as_ref() == wanted {
                                    value = Rgb::from_hex(&String::from_utf8_lossy(&attr.value));
                                }
                            }
                            if let (Some(slot), Some(rgb)) = (current_slot, value) {
                                theme.colors.insert(slot, rgb);
                            }
                        }
                        other if in_color_scheme => {
                            if let Ok(token) = std::str::from_utf8(other) {
                                if let Some(slot) = SchemeSlot::from_token(token) {
                                    // Only the canonical element names appear in a scheme
                                    if slot.token() == token {
                                        current_slot = Some(slot);
                                    }
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Ok(quick_xml::events::Event::End(ref e)) => {
                    let name = e.name();
                    match name.local_name().as_ref() {
                        b"clrScheme" => {
                            in_color_scheme = false;
                            current_slot = None;
                        }
                        b"majorFont" | b"minorFont" => font_target = None,
                        other => {
                            if current_slot.map(|s| s.token().as_bytes()) == Some(other) {
                                current_slot = None;
                            }
                        }
                    }
                }
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::MalformedInput(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        log::debug!(colors = theme.colors.len(); "Parsed theme");
        Ok(theme)
    }

    /// Color of a slot, falling back to the stock palette if the theme lacks it.
    pub fn color(&self, slot: SchemeSlot) -> Rgb {
        self.colors.get(&slot).copied().unwrap_or_else(|| slot.fallback())
    }

    /// Resolve a slot with optional luminance modulation/offset.
    pub fn resolve(&self, slot: SchemeSlot, lum_mod: Option<f64>, lum_off: Option<f64>) -> Rgb {
        self.color(slot).with_luminance(lum_mod, lum_off)
    }

    /// Map a theme font reference (`+mj-lt`, `+mn-lt`, ...) to a typeface.
    /// Other names are returned unchanged.
    pub fn resolve_typeface<'a>(&'a self, typeface: &'a str) -> &'a str {
        match typeface {
            t if t.starts_with("+mj") => self.major_font.as_deref().unwrap_or("Calibri Light"),
            t if t.starts_with("+mn") => self.minor_font.as_deref().unwrap_or("Calibri"),
            t => t,
        }
    }
}

/// Resolve a scheme slot through `theme` when one is supplied, otherwise
/// through the fixed fallback table.
///
/// Pure: identical inputs always produce the identical color.
pub fn resolve(
    theme: Option<&Theme>,
    slot: SchemeSlot,
    lum_mod: Option<f64>,
    lum_off: Option<f64>,
) -> Rgb {
    match theme {
        Some(theme) => theme.resolve(slot, lum_mod, lum_off),
        None => slot.fallback().with_luminance(lum_mod, lum_off),
    }
}
