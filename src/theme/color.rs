//! RGB colors, scheme color slots and luminance adjustment.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque 8-bit RGB color.
///
/// Serialized as an uppercase `RRGGBB` hex string, the same form the XML uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    pub const GRAY: Rgb = Rgb::new(0x80, 0x80, 0x80);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `RRGGBB` (an optional leading `#` is accepted).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Uppercase `RRGGBB`.
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Apply luminance modulation and offset in HSL space:
    /// `L' = clamp(L * lum_mod + lum_off, 0, 1)`.
    pub fn with_luminance(self, lum_mod: Option<f64>, lum_off: Option<f64>) -> Rgb {
        if lum_mod.is_none() && lum_off.is_none() {
            return self;
        }
        let (h, s, l) = self.to_hsl();
        let l = (l * lum_mod.unwrap_or(1.0) + lum_off.unwrap_or(0.0)).clamp(0.0, 1.0);
        Rgb::from_hsl(h, s, l)
    }

    /// Linear blend toward `other`; `t = 0` keeps `self`.
    pub fn mix(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(lerp(self.r, other.r), lerp(self.g, other.g), lerp(self.b, other.b))
    }

    /// Hue in degrees, saturation and lightness in `[0, 1]`.
    pub fn to_hsl(&self) -> (f64, f64, f64) {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        let delta = max - min;

        if delta.abs() < f64::EPSILON {
            return (0.0, 0.0, l);
        }

        let s = if l > 0.5 {
            delta / (2.0 - max - min)
        } else {
            delta / (max + min)
        };

        let h = if (max - r).abs() < f64::EPSILON {
            ((g - b) / delta).rem_euclid(6.0)
        } else if (max - g).abs() < f64::EPSILON {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        };

        (h * 60.0, s, l)
    }

    pub fn from_hsl(h: f64, s: f64, l: f64) -> Rgb {
        if s <= 0.0 {
            let v = (l * 255.0).round() as u8;
            return Rgb::new(v, v, v);
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let h = h / 360.0;

        let channel = |t: f64| {
            let t = t.rem_euclid(1.0);
            let v = if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            };
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        };

        Rgb::new(channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
    }

    /// Named colors used by `a:prstClr`.
    pub fn from_preset_name(name: &str) -> Option<Rgb> {
        let rgb = match name {
            "black" => Rgb::BLACK,
            "white" => Rgb::WHITE,
            "red" => Rgb::new(0xFF, 0x00, 0x00),
            "green" => Rgb::new(0x00, 0x80, 0x00),
            "blue" => Rgb::new(0x00, 0x00, 0xFF),
            "yellow" => Rgb::new(0xFF, 0xFF, 0x00),
            "cyan" => Rgb::new(0x00, 0xFF, 0xFF),
            "magenta" => Rgb::new(0xFF, 0x00, 0xFF),
            "orange" => Rgb::new(0xFF, 0xA5, 0x00),
            "purple" => Rgb::new(0x80, 0x00, 0x80),
            "gray" | "grey" => Rgb::GRAY,
            "ltGray" => Rgb::new(0xD3, 0xD3, 0xD3),
            "dkGray" => Rgb::new(0xA9, 0xA9, 0xA9),
            _ => return None,
        };
        Some(rgb)
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::BLACK
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

impl From<Rgb> for String {
    fn from(rgb: Rgb) -> Self {
        rgb.to_hex()
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Rgb::from_hex(&value).ok_or_else(|| format!("invalid hex color: {value}"))
    }
}

/// One of the twelve theme color slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SchemeSlot {
    Dk1,
    Lt1,
    Dk2,
    Lt2,
    Accent1,
    Accent2,
    Accent3,
    Accent4,
    Accent5,
    Accent6,
    Hlink,
    FolHlink,
}

impl SchemeSlot {
    pub const ALL: [SchemeSlot; 12] = [
        SchemeSlot::Dk1,
        SchemeSlot::Lt1,
        SchemeSlot::Dk2,
        SchemeSlot::Lt2,
        SchemeSlot::Accent1,
        SchemeSlot::Accent2,
        SchemeSlot::Accent3,
        SchemeSlot::Accent4,
        SchemeSlot::Accent5,
        SchemeSlot::Accent6,
        SchemeSlot::Hlink,
        SchemeSlot::FolHlink,
    ];

    /// Decode a scheme token. The text/background aliases used on slides
    /// (`tx1`, `bg1`, `tx2`, `bg2`) map onto their dark/light slots.
    pub fn from_token(token: &str) -> Option<Self> {
        let slot = match token {
            "dk1" | "tx1" => SchemeSlot::Dk1,
            "lt1" | "bg1" => SchemeSlot::Lt1,
            "dk2" | "tx2" => SchemeSlot::Dk2,
            "lt2" | "bg2" => SchemeSlot::Lt2,
            "accent1" => SchemeSlot::Accent1,
            "accent2" => SchemeSlot::Accent2,
            "accent3" => SchemeSlot::Accent3,
            "accent4" => SchemeSlot::Accent4,
            "accent5" => SchemeSlot::Accent5,
            "accent6" => SchemeSlot::Accent6,
            "hlink" => SchemeSlot::Hlink,
            "folHlink" => SchemeSlot::FolHlink,
            _ => return None,
        };
        Some(slot)
    }

    /// The element name used for this slot inside `a:clrScheme`.
    pub fn token(&self) -> &'static str {
        match self {
            SchemeSlot::Dk1 => "dk1",
            SchemeSlot::Lt1 => "lt1",
            SchemeSlot::Dk2 => "dk2",
            SchemeSlot::Lt2 => "lt2",
            SchemeSlot::Accent1 => "accent1",
            SchemeSlot::Accent2 => "accent2",
            SchemeSlot::Accent3 => "accent3",
            SchemeSlot::Accent4 => "accent4",
            SchemeSlot::Accent5 => "accent5",
            SchemeSlot::Accent6 => "accent6",
            SchemeSlot::Hlink => "hlink",
            SchemeSlot::FolHlink => "folHlink",
        }
    }

    /// Color used when no theme is available (the stock Office palette).
    ///
    /// `lt1` is plain white so that shapes filled with the background slot
    /// read as unfilled on a white slide.
    pub fn fallback(&self) -> Rgb {
        match self {
            SchemeSlot::Dk1 => Rgb::BLACK,
            SchemeSlot::Lt1 => Rgb::WHITE,
            SchemeSlot::Dk2 => Rgb::new(0x44, 0x54, 0x6A),
            SchemeSlot::Lt2 => Rgb::new(0xE7, 0xE6, 0xE6),
            SchemeSlot::Accent1 => Rgb::new(0x44, 0x72, 0xC4),
            SchemeSlot::Accent2 => Rgb::new(0xED, 0x7D, 0x31),
            SchemeSlot::Accent3 => Rgb::new(0xA5, 0xA5, 0xA5),
            SchemeSlot::Accent4 => Rgb::new(0xFF, 0xC0, 0x00),
            SchemeSlot::Accent5 => Rgb::new(0x5B, 0x9B, 0xD5),
            SchemeSlot::Accent6 => Rgb::new(0x70, 0xAD, 0x47),
            SchemeSlot::Hlink => Rgb::new(0x05, 0x63, 0xC1),
            SchemeSlot::FolHlink => Rgb::new(0x95, 0x4F, 0x72),
        }
    }
}

/// Convert an OOXML percentage (`100000` = 100%) to a fraction.
pub(crate) fn percent_value(value: &str) -> Option<f64> {
    let value = value.trim();
    if let Some(pct) = value.strip_suffix('%') {
        return pct.parse::<f64>().ok().map(|v| v / 100.0);
    }
    value.parse::<f64>().ok().map(|v| v / 100_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let c = Rgb::from_hex("#ffc000").unwrap();
        assert_eq!(c, Rgb::new(0xFF, 0xC0, 0x00));
        assert_eq!(c.to_hex(), "FFC000");
        assert!(Rgb::from_hex("FFC0").is_none());
        assert!(Rgb::from_hex("GGGGGG").is_none());
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(Rgb::from_hsl(0.0, 1.0, 0.5), Rgb::new(255, 0, 0));
        assert_eq!(Rgb::from_hsl(120.0, 1.0, 0.5), Rgb::new(0, 255, 0));
        assert_eq!(Rgb::from_hsl(240.0, 1.0, 0.5), Rgb::new(0, 0, 255));

        let (h, s, l) = Rgb::new(0x44, 0x72, 0xC4).to_hsl();
        let back = Rgb::from_hsl(h, s, l);
        assert_eq!(back, Rgb::new(0x44, 0x72, 0xC4));
    }

    #[test]
    fn test_luminance_clamps() {
        let white = Rgb::new(0x44, 0x72, 0xC4).with_luminance(Some(1.0), Some(2.0));
        assert_eq!(white, Rgb::WHITE);
        let black = Rgb::new(0x44, 0x72, 0xC4).with_luminance(Some(0.0), None);
        assert_eq!(black, Rgb::BLACK);
    }

    #[test]
    fn test_luminance_darken() {
        // 75% luminance of pure white is a light gray
        let gray = Rgb::WHITE.with_luminance(Some(0.75), None);
        assert_eq!(gray, Rgb::new(191, 191, 191));
    }

    #[test]
    fn test_slot_aliases() {
        assert_eq!(SchemeSlot::from_token("tx1"), Some(SchemeSlot::Dk1));
        assert_eq!(SchemeSlot::from_token("bg1"), Some(SchemeSlot::Lt1));
        assert_eq!(SchemeSlot::from_token("phClr"), None);
        for slot in SchemeSlot::ALL {
            assert_eq!(SchemeSlot::from_token(slot.token()), Some(slot));
        }
    }

    #[test]
    fn test_lt1_fallback_is_white() {
        assert_eq!(SchemeSlot::Lt1.fallback(), Rgb::WHITE);
    }

    #[test]
    fn test_percent_value() {
        assert_eq!(percent_value("75000"), Some(0.75));
        assert_eq!(percent_value("50%"), Some(0.5));
        assert_eq!(percent_value("x"), None);
    }

    #[test]
    fn test_serde_hex() {
        let json = serde_json::to_string(&Rgb::new(1, 2, 255)).unwrap();
        assert_eq!(json, "\"0102FF\"");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgb::new(1, 2, 255));
    }
}
