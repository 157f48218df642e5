//! Text body, paragraph and run models.

use crate::theme::Rgb;
use serde::{Deserialize, Serialize};

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlignment {
    /// Decode the `algn` attribute of `a:pPr`.
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "l" => Some(TextAlignment::Left),
            "ctr" => Some(TextAlignment::Center),
            "r" => Some(TextAlignment::Right),
            "just" | "dist" | "thaiDist" | "justLow" => Some(TextAlignment::Justify),
            _ => None,
        }
    }
}

/// Vertical anchoring of text inside its box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAnchor {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl VerticalAnchor {
    /// Decode the `anchor` attribute of `a:bodyPr`.
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "t" => Some(VerticalAnchor::Top),
            "ctr" => Some(VerticalAnchor::Middle),
            "b" => Some(VerticalAnchor::Bottom),
            _ => None,
        }
    }
}

/// Insets between the shape frame and its text, in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insets {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl Default for Insets {
    /// 0.1 in left/right, 0.05 in top/bottom.
    fn default() -> Self {
        Self {
            left: 91_440,
            top: 45_720,
            right: 91_440,
            bottom: 45_720,
        }
    }
}

/// Properties of a text body (`a:bodyPr`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyProperties {
    pub insets: Insets,
    /// Wrap lines at the box edge (`wrap="square"`)
    pub wrap: bool,
    pub anchor: VerticalAnchor,
}

impl Default for BodyProperties {
    fn default() -> Self {
        Self {
            insets: Insets::default(),
            wrap: true,
            anchor: VerticalAnchor::Top,
        }
    }
}

/// Paragraph list marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Bullet {
    /// Literal bullet character from `a:buChar`
    Char(String),
    /// Auto-number from `a:buAutoNum`; `number` is a per-text-body counter
    AutoNumber { scheme: String, number: u32 },
}

impl Bullet {
    /// Text drawn in front of the paragraph.
    pub fn marker(&self) -> String {
        match self {
            Bullet::Char(c) => format!("{c} "),
            Bullet::AutoNumber { scheme, number } => {
                let n = *number;
                let body = if scheme.starts_with("alphaLc") {
                    alpha_label(n).to_lowercase()
                } else if scheme.starts_with("alphaUc") {
                    alpha_label(n)
                } else if scheme.starts_with("romanLc") {
                    roman_label(n).to_lowercase()
                } else if scheme.starts_with("romanUc") {
                    roman_label(n)
                } else {
                    n.to_string()
                };
                if scheme.ends_with("ParenBoth") {
                    format!("({body}) ")
                } else if scheme.ends_with("ParenR") {
                    format!("{body}) ")
                } else if scheme.ends_with("Plain") {
                    format!("{body} ")
                } else {
                    format!("{body}. ")
                }
            }
        }
    }
}

fn alpha_label(mut n: u32) -> String {
    let mut label = Vec::new();
    while n > 0 {
        n -= 1;
        label.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    label.reverse();
    String::from_utf8_lossy(&label).into_owned()
}

fn roman_label(mut n: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (value, digits) in TABLE {
        while n >= value {
            out.push_str(digits);
            n -= value;
        }
    }
    out
}

/// Paragraph properties (`a:pPr`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<TextAlignment>,

    /// Left margin in EMUs (`marL`)
    #[serde(default)]
    pub margin_left: i64,

    /// First-line indent in EMUs (`indent`), may be negative
    #[serde(default)]
    pub indent: i64,

    /// Outline level (`lvl`)
    #[serde(default)]
    pub level: u8,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bullet: Option<Bullet>,

    /// Line spacing as a fraction of single spacing (`a:lnSpc/a:spcPct`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_spacing: Option<f64>,

    /// Space before, in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_before: Option<f64>,

    /// Space after, in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_after: Option<f64>,

    /// Font size of `a:endParaRPr`, used for empty paragraphs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_font_size: Option<f64>,
}

/// Run properties (`a:rPr`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunProperties {
    /// Font size in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,

    /// Latin typeface, with theme references already resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub underline: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
}

/// A run of text sharing one set of properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default)]
    pub properties: RunProperties,
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            properties: RunProperties::default(),
        }
    }
}

/// A paragraph: runs in document order plus paragraph properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphInfo {
    pub runs: Vec<TextRun>,
    #[serde(default)]
    pub properties: ParagraphProperties,
}

impl ParagraphInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Whether the paragraph carries no visible text.
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }

    /// Largest explicit run size, or the end-of-paragraph size.
    pub fn max_font_size(&self) -> Option<f64> {
        self.runs
            .iter()
            .filter_map(|r| r.properties.font_size)
            .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.max(s))))
            .or(self.properties.end_font_size)
    }
}

/// A text body: ordered paragraphs plus body properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBoxInfo {
    pub paragraphs: Vec<ParagraphInfo>,
    #[serde(default)]
    pub body_properties: BodyProperties,
    /// Default run color from the shape style (`p:style/a:fontRef`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_color: Option<Rgb>,
}

impl TextBoxInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no paragraph carries visible text.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.iter().all(ParagraphInfo::is_empty)
    }

    /// Paragraph texts joined by newlines.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(ParagraphInfo::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_text_joins_runs() {
        let mut para = ParagraphInfo::new();
        let mut first = TextRun::new("D");
        first.properties.bold = true;
        para.runs.push(first);
        para.runs.push(TextRun::new("iet & Nutrition"));
        assert_eq!(para.text(), "Diet & Nutrition");
        assert!(!para.is_empty());
    }

    #[test]
    fn test_empty_paragraph() {
        let mut para = ParagraphInfo::new();
        para.runs.push(TextRun::new("  "));
        assert!(para.is_empty());
    }

    #[test]
    fn test_bullet_markers() {
        assert_eq!(Bullet::Char("•".into()).marker(), "• ");
        let num = |scheme: &str, number| Bullet::AutoNumber {
            scheme: scheme.to_string(),
            number,
        };
        assert_eq!(num("arabicPeriod", 3).marker(), "3. ");
        assert_eq!(num("arabicParenR", 2).marker(), "2) ");
        assert_eq!(num("alphaLcPeriod", 28).marker(), "ab. ");
        assert_eq!(num("romanUcPeriod", 14).marker(), "XIV. ");
        assert_eq!(num("arabicParenBoth", 1).marker(), "(1) ");
    }

    #[test]
    fn test_max_font_size() {
        let mut para = ParagraphInfo::new();
        assert_eq!(para.max_font_size(), None);
        para.properties.end_font_size = Some(12.0);
        assert_eq!(para.max_font_size(), Some(12.0));
        let mut run = TextRun::new("x");
        run.properties.font_size = Some(20.0);
        para.runs.push(run);
        let mut run = TextRun::new("y");
        run.properties.font_size = Some(14.0);
        para.runs.push(run);
        assert_eq!(para.max_font_size(), Some(20.0));
    }

    #[test]
    fn test_alignment_attr() {
        assert_eq!(TextAlignment::from_attr("ctr"), Some(TextAlignment::Center));
        assert_eq!(TextAlignment::from_attr("zz"), None);
        assert_eq!(VerticalAnchor::from_attr("b"), Some(VerticalAnchor::Bottom));
    }
}
