//! Line breaking and alignment of text elements.
//!
//! Layout is greedy: words are appended to the current line until the next
//! one would overflow the content box. Positions come out in slide points,
//! ready for the rasterizer.

use super::fonts::TextMeasure;
use super::tree::{TextContent, TextFont, TextParagraph};
use crate::model::{TextAlignment, VerticalAnchor};
use crate::theme::Rgb;
use crate::units::Rect;

/// Line height as a multiple of the largest font size on the line.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// A run of text placed on a line.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedFragment {
    pub text: String,
    pub font: TextFont,
    pub color: Rgb,
    /// Left edge in slide points
    pub x: f64,
    pub width: f64,
}

/// One laid-out line.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutLine {
    /// Baseline in slide points
    pub baseline: f64,
    pub height: f64,
    pub fragments: Vec<PlacedFragment>,
}

impl LaidOutLine {
    pub fn text(&self) -> String {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }
}

/// Laid-out text of one element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLayout {
    pub lines: Vec<LaidOutLine>,
    /// Total height including paragraph spacing
    pub height: f64,
}

/// A word or whitespace run that belongs to one span.
struct Piece<'a> {
    text: &'a str,
    span: usize,
    width: f64,
    forced_break: bool,
}

#[derive(Default)]
struct LineBuilder<'a> {
    pieces: Vec<Piece<'a>>,
    width: f64,
}

impl<'a> LineBuilder<'a> {
    fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    fn push(&mut self, piece: Piece<'a>) {
        self.width += piece.width;
        self.pieces.push(piece);
    }

    /// Width without trailing whitespace.
    fn visible_width(&self) -> f64 {
        let trailing: f64 = self
            .pieces
            .iter()
            .rev()
            .take_while(|p| p.text.trim().is_empty())
            .map(|p| p.width)
            .sum();
        self.width - trailing
    }
}

/// Lay out `content` inside `frame`.
pub fn layout_text(content: &TextContent, frame: &Rect, fonts: &dyn TextMeasure) -> TextLayout {
    let area = content.content_box(frame);
    let mut lines = Vec::new();
    let mut cursor = 0.0;

    for paragraph in &content.paragraphs {
        cursor += paragraph.space_before;
        for mut line in layout_paragraph(paragraph, &area, content.wrap, fonts) {
            line.baseline += area.y + cursor;
            cursor += line.height;
            lines.push(line);
        }
        cursor += paragraph.space_after;
    }

    let offset = match content.anchor {
        VerticalAnchor::Top => 0.0,
        VerticalAnchor::Middle => (area.height - cursor) / 2.0,
        VerticalAnchor::Bottom => area.height - cursor,
    };
    if offset != 0.0 {
        for line in &mut lines {
            line.baseline += offset;
        }
    }

    TextLayout {
        lines,
        height: cursor,
    }
}

/// Lines of one paragraph; baselines are relative to the paragraph top.
fn layout_paragraph(
    paragraph: &TextParagraph,
    area: &Rect,
    wrap: bool,
    fonts: &dyn TextMeasure,
) -> Vec<LaidOutLine> {
    let available = (area.width - paragraph.indent).max(0.0);
    let spacing = if paragraph.line_spacing > 0.0 {
        paragraph.line_spacing
    } else {
        1.0
    };
    let fallback_size = paragraph.max_font_size(18.0);

    let mut built: Vec<LineBuilder<'_>> = Vec::new();
    let mut current = LineBuilder::default();
    for piece in split_pieces(paragraph, fonts) {
        if piece.forced_break {
            built.push(std::mem::take(&mut current));
            continue;
        }
        let is_space = piece.text.trim().is_empty();
        if wrap && !current.is_empty() && !is_space && current.width + piece.width > available {
            built.push(std::mem::take(&mut current));
        }
        if current.is_empty() && is_space && !built.is_empty() {
            // Whitespace that caused a soft break is dropped
            continue;
        }
        current.push(piece);
    }
    built.push(current);

    let mut top = 0.0;
    built
        .into_iter()
        .map(|line| {
            let max_size = line
                .pieces
                .iter()
                .map(|p| paragraph.spans[p.span].font.size)
                .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.max(s))))
                .unwrap_or(fallback_size);
            let height = max_size * LINE_HEIGHT_FACTOR * spacing;
            let visible = line.visible_width();
            let shift = match paragraph.alignment {
                TextAlignment::Center => (available - visible) / 2.0,
                TextAlignment::Right => available - visible,
                TextAlignment::Left | TextAlignment::Justify => 0.0,
            };
            let fragments = place_fragments(paragraph, &line, area.x + paragraph.indent + shift);
            let laid = LaidOutLine {
                baseline: top + max_size,
                height,
                fragments,
            };
            top += height;
            laid
        })
        .collect()
}

/// Split every span into words and whitespace runs, measuring each.
fn split_pieces<'p>(paragraph: &'p TextParagraph, fonts: &dyn TextMeasure) -> Vec<Piece<'p>> {
    let mut pieces = Vec::new();
    for (index, span) in paragraph.spans.iter().enumerate() {
        for (n, segment) in span.text.split('\n').enumerate() {
            if n > 0 {
                pieces.push(Piece {
                    text: "",
                    span: index,
                    width: 0.0,
                    forced_break: true,
                });
            }
            for word in split_words(segment) {
                pieces.push(Piece {
                    text: word,
                    span: index,
                    width: fonts.measure(word, &span.font),
                    forced_break: false,
                });
            }
        }
    }
    pieces
}

/// Alternating runs of non-whitespace and whitespace.
fn split_words(text: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = 0;
    let mut in_space = None;
    for (i, c) in text.char_indices() {
        let space = c.is_whitespace();
        if in_space.is_some_and(|s| s != space) {
            words.push(&text[start..i]);
            start = i;
        }
        in_space = Some(space);
    }
    if start < text.len() {
        words.push(&text[start..]);
    }
    words
}

/// Merge consecutive pieces of the same span into fragments.
fn place_fragments(paragraph: &TextParagraph, line: &LineBuilder<'_>, mut x: f64) -> Vec<PlacedFragment> {
    let mut fragments: Vec<(usize, PlacedFragment)> = Vec::new();
    for piece in &line.pieces {
        match fragments.last_mut() {
            Some((span, fragment)) if *span == piece.span => {
                fragment.text.push_str(piece.text);
                fragment.width += piece.width;
            }
            _ => {
                let span = &paragraph.spans[piece.span];
                fragments.push((
                    piece.span,
                    PlacedFragment {
                        text: piece.text.to_string(),
                        font: span.font.clone(),
                        color: span.color,
                        x,
                        width: piece.width,
                    },
                ));
            }
        }
        x += piece.width;
    }
    fragments.into_iter().map(|(_, f)| f).collect()
}
