//! Render tree builder.
//!
//! Turns parsed shapes into render elements. Layout policy lives here:
//! paragraph stacking for text boxes, proportional table partitioning,
//! picture resolution with placeholder degradation, and the minimal
//! fallback slide used when structured parsing fails.

use super::fonts::{FallbackMeasure, TextMeasure};
use super::image::ImageLoader;
use super::text_layout::{layout_text, LINE_HEIGHT_FACTOR};
use super::tree::{
    DecodedImage, ElementContent, ImageContent, RenderElement, ShapeContent, TextContent, TextFont,
    TextParagraph, TextSpan,
};
use crate::container::{resolve_path, Relationships};
use crate::error::{Error, Result};
use crate::geometry::{rectangle, GeometryParams, PresetGeometry};
use crate::model::{
    Cell, Fill, ParagraphInfo, ParsedSlide, PictureInfo, ShapeInfo, ShapeProperties, ShapeTransform,
    ShapeVariant, Stroke, TableInfo, TextBoxInfo, TextRun, VerticalAnchor,
};
use crate::theme::{self, Rgb, SchemeSlot, Theme};
use crate::units::{emu_to_points, Rect, Size};

/// Font size used when neither run, paragraph nor placeholder sets one.
pub const DEFAULT_FONT_SIZE: f64 = 18.0;

/// Typeface used without a theme minor font.
pub const DEFAULT_FONT_FAMILY: &str = "Calibri";

/// Table cell insets in EMUs: left/right, top/bottom.
const CELL_INSET_X: i64 = 91_440;
const CELL_INSET_Y: i64 = 45_720;

const TABLE_GRID: Rgb = Rgb::new(0xBF, 0xBF, 0xBF);

const FALLBACK_MARGIN: f64 = 36.0;
const FALLBACK_TITLE_SIZE: f64 = 32.0;
const FALLBACK_LINE_SIZE: f64 = 18.0;
const FALLBACK_FIRST_LINE_Y: f64 = 100.0;
const FALLBACK_LINE_STEP: f64 = 28.0;

/// Builds render elements for one slide.
///
/// Holds borrowed collaborators only; [`build`](Self::build) produces a
/// fresh element list on every call.
pub struct RenderTreeBuilder<'a> {
    theme: Option<&'a Theme>,
    relationships: Option<&'a Relationships>,
    part_path: &'a str,
    images: Option<&'a dyn ImageLoader>,
    measure: &'a dyn TextMeasure,
    slide: Size,
}

impl Default for RenderTreeBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> RenderTreeBuilder<'a> {
    pub fn new() -> Self {
        Self {
            theme: None,
            relationships: None,
            part_path: "",
            images: None,
            measure: &FallbackMeasure,
            slide: Size::default(),
        }
    }

    pub fn with_theme(mut self, theme: Option<&'a Theme>) -> Self {
        self.theme = theme;
        self
    }

    /// Relationship table of the slide part at `part_path`; picture targets
    /// are resolved against that path.
    pub fn with_relationships(mut self, relationships: &'a Relationships, part_path: &'a str) -> Self {
        self.relationships = Some(relationships);
        self.part_path = part_path;
        self
    }

    pub fn with_image_loader(mut self, loader: &'a dyn ImageLoader) -> Self {
        self.images = Some(loader);
        self
    }

    /// Slide size in points, used for the background and the fallback slide.
    pub fn with_slide_size(mut self, slide: Size) -> Self {
        self.slide = slide;
        self
    }

    /// Text measurement for paragraph heights; pass the rasterizer's
    /// [`FontBook`](super::FontBook) so stacking matches the drawn lines.
    pub fn with_measure(mut self, measure: &'a dyn TextMeasure) -> Self {
        self.measure = measure;
        self
    }

    /// Elements for `shapes`, in drawing order.
    pub fn build(&self, shapes: &[ShapeInfo]) -> Vec<RenderElement> {
        let mut out = Vec::with_capacity(shapes.len());
        for shape in shapes {
            self.build_shape(shape, &mut out);
        }
        out
    }

    /// Elements for a whole slide: background first, then the shapes.
    pub fn build_slide(&self, slide: &ParsedSlide) -> Vec<RenderElement> {
        let mut out = Vec::with_capacity(slide.shapes.len() + 1);
        if let Some(fill) = slide.background.as_ref().filter(|f| f.is_visible()) {
            let frame = Rect::new(0.0, 0.0, self.slide.width, self.slide.height);
            out.push(RenderElement::new(
                frame,
                ElementContent::Shape(ShapeContent {
                    path: rectangle(local_bounds(&frame)),
                    fill: fill.clone(),
                    stroke: None,
                    shadow: None,
                }),
            ));
        }
        for shape in &slide.shapes {
            self.build_shape(shape, &mut out);
        }
        out
    }

    /// Minimal slide for text recovered from unparsable XML: the first line
    /// as a title, the rest stacked below at a fixed pitch.
    pub fn build_fallback(&self, lines: &[String]) -> Vec<RenderElement> {
        let width = (self.slide.width - 2.0 * FALLBACK_MARGIN).max(1.0);
        let color = self.default_text_color();
        let family = self.default_family();
        let mut out = Vec::new();
        let mut lines = lines.iter().filter(|l| !l.trim().is_empty());

        if let Some(title) = lines.next() {
            out.push(plain_text_element(
                Rect::new(FALLBACK_MARGIN, FALLBACK_MARGIN, width, FALLBACK_TITLE_SIZE * 1.5),
                title,
                TextFont {
                    family: family.clone(),
                    size: FALLBACK_TITLE_SIZE,
                    bold: true,
                    italic: false,
                    underline: false,
                },
                color,
            ));
        }
        for (i, line) in lines.enumerate() {
            let y = FALLBACK_FIRST_LINE_Y + i as f64 * FALLBACK_LINE_STEP;
            out.push(plain_text_element(
                Rect::new(FALLBACK_MARGIN, y, width, FALLBACK_LINE_STEP),
                line,
                TextFont {
                    family: family.clone(),
                    size: FALLBACK_LINE_SIZE,
                    bold: false,
                    italic: false,
                    underline: false,
                },
                color,
            ));
        }
        log::debug!(elements = out.len(); "Built fallback slide");
        out
    }

    fn build_shape(&self, shape: &ShapeInfo, out: &mut Vec<RenderElement>) {
        let frame = shape.frame.to_points();
        match &shape.variant {
            ShapeVariant::TextBox(text) => self.text_box(frame, shape.transform, text, out),
            ShapeVariant::Picture(picture) => {
                out.push(self.picture(frame, picture).with_transform(shape.transform))
            }
            ShapeVariant::Shape { properties, text } => {
                out.push(self.geometry(frame, properties).with_transform(shape.transform));
                if let Some(text) = text.as_ref().filter(|t| !t.is_empty()) {
                    out.push(self.text_overlay(frame, text).with_transform(shape.transform));
                }
            }
            ShapeVariant::Table(table) => self.table(frame, table, out),
            ShapeVariant::Group(children) => out.push(
                RenderElement::new(frame, ElementContent::Group(self.build(children)))
                    .with_transform(shape.transform),
            ),
        }
    }

    fn geometry(&self, frame: Rect, properties: &ShapeProperties) -> RenderElement {
        let bounds = local_bounds(&frame);
        let params = GeometryParams::from_adjust(properties.adjustment("adj"));
        let path = match PresetGeometry::from_keyword(&properties.geometry) {
            Ok(preset) => preset.path(bounds, &params),
            Err(e) => {
                log::warn!(error:% = e; "Falling back to a rectangle");
                rectangle(bounds)
            }
        };
        RenderElement::new(
            frame,
            ElementContent::Shape(ShapeContent {
                path,
                fill: properties.fill.clone(),
                stroke: properties.stroke,
                shadow: properties.shadow,
            }),
        )
    }

    /// Text of a geometric shape: one element sharing the shape's frame.
    fn text_overlay(&self, frame: Rect, text: &TextBoxInfo) -> RenderElement {
        let paragraphs = text
            .paragraphs
            .iter()
            .map(|p| self.paragraph(p, text.font_color, None))
            .collect();
        let insets = &text.body_properties.insets;
        RenderElement::new(
            frame,
            ElementContent::Text(TextContent {
                paragraphs,
                insets: [
                    emu_to_points(insets.left),
                    emu_to_points(insets.top),
                    emu_to_points(insets.right),
                    emu_to_points(insets.bottom),
                ],
                anchor: text.body_properties.anchor,
                wrap: text.body_properties.wrap,
            }),
        )
    }

    /// One element per non-empty paragraph, stacked top to bottom. A
    /// rotated box wraps its paragraphs in a group turning about the box
    /// center; flips never mirror text.
    fn text_box(
        &self,
        frame: Rect,
        transform: ShapeTransform,
        text: &TextBoxInfo,
        out: &mut Vec<RenderElement>,
    ) {
        let body = &text.body_properties;
        let area = frame.inset(
            emu_to_points(body.insets.left),
            emu_to_points(body.insets.top),
            emu_to_points(body.insets.right),
            emu_to_points(body.insets.bottom),
        );

        let mut blocks = Vec::new();
        let mut cursor = 0.0;
        for para in &text.paragraphs {
            cursor += para.properties.space_before.unwrap_or(0.0);
            let height = if para.is_empty() {
                let size = para.max_font_size().unwrap_or(DEFAULT_FONT_SIZE);
                size * LINE_HEIGHT_FACTOR * para.properties.line_spacing.unwrap_or(1.0)
            } else {
                let mut paragraph = self.paragraph(para, text.font_color, Some(paragraph_indent(para)));
                // Spacing is already in the block position
                paragraph.space_before = 0.0;
                paragraph.space_after = 0.0;
                let content = TextContent {
                    paragraphs: vec![paragraph],
                    insets: [0.0; 4],
                    anchor: VerticalAnchor::Top,
                    wrap: body.wrap,
                };
                let height = layout_text(&content, &area, self.measure).height;
                blocks.push((cursor, height, content));
                height
            };
            cursor += height + para.properties.space_after.unwrap_or(0.0);
        }

        let offset = match body.anchor {
            VerticalAnchor::Top => 0.0,
            VerticalAnchor::Middle => (area.height - cursor) / 2.0,
            VerticalAnchor::Bottom => area.height - cursor,
        };
        let elements = blocks.into_iter().map(|(top, height, content)| {
            RenderElement::new(
                Rect::new(area.x, area.y + offset + top, area.width, height),
                ElementContent::Text(content),
            )
        });

        if transform.rotation == 0.0 {
            out.extend(elements);
        } else {
            let rotation = ShapeTransform {
                rotation: transform.rotation,
                ..ShapeTransform::default()
            };
            let group = RenderElement::new(frame, ElementContent::Group(elements.collect()));
            out.push(group.with_transform(rotation));
        }
    }

    /// Convert a paragraph: marker first, then the runs, with adjacent runs
    /// of identical style merged into one span.
    fn paragraph(&self, para: &ParagraphInfo, font_color: Option<Rgb>, indent: Option<f64>) -> TextParagraph {
        let mut spans: Vec<TextSpan> = Vec::new();
        let fallback_size = para.max_font_size().unwrap_or(DEFAULT_FONT_SIZE);

        if let Some(bullet) = &para.properties.bullet {
            let first = para.runs.first();
            let mut span = self.span(first, fallback_size, font_color);
            span.text = bullet.marker();
            spans.push(span);
        }
        for run in para.runs.iter().filter(|r| !r.text.is_empty()) {
            let span = self.span(Some(run), fallback_size, font_color);
            match spans.last_mut() {
                Some(last) if last.font == span.font && last.color == span.color => {
                    last.text.push_str(&span.text)
                }
                _ => spans.push(span),
            }
        }

        TextParagraph {
            alignment: para.properties.alignment.unwrap_or_default(),
            spans,
            line_spacing: para.properties.line_spacing.unwrap_or(1.0),
            space_before: para.properties.space_before.unwrap_or(0.0),
            space_after: para.properties.space_after.unwrap_or(0.0),
            indent: indent.unwrap_or_else(|| paragraph_indent(para)),
        }
    }

    fn span(&self, run: Option<&TextRun>, fallback_size: f64, font_color: Option<Rgb>) -> TextSpan {
        let props = run.map(|r| &r.properties);
        let family = props
            .and_then(|p| p.font_family.as_deref())
            .map(|f| match self.theme {
                Some(theme) => theme.resolve_typeface(f).to_string(),
                None if f.starts_with('+') => DEFAULT_FONT_FAMILY.to_string(),
                None => f.to_string(),
            })
            .unwrap_or_else(|| self.default_family());
        TextSpan {
            text: run.map(|r| r.text.clone()).unwrap_or_default(),
            font: TextFont {
                family,
                size: props.and_then(|p| p.font_size).unwrap_or(fallback_size),
                bold: props.is_some_and(|p| p.bold),
                italic: props.is_some_and(|p| p.italic),
                underline: props.is_some_and(|p| p.underline),
            },
            color: props
                .and_then(|p| p.color)
                .or(font_color)
                .unwrap_or_else(|| self.default_text_color()),
        }
    }

    fn default_family(&self) -> String {
        self.theme
            .and_then(|t| t.minor_font.clone())
            .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string())
    }

    fn default_text_color(&self) -> Rgb {
        theme::resolve(self.theme, SchemeSlot::Dk1, None, None)
    }

    fn picture(&self, frame: Rect, picture: &PictureInfo) -> RenderElement {
        let content = match self.load_picture(picture) {
            Ok(image) => ImageContent::Decoded(image),
            Err(e) => {
                log::warn!(relationship = picture.relationship_id.as_str(), error:% = e; "Picture replaced by placeholder");
                ImageContent::Placeholder {
                    diagnostic: e.to_string(),
                }
            }
        };
        RenderElement::new(frame, ElementContent::Image(content))
    }

    fn load_picture(&self, picture: &PictureInfo) -> Result<DecodedImage> {
        let id = &picture.relationship_id;
        let relationship = self
            .relationships
            .and_then(|rels| rels.get(id))
            .ok_or_else(|| Error::MissingResource(format!("relationship {id} not found")))?;
        if relationship.external {
            return Err(Error::MissingResource(format!(
                "{id} links to external {}",
                relationship.target
            )));
        }
        let loader = self
            .images
            .ok_or_else(|| Error::MissingResource(format!("no image loader for {id}")))?;
        let image = loader.load(&resolve_path(self.part_path, &relationship.target))?;
        if !image.is_complete() {
            return Err(Error::MissingResource(format!("{}: truncated pixels", image.source)));
        }
        Ok(image)
    }

    /// Cell backgrounds and cell text, columns and rows partitioned
    /// proportionally across the frame.
    fn table(&self, frame: Rect, table: &TableInfo, out: &mut Vec<RenderElement>) {
        let mut table = table.clone();
        table.normalize();
        let columns = table.column_count();
        let rows = table.row_count();
        if columns == 0 || rows == 0 {
            return;
        }
        let widths = partition(&table.column_widths, frame.width, columns);
        let heights = partition(&table.row_heights, frame.height, rows);
        let xs = offsets(frame.x, &widths);
        let ys = offsets(frame.y, &heights);

        let styled = table.first_row || table.band_row;
        let border = Stroke {
            color: if styled { Rgb::WHITE } else { TABLE_GRID },
            width: 1.0,
        };

        for (r, row) in table.rows.iter().enumerate() {
            let header = table.first_row && r == 0;
            for (c, cell) in row.iter().enumerate() {
                if cell.is_merged_continuation() {
                    continue;
                }
                let span_columns = (cell.grid_span.max(1) as usize).min(columns - c);
                let span_rows = (cell.row_span.max(1) as usize).min(rows - r);
                let cell_frame = Rect::new(
                    xs[c],
                    ys[r],
                    widths[c..c + span_columns].iter().sum(),
                    heights[r..r + span_rows].iter().sum(),
                );

                let fill = cell
                    .fill
                    .clone()
                    .unwrap_or_else(|| self.table_style_fill(&table, r));
                out.push(RenderElement::new(
                    cell_frame,
                    ElementContent::Shape(ShapeContent {
                        path: rectangle(local_bounds(&cell_frame)),
                        fill,
                        stroke: Some(border),
                        shadow: None,
                    }),
                ));

                if !cell.is_empty() {
                    out.push(self.cell_text(cell_frame, cell, header));
                }
            }
        }
    }

    fn table_style_fill(&self, table: &TableInfo, row: usize) -> Fill {
        let accent = theme::resolve(self.theme, SchemeSlot::Accent1, None, None);
        if table.first_row && row == 0 {
            return Fill::Solid(accent);
        }
        if table.band_row {
            let band = row - usize::from(table.first_row);
            let t = if band % 2 == 0 { 0.6 } else { 0.8 };
            return Fill::Solid(accent.mix(Rgb::WHITE, t));
        }
        Fill::None
    }

    fn cell_text(&self, frame: Rect, cell: &Cell, header: bool) -> RenderElement {
        let paragraphs = cell
            .paragraphs
            .iter()
            .map(|p| {
                let mut paragraph = self.paragraph(p, None, None);
                if header {
                    for (span, run) in paragraph.spans.iter_mut().zip(p.runs.iter()) {
                        span.font.bold = true;
                        if run.properties.color.is_none() {
                            span.color = Rgb::WHITE;
                        }
                    }
                }
                paragraph
            })
            .collect();
        let (x, y) = (emu_to_points(CELL_INSET_X), emu_to_points(CELL_INSET_Y));
        RenderElement::new(
            frame,
            ElementContent::Text(TextContent {
                paragraphs,
                insets: [x, y, x, y],
                anchor: VerticalAnchor::Top,
                wrap: true,
            }),
        )
    }
}

fn local_bounds(frame: &Rect) -> Rect {
    Rect::new(0.0, 0.0, frame.width, frame.height)
}

fn paragraph_indent(para: &ParagraphInfo) -> f64 {
    emu_to_points((para.properties.margin_left + para.properties.indent).max(0))
}

/// Split `total` across `count` slots by weight; uniform when the weights
/// are missing or sum to zero.
fn partition(weights: &[i64], total: f64, count: usize) -> Vec<f64> {
    let weights: Vec<f64> = (0..count)
        .map(|i| weights.get(i).copied().unwrap_or(0).max(0) as f64)
        .collect();
    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 {
        return vec![total / count as f64; count];
    }
    weights.iter().map(|w| w / sum * total).collect()
}

fn offsets(start: f64, sizes: &[f64]) -> Vec<f64> {
    sizes
        .iter()
        .scan(start, |at, size| {
            let current = *at;
            *at += size;
            Some(current)
        })
        .collect()
}

fn plain_text_element(frame: Rect, text: &str, font: TextFont, color: Rgb) -> RenderElement {
    RenderElement::new(
        frame,
        ElementContent::Text(TextContent {
            paragraphs: vec![TextParagraph {
                alignment: Default::default(),
                spans: vec![TextSpan {
                    text: text.to_string(),
                    font,
                    color,
                }],
                line_spacing: 1.0,
                space_before: 0.0,
                space_after: 0.0,
                indent: 0.0,
            }],
            insets: [0.0; 4],
            anchor: VerticalAnchor::Top,
            wrap: false,
        }),
    )
}
