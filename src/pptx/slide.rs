//! Slide XML parser.
//!
//! A depth-first walk over quick-xml events. Every open element is kept on an
//! explicit stack of [`Element`] tags, and where a value lands (shape fill,
//! outline, gradient stop, style reference, ...) is decided by the element's
//! parent on that stack. All state lives in a [`ParseState`] built per call.

use super::element::Element;
use super::placeholder::PlaceholderDefaults;
use crate::container::decode_xml_bytes;
use crate::error::{Error, Result};
use crate::model::{
    Bullet, Cell, Fill, GradientFill, GradientStop, ParagraphInfo, ParsedSlide, PictureInfo,
    PlaceholderRole, Shadow, ShapeInfo, ShapeProperties, ShapeTransform, ShapeVariant, Stroke,
    TableInfo, TextAlignment, TextBoxInfo, TextRun, VerticalAnchor,
};
use crate::theme::{self, percent_value, Rgb, SchemeSlot, Theme};
use crate::units::{
    emu_to_points, parse_i64, EmuRect, DEFAULT_SLIDE_HEIGHT_EMU, DEFAULT_SLIDE_WIDTH_EMU,
};
use quick_xml::events::{BytesStart, Event};
use std::collections::HashSet;

/// Outline width used when only a style line reference supplies the color.
const DEFAULT_LINE_WIDTH_PT: f64 = 0.75;

/// Angles are stored in 60,000ths of a degree.
const ANGLE_UNITS_PER_DEGREE: f64 = 60_000.0;

/// Parser for one slide part.
///
/// Holds only configuration; every call to [`SlideParser::parse`] builds
/// fresh state, so one parser can be reused and shared across threads.
#[derive(Debug, Clone, Copy)]
pub struct SlideParser<'t> {
    theme: Option<&'t Theme>,
    slide_cx: i64,
    slide_cy: i64,
}

impl<'t> SlideParser<'t> {
    /// Create a parser resolving scheme colors through `theme`, or through
    /// the fallback palette when `None`.
    pub fn new(theme: Option<&'t Theme>) -> Self {
        Self {
            theme,
            slide_cx: DEFAULT_SLIDE_WIDTH_EMU,
            slide_cy: DEFAULT_SLIDE_HEIGHT_EMU,
        }
    }

    /// Slide size in EMUs, used to place placeholders that have no frame.
    pub fn with_slide_size(mut self, cx: i64, cy: i64) -> Self {
        if cx > 0 && cy > 0 {
            self.slide_cx = cx;
            self.slide_cy = cy;
        }
        self
    }

    /// Parse a slide into shapes in document (z) order.
    pub fn parse(&self, xml: &[u8]) -> Result<Vec<ShapeInfo>> {
        Ok(self.parse_slide(xml)?.shapes)
    }

    /// Parse a slide into shapes plus its background.
    pub fn parse_slide(&self, xml: &[u8]) -> Result<ParsedSlide> {
        let xml = decode_xml_bytes(xml)?;
        let mut state = ParseState::new(self);

        let mut reader = quick_xml::Reader::from_str(&xml);
        // Keep whitespace inside a:t
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => state.open(e, false),
                Ok(Event::Empty(ref e)) => state.open(e, true),
                Ok(Event::Text(ref e)) => {
                    if state.in_text() {
                        let text = e
                            .unescape()
                            .map_err(|err| Error::MalformedInput(err.to_string()))?;
                        state.push_text(&text);
                    }
                }
                Ok(Event::End(_)) => state.close(),
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::MalformedInput(format!(
                        "slide XML at byte {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        state.finish()
    }
}

/// Parse a slide with default slide size.
pub fn parse_slide(xml: &[u8], theme: Option<&Theme>) -> Result<Vec<ShapeInfo>> {
    SlideParser::new(theme).parse(xml)
}

/// Best-effort text lines of a slide part, for slides the structured parser
/// rejects. Reading stops at the first XML error; what was read is kept.
pub fn extract_text_lines(xml: &[u8]) -> Vec<String> {
    let xml = match decode_xml_bytes(xml) {
        Ok(xml) => xml,
        Err(_) => String::from_utf8_lossy(xml).into_owned(),
    };
    let mut reader = quick_xml::Reader::from_str(&xml);
    reader.config_mut().trim_text(false);
    reader.config_mut().check_end_names = false;

    let mut lines = Vec::new();
    let mut line = String::new();
    let mut in_text = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                in_text = e.name().local_name().as_ref() == b"t";
            }
            Ok(Event::Text(ref e)) if in_text => {
                if let Ok(text) = e.unescape() {
                    line.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => {
                in_text = false;
                if e.name().local_name().as_ref() == b"p" && !line.trim().is_empty() {
                    lines.push(std::mem::take(&mut line).trim().to_string());
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    if !line.trim().is_empty() {
        lines.push(line.trim().to_string());
    }
    lines
}

fn attr(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name)
        .map(|a| match a.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&a.value).into_owned(),
        })
}

fn attr_i64(e: &BytesStart, name: &[u8]) -> Option<i64> {
    attr(e, name).as_deref().and_then(parse_i64)
}

fn attr_flag(e: &BytesStart, name: &[u8]) -> Option<bool> {
    attr(e, name).map(|v| matches!(v.as_str(), "1" | "true" | "on"))
}

fn attr_percent(e: &BytesStart, name: &[u8]) -> Option<f64> {
    attr(e, name).as_deref().and_then(percent_value)
}

fn resolve_typeface(theme: Option<&Theme>, typeface: &str) -> String {
    match theme {
        Some(theme) => theme.resolve_typeface(typeface).to_string(),
        None => Theme::new().resolve_typeface(typeface).to_string(),
    }
}

#[derive(Debug, Clone, Copy)]
enum ColorBase {
    Rgb(Rgb),
    Scheme(SchemeSlot),
    /// `phClr`: the color of the enclosing style reference
    StyleColor,
    Unknown,
}

/// A color element and its modifiers, resolved when the element closes.
#[derive(Debug, Clone, Copy)]
struct ColorBuilder {
    base: ColorBase,
    lum_mod: Option<f64>,
    lum_off: Option<f64>,
    alpha: Option<f64>,
}

impl ColorBuilder {
    fn from_start(element: Element, e: &BytesStart) -> Self {
        let val = attr(e, b"val");
        let base = match element {
            Element::RgbColor => val.as_deref().and_then(Rgb::from_hex).map(ColorBase::Rgb),
            Element::SchemeColor => match val.as_deref() {
                Some("phClr") => Some(ColorBase::StyleColor),
                Some(token) => SchemeSlot::from_token(token).map(ColorBase::Scheme),
                None => None,
            },
            Element::SystemColor => attr(e, b"lastClr")
                .as_deref()
                .and_then(Rgb::from_hex)
                .or_else(|| match val.as_deref() {
                    Some("window") => Some(Rgb::WHITE),
                    Some("windowText") => Some(Rgb::BLACK),
                    _ => None,
                })
                .map(ColorBase::Rgb),
            Element::PresetColor => val
                .as_deref()
                .and_then(Rgb::from_preset_name)
                .map(ColorBase::Rgb),
            _ => None,
        };
        Self {
            base: base.unwrap_or(ColorBase::Unknown),
            lum_mod: None,
            lum_off: None,
            alpha: None,
        }
    }

    fn resolve(&self, theme: Option<&Theme>, style_color: Option<Rgb>) -> Option<Rgb> {
        match self.base {
            ColorBase::Rgb(rgb) => Some(rgb.with_luminance(self.lum_mod, self.lum_off)),
            ColorBase::Scheme(slot) => Some(theme::resolve(theme, slot, self.lum_mod, self.lum_off)),
            ColorBase::StyleColor => {
                style_color.map(|rgb| rgb.with_luminance(self.lum_mod, self.lum_off))
            }
            ColorBase::Unknown => None,
        }
    }
}

/// Where a finished color goes, decided by the color element's parent.
///
/// Fill references and line references are separate targets: a color under
/// `a:lnRef` can never reach the fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorTarget {
    Fill,
    GradientStop,
    PatternForeground,
    PatternBackground,
    FillReference,
    LineReference,
    FontReference,
    BackgroundReference,
    Shadow,
    Ignored,
}

impl ColorTarget {
    fn for_parent(parent: Option<Element>) -> Self {
        match parent {
            Some(Element::SolidFill) => ColorTarget::Fill,
            Some(Element::GradientStop) => ColorTarget::GradientStop,
            Some(Element::ForegroundColor) => ColorTarget::PatternForeground,
            Some(Element::BackgroundColor) => ColorTarget::PatternBackground,
            Some(Element::FillRef) => ColorTarget::FillReference,
            Some(Element::LineRef) => ColorTarget::LineReference,
            Some(Element::FontRef) => ColorTarget::FontReference,
            Some(Element::BackgroundRef) => ColorTarget::BackgroundReference,
            Some(Element::OuterShadow) => ColorTarget::Shadow,
            _ => ColorTarget::Ignored,
        }
    }
}

/// Fill being assembled between its start and end tags.
#[derive(Debug, Clone)]
enum PendingFill {
    Solid(Option<Rgb>),
    Gradient(GradientFill),
    Pattern {
        foreground: Option<Rgb>,
        background: Option<Rgb>,
    },
}

/// `a:fillRef` / `a:lnRef` / `a:fontRef` of a shape style.
#[derive(Debug, Clone, Copy, Default)]
struct StyleRef {
    index: u32,
    color: Option<Rgb>,
}

#[derive(Debug, Default)]
struct LineBuilder {
    no_fill: bool,
    color: Option<Rgb>,
    width: Option<f64>,
}

/// Shape under construction.
#[derive(Debug)]
struct ShapeBuilder {
    element: Element,
    id: Option<u32>,
    name: String,
    description: Option<String>,
    placeholder: Option<PlaceholderRole>,
    offset: Option<(i64, i64)>,
    extent: Option<(i64, i64)>,
    child_offset: Option<(i64, i64)>,
    child_extent: Option<(i64, i64)>,
    transform: ShapeTransform,
    geometry: Option<String>,
    adjustments: Vec<(String, i64)>,
    /// Direct fill from `p:spPr`; `Some(Fill::None)` is an explicit `a:noFill`
    fill: Option<Fill>,
    line: LineBuilder,
    fill_ref: Option<StyleRef>,
    line_ref: Option<StyleRef>,
    font_ref: Option<StyleRef>,
    shadow: Option<Shadow>,
    text: Option<TextBoxInfo>,
    anchor_explicit: bool,
    table: Option<TableInfo>,
    blip: Option<String>,
    children: Vec<ShapeInfo>,
}

impl ShapeBuilder {
    fn new(element: Element) -> Self {
        Self {
            element,
            id: None,
            name: String::new(),
            description: None,
            placeholder: None,
            offset: None,
            extent: None,
            child_offset: None,
            child_extent: None,
            transform: ShapeTransform::default(),
            geometry: None,
            adjustments: Vec::new(),
            fill: None,
            line: LineBuilder::default(),
            fill_ref: None,
            line_ref: None,
            font_ref: None,
            shadow: None,
            text: None,
            anchor_explicit: false,
            table: None,
            blip: None,
            children: Vec::new(),
        }
    }

    fn explicit_frame(&self) -> Option<EmuRect> {
        match (self.offset, self.extent) {
            (None, None) => None,
            (offset, extent) => {
                let (x, y) = offset.unwrap_or((0, 0));
                let (cx, cy) = extent.unwrap_or((0, 0));
                Some(EmuRect::new(x, y, cx, cy))
            }
        }
    }

    /// Direct fill, else the style fill reference (index 0 means no fill).
    fn resolved_fill(&self) -> Fill {
        if let Some(fill) = &self.fill {
            return fill.clone();
        }
        match self.fill_ref {
            Some(StyleRef {
                index,
                color: Some(color),
            }) if index > 0 => Fill::Solid(color),
            _ => Fill::None,
        }
    }

    /// `a:ln` fill, else the style line reference.
    fn resolved_stroke(&self) -> Option<Stroke> {
        if self.line.no_fill {
            return None;
        }
        let width = self.line.width.unwrap_or(DEFAULT_LINE_WIDTH_PT);
        if let Some(color) = self.line.color {
            return Some(Stroke { color, width });
        }
        match self.line_ref {
            Some(StyleRef {
                index,
                color: Some(color),
            }) if index > 0 => Some(Stroke { color, width }),
            _ => None,
        }
    }
}

/// Child-space to parent-space mapping of a group (`a:chOff`/`a:chExt`).
#[derive(Debug, Clone, Copy)]
struct GroupMapping {
    offset: (i64, i64),
    scale: (f64, f64),
    child_offset: (i64, i64),
}

impl GroupMapping {
    fn from_builder(builder: &ShapeBuilder) -> Self {
        let offset = builder.offset.unwrap_or((0, 0));
        let extent = builder.extent.unwrap_or((0, 0));
        let child_offset = builder.child_offset.unwrap_or(offset);
        let child_extent = builder.child_extent.unwrap_or(extent);
        let ratio = |ext: i64, ch: i64| if ch != 0 { ext as f64 / ch as f64 } else { 1.0 };
        Self {
            offset,
            scale: (ratio(extent.0, child_extent.0), ratio(extent.1, child_extent.1)),
            child_offset,
        }
    }

    fn apply(&self, shape: &mut ShapeInfo) {
        let f = shape.frame;
        shape.frame = EmuRect::new(
            self.offset.0 + ((f.x - self.child_offset.0) as f64 * self.scale.0).round() as i64,
            self.offset.1 + ((f.y - self.child_offset.1) as f64 * self.scale.1).round() as i64,
            (f.cx as f64 * self.scale.0).round() as i64,
            (f.cy as f64 * self.scale.1).round() as i64,
        );
        if let ShapeVariant::Group(children) = &mut shape.variant {
            for child in children {
                self.apply(child);
            }
        }
    }
}

/// Text body under construction.
#[derive(Debug, Default)]
struct TextState {
    body: TextBoxInfo,
    anchor_explicit: bool,
    paragraph: Option<ParagraphInfo>,
    run: Option<TextRun>,
    /// Per-body auto-number counter; never reset by level or list
    auto_number: u32,
}

/// Mutable state of one parse call.
struct ParseState<'p> {
    theme: Option<&'p Theme>,
    slide_cx: i64,
    slide_cy: i64,

    stack: Vec<Element>,
    /// Depth inside a skipped subtree
    opaque_depth: usize,
    saw_root: bool,

    shapes: Vec<ShapeBuilder>,
    output: Vec<ShapeInfo>,
    background: Option<Fill>,

    color: Option<ColorBuilder>,
    fill: Option<PendingFill>,
    stop_position: Option<f64>,
    style_ref: Option<StyleRef>,
    shadow: Option<Shadow>,
    text: Option<TextState>,
    row: Option<Vec<Cell>>,
    cell: Option<Cell>,
}

impl<'p> ParseState<'p> {
    fn new(parser: &SlideParser<'p>) -> Self {
        Self {
            theme: parser.theme,
            slide_cx: parser.slide_cx,
            slide_cy: parser.slide_cy,
            stack: Vec::with_capacity(32),
            opaque_depth: 0,
            saw_root: false,
            shapes: Vec::new(),
            output: Vec::new(),
            background: None,
            color: None,
            fill: None,
            stop_position: None,
            style_ref: None,
            shadow: None,
            text: None,
            row: None,
            cell: None,
        }
    }

    /// `n`-th element from the top of the stack (0 = innermost).
    fn ancestor(&self, n: usize) -> Option<Element> {
        self.stack.iter().rev().nth(n).copied()
    }

    fn shape(&mut self) -> Option<&mut ShapeBuilder> {
        self.shapes.last_mut()
    }

    fn in_text(&self) -> bool {
        self.opaque_depth == 0 && self.stack.last() == Some(&Element::Text)
    }

    fn push_text(&mut self, text: &str) {
        if let Some(run) = self.text.as_mut().and_then(|t| t.run.as_mut()) {
            run.text.push_str(text);
        }
    }

    fn open(&mut self, e: &BytesStart, empty: bool) {
        self.saw_root = true;
        if self.opaque_depth > 0 {
            if !empty {
                self.opaque_depth += 1;
            }
            return;
        }

        let element = Element::from_local_name(e.name().local_name().as_ref());
        if element == Element::Opaque {
            log::trace!(element:? = String::from_utf8_lossy(e.name().as_ref()); "Skipping subtree");
            if !empty {
                self.opaque_depth = 1;
            }
            return;
        }

        let parent = self.stack.last().copied();
        self.stack.push(element);
        self.start(element, parent, e);
        if empty {
            self.close();
        }
    }

    fn close(&mut self) {
        if self.opaque_depth > 0 {
            self.opaque_depth -= 1;
            return;
        }
        if let Some(element) = self.stack.pop() {
            let parent = self.stack.last().copied();
            self.end(element, parent);
        }
    }

    fn start(&mut self, element: Element, parent: Option<Element>, e: &BytesStart) {
        match element {
            _ if element.is_shape() => self.shapes.push(ShapeBuilder::new(element)),
            Element::NonVisualProps => {
                if let Some(shape) = self.shape() {
                    if shape.id.is_none() {
                        shape.id = attr(e, b"id").and_then(|v| v.trim().parse().ok());
                        shape.name = attr(e, b"name").unwrap_or_default();
                        shape.description = attr(e, b"descr").filter(|d| !d.is_empty());
                    }
                }
            }
            Element::Placeholder => {
                let role = PlaceholderRole::from_attr(attr(e, b"type").as_deref());
                if let Some(shape) = self.shape() {
                    shape.placeholder = Some(role);
                }
            }
            Element::Transform
                if matches!(
                    parent,
                    Some(Element::ShapeProps | Element::GroupShapeProps | Element::GraphicFrame)
                ) =>
            {
                let rotation = attr_i64(e, b"rot").unwrap_or(0) as f64 / ANGLE_UNITS_PER_DEGREE;
                let flip_h = attr_flag(e, b"flipH").unwrap_or(false);
                let flip_v = attr_flag(e, b"flipV").unwrap_or(false);
                if let Some(shape) = self.shape() {
                    shape.transform = ShapeTransform {
                        rotation,
                        flip_h,
                        flip_v,
                    };
                }
            }
            Element::Offset | Element::ChildOffset if parent == Some(Element::Transform) => {
                let point = (attr_i64(e, b"x").unwrap_or(0), attr_i64(e, b"y").unwrap_or(0));
                if let Some(shape) = self.shape() {
                    if element == Element::Offset {
                        shape.offset = Some(point);
                    } else {
                        shape.child_offset = Some(point);
                    }
                }
            }
            Element::Extent | Element::ChildExtent if parent == Some(Element::Transform) => {
                let size = (
                    attr_i64(e, b"cx").unwrap_or(0).max(0),
                    attr_i64(e, b"cy").unwrap_or(0).max(0),
                );
                if let Some(shape) = self.shape() {
                    if element == Element::Extent {
                        shape.extent = Some(size);
                    } else {
                        shape.child_extent = Some(size);
                    }
                }
            }
            Element::PresetGeometry if parent == Some(Element::ShapeProps) => {
                if let Some(prst) = attr(e, b"prst") {
                    if let Some(shape) = self.shape() {
                        shape.geometry = Some(prst);
                    }
                }
            }
            Element::Guide if self.ancestor(2) == Some(Element::PresetGeometry) => {
                // <a:gd name="adj" fmla="val 16667"/>
                let name = attr(e, b"name").unwrap_or_default();
                let value = attr(e, b"fmla")
                    .and_then(|f| f.strip_prefix("val").and_then(parse_i64));
                if let (Some(value), Some(shape)) = (value, self.shape()) {
                    shape.adjustments.push((name, value));
                }
            }
            Element::Blip => {
                let embed = attr(e, b"embed");
                if let Some(shape) = self.shape() {
                    if shape.element == Element::Picture && shape.blip.is_none() {
                        shape.blip = embed;
                    }
                }
            }

            Element::SolidFill => self.fill = Some(PendingFill::Solid(None)),
            Element::GradientFill => {
                self.fill = Some(PendingFill::Gradient(GradientFill::default()))
            }
            Element::PatternFill => {
                self.fill = Some(PendingFill::Pattern {
                    foreground: None,
                    background: None,
                })
            }
            Element::GradientStop => {
                self.stop_position = Some(attr_percent(e, b"pos").unwrap_or(0.0).clamp(0.0, 1.0));
            }
            Element::Linear => {
                if let Some(PendingFill::Gradient(gradient)) = self.fill.as_mut() {
                    gradient.angle = attr_i64(e, b"ang").unwrap_or(0) as f64 / ANGLE_UNITS_PER_DEGREE;
                }
            }
            Element::Line if parent == Some(Element::ShapeProps) => {
                let width = attr_i64(e, b"w").map(emu_to_points);
                if let Some(shape) = self.shape() {
                    shape.line.width = width;
                }
            }
            Element::FillRef | Element::LineRef | Element::FontRef | Element::BackgroundRef => {
                let index = attr(e, b"idx")
                    .and_then(|v| v.trim().parse::<u32>().ok())
                    .unwrap_or(0);
                self.style_ref = Some(StyleRef { index, color: None });
            }
            Element::OuterShadow
                if parent == Some(Element::EffectList)
                    && self.ancestor(2) == Some(Element::ShapeProps) =>
            {
                let distance = attr_i64(e, b"dist").map(emu_to_points).unwrap_or(0.0);
                let direction = attr_i64(e, b"dir").unwrap_or(0) as f64 / ANGLE_UNITS_PER_DEGREE;
                let radians = direction.to_radians();
                self.shadow = Some(Shadow {
                    color: Rgb::BLACK,
                    alpha: 1.0,
                    dx: distance * radians.cos(),
                    dy: distance * radians.sin(),
                    blur: attr_i64(e, b"blurRad").map(emu_to_points).unwrap_or(0.0),
                });
            }
            _ if element.is_color() => self.color = Some(ColorBuilder::from_start(element, e)),
            Element::LumMod | Element::LumOff | Element::Alpha => {
                let value = attr_percent(e, b"val");
                if let Some(color) = self.color.as_mut() {
                    match element {
                        Element::LumMod => color.lum_mod = value,
                        Element::LumOff => color.lum_off = value,
                        _ => color.alpha = value,
                    }
                }
            }

            Element::TextBody if matches!(parent, Some(Element::Shape | Element::Cell)) => {
                self.text = Some(TextState::default());
            }
            Element::BodyProps if parent == Some(Element::TextBody) => self.start_body(e),
            Element::Paragraph if parent == Some(Element::TextBody) => {
                if let Some(text) = self.text.as_mut() {
                    text.paragraph = Some(ParagraphInfo::new());
                }
            }
            Element::ParagraphProps if parent == Some(Element::Paragraph) => {
                if let Some(props) = self.paragraph_props() {
                    if let Some(algn) = attr(e, b"algn") {
                        props.alignment = TextAlignment::from_attr(&algn);
                    }
                    props.margin_left = attr_i64(e, b"marL").unwrap_or(0);
                    props.indent = attr_i64(e, b"indent").unwrap_or(0);
                    props.level = attr_i64(e, b"lvl").unwrap_or(0).clamp(0, 8) as u8;
                }
            }
            Element::BulletChar if parent == Some(Element::ParagraphProps) => {
                let symbol = attr(e, b"char").unwrap_or_default();
                if let Some(props) = self.paragraph_props() {
                    props.bullet = Some(Bullet::Char(symbol));
                }
            }
            Element::BulletAutoNumber if parent == Some(Element::ParagraphProps) => {
                let scheme = attr(e, b"type").unwrap_or_else(|| "arabicPeriod".to_string());
                if let Some(text) = self.text.as_mut() {
                    text.auto_number += 1;
                    let number = text.auto_number;
                    if let Some(paragraph) = text.paragraph.as_mut() {
                        paragraph.properties.bullet = Some(Bullet::AutoNumber { scheme, number });
                    }
                }
            }
            Element::BulletNone if parent == Some(Element::ParagraphProps) => {
                if let Some(props) = self.paragraph_props() {
                    props.bullet = None;
                }
            }
            Element::SpacingPercent if parent == Some(Element::LineSpacing) => {
                let value = attr_percent(e, b"val");
                if let Some(props) = self.paragraph_props() {
                    props.line_spacing = value.filter(|v| *v > 0.0);
                }
            }
            Element::SpacingPoints => {
                let points = attr_i64(e, b"val").map(|v| v as f64 / 100.0);
                let before = parent == Some(Element::SpaceBefore);
                let after = parent == Some(Element::SpaceAfter);
                if let Some(props) = self.paragraph_props() {
                    if before {
                        props.space_before = points;
                    } else if after {
                        props.space_after = points;
                    }
                }
            }
            _ if element.is_run() && parent == Some(Element::Paragraph) => {
                if let Some(text) = self.text.as_mut() {
                    let content = if element == Element::Break { "\n" } else { "" };
                    text.run = Some(TextRun::new(content));
                }
            }
            Element::RunProps if parent.is_some_and(|p| p.is_run()) => {
                if let Some(run) = self.text.as_mut().and_then(|t| t.run.as_mut()) {
                    let props = &mut run.properties;
                    if let Some(size) = attr_i64(e, b"sz") {
                        props.font_size = Some(size as f64 / 100.0);
                    }
                    if let Some(bold) = attr_flag(e, b"b") {
                        props.bold = bold;
                    }
                    if let Some(italic) = attr_flag(e, b"i") {
                        props.italic = italic;
                    }
                    if let Some(underline) = attr(e, b"u") {
                        props.underline = underline != "none";
                    }
                }
            }
            Element::EndParagraphRunProps if parent == Some(Element::Paragraph) => {
                let size = attr_i64(e, b"sz").map(|v| v as f64 / 100.0);
                if let Some(props) = self.paragraph_props() {
                    props.end_font_size = size;
                }
            }
            Element::Latin if parent == Some(Element::RunProps) => {
                let typeface = attr(e, b"typeface")
                    .filter(|t| !t.is_empty())
                    .map(|t| resolve_typeface(self.theme, &t));
                if let Some(run) = self.text.as_mut().and_then(|t| t.run.as_mut()) {
                    if typeface.is_some() {
                        run.properties.font_family = typeface;
                    }
                }
            }

            Element::Table => {
                if let Some(shape) = self.shape() {
                    if shape.element == Element::GraphicFrame {
                        shape.table = Some(TableInfo::new());
                    }
                }
            }
            Element::TableProps => {
                let first_row = attr_flag(e, b"firstRow").unwrap_or(false);
                let band_row = attr_flag(e, b"bandRow").unwrap_or(false);
                if let Some(table) = self.table() {
                    table.first_row = first_row;
                    table.band_row = band_row;
                }
            }
            Element::GridColumn => {
                let width = attr_i64(e, b"w").unwrap_or(0).max(0);
                if let Some(table) = self.table() {
                    table.column_widths.push(width);
                }
            }
            Element::Row => {
                let height = attr_i64(e, b"h").unwrap_or(0).max(0);
                if let Some(table) = self.table() {
                    table.row_heights.push(height);
                }
                self.row = Some(Vec::new());
            }
            Element::Cell => {
                let span = |name: &[u8]| attr_i64(e, name).unwrap_or(1).max(1) as u32;
                let mut cell = Cell::new();
                cell.grid_span = span(b"gridSpan");
                cell.row_span = span(b"rowSpan");
                cell.h_merge = attr_flag(e, b"hMerge").unwrap_or(false);
                cell.v_merge = attr_flag(e, b"vMerge").unwrap_or(false);
                self.cell = Some(cell);
            }
            _ => {}
        }
    }

    fn start_body(&mut self, e: &BytesStart) {
        let Some(text) = self.text.as_mut() else {
            return;
        };
        let props = &mut text.body.body_properties;
        if let Some(v) = attr_i64(e, b"lIns") {
            props.insets.left = v;
        }
        if let Some(v) = attr_i64(e, b"tIns") {
            props.insets.top = v;
        }
        if let Some(v) = attr_i64(e, b"rIns") {
            props.insets.right = v;
        }
        if let Some(v) = attr_i64(e, b"bIns") {
            props.insets.bottom = v;
        }
        if let Some(wrap) = attr(e, b"wrap") {
            props.wrap = wrap != "none";
        }
        if let Some(anchor) = attr(e, b"anchor").as_deref().and_then(VerticalAnchor::from_attr) {
            props.anchor = anchor;
            text.anchor_explicit = true;
        }
    }

    fn paragraph_props(&mut self) -> Option<&mut crate::model::ParagraphProperties> {
        self.text
            .as_mut()
            .and_then(|t| t.paragraph.as_mut())
            .map(|p| &mut p.properties)
    }

    fn table(&mut self) -> Option<&mut TableInfo> {
        self.shapes.last_mut().and_then(|s| s.table.as_mut())
    }

    fn end(&mut self, element: Element, parent: Option<Element>) {
        match element {
            _ if element.is_shape() => {
                if let Some(builder) = self.shapes.pop() {
                    if let Some(shape) = self.finish_shape(builder) {
                        match self.shapes.last_mut() {
                            Some(group) => group.children.push(shape),
                            None => self.output.push(shape),
                        }
                    }
                }
            }
            _ if element.is_color() => {
                if let Some(color) = self.color.take() {
                    self.deliver_color(color, ColorTarget::for_parent(parent));
                }
            }
            Element::NoFill => self.deliver_fill(Fill::None),
            Element::SolidFill => {
                if let Some(PendingFill::Solid(Some(color))) = self.fill.take() {
                    self.deliver_fill(Fill::Solid(color));
                }
            }
            Element::GradientFill => {
                if let Some(PendingFill::Gradient(mut gradient)) = self.fill.take() {
                    if !gradient.stops.is_empty() {
                        gradient.sort_stops();
                        self.deliver_fill(Fill::Gradient(gradient));
                    }
                }
            }
            Element::PatternFill => {
                if let Some(PendingFill::Pattern {
                    foreground,
                    background,
                }) = self.fill.take()
                {
                    self.deliver_fill(Fill::Pattern {
                        foreground: foreground.unwrap_or(Rgb::BLACK),
                        background: background.unwrap_or(Rgb::WHITE),
                    });
                }
            }
            Element::GradientStop => self.stop_position = None,
            Element::FillRef | Element::LineRef | Element::FontRef => {
                let reference = self.style_ref.take();
                if let Some(shape) = self.shape() {
                    match element {
                        Element::FillRef => shape.fill_ref = reference,
                        Element::LineRef => shape.line_ref = reference,
                        _ => shape.font_ref = reference,
                    }
                }
            }
            Element::BackgroundRef => {
                if let Some(StyleRef {
                    color: Some(color), ..
                }) = self.style_ref.take()
                {
                    self.background = Some(Fill::Solid(color));
                }
            }
            Element::OuterShadow => {
                if let Some(shadow) = self.shadow.take() {
                    if let Some(shape) = self.shape() {
                        shape.shadow = Some(shadow);
                    }
                }
            }
            _ if element.is_run() && parent == Some(Element::Paragraph) => {
                if let Some(text) = self.text.as_mut() {
                    if let (Some(run), Some(paragraph)) = (text.run.take(), text.paragraph.as_mut()) {
                        if !run.text.is_empty() {
                            paragraph.runs.push(run);
                        }
                    }
                }
            }
            Element::Paragraph if parent == Some(Element::TextBody) => {
                if let Some(text) = self.text.as_mut() {
                    if let Some(paragraph) = text.paragraph.take() {
                        text.body.paragraphs.push(paragraph);
                    }
                }
            }
            Element::TextBody => {
                if let Some(text) = self.text.take() {
                    match parent {
                        Some(Element::Cell) => {
                            if let Some(cell) = self.cell.as_mut() {
                                cell.paragraphs = text.body.paragraphs;
                            }
                        }
                        Some(Element::Shape) => {
                            if let Some(shape) = self.shape() {
                                shape.text = Some(text.body);
                                shape.anchor_explicit = text.anchor_explicit;
                            }
                        }
                        _ => {}
                    }
                }
            }
            Element::Cell => {
                if let (Some(cell), Some(row)) = (self.cell.take(), self.row.as_mut()) {
                    row.push(cell);
                }
            }
            Element::Row => {
                if let Some(row) = self.row.take() {
                    if let Some(table) = self.table() {
                        table.rows.push(row);
                    }
                }
            }
            _ => {}
        }
    }

    /// Color of the style reference a `phClr` stands for.
    fn style_color(&self) -> Option<Rgb> {
        let shape = self.shapes.last()?;
        let in_line = self.stack.contains(&Element::Line);
        let reference = if in_line { shape.line_ref } else { shape.fill_ref };
        reference.and_then(|r| r.color)
    }

    fn deliver_color(&mut self, builder: ColorBuilder, target: ColorTarget) {
        if target == ColorTarget::Ignored {
            return;
        }
        let Some(color) = builder.resolve(self.theme, self.style_color()) else {
            log::trace!(color_target:? = target; "Unresolved color");
            return;
        };

        match target {
            ColorTarget::Fill => {
                if let Some(PendingFill::Solid(slot)) = self.fill.as_mut() {
                    *slot = Some(color);
                }
            }
            ColorTarget::GradientStop => {
                if let (Some(PendingFill::Gradient(gradient)), Some(position)) =
                    (self.fill.as_mut(), self.stop_position)
                {
                    gradient.stops.push(GradientStop { color, position });
                }
            }
            ColorTarget::PatternForeground | ColorTarget::PatternBackground => {
                if let Some(PendingFill::Pattern {
                    foreground,
                    background,
                }) = self.fill.as_mut()
                {
                    if target == ColorTarget::PatternForeground {
                        *foreground = Some(color);
                    } else {
                        *background = Some(color);
                    }
                }
            }
            ColorTarget::FillReference
            | ColorTarget::LineReference
            | ColorTarget::FontReference
            | ColorTarget::BackgroundReference => {
                if let Some(reference) = self.style_ref.as_mut() {
                    reference.color = Some(color);
                }
            }
            ColorTarget::Shadow => {
                if let Some(shadow) = self.shadow.as_mut() {
                    shadow.color = color;
                    shadow.alpha = builder.alpha.unwrap_or(1.0).clamp(0.0, 1.0);
                }
            }
            ColorTarget::Ignored => {}
        }
    }

    /// Hand a finished fill to the element that directly contains it.
    fn deliver_fill(&mut self, fill: Fill) {
        match self.ancestor(0) {
            Some(Element::ShapeProps) => {
                if let Some(shape) = self.shape() {
                    shape.fill = Some(fill);
                }
            }
            Some(Element::Line) if self.ancestor(1) == Some(Element::ShapeProps) => {
                if let Some(shape) = self.shape() {
                    match fill {
                        Fill::None => shape.line.no_fill = true,
                        Fill::Solid(color) => shape.line.color = Some(color),
                        Fill::Gradient(gradient) => {
                            shape.line.color = gradient.stops.first().map(|s| s.color)
                        }
                        Fill::Pattern { foreground, .. } => shape.line.color = Some(foreground),
                    }
                }
            }
            Some(Element::BackgroundProps) => self.background = Some(fill),
            Some(Element::CellProps) => {
                if let Some(cell) = self.cell.as_mut() {
                    cell.fill = Some(fill);
                }
            }
            Some(Element::RunProps) => {
                if let (Fill::Solid(color), Some(run)) =
                    (fill, self.text.as_mut().and_then(|t| t.run.as_mut()))
                {
                    run.properties.color = Some(color);
                }
            }
            _ => {}
        }
    }

    fn finish_shape(&self, builder: ShapeBuilder) -> Option<ShapeInfo> {
        let mapping = GroupMapping::from_builder(&builder);
        let defaults = builder
            .placeholder
            .as_ref()
            .and_then(PlaceholderDefaults::for_role);
        let frame = match (builder.explicit_frame(), defaults) {
            (Some(frame), _) => frame,
            (None, Some(d)) => d.frame_for_slide(self.slide_cx, self.slide_cy),
            (None, None) => EmuRect::default(),
        };

        let fill = builder.resolved_fill();
        let stroke = builder.resolved_stroke();
        let font_color = builder.font_ref.and_then(|r| r.color);
        let text = builder.text.map(|mut text| {
            text.font_color = font_color;
            if let Some(d) = defaults {
                apply_placeholder_text_defaults(&mut text, &d, builder.anchor_explicit);
            }
            text
        });

        let variant = match builder.element {
            Element::Picture => ShapeVariant::Picture(PictureInfo {
                relationship_id: builder.blip.unwrap_or_default(),
                frame,
                description: builder.description,
            }),
            Element::GraphicFrame => match builder.table {
                Some(mut table) => {
                    table.normalize();
                    ShapeVariant::Table(table)
                }
                None => {
                    log::debug!(id:? = builder.id; "Skipping graphic frame without a table");
                    return None;
                }
            },
            Element::GroupShape => {
                let mut children = builder.children;
                for child in &mut children {
                    mapping.apply(child);
                }
                ShapeVariant::Group(children)
            }
            _ => {
                let properties = ShapeProperties {
                    geometry: builder.geometry.unwrap_or_else(|| "rect".to_string()),
                    adjustments: builder.adjustments,
                    fill,
                    stroke,
                    shadow: builder.shadow,
                };
                if properties.is_visible() {
                    ShapeVariant::Shape {
                        properties,
                        text: text.filter(|t| !t.is_empty()),
                    }
                } else {
                    ShapeVariant::TextBox(text?)
                }
            }
        };

        Some(ShapeInfo {
            id: builder.id.unwrap_or(0),
            name: builder.name,
            frame,
            transform: builder.transform,
            placeholder: builder.placeholder,
            variant,
        })
    }

    fn finish(mut self) -> Result<ParsedSlide> {
        if !self.saw_root {
            return Err(Error::MalformedInput("document has no root element".into()));
        }
        if !self.stack.is_empty() || self.opaque_depth > 0 {
            return Err(Error::MalformedInput(format!(
                "unexpected end of document inside {:?}",
                self.stack.last()
            )));
        }

        assign_unique_ids(&mut self.output);
        log::debug!(shapes = self.output.len(), background = self.background.is_some(); "Parsed slide");
        Ok(ParsedSlide {
            background: self.background,
            shapes: self.output,
        })
    }
}

fn apply_placeholder_text_defaults(
    text: &mut TextBoxInfo,
    defaults: &PlaceholderDefaults,
    anchor_explicit: bool,
) {
    if !anchor_explicit {
        text.body_properties.anchor = defaults.anchor;
    }
    for paragraph in &mut text.paragraphs {
        if paragraph.properties.alignment.is_none() {
            paragraph.properties.alignment = Some(defaults.alignment);
        }
        for run in &mut paragraph.runs {
            if run.properties.font_size.is_none() {
                run.properties.font_size = Some(defaults.font_size);
            }
        }
    }
}

/// Give shapes with a missing or repeated id the next free one.
fn assign_unique_ids(shapes: &mut [ShapeInfo]) {
    fn collect(shapes: &[ShapeInfo], max: &mut u32) {
        for shape in shapes {
            *max = (*max).max(shape.id);
            if let ShapeVariant::Group(children) = &shape.variant {
                collect(children, max);
            }
        }
    }
    fn fix(shapes: &mut [ShapeInfo], seen: &mut HashSet<u32>, next: &mut u32) {
        for shape in shapes {
            if shape.id == 0 || !seen.insert(shape.id) {
                *next += 1;
                log::debug!(old = shape.id, new = *next; "Reassigning shape id");
                shape.id = *next;
                seen.insert(shape.id);
            }
            if let ShapeVariant::Group(children) = &mut shape.variant {
                fix(children, seen, next);
            }
        }
    }

    let mut max = 0;
    collect(shapes, &mut max);
    fix(shapes, &mut HashSet::new(), &mut max);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld><p:spTree>
    <p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
    <p:grpSpPr/>
    {body}
  </p:spTree></p:cSld>
</p:sld>"#
        )
    }

    fn parse(body: &str) -> Vec<ShapeInfo> {
        parse_slide(slide(body).as_bytes(), None).unwrap()
    }

    const STYLED_SHAPE: &str = r#"
    <p:sp>
      <p:nvSpPr><p:cNvPr id="4" name="Styled"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>
      <p:spPr>
        <a:xfrm><a:off x="0" y="0"/><a:ext cx="1270000" cy="1270000"/></a:xfrm>
        <a:prstGeom prst="ellipse"><a:avLst/></a:prstGeom>
      </p:spPr>
      <p:style>
        <a:lnRef idx="2"><a:schemeClr val="accent1"><a:shade val="50000"/></a:schemeClr></a:lnRef>
        <a:fillRef idx="1"><a:schemeClr val="accent4"/></a:fillRef>
        <a:effectRef idx="0"><a:schemeClr val="accent1"/></a:effectRef>
        <a:fontRef idx="minor"><a:schemeClr val="lt1"/></a:fontRef>
      </p:style>
    </p:sp>"#;

    #[test]
    fn test_fill_and_line_references_stay_apart() {
        let shapes = parse(STYLED_SHAPE);
        let ShapeVariant::Shape { properties, .. } = &shapes[0].variant else {
            panic!("expected a shape");
        };
        assert_eq!(properties.fill, Fill::Solid(SchemeSlot::Accent4.fallback()));
        let stroke = properties.stroke.unwrap();
        assert_eq!(stroke.color, SchemeSlot::Accent1.fallback());
        assert_ne!(stroke.color, Rgb::new(0xFF, 0xC0, 0x00));
        assert_eq!(stroke.width, DEFAULT_LINE_WIDTH_PT);
    }

    #[test]
    fn test_direct_fill_beats_style_and_no_fill_beats_all() {
        let direct = STYLED_SHAPE.replace(
            "<a:prstGeom prst=\"ellipse\"><a:avLst/></a:prstGeom>",
            "<a:prstGeom prst=\"ellipse\"><a:avLst/></a:prstGeom><a:solidFill><a:srgbClr val=\"112233\"/></a:solidFill>",
        );
        let shapes = parse(&direct);
        let ShapeVariant::Shape { properties, .. } = &shapes[0].variant else {
            panic!("expected a shape");
        };
        assert_eq!(properties.fill, Fill::Solid(Rgb::new(0x11, 0x22, 0x33)));

        let none = STYLED_SHAPE.replace(
            "<a:prstGeom prst=\"ellipse\"><a:avLst/></a:prstGeom>",
            "<a:prstGeom prst=\"ellipse\"><a:avLst/></a:prstGeom><a:noFill/><a:ln><a:noFill/></a:ln>",
        );
        let shapes = parse(&none);
        let ShapeVariant::Shape { properties, .. } = &shapes[0].variant else {
            panic!("expected a shape");
        };
        assert_eq!(properties.fill, Fill::None);
        assert!(properties.stroke.is_none());
    }

    #[test]
    fn test_gradient_stops_sorted() {
        let shapes = parse(
            r#"<p:sp>
              <p:nvSpPr><p:cNvPr id="2" name="G"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>
              <p:spPr>
                <a:xfrm><a:off x="0" y="0"/><a:ext cx="100" cy="100"/></a:xfrm>
                <a:prstGeom prst="rect"/>
                <a:gradFill><a:gsLst>
                  <a:gs pos="100000"><a:srgbClr val="0000FF"/></a:gs>
                  <a:gs pos="0"><a:schemeClr val="accent2"/></a:gs>
                  <a:gs pos="50000"><a:srgbClr val="00FF00"/></a:gs>
                </a:gsLst><a:lin ang="5400000" scaled="0"/></a:gradFill>
              </p:spPr>
            </p:sp>"#,
        );
        let ShapeVariant::Shape { properties, .. } = &shapes[0].variant else {
            panic!("expected a shape");
        };
        let Fill::Gradient(gradient) = &properties.fill else {
            panic!("expected a gradient");
        };
        assert!(gradient.is_sorted());
        let positions: Vec<f64> = gradient.stops.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0.0, 0.5, 1.0]);
        assert_eq!(gradient.stops[0].color, SchemeSlot::Accent2.fallback());
        assert_eq!(gradient.angle, 90.0);
    }

    #[test]
    fn test_runs_kept_separate_in_order() {
        let shapes = parse(
            r#"<p:sp>
              <p:nvSpPr><p:cNvPr id="2" name="T"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>
              <p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="100" cy="100"/></a:xfrm></p:spPr>
              <p:txBody><a:bodyPr/><a:p>
                <a:r><a:rPr lang="en-US" b="1"/><a:t>D</a:t></a:r>
                <a:r><a:rPr lang="en-US"/><a:t>iet &amp; Nutrition</a:t></a:r>
              </a:p></p:txBody>
            </p:sp>"#,
        );
        let ShapeVariant::TextBox(text) = &shapes[0].variant else {
            panic!("expected a text box");
        };
        let runs = &text.paragraphs[0].runs;
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "D");
        assert!(runs[0].properties.bold);
        assert_eq!(runs[1].text, "iet & Nutrition");
        assert!(!runs[1].properties.bold);
    }

    #[test]
    fn test_placeholder_defaults_without_transform() {
        let shapes = parse(
            r#"<p:sp>
              <p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="ctrTitle"/></p:nvPr></p:nvSpPr>
              <p:spPr/>
              <p:txBody><a:bodyPr/><a:p><a:r><a:t>Hello</a:t></a:r></a:p></p:txBody>
            </p:sp>
            <p:sp>
              <p:nvSpPr><p:cNvPr id="3" name="Body"/><p:cNvSpPr/><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr>
              <p:spPr/>
              <p:txBody><a:bodyPr/><a:p><a:r><a:t>Point</a:t></a:r></a:p></p:txBody>
            </p:sp>"#,
        );
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].placeholder, Some(PlaceholderRole::CenterTitle));
        assert!(!shapes[0].frame.is_empty());
        let title = shapes[0].text().unwrap();
        let body = shapes[1].text().unwrap();
        let size = |t: &TextBoxInfo| t.paragraphs[0].runs[0].properties.font_size.unwrap();
        assert!(size(title) > size(body));
        assert_eq!(
            title.paragraphs[0].properties.alignment,
            Some(TextAlignment::Center)
        );
        assert_eq!(body.paragraphs[0].properties.alignment, Some(TextAlignment::Left));
    }

    #[test]
    fn test_bullets_and_auto_numbers() {
        let shapes = parse(
            r#"<p:sp>
              <p:nvSpPr><p:cNvPr id="2" name="L"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>
              <p:spPr/>
              <p:txBody><a:bodyPr/>
                <a:p><a:pPr><a:buChar char="&#8226;"/></a:pPr><a:r><a:t>One</a:t></a:r></a:p>
                <a:p><a:pPr><a:buAutoNum type="arabicPeriod"/></a:pPr><a:r><a:t>Two</a:t></a:r></a:p>
                <a:p><a:pPr><a:buAutoNum type="arabicPeriod"/></a:pPr><a:r><a:t>Three</a:t></a:r></a:p>
              </p:txBody>
            </p:sp>"#,
        );
        let text = shapes[0].text().unwrap();
        assert_eq!(
            text.paragraphs[0].properties.bullet,
            Some(Bullet::Char("\u{2022}".into()))
        );
        assert_eq!(
            text.paragraphs[2].properties.bullet.as_ref().map(Bullet::marker),
            Some("2. ".to_string())
        );
    }

    #[test]
    fn test_table_parsing() {
        let shapes = parse(
            r#"<p:graphicFrame>
              <p:nvGraphicFramePr><p:cNvPr id="5" name="Table"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr>
              <p:xfrm><a:off x="0" y="0"/><a:ext cx="4445000" cy="1000000"/></p:xfrm>
              <a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table">
                <a:tbl>
                  <a:tblPr firstRow="1" bandRow="1"/>
                  <a:tblGrid><a:gridCol w="3000000"/><a:gridCol w="3000000"/></a:tblGrid>
                  <a:tr h="370840">
                    <a:tc gridSpan="2"><a:txBody><a:bodyPr/><a:p><a:r><a:t>Head</a:t></a:r></a:p></a:txBody><a:tcPr/></a:tc>
                    <a:tc hMerge="1"><a:txBody><a:bodyPr/><a:p><a:endParaRPr/></a:p></a:txBody><a:tcPr/></a:tc>
                  </a:tr>
                  <a:tr h="370840">
                    <a:tc><a:txBody><a:bodyPr/><a:p><a:r><a:t>A</a:t></a:r></a:p></a:txBody>
                      <a:tcPr><a:solidFill><a:srgbClr val="FF0000"/></a:solidFill></a:tcPr></a:tc>
                  </a:tr>
                </a:tbl>
              </a:graphicData></a:graphic>
            </p:graphicFrame>"#,
        );
        let ShapeVariant::Table(table) = &shapes[0].variant else {
            panic!("expected a table");
        };
        assert!(table.first_row && table.band_row);
        assert_eq!(table.column_widths, vec![3_000_000, 3_000_000]);
        assert!(table.rows.iter().all(|r| r.len() == 2));
        assert_eq!(table.rows[0][0].grid_span, 2);
        assert!(table.rows[0][1].is_merged_continuation());
        assert_eq!(table.rows[1][0].fill, Some(Fill::Solid(Rgb::new(255, 0, 0))));
        assert_eq!(table.rows[1][0].plain_text(), "A");
    }

    #[test]
    fn test_group_children_mapped_to_slide_space() {
        let shapes = parse(
            r#"<p:grpSp>
              <p:nvGrpSpPr><p:cNvPr id="10" name="Group"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
              <p:grpSpPr><a:xfrm>
                <a:off x="1000" y="2000"/><a:ext cx="200" cy="200"/>
                <a:chOff x="0" y="0"/><a:chExt cx="100" cy="100"/>
              </a:xfrm></p:grpSpPr>
              <p:sp>
                <p:nvSpPr><p:cNvPr id="11" name="Child"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>
                <p:spPr><a:xfrm><a:off x="50" y="10"/><a:ext cx="50" cy="50"/></a:xfrm>
                  <a:prstGeom prst="ellipse"/></p:spPr>
              </p:sp>
            </p:grpSp>"#,
        );
        let ShapeVariant::Group(children) = &shapes[0].variant else {
            panic!("expected a group");
        };
        assert_eq!(children[0].frame, EmuRect::new(1100, 2020, 100, 100));
    }

    #[test]
    fn test_background_and_shadow() {
        let xml = slide(
            r#"<p:sp>
              <p:nvSpPr><p:cNvPr id="2" name="S"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>
              <p:spPr>
                <a:xfrm><a:off x="0" y="0"/><a:ext cx="100" cy="100"/></a:xfrm>
                <a:prstGeom prst="rect"/><a:solidFill><a:srgbClr val="00FF00"/></a:solidFill>
                <a:effectLst><a:outerShdw blurRad="50800" dist="38100" dir="0">
                  <a:prstClr val="black"><a:alpha val="40000"/></a:prstClr>
                </a:outerShdw></a:effectLst>
              </p:spPr>
            </p:sp>"#,
        )
        .replace(
            "<p:cSld>",
            r#"<p:cSld><p:bg><p:bgPr><a:solidFill><a:schemeClr val="bg2"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
        );
        let parsed = SlideParser::new(None).parse_slide(xml.as_bytes()).unwrap();
        assert_eq!(parsed.background, Some(Fill::Solid(SchemeSlot::Lt2.fallback())));
        let ShapeVariant::Shape { properties, .. } = &parsed.shapes[0].variant else {
            panic!("expected a shape");
        };
        let shadow = properties.shadow.unwrap();
        assert!((shadow.alpha - 0.4).abs() < 1e-9);
        assert!((shadow.dx - 3.0).abs() < 1e-9);
        assert!(shadow.dy.abs() < 1e-9);
    }

    #[test]
    fn test_connectors_and_fallbacks_skipped() {
        let shapes = parse(
            r#"<p:cxnSp><p:nvCxnSpPr><p:cNvPr id="7" name="C"/></p:nvCxnSpPr>
              <p:spPr><a:xfrm><a:off x="1" y="1"/><a:ext cx="5" cy="5"/></a:xfrm><a:prstGeom prst="line"/></p:spPr></p:cxnSp>"#,
        );
        assert!(shapes.is_empty());
    }

    #[test]
    fn test_duplicate_ids_are_reassigned() {
        let shape = |id: u32| {
            format!(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="S"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>
                <p:spPr><a:prstGeom prst="ellipse"/></p:spPr></p:sp>"#
            )
        };
        let shapes = parse(&format!("{}{}", shape(3), shape(3)));
        assert_eq!(shapes.len(), 2);
        assert_ne!(shapes[0].id, shapes[1].id);
    }

    #[test]
    fn test_malformed_input() {
        let err = parse_slide(b"<p:sld><p:cSld></p:sld>", None).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
        let err = parse_slide(b"<p:sld><p:cSld>", None).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
        let err = parse_slide(b"", None).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let xml = slide(STYLED_SHAPE);
        let first = parse_slide(xml.as_bytes(), None).unwrap();
        let second = parse_slide(xml.as_bytes(), None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_extract_text_lines_is_lenient() {
        let lines = extract_text_lines(
            b"<p:sld><a:p><a:r><a:t>Title</a:t></a:r></a:p><a:p><a:r><a:t>Line one</a:t></a:r></a:p><a:p><a:r><a:t>Line",
        );
        assert_eq!(&lines[..2], ["Title", "Line one"]);
    }
}
