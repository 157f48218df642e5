//! Package-level access to a presentation.

use super::slide::{extract_text_lines, SlideParser};
use crate::container::{resolve_path, OoxmlContainer, RelationshipKind, Relationships};
use crate::error::{Error, Result};
use crate::model::ParsedSlide;
use crate::render::{
    ArchiveImageLoader, Bitmap, FallbackMeasure, Rasterizer, RenderElement, RenderOptions, RenderTreeBuilder,
    TextMeasure,
};
use crate::theme::Theme;
use crate::units::{parse_i64, Size, DEFAULT_SLIDE_HEIGHT_EMU, DEFAULT_SLIDE_WIDTH_EMU};
use quick_xml::events::Event;
use std::path::Path;
use std::sync::Arc;

/// Main part used when the package relationships do not name one.
const DEFAULT_MAIN_PART: &str = "ppt/presentation.xml";

/// Slide entry from presentation.xml.
#[derive(Debug, Clone)]
struct SlideEntry {
    rel_id: String,
    path: String,
}

/// An opened presentation: slide list, slide size and theme.
///
/// The theme is parsed once on open and shared read-only by every slide
/// parse; [`Presentation::shared_theme`] hands it to worker threads.
#[derive(Debug)]
pub struct Presentation {
    container: OoxmlContainer,
    main_part: String,
    slides: Vec<SlideEntry>,
    slide_cx: i64,
    slide_cy: i64,
    theme: Option<Arc<Theme>>,
}

impl Presentation {
    /// Open a PPTX file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let container = OoxmlContainer::open(path)?;
        Self::from_container(container)
    }

    /// Open a PPTX held in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let container = OoxmlContainer::from_bytes(data)?;
        Self::from_container(container)
    }

    pub fn from_container(container: OoxmlContainer) -> Result<Self> {
        let main_part = container
            .read_package_relationships()?
            .first_of_kind(RelationshipKind::OfficeDocument)
            .map(|rel| resolve_path("", &rel.target))
            .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string());
        if !container.exists(&main_part) {
            return Err(Error::MissingResource(format!(
                "{main_part}: not a presentation package"
            )));
        }

        let relationships = container.read_relationships(&main_part)?;
        let xml = container.read_binary(&main_part)?;
        let listing = parse_presentation(&xml)?;

        let mut slides = Vec::with_capacity(listing.rel_ids.len());
        for rel_id in listing.rel_ids {
            match relationships.get(&rel_id) {
                Some(rel) => slides.push(SlideEntry {
                    path: resolve_path(&main_part, &rel.target),
                    rel_id,
                }),
                None => log::warn!(rel_id = rel_id.as_str(); "Slide relationship missing, skipping slide"),
            }
        }

        let theme = load_theme(&container, &relationships, &main_part).map(Arc::new);
        let (slide_cx, slide_cy) = listing
            .size
            .unwrap_or((DEFAULT_SLIDE_WIDTH_EMU, DEFAULT_SLIDE_HEIGHT_EMU));

        log::debug!(slides = slides.len(), slide_cx, slide_cy, theme = theme.is_some(); "Opened presentation");
        Ok(Self {
            container,
            main_part,
            slides,
            slide_cx,
            slide_cy,
            theme,
        })
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slide size in points.
    pub fn slide_size(&self) -> Size {
        Size::from_emu(self.slide_cx, self.slide_cy)
    }

    /// Slide size in EMUs.
    pub fn slide_size_emu(&self) -> (i64, i64) {
        (self.slide_cx, self.slide_cy)
    }

    /// Path of the main presentation part.
    pub fn main_part(&self) -> &str {
        &self.main_part
    }

    pub fn theme(&self) -> Option<&Theme> {
        self.theme.as_deref()
    }

    /// The theme behind a shared handle, for parsing on other threads.
    pub fn shared_theme(&self) -> Option<Arc<Theme>> {
        self.theme.clone()
    }

    pub fn container(&self) -> &OoxmlContainer {
        &self.container
    }

    /// Archive path of slide `index` (zero-based).
    pub fn slide_path(&self, index: usize) -> Result<&str> {
        self.slides
            .get(index)
            .map(|s| s.path.as_str())
            .ok_or_else(|| Error::MissingResource(format!("slide {} of {}", index + 1, self.slides.len())))
    }

    /// Relationship id of slide `index` in the presentation part.
    pub fn slide_relationship_id(&self, index: usize) -> Option<&str> {
        self.slides.get(index).map(|s| s.rel_id.as_str())
    }

    /// Raw XML bytes of slide `index`.
    pub fn slide_xml(&self, index: usize) -> Result<Vec<u8>> {
        self.container.read_binary(self.slide_path(index)?)
    }

    pub fn slide_relationships(&self, index: usize) -> Result<Relationships> {
        self.container.read_relationships(self.slide_path(index)?)
    }

    /// Parser configured with this presentation's theme and slide size.
    pub fn parser(&self) -> SlideParser<'_> {
        SlideParser::new(self.theme()).with_slide_size(self.slide_cx, self.slide_cy)
    }

    pub fn parse_slide(&self, index: usize) -> Result<ParsedSlide> {
        self.parser().parse_slide(&self.slide_xml(index)?)
    }

    /// Render tree of slide `index`, with text measured by glyph-width
    /// estimates.
    ///
    /// Malformed slide XML does not fail the call: the text that can still
    /// be recovered is laid out as a plain title-and-lines slide.
    pub fn render_elements(&self, index: usize) -> Result<Vec<RenderElement>> {
        self.elements(index, &FallbackMeasure)
    }

    fn elements(&self, index: usize, measure: &dyn TextMeasure) -> Result<Vec<RenderElement>> {
        let path = self.slide_path(index)?;
        let xml = self.container.read_binary(path)?;
        let relationships = self.container.read_relationships(path)?;
        let loader = ArchiveImageLoader::new(&self.container);
        let builder = RenderTreeBuilder::new()
            .with_theme(self.theme())
            .with_relationships(&relationships, path)
            .with_image_loader(&loader)
            .with_measure(measure)
            .with_slide_size(self.slide_size());

        match self.parser().parse_slide(&xml) {
            Ok(slide) => Ok(builder.build_slide(&slide)),
            Err(Error::MalformedInput(reason)) => {
                log::warn!(slide = index + 1, reason = reason.as_str(); "Rendering fallback slide");
                Ok(builder.build_fallback(&extract_text_lines(&xml)))
            }
            Err(e) => Err(e),
        }
    }

    /// Rasterize slide `index`. Text boxes are stacked with the
    /// rasterizer's own font metrics.
    pub fn render_slide(&self, index: usize, rasterizer: &Rasterizer, options: &RenderOptions) -> Result<Bitmap> {
        let elements = self.elements(index, rasterizer.font_book())?;
        rasterizer.render(&elements, self.slide_size(), options)
    }
}

/// What presentation.xml declares about the slides.
#[derive(Debug, Default)]
struct SlideListing {
    rel_ids: Vec<String>,
    size: Option<(i64, i64)>,
}

fn parse_presentation(xml: &[u8]) -> Result<SlideListing> {
    let xml = crate::container::decode_xml_bytes(xml)?;
    let mut reader = quick_xml::Reader::from_str(&xml);
    reader.config_mut().trim_text(true);

    let mut listing = SlideListing::default();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.name().local_name().as_ref() {
                b"sldId" => {
                    // The relationship id is the namespaced `r:id`
                    let rel_id = e
                        .attributes()
                        .flatten()
                        .find(|a| a.key.local_name().as_ref() == b"id" && a.key.prefix().is_some())
                        .map(|a| String::from_utf8_lossy(&a.value).into_owned());
                    if let Some(rel_id) = rel_id {
                        listing.rel_ids.push(rel_id);
                    }
                }
                b"sldSz" => {
                    let mut cx = None;
                    let mut cy = None;
                    for attr in e.attributes().flatten() {
                        let value = String::from_utf8_lossy(&attr.value);
                        match attr.key.as_ref() {
                            b"cx" => cx = parse_i64(&value),
                            b"cy" => cy = parse_i64(&value),
                            _ => {}
                        }
                    }
                    if let (Some(cx), Some(cy)) = (cx, cy) {
                        if cx > 0 && cy > 0 {
                            listing.size = Some((cx, cy));
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::MalformedInput(format!("presentation.xml: {e}"))),
            _ => {}
        }
        buf.clear();
    }
    Ok(listing)
}

/// Theme linked from the presentation part. A broken theme is logged and
/// ignored; slides then resolve colors through the fallback palette.
fn load_theme(container: &OoxmlContainer, relationships: &Relationships, main_part: &str) -> Option<Theme> {
    let rel = relationships.first_of_kind(RelationshipKind::Theme)?;
    let path = resolve_path(main_part, &rel.target);
    let parsed = container.read_binary(&path).and_then(|bytes| Theme::parse(&bytes));
    match parsed {
        Ok(theme) => Some(theme),
        Err(e) => {
            log::warn!(path = path.as_str(), error:% = e; "Ignoring unreadable theme");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#;

    const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#;

    const PRESENTATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/></p:sldIdLst>
  <p:sldSz cx="9144000" cy="6858000"/>
</p:presentation>"#;

    const PRESENTATION_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/theme1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide2.xml"/>
</Relationships>"#;

    const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Test">
  <a:themeElements><a:clrScheme name="Test">
    <a:accent1><a:srgbClr val="112233"/></a:accent1>
  </a:clrScheme></a:themeElements>
</a:theme>"#;

    const SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld><p:spTree>
    <p:sp>
      <p:nvSpPr><p:cNvPr id="2" name="Box"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>
      <p:spPr>
        <a:xfrm><a:off x="0" y="0"/><a:ext cx="914400" cy="914400"/></a:xfrm>
        <a:prstGeom prst="rect"><a:avLst/></a:prstGeom>
        <a:solidFill><a:schemeClr val="accent1"/></a:solidFill>
      </p:spPr>
    </p:sp>
  </p:spTree></p:cSld>
</p:sld>"#;

    const BROKEN_SLIDE: &str = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree><p:sp><p:txBody><a:p><a:r><a:t>Recovered</a:t></a:r></a:p><a:p><a:r><a:t>Second</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld>"#;

    fn package(slide2: &str) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (path, body) in [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", PACKAGE_RELS),
            ("ppt/presentation.xml", PRESENTATION),
            ("ppt/_rels/presentation.xml.rels", PRESENTATION_RELS),
            ("ppt/theme/theme1.xml", THEME),
            ("ppt/slides/slide1.xml", SLIDE),
            ("ppt/slides/slide2.xml", slide2),
        ] {
            writer.start_file(path, options).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_listing_and_size() {
        let presentation = Presentation::from_bytes(package(SLIDE)).unwrap();
        assert_eq!(presentation.slide_count(), 2);
        assert_eq!(presentation.slide_path(1).unwrap(), "ppt/slides/slide2.xml");
        assert_eq!(presentation.slide_size_emu(), (9_144_000, 6_858_000));
        assert!((presentation.slide_size().width - 720.0).abs() < 1e-9);
        assert!(presentation.slide_path(5).is_err());
    }

    #[test]
    fn test_theme_is_discovered() {
        let presentation = Presentation::from_bytes(package(SLIDE)).unwrap();
        let theme = presentation.theme().unwrap();
        assert_eq!(theme.name.as_deref(), Some("Test"));

        let slide = presentation.parse_slide(0).unwrap();
        let crate::model::ShapeVariant::Shape { properties, .. } = &slide.shapes[0].variant else {
            panic!("expected a shape");
        };
        assert_eq!(properties.fill, crate::model::Fill::Solid(crate::theme::Rgb::new(0x11, 0x22, 0x33)));
    }

    #[test]
    fn test_malformed_slide_falls_back() {
        let presentation = Presentation::from_bytes(package(BROKEN_SLIDE)).unwrap();
        assert!(matches!(presentation.parse_slide(1), Err(Error::MalformedInput(_))));
        let elements = presentation.render_elements(1).unwrap();
        let texts: Vec<_> = elements.iter().filter_map(RenderElement::text).collect();
        assert_eq!(texts.first().map(String::as_str), Some("Recovered"));
    }

    #[test]
    fn test_not_a_presentation() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file("word/document.xml", SimpleFileOptions::default()).unwrap();
        writer.write_all(b"<w:document/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        assert!(matches!(Presentation::from_bytes(bytes), Err(Error::MissingResource(_))));
    }
}
