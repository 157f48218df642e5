//! Package access: ZIP container, relationships and part lookup.
//!
//! The renderer only needs bytes keyed by archive-relative path, so the rest
//! of the crate talks to a [`PartSource`]. [`OoxmlContainer`] implements it
//! over a ZIP archive and [`MemoryParts`] over an in-memory map.

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

/// Byte provider keyed by archive-relative part path (`ppt/media/image1.png`).
pub trait PartSource {
    /// Read a part. Absent parts fail with [`Error::MissingResource`].
    fn read_part(&self, path: &str) -> Result<Vec<u8>>;
}

/// Coarse classification of a relationship type URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipKind {
    Image,
    Hyperlink,
    Theme,
    Slide,
    SlideLayout,
    OfficeDocument,
    Other,
}

impl RelationshipKind {
    /// Classify by the last path segment of the type URI.
    pub fn from_type_uri(uri: &str) -> Self {
        match uri.rsplit('/').next().unwrap_or(uri) {
            "image" => RelationshipKind::Image,
            "hyperlink" => RelationshipKind::Hyperlink,
            "theme" => RelationshipKind::Theme,
            "slide" => RelationshipKind::Slide,
            "slideLayout" => RelationshipKind::SlideLayout,
            "officeDocument" => RelationshipKind::OfficeDocument,
            _ => RelationshipKind::Other,
        }
    }
}

/// A relationship entry from a .rels file.
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative or absolute)
    pub target: String,
    /// Whether the target is external
    pub external: bool,
}

impl Relationship {
    pub fn kind(&self) -> RelationshipKind {
        RelationshipKind::from_type_uri(&self.rel_type)
    }
}

/// Collection of relationships parsed from a .rels file.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    /// Map from relationship ID to relationship data
    pub by_id: HashMap<String, Relationship>,
    /// Map from relationship type to list of relationships
    pub by_type: HashMap<String, Vec<Relationship>>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the content of a `.rels` part.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let content = decode_xml_bytes(xml)?;
        let mut rels = Relationships::new();
        if content.trim().is_empty() {
            return Ok(rels);
        }

        let mut reader = quick_xml::Reader::from_str(&content);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Empty(e))
                | Ok(quick_xml::events::Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let mut id = String::new();
                    let mut rel_type = String::new();
                    let mut target = String::new();
                    let mut external = false;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                            b"Type" => rel_type = String::from_utf8_lossy(&attr.value).to_string(),
                            b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                            b"TargetMode" => {
                                external = String::from_utf8_lossy(&attr.value).to_lowercase()
                                    == "external"
                            }
                            _ => {}
                        }
                    }

                    if !id.is_empty() {
                        rels.add(Relationship {
                            id,
                            rel_type,
                            target,
                            external,
                        });
                    }
                }
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::MalformedInput(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Get a relationship by ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id)
    }

    /// First relationship of the given kind.
    pub fn first_of_kind(&self, kind: RelationshipKind) -> Option<&Relationship> {
        let mut matches: Vec<&Relationship> =
            self.by_id.values().filter(|r| r.kind() == kind).collect();
        matches.sort_by(|a, b| natural_id_order(&a.id, &b.id));
        matches.into_iter().next()
    }

    /// Add a relationship.
    pub fn add(&mut self, rel: Relationship) {
        self.by_type
            .entry(rel.rel_type.clone())
            .or_default()
            .push(rel.clone());
        self.by_id.insert(rel.id.clone(), rel);
    }
}

/// Order `rId2` before `rId10`.
fn natural_id_order(a: &str, b: &str) -> std::cmp::Ordering {
    let number = |s: &str| {
        s.trim_start_matches(|c: char| !c.is_ascii_digit())
            .parse::<u64>()
            .unwrap_or(u64::MAX)
    };
    number(a).cmp(&number(b)).then_with(|| a.cmp(b))
}

/// Path of the `.rels` part belonging to `part_path`.
///
/// `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`
pub fn relationships_path(part_path: &str) -> String {
    if part_path.is_empty() || part_path == "/" {
        return "_rels/.rels".to_string();
    }
    match part_path.rfind('/') {
        Some(last_slash) => {
            let dir = &part_path[..last_slash];
            let file = &part_path[last_slash + 1..];
            format!("{}/_rels/{}.rels", dir, file)
        }
        None => format!("_rels/{}.rels", part_path),
    }
}

/// Fix XML encoding declaration from UTF-16 to UTF-8.
///
/// When we decode UTF-16 XML to a Rust String (UTF-8), the XML declaration
/// still says encoding="UTF-16". This causes quick-xml to fail when it tries
/// to re-interpret the already-decoded UTF-8 string as UTF-16.
fn fix_xml_encoding_declaration(content: &str) -> String {
    if content.starts_with("<?xml") {
        if let Some(end_decl) = content.find("?>") {
            let decl = &content[..end_decl + 2];
            let rest = &content[end_decl + 2..];

            let fixed_decl = decl
                .replace("encoding=\"UTF-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='UTF-16'", "encoding='UTF-8'")
                .replace("encoding=\"utf-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='utf-16'", "encoding='UTF-8'");

            return format!("{}{}", fixed_decl, rest);
        }
    }
    content.to_string()
}

/// Decode XML bytes handling different encodings (UTF-8, UTF-16 LE/BE).
///
/// Parts are normally UTF-8, but some producers write UTF-16.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    // UTF-8 BOM: EF BB BF
    if bytes.len() >= 3 && bytes[0] == 0xEF && bytes[1] == 0xBB && bytes[2] == 0xBF {
        return String::from_utf8(bytes[3..].to_vec())
            .map_err(|e| Error::MalformedInput(e.to_string()));
    }

    // UTF-16 LE BOM: FF FE
    if bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] == 0xFE {
        let content = decode_utf16(&bytes[2..], u16::from_le_bytes)?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    // UTF-16 BE BOM: FE FF
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let content = decode_utf16(&bytes[2..], u16::from_be_bytes)?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => Ok(s),
        Err(_) => {
            // UTF-16 without BOM has a zero byte next to every ASCII byte
            if bytes.len() >= 4 && bytes[1] == 0 && bytes[3] == 0 {
                decode_utf16(bytes, u16::from_le_bytes)
            } else if bytes.len() >= 4 && bytes[0] == 0 && bytes[2] == 0 {
                decode_utf16(bytes, u16::from_be_bytes)
            } else {
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String> {
    let len = bytes.len() & !1;
    let units = (0..len).step_by(2).map(|i| unit([bytes[i], bytes[i + 1]]));

    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::MalformedInput(e.to_string()))
}

/// Resolve a relationship target relative to the part that owns it.
///
/// `("ppt/slides/slide1.xml", "../media/image1.png")` -> `ppt/media/image1.png`
pub fn resolve_path(base: &str, relative: &str) -> String {
    if let Some(stripped) = relative.strip_prefix('/') {
        return stripped.to_string();
    }

    let base_path = Path::new(base);
    let base_dir = base_path.parent().unwrap_or(Path::new(""));

    let mut result = base_dir.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            std::path::Component::ParentDir => {
                result.pop();
            }
            std::path::Component::Normal(c) => {
                result.push(c);
            }
            _ => {}
        }
    }

    result.to_string_lossy().replace('\\', "/")
}

/// OOXML container abstraction over a ZIP archive.
pub struct OoxmlContainer {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl OoxmlContainer {
    /// Open an OOXML container from a file path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use unslide::container::OoxmlContainer;
    ///
    /// let container = OoxmlContainer::open("deck.pptx")?;
    /// # Ok::<(), unslide::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Create an OOXML container from a byte vector.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let cursor = Cursor::new(data);
        let archive = zip::ZipArchive::new(cursor)?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Read an XML part as a string, decoding UTF-8 or UTF-16.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        let bytes = self.read_binary(path)?;
        decode_xml_bytes(&bytes)
    }

    /// Read a binary part from the archive.
    pub fn read_binary(&self, path: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(path)
            .map_err(|_| Error::MissingResource(path.to_string()))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Check if a part exists in the archive.
    pub fn exists(&self, path: &str) -> bool {
        let archive = self.archive.borrow();
        let result = archive.file_names().any(|n| n == path);
        result
    }

    /// List all parts in the archive.
    pub fn list_files(&self) -> Vec<String> {
        let archive = self.archive.borrow();
        archive.file_names().map(String::from).collect()
    }

    /// Read the relationships of a part. A part without a `.rels` file has
    /// no relationships.
    pub fn read_relationships(&self, part_path: &str) -> Result<Relationships> {
        match self.read_binary(&relationships_path(part_path)) {
            Ok(bytes) => Relationships::parse(&bytes),
            Err(Error::MissingResource(_)) => Ok(Relationships::new()),
            Err(e) => Err(e),
        }
    }

    /// Read package-level relationships (_rels/.rels).
    pub fn read_package_relationships(&self) -> Result<Relationships> {
        self.read_relationships("")
    }
}

impl PartSource for OoxmlContainer {
    fn read_part(&self, path: &str) -> Result<Vec<u8>> {
        self.read_binary(path)
    }
}

impl std::fmt::Debug for OoxmlContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OoxmlContainer")
            .field("files", &self.list_files().len())
            .finish()
    }
}

/// In-memory [`PartSource`], handy for tests and for callers that already
/// hold decompressed parts.
#[derive(Debug, Clone, Default)]
pub struct MemoryParts {
    parts: HashMap<String, Vec<u8>>,
}

impl MemoryParts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a part.
    pub fn insert(&mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.parts.insert(path.into(), data.into());
    }

    pub fn with_part(mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(path, data);
        self
    }
}

impl PartSource for MemoryParts {
    fn read_part(&self, path: &str) -> Result<Vec<u8>> {
        self.parts
            .get(path)
            .cloned()
            .ok_or_else(|| Error::MissingResource(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_resolve_path() {
        assert_eq!(
            resolve_path("ppt/slides/slide1.xml", "../media/image1.png"),
            "ppt/media/image1.png"
        );
        assert_eq!(
            resolve_path("ppt/presentation.xml", "slides/slide1.xml"),
            "ppt/slides/slide1.xml"
        );
        assert_eq!(
            resolve_path("ppt/slides/slide1.xml", "/ppt/media/image1.png"),
            "ppt/media/image1.png"
        );
    }

    #[test]
    fn test_relationships_path() {
        assert_eq!(
            relationships_path("ppt/slides/slide1.xml"),
            "ppt/slides/_rels/slide1.xml.rels"
        );
        assert_eq!(relationships_path(""), "_rels/.rels");
        assert_eq!(relationships_path("doc.xml"), "_rels/doc.xml.rels");
    }

    #[test]
    fn test_parse_relationships() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png"/>
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>
</Relationships>"#;
        let rels = Relationships::parse(xml).unwrap();
        assert_eq!(rels.by_id.len(), 3);
        assert_eq!(rels.get("rId2").unwrap().kind(), RelationshipKind::Image);
        assert!(rels.get("rId3").unwrap().external);
        assert_eq!(
            rels.first_of_kind(RelationshipKind::SlideLayout).unwrap().id,
            "rId1"
        );
    }

    #[test]
    fn test_natural_id_order() {
        let mut ids = vec!["rId10", "rId2", "rId1"];
        ids.sort_by(|a, b| natural_id_order(a, b));
        assert_eq!(ids, vec!["rId1", "rId2", "rId10"]);
    }

    #[test]
    fn test_utf16_decoding_function() {
        let utf16_le = b"\xFF\xFE<\0?\0x\0m\0l\0>\0";
        assert_eq!(decode_xml_bytes(utf16_le).unwrap(), "<?xml>");

        let utf16_be = b"\xFE\xFF\0<\0?\0x\0m\0l\0>";
        assert_eq!(decode_xml_bytes(utf16_be).unwrap(), "<?xml>");

        let utf8_bom = b"\xEF\xBB\xBF<?xml>";
        assert_eq!(decode_xml_bytes(utf8_bom).unwrap(), "<?xml>");

        assert_eq!(decode_xml_bytes(b"<?xml>").unwrap(), "<?xml>");
    }

    #[test]
    fn test_memory_parts() {
        let parts = MemoryParts::new().with_part("ppt/media/a.png", vec![1, 2, 3]);
        assert_eq!(parts.read_part("ppt/media/a.png").unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            parts.read_part("ppt/media/b.png"),
            Err(Error::MissingResource(_))
        ));
    }

    #[test]
    fn test_container_from_zip_bytes() {
        let mut buffer = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buffer));
            let options = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            zip.start_file("ppt/slides/slide1.xml", options).unwrap();
            zip.write_all(b"<p:sld/>").unwrap();
            zip.finish().unwrap();
        }

        let container = OoxmlContainer::from_bytes(buffer).unwrap();
        assert!(container.exists("ppt/slides/slide1.xml"));
        assert_eq!(container.read_xml("ppt/slides/slide1.xml").unwrap(), "<p:sld/>");
        assert!(matches!(
            container.read_part("ppt/media/missing.png"),
            Err(Error::MissingResource(_))
        ));
        let rels = container.read_relationships("ppt/slides/slide1.xml").unwrap();
        assert!(rels.by_id.is_empty());
    }
}
