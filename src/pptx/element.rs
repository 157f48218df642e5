//! Closed set of slide XML elements the parser reacts to.

/// An element decoded once from its local name.
///
/// Namespace prefixes are ignored: `p:txBody` and `a:txBody` are both
/// [`Element::TextBody`]. Elements the parser does not care about decode to
/// [`Element::Other`] and only occupy a slot on the context stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Element {
    // Slide structure
    Slide,
    Background,
    BackgroundProps,
    BackgroundRef,
    ShapeTree,
    GroupShape,
    Shape,
    Picture,
    GraphicFrame,
    NonVisualProps,
    Placeholder,

    // Shape properties
    ShapeProps,
    GroupShapeProps,
    Transform,
    Offset,
    Extent,
    ChildOffset,
    ChildExtent,
    PresetGeometry,
    Guide,
    Blip,

    // Fills and lines
    NoFill,
    SolidFill,
    GradientFill,
    GradientStop,
    Linear,
    PatternFill,
    ForegroundColor,
    BackgroundColor,
    Line,

    // Shape style references
    FillRef,
    LineRef,
    FontRef,

    // Effects
    EffectList,
    OuterShadow,

    // Colors and modifiers
    RgbColor,
    SchemeColor,
    SystemColor,
    PresetColor,
    LumMod,
    LumOff,
    Alpha,

    // Text
    TextBody,
    BodyProps,
    Paragraph,
    ParagraphProps,
    Run,
    Field,
    Break,
    RunProps,
    EndParagraphRunProps,
    Text,
    Latin,
    BulletChar,
    BulletAutoNumber,
    BulletNone,
    LineSpacing,
    SpaceBefore,
    SpaceAfter,
    SpacingPercent,
    SpacingPoints,

    // Tables
    Table,
    TableProps,
    GridColumn,
    Row,
    Cell,
    CellProps,

    /// Subtrees skipped entirely (connectors, fallbacks, list styles, extensions)
    Opaque,
    Other,
}

impl Element {
    /// Decode a local element name.
    pub(crate) fn from_local_name(name: &[u8]) -> Self {
        match name {
            b"sld" | b"sldLayout" | b"sldMaster" => Element::Slide,
            b"bg" => Element::Background,
            b"bgPr" => Element::BackgroundProps,
            b"bgRef" => Element::BackgroundRef,
            b"spTree" => Element::ShapeTree,
            b"grpSp" => Element::GroupShape,
            b"sp" => Element::Shape,
            b"pic" => Element::Picture,
            b"graphicFrame" => Element::GraphicFrame,
            b"cNvPr" => Element::NonVisualProps,
            b"ph" => Element::Placeholder,

            b"spPr" => Element::ShapeProps,
            b"grpSpPr" => Element::GroupShapeProps,
            b"xfrm" => Element::Transform,
            b"off" => Element::Offset,
            b"ext" => Element::Extent,
            b"chOff" => Element::ChildOffset,
            b"chExt" => Element::ChildExtent,
            b"prstGeom" => Element::PresetGeometry,
            b"gd" => Element::Guide,
            b"blip" => Element::Blip,

            b"noFill" => Element::NoFill,
            b"solidFill" => Element::SolidFill,
            b"gradFill" => Element::GradientFill,
            b"gs" => Element::GradientStop,
            b"lin" => Element::Linear,
            b"pattFill" => Element::PatternFill,
            b"fgClr" => Element::ForegroundColor,
            b"bgClr" => Element::BackgroundColor,
            b"ln" => Element::Line,

            b"fillRef" => Element::FillRef,
            b"lnRef" => Element::LineRef,
            b"fontRef" => Element::FontRef,

            b"effectLst" => Element::EffectList,
            b"outerShdw" => Element::OuterShadow,

            b"srgbClr" => Element::RgbColor,
            b"schemeClr" => Element::SchemeColor,
            b"sysClr" => Element::SystemColor,
            b"prstClr" => Element::PresetColor,
            b"lumMod" => Element::LumMod,
            b"lumOff" => Element::LumOff,
            b"alpha" => Element::Alpha,

            b"txBody" => Element::TextBody,
            b"bodyPr" => Element::BodyProps,
            b"p" => Element::Paragraph,
            b"pPr" => Element::ParagraphProps,
            b"r" => Element::Run,
            b"fld" => Element::Field,
            b"br" => Element::Break,
            b"rPr" => Element::RunProps,
            b"endParaRPr" => Element::EndParagraphRunProps,
            b"t" => Element::Text,
            b"latin" => Element::Latin,
            b"buChar" => Element::BulletChar,
            b"buAutoNum" => Element::BulletAutoNumber,
            b"buNone" => Element::BulletNone,
            b"lnSpc" => Element::LineSpacing,
            b"spcBef" => Element::SpaceBefore,
            b"spcAft" => Element::SpaceAfter,
            b"spcPct" => Element::SpacingPercent,
            b"spcPts" => Element::SpacingPoints,

            b"tbl" => Element::Table,
            b"tblPr" => Element::TableProps,
            b"gridCol" => Element::GridColumn,
            b"tr" => Element::Row,
            b"tc" => Element::Cell,
            b"tcPr" => Element::CellProps,

            b"cxnSp" | b"Fallback" | b"extLst" | b"lstStyle" | b"contentPart" => Element::Opaque,
            _ => Element::Other,
        }
    }

    /// Elements that own a shape builder.
    pub(crate) fn is_shape(&self) -> bool {
        matches!(
            self,
            Element::GroupShape | Element::Shape | Element::Picture | Element::GraphicFrame
        )
    }

    /// Color elements (`a:srgbClr`, `a:schemeClr`, ...).
    pub(crate) fn is_color(&self) -> bool {
        matches!(
            self,
            Element::RgbColor | Element::SchemeColor | Element::SystemColor | Element::PresetColor
        )
    }

    /// Elements that start a new text run.
    pub(crate) fn is_run(&self) -> bool {
        matches!(self, Element::Run | Element::Field | Element::Break)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_local_names() {
        assert_eq!(Element::from_local_name(b"sp"), Element::Shape);
        assert_eq!(Element::from_local_name(b"fillRef"), Element::FillRef);
        assert_eq!(Element::from_local_name(b"lnRef"), Element::LineRef);
        assert_ne!(
            Element::from_local_name(b"fillRef"),
            Element::from_local_name(b"lnRef")
        );
        assert_eq!(Element::from_local_name(b"cxnSp"), Element::Opaque);
        assert_eq!(Element::from_local_name(b"sldNum"), Element::Other);
    }

    #[test]
    fn test_classification() {
        assert!(Element::GroupShape.is_shape());
        assert!(!Element::ShapeTree.is_shape());
        assert!(Element::SchemeColor.is_color());
        assert!(Element::Break.is_run());
    }
}
