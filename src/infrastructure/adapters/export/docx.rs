//! DOCX 生成
//!
//! 手工拼装最小的 WordprocessingML 包：
//! [Content_Types].xml、_rels/.rels、docProps/core.xml、word/document.xml、word/styles.xml

use std::borrow::Cow;
use std::io::{Cursor, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::application::ports::ExportError;
use crate::domain::manuscript::{Manuscript, Span};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// 正文字体
pub const BODY_FONT: &str = "Merriweather";
/// 正文字号（半磅，24 = 12pt）
pub const BODY_SIZE_HALF_POINTS: &str = "24";
/// 标题段后间距（twip）
const TITLE_SPACING_AFTER: &str = "400";
/// 段后间距（twip）
const PARAGRAPH_SPACING_AFTER: &str = "240";
/// 行距（240 = 单倍，360 = 1.5 倍）
const PARAGRAPH_LINE: &str = "360";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

/// 生成 DOCX 文件内容
pub fn build_docx(title: &str, manuscript: &Manuscript) -> Result<Vec<u8>, ExportError> {
    let parts: [(&str, Vec<u8>); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes().to_vec()),
        ("_rels/.rels", PACKAGE_RELS.as_bytes().to_vec()),
        ("docProps/core.xml", core_properties_xml(title)?),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS.as_bytes().to_vec()),
        ("word/styles.xml", styles_xml()?),
        ("word/document.xml", document_xml(title, manuscript)?),
    ];

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, data) in parts {
        zip.start_file(name, options).map_err(zip_error)?;
        zip.write_all(&data)?;
    }

    let cursor = zip.finish().map_err(zip_error)?;
    Ok(cursor.into_inner())
}

fn zip_error(e: zip::result::ZipError) -> ExportError {
    ExportError::Document(e.to_string())
}

/// quick-xml Writer 的简单封装
struct XmlBuilder {
    writer: Writer<Vec<u8>>,
}

impl XmlBuilder {
    fn new() -> Result<Self, ExportError> {
        let mut builder = Self {
            writer: Writer::new(Vec::new()),
        };
        builder.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(builder)
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), ExportError> {
        self.writer
            .write_event(event)
            .map_err(|e| ExportError::Document(e.to_string()))
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), ExportError> {
        let tag = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Start(tag))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), ExportError> {
        let tag = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Empty(tag))
    }

    fn text(&mut self, text: &str) -> Result<(), ExportError> {
        let text = xml_safe(text);
        self.event(Event::Text(BytesText::new(&text)))
    }

    fn end(&mut self, name: &str) -> Result<(), ExportError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

/// 去掉 XML 1.0 不允许出现的字符
fn xml_safe(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|c| is_xml_char(*c)).collect())
    }
}

fn core_properties_xml(title: &str) -> Result<Vec<u8>, ExportError> {
    let mut xml = XmlBuilder::new()?;
    xml.start(
        "cp:coreProperties",
        &[
            (
                "xmlns:cp",
                "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
            ),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
        ],
    )?;
    xml.start("dc:title", &[])?;
    xml.text(title)?;
    xml.end("dc:title")?;
    xml.end("cp:coreProperties")?;
    Ok(xml.finish())
}

fn styles_xml() -> Result<Vec<u8>, ExportError> {
    let mut xml = XmlBuilder::new()?;
    xml.start("w:styles", &[("xmlns:w", W_NS)])?;

    // 默认字体
    xml.start("w:docDefaults", &[])?;
    xml.start("w:rPrDefault", &[])?;
    xml.start("w:rPr", &[])?;
    write_font(&mut xml, BODY_FONT, BODY_SIZE_HALF_POINTS)?;
    xml.end("w:rPr")?;
    xml.end("w:rPrDefault")?;
    xml.end("w:docDefaults")?;

    xml.start("w:style", &[("w:type", "paragraph"), ("w:default", "1"), ("w:styleId", "Normal")])?;
    xml.empty("w:name", &[("w:val", "Normal")])?;
    xml.end("w:style")?;

    xml.start("w:style", &[("w:type", "paragraph"), ("w:styleId", "Title")])?;
    xml.empty("w:name", &[("w:val", "Title")])?;
    xml.empty("w:basedOn", &[("w:val", "Normal")])?;
    xml.empty("w:qFormat", &[])?;
    xml.start("w:rPr", &[])?;
    xml.empty("w:b", &[])?;
    write_font(&mut xml, BODY_FONT, "48")?;
    xml.end("w:rPr")?;
    xml.end("w:style")?;

    xml.end("w:styles")?;
    Ok(xml.finish())
}

fn write_font(xml: &mut XmlBuilder, font: &str, size: &str) -> Result<(), ExportError> {
    xml.empty(
        "w:rFonts",
        &[("w:ascii", font), ("w:hAnsi", font), ("w:cs", font), ("w:eastAsia", font)],
    )?;
    xml.empty("w:sz", &[("w:val", size)])?;
    xml.empty("w:szCs", &[("w:val", size)])
}

fn document_xml(title: &str, manuscript: &Manuscript) -> Result<Vec<u8>, ExportError> {
    let mut xml = XmlBuilder::new()?;
    xml.start("w:document", &[("xmlns:w", W_NS)])?;
    xml.start("w:body", &[])?;

    // 标题段落
    xml.start("w:p", &[])?;
    xml.start("w:pPr", &[])?;
    xml.empty("w:pStyle", &[("w:val", "Title")])?;
    xml.empty("w:jc", &[("w:val", "center")])?;
    xml.empty("w:spacing", &[("w:after", TITLE_SPACING_AFTER)])?;
    xml.end("w:pPr")?;
    write_run(&mut xml, &Span::plain(title))?;
    xml.end("w:p")?;

    for block in manuscript.blocks() {
        xml.start("w:p", &[])?;
        xml.start("w:pPr", &[])?;
        xml.empty("w:jc", &[("w:val", "both")])?;
        xml.empty(
            "w:spacing",
            &[
                ("w:after", PARAGRAPH_SPACING_AFTER),
                ("w:line", PARAGRAPH_LINE),
                ("w:lineRule", "auto"),
            ],
        )?;
        xml.end("w:pPr")?;
        for span in block.spans() {
            write_run(&mut xml, span)?;
        }
        xml.end("w:p")?;
    }

    xml.empty("w:sectPr", &[])?;
    xml.end("w:body")?;
    xml.end("w:document")?;
    Ok(xml.finish())
}

/// 一个片段对应一个 run，段内换行写成 w:br
fn write_run(xml: &mut XmlBuilder, span: &Span) -> Result<(), ExportError> {
    xml.start("w:r", &[])?;
    if span.is_bold() || span.is_italic() {
        xml.start("w:rPr", &[])?;
        if span.is_bold() {
            xml.empty("w:b", &[])?;
        }
        if span.is_italic() {
            xml.empty("w:i", &[])?;
        }
        xml.end("w:rPr")?;
    }

    for (i, line) in span.text().split('\n').enumerate() {
        if i > 0 {
            xml.empty("w:br", &[])?;
        }
        xml.start("w:t", &[("xml:space", "preserve")])?;
        xml.text(line)?;
        xml.end("w:t")?;
    }

    xml.end("w:r")
}
