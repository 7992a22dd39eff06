//! Minimal WordprocessingML package writer.

use std::io::{Cursor, Write};

use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{Paragraph, ParagraphStyle, DEFAULT_FONT, DEFAULT_FONT_SIZE_PT};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("Failed to write document archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to write document part: {0}")]
    Io(#[from] std::io::Error),
}

const CONTENT_TYPES: &str = r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/></Relationships>"#;

const SECTION_PROPERTIES: &str = r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr>"#;

/// Escapes text for element content and drops characters XML 1.0 cannot carry.
pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' => out.push(c),
            c if (c as u32) < 0x20 => {}
            '\u{FFFE}' | '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
    out
}

fn font_xml() -> String {
    format!(
        r#"<w:rFonts w:ascii="{f}" w:hAnsi="{f}" w:eastAsia="{f}" w:cs="{f}"/><w:sz w:val="{sz}"/><w:szCs w:val="{sz}"/>"#,
        f = DEFAULT_FONT,
        sz = DEFAULT_FONT_SIZE_PT * 2
    )
}

fn styles_xml() -> String {
    let font = font_xml();
    format!(
        concat!(
            r#"{decl}<w:styles xmlns:w="{ns}">"#,
            r#"<w:docDefaults><w:rPrDefault><w:rPr>{font}</w:rPr></w:rPrDefault><w:pPrDefault/></w:docDefaults>"#,
            r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/><w:rPr>{font}</w:rPr></w:style>"#,
            r#"<w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/><w:basedOn w:val="Normal"/>"#,
            r#"<w:pPr><w:numPr><w:numId w:val="1"/></w:numPr><w:ind w:left="360" w:hanging="360"/></w:pPr></w:style>"#,
            r#"</w:styles>"#
        ),
        decl = XML_DECL,
        ns = W_NS,
        font = font
    )
}

fn numbering_xml() -> String {
    format!(
        concat!(
            r#"{decl}<w:numbering xmlns:w="{ns}">"#,
            r#"<w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="hybridMultilevel"/>"#,
            r#"<w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="•"/><w:lvlJc w:val="left"/>"#,
            r#"<w:pPr><w:ind w:left="360" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum>"#,
            r#"<w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>"#,
            r#"</w:numbering>"#
        ),
        decl = XML_DECL,
        ns = W_NS
    )
}

fn paragraph_xml(paragraph: &Paragraph, out: &mut String) {
    out.push_str("<w:p>");
    if paragraph.style != ParagraphStyle::Normal {
        out.push_str(&format!(
            r#"<w:pPr><w:pStyle w:val="{}"/></w:pPr>"#,
            paragraph.style.style_id()
        ));
    }

    out.push_str("<w:r>");
    if paragraph.bold || paragraph.size_pt.is_some() {
        out.push_str("<w:rPr>");
        if paragraph.bold {
            out.push_str("<w:b/><w:bCs/>");
        }
        if let Some(size) = paragraph.size_pt {
            out.push_str(&format!(
                r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#,
                size * 2
            ));
        }
        out.push_str("</w:rPr>");
    }
    out.push_str(r#"<w:t xml:space="preserve">"#);
    out.push_str(&escape_xml(&paragraph.text));
    out.push_str("</w:t></w:r></w:p>");
}

fn document_xml(paragraphs: &[Paragraph]) -> String {
    let mut out = format!(r#"{}<w:document xmlns:w="{}"><w:body>"#, XML_DECL, W_NS);
    for paragraph in paragraphs {
        paragraph_xml(paragraph, &mut out);
    }
    out.push_str(SECTION_PROPERTIES);
    out.push_str("</w:body></w:document>");
    out
}

/// Serializes `paragraphs` into `.docx` bytes, ready to be read from the start.
pub fn write_document(paragraphs: &[Paragraph]) -> Result<Vec<u8>, DocxError> {
    let parts: [(&str, String); 6] = [
        ("[Content_Types].xml", format!("{}{}", XML_DECL, CONTENT_TYPES)),
        ("_rels/.rels", format!("{}{}", XML_DECL, PACKAGE_RELS)),
        ("word/document.xml", document_xml(paragraphs)),
        ("word/styles.xml", styles_xml()),
        ("word/numbering.xml", numbering_xml()),
        (
            "word/_rels/document.xml.rels",
            format!("{}{}", XML_DECL, DOCUMENT_RELS),
        ),
    ];

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, content) in &parts {
        zip.start_file(*name, options)?;
        zip.write_all(content.as_bytes())?;
    }
    let cursor = zip.finish()?;

    Ok(cursor.into_inner())
}
