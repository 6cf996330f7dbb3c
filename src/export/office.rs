//! Minimal Office Open XML packages (spreadsheet and word document).
//!
//! Only the parts a reader needs to open the file are written: content
//! types, package relationships and one worksheet or document body.

use super::{DOCUMENT_TITLE, LISTING_HEADER};
use crate::error::ExportError;
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";

/// Spreadsheet with the header in A1 and one URL per row below it
pub fn encode_xlsx(links: &[String]) -> Result<Vec<u8>, ExportError> {
    let content_types = format!(
        concat!(
            "{}<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
            "<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>",
            "<Default Extension=\"xml\" ContentType=\"application/xml\"/>",
            "<Override PartName=\"/xl/workbook.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/>",
            "<Override PartName=\"/xl/worksheets/sheet1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>",
            "</Types>"
        ),
        XML_DECL
    );

    let workbook = format!(
        concat!(
            "{}<workbook xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" ",
            "xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">",
            "<sheets><sheet name=\"Listings\" sheetId=\"1\" r:id=\"rId1\"/></sheets>",
            "</workbook>"
        ),
        XML_DECL
    );

    let mut sheet = format!(
        "{}<worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\"><sheetData>",
        XML_DECL
    );
    let rows = std::iter::once(LISTING_HEADER).chain(links.iter().map(String::as_str));
    for (idx, value) in rows.enumerate() {
        let row = idx + 1;
        sheet.push_str(&format!(
            "<row r=\"{row}\"><c r=\"A{row}\" t=\"inlineStr\"><is><t>{}</t></is></c></row>",
            escape(value)
        ));
    }
    sheet.push_str("</sheetData></worksheet>");

    package(&[
        ("[Content_Types].xml", content_types),
        ("_rels/.rels", relationships(REL_OFFICE_DOCUMENT, "xl/workbook.xml")),
        ("xl/workbook.xml", workbook),
        (
            "xl/_rels/workbook.xml.rels",
            relationships(REL_WORKSHEET, "worksheets/sheet1.xml"),
        ),
        ("xl/worksheets/sheet1.xml", sheet),
    ])
}

/// Word document: a bold title, then one paragraph per URL
pub fn encode_docx(links: &[String]) -> Result<Vec<u8>, ExportError> {
    let content_types = format!(
        concat!(
            "{}<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
            "<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>",
            "<Default Extension=\"xml\" ContentType=\"application/xml\"/>",
            "<Override PartName=\"/word/document.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>",
            "</Types>"
        ),
        XML_DECL
    );

    let mut document = format!(
        concat!(
            "{}<w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>",
            "<w:p><w:r><w:rPr><w:b/><w:sz w:val=\"32\"/></w:rPr><w:t>{}</w:t></w:r></w:p>"
        ),
        XML_DECL,
        escape(DOCUMENT_TITLE)
    );
    for link in links {
        document.push_str(&format!(
            "<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
            escape(link.as_str())
        ));
    }
    document.push_str("<w:sectPr/></w:body></w:document>");

    package(&[
        ("[Content_Types].xml", content_types),
        ("_rels/.rels", relationships(REL_OFFICE_DOCUMENT, "word/document.xml")),
        ("word/document.xml", document),
    ])
}

fn relationships(kind: &str, target: &str) -> String {
    format!(
        concat!(
            "{}<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
            "<Relationship Id=\"rId1\" Type=\"{}\" Target=\"{}\"/>",
            "</Relationships>"
        ),
        XML_DECL, kind, target
    )
}

fn package(parts: &[(&str, String)]) -> Result<Vec<u8>, ExportError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in parts {
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file(*name, options)?;
        zip.write_all(body.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}
