//! DOCX extraction: paragraphs, table cells (joined with `|`), headers,
//! footers, embedded-image OCR, and run-level text, with an internal-XML
//! fallback when the structured body read comes back thin.

use ats_core::error::ExtractionError;
use docx_rs::{DocumentChild, ParagraphChild, RunChild, TableCellContent, TableChild, TableRowChild};

use super::normalize_whitespace;
use super::ocr::{recognize_best, OcrEngine};

fn run_text(run: &docx_rs::Run) -> String {
    let mut out = String::new();
    for child in &run.children {
        if let RunChild::Text(t) = child {
            out.push_str(&t.text);
        }
    }
    out
}

fn paragraph_text(p: &docx_rs::Paragraph) -> String {
    let mut out = String::new();
    for child in &p.children {
        if let ParagraphChild::Run(run) = child {
            out.push_str(&run_text(run));
        }
    }
    out
}

fn table_text(table: &docx_rs::Table) -> String {
    let mut rows = Vec::new();
    for row_child in &table.rows {
        let TableChild::TableRow(row) = row_child;
        let mut cells = Vec::new();
        for cell_child in &row.cells {
            let TableRowChild::TableCell(cell) = cell_child;
            let mut cell_text = Vec::new();
            for content in &cell.children {
                if let TableCellContent::Paragraph(p) = content {
                    cell_text.push(paragraph_text(p));
                }
            }
            cells.push(cell_text.join(" "));
        }
        rows.push(cells.join("|"));
    }
    rows.join("\n")
}

/// Pull every text-bearing document child (paragraphs and tables). Headers
/// and footers in `docx-rs` live on the document's section properties
/// rather than as direct children; they're scanned separately, straight out
/// of the zip, by `header_footer_text`.
fn document_body_text(doc: &docx_rs::Docx) -> String {
    let mut out = String::new();
    for child in &doc.document.children {
        match child {
            DocumentChild::Paragraph(p) => {
                out.push_str(&paragraph_text(p));
                out.push('\n');
            }
            DocumentChild::Table(t) => {
                out.push_str(&table_text(t));
                out.push('\n');
            }
            _ => {}
        }
    }
    out
}

fn open_archive(docx_bytes: &[u8]) -> Option<zip::ZipArchive<std::io::Cursor<&[u8]>>> {
    zip::ZipArchive::new(std::io::Cursor::new(docx_bytes)).ok()
}

/// Walk every zip part whose name starts with `prefix` and hand its raw
/// bytes to `handle`.
fn for_each_part(
    archive: &mut zip::ZipArchive<std::io::Cursor<&[u8]>>,
    prefix: &str,
    mut handle: impl FnMut(Vec<u8>),
) {
    for i in 0..archive.len() {
        let Ok(mut file) = archive.by_index(i) else {
            continue;
        };
        if !file.name().starts_with(prefix) {
            continue;
        }
        use std::io::Read;
        let mut bytes = Vec::new();
        if file.read_to_end(&mut bytes).is_err() {
            continue;
        }
        handle(bytes);
    }
}

/// Unconditional scan of `word/header*.xml` and `word/footer*.xml` parts.
/// Candidate name and contact info commonly live in a resume's header, so
/// this runs on every extraction, not just when the body text is thin.
fn header_footer_text(docx_bytes: &[u8]) -> String {
    let Some(mut archive) = open_archive(docx_bytes) else {
        return String::new();
    };
    let mut out = String::new();
    for prefix in ["word/header", "word/footer"] {
        for_each_part(&mut archive, prefix, |bytes| {
            if let Ok(xml) = String::from_utf8(bytes) {
                out.push_str(&strip_tags_keep_w_t(&xml));
                out.push('\n');
            }
        });
    }
    out
}

/// Best-effort scan of the raw `word/document.xml` part for text nodes, used
/// when the structured reader yields too little.
fn document_xml_fallback_text(docx_bytes: &[u8]) -> String {
    let Some(mut archive) = open_archive(docx_bytes) else {
        return String::new();
    };
    let mut out = String::new();
    for_each_part(&mut archive, "word/document", |bytes| {
        if let Ok(xml) = String::from_utf8(bytes) {
            out.push_str(&strip_tags_keep_w_t(&xml));
            out.push('\n');
        }
    });
    out
}

/// Raw bytes of every `word/media/*` part — the embedded images a resume's
/// DOCX may carry (a scanned signature block, a logo with contact info).
fn embedded_image_bytes(docx_bytes: &[u8]) -> Vec<Vec<u8>> {
    let Some(mut archive) = open_archive(docx_bytes) else {
        return Vec::new();
    };
    let mut images = Vec::new();
    for_each_part(&mut archive, "word/media/", |bytes| images.push(bytes));
    images
}

fn ocr_embedded_images(docx_bytes: &[u8], ocr: Option<&dyn OcrEngine>) -> String {
    let Some(ocr) = ocr else { return String::new() };
    let mut out = String::new();
    for image in embedded_image_bytes(docx_bytes) {
        if let Some(text) = recognize_best(ocr, &image) {
            out.push_str(&text);
            out.push('\n');
        }
    }
    out
}

/// Keep only the contents of `<w:t>...</w:t>` runs, which is where Word
/// stores visible text; everything else is markup noise.
fn strip_tags_keep_w_t(xml: &str) -> String {
    let mut out = String::new();
    let mut rest = xml;
    while let Some(start) = rest.find("<w:t") {
        let after_open = &rest[start..];
        let Some(gt) = after_open.find('>') else { break };
        let content_start = &after_open[gt + 1..];
        let Some(close) = content_start.find("</w:t>") else {
            rest = &content_start[..];
            continue;
        };
        out.push_str(&content_start[..close]);
        out.push(' ');
        rest = &content_start[close + "</w:t>".len()..];
    }
    out
}

const MIN_STRUCTURED_CHARS: usize = 100;

pub fn extract_docx(bytes: &[u8], ocr: Option<&dyn OcrEngine>) -> Result<String, ExtractionError> {
    let structured = docx_rs::read_docx(bytes)
        .map(|doc| document_body_text(&doc))
        .unwrap_or_default();
    let structured_norm = normalize_whitespace(&structured);
    let header_footer_norm = normalize_whitespace(&header_footer_text(bytes));

    let body = if structured_norm.chars().count() >= MIN_STRUCTURED_CHARS {
        structured_norm
    } else {
        let fallback_norm = normalize_whitespace(&document_xml_fallback_text(bytes));
        if fallback_norm.len() > structured_norm.len() {
            fallback_norm
        } else {
            structured_norm
        }
    };

    let image_text = normalize_whitespace(&ocr_embedded_images(bytes, ocr));

    let mut combined = body;
    if !header_footer_norm.is_empty() {
        if !combined.is_empty() {
            combined.push('\n');
        }
        combined.push_str(&header_footer_norm);
    }
    if !image_text.is_empty() {
        if !combined.is_empty() {
            combined.push('\n');
        }
        combined.push_str(&image_text);
    }

    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xml_fallback_extracts_w_t_runs() {
        let xml = r#"<w:p><w:r><w:t>Hello</w:t></w:r><w:r><w:t>World</w:t></w:r></w:p>"#;
        let text = strip_tags_keep_w_t(xml);
        assert_eq!(text.trim(), "Hello World");
    }

    #[test]
    fn malformed_bytes_yield_empty_not_panic() {
        let result = extract_docx(b"not a zip at all", None);
        assert_eq!(result.unwrap(), "");
    }
}
