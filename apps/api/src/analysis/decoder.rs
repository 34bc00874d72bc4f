//! Document decoding — turns uploaded bytes into plain text.
//!
//! One capability, one implementation per format, selected by `DocumentFormat`:
//! - PDF: every page in order via `pdf-extract`, joined by newlines. Pages with
//!   no text layer (scans) contribute an empty line instead of failing.
//! - DOCX: paragraphs of `word/document.xml` in document order, joined by
//!   newlines. Table cells are flattened row-major, one line per cell
//!   paragraph. Headers, footers, comments and images are not read.
//!
//! Decoding never touches the file system or network, and never returns a
//! partial text: any parse failure is `MalformedDocument`.

use std::io::{Cursor, Read};
use std::panic::{self, AssertUnwindSafe};

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analysis::error::AnalysisError;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// The PDF header may be preceded by junk, but only within the first 1024 bytes.
const PDF_HEADER_WINDOW: usize = 1024;
/// Ceiling on the decompressed main document part (zip bomb guard).
const MAX_DOCX_XML_BYTES: u64 = 32 * 1024 * 1024;
const DOCX_MAIN_PART: &str = "word/document.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Parses a declared MIME type. Parameters (`; charset=...`) and case are
    /// ignored; the short tags `pdf` and `docx` are accepted too.
    pub fn from_mime(mime: &str) -> Result<Self, AnalysisError> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            PDF_MIME | "pdf" => Ok(DocumentFormat::Pdf),
            DOCX_MIME | "docx" => Ok(DocumentFormat::Docx),
            _ => Err(AnalysisError::UnsupportedFormat(format!(
                "'{mime}' is not accepted; upload a PDF or DOCX file"
            ))),
        }
    }

    /// Maps a file name's extension to a format.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => PDF_MIME,
            DocumentFormat::Docx => DOCX_MIME,
        }
    }

    /// Decodes `bytes` as this format.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, AnalysisError> {
        match self {
            DocumentFormat::Pdf => decode_pdf(bytes),
            DocumentFormat::Docx => decode_docx(bytes),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// PDF
// ────────────────────────────────────────────────────────────────────────────

fn decode_pdf(bytes: &[u8]) -> Result<String, AnalysisError> {
    if bytes.is_empty() {
        return Err(AnalysisError::MalformedDocument(
            "PDF payload is empty".to_string(),
        ));
    }
    let window = &bytes[..bytes.len().min(PDF_HEADER_WINDOW)];
    if !window.windows(5).any(|w| w == b"%PDF-") {
        return Err(AnalysisError::MalformedDocument(
            "missing %PDF- header".to_string(),
        ));
    }

    // pdf-extract panics on some malformed content streams instead of erroring.
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }));

    let pages = match outcome {
        Ok(Ok(pages)) => pages,
        Ok(Err(e)) => {
            debug!("PDF parse failed: {e}");
            return Err(AnalysisError::MalformedDocument(format!(
                "PDF could not be parsed: {e}"
            )));
        }
        Err(_) => {
            warn!("PDF parser panicked on upload");
            return Err(AnalysisError::MalformedDocument(
                "PDF could not be parsed".to_string(),
            ));
        }
    };

    let text = pages
        .iter()
        .map(|page| page.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    debug!(pages = pages.len(), chars = text.len(), "Decoded PDF");
    Ok(text)
}

// ────────────────────────────────────────────────────────────────────────────
// DOCX
// ────────────────────────────────────────────────────────────────────────────

fn decode_docx(bytes: &[u8]) -> Result<String, AnalysisError> {
    let xml = read_docx_main_part(bytes)?;
    let paragraphs = docx_paragraphs(&xml)?;
    debug!(paragraphs = paragraphs.len(), "Decoded DOCX");
    Ok(paragraphs.join("\n"))
}

fn read_docx_main_part(bytes: &[u8]) -> Result<Vec<u8>, AnalysisError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
        AnalysisError::MalformedDocument(format!("DOCX is not a valid package: {e}"))
    })?;
    let part = archive.by_name(DOCX_MAIN_PART).map_err(|e| {
        AnalysisError::MalformedDocument(format!("DOCX has no {DOCX_MAIN_PART}: {e}"))
    })?;

    let mut xml = Vec::new();
    part.take(MAX_DOCX_XML_BYTES + 1)
        .read_to_end(&mut xml)
        .map_err(|e| {
            AnalysisError::MalformedDocument(format!("DOCX {DOCX_MAIN_PART} is unreadable: {e}"))
        })?;
    if xml.len() as u64 > MAX_DOCX_XML_BYTES {
        return Err(AnalysisError::MalformedDocument(format!(
            "DOCX {DOCX_MAIN_PART} exceeds {MAX_DOCX_XML_BYTES} bytes"
        )));
    }
    Ok(xml)
}

/// Walks WordprocessingML and returns the text of every `w:p`, in order.
///
/// Only `w:t` runs contribute characters; `w:tab` becomes a tab and
/// `w:br`/`w:cr` a line break when they sit inside a run (tab stops in
/// paragraph properties are ignored). Deleted runs (`w:delText`) and field
/// codes (`w:instrText`) are skipped because they are not `w:t`. A paragraph
/// nested inside another (text boxes) is emitted before its container.
///
/// The part must be a single well-formed `document` element. quick-xml stops
/// quietly at end of input, so unclosed elements are checked here.
fn docx_paragraphs(xml: &[u8]) -> Result<Vec<String>, AnalysisError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut paragraphs = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut depth = 0usize;
    let mut root: Option<Vec<u8>> = None;
    let mut run_depth = 0usize;
    let mut in_text = false;
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            AnalysisError::MalformedDocument(format!(
                "DOCX XML error at byte {}: {e}",
                reader.buffer_position()
            ))
        })?;
        match event {
            Event::Start(e) => {
                if depth == 0 && root.is_none() {
                    root = Some(e.local_name().as_ref().to_vec());
                }
                depth += 1;
                match e.local_name().as_ref() {
                    b"p" => open.push(String::new()),
                    b"r" => run_depth += 1,
                    b"t" => in_text = run_depth > 0,
                    b"tab" if run_depth > 0 => push_char(&mut open, '\t'),
                    b"br" | b"cr" if run_depth > 0 => push_char(&mut open, '\n'),
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if depth == 0 && root.is_none() {
                    root = Some(e.local_name().as_ref().to_vec());
                }
                match e.local_name().as_ref() {
                    b"p" => paragraphs.push(String::new()),
                    b"tab" if run_depth > 0 => push_char(&mut open, '\t'),
                    b"br" | b"cr" if run_depth > 0 => push_char(&mut open, '\n'),
                    _ => {}
                }
            }
            Event::Text(e) if in_text => {
                let text = e.unescape().map_err(|err| {
                    AnalysisError::MalformedDocument(format!("DOCX text is malformed: {err}"))
                })?;
                if let Some(paragraph) = open.last_mut() {
                    paragraph.push_str(&text);
                }
            }
            Event::CData(e) if in_text => {
                if let Some(paragraph) = open.last_mut() {
                    paragraph.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                match e.local_name().as_ref() {
                    b"t" => in_text = false,
                    b"r" => run_depth = run_depth.saturating_sub(1),
                    b"p" => {
                        if let Some(paragraph) = open.pop() {
                            paragraphs.push(paragraph);
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if depth != 0 || !open.is_empty() {
        return Err(AnalysisError::MalformedDocument(format!(
            "DOCX {DOCX_MAIN_PART} ends with {depth} unclosed elements"
        )));
    }
    if root.as_deref() != Some(b"document".as_slice()) {
        return Err(AnalysisError::MalformedDocument(format!(
            "DOCX {DOCX_MAIN_PART} has no document root element"
        )));
    }

    Ok(paragraphs)
}

fn push_char(open: &mut [String], c: char) {
    if let Some(paragraph) = open.last_mut() {
        paragraph.push(c);
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_from_mime_accepts_pdf_and_docx() {
        assert_eq!(DocumentFormat::from_mime("application/pdf"), Ok(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_mime(DOCX_MIME), Ok(DocumentFormat::Docx));
        assert_eq!(
            DocumentFormat::from_mime("Application/PDF; charset=binary"),
            Ok(DocumentFormat::Pdf)
        );
        assert_eq!(DocumentFormat::from_mime("docx"), Ok(DocumentFormat::Docx));
    }

    #[test]
    fn test_text_plain_is_unsupported() {
        let err = DocumentFormat::from_mime("text/plain").unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_legacy_word_is_unsupported() {
        assert!(matches!(
            DocumentFormat::from_mime("application/msword"),
            Err(AnalysisError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_from_file_name() {
        assert_eq!(DocumentFormat::from_file_name("cv.PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_file_name("cv.final.docx"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_file_name("cv.txt"), None);
        assert_eq!(DocumentFormat::from_file_name("cv"), None);
    }

    #[test]
    fn test_zero_byte_pdf_is_malformed() {
        let err = DocumentFormat::Pdf.decode(&[]).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedDocument(_)));
    }

    #[test]
    fn test_non_pdf_bytes_are_malformed() {
        let err = DocumentFormat::Pdf.decode(b"hello, I am a text file").unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedDocument(_)));
    }

    #[test]
    fn test_header_only_pdf_is_malformed() {
        let pdf = b"%PDF-1.7\nthis body holds no objects, xref or trailer\n";
        let err = DocumentFormat::Pdf.decode(pdf).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedDocument(_)));
    }

    #[test]
    fn test_pdf_pages_in_order_with_image_only_page() {
        let pdf = pdf_with_pages(&[Some("Rust Engineer"), None, Some("Kubernetes Operator")]);
        let text = DocumentFormat::Pdf.decode(&pdf).unwrap();
        let rust_at = text.find("Rust Engineer").expect("first page text");
        let k8s_at = text.find("Kubernetes Operator").expect("third page text");
        assert!(rust_at < k8s_at);

        // The textless middle page contributes one extra line between its neighbours.
        let gap = |text: &str| {
            let start = text.find("Rust Engineer").unwrap() + "Rust Engineer".len();
            let end = text.find("Kubernetes Operator").unwrap();
            text[start..end].to_string()
        };
        let two_pages = pdf_with_pages(&[Some("Rust Engineer"), Some("Kubernetes Operator")]);
        let without_blank = DocumentFormat::Pdf.decode(&two_pages).unwrap();
        let with_blank = gap(&text);
        assert!(with_blank.trim().is_empty(), "unexpected text {with_blank:?}");
        assert_eq!(
            with_blank.matches('\n').count(),
            gap(&without_blank).matches('\n').count() + 1,
            "image-only page lost its separator: {text:?}"
        );
    }

    #[test]
    fn test_docx_paragraphs_joined_by_newlines() {
        let docx = docx_with_paragraphs(&["Jane Doe", "Rust &amp; Go", "Kubernetes"]);
        let text = DocumentFormat::Docx.decode(&docx).unwrap();
        assert_eq!(text, "Jane Doe\nRust & Go\nKubernetes");
    }

    #[test]
    fn test_docx_runs_tabs_and_breaks() {
        let docx = docx_with_body(
            r#"<w:p><w:r><w:t>Full</w:t></w:r><w:r><w:t>-Stack</w:t></w:r><w:r><w:tab/><w:t>Rust</w:t><w:br/><w:t>Go</w:t></w:r></w:p>"#,
        );
        let text = DocumentFormat::Docx.decode(&docx).unwrap();
        assert_eq!(text, "Full-Stack\tRust\nGo");
    }

    #[test]
    fn test_docx_tables_flatten_row_major() {
        let docx = docx_with_body(
            r#"<w:p><w:r><w:t>Skills</w:t></w:r></w:p>
            <w:tbl>
              <w:tr>
                <w:tc><w:p><w:r><w:t>Rust</w:t></w:r></w:p></w:tc>
                <w:tc><w:p><w:r><w:t>Go</w:t></w:r></w:p></w:tc>
              </w:tr>
              <w:tr>
                <w:tc><w:p><w:r><w:t>Docker</w:t></w:r></w:p></w:tc>
                <w:tc><w:p><w:r><w:t>AWS</w:t></w:r></w:p></w:tc>
              </w:tr>
            </w:tbl>"#,
        );
        let text = DocumentFormat::Docx.decode(&docx).unwrap();
        assert_eq!(text, "Skills\nRust\nGo\nDocker\nAWS");
    }

    #[test]
    fn test_docx_skips_deleted_text_and_field_codes() {
        let docx = docx_with_body(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>Kept</w:t></w:r><w:del><w:r><w:delText>Gone</w:delText></w:r></w:del><w:r><w:instrText> HYPERLINK </w:instrText></w:r></w:p>"#,
        );
        let text = DocumentFormat::Docx.decode(&docx).unwrap();
        assert_eq!(text, "Kept");
    }

    #[test]
    fn test_docx_empty_paragraphs_are_kept_as_blank_lines() {
        let docx = docx_with_body(r#"<w:p><w:r><w:t>A1</w:t></w:r></w:p><w:p/><w:p></w:p><w:p><w:r><w:t>B2</w:t></w:r></w:p>"#);
        let text = DocumentFormat::Docx.decode(&docx).unwrap();
        assert_eq!(text, "A1\n\n\nB2");
    }

    #[test]
    fn test_docx_without_text_is_empty_not_error() {
        let docx = docx_with_body("");
        assert_eq!(DocumentFormat::Docx.decode(&docx).unwrap(), "");
    }

    #[test]
    fn test_non_zip_docx_is_malformed() {
        let err = DocumentFormat::Docx.decode(b"PK not really").unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedDocument(_)));
    }

    #[test]
    fn test_zip_without_main_part_is_malformed() {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer
            .start_file("word/other.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        let err = DocumentFormat::Docx.decode(&bytes).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedDocument(_)));
    }

    #[test]
    fn test_broken_docx_xml_is_malformed() {
        let docx = docx_with_body("<w:p><w:r><w:t>open</w:r></w:p>");
        let err = DocumentFormat::Docx.decode(&docx).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedDocument(_)));
    }

    #[test]
    fn test_truncated_docx_xml_is_malformed() {
        let docx = docx_with_main_part(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Rust Engineer</w:t></w:r></w:p><w:p><w:r><w:t>Kubernetes Terraform"#,
        );
        let err = DocumentFormat::Docx.decode(&docx).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedDocument(_)));
    }

    #[test]
    fn test_docx_main_part_cut_between_elements_is_malformed() {
        let docx = docx_with_main_part(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Rust</w:t></w:r></w:p>"#,
        );
        let err = DocumentFormat::Docx.decode(&docx).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedDocument(_)));
    }

    #[test]
    fn test_docx_main_part_that_is_not_xml_is_malformed() {
        let docx = docx_with_main_part("this is not xml at all");
        let err = DocumentFormat::Docx.decode(&docx).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedDocument(_)));
    }

    #[test]
    fn test_docx_with_foreign_root_is_malformed() {
        let docx = docx_with_main_part(r#"<html><body><p>Rust</p></body></html>"#);
        let err = DocumentFormat::Docx.decode(&docx).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedDocument(_)));
    }

    #[test]
    fn test_self_closed_document_root_is_empty_text() {
        let docx = docx_with_main_part(
            r#"<?xml version="1.0"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#,
        );
        assert_eq!(DocumentFormat::Docx.decode(&docx).unwrap(), "");
    }
}
