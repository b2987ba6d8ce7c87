//! Raw text extraction from uploaded documents
//!
//! Only the text is recovered; styles, numbering and tables are flattened.
//! Structure is guessed afterwards by the converter.

use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use thiserror::Error;
use zip::ZipArchive;

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const PDF_MIME: &str = "application/pdf";

/// File extensions offered by the upload dialog
pub const UPLOAD_EXTENSIONS: [&str; 5] = ["docx", "pdf", "txt", "md", "markdown"];

const DOCX_BODY_PART: &str = "word/document.xml";

/// Errors that can occur while extracting text from an upload
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Missing document part: {0}")]
    MissingPart(&'static str),

    #[error(
        "PDF conversion requires copy-pasting content. Please copy the text from your PDF and paste it in the editor."
    )]
    PdfRequiresPaste,

    #[error("Unsupported file type ({0}). Please upload a Word document (.docx) or PDF file.")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, ExtractError>;

/// Kind of an uploaded document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentKind {
    Docx,
    Pdf,
    PlainText,
    /// Anything else, with the type or extension that was seen
    Unsupported(String),
}

impl DocumentKind {
    /// Classify an upload by MIME type, falling back to the file extension
    pub fn detect(file_name: &str, mime: Option<&str>) -> Self {
        match mime {
            Some(DOCX_MIME) => return Self::Docx,
            Some(PDF_MIME) => return Self::Pdf,
            Some("text/plain" | "text/markdown") => return Self::PlainText,
            _ => {}
        }

        let extension = Path::new(file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "docx" => Self::Docx,
            "pdf" => Self::Pdf,
            "txt" | "md" | "markdown" => Self::PlainText,
            _ => Self::Unsupported(
                mime.map(str::to_string)
                    .unwrap_or_else(|| format!(".{extension}")),
            ),
        }
    }
}

/// Extract raw text from document bytes
pub fn extract_text(bytes: &[u8], kind: &DocumentKind) -> Result<String> {
    match kind {
        DocumentKind::Docx => extract_docx(bytes),
        DocumentKind::Pdf => Err(ExtractError::PdfRequiresPaste),
        DocumentKind::PlainText => Ok(String::from_utf8_lossy(bytes).into_owned()),
        DocumentKind::Unsupported(what) => Err(ExtractError::Unsupported(what.clone())),
    }
}

/// Read a file from disk and extract its text
pub fn extract_file(path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let kind = DocumentKind::detect(&name, None);

    // Refuse before reading the whole file
    if let DocumentKind::Unsupported(what) = &kind {
        return Err(ExtractError::Unsupported(what.clone()));
    }

    let bytes = std::fs::read(path)?;
    let text = extract_text(&bytes, &kind)?;
    tracing::info!(
        file = %path.display(),
        kind = ?kind,
        chars = text.len(),
        "Extracted document text"
    );
    Ok(text)
}

fn extract_docx(bytes: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut entry = archive.by_name(DOCX_BODY_PART).map_err(|e| match e {
        zip::result::ZipError::FileNotFound => ExtractError::MissingPart(DOCX_BODY_PART),
        other => ExtractError::Zip(other),
    })?;

    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;
    docx_body_text(&xml)
}

/// Walk `word/document.xml` and collect run text.
///
/// Each paragraph is followed by a blank line. Tabs and breaks are kept
/// only inside runs; `w:tab` also appears in paragraph tab-stop definitions.
fn docx_body_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut text = String::new();
    let mut in_text = false;
    let mut run_depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"t" => in_text = true,
                b"r" => run_depth += 1,
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"r" => run_depth = run_depth.saturating_sub(1),
                b"p" => text.push_str("\n\n"),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" => text.push_str("\n\n"),
                b"tab" if run_depth > 0 => text.push('\t'),
                b"br" | b"cr" if run_depth > 0 => text.push('\n'),
                _ => {}
            },
            Event::Text(e) => {
                if in_text {
                    text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::GeneralRef(e) => {
                if in_text {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = resolve_entity(&entity) {
                        text.push(resolved);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

fn resolve_entity(entity: &str) -> Option<char> {
    match entity {
        "apos" => Some('\''),
        "quot" => Some('"'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        _ => {
            let code = entity.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}
