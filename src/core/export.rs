//! Export of the viewer document to other file formats

use std::path::Path;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use thiserror::Error;

use super::pdf::PdfExporter;
use super::settings::ReaderSettings;

const WORD_ENVELOPE_OPEN: &str = "<html xmlns:o='urn:schemas-microsoft-com:office:office' \
xmlns:w='urn:schemas-microsoft-com:office:word' \
xmlns='http://www.w3.org/TR/REC-html40'><head><meta charset='utf-8'>";
const WORD_ENVELOPE_CLOSE: &str = "</body></html>";

/// Errors that can occur while exporting
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No markdown content to download")]
    NothingToExport,
}

/// Target format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Raw markup, used by the converter
    Markdown,
    /// Raw markup with a plain text extension
    Txt,
    /// Rendered HTML in a Word-compatible envelope
    Doc,
    /// Paginated PDF
    Pdf,
}

impl ExportFormat {
    pub fn label(self) -> &'static str {
        match self {
            Self::Markdown => "Markdown",
            Self::Txt => "TXT",
            Self::Doc => "DOC",
            Self::Pdf => "PDF",
        }
    }

    pub fn default_file_name(self) -> &'static str {
        match self {
            Self::Markdown => "converted-document.md",
            Self::Txt => "markdown.txt",
            Self::Doc => "document.doc",
            Self::Pdf => "markdown.pdf",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Txt => "txt",
            Self::Doc => "doc",
            Self::Pdf => "pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Markdown => "text/markdown",
            Self::Txt => "text/plain",
            Self::Doc => "application/vnd.ms-word",
            Self::Pdf => "application/pdf",
        }
    }
}

/// Render `markdown` into the bytes of the given format
pub fn render(
    format: ExportFormat,
    markdown: &str,
    settings: &ReaderSettings,
) -> Result<Vec<u8>, ExportError> {
    if markdown.trim().is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let bytes = match format {
        ExportFormat::Markdown | ExportFormat::Txt => markdown.as_bytes().to_vec(),
        ExportFormat::Doc => word_document(markdown, settings).into_bytes(),
        ExportFormat::Pdf => PdfExporter::new(settings).render(markdown, |page, total| {
            tracing::debug!("Generating PDF... {}%", page * 100 / total);
        }),
    };
    Ok(bytes)
}

/// Render and write an export to `path`
pub fn write(
    format: ExportFormat,
    markdown: &str,
    settings: &ReaderSettings,
    path: &Path,
) -> Result<(), ExportError> {
    let bytes = render(format, markdown, settings)?;
    std::fs::write(path, &bytes)?;
    tracing::info!(
        format = format.label(),
        mime = format.mime_type(),
        bytes = bytes.len(),
        "Exported document to {}",
        path.display()
    );
    Ok(())
}

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Render markdown to an HTML fragment
pub fn render_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, parser_options());
    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}

/// Rendered HTML wrapped so word processors open it as a document
pub fn word_document(markdown: &str, settings: &ReaderSettings) -> String {
    let [br, bg, bb] = settings.background.background_rgb();
    let [tr, tg, tb] = settings.background.text_rgb();

    let mut doc = String::from(WORD_ENVELOPE_OPEN);
    doc.push_str("<title>Markdown Document</title><style>");
    doc.push_str(&format!(
        "body {{ font-family: {}; font-size: {}px; font-weight: {}; letter-spacing: {}px; \
         line-height: {}; color: #{tr:02x}{tg:02x}{tb:02x}; background-color: #{br:02x}{bg:02x}{bb:02x}; }}",
        settings.font_family.css_stack(),
        settings.font_size,
        settings.font_weight.value(),
        settings.letter_spacing,
        settings.line_height,
    ));
    doc.push_str("</style></head><body>");
    doc.push_str(&render_html(markdown));
    doc.push_str(WORD_ENVELOPE_CLOSE);
    doc
}

/// How a block of rendered text is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStyle {
    Paragraph,
    Heading(u8),
    ListItem,
    Quote,
    Code,
    TableRow,
    Rule,
}

/// A block of visible text in reading order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub style: BlockStyle,
    pub text: String,
}

#[derive(Default)]
struct BlockCollector {
    blocks: Vec<TextBlock>,
    current: String,
    style: Option<BlockStyle>,
    quote_depth: usize,
}

impl BlockCollector {
    fn flush(&mut self) {
        let text = self.current.trim_end();
        if !text.trim().is_empty() {
            let style = match self.style.take() {
                Some(style) => style,
                None if self.quote_depth > 0 => BlockStyle::Quote,
                None => BlockStyle::Paragraph,
            };
            self.blocks.push(TextBlock {
                style,
                text: text.to_string(),
            });
        }
        self.current.clear();
        self.style = None;
    }
}

/// Flatten markdown into the blocks of text a reader would see
pub fn text_blocks(markdown: &str) -> Vec<TextBlock> {
    let mut out = BlockCollector::default();
    let mut lists: Vec<Option<u64>> = Vec::new();

    for event in Parser::new_ext(markdown, parser_options()) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                out.style = Some(BlockStyle::Heading(level as u8));
            }
            Event::Start(Tag::CodeBlock(_)) => out.style = Some(BlockStyle::Code),
            Event::Start(Tag::TableHead | Tag::TableRow) => out.style = Some(BlockStyle::TableRow),
            Event::Start(Tag::BlockQuote(_)) => out.quote_depth += 1,
            Event::End(TagEnd::BlockQuote(_)) => {
                out.flush();
                out.quote_depth = out.quote_depth.saturating_sub(1);
            }
            Event::Start(Tag::List(start)) => {
                out.flush();
                lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                out.flush();
                lists.pop();
            }
            Event::Start(Tag::Item) => {
                out.flush();
                match lists.last_mut() {
                    Some(Some(number)) => {
                        out.current.push_str(&format!("{number}. "));
                        *number += 1;
                    }
                    _ => out.current.push_str("• "),
                }
                out.style = Some(BlockStyle::ListItem);
            }
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::CodeBlock
                | TagEnd::Item
                | TagEnd::TableHead
                | TagEnd::TableRow,
            ) => out.flush(),
            Event::End(TagEnd::TableCell) => out.current.push('\t'),
            Event::Text(text) | Event::Code(text) => out.current.push_str(&text),
            Event::SoftBreak => out.current.push(' '),
            Event::HardBreak => out.current.push('\n'),
            Event::TaskListMarker(done) => {
                out.current.push_str(if done { "[x] " } else { "[ ] " });
            }
            Event::Rule => {
                out.flush();
                out.blocks.push(TextBlock {
                    style: BlockStyle::Rule,
                    text: String::new(),
                });
            }
            _ => {}
        }
    }
    out.flush();

    out.blocks
}

/// Visible text of the rendered markdown, as copied from the preview
pub fn plain_text(markdown: &str) -> String {
    text_blocks(markdown)
        .into_iter()
        .filter(|b| b.style != BlockStyle::Rule)
        .map(|b| b.text)
        .collect::<Vec<_>>()
        .join("\n")
}
