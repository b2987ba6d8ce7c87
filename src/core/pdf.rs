//! Paginated PDF export
//!
//! The rendered text is laid out as one long column of fixed-height lines and
//! then cut into page-sized slices, so every page holds the same number of
//! lines. Uses `printpdf` 0.8, which builds pages from `Op` lists.

use printpdf::{
    BuiltinFont, Color, LinePoint, Mm, Op, PaintMode, PdfDocument, PdfPage, PdfSaveOptions,
    PdfWarnMsg, Point, Polygon, PolygonRing, Pt, Rgb, TextItem, WindingOrder,
};
use tracing::{debug, info, instrument};

use super::export::{BlockStyle, TextBlock, text_blocks};
use super::settings::{FontFamily, ReaderSettings};

/// A4 portrait
pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
/// Margin on every side of the page
pub const MARGIN_MM: f32 = 10.0;

/// Title embedded in the PDF metadata
const DOCUMENT_TITLE: &str = "Markdown Document";

/// CSS pixels are 0.75 pt
const PX_TO_PT: f32 = 0.75;

/// Number of pages needed for `total_lines`, never less than one
pub fn page_count(total_lines: usize, lines_per_page: usize) -> usize {
    total_lines.div_ceil(lines_per_page.max(1)).max(1)
}

/// Line metrics derived from the reader settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub font_size_pt: f32,
    pub line_height_pt: f32,
    pub chars_per_line: usize,
    pub lines_per_page: usize,
}

impl PageLayout {
    pub fn for_settings(settings: &ReaderSettings) -> Self {
        let font_size_pt = settings.font_size as f32 * PX_TO_PT;
        let line_height_pt = font_size_pt * settings.line_height;

        // Rough average glyph advance of the builtin fonts
        let glyph_factor = match settings.font_family {
            FontFamily::Mono => 0.6,
            _ => 0.5,
        };
        let advance_pt = (font_size_pt * glyph_factor + settings.letter_spacing * PX_TO_PT).max(1.0);

        let box_width_pt = Mm(PAGE_WIDTH_MM - 2.0 * MARGIN_MM).into_pt().0;
        let box_height_pt = Mm(PAGE_HEIGHT_MM - 2.0 * MARGIN_MM).into_pt().0;

        Self {
            font_size_pt,
            line_height_pt,
            chars_per_line: ((box_width_pt / advance_pt) as usize).max(1),
            lines_per_page: ((box_height_pt / line_height_pt) as usize).max(1),
        }
    }

    /// Height of one page slice in points
    pub fn slice_height_pt(&self) -> f32 {
        self.lines_per_page as f32 * self.line_height_pt
    }
}

/// One laid-out line of output
#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutLine {
    pub text: String,
    pub emphasis: bool,
}

/// Renders markdown into a themed, paginated PDF
pub struct PdfExporter {
    settings: ReaderSettings,
    layout: PageLayout,
    title: String,
}

impl PdfExporter {
    pub fn new(settings: &ReaderSettings) -> Self {
        Self {
            settings: settings.clone(),
            layout: PageLayout::for_settings(settings),
            title: DOCUMENT_TITLE.to_string(),
        }
    }

    pub fn layout(&self) -> PageLayout {
        self.layout
    }

    /// Lay markdown out as a single column of wrapped lines
    pub fn lay_out(&self, markdown: &str) -> Vec<LaidOutLine> {
        let mut lines = Vec::new();

        for (idx, block) in text_blocks(markdown).iter().enumerate() {
            if idx > 0 && block.style != BlockStyle::TableRow {
                lines.push(LaidOutLine {
                    text: String::new(),
                    emphasis: false,
                });
            }
            self.lay_out_block(block, &mut lines);
        }

        lines
    }

    fn lay_out_block(&self, block: &TextBlock, lines: &mut Vec<LaidOutLine>) {
        let width = self.layout.chars_per_line;
        let (prefix, emphasis) = match block.style {
            BlockStyle::Heading(_) => ("", true),
            BlockStyle::Quote => ("> ", false),
            BlockStyle::Code => ("", false),
            BlockStyle::Rule => {
                lines.push(LaidOutLine {
                    text: "-".repeat(width),
                    emphasis: false,
                });
                return;
            }
            _ => ("", self.settings.font_weight.is_bold()),
        };

        for source_line in block.text.lines() {
            let text = format!("{prefix}{}", source_line.replace('\t', "    "));
            let wrapped = if block.style == BlockStyle::Code {
                hard_wrap(&text, width)
            } else {
                wrap_words(&text, width)
            };
            lines.extend(wrapped.into_iter().map(|text| LaidOutLine { text, emphasis }));
        }
    }

    fn font(&self, emphasis: bool) -> BuiltinFont {
        let bold = emphasis || self.settings.font_weight.is_bold();
        match (self.settings.font_family, bold) {
            (FontFamily::Serif, false) => BuiltinFont::TimesRoman,
            (FontFamily::Serif, true) => BuiltinFont::TimesBold,
            (FontFamily::Mono, false) => BuiltinFont::Courier,
            (FontFamily::Mono, true) => BuiltinFont::CourierBold,
            (FontFamily::Sans | FontFamily::Display, false) => BuiltinFont::Helvetica,
            (FontFamily::Sans | FontFamily::Display, true) => BuiltinFont::HelveticaBold,
        }
    }

    /// Render `markdown` to PDF bytes.
    ///
    /// `progress` is called with `(page, page_count)` after each page.
    #[instrument(skip(self, markdown, progress), fields(markdown_len = markdown.len()))]
    pub fn render(&self, markdown: &str, mut progress: impl FnMut(usize, usize)) -> Vec<u8> {
        let lines = self.lay_out(markdown);
        let per_page = self.layout.lines_per_page;
        let total_pages = page_count(lines.len(), per_page);

        info!(
            pages = total_pages,
            lines = lines.len(),
            title = %self.title,
            "Creating PDF"
        );

        let page_w = Mm(PAGE_WIDTH_MM);
        let page_h = Mm(PAGE_HEIGHT_MM);
        let mut doc = PdfDocument::new(&self.title);
        let mut pages = Vec::with_capacity(total_pages);

        for page_idx in 0..total_pages {
            let start = (page_idx * per_page).min(lines.len());
            let end = ((page_idx + 1) * per_page).min(lines.len());
            let ops = self.page_ops(&lines[start..end]);
            pages.push(PdfPage::new(page_w, page_h, ops));
            progress(page_idx + 1, total_pages);
        }

        doc.with_pages(pages);

        debug!(
            slice_height_pt = self.layout.slice_height_pt(),
            chars_per_line = self.layout.chars_per_line,
            "PDF layout complete"
        );

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        doc.save(&PdfSaveOptions::default(), &mut warnings)
    }

    fn page_ops(&self, lines: &[LaidOutLine]) -> Vec<Op> {
        let page_w_pt = Mm(PAGE_WIDTH_MM).into_pt().0;
        let page_h_pt = Mm(PAGE_HEIGHT_MM).into_pt().0;
        let margin_pt = Mm(MARGIN_MM).into_pt().0;

        let mut ops = vec![
            Op::SetFillColor {
                col: rgb(self.settings.background.background_rgb()),
            },
            Op::DrawPolygon {
                polygon: page_rect(page_w_pt, page_h_pt),
            },
            Op::SetFillColor {
                col: rgb(self.settings.background.text_rgb()),
            },
        ];

        for (idx, line) in lines.iter().enumerate() {
            if line.text.is_empty() {
                continue;
            }
            // Baseline sits one font size below the top of the line box
            let y_pt = page_h_pt
                - margin_pt
                - idx as f32 * self.layout.line_height_pt
                - self.layout.font_size_pt;

            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Pt(margin_pt),
                    y: Pt(y_pt),
                },
            });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(self.layout.font_size_pt),
                font: self.font(line.emphasis),
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(line.text.clone())],
                font: self.font(line.emphasis),
            });
            ops.push(Op::EndTextSection);
        }

        ops
    }
}

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb(Rgb {
        r: r as f32 / 255.0,
        g: g as f32 / 255.0,
        b: b as f32 / 255.0,
        icc_profile: None,
    })
}

fn page_rect(width_pt: f32, height_pt: f32) -> Polygon {
    let corner = |x: f32, y: f32| LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    };
    Polygon {
        rings: vec![PolygonRing {
            points: vec![
                corner(0.0, 0.0),
                corner(width_pt, 0.0),
                corner(width_pt, height_pt),
                corner(0.0, height_pt),
            ],
        }],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    }
}

/// Greedy word wrap; words longer than `width` are split
fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if word_len > width {
            let mut pieces = hard_wrap(word, width);
            if let Some(last) = pieces.pop() {
                lines.extend(pieces);
                current_len = last.chars().count();
                current = last;
            }
            continue;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Cut at exactly `width` characters, keeping whitespace
fn hard_wrap(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 40), 1);
        assert_eq!(page_count(40, 40), 1);
        assert_eq!(page_count(41, 40), 2);
        assert_eq!(page_count(120, 40), 3);
        assert_eq!(page_count(5, 0), 5);
    }

    #[test]
    fn test_layout_follows_settings() {
        let base = PageLayout::for_settings(&ReaderSettings::default());
        assert_eq!(base.font_size_pt, 12.0);
        assert_eq!(base.line_height_pt, 18.0);

        let mut bigger = ReaderSettings::default();
        bigger.increase_font_size();
        bigger.increase_line_height();
        bigger.increase_letter_spacing();
        let layout = PageLayout::for_settings(&bigger);
        assert!(layout.lines_per_page < base.lines_per_page);
        assert!(layout.chars_per_line < base.chars_per_line);
    }

    #[test]
    fn test_slice_is_whole_lines_within_page_box() {
        let layout = PageLayout::for_settings(&ReaderSettings::default());
        let box_height_pt = Mm(PAGE_HEIGHT_MM - 2.0 * MARGIN_MM).into_pt().0;
        assert!(layout.slice_height_pt() <= box_height_pt);
        assert!(layout.slice_height_pt() + layout.line_height_pt > box_height_pt);
    }

    #[test]
    fn test_wrap_words() {
        assert_eq!(wrap_words("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap_words("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_words("", 10), vec![""]);
    }

    #[test]
    fn test_hard_wrap_keeps_indentation() {
        assert_eq!(hard_wrap("    let x", 5), vec!["    l", "et x"]);
    }

    #[test]
    fn test_lay_out_blocks() {
        let exporter = PdfExporter::new(&ReaderSettings::default());
        let lines = exporter.lay_out("# Title\n\nbody text\n\n> wise words\n");
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Title", "", "body text", "", "> wise words"]);
        assert!(lines[0].emphasis);
        assert!(!lines[2].emphasis);
    }

    #[test]
    fn test_render_paginates() {
        let exporter = PdfExporter::new(&ReaderSettings::default());
        let per_page = exporter.layout().lines_per_page;
        let markdown: String = (0..per_page * 2).map(|i| format!("line {i}\n\n")).collect();

        let mut calls = Vec::new();
        let bytes = exporter.render(&markdown, |page, total| calls.push((page, total)));

        assert!(bytes.starts_with(b"%PDF"));
        let lines = exporter.lay_out(&markdown).len();
        let expected = page_count(lines, per_page);
        assert_eq!(calls.len(), expected);
        assert_eq!(calls.last(), Some(&(expected, expected)));
        assert!(expected >= 4);
    }
}
