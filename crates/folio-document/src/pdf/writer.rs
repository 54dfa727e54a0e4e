// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text PDF writer: lays extracted text out on fixed-size pages using
// `printpdf` 0.8.
//
// printpdf 0.8 is data-oriented: each `PdfPage` holds a `Vec<Op>` and the
// document is serialised with `PdfDocument::save()`.

use folio_core::PaperSize;
use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, TextItem,
};
use tracing::{debug, instrument};

const FONT_SIZE_PT: f32 = 11.0;
const LINE_HEIGHT_PT: f32 = 14.0;
const MARGIN_MM: f32 = 20.0;
/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.50;

/// Writes plain lines of text as a paginated PDF.
#[derive(Debug, Clone)]
pub struct TextPdfWriter {
    paper: PaperSize,
    title: String,
}

impl TextPdfWriter {
    pub fn new(paper: PaperSize) -> Self {
        Self {
            paper,
            title: "Extracted text".to_string(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Lay out `lines` top to bottom in Helvetica, wrapping long lines and
    /// breaking pages as needed. An empty input still yields one blank page.
    #[instrument(skip(self, lines), fields(lines = lines.len(), paper = ?self.paper))]
    pub fn write(&self, lines: &[String]) -> Vec<u8> {
        let (w_mm, h_mm) = self.paper.dimensions_mm();
        let (page_w, page_h) = (Mm(w_mm), Mm(h_mm));

        let margin_pt = Mm(MARGIN_MM).into_pt().0;
        let page_h_pt = page_h.into_pt().0;
        let glyph_mm = AVG_GLYPH_EM * FONT_SIZE_PT / folio_core::PT_PER_MM;
        let max_chars = (((w_mm - 2.0 * MARGIN_MM) / glyph_mm) as usize).max(1);
        let lines_per_page = (((page_h_pt - 2.0 * margin_pt) / LINE_HEIGHT_PT) as usize).max(1);

        let wrapped: Vec<String> = lines
            .iter()
            .flat_map(|line| wrap_line(line, max_chars))
            .collect();

        let mut pages: Vec<PdfPage> = wrapped
            .chunks(lines_per_page)
            .map(|chunk| {
                let mut ops = Vec::with_capacity(chunk.len() * 5);
                for (row, line) in chunk.iter().enumerate() {
                    let y_pt = page_h_pt - margin_pt - row as f32 * LINE_HEIGHT_PT;
                    ops.push(Op::StartTextSection);
                    ops.push(Op::SetTextCursor {
                        pos: Point {
                            x: Pt(margin_pt),
                            y: Pt(y_pt),
                        },
                    });
                    ops.push(Op::SetFontSizeBuiltinFont {
                        size: Pt(FONT_SIZE_PT),
                        font: BuiltinFont::Helvetica,
                    });
                    ops.push(Op::WriteTextBuiltinFont {
                        items: vec![TextItem::Text(line.clone())],
                        font: BuiltinFont::Helvetica,
                    });
                    ops.push(Op::EndTextSection);
                }
                PdfPage::new(page_w, page_h, ops)
            })
            .collect();

        if pages.is_empty() {
            pages.push(PdfPage::new(page_w, page_h, Vec::new()));
        }

        let mut doc = PdfDocument::new(&self.title);
        doc.with_pages(pages);
        debug!(wrapped = wrapped.len(), pages = doc.pages.len(), "text laid out");

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        doc.save(&PdfSaveOptions::default(), &mut warnings)
    }
}

/// Word-wrap one line to at most `max_chars` characters per row.
///
/// Words longer than a row are broken on character boundaries. A blank line
/// stays a single blank row.
fn wrap_line(line: &str, max_chars: usize) -> Vec<String> {
    let mut rows = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in line.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                rows.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            let mut pieces = chars.chunks(max_chars).peekable();
            while let Some(piece) = pieces.next() {
                if pieces.peek().is_some() {
                    rows.push(piece.iter().collect());
                } else {
                    current = piece.iter().collect();
                    current_len = piece.len();
                }
            }
        } else if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            rows.push(std::mem::replace(&mut current, word.to_string()));
            current_len = word_len;
        }
    }

    if !current.is_empty() || rows.is_empty() {
        rows.push(current);
    }
    rows
}
