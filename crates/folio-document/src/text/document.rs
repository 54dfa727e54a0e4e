// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text composer: accumulates per-page extracted text into one document and
// exports it as plain text, Word-compatible HTML, or a text PDF.

use folio_core::PaperSize;
use serde::Serialize;

use crate::pdf::TextPdfWriter;

/// Line emitted for a page that yielded no text.
pub const EMPTY_PAGE_PLACEHOLDER: &str = "[No extractable text on this page]";

/// Text of one source page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextBlock {
    pub page: u32,
    pub heading: bool,
    /// Never empty: a textless page holds the placeholder line.
    pub lines: Vec<String>,
}

/// Document-level text result built one page at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextDocument {
    title: Option<String>,
    blocks: Vec<TextBlock>,
}

impl TextDocument {
    pub fn new(title: Option<String>) -> Self {
        Self {
            title,
            blocks: Vec::new(),
        }
    }

    /// Append one page's lines, optionally under a page marker.
    pub fn append_text_page(&mut self, page: u32, lines: Vec<String>, include_heading: bool) {
        let lines = if lines.is_empty() {
            vec![EMPTY_PAGE_PLACEHOLDER.to_string()]
        } else {
            lines
        };
        self.blocks.push(TextBlock {
            page,
            heading: include_heading,
            lines,
        });
    }

    pub fn page_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn blocks(&self) -> &[TextBlock] {
        &self.blocks
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// All output lines: each block's marker and lines, then a blank
    /// separator line.
    pub fn lines(&self) -> Vec<String> {
        let mut out = Vec::new();
        for block in &self.blocks {
            if block.heading {
                out.push(page_marker(block.page));
            }
            out.extend(block.lines.iter().cloned());
            out.push(String::new());
        }
        out
    }

    pub fn to_plain_text(&self) -> String {
        self.lines().join("\n")
    }

    /// HTML that word processors open as a `.doc` file.
    pub fn to_word_html(&self) -> String {
        let title = escape_html(self.title.as_deref().unwrap_or("Extracted text"));
        let mut html = format!(
            "<html xmlns:o=\"urn:schemas-microsoft-com:office:office\" \
             xmlns:w=\"urn:schemas-microsoft-com:office:word\">\n\
             <head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n"
        );
        for block in &self.blocks {
            if block.heading {
                html.push_str(&format!("<h3>{}</h3>\n", escape_html(&page_marker(block.page))));
            }
            for line in &block.lines {
                html.push_str(&format!("<p>{}</p>\n", escape_html(line)));
            }
            html.push_str("<br>\n");
        }
        html.push_str("</body>\n</html>\n");
        html
    }

    /// Paginated text PDF on `paper`.
    pub fn to_pdf(&self, paper: PaperSize) -> Vec<u8> {
        let mut writer = TextPdfWriter::new(paper);
        if let Some(title) = &self.title {
            writer = writer.with_title(title.clone());
        }
        writer.write(&self.lines())
    }
}

fn page_marker(page: u32) -> String {
    format!("--- Page {page} ---")
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}
