// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text extractor: turns positioned text fragments into readable lines.

use crate::backend::TextContent;

/// Punctuation that attaches to the preceding fragment without a space.
const CLOSING_PUNCTUATION: [char; 7] = [',', '.', ';', ':', '!', '?', ')'];

/// Rebuild lines from a page's text fragments.
///
/// Fragments are joined with single spaces, except before closing
/// punctuation. A fragment flagged end-of-line flushes the running line if
/// it has content. Whatever remains at the end is flushed too.
pub fn extract_lines(content: &TextContent) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for fragment in &content.fragments {
        let text = fragment.text.trim();
        if !text.is_empty() {
            let attaches = text.starts_with(CLOSING_PUNCTUATION);
            if !current.is_empty() && !attaches {
                current.push(' ');
            }
            current.push_str(text);
        }

        if fragment.end_of_line && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
