// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page range resolver: parses expressions such as "all", "5" or "1-3,7".
//
// Validation fails closed: one bad token rejects the whole expression and no
// partial selection is ever returned.

use std::collections::BTreeSet;

use folio_core::error::Result;
use folio_core::{FolioError, PageSelection};

/// Parse `expression` against a document of `page_count` pages.
///
/// Returns the sorted, deduplicated selection, or the reason it was rejected.
///
/// ```
/// use folio_document::range::validate;
///
/// assert_eq!(validate("3, 1-2, 2", 5).unwrap().pages(), &[1, 2, 3]);
/// assert!(validate("1-3,99", 10).is_err());
/// ```
pub fn validate(expression: &str, page_count: u32) -> Result<PageSelection> {
    let invalid = |reason: String| FolioError::InvalidPageRange(reason);

    if page_count == 0 {
        return Err(invalid("document has no pages".into()));
    }

    let expression = expression.trim();
    if expression.is_empty() {
        return Err(invalid("page range cannot be empty".into()));
    }
    if expression.eq_ignore_ascii_case("all") {
        return PageSelection::all(page_count)
            .ok_or_else(|| invalid("document has no pages".into()));
    }

    let mut pages = BTreeSet::new();
    for token in expression.split(',') {
        let token = token.trim();
        if token.is_empty() {
            return Err(invalid(format!("empty entry in \"{expression}\"")));
        }

        let (start, end) = match token.split_once('-') {
            Some((start, end)) => (parse_page(start, token)?, parse_page(end, token)?),
            None => {
                let page = parse_page(token, token)?;
                (page, page)
            }
        };

        if start > end {
            return Err(invalid(format!("range {start}-{end} runs backwards")));
        }
        if start < 1 {
            return Err(invalid(format!("page numbers start at 1, got {start}")));
        }
        if end > page_count {
            return Err(invalid(format!(
                "page {end} exceeds the document's {page_count} pages"
            )));
        }
        pages.extend(start..=end);
    }

    PageSelection::from_pages(pages, page_count)
        .ok_or_else(|| invalid(format!("\"{expression}\" selects no pages")))
}

/// Like [`validate`], but returns `None` on any invalid expression.
pub fn resolve(expression: &str, page_count: u32) -> Option<PageSelection> {
    validate(expression, page_count).ok()
}

fn parse_page(text: &str, token: &str) -> Result<u32> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FolioError::InvalidPageRange(format!(
            "\"{token}\" is not a page number or range"
        )));
    }
    text.parse::<u32>().map_err(|_| {
        FolioError::InvalidPageRange(format!("\"{token}\" is out of range"))
    })
}
