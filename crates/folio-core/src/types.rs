// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Folio transcoding pipeline.

use serde::{Deserialize, Serialize};

/// Millimetres per inch.
pub const MM_PER_INCH: f32 = 25.4;

/// PostScript points per millimetre.
pub const PT_PER_MM: f32 = 72.0 / MM_PER_INCH;

/// Named output paper presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    Letter,
    Legal,
}

impl PaperSize {
    /// Portrait dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match self {
            Self::A4 => (210.0, 297.0),
            Self::Letter => (215.9, 279.4),
            Self::Legal => (215.9, 355.6),
        }
    }

    /// Dimensions with width and height swapped when `landscape` is set.
    pub fn oriented_mm(&self, landscape: bool) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        if landscape { (h, w) } else { (w, h) }
    }

    /// Look up a preset by case-insensitive name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "a4" => Some(Self::A4),
            "letter" => Some(Self::Letter),
            "legal" => Some(Self::Legal),
            _ => None,
        }
    }
}

/// Physical size of one output page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputPageSize {
    pub width_mm: f32,
    pub height_mm: f32,
    /// True when the page content is wider than it is tall.
    pub landscape: bool,
}

impl OutputPageSize {
    /// Width in PDF points.
    pub fn width_pt(&self) -> f32 {
        self.width_mm * PT_PER_MM
    }

    /// Height in PDF points.
    pub fn height_pt(&self) -> f32 {
        self.height_mm * PT_PER_MM
    }
}

/// Ordered, distinct, 1-based page numbers bounded by a document's page count.
///
/// Always non-empty and strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSelection {
    pages: Vec<u32>,
}

impl PageSelection {
    /// Build a selection from arbitrary page numbers.
    ///
    /// Sorts and deduplicates. Returns `None` if the input is empty or any
    /// page lies outside `[1, page_count]`.
    pub fn from_pages(pages: impl IntoIterator<Item = u32>, page_count: u32) -> Option<Self> {
        let mut pages: Vec<u32> = pages.into_iter().collect();
        if pages.is_empty() || pages.iter().any(|&p| p == 0 || p > page_count) {
            return None;
        }
        pages.sort_unstable();
        pages.dedup();
        Some(Self { pages })
    }

    /// Every page of a document, `1..=page_count`.
    pub fn all(page_count: u32) -> Option<Self> {
        Self::from_pages(1..=page_count, page_count)
    }

    pub fn pages(&self) -> &[u32] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.iter().copied()
    }

    /// Keep only the first `limit` pages.
    ///
    /// Returns the truncation notice when pages were dropped. A limit of zero
    /// is treated as one so the selection stays non-empty.
    pub fn truncate(&mut self, limit: u32) -> Option<ResourceExhausted> {
        let limit = limit.max(1);
        let requested = self.pages.len() as u32;
        if requested <= limit {
            return None;
        }
        self.pages.truncate(limit as usize);
        Some(ResourceExhausted { limit, requested })
    }
}

/// Notice that a max-pages guard cut an operation short.
///
/// This is reported alongside a successful result, never as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceExhausted {
    /// The configured guard.
    pub limit: u32,
    /// How many pages (or outputs) the caller asked for.
    pub requested: u32,
}

impl std::fmt::Display for ResourceExhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "stopped after {} of {} pages (max-pages limit)",
            self.limit, self.requested
        )
    }
}

/// Progress emitted after each processed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub processed: u32,
    pub total: u32,
    /// 1-based page number just finished in its source document.
    pub current_page: u32,
}

impl Progress {
    /// Completion percentage in `0..=100`.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        (self.processed.min(self.total) * 100) / self.total
    }
}

/// Output image formats for rasterized pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    /// MIME type string.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }

    /// Infer the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_sorts_and_dedups() {
        let sel = PageSelection::from_pages([4, 2, 4, 1], 5).unwrap();
        assert_eq!(sel.pages(), &[1, 2, 4]);
    }

    #[test]
    fn selection_rejects_out_of_bounds() {
        assert!(PageSelection::from_pages([0, 1], 5).is_none());
        assert!(PageSelection::from_pages([6], 5).is_none());
        assert!(PageSelection::from_pages(Vec::new(), 5).is_none());
        assert!(PageSelection::all(0).is_none());
    }

    #[test]
    fn truncate_reports_notice() {
        let mut sel = PageSelection::all(10).unwrap();
        let notice = sel.truncate(3).unwrap();
        assert_eq!(sel.pages(), &[1, 2, 3]);
        assert_eq!(notice, ResourceExhausted { limit: 3, requested: 10 });
        assert!(sel.truncate(3).is_none());
    }

    #[test]
    fn landscape_preset_swaps() {
        assert_eq!(PaperSize::A4.oriented_mm(true), (297.0, 210.0));
        assert_eq!(PaperSize::from_name(" LETTER "), Some(PaperSize::Letter));
    }

    #[test]
    fn progress_percent() {
        let p = Progress {
            processed: 1,
            total: 4,
            current_page: 2,
        };
        assert_eq!(p.percent(), 25);
    }
}
