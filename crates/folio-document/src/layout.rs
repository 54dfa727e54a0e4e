// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout resolver: physical output page size for one rasterized page.

use folio_core::{MM_PER_INCH, OutputPageSize, PT_PER_MM, PageLayout};

/// Accepted target density range.
pub const MIN_DPI: f32 = 72.0;
pub const MAX_DPI: f32 = 300.0;
pub const DEFAULT_DPI: f32 = 150.0;

/// Accepted physical page edge range in millimetres.
pub const MIN_PAGE_MM: f32 = 30.0;
pub const MAX_PAGE_MM: f32 = 1200.0;

/// How output pages are sized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutMode {
    /// Fixed dimensions. Callers wanting landscape pass them already swapped.
    Preset { width_mm: f32, height_mm: f32 },
    /// Size derived from the raster's pixel size and the target DPI.
    FitToContent,
}

impl LayoutMode {
    /// Mode for a configured layout and orientation.
    pub fn from_settings(layout: PageLayout, landscape: bool) -> Self {
        match layout.preset() {
            Some(paper) => {
                let (width_mm, height_mm) = paper.oriented_mm(landscape);
                Self::Preset {
                    width_mm,
                    height_mm,
                }
            }
            None => Self::FitToContent,
        }
    }
}

/// Clamp a DPI into `[72, 300]`; non-finite input uses the default.
pub fn clamp_dpi(dpi: f32) -> f32 {
    if dpi.is_finite() {
        dpi.clamp(MIN_DPI, MAX_DPI)
    } else {
        DEFAULT_DPI
    }
}

/// Resolve the output page size for a `pixel_width × pixel_height` raster.
///
/// `landscape` always reflects the content (`pixel_width > pixel_height`),
/// never the preset.
pub fn resolve_size(
    mode: LayoutMode,
    pixel_width: u32,
    pixel_height: u32,
    target_dpi: f32,
) -> OutputPageSize {
    let landscape = pixel_width > pixel_height;
    match mode {
        LayoutMode::Preset {
            width_mm,
            height_mm,
        } => OutputPageSize {
            width_mm,
            height_mm,
            landscape,
        },
        LayoutMode::FitToContent => {
            let dpi = clamp_dpi(target_dpi);
            let to_mm = |px: u32| (px as f32 * MM_PER_INCH / dpi).clamp(MIN_PAGE_MM, MAX_PAGE_MM);
            OutputPageSize {
                width_mm: to_mm(pixel_width),
                height_mm: to_mm(pixel_height),
                landscape,
            }
        }
    }
}

/// Resolve the output page size for a page whose source measures
/// `width_pt × height_pt` points.
///
/// Fit-to-content keeps the source's physical size whatever scale it was
/// rendered at, clamped to the page-size bounds.
pub fn resolve_native_size(mode: LayoutMode, width_pt: f32, height_pt: f32) -> OutputPageSize {
    let landscape = width_pt > height_pt;
    match mode {
        LayoutMode::Preset {
            width_mm,
            height_mm,
        } => OutputPageSize {
            width_mm,
            height_mm,
            landscape,
        },
        LayoutMode::FitToContent => {
            let to_mm = |pt: f32| {
                let mm = pt / PT_PER_MM;
                if mm.is_finite() {
                    mm.clamp(MIN_PAGE_MM, MAX_PAGE_MM)
                } else {
                    MIN_PAGE_MM
                }
            };
            OutputPageSize {
                width_mm: to_mm(width_pt),
                height_mm: to_mm(height_pt),
                landscape,
            }
        }
    }
}
