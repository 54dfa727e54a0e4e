// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDFium engine: binds the runtime-loaded PDFium library from a candidate
// location and adapts it to the engine traits.

use std::rc::Rc;

use image::RgbaImage;
use pdfium_render::prelude::*;
use tracing::{debug, instrument};

use super::bootstrap::{BackendCandidate, CandidateKind};
use super::engine::{
    EngineError, OpenOptions, PageHandle, RenderEngine, SourceDocument, TextContent,
    TextFragment, Viewport,
};

/// Bind PDFium from the candidate's location.
///
/// The bindings are leaked: the bootstrap binds at most once per candidate
/// and the library must outlive every document opened through it.
pub fn bind(candidate: &BackendCandidate) -> Result<Rc<dyn RenderEngine>, EngineError> {
    let bindings = match &candidate.kind {
        CandidateKind::Bundled(dir) | CandidateKind::Mirror(dir) => {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
        }
        CandidateKind::System => Pdfium::bind_to_system_library(),
        CandidateKind::Structural => {
            return Err(EngineError::Unreachable(
                "structural candidate is not a PDFium location".into(),
            ));
        }
    }
    .map_err(|err| EngineError::Unreachable(format!("{candidate}: {err}")))?;

    let pdfium: &'static Pdfium = Box::leak(Box::new(Pdfium::new(bindings)));
    debug!(candidate = %candidate, "PDFium bound");
    Ok(Rc::new(PdfiumEngine { pdfium }))
}

pub struct PdfiumEngine {
    pdfium: &'static Pdfium,
}

impl RenderEngine for PdfiumEngine {
    fn name(&self) -> &str {
        "pdfium"
    }

    #[instrument(skip_all, fields(bytes_len = bytes.len()))]
    fn open(
        &self,
        bytes: &[u8],
        options: OpenOptions<'_>,
    ) -> Result<Box<dyn SourceDocument>, EngineError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_vec(bytes.to_vec(), options.password)
            .map_err(classify)?;
        Ok(Box::new(PdfiumDocument { document }))
    }
}

fn classify(err: PdfiumError) -> EngineError {
    match err {
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
            EngineError::Unsupported("document is password-protected".into())
        }
        other => EngineError::Malformed(other.to_string()),
    }
}

struct PdfiumDocument {
    document: PdfDocument<'static>,
}

impl SourceDocument for PdfiumDocument {
    fn page_count(&self) -> u32 {
        self.document.pages().len() as u32
    }

    fn page(&self, number: u32) -> Result<Box<dyn PageHandle + '_>, EngineError> {
        let index = number
            .checked_sub(1)
            .and_then(|index| PdfPageIndex::try_from(index).ok())
            .ok_or(EngineError::NoSuchPage(number))?;
        let page = self
            .document
            .pages()
            .get(index)
            .map_err(|_| EngineError::NoSuchPage(number))?;
        Ok(Box::new(PdfiumPage { page, number }))
    }

    fn close(self: Box<Self>) -> Result<(), EngineError> {
        drop(self.document);
        Ok(())
    }
}

struct PdfiumPage {
    page: PdfPage<'static>,
    number: u32,
}

impl PageHandle for PdfiumPage {
    fn number(&self) -> u32 {
        self.number
    }

    fn native_size(&self) -> (f32, f32) {
        (self.page.width().value, self.page.height().value)
    }

    fn render(&self, viewport: Viewport) -> Result<RgbaImage, EngineError> {
        let config = PdfRenderConfig::new()
            .set_target_width(viewport.width as i32)
            .set_target_height(viewport.height as i32)
            .render_form_data(true)
            .render_annotations(true)
            .set_reverse_byte_order(false)
            .set_format(PdfBitmapFormat::BGRA);

        let bitmap = self
            .page
            .render_with_config(&config)
            .map_err(|err| EngineError::RenderSurface(err.to_string()))?;

        let width = bitmap.width().max(0) as usize;
        let height = bitmap.height().max(0) as usize;
        let src = bitmap.as_raw_bytes();
        let stride = if height == 0 { 0 } else { src.len() / height };

        let mut pixels = Vec::with_capacity(width.saturating_mul(height).saturating_mul(4));
        for y in 0..height {
            let base = y.saturating_mul(stride);
            for x in 0..width {
                let idx = base.saturating_add(x.saturating_mul(4));
                let b = src.get(idx).copied().unwrap_or(255);
                let g = src.get(idx + 1).copied().unwrap_or(255);
                let r = src.get(idx + 2).copied().unwrap_or(255);
                let a = src.get(idx + 3).copied().unwrap_or(255);
                pixels.extend_from_slice(&[r, g, b, a]);
            }
        }

        // Any rounding against the viewport is normalised by the rasterizer.
        RgbaImage::from_raw(width as u32, height as u32, pixels).ok_or_else(|| {
            EngineError::RenderSurface(format!("bitmap of {width}x{height} has wrong length"))
        })
    }

    fn text_content(&self) -> Result<TextContent, EngineError> {
        let text = self
            .page
            .text()
            .map_err(|err| EngineError::Other(format!("page {}: {err}", self.number)))?
            .all();
        let fragments = text
            .lines()
            .map(|line| TextFragment::new(line, true))
            .collect();
        Ok(TextContent { fragments })
    }
}
