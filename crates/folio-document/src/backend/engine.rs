// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Render engine traits: the seam between the pipeline and whichever backend
// (PDFium, the structural lopdf engine, or a test double) is active.

use image::RgbaImage;
use thiserror::Error;

use folio_core::error::OpenCause;

/// Failures reported by a render engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("unsupported document feature: {0}")]
    Unsupported(String),

    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("render surface unavailable: {0}")]
    RenderSurface(String),

    #[error("page {0} does not exist")]
    NoSuchPage(u32),

    #[error("{0}")]
    Other(String),
}

impl EngineError {
    /// Which open-failure category this error belongs to.
    pub fn open_cause(&self) -> OpenCause {
        match self {
            Self::Unsupported(_) => OpenCause::Unsupported,
            Self::Unreachable(_) => OpenCause::BackendUnreachable,
            _ => OpenCause::Malformed,
        }
    }
}

/// Options passed to [`RenderEngine::open`] by the loader's parse profiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenOptions<'a> {
    /// User password to try, if any.
    pub password: Option<&'a str>,
}

/// Identifier of one loader-level open, released through
/// [`RenderEngine::release_task`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

/// Pixel dimensions of a page at a given scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// `ceil(native × scale)` on each axis, never below one pixel.
    pub fn at_scale(native_width: f32, native_height: f32, scale: f32) -> Self {
        let dim = |native: f32| -> u32 {
            let scaled = (native as f64 * scale as f64).ceil();
            if scaled.is_finite() && scaled >= 1.0 {
                scaled.min(u32::MAX as f64) as u32
            } else {
                1
            }
        };
        Self {
            width: dim(native_width),
            height: dim(native_height),
        }
    }
}

/// One positioned run of text as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFragment {
    pub text: String,
    /// The layout places a line break after this fragment.
    pub end_of_line: bool,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, end_of_line: bool) -> Self {
        Self {
            text: text.into(),
            end_of_line,
        }
    }
}

/// Ordered text fragments of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextContent {
    pub fragments: Vec<TextFragment>,
}

/// A bound rendering backend able to open documents.
pub trait RenderEngine {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Parse `bytes` into a paged document.
    fn open(
        &self,
        bytes: &[u8],
        options: OpenOptions<'_>,
    ) -> Result<Box<dyn SourceDocument>, EngineError>;

    /// Loader-level disposal for one open. Engines without per-open state keep
    /// the default.
    fn release_task(&self, _task: TaskId) -> Result<(), EngineError> {
        Ok(())
    }
}

/// An opened document. Exclusively owned by one operation.
pub trait SourceDocument {
    fn page_count(&self) -> u32;

    /// Fetch a page by 1-based number. The handle borrows the document.
    fn page(&self, number: u32) -> Result<Box<dyn PageHandle + '_>, EngineError>;

    /// Document-level disposal.
    fn close(self: Box<Self>) -> Result<(), EngineError>;
}

/// One page of an opened document.
pub trait PageHandle {
    /// 1-based page number.
    fn number(&self) -> u32;

    /// Native page size in points (width, height).
    fn native_size(&self) -> (f32, f32);

    /// Pixel size of the page at `scale`.
    fn viewport(&self, scale: f32) -> Viewport {
        let (w, h) = self.native_size();
        Viewport::at_scale(w, h, scale)
    }

    /// Rasterize the whole page into an RGBA bitmap of the viewport's size.
    fn render(&self, viewport: Viewport) -> Result<RgbaImage, EngineError>;

    /// Positioned text runs in reading order.
    fn text_content(&self) -> Result<TextContent, EngineError>;
}
