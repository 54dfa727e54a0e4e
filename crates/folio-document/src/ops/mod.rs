// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline operations: merge, split, compress, PDF to images, PDF to text
// and images to PDF.
//
// Every operation walks pages strictly in ascending order, holds at most one
// raster at a time, yields to the scheduler after each page and checks its
// run token before committing anything.

pub mod compress;
pub mod images;
pub mod merge;
pub mod split;
pub mod text;

use std::rc::Rc;

use folio_core::error::Result;
use folio_core::{AppConfig, Progress, ResourceExhausted, TranscodeSettings};
use tracing::debug;

use crate::backend::BackendBootstrap;
use crate::layout::{self, LayoutMode};
use crate::lifecycle::OpenedDocument;
use crate::loader::DocumentLoader;
use crate::pdf::{ComposeOptions, ComposedDocument};
use crate::raster::{self, RasterBuffer};
use crate::text::extract_lines;

pub use compress::CompressedPdf;
pub use split::{SplitMode, SplitOutput, SplitPart};

/// Receives per-page progress and human-readable status lines.
pub trait ProgressSink {
    fn page_done(&self, progress: Progress);

    fn status(&self, _message: &str) {}
}

impl<F: Fn(Progress)> ProgressSink for F {
    fn page_done(&self, progress: Progress) {
        self(progress)
    }
}

/// Takes each output file as soon as it is produced, so operations with
/// many outputs never hold more than one of them.
pub trait ArtifactSink<T> {
    fn deliver(&mut self, artifact: T) -> Result<()>;
}

impl<T> ArtifactSink<T> for Vec<T> {
    fn deliver(&mut self, artifact: T) -> Result<()> {
        self.push(artifact);
        Ok(())
    }
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn page_done(&self, _progress: Progress) {}
}

/// What a page was turned into.
#[derive(Debug, Clone)]
pub enum PageContent {
    Text(Vec<String>),
    Raster(RasterBuffer),
}

/// Which [`PageContent`] variant to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    Raster,
}

/// Result of an operation that ran to completion.
#[derive(Debug, Clone)]
pub struct OperationReport<T> {
    pub output: T,
    pub pages_processed: u32,
    /// Set when the max-pages guard cut the run short.
    pub truncated: Option<ResourceExhausted>,
}

/// Either a finished report or a run that a newer one replaced.
#[derive(Debug, Clone)]
pub enum RunOutcome<T> {
    Finished(OperationReport<T>),
    /// Results were discarded silently.
    Superseded,
}

impl<T> RunOutcome<T> {
    pub fn finished(self) -> Option<OperationReport<T>> {
        match self {
            Self::Finished(report) => Some(report),
            Self::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded)
    }
}

/// Runs pipeline operations against a shared loader.
pub struct Transcoder {
    loader: DocumentLoader,
    settings: TranscodeSettings,
}

impl Transcoder {
    pub fn new(loader: DocumentLoader, settings: TranscodeSettings) -> Self {
        Self { loader, settings }
    }

    /// Transcoder over a fresh bootstrap built from `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        let bootstrap = Rc::new(BackendBootstrap::new(config.backend.clone()));
        Self::new(DocumentLoader::new(bootstrap), config.transcode.clone())
    }

    pub fn loader(&self) -> &DocumentLoader {
        &self.loader
    }

    pub fn settings(&self) -> &TranscodeSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut TranscodeSettings {
        &mut self.settings
    }

    pub(crate) fn max_pages(&self) -> u32 {
        self.settings.max_pages.max(1)
    }

    pub(crate) fn compose_options(&self) -> ComposeOptions {
        ComposeOptions {
            margin_mm: self.settings.margin_mm(),
            quality: self.settings.quality(),
            title: self.settings.title.clone(),
        }
    }

    fn layout_mode(&self) -> LayoutMode {
        LayoutMode::from_settings(self.settings.layout, self.settings.landscape)
    }

    /// Produce one page's content: its lines of text, or its pixels at the
    /// configured scale (grayscaled when the settings ask for it).
    pub async fn page_content(
        &self,
        document: &OpenedDocument,
        number: u32,
        kind: ContentKind,
    ) -> Result<PageContent> {
        match kind {
            ContentKind::Raster => Ok(PageContent::Raster(self.rasterize(document, number).await?)),
            ContentKind::Text => Ok(PageContent::Text(self.page_text(document, number)?)),
        }
    }

    /// Render one source page to a raster.
    pub(crate) async fn rasterize(
        &self,
        document: &OpenedDocument,
        number: u32,
    ) -> Result<RasterBuffer> {
        let page = document.page(number)?;
        let mut buffer = raster::render(page.as_ref(), self.settings.scale()).await?;
        if self.settings.grayscale {
            raster::to_grayscale(&mut buffer);
        }
        Ok(buffer)
    }

    /// Extract one source page's text as lines.
    pub(crate) fn page_text(&self, document: &OpenedDocument, number: u32) -> Result<Vec<String>> {
        let page = document.page(number)?;
        let content = page.text_content().map_err(|err| {
            folio_core::FolioError::PdfError(format!("page {number} text: {err}"))
        })?;
        Ok(extract_lines(&content))
    }

    /// Append a rendered source page. Under fit-to-content the output page
    /// takes the source page's physical size, whatever the render scale.
    pub(crate) fn append_rendered(
        &self,
        composed: &mut ComposedDocument,
        buffer: &RasterBuffer,
    ) -> Result<()> {
        let Some((width_pt, height_pt)) = buffer.native_size() else {
            return self.append_at_dpi(composed, buffer, 72.0 * self.settings.scale());
        };
        let size = layout::resolve_native_size(self.layout_mode(), width_pt, height_pt);
        debug!(page = buffer.page(), ?size, "output page size resolved");
        composed.append_image_page(buffer, size)
    }

    /// Append a decoded input image, sized for the configured target DPI.
    pub(crate) fn append_decoded(
        &self,
        composed: &mut ComposedDocument,
        buffer: &RasterBuffer,
    ) -> Result<()> {
        self.append_at_dpi(composed, buffer, self.settings.target_dpi)
    }

    fn append_at_dpi(
        &self,
        composed: &mut ComposedDocument,
        buffer: &RasterBuffer,
        dpi: f32,
    ) -> Result<()> {
        let size = layout::resolve_size(self.layout_mode(), buffer.width(), buffer.height(), dpi);
        debug!(page = buffer.page(), ?size, "output page size resolved");
        composed.append_image_page(buffer, size)
    }
}

/// Progress after `processed` of `total` pages.
pub(crate) fn report_page(sink: &dyn ProgressSink, processed: u32, total: u32, current_page: u32) {
    sink.page_done(Progress {
        processed,
        total,
        current_page,
    });
    sink.status(&format!("Processed page {current_page} ({processed} of {total})"));
}
