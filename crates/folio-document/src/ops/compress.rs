// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Compress: re-rasterize every page at the configured scale and JPEG
// quality.

use folio_core::PageSelection;
use folio_core::error::Result;
use tracing::{info, instrument};

use super::{OperationReport, ProgressSink, RunOutcome, Transcoder, report_page};
use crate::pdf::ComposedDocument;
use crate::run::RunToken;

/// A recompressed PDF and its size change.
#[derive(Debug, Clone)]
pub struct CompressedPdf {
    pub bytes: Vec<u8>,
    pub original_size: usize,
    pub compressed_size: usize,
}

impl CompressedPdf {
    /// Compressed size as a fraction of the original.
    pub fn ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 1.0;
        }
        self.compressed_size as f64 / self.original_size as f64
    }
}

impl Transcoder {
    /// Rebuild `source` from JPEG page images. Only the first N pages are
    /// kept when the max-pages guard applies.
    #[instrument(skip_all, fields(bytes_len = source.len()))]
    pub async fn compress(
        &self,
        source: &[u8],
        run: &RunToken,
        progress: &dyn ProgressSink,
    ) -> Result<RunOutcome<CompressedPdf>> {
        let document = self.loader().open(source).await?;
        let mut selection = PageSelection::all(document.page_count()).ok_or_else(|| {
            folio_core::FolioError::InvalidPageRange("document has no pages".into())
        })?;
        let truncated = selection.truncate(self.max_pages());
        let total = selection.len() as u32;

        let mut composed = ComposedDocument::new(self.compose_options());
        for (done, number) in selection.iter().enumerate() {
            let buffer = self.rasterize(&document, number).await?;
            if !run.is_current() {
                return Ok(RunOutcome::Superseded);
            }
            self.append_rendered(&mut composed, &buffer)?;
            drop(buffer);

            report_page(progress, done as u32 + 1, total, number);
            tokio::task::yield_now().await;
        }
        document.close();

        let bytes = composed.finish()?;
        if !run.is_current() {
            return Ok(RunOutcome::Superseded);
        }

        let output = CompressedPdf {
            original_size: source.len(),
            compressed_size: bytes.len(),
            bytes,
        };
        info!(
            pages = total,
            original = output.original_size,
            compressed = output.compressed_size,
            "compress complete"
        );
        Ok(RunOutcome::Finished(OperationReport {
            output,
            pages_processed: total,
            truncated,
        }))
    }
}
