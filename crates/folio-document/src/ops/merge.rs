// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Merge: every page of every source, in source order, into one PDF.

use folio_core::error::Result;
use folio_core::{FolioError, ResourceExhausted};
use tracing::{Instrument, debug_span, info, instrument, warn};

use super::{OperationReport, ProgressSink, RunOutcome, Transcoder, report_page};
use crate::pdf::ComposedDocument;
use crate::run::RunToken;

impl Transcoder {
    /// Merge `sources` into one raster-backed PDF.
    ///
    /// Every source is opened once up front to count its pages, so progress
    /// reports a fixed total. The max-pages guard counts pages across all
    /// sources and may stop in the middle of one; sources past the guard are
    /// not opened again.
    #[instrument(skip_all, fields(sources = sources.len()))]
    pub async fn merge<B: AsRef<[u8]>>(
        &self,
        sources: &[B],
        run: &RunToken,
        progress: &dyn ProgressSink,
    ) -> Result<RunOutcome<Vec<u8>>> {
        if sources.is_empty() {
            return Err(FolioError::NoInput);
        }

        let limit = self.max_pages();
        let mut counts = Vec::with_capacity(sources.len());
        for (index, source) in sources.iter().enumerate() {
            let document = self
                .loader()
                .open(source.as_ref())
                .instrument(debug_span!("count", source = index))
                .await?;
            counts.push(document.page_count());
            document.close();
        }
        let requested = counts.iter().fold(0u32, |sum, &n| sum.saturating_add(n));
        let total = requested.min(limit);

        let mut composed = ComposedDocument::new(self.compose_options());
        let mut processed = 0u32;

        for (index, (source, &count)) in sources.iter().zip(&counts).enumerate() {
            if processed >= limit {
                warn!(limit, skipped_from = index, "max-pages guard reached");
                break;
            }
            progress.status(&format!("Opening document {} of {}", index + 1, sources.len()));
            let document = self
                .loader()
                .open(source.as_ref())
                .instrument(debug_span!("merge", source = index))
                .await?;

            for number in 1..=count.min(document.page_count()) {
                if processed >= limit {
                    warn!(limit, source = index, page = number, "max-pages guard reached");
                    break;
                }

                let buffer = self.rasterize(&document, number).await?;
                if !run.is_current() {
                    return Ok(RunOutcome::Superseded);
                }
                self.append_rendered(&mut composed, &buffer)?;
                drop(buffer);

                processed += 1;
                report_page(progress, processed, total, number);
                tokio::task::yield_now().await;
            }

            document.close();
        }

        let output = composed.finish()?;
        if !run.is_current() {
            return Ok(RunOutcome::Superseded);
        }

        let truncated = (requested > processed).then_some(ResourceExhausted { limit, requested });
        info!(pages = processed, requested, output_bytes = output.len(), "merge complete");
        Ok(RunOutcome::Finished(OperationReport {
            output,
            pages_processed: processed,
            truncated,
        }))
    }
}
