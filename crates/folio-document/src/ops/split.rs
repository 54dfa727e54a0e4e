// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Split: selected pages into one PDF, or one PDF per selected page.

use folio_core::error::Result;
use serde::Serialize;
use tracing::{info, instrument};

use super::{ArtifactSink, OperationReport, ProgressSink, RunOutcome, Transcoder, report_page};
use crate::pdf::ComposedDocument;
use crate::range;
use crate::run::RunToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SplitMode {
    /// All selected pages into one PDF.
    Extract,
    /// One single-page PDF per selected page.
    Burst,
}

/// One output file of a burst split.
#[derive(Debug, Clone)]
pub struct SplitPart {
    /// Source page number.
    pub page: u32,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum SplitOutput {
    /// The combined PDF of every selected page.
    Extracted(Vec<u8>),
    /// Number of single-page files handed to the part sink.
    Burst(u32),
}

impl Transcoder {
    /// Split `source` by `expression`.
    ///
    /// Burst hands each single-page PDF to `parts` as soon as it is written;
    /// Extract leaves `parts` untouched. The selection is truncated to the
    /// first N pages (Extract) or the first N output files (Burst).
    #[instrument(skip(self, source, run, progress, parts), fields(bytes_len = source.len()))]
    pub async fn split(
        &self,
        source: &[u8],
        expression: &str,
        mode: SplitMode,
        run: &RunToken,
        progress: &dyn ProgressSink,
        parts: &mut dyn ArtifactSink<SplitPart>,
    ) -> Result<RunOutcome<SplitOutput>> {
        let document = self.loader().open(source).await?;
        let mut selection = range::validate(expression, document.page_count())?;
        let truncated = selection.truncate(self.max_pages());
        let total = selection.len() as u32;

        let mut extracted = ComposedDocument::new(self.compose_options());

        for (done, number) in selection.iter().enumerate() {
            let buffer = self.rasterize(&document, number).await?;
            if !run.is_current() {
                return Ok(RunOutcome::Superseded);
            }

            match mode {
                SplitMode::Extract => self.append_rendered(&mut extracted, &buffer)?,
                SplitMode::Burst => {
                    let mut single = ComposedDocument::new(self.compose_options());
                    self.append_rendered(&mut single, &buffer)?;
                    parts.deliver(SplitPart {
                        page: number,
                        bytes: single.finish()?,
                    })?;
                }
            }
            drop(buffer);

            report_page(progress, done as u32 + 1, total, number);
            tokio::task::yield_now().await;
        }
        document.close();

        let output = match mode {
            SplitMode::Extract => SplitOutput::Extracted(extracted.finish()?),
            SplitMode::Burst => SplitOutput::Burst(total),
        };
        if !run.is_current() {
            return Ok(RunOutcome::Superseded);
        }

        info!(?mode, pages = total, "split complete");
        Ok(RunOutcome::Finished(OperationReport {
            output,
            pages_processed: total,
            truncated,
        }))
    }
}
