// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF to text.

use folio_core::error::Result;
use tracing::{info, instrument};

use super::{OperationReport, ProgressSink, RunOutcome, Transcoder, report_page};
use crate::range;
use crate::run::RunToken;
use crate::text::TextDocument;

impl Transcoder {
    /// Extract the text of each selected page into one text document.
    ///
    /// Pages without text still contribute a placeholder line, so the result
    /// always has one block per processed page.
    #[instrument(skip(self, source, run, progress), fields(bytes_len = source.len()))]
    pub async fn pdf_to_text(
        &self,
        source: &[u8],
        expression: &str,
        run: &RunToken,
        progress: &dyn ProgressSink,
    ) -> Result<RunOutcome<TextDocument>> {
        let document = self.loader().open(source).await?;
        let mut selection = range::validate(expression, document.page_count())?;
        let truncated = selection.truncate(self.max_pages());
        let total = selection.len() as u32;
        let headings = self.settings().page_headings;

        let mut text = TextDocument::new(self.settings().title.clone());
        for (done, number) in selection.iter().enumerate() {
            let lines = self.page_text(&document, number)?;
            if !run.is_current() {
                return Ok(RunOutcome::Superseded);
            }
            text.append_text_page(number, lines, headings);

            report_page(progress, done as u32 + 1, total, number);
            tokio::task::yield_now().await;
        }
        document.close();

        info!(pages = total, "text extracted");
        Ok(RunOutcome::Finished(OperationReport {
            output: text,
            pages_processed: total,
            truncated,
        }))
    }
}
