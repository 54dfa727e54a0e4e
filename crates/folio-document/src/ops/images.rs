// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF to images, and images to PDF.

use folio_core::error::Result;
use folio_core::{FolioError, ResourceExhausted};
use tracing::{info, instrument};

use super::{ArtifactSink, OperationReport, ProgressSink, RunOutcome, Transcoder, report_page};
use crate::pdf::ComposedDocument;
use crate::range;
use crate::raster::{self, EncodedImage, RasterBuffer};
use crate::run::RunToken;

impl Transcoder {
    /// Encode each selected page as an image in the configured format and
    /// hand it to `output` as soon as it is ready.
    ///
    /// Formats that cannot take a page fall back to PNG; each image records
    /// the format actually written. Images delivered before a run is
    /// superseded stay delivered.
    #[instrument(skip(self, source, run, progress, output), fields(bytes_len = source.len()))]
    pub async fn pdf_to_images(
        &self,
        source: &[u8],
        expression: &str,
        run: &RunToken,
        progress: &dyn ProgressSink,
        output: &mut dyn ArtifactSink<EncodedImage>,
    ) -> Result<RunOutcome<()>> {
        let document = self.loader().open(source).await?;
        let mut selection = range::validate(expression, document.page_count())?;
        let truncated = selection.truncate(self.max_pages());
        let total = selection.len() as u32;
        let format = self.settings().image_format;
        let quality = self.settings().quality();

        for (done, number) in selection.iter().enumerate() {
            let buffer = self.rasterize(&document, number).await?;
            let encoded = raster::encode(&buffer, format, quality)?;
            drop(buffer);
            tokio::task::yield_now().await;

            if !run.is_current() {
                return Ok(RunOutcome::Superseded);
            }
            output.deliver(encoded)?;
            report_page(progress, done as u32 + 1, total, number);
        }
        document.close();

        info!(pages = total, ?format, "pages exported as images");
        Ok(RunOutcome::Finished(OperationReport {
            output: (),
            pages_processed: total,
            truncated,
        }))
    }

    /// Build a PDF with one page per input image, in input order.
    ///
    /// No source document is opened, so the loader is not involved. Only the
    /// first N images are used when the max-pages guard applies.
    #[instrument(skip_all, fields(images = images.len()))]
    pub async fn images_to_pdf<B: AsRef<[u8]>>(
        &self,
        images: &[B],
        run: &RunToken,
        progress: &dyn ProgressSink,
    ) -> Result<RunOutcome<Vec<u8>>> {
        if images.is_empty() {
            return Err(FolioError::NoInput);
        }

        let limit = self.max_pages();
        let requested = images.len() as u32;
        let used = requested.min(limit);
        let truncated = (requested > limit).then_some(ResourceExhausted { limit, requested });

        let mut composed = ComposedDocument::new(self.compose_options());
        for (index, data) in images.iter().take(used as usize).enumerate() {
            let number = index as u32 + 1;
            let mut buffer = RasterBuffer::decode(number, data.as_ref())?;
            if self.settings().grayscale {
                raster::to_grayscale(&mut buffer);
            }
            if !run.is_current() {
                return Ok(RunOutcome::Superseded);
            }
            self.append_decoded(&mut composed, &buffer)?;
            drop(buffer);

            report_page(progress, number, used, number);
            tokio::task::yield_now().await;
        }

        let output = composed.finish()?;
        if !run.is_current() {
            return Ok(RunOutcome::Superseded);
        }

        info!(pages = used, output_bytes = output.len(), "images composed into PDF");
        Ok(RunOutcome::Finished(OperationReport {
            output,
            pages_processed: used,
            truncated,
        }))
    }
}
