// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Terminal progress channel.

use folio_core::Progress;
use folio_document::ProgressSink;
use indicatif::{ProgressBar, ProgressStyle};

/// Drives an `indicatif` bar from pipeline progress updates.
pub struct BarSink {
    bar: ProgressBar,
}

impl BarSink {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        bar.set_style(style);
        Self { bar }
    }

    /// Hidden bar, for tests and non-interactive output.
    #[cfg(test)]
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    #[cfg(test)]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl ProgressSink for BarSink {
    fn page_done(&self, progress: Progress) {
        self.bar.set_length(u64::from(progress.total));
        self.bar.set_position(u64::from(progress.processed));
    }

    fn status(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }
}
