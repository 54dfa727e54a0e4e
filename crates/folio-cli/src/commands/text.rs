// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use folio_core::{AppConfig, PaperSize};
use folio_document::TextDocument;
use tracing::{Instrument, info_span};

use super::{SettingsArgs, finished, out_dir, single_run, transcoder};
use crate::progress::BarSink;
use crate::sink::{DownloadSink, read_input, stem};

/// Export format for extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TextFormat {
    /// Plain UTF-8 text
    Txt,
    /// Word-compatible HTML
    Doc,
    /// Text re-typeset as a PDF
    Pdf,
}

impl TextFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Doc => "doc",
            Self::Pdf => "pdf",
        }
    }

    fn render(self, text: &TextDocument, paper: PaperSize) -> Vec<u8> {
        match self {
            Self::Txt => text.to_plain_text().into_bytes(),
            Self::Doc => text.to_word_html().into_bytes(),
            Self::Pdf => text.to_pdf(paper),
        }
    }
}

#[derive(Args)]
pub struct ToTextArgs {
    /// PDF to read
    input: PathBuf,

    /// Pages to read, e.g. "1-3, 7" or "all"
    #[arg(short, long, default_value = "all")]
    pages: String,

    /// Export format
    #[arg(short, long, value_enum, default_value = "txt")]
    format: TextFormat,

    /// Leave out the per-page markers
    #[arg(long)]
    no_headings: bool,

    /// Output directory
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    #[command(flatten)]
    settings: SettingsArgs,
}

pub async fn run(args: ToTextArgs, config: AppConfig) -> anyhow::Result<()> {
    let source = read_input(&args.input)?;
    let mut transcoder = transcoder(config, &args.settings);
    if args.no_headings {
        transcoder.settings_mut().page_headings = false;
    }
    let paper = transcoder.settings().layout.preset().unwrap_or(PaperSize::A4);
    let sink = DownloadSink::new(out_dir(&args.out_dir))?;
    let bar = BarSink::new();

    let outcome = transcoder
        .pdf_to_text(&source, &args.pages, &single_run(), &bar)
        .instrument(info_span!("input", path = %args.input.display()))
        .await?;
    let report = finished(outcome)?;
    bar.finish("extracted");

    let name = format!("{}.{}", stem(&args.input), args.format.extension());
    let path = sink.save(&name, &args.format.render(&report.output, paper))?;
    println!("{} pages -> {}", report.pages_processed, path.display());
    Ok(())
}
