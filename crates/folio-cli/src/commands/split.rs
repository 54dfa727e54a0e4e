// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::path::PathBuf;

use clap::Args;
use folio_core::AppConfig;
use folio_document::{SplitMode, SplitOutput};
use tracing::{Instrument, info_span};

use super::{SettingsArgs, finished, out_dir, single_run, transcoder};
use crate::progress::BarSink;
use crate::sink::{DownloadSink, read_input, stem};

#[derive(Args)]
pub struct SplitArgs {
    /// PDF to split
    input: PathBuf,

    /// Pages to keep, e.g. "1-3, 7" or "all"
    #[arg(short, long, default_value = "all")]
    pages: String,

    /// Write one PDF per selected page instead of one combined PDF
    #[arg(long)]
    burst: bool,

    /// Output directory
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    #[command(flatten)]
    settings: SettingsArgs,
}

pub async fn run(args: SplitArgs, config: AppConfig) -> anyhow::Result<()> {
    let source = read_input(&args.input)?;
    let transcoder = transcoder(config, &args.settings);
    let sink = DownloadSink::new(out_dir(&args.out_dir))?;
    let bar = BarSink::new();
    let mode = if args.burst {
        SplitMode::Burst
    } else {
        SplitMode::Extract
    };

    let base = stem(&args.input);
    let mut parts = sink.pages(&base);
    let outcome = transcoder
        .split(&source, &args.pages, mode, &single_run(), &bar, &mut parts)
        .instrument(info_span!("input", path = %args.input.display()))
        .await?;
    let report = finished(outcome)?;
    bar.finish("split");

    match report.output {
        SplitOutput::Extracted(bytes) => {
            let path = sink.save(&format!("{base}-pages.pdf"), &bytes)?;
            println!("{} pages -> {}", report.pages_processed, path.display());
        }
        SplitOutput::Burst(count) => {
            for (page, path) in parts.written() {
                println!("page {page} -> {}", path.display());
            }
            println!("{count} files written");
        }
    }
    Ok(())
}
