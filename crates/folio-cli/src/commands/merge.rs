// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::path::PathBuf;

use clap::Args;
use folio_core::AppConfig;
use tracing::{Instrument, info_span};

use super::{SettingsArgs, finished, out_dir, single_run, transcoder};
use crate::progress::BarSink;
use crate::sink::{DownloadSink, read_inputs};

#[derive(Args)]
pub struct MergeArgs {
    /// PDFs to merge, in order
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Output file name
    #[arg(long, default_value = "merged.pdf")]
    name: String,

    #[command(flatten)]
    settings: SettingsArgs,
}

pub async fn run(args: MergeArgs, config: AppConfig) -> anyhow::Result<()> {
    let sources = read_inputs(&args.inputs)?;
    let transcoder = transcoder(config, &args.settings);
    let sink = DownloadSink::new(out_dir(&args.out_dir))?;
    let bar = BarSink::new();

    // Per-source events carry `source = N`, an index into `inputs`.
    let outcome = transcoder
        .merge(&sources, &single_run(), &bar)
        .instrument(info_span!("inputs", paths = ?args.inputs))
        .await?;
    let report = finished(outcome)?;
    bar.finish("merged");

    let path = sink.save(&args.name, &report.output)?;
    println!("{} pages -> {}", report.pages_processed, path.display());
    Ok(())
}
