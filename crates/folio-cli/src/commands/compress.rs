// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::path::PathBuf;

use clap::Args;
use folio_core::AppConfig;
use tracing::{Instrument, info_span};

use super::{SettingsArgs, finished, out_dir, single_run, transcoder};
use crate::progress::BarSink;
use crate::sink::{DownloadSink, read_input, stem};

#[derive(Args)]
pub struct CompressArgs {
    /// PDF to compress
    input: PathBuf,

    /// Output directory
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    #[command(flatten)]
    settings: SettingsArgs,
}

pub async fn run(args: CompressArgs, config: AppConfig) -> anyhow::Result<()> {
    let source = read_input(&args.input)?;
    let transcoder = transcoder(config, &args.settings);
    let sink = DownloadSink::new(out_dir(&args.out_dir))?;
    let bar = BarSink::new();

    let outcome = transcoder
        .compress(&source, &single_run(), &bar)
        .instrument(info_span!("input", path = %args.input.display()))
        .await?;
    let report = finished(outcome)?;
    bar.finish("compressed");

    let compressed = report.output;
    let path = sink.save(
        &format!("{}-compressed.pdf", stem(&args.input)),
        &compressed.bytes,
    )?;
    println!(
        "{} -> {} bytes ({:.0}%) -> {}",
        compressed.original_size,
        compressed.compressed_size,
        compressed.ratio() * 100.0,
        path.display()
    );
    Ok(())
}
