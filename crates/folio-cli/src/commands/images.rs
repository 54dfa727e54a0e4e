// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// to-images and from-images.

use std::path::PathBuf;

use clap::Args;
use folio_core::AppConfig;
use tracing::{Instrument, info_span};

use super::{FormatArg, SettingsArgs, finished, out_dir, single_run, transcoder};
use crate::progress::BarSink;
use crate::sink::{DownloadSink, read_input, read_inputs, stem};

#[derive(Args)]
pub struct ToImagesArgs {
    /// PDF to export
    input: PathBuf,

    /// Pages to export, e.g. "1-3, 7" or "all"
    #[arg(short, long, default_value = "all")]
    pages: String,

    /// Image format
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Output directory
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    #[command(flatten)]
    settings: SettingsArgs,
}

pub async fn run_to_images(args: ToImagesArgs, config: AppConfig) -> anyhow::Result<()> {
    let source = read_input(&args.input)?;
    let mut transcoder = transcoder(config, &args.settings);
    if let Some(format) = args.format {
        transcoder.settings_mut().image_format = format.into();
    }
    let sink = DownloadSink::new(out_dir(&args.out_dir))?;
    let bar = BarSink::new();

    let base = stem(&args.input);
    let mut pages = sink.pages(&base);
    let outcome = transcoder
        .pdf_to_images(&source, &args.pages, &single_run(), &bar, &mut pages)
        .instrument(info_span!("input", path = %args.input.display()))
        .await?;
    let report = finished(outcome)?;
    bar.finish("exported");

    for (page, path) in pages.written() {
        println!("page {page} -> {}", path.display());
    }
    println!("{} pages exported", report.pages_processed);
    Ok(())
}

#[derive(Args)]
pub struct FromImagesArgs {
    /// Images, one per output page, in order
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Output file name
    #[arg(long, default_value = "images.pdf")]
    name: String,

    #[command(flatten)]
    settings: SettingsArgs,
}

pub async fn run_from_images(args: FromImagesArgs, config: AppConfig) -> anyhow::Result<()> {
    let images = read_inputs(&args.inputs)?;
    let transcoder = transcoder(config, &args.settings);
    let sink = DownloadSink::new(out_dir(&args.out_dir))?;
    let bar = BarSink::new();

    let outcome = transcoder.images_to_pdf(&images, &single_run(), &bar).await?;
    let report = finished(outcome)?;
    bar.finish("composed");

    let path = sink.save(&args.name, &report.output)?;
    println!("{} pages -> {}", report.pages_processed, path.display());
    Ok(())
}
