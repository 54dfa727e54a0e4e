// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// folio: merge, split, compress and convert PDFs one page at a time.

mod commands;
mod progress;
mod sink;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use folio_core::FolioError;
use folio_core::human_errors::humanize_error;
use tracing_subscriber::EnvFilter;

use commands::{backend, compress, images, merge, split, text};

/// Page-at-a-time PDF transcoding.
#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// JSON settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge several PDFs into one
    Merge(merge::MergeArgs),

    /// Extract selected pages, or burst them into one file each
    Split(split::SplitArgs),

    /// Re-render every page as JPEG at a lower scale
    Compress(compress::CompressArgs),

    /// Export selected pages as images
    ToImages(images::ToImagesArgs),

    /// Extract the text of selected pages
    ToText(text::ToTextArgs),

    /// Build a PDF with one page per image
    FromImages(images::FromImagesArgs),

    /// List renderer candidates and show which one binds
    Backend(backend::BackendArgs),
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Engines are single-threaded (`Rc`), so operations run on one thread.
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("error: could not start runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_failure(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = commands::load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Merge(args) => merge::run(args, config).await,
        Commands::Split(args) => split::run(args, config).await,
        Commands::Compress(args) => compress::run(args, config).await,
        Commands::ToImages(args) => images::run_to_images(args, config).await,
        Commands::ToText(args) => text::run(args, config).await,
        Commands::FromImages(args) => images::run_from_images(args, config).await,
        Commands::Backend(args) => backend::run(args, config).await,
    }
}

/// Pipeline failures are shown as the humanized status line; anything else
/// (bad paths, unwritable output) as the error chain.
fn report_failure(err: &anyhow::Error) {
    match err.downcast_ref::<FolioError>() {
        Some(folio) => {
            tracing::debug!(error = %folio, "operation failed");
            eprintln!("{}", humanize_error(folio).status_line());
        }
        None => eprintln!("error: {err:#}"),
    }
}
