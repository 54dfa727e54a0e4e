// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Renderer diagnostics: list candidates, find the first one that binds, and
// optionally open a sample document through the full loader ladder.

use std::path::PathBuf;
use std::rc::Rc;

use clap::Args;
use folio_core::AppConfig;
use folio_document::{BackendBootstrap, DocumentLoader};
use serde_json::json;
use tracing::debug;

use crate::sink::read_input;

#[derive(Args)]
pub struct BackendArgs {
    /// Also open this PDF and report which engine read it
    #[arg(long)]
    probe: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: BackendArgs, config: AppConfig) -> anyhow::Result<()> {
    let bootstrap = Rc::new(BackendBootstrap::new(config.backend));
    let candidates: Vec<String> = bootstrap
        .configure()
        .iter()
        .map(ToString::to_string)
        .collect();

    let bound = loop {
        match bootstrap.engine() {
            Ok((index, engine)) => break Some((index, engine.name().to_string())),
            Err(err) => {
                debug!(index = bootstrap.active_index(), error = %err, "candidate did not bind");
                if !bootstrap.advance() {
                    break None;
                }
            }
        }
    };

    let probe = match &args.probe {
        Some(path) => {
            let bytes = read_input(path)?;
            let document = DocumentLoader::new(Rc::clone(&bootstrap)).open(&bytes).await?;
            let summary = (document.engine_name().to_string(), document.page_count());
            document.close();
            Some(summary)
        }
        None => None,
    };

    if args.json {
        let report = json!({
            "candidates": candidates,
            "bound": bound.as_ref().map(|(index, name)| json!({ "index": index, "engine": name })),
            "probe": probe.as_ref().map(|(engine, pages)| json!({ "engine": engine, "pages": pages })),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for (index, candidate) in candidates.iter().enumerate() {
        let marker = match &bound {
            Some((bound_index, _)) if *bound_index == index => "*",
            _ => " ",
        };
        println!("{marker} {index}: {candidate}");
    }
    match &bound {
        Some((index, name)) => println!("active: candidate {index} ({name})"),
        None => println!("active: none, no renderer could be loaded"),
    }
    if let Some((engine, pages)) = probe {
        println!("probe: {pages} pages read by {engine}");
    }
    Ok(())
}
