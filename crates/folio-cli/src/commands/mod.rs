// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommands and the settings flags they share.

pub mod backend;
pub mod compress;
pub mod images;
pub mod merge;
pub mod split;
pub mod text;

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use folio_core::{AppConfig, ImageFormat, PageLayout, TranscodeSettings};
use folio_document::{OperationReport, RunOutcome, RunTracker, Transcoder};
use tracing::{info, warn};

/// Load `path`, or the defaults when no file was given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => Ok(AppConfig::from_file(path)?),
        None => Ok(AppConfig::default()),
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LayoutArg {
    Fit,
    A4,
    Letter,
    Legal,
}

impl From<LayoutArg> for PageLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Fit => PageLayout::Fit,
            LayoutArg::A4 => PageLayout::A4,
            LayoutArg::Letter => PageLayout::Letter,
            LayoutArg::Legal => PageLayout::Legal,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Png,
    Jpeg,
    Webp,
}

impl From<FormatArg> for ImageFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Png => ImageFormat::Png,
            FormatArg::Jpeg => ImageFormat::Jpeg,
            FormatArg::Webp => ImageFormat::Webp,
        }
    }
}

/// Overrides for the configured transcode settings.
#[derive(Debug, Clone, Default, Args)]
pub struct SettingsArgs {
    /// Render scale in percent of the native page size
    #[arg(long)]
    pub scale: Option<u32>,

    /// Output resolution for image inputs
    #[arg(long)]
    pub dpi: Option<f32>,

    /// JPEG quality, 0 to 1
    #[arg(long)]
    pub quality: Option<f32>,

    /// Stop after this many pages
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Page margin in millimetres
    #[arg(long)]
    pub margin: Option<f32>,

    /// Convert pages to grayscale
    #[arg(long)]
    pub grayscale: bool,

    /// Output page size
    #[arg(long, value_enum)]
    pub layout: Option<LayoutArg>,

    /// Rotate preset page sizes to landscape
    #[arg(long)]
    pub landscape: bool,

    /// Document title written into outputs
    #[arg(long)]
    pub title: Option<String>,
}

impl SettingsArgs {
    pub fn apply(&self, settings: &mut TranscodeSettings) {
        if let Some(scale) = self.scale {
            settings.scale_percent = scale;
        }
        if let Some(dpi) = self.dpi {
            settings.target_dpi = dpi;
        }
        if let Some(quality) = self.quality {
            settings.quality = quality;
        }
        if let Some(max_pages) = self.max_pages {
            settings.max_pages = max_pages;
        }
        if let Some(margin) = self.margin {
            settings.margin_mm = margin;
        }
        if let Some(layout) = self.layout {
            settings.layout = layout.into();
        }
        if let Some(title) = &self.title {
            settings.title = Some(title.clone());
        }
        settings.grayscale |= self.grayscale;
        settings.landscape |= self.landscape;
    }
}

/// Transcoder for `config` with the command-line overrides applied.
pub fn transcoder(mut config: AppConfig, overrides: &SettingsArgs) -> Transcoder {
    overrides.apply(&mut config.transcode);
    Transcoder::from_config(&config)
}

/// One run per CLI invocation; nothing supersedes it.
pub fn single_run() -> folio_document::RunToken {
    RunTracker::new().begin()
}

/// Unwrap a finished run, logging a truncation notice if there is one.
pub fn finished<T>(outcome: RunOutcome<T>) -> anyhow::Result<OperationReport<T>> {
    let report = outcome
        .finished()
        .ok_or_else(|| anyhow::anyhow!("run was superseded before it finished"))?;
    if let Some(notice) = report.truncated {
        warn!(limit = notice.limit, requested = notice.requested, "{notice}");
        eprintln!("note: {notice}");
    }
    info!(pages = report.pages_processed, "operation finished");
    Ok(report)
}

/// Default output directory: the current one.
pub fn out_dir(dir: &Option<PathBuf>) -> PathBuf {
    dir.clone().unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_only_touch_given_fields() {
        let mut settings = TranscodeSettings::default();
        let args = SettingsArgs {
            scale: Some(200),
            layout: Some(LayoutArg::Letter),
            grayscale: true,
            ..SettingsArgs::default()
        };
        args.apply(&mut settings);

        assert_eq!(settings.scale_percent, 200);
        assert_eq!(settings.layout, PageLayout::Letter);
        assert!(settings.grayscale);
        assert_eq!(settings.max_pages, TranscodeSettings::default().max_pages);
        assert_eq!(settings.target_dpi, TranscodeSettings::default().target_dpi);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.json"))).is_err());
        assert_eq!(load_config(None).unwrap(), AppConfig::default());
    }

    #[test]
    fn config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.json");
        std::fs::write(&path, r#"{ "transcode": { "max_pages": 7 } }"#).unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.transcode.max_pages, 7);
    }

    #[test]
    fn superseded_outcome_is_an_error() {
        assert!(finished::<()>(RunOutcome::Superseded).is_err());
    }
}
