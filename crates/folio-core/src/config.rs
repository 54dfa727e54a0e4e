// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{ImageFormat, PaperSize};

/// How output pages are sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageLayout {
    /// Derive the page size from the rasterized pixels and the target DPI.
    Fit,
    A4,
    Letter,
    Legal,
}

impl PageLayout {
    /// The named preset, if this is not `Fit`.
    pub fn preset(&self) -> Option<PaperSize> {
        match self {
            Self::Fit => None,
            Self::A4 => Some(PaperSize::A4),
            Self::Letter => Some(PaperSize::Letter),
            Self::Legal => Some(PaperSize::Legal),
        }
    }
}

/// Numeric controls shared by every transcoding operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodeSettings {
    /// Render scale as a percentage of the native page size.
    pub scale_percent: u32,
    /// Density used to turn pixels back into millimetres in `Fit` layout.
    pub target_dpi: f32,
    /// Lossy encoder quality in `0.0..=1.0`.
    pub quality: f32,
    /// Max-pages guard applied by each operation.
    pub max_pages: u32,
    /// Blank border around each embedded page image.
    pub margin_mm: f32,
    /// Convert rasterized pages to grayscale before encoding.
    pub grayscale: bool,
    pub layout: PageLayout,
    /// Swap preset dimensions for landscape output.
    pub landscape: bool,
    /// Format for PDF-to-image output.
    pub image_format: ImageFormat,
    /// Prefix each page's text with a page marker.
    pub page_headings: bool,
    /// Title written into composed documents.
    pub title: Option<String>,
}

impl Default for TranscodeSettings {
    fn default() -> Self {
        Self {
            scale_percent: 150,
            target_dpi: 150.0,
            quality: 0.85,
            max_pages: 200,
            margin_mm: 0.0,
            grayscale: false,
            layout: PageLayout::Fit,
            landscape: false,
            image_format: ImageFormat::Png,
            page_headings: true,
            title: None,
        }
    }
}

impl TranscodeSettings {
    /// Render scale multiplier, with the percentage clamped to `10..=500`.
    pub fn scale(&self) -> f32 {
        self.scale_percent.clamp(10, 500) as f32 / 100.0
    }

    /// Encoder quality clamped to `0.0..=1.0`.
    pub fn quality(&self) -> f32 {
        if self.quality.is_finite() {
            self.quality.clamp(0.0, 1.0)
        } else {
            TranscodeSettings::default().quality
        }
    }

    /// Non-negative margin.
    pub fn margin_mm(&self) -> f32 {
        if self.margin_mm.is_finite() {
            self.margin_mm.max(0.0)
        } else {
            0.0
        }
    }
}

/// Where to look for the page renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Directory holding the bundled renderer library. Defaults to the
    /// executable's directory.
    pub library_dir: Option<PathBuf>,
    /// Additional directories tried after the bundled location.
    pub mirror_dirs: Vec<PathBuf>,
    /// Try the system library search path.
    pub use_system_library: bool,
    /// Fall back to the built-in structural engine (page counts and text
    /// only) when no renderer can be loaded.
    pub structural_fallback: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            library_dir: None,
            mirror_dirs: vec![PathBuf::from(".pdfium")],
            use_system_library: true,
            structural_fallback: true,
        }
    }
}

/// Persistent application settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub transcode: TranscodeSettings,
    pub backend: BackendConfig,
}

impl AppConfig {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write settings as pretty-printed JSON.
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}
