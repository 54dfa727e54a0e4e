// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// File-bytes provider and download sink.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use folio_core::error::Result;
use folio_document::{ArtifactSink, EncodedImage, SplitPart};
use tracing::info;

/// Read one input file in full.
pub fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading {}", path.display()))
}

/// Read each input file in full, in the order given.
pub fn read_inputs(paths: &[PathBuf]) -> anyhow::Result<Vec<Vec<u8>>> {
    paths.iter().map(|path| read_input(path)).collect()
}

/// File stem used to name outputs derived from `path`.
pub fn stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("document")
        .to_string()
}

/// Writes finished outputs into one directory.
#[derive(Debug, Clone)]
pub struct DownloadSink {
    dir: PathBuf,
}

impl DownloadSink {
    /// Create the directory if it does not exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Write `bytes` as `name` and return the full path. Directory parts of
    /// `name` are dropped.
    pub fn write(&self, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let file_name = Path::new(name).file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("output name {name:?} has no file name"),
            )
        })?;
        let path = self.dir.join(file_name);
        fs::write(&path, bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "output written");
        Ok(path)
    }

    /// [`write`](Self::write) with the target name in the error chain.
    pub fn save(&self, name: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
        self.write(name, bytes)
            .with_context(|| format!("writing {name} into {}", self.dir.display()))
    }

    /// Artifact sink that writes each delivered file as `<base>-page-N.<ext>`.
    pub fn pages<'a>(&'a self, base: &'a str) -> PageFiles<'a> {
        PageFiles {
            sink: self,
            base,
            written: Vec::new(),
        }
    }
}

/// Writes per-page artifacts as they arrive and remembers where they went.
pub struct PageFiles<'a> {
    sink: &'a DownloadSink,
    base: &'a str,
    written: Vec<(u32, PathBuf)>,
}

impl PageFiles<'_> {
    fn save_page(&mut self, page: u32, extension: &str, bytes: &[u8]) -> Result<()> {
        let path = self
            .sink
            .write(&format!("{}-page-{page}.{extension}", self.base), bytes)?;
        self.written.push((page, path));
        Ok(())
    }

    /// Source page number and path of every file written so far.
    pub fn written(&self) -> &[(u32, PathBuf)] {
        &self.written
    }
}

impl ArtifactSink<SplitPart> for PageFiles<'_> {
    fn deliver(&mut self, part: SplitPart) -> Result<()> {
        self.save_page(part.page, "pdf", &part.bytes)
    }
}

impl ArtifactSink<EncodedImage> for PageFiles<'_> {
    fn deliver(&mut self, image: EncodedImage) -> Result<()> {
        info!(page = image.page, width = image.width, height = image.height, "page exported");
        self.save_page(image.page, image.format.extension(), &image.bytes)
    }
}
