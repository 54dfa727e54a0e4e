// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Folio.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a source document could not be opened.
///
/// Carried for diagnostics only: callers treat every `DocumentOpen` the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpenCause {
    /// The bytes are not a document of the expected format.
    Malformed,
    /// The document uses a feature we cannot handle (e.g. a user password).
    Unsupported,
    /// No rendering backend candidate could be reached.
    BackendUnreachable,
}

impl std::fmt::Display for OpenCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Malformed => "malformed document",
            Self::Unsupported => "unsupported document feature",
            Self::BackendUnreachable => "rendering backend unreachable",
        };
        f.write_str(label)
    }
}

/// Top-level error type for all Folio operations.
#[derive(Debug, Error)]
pub enum FolioError {
    // -- Source documents --
    #[error("could not open document ({cause}): {detail}")]
    DocumentOpen { cause: OpenCause, detail: String },

    #[error("invalid page selection: {0}")]
    InvalidPageRange(String),

    #[error("no input documents supplied")]
    NoInput,

    // -- Page processing --
    #[error("render surface unavailable for page {page}: {detail}")]
    RenderSurfaceUnavailable { page: u32, detail: String },

    #[error("could not encode page as {format}: {detail}")]
    EncodeFailure { format: String, detail: String },

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Output --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FolioError>;
