// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable status messages for failed operations.
//
// Every technical error collapses into one of three user-facing categories:
// the file could not be read, the page selection is invalid, or processing
// failed (with a hint to reduce the page range or resolution).

use crate::error::FolioError;

/// User-facing category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// The input could not be opened or decoded.
    CouldNotRead,
    /// The page-selection expression was rejected.
    InvalidSelection,
    /// Anything that went wrong while rendering, encoding, or writing.
    ProcessingFailed,
}

/// A human-readable error with a plain message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as the status line).
    pub message: String,
    /// What the user should try next.
    pub suggestion: String,
    /// Which of the three status categories this falls into.
    pub kind: StatusKind,
}

impl HumanError {
    fn could_not_read(suggestion: impl Into<String>) -> Self {
        Self {
            message: "Could not read this file.".into(),
            suggestion: suggestion.into(),
            kind: StatusKind::CouldNotRead,
        }
    }

    fn processing_failed() -> Self {
        Self {
            message: "Processing failed.".into(),
            suggestion: "Try a smaller page range or a lower resolution.".into(),
            kind: StatusKind::ProcessingFailed,
        }
    }

    /// Single status line combining message and suggestion.
    pub fn status_line(&self) -> String {
        format!("{} {}", self.message, self.suggestion)
    }
}

/// Convert a `FolioError` into the status shown to the user.
pub fn humanize_error(err: &FolioError) -> HumanError {
    match err {
        FolioError::DocumentOpen { cause, .. } => {
            use crate::error::OpenCause;
            match cause {
                OpenCause::Unsupported => HumanError::could_not_read(
                    "The document may be password-protected. Remove the password and try again.",
                ),
                OpenCause::BackendUnreachable => HumanError::could_not_read(
                    "The PDF renderer could not be loaded. Check the renderer installation and try again.",
                ),
                OpenCause::Malformed => HumanError::could_not_read(
                    "The file may be damaged or is not a PDF. Try opening it in another viewer first.",
                ),
            }
        }

        FolioError::ImageError(_) => HumanError::could_not_read(
            "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.",
        ),

        FolioError::NoInput => HumanError::could_not_read("Choose at least one file and try again."),

        FolioError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError::could_not_read(
                "It may have been moved or deleted. Try choosing the file again.",
            ),
            std::io::ErrorKind::PermissionDenied => HumanError::could_not_read(
                "Check the file permissions, or copy the file somewhere else first.",
            ),
            _ => HumanError::processing_failed(),
        },

        FolioError::InvalidPageRange(detail) => HumanError {
            message: "Invalid page selection.".into(),
            suggestion: format!(
                "Use \"all\", a page number, a range like 2-5, or a list like 1,3,7-9. ({detail})"
            ),
            kind: StatusKind::InvalidSelection,
        },

        FolioError::RenderSurfaceUnavailable { .. }
        | FolioError::EncodeFailure { .. }
        | FolioError::PdfError(_)
        | FolioError::Serialization(_) => HumanError::processing_failed(),
    }
}
