// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// folio-document: the page-at-a-time transcoding core of Folio.
//
// Opens PDF bytes through a bootstrapped rendering backend, resolves page
// selections, rasterizes and lays out pages, extracts text, and composes the
// results into PDFs, image sets or text documents.

pub mod backend;
pub mod layout;
pub mod lifecycle;
pub mod loader;
pub mod ops;
pub mod pdf;
pub mod range;
pub mod raster;
pub mod run;
pub mod text;

// Re-export the primary types so callers can use `folio_document::Transcoder` etc.
pub use backend::{BackendBootstrap, BackendCandidate, CandidateKind, EngineProvider};
pub use layout::{LayoutMode, resolve_native_size, resolve_size};
pub use lifecycle::OpenedDocument;
pub use loader::{DocumentLoader, ParseProfile};
pub use ops::{
    ArtifactSink, ContentKind, NoProgress, OperationReport, PageContent, ProgressSink, RunOutcome,
    SplitMode, SplitOutput, SplitPart, Transcoder,
};
pub use pdf::{ComposedDocument, TextPdfWriter};
pub use range::{resolve, validate};
pub use raster::{EncodedImage, RasterBuffer};
pub use run::{RunToken, RunTracker};
pub use text::{TextDocument, extract_lines};
