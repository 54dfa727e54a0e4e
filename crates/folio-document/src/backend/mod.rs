// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rendering backends and the bootstrap that chooses between them.

pub mod bootstrap;
pub mod engine;
#[cfg(feature = "pdfium")]
pub mod pdfium;
pub mod structural;

use std::rc::Rc;

pub use bootstrap::{BackendBootstrap, BackendCandidate, CandidateKind, EngineProvider};
pub use engine::{
    EngineError, OpenOptions, PageHandle, RenderEngine, SourceDocument, TaskId, TextContent,
    TextFragment, Viewport,
};
pub use structural::StructuralEngine;

/// Binds real engines: PDFium for library locations, lopdf for the
/// structural fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultProvider;

impl EngineProvider for DefaultProvider {
    fn bind(&self, candidate: &BackendCandidate) -> Result<Rc<dyn RenderEngine>, EngineError> {
        match candidate.kind {
            CandidateKind::Structural => Ok(Rc::new(StructuralEngine::new())),
            #[cfg(feature = "pdfium")]
            _ => pdfium::bind(candidate),
            #[cfg(not(feature = "pdfium"))]
            _ => Err(EngineError::Unreachable(format!(
                "{candidate}: built without PDFium support"
            ))),
        }
    }
}
