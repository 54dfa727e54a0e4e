// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Resource lifecycle: the guard returned by the document loader.
//
// An `OpenedDocument` owns both disposal handles of one open: the engine's
// document and the loader-level task. They are released on every exit path,
// document first, and a failing disposal is logged and swallowed so it can
// never replace the caller's own error.

use std::rc::Rc;

use folio_core::FolioError;
use folio_core::error::Result;
use tracing::{debug, warn};

use crate::backend::{PageHandle, RenderEngine, SourceDocument, TaskId};

/// Loader-level disposal handle.
pub(crate) struct LoadingTask {
    pub(crate) engine: Rc<dyn RenderEngine>,
    pub(crate) id: TaskId,
}

/// An opened source document plus its closer.
///
/// Dropping the guard closes it; [`OpenedDocument::close`] does the same
/// explicitly.
pub struct OpenedDocument {
    document: Option<Box<dyn SourceDocument>>,
    task: Option<LoadingTask>,
    engine_name: String,
    page_count: u32,
}

impl OpenedDocument {
    pub(crate) fn new(document: Box<dyn SourceDocument>, task: LoadingTask) -> Self {
        let page_count = document.page_count();
        Self {
            engine_name: task.engine.name().to_string(),
            document: Some(document),
            task: Some(task),
            page_count,
        }
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Name of the engine that opened this document.
    pub fn engine_name(&self) -> &str {
        &self.engine_name
    }

    /// Loader task identifier of this open.
    pub fn task_id(&self) -> Option<TaskId> {
        self.task.as_ref().map(|task| task.id)
    }

    /// Fetch a page by 1-based number. The handle cannot outlive `self`.
    pub fn page(&self, number: u32) -> Result<Box<dyn PageHandle + '_>> {
        let document = self
            .document
            .as_deref()
            .ok_or_else(|| FolioError::PdfError("document already closed".into()))?;
        document
            .page(number)
            .map_err(|err| FolioError::PdfError(format!("page {number}: {err}")))
    }

    /// Release both handles now.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(document) = self.document.take() {
            match document.close() {
                Ok(()) => debug!(engine = %self.engine_name, "document closed"),
                Err(err) => warn!(engine = %self.engine_name, error = %err, "document close failed"),
            }
        }
        if let Some(task) = self.task.take() {
            if let Err(err) = task.engine.release_task(task.id) {
                warn!(task = task.id.0, error = %err, "loading task release failed");
            }
        }
    }
}

impl Drop for OpenedDocument {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for OpenedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenedDocument")
            .field("engine", &self.engine_name)
            .field("page_count", &self.page_count)
            .field("open", &self.document.is_some())
            .finish()
    }
}
