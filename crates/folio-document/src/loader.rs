// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document loader: opens source bytes through the active backend.
//
// Each open walks a ladder of parse profiles against the current backend
// candidate. When the whole ladder fails, the bootstrap advances and the
// ladder is repeated on the next candidate until one succeeds or none remain.

use std::cell::Cell;
use std::rc::Rc;

use folio_core::error::Result;
use folio_core::{FolioError, OpenCause};
use tracing::{debug, info, instrument, warn};

use crate::backend::{BackendBootstrap, EngineError, OpenOptions, TaskId};
use crate::lifecycle::{LoadingTask, OpenedDocument};

/// Parse-option profiles, tried in ladder order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseProfile {
    /// Bytes as given, no password.
    Defensive,
    /// Bytes reparsed and re-serialised by lopdf, which rebuilds a damaged
    /// cross-reference table.
    Rebuilt,
    /// Rebuilt bytes plus the empty user password, for documents that only
    /// carry an owner password.
    Permissive,
}

impl ParseProfile {
    pub const LADDER: [ParseProfile; 3] = [Self::Defensive, Self::Rebuilt, Self::Permissive];

    fn options(self) -> OpenOptions<'static> {
        match self {
            Self::Defensive | Self::Rebuilt => OpenOptions { password: None },
            Self::Permissive => OpenOptions { password: Some("") },
        }
    }
}

/// Opens documents against a shared [`BackendBootstrap`].
pub struct DocumentLoader {
    bootstrap: Rc<BackendBootstrap>,
    next_task: Cell<u64>,
}

impl DocumentLoader {
    pub fn new(bootstrap: Rc<BackendBootstrap>) -> Self {
        Self {
            bootstrap,
            next_task: Cell::new(1),
        }
    }

    pub fn bootstrap(&self) -> &Rc<BackendBootstrap> {
        &self.bootstrap
    }

    /// Open `bytes` as a paged document.
    ///
    /// The returned guard releases the document and the loading task when
    /// closed or dropped. Every failure surfaces as
    /// [`FolioError::DocumentOpen`] carrying the last underlying cause.
    #[instrument(skip_all, fields(bytes_len = bytes.len()))]
    pub async fn open(&self, bytes: &[u8]) -> Result<OpenedDocument> {
        self.bootstrap.configure();

        let mut rebuilt: Option<Option<Vec<u8>>> = None;
        let mut last_error: Option<EngineError> = None;

        loop {
            let index = self.bootstrap.active_index();
            let engine = match self.bootstrap.engine() {
                Ok((_, engine)) => Some(engine),
                Err(err) => {
                    warn!(index, error = %err, "backend candidate could not be bound");
                    last_error = Some(err);
                    None
                }
            };

            if let Some(engine) = engine {
                for profile in ParseProfile::LADDER {
                    let input: &[u8] = match profile {
                        ParseProfile::Defensive => bytes,
                        ParseProfile::Rebuilt => {
                            match rebuilt.get_or_insert_with(|| rebuild(bytes)) {
                                Some(repaired) => repaired.as_slice(),
                                None => continue,
                            }
                        }
                        ParseProfile::Permissive => rebuilt
                            .as_ref()
                            .and_then(Option::as_deref)
                            .unwrap_or(bytes),
                    };

                    match engine.open(input, profile.options()) {
                        Ok(document) => {
                            let task = TaskId(self.next_task.get());
                            self.next_task.set(task.0 + 1);
                            info!(
                                engine = engine.name(),
                                candidate = index,
                                ?profile,
                                pages = document.page_count(),
                                "document opened"
                            );
                            return Ok(OpenedDocument::new(
                                document,
                                LoadingTask { engine, id: task },
                            ));
                        }
                        Err(err) => {
                            debug!(engine = engine.name(), ?profile, error = %err, "parse profile failed");
                            last_error = Some(err);
                        }
                    }

                    tokio::task::yield_now().await;
                }

                // Later opens also start from the next candidate.
                warn!(
                    engine = engine.name(),
                    candidate = index,
                    error = ?last_error.as_ref().map(ToString::to_string),
                    "every parse profile failed; abandoning backend candidate"
                );
            }

            if !self.bootstrap.advance_past(index) {
                break;
            }
            if let Some(next) = self.bootstrap.active() {
                warn!(from = index, to = self.bootstrap.active_index(), %next, "trying next backend candidate");
            }
        }

        let (cause, detail) = match last_error {
            Some(err) => (err.open_cause(), err.to_string()),
            None => (
                OpenCause::BackendUnreachable,
                "no backend candidates configured".to_string(),
            ),
        };
        warn!(%cause, %detail, "document could not be opened");
        Err(FolioError::DocumentOpen { cause, detail })
    }
}

/// Reparse with lopdf and write the document back out.
fn rebuild(bytes: &[u8]) -> Option<Vec<u8>> {
    let mut document = match lopdf::Document::load_mem(bytes) {
        Ok(document) => document,
        Err(err) => {
            debug!(error = %err, "lopdf could not rebuild document");
            return None;
        }
    };
    let mut out = Vec::with_capacity(bytes.len());
    match document.save_to(&mut out) {
        Ok(_) => Some(out),
        Err(err) => {
            debug!(error = %err, "lopdf could not re-serialise document");
            None
        }
    }
}
