// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Backend bootstrap: resolves which renderer location is active.
//
// Candidates are tried in a fixed order. The cursor only ever moves forward,
// so once a later candidate has been promoted every subsequent open starts
// there directly.

use std::cell::{Cell, OnceCell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use folio_core::BackendConfig;
use tracing::{debug, info, warn};

use super::engine::{EngineError, RenderEngine};

/// Environment override for the bundled renderer directory.
pub const PDFIUM_DIR_ENV: &str = "FOLIO_PDFIUM_DIR";

/// One place the renderer may be loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateKind {
    /// First-party copy shipped alongside the application.
    Bundled(PathBuf),
    /// Third-party mirror directory.
    Mirror(PathBuf),
    /// The operating system's library search path.
    System,
    /// Built-in lopdf engine: no rasterizer, but page counts and text work.
    Structural,
}

/// A bootstrap candidate with a human-readable label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendCandidate {
    pub label: String,
    pub kind: CandidateKind,
}

impl BackendCandidate {
    pub fn new(label: impl Into<String>, kind: CandidateKind) -> Self {
        Self {
            label: label.into(),
            kind,
        }
    }

    /// Whether this location is shipped by us rather than a mirror.
    pub fn is_first_party(&self) -> bool {
        matches!(
            self.kind,
            CandidateKind::Bundled(_) | CandidateKind::Structural
        )
    }
}

impl std::fmt::Display for BackendCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            CandidateKind::Bundled(dir) => write!(f, "{} (bundled: {})", self.label, dir.display()),
            CandidateKind::Mirror(dir) => write!(f, "{} (mirror: {})", self.label, dir.display()),
            CandidateKind::System => write!(f, "{} (system library)", self.label),
            CandidateKind::Structural => write!(f, "{} (built-in)", self.label),
        }
    }
}

/// Turns a candidate location into a usable engine.
pub trait EngineProvider {
    fn bind(&self, candidate: &BackendCandidate) -> Result<Rc<dyn RenderEngine>, EngineError>;
}

/// Build the ordered candidate list for a configuration.
///
/// Order: bundled directory (env override, configured dir, or the
/// executable's dir), configured mirrors, the system library, then the
/// structural fallback.
pub fn default_candidates(config: &BackendConfig) -> Vec<BackendCandidate> {
    let mut candidates = Vec::new();

    let bundled = std::env::var_os(PDFIUM_DIR_ENV)
        .map(PathBuf::from)
        .or_else(|| config.library_dir.clone())
        .or_else(|| {
            std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf))
        });
    if let Some(dir) = bundled {
        candidates.push(BackendCandidate::new("pdfium", CandidateKind::Bundled(dir)));
    }

    for dir in &config.mirror_dirs {
        candidates.push(BackendCandidate::new(
            "pdfium",
            CandidateKind::Mirror(dir.clone()),
        ));
    }

    if config.use_system_library {
        candidates.push(BackendCandidate::new("pdfium", CandidateKind::System));
    }

    if config.structural_fallback {
        candidates.push(BackendCandidate::new(
            "structural",
            CandidateKind::Structural,
        ));
    }

    candidates
}

enum CandidatePlan {
    Fixed(Vec<BackendCandidate>),
    FromConfig(BackendConfig),
}

/// Shared renderer bootstrap service.
///
/// One instance is shared (via `Rc`) by every operation in a session. It is
/// deliberately `!Sync`: the pipeline runs on a single cooperative thread.
pub struct BackendBootstrap {
    provider: Box<dyn EngineProvider>,
    plan: RefCell<Option<CandidatePlan>>,
    candidates: OnceCell<Vec<BackendCandidate>>,
    cursor: Cell<usize>,
    bound: RefCell<Option<(usize, Rc<dyn RenderEngine>)>>,
}

impl BackendBootstrap {
    /// Bootstrap with the default provider; candidates are resolved from
    /// `config` on first use.
    pub fn new(config: BackendConfig) -> Self {
        Self::build(
            Box::new(super::DefaultProvider),
            CandidatePlan::FromConfig(config),
        )
    }

    /// Bootstrap over an explicit candidate list and provider.
    pub fn with_candidates(
        provider: impl EngineProvider + 'static,
        candidates: Vec<BackendCandidate>,
    ) -> Self {
        Self::build(Box::new(provider), CandidatePlan::Fixed(candidates))
    }

    fn build(provider: Box<dyn EngineProvider>, plan: CandidatePlan) -> Self {
        Self {
            provider,
            plan: RefCell::new(Some(plan)),
            candidates: OnceCell::new(),
            cursor: Cell::new(0),
            bound: RefCell::new(None),
        }
    }

    /// Resolve the candidate list. Idempotent: only the first call does work.
    pub fn configure(&self) -> &[BackendCandidate] {
        self.candidates.get_or_init(|| {
            let candidates = match self.plan.borrow_mut().take() {
                Some(CandidatePlan::Fixed(list)) => list,
                Some(CandidatePlan::FromConfig(config)) => default_candidates(&config),
                None => Vec::new(),
            };
            info!(
                count = candidates.len(),
                first = candidates.first().map(|c| c.to_string()).unwrap_or_default(),
                "backend candidates configured"
            );
            candidates
        })
    }

    /// Index of the active candidate.
    pub fn active_index(&self) -> usize {
        self.cursor.get()
    }

    /// The active candidate, if any are configured.
    pub fn active(&self) -> Option<&BackendCandidate> {
        self.configure().get(self.cursor.get())
    }

    /// Move to the next candidate. Returns `false` when none remain.
    pub fn advance(&self) -> bool {
        self.advance_past(self.cursor.get())
    }

    /// Move past `index`, the candidate the caller just saw fail.
    ///
    /// If another operation already advanced beyond `index`, the cursor is
    /// left alone and the caller simply picks up the newer candidate. On
    /// exhaustion the cursor stays on the last candidate.
    pub fn advance_past(&self, index: usize) -> bool {
        let len = self.configure().len();
        let current = self.cursor.get();
        if current > index {
            debug!(current, index, "candidate already advanced by another operation");
            return current < len;
        }

        let next = index + 1;
        if next >= len {
            warn!(tried = len, "all backend candidates exhausted");
            return false;
        }

        self.cursor.set(next);
        self.bound.borrow_mut().take();
        info!(
            index = next,
            candidate = %self.configure()[next],
            "advanced to next backend candidate"
        );
        true
    }

    /// Bind (or reuse) the engine for the active candidate.
    ///
    /// Returns the candidate index alongside the engine so callers can report
    /// a failure against the exact candidate they used.
    pub fn engine(&self) -> Result<(usize, Rc<dyn RenderEngine>), EngineError> {
        let index = self.cursor.get();
        if let Some((bound_index, engine)) = self.bound.borrow().as_ref() {
            if *bound_index == index {
                return Ok((index, Rc::clone(engine)));
            }
        }

        let candidate = self
            .configure()
            .get(index)
            .ok_or_else(|| EngineError::Unreachable("no backend candidates configured".into()))?;
        let engine = self.provider.bind(candidate)?;
        debug!(index, candidate = %candidate, engine = engine.name(), "backend bound");
        *self.bound.borrow_mut() = Some((index, Rc::clone(&engine)));
        Ok((index, engine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::engine::{OpenOptions, SourceDocument};

    struct NullEngine;

    impl RenderEngine for NullEngine {
        fn name(&self) -> &str {
            "null"
        }

        fn open(
            &self,
            _bytes: &[u8],
            _options: OpenOptions<'_>,
        ) -> Result<Box<dyn SourceDocument>, EngineError> {
            Err(EngineError::Malformed("null engine".into()))
        }
    }

    struct CountingProvider {
        binds: Rc<Cell<u32>>,
    }

    impl EngineProvider for CountingProvider {
        fn bind(&self, _candidate: &BackendCandidate) -> Result<Rc<dyn RenderEngine>, EngineError> {
            self.binds.set(self.binds.get() + 1);
            Ok(Rc::new(NullEngine))
        }
    }

    fn three() -> Vec<BackendCandidate> {
        vec![
            BackendCandidate::new("a", CandidateKind::Bundled(PathBuf::from("a"))),
            BackendCandidate::new("b", CandidateKind::Mirror(PathBuf::from("b"))),
            BackendCandidate::new("c", CandidateKind::System),
        ]
    }

    fn bootstrap(binds: &Rc<Cell<u32>>) -> BackendBootstrap {
        BackendBootstrap::with_candidates(
            CountingProvider {
                binds: Rc::clone(binds),
            },
            three(),
        )
    }

    #[test]
    fn configure_is_idempotent() {
        let binds = Rc::new(Cell::new(0));
        let boot = bootstrap(&binds);
        assert_eq!(boot.configure().len(), 3);
        assert_eq!(boot.configure().len(), 3);
        assert_eq!(boot.active().unwrap().label, "a");
    }

    #[test]
    fn advance_walks_forward_then_exhausts() {
        let binds = Rc::new(Cell::new(0));
        let boot = bootstrap(&binds);
        assert!(boot.advance());
        assert!(boot.advance());
        assert!(!boot.advance());
        assert_eq!(boot.active_index(), 2);
    }

    #[test]
    fn stale_advance_does_not_skip() {
        let binds = Rc::new(Cell::new(0));
        let boot = bootstrap(&binds);
        assert!(boot.advance_past(0));
        // A second operation that also failed on candidate 0 must not skip b.
        assert!(boot.advance_past(0));
        assert_eq!(boot.active_index(), 1);
    }

    #[test]
    fn engine_is_cached_per_candidate() {
        let binds = Rc::new(Cell::new(0));
        let boot = bootstrap(&binds);
        boot.engine().unwrap();
        boot.engine().unwrap();
        assert_eq!(binds.get(), 1);
        boot.advance();
        let (index, _) = boot.engine().unwrap();
        assert_eq!(index, 1);
        assert_eq!(binds.get(), 2);
    }

    #[test]
    fn default_list_has_first_party_and_mirror() {
        let config = BackendConfig {
            library_dir: Some(PathBuf::from("/opt/folio/lib")),
            ..Default::default()
        };
        let list = default_candidates(&config);
        assert!(list.iter().any(BackendCandidate::is_first_party));
        assert!(list.iter().any(|c| matches!(c.kind, CandidateKind::Mirror(_))));
        assert_eq!(list.last().unwrap().kind, CandidateKind::Structural);
    }
}
