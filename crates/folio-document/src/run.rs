// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Run generations: cooperative cancellation for one tool instance.
//
// Every run captures a generation number. Starting a newer run, or stopping,
// bumps the current generation, and an older run discards its results the
// next time it checks.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out run tokens for one tool instance.
#[derive(Debug, Clone, Default)]
pub struct RunTracker {
    current: Arc<AtomicU64>,
}

impl RunTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new run, superseding any run in flight.
    pub fn begin(&self) -> RunToken {
        let generation = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        RunToken {
            generation,
            current: Arc::clone(&self.current),
        }
    }

    /// Invalidate the run in flight without starting another.
    pub fn stop(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }

    pub fn generation(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }
}

/// The generation captured by one run.
#[derive(Debug, Clone)]
pub struct RunToken {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl RunToken {
    /// A token not tied to any tracker; it is never superseded.
    pub fn detached() -> Self {
        RunTracker::new().begin()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether this run may still commit results.
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_run_supersedes_older() {
        let tracker = RunTracker::new();
        let first = tracker.begin();
        assert!(first.is_current());
        let second = tracker.begin();
        assert!(!first.is_current());
        assert!(second.is_current());
        assert!(second.generation() > first.generation());
    }

    #[test]
    fn stop_invalidates_in_flight_run() {
        let tracker = RunTracker::new();
        let run = tracker.begin();
        tracker.stop();
        assert!(!run.is_current());
    }

    #[test]
    fn detached_token_stays_current() {
        assert!(RunToken::detached().is_current());
    }
}
