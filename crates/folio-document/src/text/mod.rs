// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text extraction and the text composer.

pub mod document;
pub mod extract;

pub use document::{EMPTY_PAGE_PLACEHOLDER, TextBlock, TextDocument};
pub use extract::extract_lines;
