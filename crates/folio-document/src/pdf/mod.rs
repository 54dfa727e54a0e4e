// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF output: the raster-backed page composer and the text PDF writer.

pub mod composer;
pub mod writer;

pub use composer::{ComposeOptions, ComposedDocument};
pub use writer::TextPdfWriter;
