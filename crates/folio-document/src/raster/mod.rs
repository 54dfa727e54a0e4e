// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rasterization and raster encoding.

pub mod buffer;
pub mod encode;

pub use buffer::{RasterBuffer, render, to_grayscale};
pub use encode::{EncodedImage, encode, jpeg_quality};
