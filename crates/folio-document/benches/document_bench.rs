// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the per-page hot paths of folio-document: page
// range resolution, the grayscale pass, layout resolution and page
// composition.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{Rgba, RgbaImage};

use folio_core::OutputPageSize;
use folio_document::layout::{LayoutMode, resolve_size};
use folio_document::pdf::{ComposeOptions, ComposedDocument};
use folio_document::raster::{RasterBuffer, to_grayscale};
use folio_document::range::resolve;

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// A mixed expression over a large document.
fn bench_range_resolution(c: &mut Criterion) {
    c.bench_function("resolve mixed ranges (1000 pages)", |b| {
        b.iter(|| resolve(black_box("1-200, 350, 400-650, 7, 999, 12-40"), 1000));
    });
}

/// Grayscale on roughly one A4 page at 1.5x scale.
fn bench_grayscale(c: &mut Criterion) {
    let pixels = RgbaImage::from_fn(893, 1263, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    });
    let buffer = RasterBuffer::from_image(1, pixels);

    c.bench_function("to_grayscale (893x1263)", |b| {
        b.iter(|| {
            let mut page = buffer.clone();
            to_grayscale(&mut page);
            black_box(page);
        });
    });
}

fn bench_layout(c: &mut Criterion) {
    c.bench_function("resolve_size fit-to-content", |b| {
        b.iter(|| resolve_size(LayoutMode::FitToContent, black_box(1200), black_box(900), 150.0));
    });
}

/// JPEG embedding of one page into a composed document.
fn bench_compose_page(c: &mut Criterion) {
    let buffer = RasterBuffer::from_image(1, RgbaImage::from_pixel(600, 800, Rgba([240, 240, 240, 255])));
    let size = OutputPageSize {
        width_mm: 210.0,
        height_mm: 297.0,
        landscape: false,
    };

    c.bench_function("append_image_page (600x800)", |b| {
        b.iter(|| {
            let mut composed = ComposedDocument::new(ComposeOptions::default());
            composed.append_image_page(&buffer, size).unwrap();
            black_box(composed.page_count());
        });
    });
}

criterion_group!(
    benches,
    bench_range_resolution,
    bench_grayscale,
    bench_layout,
    bench_compose_page
);
criterion_main!(benches);
