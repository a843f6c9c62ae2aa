// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for pagetally-document: downscaling an oversized
// embedded image and word-list lookups.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};

use pagetally_core::WordValidity;
use pagetally_document::{ImageProcessor, WordList};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Fit a 2400x1800 scan into the 1000px OCR bound and normalise to RGB.
fn bench_fit_within(c: &mut Criterion) {
    let mut img = RgbImage::from_pixel(2400, 1800, Rgb([250u8, 250, 250]));
    for y in (100..1700).step_by(40) {
        for x in 100..2300 {
            img.put_pixel(x, y, Rgb([20u8, 20, 20]));
        }
    }
    let dynamic = DynamicImage::ImageRgb8(img);

    c.bench_function("fit_within (2400x1800 -> 1000)", |b| {
        b.iter(|| {
            let raw = ImageProcessor::from_dynamic(black_box(dynamic.clone()))
                .fit_within(1000)
                .to_raw_rgb();
            black_box(raw);
        });
    });
}

/// Look up a paragraph of mixed words and inflections.
fn bench_word_lookup(c: &mut Criterion) {
    let list = WordList::from_words([
        "the", "invoice", "total", "amount", "due", "page", "payment", "receive", "quick",
        "account", "number", "date",
    ]);
    let tokens: Vec<&str> = "the invoices total amount due on receiving payment xqzt lorem \
                             accounts numbered dated quickly pages"
        .split_whitespace()
        .collect();

    c.bench_function("word_lookup (15 tokens)", |b| {
        b.iter(|| {
            let valid = tokens
                .iter()
                .filter(|token| list.is_valid_word(black_box(token)))
                .count();
            black_box(valid);
        });
    });
}

criterion_group!(benches, bench_fit_within, bench_word_lookup);
criterion_main!(benches);
