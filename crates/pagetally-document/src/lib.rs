// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagetally-document: Concrete collaborators for the page classifier.
//
// Provides PDF access (text layer, rasterization through pdftoppm, embedded
// image extraction), image decoding and downscaling, OCR engines (tesseract,
// and `ocrs` behind the `ocr` feature), and word lists.

pub mod dictionary;
pub mod image;
pub mod pdf;
pub mod scan;

pub use dictionary::WordList;
pub use image::processor::ImageProcessor;
pub use pdf::{LopdfSource, PdfReader, PdftoppmRasterizer};
pub use scan::{TesseractEngine, build_ocr_engine};

#[cfg(feature = "ocr")]
pub use scan::OcrsEngine;
