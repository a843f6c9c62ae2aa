// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Collaborator traits used by the classification pipeline.
//
// The analysis crate only ever talks to documents, OCR engines, and
// dictionaries through these seams. Concrete implementations live in
// `pagetally-document`; tests substitute deterministic doubles.

use std::path::Path;

use crate::error::Result;
use crate::types::{EncodedImage, ImageRef, RawImage};

/// Opens documents by path.
pub trait DocumentSource: Send + Sync {
    /// Open and parse a document. Failure here fails the whole document.
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource>>;
}

/// Per-page access to an opened document. Page indices are 0-based.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Native text layer of a page.
    fn page_text(&self, index: usize) -> Result<String>;

    /// Render a page to pixels at the given resolution.
    fn rasterize(&self, index: usize, dpi: u32) -> Result<RawImage>;

    /// Images embedded on a page, in resource order.
    fn embedded_images(&self, index: usize) -> Result<Vec<ImageRef>>;

    /// Fetch the encoded bytes of an embedded image.
    fn decode_image(&self, image: &ImageRef) -> Result<EncodedImage>;
}

/// Converts a raster image to text.
pub trait OcrEngine: Send + Sync {
    /// Short engine name for logs.
    fn name(&self) -> &str;

    fn recognize(&self, image: &RawImage) -> Result<String>;
}

/// Judges whether a lowercase token is a real word of a fixed language.
pub trait WordValidity: Send + Sync {
    fn is_valid_word(&self, token: &str) -> bool;
}
