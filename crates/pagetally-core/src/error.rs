// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Pagetally.

use thiserror::Error;

/// Top-level error type for all Pagetally operations.
#[derive(Debug, Error)]
pub enum TallyError {
    // -- Document errors --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("text extraction failed: {0}")]
    TextExtraction(String),

    #[error("page rasterization failed: {0}")]
    Rasterize(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("unsupported image encoding: {0}")]
    UnsupportedImage(String),

    #[error("OCR failed: {0}")]
    OcrError(String),

    #[error("dictionary unavailable: {0}")]
    Dictionary(String),

    // -- Run configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("report export failed: {0}")]
    Export(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TallyError>;
