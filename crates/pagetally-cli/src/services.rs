// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service setup: builds the concrete PDF reader, OCR engine, and word list
// a run needs from the resolved configuration.

use std::sync::Arc;

use pagetally_analysis::Collaborators;
use pagetally_core::config::{AnalysisConfig, OcrBackend};
use pagetally_core::error::TallyError;
use pagetally_document::{
    LopdfSource, PdftoppmRasterizer, TesseractEngine, WordList, build_ocr_engine,
};
use tracing::{info, warn};

/// Initialise every collaborator. Call once per run.
///
/// Missing external tools are only warned about here: pages that need them
/// fall back to empty text and the failure shows up in the page log.
pub fn build_collaborators(config: &AnalysisConfig) -> Result<Collaborators, TallyError> {
    let rasterizer = PdftoppmRasterizer::new(&config.pdftoppm_cmd);
    if !rasterizer.is_available() {
        warn!(
            command = %config.pdftoppm_cmd.display(),
            "pdftoppm not available; pages without a text layer cannot be OCR'd"
        );
    }

    if config.ocr.backend == OcrBackend::Tesseract
        && !TesseractEngine::from_settings(&config.ocr).is_available()
    {
        warn!(
            command = %config.ocr.tesseract_cmd.display(),
            "tesseract not available; OCR will contribute no text"
        );
    }
    let ocr = build_ocr_engine(&config.ocr)?;

    let dictionary = config.resolve_dictionary()?;
    let words = WordList::load(&dictionary)?;

    info!(
        dictionary = %dictionary.display(),
        ocr = ocr.name(),
        "services initialised"
    );

    Ok(Collaborators {
        documents: Arc::new(LopdfSource::new(rasterizer)),
        ocr: Arc::from(ocr),
        words: Arc::new(words),
    })
}
