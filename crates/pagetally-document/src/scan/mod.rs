// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR engines. Tesseract is always available; `ocrs` needs the `ocr` feature.

#[cfg(feature = "ocr")]
pub mod ocr;
pub mod tesseract;

use pagetally_core::config::{OcrBackend, OcrSettings};
use pagetally_core::error::TallyError;
use pagetally_core::traits::OcrEngine;
use tracing::info;

#[cfg(feature = "ocr")]
pub use ocr::OcrsEngine;
pub use tesseract::TesseractEngine;

/// Build the engine selected in `settings`.
pub fn build_ocr_engine(settings: &OcrSettings) -> Result<Box<dyn OcrEngine>, TallyError> {
    let engine: Box<dyn OcrEngine> = match settings.backend {
        OcrBackend::Tesseract => Box::new(TesseractEngine::from_settings(settings)),
        #[cfg(feature = "ocr")]
        OcrBackend::Ocrs => {
            let dir = settings
                .model_dir
                .clone()
                .unwrap_or_else(ocr::default_model_dir);
            Box::new(OcrsEngine::from_model_dir(dir)?)
        }
        #[cfg(not(feature = "ocr"))]
        OcrBackend::Ocrs => {
            return Err(TallyError::OcrError(
                "the ocrs backend requires building with the `ocr` feature".into(),
            ));
        }
    };
    info!(engine = engine.name(), "OCR engine selected");
    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tesseract_is_the_default() {
        let engine = build_ocr_engine(&OcrSettings::default()).expect("build");
        assert_eq!(engine.name(), "tesseract");
    }

    #[cfg(not(feature = "ocr"))]
    #[test]
    fn ocrs_without_feature_is_an_error() {
        let settings = OcrSettings {
            backend: OcrBackend::Ocrs,
            ..OcrSettings::default()
        };
        assert!(matches!(
            build_ocr_engine(&settings),
            Err(TallyError::OcrError(_))
        ));
    }
}
