// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-process OCR with the `ocrs` crate, a pure-Rust engine running neural
// network models through `rten`.
//
// Only built with the `ocr` feature. The engine needs two model files in one
// directory:
//
// - `text-detection.rten` locates text regions.
// - `text-recognition.rten` decodes characters from those regions.
//
// Running `ocrs-cli` once downloads both to `$XDG_CACHE_HOME/ocrs`
// (typically `~/.cache/ocrs`), which is the default location.

use std::path::{Path, PathBuf};

use ocrs::{ImageSource, OcrEngine as Ocrs, OcrEngineParams};
use pagetally_core::error::TallyError;
use pagetally_core::traits::OcrEngine;
use pagetally_core::types::RawImage;
use rten::Model;
use tracing::{debug, info, instrument};

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// `$XDG_CACHE_HOME/ocrs`, falling back to `~/.cache/ocrs`.
pub fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// OCR engine backed by `ocrs`. Loading the models is the expensive step,
/// so one instance is built per run and reused for every image.
pub struct OcrsEngine {
    engine: Ocrs,
}

impl OcrsEngine {
    /// Load both models from `dir`.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn from_model_dir(dir: impl AsRef<Path>) -> Result<Self, TallyError> {
        let dir = dir.as_ref();
        let detection_model = load_model(&dir.join(DETECTION_MODEL_FILENAME))?;
        let recognition_model = load_model(&dir.join(RECOGNITION_MODEL_FILENAME))?;

        let engine = Ocrs::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| TallyError::OcrError(format!("failed to initialise ocrs: {}", err)))?;

        info!("ocrs engine ready");
        Ok(Self { engine })
    }
}

fn load_model(path: &Path) -> Result<Model, TallyError> {
    if !path.exists() {
        return Err(TallyError::OcrError(format!(
            "model not found at {}; run `ocrs-cli` once to download models",
            path.display()
        )));
    }
    Model::load_file(path).map_err(|err| {
        TallyError::OcrError(format!("failed to load model {}: {}", path.display(), err))
    })
}

impl OcrEngine for OcrsEngine {
    fn name(&self) -> &str {
        "ocrs"
    }

    #[instrument(skip_all, fields(width = image.width, height = image.height))]
    fn recognize(&self, image: &RawImage) -> Result<String, TallyError> {
        let rgb = image.to_rgb();
        let source = ImageSource::from_bytes(&rgb.samples, (rgb.width, rgb.height)).map_err(
            |err| {
                TallyError::OcrError(format!(
                    "failed to create image source ({}x{}): {}",
                    rgb.width, rgb.height, err
                ))
            },
        )?;

        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| TallyError::OcrError(format!("OCR preprocessing failed: {}", err)))?;

        let text = self
            .engine
            .get_text(&input)
            .map_err(|err| TallyError::OcrError(format!("OCR text recognition failed: {}", err)))?;

        debug!(lines = text.lines().count(), "ocrs finished");
        Ok(text)
    }
}
