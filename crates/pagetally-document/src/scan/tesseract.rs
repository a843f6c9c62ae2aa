// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tesseract OCR engine: writes the image to a scratch PNG and runs the
// `tesseract` command-line program on it.

use std::path::{Path, PathBuf};
use std::process::Command;

use pagetally_core::config::OcrSettings;
use pagetally_core::error::TallyError;
use pagetally_core::traits::OcrEngine;
use pagetally_core::types::RawImage;
use tempfile::TempDir;
use tracing::{debug, instrument};

use crate::image::ImageProcessor;

/// OCR through an external `tesseract` binary.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    command: PathBuf,
    tessdata_dir: Option<PathBuf>,
    language: String,
    psm: u8,
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::from_settings(&OcrSettings::default())
    }
}

impl TesseractEngine {
    pub fn from_settings(settings: &OcrSettings) -> Self {
        Self {
            command: settings.tesseract_cmd.clone(),
            tessdata_dir: settings.tessdata_dir.clone(),
            language: settings.language.clone(),
            psm: settings.page_segmentation_mode,
        }
    }

    /// Whether the binary can be launched at all.
    pub fn is_available(&self) -> bool {
        Command::new(&self.command).arg("--version").output().is_ok()
    }

    fn run(&self, image_path: &Path) -> Result<String, TallyError> {
        let mut command = Command::new(&self.command);
        command
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .args(["--psm", &self.psm.to_string()]);
        if let Some(dir) = &self.tessdata_dir {
            command.env("TESSDATA_PREFIX", dir);
        }

        match command.output() {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(TallyError::OcrError(format!(
                    "tesseract failed: {}",
                    stderr.trim()
                )))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(TallyError::OcrError(format!(
                    "{} not found (install tesseract-ocr)",
                    self.command.display()
                )))
            }
            Err(err) => Err(TallyError::Io(err)),
        }
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    #[instrument(skip_all, fields(width = image.width, height = image.height))]
    fn recognize(&self, image: &RawImage) -> Result<String, TallyError> {
        let scratch = TempDir::new()?;
        let image_path = scratch.path().join("input.png");
        ImageProcessor::from_raw(image)?.save(&image_path)?;

        let text = self.run(&image_path)?;
        debug!(chars = text.chars().count(), "tesseract finished");
        Ok(text)
    }
}
