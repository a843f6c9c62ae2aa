// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Run configuration: classification thresholds, OCR settings, and the
// locations of external tools.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, TallyError};

/// Largest accepted blank-page character threshold.
const MAX_BLANK_CHAR_THRESHOLD: usize = 10_000;

/// Well-known locations of an `en_US` word list, tried in order.
const DICTIONARY_CANDIDATES: &[&str] = &[
    "/usr/share/hunspell/en_US.dic",
    "/usr/share/myspell/en_US.dic",
    "/usr/share/myspell/dicts/en_US.dic",
    "/usr/local/share/hunspell/en_US.dic",
    "/opt/homebrew/share/hunspell/en_US.dic",
    "/usr/share/dict/american-english",
    "/usr/share/dict/words",
];

/// Thresholds that decide a page's status. Read-only for the duration of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum trimmed-text length for a page not to be blank.
    pub blank_char_threshold: usize,
    /// Minimum fraction of dictionary-valid tokens for a page not to be gibberish.
    pub valid_word_ratio_threshold: f64,
    /// Minimum fraction of near-white sampled pixels for a raster to be
    /// treated as blank and skipped for OCR.
    pub whiteness_ratio_threshold: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            blank_char_threshold: 100,
            valid_word_ratio_threshold: 0.1,
            whiteness_ratio_threshold: 0.98,
        }
    }
}

impl Thresholds {
    /// Reject values outside their meaningful ranges.
    pub fn validate(&self) -> Result<()> {
        if self.blank_char_threshold == 0 || self.blank_char_threshold > MAX_BLANK_CHAR_THRESHOLD {
            return Err(TallyError::Config(format!(
                "blank_char_threshold must be between 1 and {MAX_BLANK_CHAR_THRESHOLD}, got {}",
                self.blank_char_threshold
            )));
        }
        check_ratio("valid_word_ratio_threshold", self.valid_word_ratio_threshold)?;
        check_ratio("whiteness_ratio_threshold", self.whiteness_ratio_threshold)?;
        Ok(())
    }
}

fn check_ratio(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(TallyError::Config(format!(
            "{name} must be within [0, 1], got {value}"
        )));
    }
    Ok(())
}

/// Which OCR engine to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackend {
    /// The `tesseract` command-line program.
    Tesseract,
    /// The pure-Rust `ocrs` engine (requires the `ocr` feature).
    Ocrs,
}

/// OCR engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    pub backend: OcrBackend,
    /// Path or name of the tesseract binary.
    pub tesseract_cmd: PathBuf,
    /// Trained-data directory, exported to tesseract as `TESSDATA_PREFIX`.
    pub tessdata_dir: Option<PathBuf>,
    /// Recognition language.
    pub language: String,
    /// Tesseract page segmentation mode (6 = a single uniform block of text).
    pub page_segmentation_mode: u8,
    /// Directory holding the `ocrs` detection and recognition models.
    pub model_dir: Option<PathBuf>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            backend: OcrBackend::Tesseract,
            tesseract_cmd: PathBuf::from("tesseract"),
            tessdata_dir: None,
            language: "eng".to_string(),
            page_segmentation_mode: 6,
            model_dir: None,
        }
    }
}

/// Complete settings for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub thresholds: Thresholds,
    /// Resolution used when rasterizing a page for OCR.
    pub ocr_dpi: u32,
    /// Accept a page as billable from native text alone when it passes both
    /// tests, skipping all image work.
    pub fast_accept: bool,
    /// Embedded images smaller than this are treated as decoration.
    pub min_image_bytes: usize,
    /// Embedded images are downscaled to fit this bound before OCR.
    pub max_image_dimension: u32,
    /// Upper bound on pixels inspected by the whiteness sampler.
    pub sample_budget: usize,
    pub ocr: OcrSettings,
    /// Path or name of the pdftoppm binary used for rasterization.
    pub pdftoppm_cmd: PathBuf,
    /// Word list or hunspell `.dic`; resolved from system locations when unset.
    pub dictionary_path: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            ocr_dpi: 100,
            fast_accept: true,
            min_image_bytes: 1024,
            max_image_dimension: 1000,
            sample_budget: 1000,
            ocr: OcrSettings::default(),
            pdftoppm_cmd: PathBuf::from("pdftoppm"),
            dictionary_path: None,
        }
    }
}

impl AnalysisConfig {
    /// Load a JSON config file. Absent fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        info!(path = %path.display(), "configuration loaded");
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        if self.ocr_dpi == 0 {
            return Err(TallyError::Config("ocr_dpi must be positive".into()));
        }
        if self.max_image_dimension == 0 {
            return Err(TallyError::Config(
                "max_image_dimension must be positive".into(),
            ));
        }
        if self.sample_budget == 0 {
            return Err(TallyError::Config("sample_budget must be positive".into()));
        }
        Ok(())
    }

    /// The configured dictionary, or the first well-known one that exists.
    pub fn resolve_dictionary(&self) -> Result<PathBuf> {
        if let Some(path) = &self.dictionary_path {
            return Ok(path.clone());
        }
        let found = DICTIONARY_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .find(|candidate| candidate.exists());
        match found {
            Some(path) => {
                debug!(path = %path.display(), "using system dictionary");
                Ok(path)
            }
            None => Err(TallyError::Dictionary(format!(
                "no en_US word list found (looked in {}); pass a dictionary path",
                DICTIONARY_CANDIDATES.join(", ")
            ))),
        }
    }
}
