// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page classifier: the per-page extraction cascade.
//
// native text → (fast accept) → page raster OCR when the text layer is empty
// → embedded image OCR → Blank / Gibberish / Billable on the combined text.
// Every step yields a `StepText`; soft failures are logged and contribute an
// empty string, so classification itself never fails.

use std::fmt;
use std::sync::Arc;

use pagetally_core::config::{AnalysisConfig, Thresholds};
use pagetally_core::error::TallyError;
use pagetally_core::traits::{OcrEngine, PageSource, WordValidity};
use pagetally_core::types::{ImageRef, PageRecord, PageStatus, RawImage};
use pagetally_document::ImageProcessor;
use tracing::{debug, instrument};

use crate::events::EventSink;
use crate::gibberish::is_gibberish;
use crate::whiteness::PixelSampler;

/// Cascade step that produced a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    NativeText,
    PageRaster,
    PageOcr,
    ImageList,
    ImageDecode,
    ImageOcr,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NativeText => "Text extraction",
            Self::PageRaster => "Page rendering",
            Self::PageOcr => "Page OCR",
            Self::ImageList => "Image listing",
            Self::ImageDecode => "Image decoding",
            Self::ImageOcr => "Image OCR",
        })
    }
}

/// Result of one cascade step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepText {
    Extracted(String),
    SoftFailure { stage: Stage, reason: String },
}

impl StepText {
    fn from_result(stage: Stage, result: Result<String, TallyError>) -> Self {
        match result {
            Ok(text) => Self::Extracted(text),
            Err(err) => Self::SoftFailure {
                stage,
                reason: err.to_string(),
            },
        }
    }

    /// Fold into text, logging a failure as empty text.
    fn into_text(self, page_number: u32, events: &EventSink) -> String {
        match self {
            Self::Extracted(text) => text,
            Self::SoftFailure { stage, reason } => {
                events.warn(format!("{stage} failed for page {page_number}: {reason}"));
                String::new()
            }
        }
    }
}

/// Dependencies of the classifier. Shared read-only for a whole run.
#[derive(Clone)]
pub struct PageClassifier {
    thresholds: Thresholds,
    fast_accept: bool,
    ocr_dpi: u32,
    min_image_bytes: usize,
    max_image_dimension: u32,
    sampler: PixelSampler,
    ocr: Arc<dyn OcrEngine>,
    words: Arc<dyn WordValidity>,
}

impl PageClassifier {
    pub fn new(
        config: &AnalysisConfig,
        ocr: Arc<dyn OcrEngine>,
        words: Arc<dyn WordValidity>,
    ) -> Self {
        Self {
            thresholds: config.thresholds,
            fast_accept: config.fast_accept,
            ocr_dpi: config.ocr_dpi,
            min_image_bytes: config.min_image_bytes,
            max_image_dimension: config.max_image_dimension,
            sampler: PixelSampler::new(
                config.sample_budget,
                config.thresholds.whiteness_ratio_threshold,
            ),
            ocr,
            words,
        }
    }

    // -- Decisions ------------------------------------------------------------

    fn is_gibberish(&self, text: &str) -> bool {
        is_gibberish(
            text,
            self.words.as_ref(),
            self.thresholds.valid_word_ratio_threshold,
        )
    }

    /// Native text alone is long enough and valid enough.
    pub fn accepts_fast(&self, text: &str) -> bool {
        self.fast_accept
            && text.trim().chars().count() >= self.thresholds.blank_char_threshold
            && !self.is_gibberish(text)
    }

    /// Status of fully combined page text. Length decides before validity.
    pub fn status_of(&self, combined_text: &str) -> PageStatus {
        if combined_text.trim().chars().count() < self.thresholds.blank_char_threshold {
            PageStatus::Blank
        } else if self.is_gibberish(combined_text) {
            PageStatus::Gibberish
        } else {
            PageStatus::Billable
        }
    }

    // -- Cascade --------------------------------------------------------------

    /// Classify page `index` (0-based). Never fails.
    #[instrument(skip_all, fields(page = index + 1))]
    pub fn classify(&self, page: &dyn PageSource, index: usize, events: &EventSink) -> PageRecord {
        let page_number = (index + 1) as u32;

        let text = StepText::from_result(Stage::NativeText, page.page_text(index))
            .into_text(page_number, events);

        if self.accepts_fast(&text) {
            let length = text.chars().count();
            return self.finish(page_number, PageStatus::Billable, length, length, events);
        }

        let text = if text.trim().is_empty() {
            self.page_ocr(page, index).into_text(page_number, events)
        } else {
            text
        };

        let image_text = self.embedded_image_text(page, index, page_number, events);
        let combined = format!("{text} {image_text}");

        let status = self.status_of(&combined);
        self.finish(
            page_number,
            status,
            text.chars().count(),
            combined.chars().count(),
            events,
        )
    }

    fn finish(
        &self,
        page_number: u32,
        status: PageStatus,
        text_length: usize,
        combined_length: usize,
        events: &EventSink,
    ) -> PageRecord {
        events.log(format!(
            "Page {page_number}: {status} | Text Length: {text_length} | Combined Text Length: {combined_length}"
        ));
        PageRecord {
            page_number,
            status,
            extracted_text_length: text_length,
        }
    }

    /// Rasterize the page and OCR it unless it samples as blank.
    fn page_ocr(&self, page: &dyn PageSource, index: usize) -> StepText {
        let raster = match page.rasterize(index, self.ocr_dpi) {
            Ok(raster) => raster,
            Err(err) => {
                return StepText::SoftFailure {
                    stage: Stage::PageRaster,
                    reason: err.to_string(),
                };
            }
        };
        if self.sampler.is_likely_blank(&raster) {
            debug!(page = index + 1, "raster samples as blank; OCR skipped");
            return StepText::Extracted(String::new());
        }
        StepText::from_result(Stage::PageOcr, self.ocr.recognize(&raster))
    }

    /// OCR text of every usable embedded image, space-joined.
    fn embedded_image_text(
        &self,
        page: &dyn PageSource,
        index: usize,
        page_number: u32,
        events: &EventSink,
    ) -> String {
        let images = match page.embedded_images(index) {
            Ok(images) => images,
            Err(err) => {
                StepText::SoftFailure {
                    stage: Stage::ImageList,
                    reason: err.to_string(),
                }
                .into_text(page_number, events);
                return String::new();
            }
        };

        images
            .iter()
            .map(|image| self.image_ocr(page, image).into_text(page_number, events))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn image_ocr(&self, page: &dyn PageSource, image: &ImageRef) -> StepText {
        let decoded = match self.decode_for_ocr(page, image) {
            Ok(Some(raw)) => raw,
            Ok(None) => return StepText::Extracted(String::new()),
            Err(err) => {
                return StepText::SoftFailure {
                    stage: Stage::ImageDecode,
                    reason: err.to_string(),
                };
            }
        };
        StepText::from_result(Stage::ImageOcr, self.ocr.recognize(&decoded))
    }

    /// Decoded, bounded RGB pixels, or `None` for images too small to matter.
    fn decode_for_ocr(
        &self,
        page: &dyn PageSource,
        image: &ImageRef,
    ) -> Result<Option<RawImage>, TallyError> {
        let encoded = page.decode_image(image)?;
        if !encoded.encoding.is_supported() {
            return Err(TallyError::UnsupportedImage(format!(
                "'{}' image {} skipped",
                encoded.encoding.extension(),
                image.id
            )));
        }
        if encoded.bytes.len() < self.min_image_bytes {
            debug!(
                id = image.id,
                bytes = encoded.bytes.len(),
                "image below size floor; skipped"
            );
            return Ok(None);
        }
        let raw = ImageProcessor::from_encoded(&encoded.bytes, &encoded.encoding)?
            .fit_within(self.max_image_dimension)
            .to_raw_rgb();
        Ok(Some(raw))
    }
}
