// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: page statuses, per-page records, and the per-document
// and per-batch reports built from them.

use serde::{Deserialize, Serialize};

/// Classification of a single page. Every processed page gets exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageStatus {
    /// Too little text after every extraction attempt.
    Blank,
    /// Enough characters, too few dictionary words.
    Gibberish,
    /// Enough valid text to count as productive content.
    Billable,
}

impl PageStatus {
    /// Label used in logs and exported reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blank => "Blank",
            Self::Gibberish => "Gibberish",
            Self::Billable => "Billable",
        }
    }
}

impl std::fmt::Display for PageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable result of classifying one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// 1-based page number.
    pub page_number: u32,
    pub status: PageStatus,
    /// Length of the native (or page-OCR) text, before embedded-image OCR
    /// text is appended.
    pub extracted_text_length: usize,
}

/// Lifecycle of one document inside a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentState {
    /// Not yet started.
    Pending,
    /// Pages are being classified.
    Running,
    /// Every page classified; a report exists.
    Completed,
    /// Stopped at a page checkpoint; partial results discarded.
    Cancelled,
    /// The document could not be opened at all.
    Failed,
}

/// Aggregate over one document's page records.
///
/// Invariant: `blank_pages + gibberish_pages + billable_pages == total_pages
/// == pages.len()`, and `pages[i].page_number == i + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReport {
    pub filename: String,
    pub total_pages: usize,
    pub blank_pages: usize,
    pub gibberish_pages: usize,
    pub billable_pages: usize,
    pub pages: Vec<PageRecord>,
}

impl DocumentReport {
    /// Start an empty report for `filename`.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            total_pages: 0,
            blank_pages: 0,
            gibberish_pages: 0,
            billable_pages: 0,
            pages: Vec::new(),
        }
    }

    /// Append the next page record and bump the matching counter.
    pub fn push(&mut self, record: PageRecord) {
        match record.status {
            PageStatus::Blank => self.blank_pages += 1,
            PageStatus::Gibberish => self.gibberish_pages += 1,
            PageStatus::Billable => self.billable_pages += 1,
        }
        self.total_pages += 1;
        self.pages.push(record);
    }

    /// Count for a single status.
    pub fn count(&self, status: PageStatus) -> usize {
        match status {
            PageStatus::Blank => self.blank_pages,
            PageStatus::Gibberish => self.gibberish_pages,
            PageStatus::Billable => self.billable_pages,
        }
    }

    /// One-line human-readable summary of the four counts.
    pub fn summary_line(&self) -> String {
        format!(
            "{}: {} pages ({} blank, {} gibberish, {} billable)",
            self.filename,
            self.total_pages,
            self.blank_pages,
            self.gibberish_pages,
            self.billable_pages
        )
    }

    /// Check the counting and numbering invariants.
    pub fn is_consistent(&self) -> bool {
        self.blank_pages + self.gibberish_pages + self.billable_pages == self.total_pages
            && self.total_pages == self.pages.len()
            && self
                .pages
                .iter()
                .enumerate()
                .all(|(i, page)| page.page_number as usize == i + 1)
    }
}

/// Cross-document totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTotals {
    pub total_pages: usize,
    pub blank_pages: usize,
    pub gibberish_pages: usize,
    pub billable_pages: usize,
}

/// Ordered document reports plus their running totals.
///
/// Built by folding completed documents; nothing is ever removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub documents: Vec<DocumentReport>,
    pub totals: PageTotals,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a completed document into the batch.
    pub fn add(&mut self, report: DocumentReport) {
        self.totals.total_pages += report.total_pages;
        self.totals.blank_pages += report.blank_pages;
        self.totals.gibberish_pages += report.gibberish_pages;
        self.totals.billable_pages += report.billable_pages;
        self.documents.push(report);
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// All page rows across documents, tagged with their filename.
    pub fn page_rows(&self) -> impl Iterator<Item = (&str, &PageRecord)> {
        self.documents.iter().flat_map(|doc| {
            doc.pages
                .iter()
                .map(move |page| (doc.filename.as_str(), page))
        })
    }
}

/// Terminal result of a batch run. Exactly one is produced per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BatchOutcome {
    /// At least one document completed and no cancellation was observed.
    Succeeded(BatchReport),
    /// Cancellation was observed at a page or document checkpoint.
    Cancelled,
    /// No document produced a report.
    Failed(String),
}

/// A decoded raster image: tightly packed 8-bit samples, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    /// Samples per pixel: 1 (gray), 3 (RGB) or 4 (RGBA).
    pub channels: u8,
    pub samples: Vec<u8>,
}

impl RawImage {
    pub fn new(width: u32, height: u32, channels: u8, samples: Vec<u8>) -> Self {
        Self {
            width,
            height,
            channels,
            samples,
        }
    }

    /// Total pixel count.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Normalise to 3-channel RGB. Gray is replicated; alpha is dropped.
    pub fn to_rgb(&self) -> RawImage {
        let samples = match self.channels {
            3 => self.samples.clone(),
            1 => self.samples.iter().flat_map(|&v| [v, v, v]).collect(),
            n => self
                .samples
                .chunks_exact(n.max(1) as usize)
                .flat_map(|px| {
                    if px.len() >= 3 {
                        [px[0], px[1], px[2]]
                    } else {
                        [px[0], px[0], px[0]]
                    }
                })
                .collect(),
        };
        RawImage::new(self.width, self.height, 3, samples)
    }
}

/// Encoding of an image embedded in a document, as reported by the accessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageEncoding {
    Png,
    Jpeg,
    Bmp,
    Tiff,
    /// Anything else (JPEG 2000, JBIG2, CCITT fax, ...), by its short name.
    Other(String),
}

impl ImageEncoding {
    /// Map a lower-case extension to an encoding.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            "bmp" => Self::Bmp,
            "tif" | "tiff" => Self::Tiff,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether the OCR pipeline accepts this encoding.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    pub fn extension(&self) -> &str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::Other(name) => name,
        }
    }
}

/// Handle to an image embedded on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageRef {
    /// Object number of the image stream.
    pub id: u32,
    /// Generation number of the image stream.
    pub generation: u16,
}

/// Encoded bytes of an embedded image plus its declared geometry.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub encoding: ImageEncoding,
    pub width: u32,
    pub height: u32,
}
