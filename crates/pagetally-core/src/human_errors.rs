// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the people running an audit.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity tells the presentation layer whether the run can simply be retried.

use crate::error::TallyError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Affects one page or image; the run carries on.
    PageLevel,
    /// The operator must fix something (missing tool, bad setting).
    ActionRequired,
    /// The input itself is unusable.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the operator should try.
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert a `TallyError` into a `HumanError`.
pub fn humanize_error(err: &TallyError) -> HumanError {
    match err {
        TallyError::PdfError(_) => HumanError {
            message: "This file could not be opened as a PDF.".into(),
            suggestion: "The file may be damaged or not a PDF. Open it in a viewer to check, then re-export it.".into(),
            severity: Severity::Permanent,
        },

        TallyError::TextExtraction(_) => HumanError {
            message: "The text layer of a page could not be read.".into(),
            suggestion: "The page was still classified using OCR where possible.".into(),
            severity: Severity::PageLevel,
        },

        TallyError::Rasterize(detail) => tool_error(
            detail,
            "A page could not be rendered for OCR.",
            "Install poppler-utils (pdftoppm) or point the configuration at the pdftoppm binary.",
        ),

        TallyError::ImageError(_) | TallyError::UnsupportedImage(_) => HumanError {
            message: "An embedded image could not be read.".into(),
            suggestion: "The image was skipped; the rest of the page was still classified.".into(),
            severity: Severity::PageLevel,
        },

        TallyError::OcrError(detail) => tool_error(
            detail,
            "Text recognition failed on a page image.",
            "Install tesseract-ocr, or set the tesseract binary and tessdata directory in the configuration.",
        ),

        TallyError::Dictionary(_) => HumanError {
            message: "No English word list is available.".into(),
            suggestion: "Install an en_US hunspell dictionary or pass a word list with --dictionary.".into(),
            severity: Severity::ActionRequired,
        },

        TallyError::Config(detail) => HumanError {
            message: "The analysis settings are not valid.".into(),
            suggestion: format!("Fix the setting and try again. ({detail})"),
            severity: Severity::ActionRequired,
        },

        TallyError::Export(_) => HumanError {
            message: "The report could not be written.".into(),
            suggestion: "Check the output folder exists and is writable.".into(),
            severity: Severity::ActionRequired,
        },

        TallyError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Check the path and try again.".into(),
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "Pagetally doesn't have permission to read that file.".into(),
                    suggestion: "Check the file permissions, or copy the file somewhere readable first.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                    severity: Severity::ActionRequired,
                }
            }
        }

        TallyError::Serialization(_) => HumanError {
            message: "The configuration file could not be parsed.".into(),
            suggestion: "Check the file is valid JSON.".into(),
            severity: Severity::ActionRequired,
        },
    }
}

/// Missing external tools are the operator's to fix; anything else is a
/// one-off failure on that page.
fn tool_error(detail: &str, message: &str, install_hint: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();
    if lower.contains("not found") || lower.contains("no such file") {
        HumanError {
            message: message.into(),
            suggestion: install_hint.into(),
            severity: Severity::ActionRequired,
        }
    } else {
        HumanError {
            message: message.into(),
            suggestion: format!("The page was classified without it. (Detail: {detail})"),
            severity: Severity::PageLevel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broken_pdf_is_permanent() {
        let human = humanize_error(&TallyError::PdfError("bad xref".into()));
        assert_eq!(human.severity, Severity::Permanent);
    }

    #[test]
    fn missing_tesseract_is_action_required() {
        let err = TallyError::OcrError("tesseract not found (install tesseract-ocr)".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.suggestion.contains("tesseract"));
    }

    #[test]
    fn ocr_crash_is_page_level() {
        let err = TallyError::OcrError("tesseract exited with status 1".into());
        assert_eq!(humanize_error(&err).severity, Severity::PageLevel);
    }

    #[test]
    fn bad_config_mentions_detail() {
        let err = TallyError::Config("ocr_dpi must be positive".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.suggestion.contains("ocr_dpi"));
    }

    #[test]
    fn missing_file_is_action_required() {
        let err = TallyError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);
    }
}
