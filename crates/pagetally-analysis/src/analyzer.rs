// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document analyzer: classifies every page of one document in order and
// folds the records into a report. All pages or nothing: a cancelled
// document yields no report.

use std::path::Path;

use pagetally_core::traits::DocumentSource;
use pagetally_core::types::{DocumentReport, DocumentState};
use tracing::{debug, instrument};

use crate::cancel::CancellationFlag;
use crate::classifier::PageClassifier;
use crate::events::{EventSink, ProgressScope};

/// How one document ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentOutcome {
    Completed(DocumentReport),
    /// Stopped at a page checkpoint; partial records were discarded.
    Cancelled,
    /// The document could not be opened.
    Failed(String),
}

impl DocumentOutcome {
    pub fn state(&self) -> DocumentState {
        match self {
            Self::Completed(_) => DocumentState::Completed,
            Self::Cancelled => DocumentState::Cancelled,
            Self::Failed(_) => DocumentState::Failed,
        }
    }
}

/// Display name for a document path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub struct DocumentAnalyzer<'a> {
    source: &'a dyn DocumentSource,
    classifier: &'a PageClassifier,
    cancel: &'a CancellationFlag,
    events: &'a EventSink,
}

impl<'a> DocumentAnalyzer<'a> {
    pub fn new(
        source: &'a dyn DocumentSource,
        classifier: &'a PageClassifier,
        cancel: &'a CancellationFlag,
        events: &'a EventSink,
    ) -> Self {
        Self {
            source,
            classifier,
            cancel,
            events,
        }
    }

    #[instrument(skip_all, fields(file = %path.display()))]
    pub fn analyze(&self, path: &Path) -> DocumentOutcome {
        let filename = display_name(path);
        debug!(state = ?DocumentState::Pending, "document queued");

        let document = match self.source.open(path) {
            Ok(document) => document,
            Err(err) => {
                let reason = err.to_string();
                self.events
                    .warn(format!("Error processing {filename}: {reason}"));
                debug!(state = ?DocumentState::Failed);
                return DocumentOutcome::Failed(reason);
            }
        };

        let total = document.page_count();
        debug!(state = ?DocumentState::Running, pages = total);
        let mut report = DocumentReport::new(filename);

        for index in 0..total {
            if self.cancel.is_cancelled() {
                debug!(state = ?DocumentState::Cancelled, page = index + 1);
                return DocumentOutcome::Cancelled;
            }
            let record = self.classifier.classify(document.as_ref(), index, self.events);
            report.push(record);
            self.events.progress(
                ProgressScope::Pages,
                format!("Analyzing page {}/{}", index + 1, total),
                index + 1,
                total,
            );
        }

        self.events.log(report.summary_line());
        debug!(state = ?DocumentState::Completed);
        DocumentOutcome::Completed(report)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    use pagetally_core::config::AnalysisConfig;
    use pagetally_core::error::TallyError;
    use pagetally_core::traits::PageSource;
    use pagetally_core::types::{EncodedImage, ImageRef, PageStatus, RawImage};

    use crate::classifier::tests::{FakePage, PANGRAM, ScriptedOcr, Vocabulary};
    use crate::events::{AnalysisEvent, drain};

    /// Pages served from memory; cancels `flag` once `cancel_after` pages
    /// have had their text read.
    pub(crate) struct MemoryPages {
        pages: Vec<FakePage>,
        cancel: Option<(usize, CancellationFlag)>,
        reads: std::sync::atomic::AtomicUsize,
    }

    impl PageSource for MemoryPages {
        fn page_count(&self) -> usize {
            self.pages.len()
        }

        fn page_text(&self, index: usize) -> Result<String, TallyError> {
            let reads = self.reads.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
            if let Some((after, flag)) = &self.cancel {
                if reads >= *after {
                    flag.cancel();
                }
            }
            Ok(self.pages[index].text.clone().unwrap_or_default())
        }

        fn rasterize(&self, _index: usize, _dpi: u32) -> Result<RawImage, TallyError> {
            Ok(crate::classifier::tests::white_raster())
        }

        fn embedded_images(&self, _index: usize) -> Result<Vec<ImageRef>, TallyError> {
            Ok(Vec::new())
        }

        fn decode_image(&self, _image: &ImageRef) -> Result<EncodedImage, TallyError> {
            Err(TallyError::ImageError("no images".into()))
        }
    }

    /// Document source double keyed by file name. Unknown names fail to open.
    #[derive(Default)]
    pub(crate) struct MemoryLibrary {
        pub(crate) documents: Vec<(String, Vec<FakePage>)>,
        /// Cancel after this many page reads across all documents.
        pub(crate) cancel_after: Option<(usize, CancellationFlag)>,
    }

    impl DocumentSource for MemoryLibrary {
        fn open(&self, path: &Path) -> Result<Box<dyn PageSource>, TallyError> {
            let name = display_name(path);
            let pages = self
                .documents
                .iter()
                .find(|(doc, _)| *doc == name)
                .map(|(_, pages)| pages.clone())
                .ok_or_else(|| TallyError::PdfError(format!("{name}: not a PDF")))?;
            Ok(Box::new(MemoryPages {
                pages,
                cancel: self.cancel_after.clone(),
                reads: Default::default(),
            }))
        }
    }

    pub(crate) fn test_classifier() -> PageClassifier {
        PageClassifier::new(
            &AnalysisConfig::default(),
            Arc::new(ScriptedOcr::returning("")),
            Arc::new(Vocabulary::english()),
        )
    }

    pub(crate) fn billable() -> FakePage {
        FakePage::text(&PANGRAM.repeat(3))
    }

    pub(crate) fn blank() -> FakePage {
        FakePage::text("")
    }

    pub(crate) fn gibberish() -> FakePage {
        FakePage::text(&"xq zt plkj wvbn ".repeat(10))
    }

    #[test]
    fn completed_report_is_consistent() {
        let library = MemoryLibrary {
            documents: vec![(
                "mixed.pdf".into(),
                vec![billable(), blank(), gibberish(), billable()],
            )],
            ..MemoryLibrary::default()
        };
        let classifier = test_classifier();
        let cancel = CancellationFlag::new();
        let (events, mut rx) = EventSink::channel();

        let outcome = DocumentAnalyzer::new(&library, &classifier, &cancel, &events)
            .analyze(&PathBuf::from("/scans/mixed.pdf"));

        let DocumentOutcome::Completed(report) = outcome else {
            panic!("expected a completed document");
        };
        assert_eq!(report.filename, "mixed.pdf");
        assert!(report.is_consistent());
        assert_eq!(report.total_pages, 4);
        assert_eq!(report.billable_pages, 2);
        assert_eq!(report.blank_pages, 1);
        assert_eq!(report.gibberish_pages, 1);
        assert_eq!(report.pages[2].status, PageStatus::Gibberish);

        let events = drain(&mut rx);
        let progress: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                AnalysisEvent::Progress { message, current, total, .. } => {
                    Some((message.clone(), *current, *total))
                }
                _ => None,
            })
            .collect();
        assert_eq!(progress.len(), 4);
        assert_eq!(progress[3], ("Analyzing page 4/4".to_string(), 4, 4));
        assert_eq!(
            events.last(),
            Some(&AnalysisEvent::Log(
                "mixed.pdf: 4 pages (1 blank, 1 gibberish, 2 billable)".into()
            ))
        );
    }

    #[test]
    fn unopenable_document_fails() {
        let library = MemoryLibrary::default();
        let classifier = test_classifier();
        let cancel = CancellationFlag::new();
        let (events, mut rx) = EventSink::channel();

        let outcome = DocumentAnalyzer::new(&library, &classifier, &cancel, &events)
            .analyze(Path::new("broken.pdf"));

        assert_eq!(outcome.state(), DocumentState::Failed);
        let events = drain(&mut rx);
        assert!(matches!(
            &events[0],
            AnalysisEvent::Log(line) if line.starts_with("Error processing broken.pdf")
        ));
    }

    #[test]
    fn cancellation_mid_document_discards_partial_pages() {
        let cancel = CancellationFlag::new();
        let library = MemoryLibrary {
            documents: vec![("long.pdf".into(), vec![billable(); 5])],
            cancel_after: Some((2, cancel.clone())),
        };
        let classifier = test_classifier();
        let (events, mut rx) = EventSink::channel();

        let outcome = DocumentAnalyzer::new(&library, &classifier, &cancel, &events)
            .analyze(Path::new("long.pdf"));

        assert_eq!(outcome, DocumentOutcome::Cancelled);
        // The page in flight when cancellation arrived still finished.
        let pages_done = drain(&mut rx)
            .into_iter()
            .filter(|e| matches!(e, AnalysisEvent::Progress { .. }))
            .count();
        assert_eq!(pages_done, 2);
    }

    #[test]
    fn empty_document_completes_with_zero_pages() {
        let library = MemoryLibrary {
            documents: vec![("empty.pdf".into(), Vec::new())],
            ..MemoryLibrary::default()
        };
        let classifier = test_classifier();
        let cancel = CancellationFlag::new();
        let events = EventSink::detached();

        let outcome = DocumentAnalyzer::new(&library, &classifier, &cancel, &events)
            .analyze(Path::new("empty.pdf"));

        let DocumentOutcome::Completed(report) = outcome else {
            panic!("expected a completed document");
        };
        assert_eq!(report.total_pages, 0);
        assert!(report.is_consistent());
    }
}
