// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch coordinator: runs documents one after another, folds completed
// reports into batch totals, and produces exactly one terminal outcome.

use std::path::PathBuf;
use std::sync::Arc;

use pagetally_core::traits::DocumentSource;
use pagetally_core::types::{BatchOutcome, BatchReport, PageTotals};
use tracing::{info, instrument};

use crate::analyzer::{DocumentAnalyzer, DocumentOutcome, display_name};
use crate::cancel::CancellationFlag;
use crate::classifier::PageClassifier;
use crate::events::{EventSink, ProgressScope};

/// Failure message when no document produced a report.
pub const NO_REPORTS_MESSAGE: &str = "Analysis failed. Check the log for details.";

/// Log line for a cancelled batch.
pub const CANCELLED_MESSAGE: &str = "Analysis cancelled.";

pub struct BatchCoordinator {
    source: Arc<dyn DocumentSource>,
    classifier: PageClassifier,
    cancel: CancellationFlag,
    events: EventSink,
}

impl BatchCoordinator {
    pub fn new(
        source: Arc<dyn DocumentSource>,
        classifier: PageClassifier,
        cancel: CancellationFlag,
        events: EventSink,
    ) -> Self {
        Self {
            source,
            classifier,
            cancel,
            events,
        }
    }

    /// Analyze `paths` in order. The outcome is also sent as the final event.
    #[instrument(skip_all, fields(files = paths.len()))]
    pub fn run(&self, paths: &[PathBuf]) -> BatchOutcome {
        let outcome = self.run_documents(paths);
        match &outcome {
            BatchOutcome::Succeeded(report) => self.log_summary(&report.totals),
            BatchOutcome::Cancelled => self.events.log(CANCELLED_MESSAGE),
            BatchOutcome::Failed(message) => self.events.warn(message.clone()),
        }
        self.events.outcome(outcome.clone());
        outcome
    }

    fn run_documents(&self, paths: &[PathBuf]) -> BatchOutcome {
        let analyzer = DocumentAnalyzer::new(
            self.source.as_ref(),
            &self.classifier,
            &self.cancel,
            &self.events,
        );
        let total = paths.len();
        let mut batch = BatchReport::new();

        for (index, path) in paths.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return BatchOutcome::Cancelled;
            }
            let filename = display_name(path);
            self.events.log(format!("Processing file: {filename}"));

            match analyzer.analyze(path) {
                DocumentOutcome::Completed(report) => {
                    self.events.document(report.clone());
                    batch.add(report);
                }
                DocumentOutcome::Cancelled => return BatchOutcome::Cancelled,
                DocumentOutcome::Failed(reason) => {
                    info!(file = %filename, %reason, "document skipped");
                }
            }
            self.events.progress(
                ProgressScope::Files,
                format!("Processed {filename}"),
                index + 1,
                total,
            );
        }

        if batch.is_empty() {
            BatchOutcome::Failed(NO_REPORTS_MESSAGE.to_string())
        } else {
            BatchOutcome::Succeeded(batch)
        }
    }

    fn log_summary(&self, totals: &PageTotals) {
        self.events.log("Final Summary");
        self.events
            .log(format!("Total Pages: {}", totals.total_pages));
        self.events
            .log(format!("Blank Pages: {}", totals.blank_pages));
        self.events
            .log(format!("Gibberish Pages: {}", totals.gibberish_pages));
        self.events
            .log(format!("Billable Pages: {}", totals.billable_pages));
    }
}
