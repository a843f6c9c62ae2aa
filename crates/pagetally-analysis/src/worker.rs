// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Background worker: runs a batch on its own OS thread so OCR and PDF
// parsing block only the worker, and hands the caller an event receiver
// plus a cancellation handle.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use pagetally_core::config::AnalysisConfig;
use pagetally_core::error::TallyError;
use pagetally_core::traits::{DocumentSource, OcrEngine, WordValidity};
use pagetally_core::types::BatchOutcome;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::batch::BatchCoordinator;
use crate::cancel::CancellationFlag;
use crate::classifier::PageClassifier;
use crate::events::{AnalysisEvent, EventSink};

/// The external collaborators a run needs.
#[derive(Clone)]
pub struct Collaborators {
    pub documents: Arc<dyn DocumentSource>,
    pub ocr: Arc<dyn OcrEngine>,
    pub words: Arc<dyn WordValidity>,
}

/// Caller's side of a running batch.
pub struct BatchHandle {
    events: mpsc::UnboundedReceiver<AnalysisEvent>,
    cancel: CancellationFlag,
    join: Option<JoinHandle<BatchOutcome>>,
}

impl BatchHandle {
    /// Request cooperative cancellation.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A flag that cancels this batch, for use from another task.
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// Next event, or `None` once the worker has finished and the stream
    /// is drained.
    pub async fn next_event(&mut self) -> Option<AnalysisEvent> {
        self.events.recv().await
    }

    /// Blocking variant of [`BatchHandle::next_event`] for non-async callers.
    pub fn blocking_next_event(&mut self) -> Option<AnalysisEvent> {
        self.events.blocking_recv()
    }

    /// Wait for the worker thread and return its outcome.
    pub fn wait(mut self) -> BatchOutcome {
        match self.join.take().map(JoinHandle::join) {
            Some(Ok(outcome)) => outcome,
            Some(Err(_)) => {
                error!("analysis worker panicked");
                BatchOutcome::Failed("Analysis worker stopped unexpectedly.".into())
            }
            None => BatchOutcome::Failed("Analysis worker already joined.".into()),
        }
    }
}

impl Drop for BatchHandle {
    fn drop(&mut self) {
        if let Some(join) = self.join.take() {
            self.cancel.cancel();
            let _ = join.join();
        }
    }
}

/// Validate `config` and start analyzing `paths` on a background thread.
pub fn spawn_batch(
    paths: Vec<PathBuf>,
    config: &AnalysisConfig,
    collaborators: Collaborators,
) -> Result<BatchHandle, TallyError> {
    config.validate()?;

    let cancel = CancellationFlag::new();
    let (events, receiver) = EventSink::channel();
    let classifier = PageClassifier::new(config, collaborators.ocr, collaborators.words);
    let coordinator =
        BatchCoordinator::new(collaborators.documents, classifier, cancel.clone(), events);

    let join = std::thread::Builder::new()
        .name("pagetally-worker".into())
        .spawn(move || {
            info!(files = paths.len(), "analysis worker started");
            coordinator.run(&paths)
        })?;

    Ok(BatchHandle {
        events: receiver,
        cancel,
        join: Some(join),
    })
}
