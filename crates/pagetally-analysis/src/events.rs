// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Outbound event stream from the analysis worker to its caller.
//
// Events travel over an unbounded tokio channel in emission order. Log lines
// are mirrored to `tracing` so headless runs keep a record even when nobody
// is listening on the channel.

use pagetally_core::types::{BatchOutcome, DocumentReport};
use tokio::sync::mpsc;
use tracing::{info, trace, warn};

/// What a progress event counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressScope {
    /// Pages within the current document.
    Pages,
    /// Files within the batch.
    Files,
}

/// One message from the worker.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisEvent {
    /// `current` of `total` units done.
    Progress {
        scope: ProgressScope,
        message: String,
        current: usize,
        total: usize,
    },
    /// Human-readable log line.
    Log(String),
    /// A document finished every page.
    DocumentResult(DocumentReport),
    /// Terminal outcome; sent exactly once, last.
    Outcome(BatchOutcome),
}

/// Sending half of the event stream.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<AnalysisEvent>>,
}

impl EventSink {
    /// A connected sink and the receiver the caller reads from.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AnalysisEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that only mirrors to `tracing`.
    pub fn detached() -> Self {
        Self { tx: None }
    }

    pub fn progress(
        &self,
        scope: ProgressScope,
        message: impl Into<String>,
        current: usize,
        total: usize,
    ) {
        let message = message.into();
        trace!(?scope, current, total, "{message}");
        self.send(AnalysisEvent::Progress {
            scope,
            message,
            current,
            total,
        });
    }

    pub fn log(&self, line: impl Into<String>) {
        let line = line.into();
        info!("{line}");
        self.send(AnalysisEvent::Log(line));
    }

    /// Log line for a soft or document-level failure.
    pub fn warn(&self, line: impl Into<String>) {
        let line = line.into();
        warn!("{line}");
        self.send(AnalysisEvent::Log(line));
    }

    pub fn document(&self, report: DocumentReport) {
        self.send(AnalysisEvent::DocumentResult(report));
    }

    pub fn outcome(&self, outcome: BatchOutcome) {
        self.send(AnalysisEvent::Outcome(outcome));
    }

    fn send(&self, event: AnalysisEvent) {
        if let Some(tx) = &self.tx {
            // A dropped receiver means the caller stopped listening; the
            // batch still runs to its outcome.
            if tx.send(event).is_err() {
                trace!("event receiver dropped");
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn drain(rx: &mut mpsc::UnboundedReceiver<AnalysisEvent>) -> Vec<AnalysisEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_arrive_in_emission_order() {
        let (sink, mut rx) = EventSink::channel();
        sink.progress(ProgressScope::Pages, "Analyzing page 1/2", 1, 2);
        sink.log("Page 1: Blank");
        sink.outcome(BatchOutcome::Cancelled);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], AnalysisEvent::Progress { scope: ProgressScope::Pages, current: 1, total: 2, .. }));
        assert_eq!(events[1], AnalysisEvent::Log("Page 1: Blank".into()));
        assert_eq!(events[2], AnalysisEvent::Outcome(BatchOutcome::Cancelled));
    }

    #[test]
    fn dropped_receiver_is_tolerated() {
        let (sink, rx) = EventSink::channel();
        drop(rx);
        sink.log("nobody is listening");
        EventSink::detached().log("nor here");
    }
}
