// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagetally-analysis: Page classification and batch orchestration.
//
// The classification cascade (native text, page raster OCR, embedded image
// OCR), the per-document and per-batch state machines with cooperative
// cancellation, the ordered event stream to the caller, and CSV export.

pub mod analyzer;
pub mod batch;
pub mod cancel;
pub mod classifier;
pub mod events;
pub mod export;
pub mod gibberish;
pub mod whiteness;
pub mod worker;

pub use analyzer::{DocumentAnalyzer, DocumentOutcome};
pub use batch::BatchCoordinator;
pub use cancel::CancellationFlag;
pub use classifier::{PageClassifier, Stage, StepText};
pub use events::{AnalysisEvent, EventSink, ProgressScope};
pub use export::{export_pages, export_summary, write_pages_csv, write_summary_csv};
pub use whiteness::PixelSampler;
pub use worker::{BatchHandle, Collaborators, spawn_batch};
