// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pagetally: Core types, errors, configuration, and collaborator traits
// shared across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod traits;
pub mod types;

pub use config::{AnalysisConfig, OcrBackend, OcrSettings, Thresholds};
pub use error::TallyError;
pub use traits::{DocumentSource, OcrEngine, PageSource, WordValidity};
pub use types::*;
