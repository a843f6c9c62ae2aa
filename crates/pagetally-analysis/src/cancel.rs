// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cooperative cancellation shared between the caller and the worker.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cloneable stop request. The worker polls it at page and document
/// checkpoints; a page already in progress always runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    requested: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop. Idempotent.
    pub fn cancel(&self) {
        self.requested.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.requested.load(Ordering::Relaxed)
    }
}
