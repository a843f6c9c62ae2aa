// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pagetally: per-page Blank / Gibberish / Billable classification.
//
// Entry point. Initialises logging, resolves configuration, starts the
// analysis worker, renders its events, and maps the outcome to an exit code.

mod cli;
mod render;
mod services;

use std::process::ExitCode;

use clap::Parser;
use pagetally_analysis::{BatchHandle, export_pages, export_summary, spawn_batch};
use pagetally_core::error::TallyError;
use pagetally_core::human_errors::humanize_error;
use pagetally_core::types::BatchOutcome;
use tracing::{error, info, warn};

use cli::Cli;

/// Conventional exit status for a run stopped by SIGINT.
const EXIT_CANCELLED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            let human = humanize_error(&err);
            error!(error = %err, "pagetally stopped");
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, TallyError> {
    let config = cli.resolve_config()?;

    if let Some(path) = &cli.write_config {
        config.save(path)?;
        info!(path = %path.display(), "configuration written");
        return Ok(ExitCode::SUCCESS);
    }

    info!(files = cli.files.len(), "Pagetally starting");
    let collaborators = services::build_collaborators(&config)?;
    let mut handle = spawn_batch(cli.files.clone(), &config, collaborators)?;

    let cancel = handle.cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("cancellation requested; finishing the current page");
            cancel.cancel();
        }
    });

    let outcome = drain_events(&mut handle, cli.files.len()).await?;

    match outcome {
        BatchOutcome::Succeeded(report) => {
            if let Some(path) = &cli.summary_csv {
                export_summary(path, &report)?;
            }
            if let Some(path) = &cli.pages_csv {
                export_pages(path, &report)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        BatchOutcome::Cancelled => Ok(ExitCode::from(EXIT_CANCELLED)),
        BatchOutcome::Failed(_) => Ok(ExitCode::FAILURE),
    }
}

/// Render events until the worker hangs up, then collect its outcome.
async fn drain_events(
    handle: &mut BatchHandle,
    file_count: usize,
) -> Result<BatchOutcome, TallyError> {
    let mut view = render::ProgressView::terminal(file_count);
    let mut outcome = None;
    while let Some(event) = handle.next_event().await {
        view.handle(&event);
        if let pagetally_analysis::AnalysisEvent::Outcome(result) = event {
            outcome = Some(result);
        }
    }
    outcome.ok_or_else(|| TallyError::Io(std::io::Error::other("analysis worker ended without an outcome")))
}
