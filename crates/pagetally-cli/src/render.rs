// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Terminal rendering of the analysis event stream.
//
// Progress drives two `indicatif` bars: files in the batch and pages in the
// current document. Document rows and the final table are printed with the
// bars suspended. Log events are already mirrored to the tracing subscriber
// on stderr and are not drawn here.

use std::io::{Stdout, Write};

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use pagetally_analysis::{AnalysisEvent, ProgressScope};
use pagetally_core::types::{BatchOutcome, BatchReport, DocumentReport};

const FILES_TEMPLATE: &str = "{spinner:.green} Files [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}";
const PAGES_TEMPLATE: &str = "  Pages [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}";

fn bar_style(template: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░")
}

/// Progress bars plus the writer that receives result rows.
pub struct ProgressView<W: Write> {
    multi: MultiProgress,
    files: ProgressBar,
    pages: ProgressBar,
    out: W,
}

impl ProgressView<Stdout> {
    /// Bars on stderr, rows and the table on stdout.
    pub fn terminal(file_count: usize) -> Self {
        Self::new(std::io::stdout(), file_count, ProgressDrawTarget::stderr())
    }
}

impl<W: Write> ProgressView<W> {
    pub fn new(out: W, file_count: usize, target: ProgressDrawTarget) -> Self {
        let multi = MultiProgress::with_draw_target(target);

        let files = multi.add(ProgressBar::new(file_count as u64));
        files.set_style(bar_style(FILES_TEMPLATE));
        files.set_message("Starting...");

        let pages = multi.add(ProgressBar::new(0));
        pages.set_style(bar_style(PAGES_TEMPLATE));

        Self {
            multi,
            files,
            pages,
            out,
        }
    }

    /// Draw one event. Write errors (a closed pipe) are ignored.
    pub fn handle(&mut self, event: &AnalysisEvent) {
        match event {
            AnalysisEvent::Progress {
                scope: ProgressScope::Pages,
                message,
                current,
                total,
            } => {
                if self.pages.length() != Some(*total as u64) {
                    self.pages.set_length(*total as u64);
                }
                self.pages.set_position(*current as u64);
                self.pages.set_message(message.clone());
            }
            AnalysisEvent::Progress {
                scope: ProgressScope::Files,
                message,
                current,
                total,
            } => {
                self.files.set_length(*total as u64);
                self.files.set_position(*current as u64);
                self.files.set_message(message.clone());
                self.pages.set_length(0);
                self.pages.set_position(0);
                self.pages.set_message("");
            }
            AnalysisEvent::Log(_) => {}
            AnalysisEvent::DocumentResult(report) => self.print(&document_row(report)),
            AnalysisEvent::Outcome(outcome) => {
                self.pages.finish_and_clear();
                self.files.finish_and_clear();
                let text = match outcome {
                    BatchOutcome::Succeeded(report) => summary_table(report),
                    BatchOutcome::Cancelled => "Analysis cancelled.".to_string(),
                    BatchOutcome::Failed(message) => message.clone(),
                };
                self.print(text.trim_end_matches('\n'));
            }
        }
    }

    fn print(&mut self, text: &str) {
        let out = &mut self.out;
        self.multi.suspend(|| {
            let _ = writeln!(out, "{text}");
            let _ = out.flush();
        });
    }
}

fn document_row(report: &DocumentReport) -> String {
    format!(
        "{:<40} {:>6} {:>6} {:>10} {:>9}",
        report.filename,
        report.total_pages,
        report.blank_pages,
        report.gibberish_pages,
        report.billable_pages
    )
}

/// Fixed-width table of per-document counts plus the batch total.
pub fn summary_table(report: &BatchReport) -> String {
    let mut table = format!(
        "\n{:<40} {:>6} {:>6} {:>10} {:>9}\n",
        "File", "Pages", "Blank", "Gibberish", "Billable"
    );
    for doc in &report.documents {
        table.push_str(&document_row(doc));
        table.push('\n');
    }
    let totals = &report.totals;
    table.push_str(&format!(
        "{:<40} {:>6} {:>6} {:>10} {:>9}\n",
        "TOTAL",
        totals.total_pages,
        totals.blank_pages,
        totals.gibberish_pages,
        totals.billable_pages
    ));
    table
}
