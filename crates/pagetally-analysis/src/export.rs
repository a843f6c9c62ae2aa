// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CSV export of a batch report: one row per document, or one row per page.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use pagetally_core::error::TallyError;
use pagetally_core::types::BatchReport;
use tracing::{info, instrument};

const SUMMARY_HEADER: [&str; 5] = [
    "File",
    "Total Pages",
    "Blank Pages",
    "Gibberish Pages",
    "Billable Pages",
];
const PAGES_HEADER: [&str; 4] = ["File", "Page Number", "Status", "Text Length"];

fn escape_csv(s: &str) -> String {
    if s.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn write_row<W: Write, S: AsRef<str>>(out: &mut W, fields: &[S]) -> Result<(), TallyError> {
    let line = fields
        .iter()
        .map(|field| escape_csv(field.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(out, "{line}").map_err(|err| TallyError::Export(err.to_string()))
}

/// One row per document, optionally followed by a `TOTAL` row.
pub fn write_summary_csv<W: Write>(
    out: &mut W,
    report: &BatchReport,
    with_total: bool,
) -> Result<(), TallyError> {
    write_row(out, &SUMMARY_HEADER)?;
    for doc in &report.documents {
        write_row(
            out,
            &[
                doc.filename.clone(),
                doc.total_pages.to_string(),
                doc.blank_pages.to_string(),
                doc.gibberish_pages.to_string(),
                doc.billable_pages.to_string(),
            ],
        )?;
    }
    if with_total {
        let totals = &report.totals;
        write_row(
            out,
            &[
                "TOTAL".to_string(),
                totals.total_pages.to_string(),
                totals.blank_pages.to_string(),
                totals.gibberish_pages.to_string(),
                totals.billable_pages.to_string(),
            ],
        )?;
    }
    Ok(())
}

/// One row per classified page, in document then page order.
pub fn write_pages_csv<W: Write>(out: &mut W, report: &BatchReport) -> Result<(), TallyError> {
    write_row(out, &PAGES_HEADER)?;
    for (filename, page) in report.page_rows() {
        write_row(
            out,
            &[
                filename.to_string(),
                page.page_number.to_string(),
                page.status.to_string(),
                page.extracted_text_length.to_string(),
            ],
        )?;
    }
    Ok(())
}

/// Write the per-document summary to a file.
#[instrument(skip(report), fields(path = %path.display()))]
pub fn export_summary(path: &Path, report: &BatchReport) -> Result<(), TallyError> {
    let mut out = BufWriter::new(create(path)?);
    write_summary_csv(&mut out, report, true)?;
    out.flush()
        .map_err(|err| TallyError::Export(err.to_string()))?;
    info!(rows = report.documents.len(), "summary exported");
    Ok(())
}

/// Write the per-page detail to a file.
#[instrument(skip(report), fields(path = %path.display()))]
pub fn export_pages(path: &Path, report: &BatchReport) -> Result<(), TallyError> {
    let mut out = BufWriter::new(create(path)?);
    write_pages_csv(&mut out, report)?;
    out.flush()
        .map_err(|err| TallyError::Export(err.to_string()))?;
    info!(rows = report.totals.total_pages, "page detail exported");
    Ok(())
}

fn create(path: &Path) -> Result<File, TallyError> {
    File::create(path)
        .map_err(|err| TallyError::Export(format!("cannot create {}: {}", path.display(), err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagetally_core::types::{DocumentReport, PageRecord, PageStatus};

    fn sample_report() -> BatchReport {
        let mut first = DocumentReport::new("q1, \"final\".pdf");
        first.push(PageRecord {
            page_number: 1,
            status: PageStatus::Billable,
            extracted_text_length: 812,
        });
        first.push(PageRecord {
            page_number: 2,
            status: PageStatus::Blank,
            extracted_text_length: 0,
        });
        let mut second = DocumentReport::new("scan.pdf");
        second.push(PageRecord {
            page_number: 1,
            status: PageStatus::Gibberish,
            extracted_text_length: 140,
        });

        let mut batch = BatchReport::new();
        batch.add(first);
        batch.add(second);
        batch
    }

    #[test]
    fn summary_rows_with_total() {
        let mut out = Vec::new();
        write_summary_csv(&mut out, &sample_report(), true).expect("write");
        let csv = String::from_utf8(out).expect("utf8");
        assert_eq!(
            csv,
            "File,Total Pages,Blank Pages,Gibberish Pages,Billable Pages\n\
             \"q1, \"\"final\"\".pdf\",2,1,0,1\n\
             scan.pdf,1,0,1,0\n\
             TOTAL,3,1,1,1\n"
        );
    }

    #[test]
    fn page_rows_follow_document_order() {
        let mut out = Vec::new();
        write_pages_csv(&mut out, &sample_report()).expect("write");
        let csv = String::from_utf8(out).expect("utf8");
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "File,Page Number,Status,Text Length");
        assert_eq!(lines[2], "\"q1, \"\"final\"\".pdf\",2,Blank,0");
        assert_eq!(lines[3], "scan.pdf,1,Gibberish,140");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn line_breaks_are_quoted() {
        assert_eq!(escape_csv("a\r\nb"), "\"a\r\nb\"");
        assert_eq!(escape_csv("plain.pdf"), "plain.pdf");
    }

    #[test]
    fn files_are_written() {
        let dir = tempfile::tempdir().expect("tempdir");
        let summary = dir.path().join("summary.csv");
        let pages = dir.path().join("pages.csv");
        let report = sample_report();

        export_summary(&summary, &report).expect("summary");
        export_pages(&pages, &report).expect("pages");

        let written = std::fs::read_to_string(&summary).expect("read");
        assert!(written.ends_with("TOTAL,3,1,1,1\n"));
        assert_eq!(std::fs::read_to_string(&pages).expect("read").lines().count(), 4);
    }

    #[test]
    fn unwritable_path_is_an_export_error() {
        let result = export_pages(Path::new("/nonexistent/dir/pages.csv"), &sample_report());
        assert!(matches!(result, Err(TallyError::Export(_))));
    }
}
