// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments and how they override the configuration file.

use std::path::PathBuf;

use clap::Parser;
use pagetally_core::config::AnalysisConfig;
use pagetally_core::error::TallyError;

#[derive(Debug, Parser)]
#[command(name = "pagetally")]
#[command(about = "Classify PDF pages as Blank, Gibberish, or Billable")]
#[command(version)]
pub struct Cli {
    /// PDF files to analyze, in order
    #[arg(required_unless_present = "write_config")]
    pub files: Vec<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, env = "PAGETALLY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write the effective configuration to this path and exit
    #[arg(long)]
    pub write_config: Option<PathBuf>,

    /// Minimum trimmed characters for a page not to be blank
    #[arg(long)]
    pub blank_threshold: Option<usize>,

    /// Minimum fraction of dictionary words for a page not to be gibberish
    #[arg(long)]
    pub word_ratio: Option<f64>,

    /// Fraction of white pixels above which a rendered page skips OCR
    #[arg(long)]
    pub whiteness: Option<f64>,

    /// Resolution for rendering pages before OCR
    #[arg(long)]
    pub dpi: Option<u32>,

    /// Run the full cascade on every page, even when native text suffices
    #[arg(long)]
    pub no_fast_accept: bool,

    /// Path to the tesseract binary
    #[arg(long, env = "TESSERACT_CMD")]
    pub tesseract: Option<PathBuf>,

    /// Tesseract trained-data directory
    #[arg(long)]
    pub tessdata: Option<PathBuf>,

    /// Word list or hunspell .dic file
    #[arg(long)]
    pub dictionary: Option<PathBuf>,

    /// Write one row per document to this CSV file
    #[arg(long)]
    pub summary_csv: Option<PathBuf>,

    /// Write one row per page to this CSV file
    #[arg(long)]
    pub pages_csv: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Load the config file (or defaults), apply flags, and validate.
    pub fn resolve_config(&self) -> Result<AnalysisConfig, TallyError> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::load(path)?,
            None => AnalysisConfig::default(),
        };
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut AnalysisConfig) {
        if let Some(value) = self.blank_threshold {
            config.thresholds.blank_char_threshold = value;
        }
        if let Some(value) = self.word_ratio {
            config.thresholds.valid_word_ratio_threshold = value;
        }
        if let Some(value) = self.whiteness {
            config.thresholds.whiteness_ratio_threshold = value;
        }
        if let Some(value) = self.dpi {
            config.ocr_dpi = value;
        }
        if self.no_fast_accept {
            config.fast_accept = false;
        }
        if let Some(path) = &self.tesseract {
            config.ocr.tesseract_cmd = path.clone();
        }
        if let Some(path) = &self.tessdata {
            config.ocr.tessdata_dir = Some(path.clone());
        }
        if let Some(path) = &self.dictionary {
            config.dictionary_path = Some(path.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "pagetally",
            "--blank-threshold",
            "50",
            "--word-ratio",
            "0.2",
            "--dpi",
            "300",
            "--no-fast-accept",
            "--tessdata",
            "/opt/tessdata",
            "a.pdf",
            "b.pdf",
        ])
        .expect("parse");

        let config = cli.resolve_config().expect("config");
        assert_eq!(cli.files, vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")]);
        assert_eq!(config.thresholds.blank_char_threshold, 50);
        assert_eq!(config.thresholds.valid_word_ratio_threshold, 0.2);
        assert_eq!(config.thresholds.whiteness_ratio_threshold, 0.98);
        assert_eq!(config.ocr_dpi, 300);
        assert!(!config.fast_accept);
        assert_eq!(config.ocr.tessdata_dir, Some(PathBuf::from("/opt/tessdata")));
    }

    #[test]
    fn flags_win_over_the_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pagetally.json");
        std::fs::write(&path, r#"{"thresholds": {"blank_char_threshold": 70}, "ocr_dpi": 150}"#)
            .expect("write");

        let cli = Cli::try_parse_from([
            "pagetally",
            "--config",
            path.to_str().expect("utf8 path"),
            "--dpi",
            "200",
            "scan.pdf",
        ])
        .expect("parse");
        let config = cli.resolve_config().expect("config");
        assert_eq!(config.thresholds.blank_char_threshold, 70);
        assert_eq!(config.ocr_dpi, 200);
    }

    #[test]
    fn out_of_range_override_is_rejected() {
        let cli = Cli::try_parse_from(["pagetally", "--whiteness", "1.5", "a.pdf"]).expect("parse");
        assert!(matches!(cli.resolve_config(), Err(TallyError::Config(_))));
    }

    #[test]
    fn files_are_required() {
        assert!(Cli::try_parse_from(["pagetally"]).is_err());
        assert!(Cli::try_parse_from(["pagetally", "--write-config", "out.json"]).is_ok());
    }
}
