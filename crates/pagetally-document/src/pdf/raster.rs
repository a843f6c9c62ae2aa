// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rasterizer: renders a single PDF page to pixels through poppler's
// `pdftoppm`, then decodes the PNG it writes.

use std::path::{Path, PathBuf};
use std::process::Command;

use pagetally_core::error::TallyError;
use pagetally_core::types::RawImage;
use tempfile::TempDir;
use tracing::{debug, instrument};

/// Output file prefix inside the scratch directory.
const OUTPUT_PREFIX: &str = "page";

/// Renders pages with an external `pdftoppm` binary.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    /// Path or name of the binary.
    command: PathBuf,
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

impl PdftoppmRasterizer {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Whether the binary can be launched at all.
    pub fn is_available(&self) -> bool {
        Command::new(&self.command).arg("-v").output().is_ok()
    }

    /// Render page `index` (0-based) of the PDF at `pdf_path` to RGB pixels.
    #[instrument(skip(self), fields(pdf = %pdf_path.display()))]
    pub fn render(&self, pdf_path: &Path, index: usize, dpi: u32) -> Result<RawImage, TallyError> {
        let scratch = TempDir::new()?;
        let prefix = scratch.path().join(OUTPUT_PREFIX);
        let page = (index + 1).to_string();

        let output = Command::new(&self.command)
            .args(["-png", "-singlefile", "-r", &dpi.to_string(), "-f", &page, "-l", &page])
            .arg(pdf_path)
            .arg(&prefix)
            .output();

        match output {
            Ok(output) if output.status.success() => {}
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(TallyError::Rasterize(format!(
                    "pdftoppm failed on page {page}: {}",
                    stderr.trim()
                )));
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(TallyError::Rasterize(format!(
                    "{} not found (install poppler-utils)",
                    self.command.display()
                )));
            }
            Err(err) => return Err(TallyError::Io(err)),
        }

        let png_path = prefix.with_extension("png");
        let rendered = image::open(&png_path).map_err(|err| {
            TallyError::Rasterize(format!("cannot read rendered page {page}: {err}"))
        })?;
        let rgb = rendered.to_rgb8();
        let (width, height) = rgb.dimensions();
        debug!(page = index + 1, width, height, dpi, "Page rasterized");

        Ok(RawImage::new(width, height, 3, rgb.into_raw()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_reports_install_hint() {
        let rasterizer = PdftoppmRasterizer::new("/nonexistent/bin/pdftoppm");
        let err = rasterizer
            .render(Path::new("/tmp/none.pdf"), 0, 100)
            .expect_err("binary does not exist");
        assert!(matches!(err, TallyError::Rasterize(ref msg) if msg.contains("not found")));
        assert!(!rasterizer.is_available());
    }
}
