// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: page text, page rasterization, and embedded image extraction.

mod images;
pub mod raster;
pub mod reader;

pub use raster::PdftoppmRasterizer;
pub use reader::{LopdfSource, PdfReader};
