// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: open existing PDF documents with `lopdf` and expose, per page,
// the native text layer, a rasterized rendering, and the embedded images.

use std::path::{Path, PathBuf};

use lopdf::{Document, ObjectId};
use pagetally_core::error::TallyError;
use pagetally_core::traits::{DocumentSource, PageSource};
use pagetally_core::types::{EncodedImage, ImageRef, RawImage};
use tracing::{debug, info, instrument};

use super::images::{extract_image, page_image_refs};
use super::raster::PdftoppmRasterizer;

/// Reads an existing PDF file page by page.
///
/// Wraps `lopdf::Document` and implements [`PageSource`] so the classifier
/// can pull text and images for one page at a time.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
    /// Page object IDs in page order.
    page_ids: Vec<ObjectId>,
    /// The file on disk; `pdftoppm` renders from it.
    path: PathBuf,
    rasterizer: PdftoppmRasterizer,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(
        path: impl AsRef<Path>,
        rasterizer: PdftoppmRasterizer,
    ) -> Result<Self, TallyError> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            TallyError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        // `get_pages` is keyed by 1-based page number in ascending order.
        let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
        debug!(pages = page_ids.len(), "PDF loaded");

        Ok(Self {
            document,
            page_ids,
            path: path_ref.to_path_buf(),
            rasterizer,
        })
    }

    // -- Inspection -----------------------------------------------------------

    fn page_id(&self, index: usize) -> Result<ObjectId, TallyError> {
        self.page_ids.get(index).copied().ok_or_else(|| {
            TallyError::PdfError(format!(
                "page {} out of range (document has {} pages)",
                index + 1,
                self.page_ids.len()
            ))
        })
    }
}

impl PageSource for PdfReader {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_text(&self, index: usize) -> Result<String, TallyError> {
        self.page_id(index)?;
        let page_number = (index + 1) as u32;
        self.document
            .extract_text(&[page_number])
            .map_err(|err| TallyError::TextExtraction(format!("page {page_number}: {err}")))
    }

    fn rasterize(&self, index: usize, dpi: u32) -> Result<RawImage, TallyError> {
        self.page_id(index)?;
        self.rasterizer.render(&self.path, index, dpi)
    }

    fn embedded_images(&self, index: usize) -> Result<Vec<ImageRef>, TallyError> {
        let page_id = self.page_id(index)?;
        page_image_refs(&self.document, page_id)
    }

    fn decode_image(&self, image: &ImageRef) -> Result<EncodedImage, TallyError> {
        extract_image(&self.document, image)
    }
}

/// Opens PDFs from disk with `lopdf`.
#[derive(Debug, Clone, Default)]
pub struct LopdfSource {
    rasterizer: PdftoppmRasterizer,
}

impl LopdfSource {
    pub fn new(rasterizer: PdftoppmRasterizer) -> Self {
        Self { rasterizer }
    }
}

impl DocumentSource for LopdfSource {
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource>, TallyError> {
        let reader = PdfReader::open(path, self.rasterizer.clone())?;
        Ok(Box::new(reader))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use lopdf::{Object, Stream, dictionary};
    use pagetally_core::types::ImageEncoding;

    use crate::image::processor::encode_to_format;

    fn make_test_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([128u8, 128, 128]));
        encode_to_format(&DynamicImage::ImageRgb8(img), ImageFormat::Jpeg).expect("encode jpeg")
    }

    /// Write a PDF with one page per entry in `texts`; the first page also
    /// carries an embedded JPEG when `jpeg` is given.
    fn make_pdf(texts: &[&str], jpeg: Option<&[u8]>) -> tempfile::NamedTempFile {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let image_id = jpeg.map(|bytes| {
            let mut stream = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 40,
                    "Height" => 20,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                    "Filter" => "DCTDecode",
                },
                bytes.to_vec(),
            );
            stream.allows_compression = false;
            doc.add_object(stream)
        });

        let mut kids = Vec::new();
        for (i, text) in texts.iter().enumerate() {
            let content = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

            let mut resources = dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            };
            if let (0, Some(image_id)) = (i, image_id) {
                resources.set("XObject", dictionary! { "Im1" => image_id });
            }

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
                "Resources" => resources,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut file = tempfile::Builder::new()
            .suffix(".pdf")
            .tempfile()
            .expect("tempfile");
        doc.save_to(&mut file).expect("save pdf");
        file.flush().expect("flush");
        file
    }

    fn open(file: &tempfile::NamedTempFile) -> Box<dyn PageSource> {
        LopdfSource::default().open(file.path()).expect("load")
    }

    #[test]
    fn page_count_and_text() {
        let pdf = make_pdf(&["Hello invoice", "Second page"], None);
        let reader = open(&pdf);

        assert_eq!(reader.page_count(), 2);
        assert!(reader.page_text(0).expect("text").contains("Hello invoice"));
        assert!(reader.page_text(1).expect("text").contains("Second page"));
    }

    #[test]
    fn out_of_range_page_is_an_error() {
        let pdf = make_pdf(&["Only page"], None);
        let reader = open(&pdf);
        assert!(reader.page_text(3).is_err());
        assert!(reader.embedded_images(3).is_err());
        assert!(reader.rasterize(3, 100).is_err());
    }

    #[test]
    fn embedded_jpeg_is_listed_and_extracted() {
        let jpeg = make_test_jpeg(40, 20);
        let pdf = make_pdf(&["Scanned", "No images here"], Some(&jpeg));
        let reader = open(&pdf);

        let refs = reader.embedded_images(0).expect("images");
        assert_eq!(refs.len(), 1);
        assert!(reader.embedded_images(1).expect("images").is_empty());

        let encoded = reader.decode_image(&refs[0]).expect("decode");
        assert_eq!(encoded.encoding, ImageEncoding::Jpeg);
        assert_eq!((encoded.width, encoded.height), (40, 20));
        assert_eq!(encoded.bytes, jpeg);
    }

    #[test]
    fn raw_rgb_stream_is_reconstructed_as_png() {
        let mut doc = Document::with_version("1.5");
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 2,
                "Height" => 2,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            vec![255u8; 12],
        ));
        let image = ImageRef {
            id: image_id.0,
            generation: image_id.1,
        };

        let encoded = extract_image(&doc, &image).expect("extract");
        assert_eq!(encoded.encoding, ImageEncoding::Png);
        let decoded = image::load_from_memory(&encoded.bytes).expect("valid png");
        assert_eq!((decoded.width(), decoded.height()), (2, 2));
    }

    #[test]
    fn rasterize_renders_from_the_opened_file() {
        let pdf = make_pdf(&["Rendered"], None);
        let missing = PdftoppmRasterizer::new("/nonexistent/bin/pdftoppm");
        let reader = PdfReader::open(pdf.path(), missing).expect("load");

        let err = reader.rasterize(0, 100).expect_err("no rasterizer binary");
        assert!(matches!(err, TallyError::Rasterize(ref msg) if msg.contains("not found")));
    }

    #[test]
    fn open_missing_file_fails() {
        let source = LopdfSource::default();
        let result = source.open(Path::new("/nonexistent/missing.pdf"));
        assert!(matches!(result, Err(TallyError::PdfError(_))));
    }

    #[test]
    fn open_non_pdf_file_fails() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().expect("tempfile");
        file.write_all(b"this is not a pdf").expect("write");
        let source = LopdfSource::default();
        assert!(source.open(file.path()).is_err());
    }
}
