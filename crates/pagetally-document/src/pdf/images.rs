// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Embedded image discovery and extraction.
//
// Walks page /Resources → /XObject for /Subtype /Image streams (following
// inherited resources and nested form XObjects) and turns each stream into
// encoded bytes the image pipeline understands.

use std::collections::HashSet;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pagetally_core::error::TallyError;
use pagetally_core::types::{EncodedImage, ImageEncoding, ImageRef};
use tracing::{debug, warn};

use crate::image::processor::encode_to_format;

/// Form XObjects nested deeper than this are not searched.
const MAX_FORM_DEPTH: usize = 4;

/// Collect every image XObject reachable from a page, in resource order.
pub(crate) fn page_image_refs(doc: &Document, page_id: ObjectId) -> Result<Vec<ImageRef>, TallyError> {
    let page_dict = doc
        .get_object(page_id)
        .and_then(Object::as_dict)
        .map_err(|err| TallyError::PdfError(format!("page object {:?}: {}", page_id, err)))?;

    let mut found = Vec::new();
    let mut seen = HashSet::new();
    if let Some(resources) = inherited_resources(doc, page_dict) {
        collect_images(doc, resources, 0, &mut seen, &mut found);
    }
    Ok(found)
}

/// Find /Resources on the page or the nearest ancestor that has it.
fn inherited_resources<'a>(doc: &'a Document, page: &'a Dictionary) -> Option<&'a Dictionary> {
    let mut node = page;
    for _ in 0..32 {
        if let Ok(resources) = node.get(b"Resources") {
            return resolve(doc, resources).as_dict().ok();
        }
        let parent = node.get(b"Parent").ok()?;
        node = resolve(doc, parent).as_dict().ok()?;
    }
    None
}

fn collect_images(
    doc: &Document,
    resources: &Dictionary,
    depth: usize,
    seen: &mut HashSet<ObjectId>,
    found: &mut Vec<ImageRef>,
) {
    let Some(xobjects) = resources
        .get(b"XObject")
        .ok()
        .and_then(|obj| resolve(doc, obj).as_dict().ok())
    else {
        return;
    };

    for (_name, entry) in xobjects.iter() {
        let Object::Reference(id) = entry else {
            continue;
        };
        if !seen.insert(*id) {
            continue;
        }
        let Ok(Object::Stream(stream)) = doc.get_object(*id) else {
            continue;
        };

        match subtype(&stream.dict) {
            Some(b"Image") => found.push(ImageRef {
                id: id.0,
                generation: id.1,
            }),
            Some(b"Form") if depth < MAX_FORM_DEPTH => {
                if let Some(inner) = stream
                    .dict
                    .get(b"Resources")
                    .ok()
                    .and_then(|obj| resolve(doc, obj).as_dict().ok())
                {
                    collect_images(doc, inner, depth + 1, seen, found);
                }
            }
            _ => {}
        }
    }
}

fn subtype(dict: &Dictionary) -> Option<&[u8]> {
    match dict.get(b"Subtype") {
        Ok(Object::Name(name)) => Some(name.as_slice()),
        _ => None,
    }
}

/// Resolve a PDF object reference to its target, or return the object as-is.
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Extract the encoded bytes of an image XObject.
pub(crate) fn extract_image(doc: &Document, image: &ImageRef) -> Result<EncodedImage, TallyError> {
    let id: ObjectId = (image.id, image.generation);
    let stream = match doc.get_object(id) {
        Ok(Object::Stream(stream)) => stream,
        Ok(_) => {
            return Err(TallyError::ImageError(format!(
                "object {} {} is not an image stream",
                image.id, image.generation
            )));
        }
        Err(err) => {
            return Err(TallyError::ImageError(format!(
                "image object {} {}: {}",
                image.id, image.generation, err
            )));
        }
    };

    let width = dimension(&stream.dict, b"Width")?;
    let height = dimension(&stream.dict, b"Height")?;
    let filters = filter_names(&stream.dict);

    // Formats whose stream content is already a complete encoded file.
    for (filter, encoding) in [
        (&b"DCTDecode"[..], ImageEncoding::Jpeg),
        (&b"JPXDecode"[..], ImageEncoding::Other("jpx".into())),
        (&b"JBIG2Decode"[..], ImageEncoding::Other("jbig2".into())),
        (&b"CCITTFaxDecode"[..], ImageEncoding::Other("fax".into())),
    ] {
        if filters.last().map(Vec::as_slice) == Some(filter) {
            let bytes = if filters.len() == 1 {
                stream.content.clone()
            } else {
                stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone())
            };
            return Ok(EncodedImage {
                bytes,
                encoding,
                width,
                height,
            });
        }
    }

    let content = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());

    // Some streams carry a complete image file.
    if let Ok(format) = image::guess_format(&content) {
        let encoding = match format {
            ImageFormat::Png => Some(ImageEncoding::Png),
            ImageFormat::Jpeg => Some(ImageEncoding::Jpeg),
            ImageFormat::Bmp => Some(ImageEncoding::Bmp),
            ImageFormat::Tiff => Some(ImageEncoding::Tiff),
            _ => None,
        };
        if let Some(encoding) = encoding {
            return Ok(EncodedImage {
                bytes: content,
                encoding,
                width,
                height,
            });
        }
    }

    // Raw pixel data: rebuild it as PNG using the stream's geometry.
    let png = reconstruct_raw_image(doc, stream, width, height, &content)?;
    debug!(
        id = image.id,
        width,
        height,
        png_size = png.len(),
        "Reconstructed raw image stream"
    );
    Ok(EncodedImage {
        bytes: png,
        encoding: ImageEncoding::Png,
        width,
        height,
    })
}

fn filter_names(dict: &Dictionary) -> Vec<Vec<u8>> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Object::Name(name) => Some(name.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Rebuild an image from raw 8-bit samples using the PDF metadata.
fn reconstruct_raw_image(
    doc: &Document,
    stream: &Stream,
    width: u32,
    height: u32,
    raw: &[u8],
) -> Result<Vec<u8>, TallyError> {
    let bpc = get_int(&stream.dict, b"BitsPerComponent").unwrap_or(8);
    if bpc != 8 {
        return Err(TallyError::UnsupportedImage(format!("{bpc}-bit raw samples")));
    }
    if width == 0 || height == 0 {
        return Err(TallyError::ImageError("image stream has no geometry".into()));
    }

    let channels = color_channels(doc, &stream.dict);
    if !(1..=4).contains(&channels) {
        return Err(TallyError::UnsupportedImage(format!(
            "{channels}-channel colour space"
        )));
    }
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(channels as usize))
        .ok_or_else(|| {
            TallyError::ImageError(format!(
                "image geometry {width}x{height}x{channels} overflows"
            ))
        })?;
    if raw.len() < expected {
        return Err(TallyError::ImageError(format!(
            "raw pixel buffer too small: {} bytes, expected {} ({}x{}x{})",
            raw.len(),
            expected,
            width,
            height,
            channels
        )));
    }
    let pixels = raw[..expected].to_vec();

    let img = match channels {
        1 => GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
        4 => {
            warn!("treating 4-channel image as RGBA");
            RgbaImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8)
        }
        other => {
            return Err(TallyError::UnsupportedImage(format!(
                "{other}-channel colour space"
            )));
        }
    }
    .ok_or_else(|| TallyError::ImageError("failed to wrap raw samples".into()))?;

    encode_to_format(&img, ImageFormat::Png)
}

/// A missing /Width or /Height reads as 0; negative or oversized values are errors.
fn dimension(dict: &Dictionary, key: &[u8]) -> Result<u32, TallyError> {
    let Ok(value) = get_int(dict, key) else {
        return Ok(0);
    };
    u32::try_from(value).map_err(|_| {
        TallyError::ImageError(format!(
            "invalid /{} {value} in image dictionary",
            String::from_utf8_lossy(key)
        ))
    })
}

/// Number of colour channels from the /ColorSpace entry.
fn color_channels(doc: &Document, dict: &Dictionary) -> i64 {
    let Ok(cs) = dict.get(b"ColorSpace") else {
        return 3;
    };
    match resolve(doc, cs) {
        Object::Name(name) => match name.as_slice() {
            b"DeviceGray" | b"CalGray" => 1,
            b"DeviceCMYK" => 4,
            _ => 3,
        },
        Object::Array(items) if !items.is_empty() => match &items[0] {
            Object::Name(name) if name == b"ICCBased" => items
                .get(1)
                .and_then(|stream_ref| match resolve(doc, stream_ref) {
                    Object::Stream(icc) => get_int(&icc.dict, b"N").ok(),
                    _ => None,
                })
                .unwrap_or(3),
            Object::Name(name) if name == b"Indexed" => 1,
            Object::Name(name) if name == b"CalGray" => 1,
            _ => 3,
        },
        _ => 3,
    }
}

fn get_int(dict: &Dictionary, key: &[u8]) -> Result<i64, TallyError> {
    dict.get(key)
        .and_then(Object::as_i64)
        .map_err(|_| {
            TallyError::ImageError(format!(
                "missing integer /{} in image dictionary",
                String::from_utf8_lossy(key)
            ))
        })
}
