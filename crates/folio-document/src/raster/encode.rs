// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster encoding: serialises a page buffer to PNG, JPEG or WebP, retrying
// once as PNG when the requested format cannot take the pixels.

use std::io::Cursor;

use folio_core::error::Result;
use folio_core::{FolioError, ImageFormat};
use image::codecs::jpeg::JpegEncoder;
use tracing::{instrument, warn};

use super::RasterBuffer;

/// Format every buffer can be written as.
pub const FALLBACK_FORMAT: ImageFormat = ImageFormat::Png;

/// An encoded page image.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// The format actually written, which may be the fallback.
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub page: u32,
}

/// Map a 0–1 quality to the JPEG encoder's 1–100 scale.
pub fn jpeg_quality(quality: f32) -> u8 {
    let quality = if quality.is_finite() { quality } else { 0.85 };
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encode `buffer` as `format`, retrying once as PNG on failure.
#[instrument(skip(buffer), fields(page = buffer.page(), width = buffer.width(), height = buffer.height()))]
pub fn encode(buffer: &RasterBuffer, format: ImageFormat, quality: f32) -> Result<EncodedImage> {
    let first = write(buffer, format, quality);
    let (format, bytes) = match first {
        Ok(bytes) => (format, bytes),
        Err(err) if format != FALLBACK_FORMAT => {
            warn!(?format, error = %err, "encode failed, retrying as PNG");
            let bytes = write(buffer, FALLBACK_FORMAT, quality).map_err(|fallback| {
                FolioError::EncodeFailure {
                    format: format!("{format:?}"),
                    detail: format!("{err}; PNG fallback also failed: {fallback}"),
                }
            })?;
            (FALLBACK_FORMAT, bytes)
        }
        Err(err) => {
            return Err(FolioError::EncodeFailure {
                format: format!("{format:?}"),
                detail: err.to_string(),
            });
        }
    };

    Ok(EncodedImage {
        format,
        bytes,
        width: buffer.width(),
        height: buffer.height(),
        page: buffer.page(),
    })
}

/// JPEG bytes with the given 0–1 quality; the alpha channel is dropped.
fn encode_jpeg(buffer: &RasterBuffer, quality: f32) -> image::ImageResult<Vec<u8>> {
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, jpeg_quality(quality));
    if buffer.is_grayscale() {
        buffer.to_dynamic().to_luma8().write_with_encoder(encoder)?;
    } else {
        buffer.to_dynamic().to_rgb8().write_with_encoder(encoder)?;
    }
    Ok(bytes)
}

fn write(buffer: &RasterBuffer, format: ImageFormat, quality: f32) -> image::ImageResult<Vec<u8>> {
    match format {
        ImageFormat::Jpeg => encode_jpeg(buffer, quality),
        ImageFormat::Png => {
            let mut bytes = Vec::new();
            buffer
                .as_image()
                .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
            Ok(bytes)
        }
        ImageFormat::Webp => {
            let mut bytes = Vec::new();
            buffer
                .as_image()
                .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::WebP)?;
            Ok(bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn buffer(width: u32, height: u32) -> RasterBuffer {
        RasterBuffer::from_image(1, RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255])))
    }

    #[test]
    fn png_and_jpeg_signatures() {
        let png = encode(&buffer(4, 4), ImageFormat::Png, 0.9).unwrap();
        assert_eq!(&png.bytes[..4], b"\x89PNG");
        let jpeg = encode(&buffer(4, 4), ImageFormat::Jpeg, 0.5).unwrap();
        assert_eq!(jpeg.format, ImageFormat::Jpeg);
        assert_eq!(&jpeg.bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn oversized_jpeg_falls_back_to_png() {
        // Baseline JPEG cannot address more than 65535 pixels per side.
        let encoded = encode(&buffer(70_000, 1), ImageFormat::Jpeg, 0.8).unwrap();
        assert_eq!(encoded.format, ImageFormat::Png);
        assert_eq!(encoded.width, 70_000);
    }

    #[test]
    fn quality_mapping_clamps() {
        assert_eq!(jpeg_quality(0.85), 85);
        assert_eq!(jpeg_quality(0.0), 1);
        assert_eq!(jpeg_quality(7.0), 100);
        assert_eq!(jpeg_quality(f32::NAN), 85);
    }
}
