// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF composer: builds an output PDF one raster-backed page at a time using
// `lopdf`.
//
// Only encoded image streams are kept between pages, never raw pixels. The
// first page fixes the default MediaBox on the page tree; every later page
// carries its own, so page sizes may differ within one output.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, info, instrument, warn};

use folio_core::error::Result;
use folio_core::{FolioError, OutputPageSize, PT_PER_MM};

use crate::raster::{RasterBuffer, jpeg_quality};

/// Producer string written to the `/Info` dictionary.
pub const PRODUCER: &str = concat!("folio ", env!("CARGO_PKG_VERSION"));

/// How composed pages are written.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeOptions {
    /// Blank border kept around the image on every side.
    pub margin_mm: f32,
    /// JPEG quality in 0–1.
    pub quality: f32,
    pub title: Option<String>,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            margin_mm: 0.0,
            quality: 0.85,
            title: None,
        }
    }
}

/// An output PDF under construction.
pub struct ComposedDocument {
    document: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    default_size: Option<OutputPageSize>,
    options: ComposeOptions,
}

impl ComposedDocument {
    pub fn new(options: ComposeOptions) -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        Self {
            document,
            pages_id,
            kids: Vec::new(),
            default_size: None,
            options,
        }
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Size set by the first appended page.
    pub fn default_size(&self) -> Option<OutputPageSize> {
        self.default_size
    }

    /// Append `buffer` as a new page of physical size `size`.
    ///
    /// The image is the page's only content: scaled to fill the area inside
    /// the margin with its aspect ratio kept, and centred.
    #[instrument(skip(self, buffer), fields(page = buffer.page(), width = buffer.width(), height = buffer.height()))]
    pub fn append_image_page(&mut self, buffer: &RasterBuffer, size: OutputPageSize) -> Result<()> {
        let image_id = self.embed_image(buffer)?;

        let page_w = size.width_pt();
        let page_h = size.height_pt();
        let margin = (self.options.margin_mm.max(0.0) * PT_PER_MM)
            .min((page_w.min(page_h) / 2.0 - 1.0).max(0.0));
        let avail_w = page_w - 2.0 * margin;
        let avail_h = page_h - 2.0 * margin;

        let fit = (avail_w / buffer.width() as f32).min(avail_h / buffer.height() as f32);
        let draw_w = buffer.width() as f32 * fit;
        let draw_h = buffer.height() as f32 * fit;
        let x = margin + (avail_w - draw_w) / 2.0;
        let y = margin + (avail_h - draw_h) / 2.0;

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        draw_w.into(),
                        0.into(),
                        0.into(),
                        draw_h.into(),
                        x.into(),
                        y.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content
            .encode()
            .map_err(|err| FolioError::PdfError(format!("page content: {err}")))?;
        let content_id = self
            .document
            .add_object(Stream::new(Dictionary::new(), encoded));

        let resources = Dictionary::from_iter(vec![(
            "XObject",
            Object::Dictionary(Dictionary::from_iter(vec![(
                "Im0",
                Object::Reference(image_id),
            )])),
        )]);

        let mut page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(self.pages_id)),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Dictionary(resources)),
        ]);

        match self.default_size {
            None => self.default_size = Some(size),
            Some(_) => page.set("MediaBox", media_box(size)),
        }

        let page_id = self.document.add_object(page);
        self.kids.push(Object::Reference(page_id));
        debug!(
            pages = self.kids.len(),
            width_mm = size.width_mm,
            height_mm = size.height_mm,
            "page appended"
        );
        Ok(())
    }

    /// Serialise the finished document.
    #[instrument(skip(self), fields(pages = self.kids.len()))]
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let default_size = self
            .default_size
            .ok_or_else(|| FolioError::PdfError("no pages were composed".into()))?;

        let count = self.kids.len() as i64;
        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(std::mem::take(&mut self.kids))),
            ("Count", Object::Integer(count)),
            ("MediaBox", media_box(default_size)),
        ]);
        self.document
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.document.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]));
        self.document.trailer.set("Root", Object::Reference(catalog_id));

        let mut info = Dictionary::from_iter(vec![
            ("Producer", Object::string_literal(PRODUCER)),
            (
                "CreationDate",
                Object::string_literal(
                    chrono::Local::now()
                        .format("D:%Y%m%d%H%M%S")
                        .to_string(),
                ),
            ),
        ]);
        if let Some(title) = &self.options.title {
            info.set("Title", Object::string_literal(title.as_str()));
        }
        let info_id = self.document.add_object(info);
        self.document.trailer.set("Info", Object::Reference(info_id));

        self.document.compress();

        let mut output = Vec::new();
        self.document
            .save_to(&mut output)
            .map_err(|err| FolioError::PdfError(format!("failed to serialise PDF: {err}")))?;

        info!(pages = count, output_bytes = output.len(), "composed PDF written");
        Ok(output)
    }

    /// Add the page image as an XObject: JPEG when possible, otherwise raw
    /// samples left for Flate compression.
    fn embed_image(&mut self, buffer: &RasterBuffer) -> Result<ObjectId> {
        let (pixels, color_space) = flatten(buffer);
        let (width, height) = (buffer.width() as i64, buffer.height() as i64);

        let mut dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Image".to_vec())),
            ("Width", Object::Integer(width)),
            ("Height", Object::Integer(height)),
            ("ColorSpace", Object::Name(color_space.to_vec())),
            ("BitsPerComponent", Object::Integer(8)),
        ]);

        let mut jpeg = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut jpeg, jpeg_quality(self.options.quality));
        let stream = match pixels.write_with_encoder(encoder) {
            Ok(()) => {
                dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
                Stream::new(dict, jpeg).with_compression(false)
            }
            Err(err) => {
                warn!(page = buffer.page(), error = %err, "JPEG embedding failed, storing raw samples");
                Stream::new(dict, pixels.into_bytes())
            }
        };
        Ok(self.document.add_object(stream))
    }
}

/// Drop alpha by compositing over white. Grayscale buffers become one
/// channel.
fn flatten(buffer: &RasterBuffer) -> (DynamicImage, &'static [u8]) {
    let source = buffer.as_image();
    let over_white = |channel: u8, alpha: u8| -> u8 {
        let a = alpha as u32;
        ((channel as u32 * a + 255 * (255 - a) + 127) / 255) as u8
    };

    if buffer.is_grayscale() {
        let gray = GrayImage::from_fn(source.width(), source.height(), |x, y| {
            let [l, _, _, a] = source.get_pixel(x, y).0;
            image::Luma([over_white(l, a)])
        });
        (DynamicImage::ImageLuma8(gray), &b"DeviceGray"[..])
    } else {
        let rgb = RgbImage::from_fn(source.width(), source.height(), |x, y| {
            let [r, g, b, a] = source.get_pixel(x, y).0;
            image::Rgb([over_white(r, a), over_white(g, a), over_white(b, a)])
        });
        (DynamicImage::ImageRgb8(rgb), &b"DeviceRGB"[..])
    }
}

fn media_box(size: OutputPageSize) -> Object {
    Object::Array(vec![
        0.into(),
        0.into(),
        size.width_pt().into(),
        size.height_pt().into(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::to_grayscale;
    use image::{Rgba, RgbaImage};

    fn raster(page: u32, width: u32, height: u32) -> RasterBuffer {
        RasterBuffer::from_image(page, RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255])))
    }

    fn size(width_mm: f32, height_mm: f32) -> OutputPageSize {
        OutputPageSize {
            width_mm,
            height_mm,
            landscape: width_mm > height_mm,
        }
    }

    fn page_width_pt(doc: &Document, page_id: ObjectId) -> f32 {
        let media_box = doc
            .get_dictionary(page_id)
            .and_then(|page| page.get(b"MediaBox"))
            .or_else(|_| {
                doc.get_dictionary(page_id)
                    .and_then(|page| page.get(b"Parent"))
                    .and_then(Object::as_reference)
                    .and_then(|parent| doc.get_dictionary(parent))
                    .and_then(|pages| pages.get(b"MediaBox"))
            })
            .unwrap();
        match &media_box.as_array().unwrap()[2] {
            Object::Real(w) => *w as f32,
            Object::Integer(w) => *w as f32,
            other => panic!("unexpected width {other:?}"),
        }
    }

    #[test]
    fn heterogeneous_page_sizes_survive() {
        let mut composed = ComposedDocument::new(ComposeOptions {
            title: Some("Sizes".into()),
            ..Default::default()
        });
        composed.append_image_page(&raster(1, 40, 30), size(100.0, 75.0)).unwrap();
        composed.append_image_page(&raster(2, 30, 40), size(50.0, 80.0)).unwrap();
        assert_eq!(composed.page_count(), 2);
        assert_eq!(composed.default_size(), Some(size(100.0, 75.0)));

        let bytes = composed.finish().unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 2);
        assert!((page_width_pt(&doc, pages[&1]) - 100.0 * PT_PER_MM).abs() < 0.1);
        assert!((page_width_pt(&doc, pages[&2]) - 50.0 * PT_PER_MM).abs() < 0.1);
    }

    #[test]
    fn grayscale_pages_use_device_gray() {
        let mut buffer = raster(1, 8, 8);
        to_grayscale(&mut buffer);
        let mut composed = ComposedDocument::new(ComposeOptions::default());
        composed.append_image_page(&buffer, size(60.0, 60.0)).unwrap();
        let bytes = composed.finish().unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        let gray = doc.objects.values().any(|obj| match obj {
            Object::Stream(stream) => stream
                .dict
                .get(b"ColorSpace")
                .and_then(Object::as_name)
                .map(|name| name == &b"DeviceGray"[..])
                .unwrap_or(false),
            _ => false,
        });
        assert!(gray);
    }

    #[test]
    fn empty_document_is_an_error() {
        let composed = ComposedDocument::new(ComposeOptions::default());
        assert!(matches!(composed.finish(), Err(FolioError::PdfError(_))));
    }

    #[test]
    fn oversized_margin_still_leaves_room() {
        let mut composed = ComposedDocument::new(ComposeOptions {
            margin_mm: 500.0,
            ..Default::default()
        });
        composed.append_image_page(&raster(1, 10, 10), size(40.0, 40.0)).unwrap();
        assert!(composed.finish().is_ok());
    }
}
