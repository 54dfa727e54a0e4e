// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rasterizer: renders one page into an RGBA pixel buffer, with an
// optional in-place grayscale pass.

use folio_core::FolioError;
use folio_core::error::Result;
use image::{DynamicImage, RgbaImage};
use tracing::{debug, instrument};

use crate::backend::PageHandle;

/// Pixels of one rendered (or decoded) page.
///
/// Produced fresh for each page and consumed straight away by an encoder or
/// composer. Operations never hold more than one of these at a time.
#[derive(Debug, Clone)]
pub struct RasterBuffer {
    pixels: RgbaImage,
    /// 1-based page (or input image) number this buffer came from.
    page: u32,
    grayscale: bool,
    /// Source page size in points, for buffers rendered from a document.
    native_size: Option<(f32, f32)>,
}

impl RasterBuffer {
    /// Wrap already-rendered pixels.
    pub fn from_image(page: u32, pixels: RgbaImage) -> Self {
        Self {
            pixels,
            page,
            grayscale: false,
            native_size: None,
        }
    }

    /// Record the size in points of the page these pixels were rendered from.
    pub fn with_native_size(mut self, width_pt: f32, height_pt: f32) -> Self {
        self.native_size = Some((width_pt, height_pt));
        self
    }

    /// Decode an encoded image (PNG, JPEG, WebP, ...) into a buffer.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn decode(page: u32, data: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(data).map_err(|err| {
            FolioError::ImageError(format!("image {page} could not be decoded: {err}"))
        })?;
        debug!(width = image.width(), height = image.height(), "image decoded");
        Ok(Self::from_image(page, image.to_rgba8()))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Whether [`to_grayscale`] has been applied.
    pub fn is_grayscale(&self) -> bool {
        self.grayscale
    }

    /// Source page size in points, if this buffer was rendered from a page.
    pub fn native_size(&self) -> Option<(f32, f32)> {
        self.native_size
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn to_dynamic(&self) -> DynamicImage {
        DynamicImage::ImageRgba8(self.pixels.clone())
    }
}

/// Render `page` at `scale` times its native size.
///
/// The buffer is `ceil(w × scale) × ceil(h × scale)`, at least 1×1. A scale
/// that is not a finite positive number, or any engine failure, is reported
/// as [`FolioError::RenderSurfaceUnavailable`] for this page.
#[instrument(skip(page), fields(page = page.number()))]
pub async fn render(page: &dyn PageHandle, scale: f32) -> Result<RasterBuffer> {
    let number = page.number();
    if !scale.is_finite() || scale <= 0.0 {
        return Err(FolioError::RenderSurfaceUnavailable {
            page: number,
            detail: format!("scale {scale} is not a positive number"),
        });
    }

    let viewport = page.viewport(scale);
    let pixels = page
        .render(viewport)
        .map_err(|err| FolioError::RenderSurfaceUnavailable {
            page: number,
            detail: err.to_string(),
        })?;

    let pixels = if pixels.dimensions() != (viewport.width, viewport.height) {
        debug!(
            got_width = pixels.width(),
            got_height = pixels.height(),
            "engine bitmap resized to viewport"
        );
        image::imageops::resize(
            &pixels,
            viewport.width,
            viewport.height,
            image::imageops::FilterType::Triangle,
        )
    } else {
        pixels
    };

    debug!(width = viewport.width, height = viewport.height, "page rasterized");
    tokio::task::yield_now().await;
    let (native_width, native_height) = page.native_size();
    Ok(RasterBuffer::from_image(number, pixels).with_native_size(native_width, native_height))
}

/// Replace R, G and B with `round(0.299R + 0.587G + 0.114B)`, in place.
/// Alpha is left untouched. Applying it twice changes nothing.
pub fn to_grayscale(buffer: &mut RasterBuffer) {
    for pixel in buffer.pixels.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        let luma = (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32)
            .round()
            .clamp(0.0, 255.0) as u8;
        pixel.0[0] = luma;
        pixel.0[1] = luma;
        pixel.0[2] = luma;
    }
    buffer.grayscale = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{EngineError, TextContent, Viewport};
    use image::Rgba;

    struct FixedPage {
        size: (f32, f32),
        fail: bool,
        /// Ignore the viewport and return a bitmap of this size.
        off_size: Option<(u32, u32)>,
    }

    impl PageHandle for FixedPage {
        fn number(&self) -> u32 {
            3
        }

        fn native_size(&self) -> (f32, f32) {
            self.size
        }

        fn render(&self, viewport: Viewport) -> std::result::Result<RgbaImage, EngineError> {
            if self.fail {
                return Err(EngineError::RenderSurface("no canvas".into()));
            }
            let (width, height) = self.off_size.unwrap_or((viewport.width, viewport.height));
            Ok(RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])))
        }

        fn text_content(&self) -> std::result::Result<TextContent, EngineError> {
            Ok(TextContent::default())
        }
    }

    #[tokio::test]
    async fn render_uses_ceiled_viewport() {
        let page = FixedPage {
            size: (800.0, 600.0),
            fail: false,
            off_size: None,
        };
        let buffer = render(&page, 1.5).await.unwrap();
        assert_eq!((buffer.width(), buffer.height()), (1200, 900));
        assert_eq!(buffer.page(), 3);
    }

    #[tokio::test]
    async fn bad_scale_is_render_surface_error() {
        let page = FixedPage {
            size: (10.0, 10.0),
            fail: false,
            off_size: None,
        };
        for scale in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let err = render(&page, scale).await.unwrap_err();
            assert!(matches!(err, FolioError::RenderSurfaceUnavailable { page: 3, .. }));
        }
    }

    #[tokio::test]
    async fn engine_failure_is_render_surface_error() {
        let page = FixedPage {
            size: (10.0, 10.0),
            fail: true,
            off_size: None,
        };
        let err = render(&page, 1.0).await.unwrap_err();
        assert!(matches!(err, FolioError::RenderSurfaceUnavailable { .. }));
    }

    #[tokio::test]
    async fn off_size_bitmap_is_normalised() {
        let page = FixedPage {
            size: (100.0, 50.0),
            fail: false,
            off_size: Some((97, 51)),
        };
        let buffer = render(&page, 2.0).await.unwrap();
        assert_eq!((buffer.width(), buffer.height()), (200, 100));
    }

    #[test]
    fn grayscale_weights_and_alpha() {
        let mut buffer = RasterBuffer::from_image(
            1,
            RgbaImage::from_pixel(2, 1, Rgba([200, 100, 50, 77])),
        );
        to_grayscale(&mut buffer);
        // 0.299*200 + 0.587*100 + 0.114*50 = 124.2
        assert_eq!(buffer.as_image().get_pixel(0, 0).0, [124, 124, 124, 77]);
        assert!(buffer.is_grayscale());
    }

    #[test]
    fn grayscale_is_idempotent() {
        let mut once = RasterBuffer::from_image(
            1,
            RgbaImage::from_fn(16, 16, |x, y| {
                Rgba([(x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8, 255])
            }),
        );
        to_grayscale(&mut once);
        let mut twice = once.clone();
        to_grayscale(&mut twice);
        assert_eq!(once.as_image(), twice.as_image());
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = RasterBuffer::decode(2, b"not an image").unwrap_err();
        assert!(matches!(err, FolioError::ImageError(_)));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::backend::{EngineError, TextContent, Viewport};
    use image::Rgba;
    use proptest::prelude::*;

    struct BlankPage(f32, f32);

    impl PageHandle for BlankPage {
        fn number(&self) -> u32 {
            1
        }

        fn native_size(&self) -> (f32, f32) {
            (self.0, self.1)
        }

        fn render(&self, viewport: Viewport) -> std::result::Result<RgbaImage, EngineError> {
            Ok(RgbaImage::from_pixel(viewport.width, viewport.height, Rgba([9, 180, 40, 200])))
        }

        fn text_content(&self) -> std::result::Result<TextContent, EngineError> {
            Ok(TextContent::default())
        }
    }

    fn ceiled(native: f32, scale: f32) -> u32 {
        ((native as f64 * scale as f64).ceil() as u32).max(1)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        /// The buffer is ceil(w·s) × ceil(h·s) and grayscale keeps one
        /// RGBA pixel per position.
        #[test]
        fn buffer_matches_ceiled_viewport(
            width in 1.0f32..600.0,
            height in 1.0f32..600.0,
            scale in 0.05f32..3.0,
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let page = BlankPage(width, height);
            let mut buffer = runtime.block_on(render(&page, scale)).unwrap();

            let (w, h) = (ceiled(width, scale), ceiled(height, scale));
            prop_assert_eq!((buffer.width(), buffer.height()), (w, h));
            prop_assert_eq!(buffer.native_size(), Some((width, height)));

            to_grayscale(&mut buffer);
            let image = buffer.as_image();
            prop_assert_eq!(image.pixels().len() as u64, w as u64 * h as u64);
            prop_assert_eq!(image.as_raw().len() as u64, w as u64 * h as u64 * 4);
            prop_assert!(image.pixels().all(|p| p.0[0] == p.0[1] && p.0[1] == p.0[2] && p.0[3] == 200));
        }
    }
}
