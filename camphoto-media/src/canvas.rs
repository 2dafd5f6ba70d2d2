//! Offscreen 2D drawing surface
//!
//! A small software canvas: enough of a 2D context to scale a frame into a
//! target rectangle under an axis-aligned transform, then encode the result.

use crate::blob::Blob;
use crate::encode::{encode_image, to_data_uri, ImageType, EMPTY_DATA_URI};
use crate::frame::VideoFrame;
use camphoto_core::CameraResult;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use tracing::warn;

/// Largest width or height a canvas is backed at
pub const MAX_CANVAS_SIDE: u32 = 32_767;

/// Largest pixel count a canvas is backed at
pub const MAX_CANVAS_AREA: u64 = 268_435_456;

/// Affine transform `(a, b, c, d, e, f)` as in a 2D context's `setTransform`
///
/// Maps `(x, y)` to `(a·x + c·y + e, b·x + d·y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Horizontal scale
    pub a: f64,
    /// Vertical skew
    pub b: f64,
    /// Horizontal skew
    pub c: f64,
    /// Vertical scale
    pub d: f64,
    /// Horizontal translation
    pub e: f64,
    /// Vertical translation
    pub f: f64,
}

impl Transform {
    /// No-op transform
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Horizontal flip about the middle of a surface `width` wide
    pub fn mirror_horizontal(width: u32) -> Self {
        Self {
            a: -1.0,
            e: f64::from(width),
            ..Self::IDENTITY
        }
    }

    /// Apply to a point
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Image size for a frame scaled by `size_factor`, keeping the aspect ratio
pub fn image_size(video_width: u32, video_height: u32, size_factor: f64) -> (f64, f64) {
    let image_width = f64::from(video_width) * size_factor;
    if image_width == 0.0 {
        return (0.0, f64::from(video_height) * size_factor);
    }
    let ratio = f64::from(video_width) / image_width;
    let image_height = f64::from(video_height) / ratio;
    (image_width, image_height)
}

/// Offscreen drawing surface
#[derive(Debug, Clone)]
pub struct Canvas {
    pixels: RgbaImage,
    transform: Transform,
}

impl Canvas {
    /// Transparent canvas; fractional sizes truncate like a canvas element's
    ///
    /// A size beyond [`MAX_CANVAS_SIDE`] or [`MAX_CANVAS_AREA`] yields a
    /// canvas with no area, the way a browser refuses to back one.
    pub fn new(width: f64, height: f64) -> Self {
        let (width, height) = (width.trunc(), height.trunc());
        let fits = width <= f64::from(MAX_CANVAS_SIDE)
            && height <= f64::from(MAX_CANVAS_SIDE)
            && width * height <= MAX_CANVAS_AREA as f64;

        let (width, height) = if fits {
            // Negative sizes saturate to zero
            (width as u32, height as u32)
        } else {
            warn!(
                "⚠️ {}x{} canvas exceeds the maximum canvas size, nothing is drawn",
                width, height
            );
            (0, 0)
        };

        Self {
            pixels: RgbaImage::new(width, height),
            transform: Transform::IDENTITY,
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// True when either side is zero
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Replace the current transform
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Current transform
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Pixels drawn so far
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Draw `frame` scaled into `(dx, dy, dw, dh)`, under the current transform
    ///
    /// Only axis-aligned unit-scale transforms (translations and flips) are
    /// supported. Pixels that land outside the surface are dropped.
    pub fn draw_frame(
        &mut self,
        frame: &VideoFrame,
        dx: u32,
        dy: u32,
        dw: u32,
        dh: u32,
    ) -> CameraResult<()> {
        if frame.is_empty() || dw == 0 || dh == 0 || self.is_empty() {
            return Ok(());
        }

        let source = frame.to_image()?;
        let scaled = if source.dimensions() == (dw, dh) {
            source
        } else {
            imageops::resize(&source, dw, dh, FilterType::Triangle)
        };

        let (width, height) = (f64::from(self.width()), f64::from(self.height()));
        for (x, y, pixel) in scaled.enumerate_pixels() {
            // Map pixel centers so a flip lands on whole columns
            let (tx, ty) = self.transform.apply(
                f64::from(dx + x) + 0.5,
                f64::from(dy + y) + 0.5,
            );
            let (tx, ty) = (tx.floor(), ty.floor());
            if tx < 0.0 || ty < 0.0 || tx >= width || ty >= height {
                continue;
            }
            self.pixels.put_pixel(tx as u32, ty as u32, *pixel);
        }

        Ok(())
    }

    /// Encode to a data URI; `data:,` for a surface with no area
    pub fn to_data_url(&self, image_type: ImageType, quality: Option<f64>) -> CameraResult<String> {
        if self.is_empty() {
            return Ok(EMPTY_DATA_URI.to_string());
        }
        let bytes = encode_image(&self.pixels, image_type, quality)?;
        Ok(to_data_uri(image_type.mime_type(), &bytes))
    }

    /// Encode to a blob and hand it to `callback`
    ///
    /// The callback runs exactly once. A surface with no area yields an empty
    /// blob of the requested type.
    pub fn to_blob<F>(&self, callback: F, image_type: ImageType, quality: Option<f64>)
    where
        F: FnOnce(CameraResult<Blob>),
    {
        if self.is_empty() {
            callback(Ok(Blob::new(Vec::new(), image_type.mime_type())));
            return;
        }
        let result = encode_image(&self.pixels, image_type, quality)
            .map(|bytes| Blob::new(bytes, image_type.mime_type()));
        callback(result);
    }
}
