//! Raw video frames as read from a display element

use bytes::Bytes;
use camphoto_core::{CameraError, CameraResult};
use image::RgbaImage;

/// Bytes per RGBA pixel
pub const RGBA_BYTES_PER_PIXEL: usize = 4;

/// Video frame representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Tightly packed RGBA8 pixels, row major
    pub data: Bytes,
}

impl VideoFrame {
    /// Frame from packed RGBA data
    pub fn new(width: u32, height: u32, data: impl Into<Bytes>) -> Self {
        Self {
            width,
            height,
            data: data.into(),
        }
    }

    /// Opaque frame filled with one color
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * RGBA_BYTES_PER_PIXEL);
        for _ in 0..pixels {
            data.extend_from_slice(&rgba);
        }
        Self::new(width, height, data)
    }

    /// Opaque black frame, what an element shows with no stream bound
    pub fn blank(width: u32, height: u32) -> Self {
        Self::solid(width, height, [0, 0, 0, 255])
    }

    /// Frame with no pixels
    pub fn empty() -> Self {
        Self::new(0, 0, Bytes::new())
    }

    /// True when the frame has no area
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Expected length of `data`
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * RGBA_BYTES_PER_PIXEL
    }

    /// Copy into an `image` buffer
    pub fn to_image(&self) -> CameraResult<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.data.to_vec()).ok_or_else(|| {
            CameraError::EncodingFailed {
                format: "rgba".to_string(),
                reason: format!(
                    "frame data has {} bytes, expected {}",
                    self.data.len(),
                    self.expected_len()
                ),
            }
        })
    }
}
