//! Still-image encodings

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use camphoto_core::{CameraError, CameraResult};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality a JPEG encoder uses when the caller gives none
pub const DEFAULT_JPEG_QUALITY: f64 = 0.92;

/// Data URI of a canvas with no area
pub const EMPTY_DATA_URI: &str = "data:,";

/// Supported still-image encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    /// Lossless, no quality knob
    Png,
    /// Lossy, quality in `[0, 1]`
    Jpg,
}

/// All encodings the exporter accepts
pub const SUPPORTED_IMAGE_TYPES: [ImageType; 2] = [ImageType::Png, ImageType::Jpg];

impl ImageType {
    /// Short name used in export configs
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageType::Png => "png",
            ImageType::Jpg => "jpg",
        }
    }

    /// Media type of the encoded bytes
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageType::Png => "image/png",
            ImageType::Jpg => "image/jpeg",
        }
    }

    /// True when a quality setting applies
    pub fn is_lossy(&self) -> bool {
        matches!(self, ImageType::Jpg)
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageType {
    type Err = CameraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SUPPORTED_IMAGE_TYPES
            .iter()
            .copied()
            .find(|image_type| image_type.as_str() == s)
            .ok_or_else(|| CameraError::InvalidExportConfig {
                message: format!(
                    "{} is invalid imageType, choose between: {}",
                    s,
                    SUPPORTED_IMAGE_TYPES
                        .iter()
                        .map(ImageType::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })
    }
}

/// JPEG quality byte for a `[0, 1]` compression; `None` and `0` mean the default
pub fn jpeg_quality(compression: Option<f64>) -> u8 {
    let compression = compression
        .filter(|c| *c > 0.0 && *c <= 1.0)
        .unwrap_or(DEFAULT_JPEG_QUALITY);
    (compression * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encode pixels; `compression` is ignored for lossless encodings
pub fn encode_image(
    pixels: &RgbaImage,
    image_type: ImageType,
    compression: Option<f64>,
) -> CameraResult<Vec<u8>> {
    let mut buf = Vec::new();
    let image = DynamicImage::ImageRgba8(pixels.clone());

    let result = match image_type {
        ImageType::Png => image.write_with_encoder(PngEncoder::new(&mut buf)),
        ImageType::Jpg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(
                &mut buf,
                jpeg_quality(compression),
            ))
        }
    };

    result.map_err(|e| CameraError::EncodingFailed {
        format: image_type.mime_type().to_string(),
        reason: e.to_string(),
    })?;

    Ok(buf)
}

/// `data:<mime>;base64,<payload>`
pub fn to_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}
