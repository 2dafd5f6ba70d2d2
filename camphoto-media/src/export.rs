//! Export configuration and its validation
//!
//! Callers describe an export with a [`UserConfig`], where every field is
//! optional. [`ExportConfig::resolve`] fills the gaps with the defaults below
//! and replaces anything invalid, logging a warning instead of failing.

use crate::encode::ImageType;
use camphoto_core::{CameraError, CameraResult};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default scale applied to the frame size
pub const DEFAULT_SIZE_FACTOR: f64 = 1.0;

/// Default compression for lossy encodings
pub const DEFAULT_IMAGE_COMPRESSION: f64 = 0.92;

/// Default mirror flag
pub const DEFAULT_IMAGE_MIRROR: bool = false;

/// Default encoding
pub const DEFAULT_IMAGE_TYPE: ImageType = ImageType::Png;

/// Caller-facing export options
///
/// Deserializes from the camelCase shape, e.g.
/// `{"sizeFactor": 0.5, "imageType": "jpg", "imageCompression": 0.8}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserConfig {
    /// Scale applied to the frame size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_factor: Option<f64>,
    /// Encoding name, `png` or `jpg`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_type: Option<String>,
    /// Lossy compression in `[0, 1]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_compression: Option<f64>,
    /// Flip horizontally
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_image_mirror: Option<bool>,
}

impl UserConfig {
    /// Empty config; every field takes its default
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the size factor
    pub fn size_factor(mut self, size_factor: f64) -> Self {
        self.size_factor = Some(size_factor);
        self
    }

    /// Set the encoding
    pub fn image_type(mut self, image_type: ImageType) -> Self {
        self.image_type = Some(image_type.as_str().to_string());
        self
    }

    /// Set the encoding by name; unknown names fall back at resolve time
    pub fn image_type_name(mut self, name: impl Into<String>) -> Self {
        self.image_type = Some(name.into());
        self
    }

    /// Set the lossy compression
    pub fn image_compression(mut self, compression: f64) -> Self {
        self.image_compression = Some(compression);
        self
    }

    /// Set the mirror flag
    pub fn mirror(mut self, is_image_mirror: bool) -> Self {
        self.is_image_mirror = Some(is_image_mirror);
        self
    }

    /// Field-wise merge: values set here win over `fallback`
    pub fn or(self, fallback: &UserConfig) -> UserConfig {
        UserConfig {
            size_factor: self.size_factor.or(fallback.size_factor),
            image_type: self.image_type.or_else(|| fallback.image_type.clone()),
            image_compression: self.image_compression.or(fallback.image_compression),
            is_image_mirror: self.is_image_mirror.or(fallback.is_image_mirror),
        }
    }
}

/// Validated export settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportConfig {
    /// Scale applied to the frame size
    pub size_factor: f64,
    /// Encoding
    pub image_type: ImageType,
    /// Lossy compression; always `None` for lossless encodings
    pub image_compression: Option<f64>,
    /// Flip horizontally
    pub is_image_mirror: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self::resolve(&UserConfig::default())
    }
}

impl ExportConfig {
    /// Apply defaults and recover from invalid values
    pub fn resolve(user: &UserConfig) -> Self {
        let size_factor = match user.size_factor {
            Some(factor) if !(factor.is_finite() && factor > 0.0) => {
                warn!(
                    "⚠️ {} is invalid sizeFactor, default value of {} is used",
                    factor, DEFAULT_SIZE_FACTOR
                );
                DEFAULT_SIZE_FACTOR
            }
            Some(factor) => factor,
            None => DEFAULT_SIZE_FACTOR,
        };

        let image_type_name = user
            .image_type
            .as_deref()
            .unwrap_or(DEFAULT_IMAGE_TYPE.as_str());
        let compression = user
            .image_compression
            .unwrap_or(DEFAULT_IMAGE_COMPRESSION);

        let (image_type, image_compression) =
            match validate_image_params(image_type_name, compression) {
                Ok(image_type) => (image_type, Some(compression)),
                Err(e) => {
                    warn!("⚠️ {}", e);
                    warn!("⚠️ default value of {} is used", DEFAULT_IMAGE_TYPE);
                    (DEFAULT_IMAGE_TYPE, Some(DEFAULT_IMAGE_COMPRESSION))
                }
            };

        Self {
            size_factor,
            image_type,
            // Compression never applies to lossless output
            image_compression: image_compression.filter(|_| image_type.is_lossy()),
            is_image_mirror: user.is_image_mirror.unwrap_or(DEFAULT_IMAGE_MIRROR),
        }
    }
}

/// Check a compression value and an encoding name
pub fn validate_image_params(image_type: &str, compression: f64) -> CameraResult<ImageType> {
    if !(0.0..=1.0).contains(&compression) {
        return Err(CameraError::InvalidExportConfig {
            message: format!(
                "{} is invalid imageCompression, choose between: [0, 1]",
                compression
            ),
        });
    }
    image_type.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.size_factor, DEFAULT_SIZE_FACTOR);
        assert_eq!(config.image_type, ImageType::Png);
        assert_eq!(config.image_compression, None);
        assert!(!config.is_image_mirror);
    }

    #[test]
    fn test_user_config_merge() {
        let fallback = UserConfig::new().image_type(ImageType::Jpg).mirror(true);
        let merged = UserConfig::new().mirror(false).or(&fallback);
        assert_eq!(merged.image_type.as_deref(), Some("jpg"));
        assert_eq!(merged.is_image_mirror, Some(false));
        assert_eq!(merged.size_factor, None);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(validate_image_params("jpg", 1.5).is_err());
        assert!(validate_image_params("jpg", -0.1).is_err());
        assert!(validate_image_params("jpg", f64::NAN).is_err());
        assert_eq!(validate_image_params("jpg", 0.0).unwrap(), ImageType::Jpg);
        assert_eq!(validate_image_params("png", 1.0).unwrap(), ImageType::Png);
    }
}
