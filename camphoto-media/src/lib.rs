//! # camphoto media
//!
//! Frame drawing, still-image encoding and blob export.
//! This crate turns whatever a display element currently shows into a data
//! URI, a blob or a named file.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod blob;
pub mod canvas;
pub mod display;
pub mod encode;
pub mod export;
pub mod frame;
pub mod object_url;
pub mod snapshot;

// Re-export main types
pub use blob::{Blob, File};
pub use canvas::{image_size, Canvas, Transform, MAX_CANVAS_AREA, MAX_CANVAS_SIDE};
pub use display::VideoElement;
pub use encode::{
    encode_image, jpeg_quality, to_data_uri, ImageType, DEFAULT_JPEG_QUALITY, EMPTY_DATA_URI,
    SUPPORTED_IMAGE_TYPES,
};
pub use export::{
    validate_image_params, ExportConfig, UserConfig, DEFAULT_IMAGE_COMPRESSION,
    DEFAULT_IMAGE_MIRROR, DEFAULT_IMAGE_TYPE, DEFAULT_SIZE_FACTOR,
};
pub use frame::VideoFrame;
pub use object_url::{ObjectUrlRegistry, ObjectUrlSource, ObjectUrls};
pub use snapshot::{create_canvas, data_blob, data_uri};
