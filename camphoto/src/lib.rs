//! # camphoto - Camera Capture and Still Photos
//!
//! camphoto drives a device camera through whatever capture API the runtime
//! offers, shows the live stream in a display element and exports the
//! current frame as a PNG or JPEG data URI, blob or file.
//!
//! ## Key Features
//!
//! - **One capture API**: the standard promise API or the legacy callback API, chosen once
//! - **Constraint negotiation**: only keys the runtime supports are ever sent
//! - **Maximum resolution**: walks a minimum-width ladder until the camera accepts
//! - **Still export**: scaled, optionally mirrored PNG or JPEG captures
//! - **Testable**: an in-memory runtime in [`mock`] for native targets
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use camphoto::mock::{MockMediaDevices, MockNavigator, MockVideoElement};
//! use camphoto::{CameraPhoto, FacingMode, ImageType, UserConfig};
//! use std::rc::Rc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), camphoto::CameraError> {
//!     let navigator = MockNavigator::standard(Rc::new(MockMediaDevices::new()));
//!     let mut camera = CameraPhoto::new(Rc::new(MockVideoElement::new()), &navigator);
//!
//!     // Start the rear camera at its best resolution
//!     camera
//!         .start_camera_max_resolution(Some(FacingMode::Environment), None)
//!         .await?;
//!
//!     // Grab a half-size JPEG
//!     let photo = camera.get_data_uri(
//!         &UserConfig::new()
//!             .size_factor(0.5)
//!             .image_type(ImageType::Jpg)
//!             .image_compression(0.8),
//!     )?;
//!     println!("{}", &photo[..32]);
//!
//!     camera.stop_camera()
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

// Re-export core types for easy access
pub use camphoto_core::{
    CameraError, CameraResult, CaptureApi, ErrorCategory, FacingMode, IdealResolution,
    LegacyGetUserMedia, MediaDeviceInfo, MediaDeviceKind, MediaDevices, MediaStream,
    MediaStreamConstraints, MediaStreamTrack, Navigator, StreamHandle, SupportedConstraints,
    TrackKind, TrackSettings, MIN_WIDTH_LADDER, SUPPORTED_FACING_MODES,
};

pub use camphoto_media::{
    Blob, ExportConfig, File, ImageType, ObjectUrlRegistry, ObjectUrlSource, ObjectUrls,
    UserConfig, VideoElement, VideoFrame, DEFAULT_IMAGE_COMPRESSION, DEFAULT_IMAGE_MIRROR,
    DEFAULT_IMAGE_TYPE, DEFAULT_SIZE_FACTOR, SUPPORTED_IMAGE_TYPES,
};

// Public API modules
pub mod config;
pub mod logging;
pub mod mock;
pub mod session;

#[cfg(target_arch = "wasm32")]
pub mod web;

// Re-export main API types
pub use config::{CameraPhotoConfig, ConfigError};
pub use logging::init_logging;
pub use session::{CameraPhoto, CameraPhotoBuilder};
