//! # camphoto core
//!
//! Capture capability traits, the constraint model and the capability facade.
//! This crate knows nothing about pixels: it decides which capture API to use
//! and what to ask it for.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod capability;
pub mod constraints;
pub mod devices;
pub mod error;
pub mod stream;

// Re-export main types
pub use capability::{
    build_constraints, build_max_resolution_constraints, is_minimum_request, resolve_capture_api,
};
pub use constraints::{
    advanced_ladder, AdvancedConstraint, ExactConstraint, FacingMode, IdealFacingMode,
    IdealResolution, MediaStreamConstraints, MinConstraint, SupportedConstraints,
    UnknownFacingMode, VideoConstraints, VideoTrackConstraints, MIN_WIDTH_LADDER,
    SUPPORTED_FACING_MODES,
};
pub use devices::{
    CaptureApi, ErrorCallback, LegacyAdapter, LegacyGetUserMedia, MediaDevices, Navigator,
    SuccessCallback,
};
pub use error::{CameraError, CameraResult, ErrorCategory};
pub use stream::{
    first_track_settings, stop_all_tracks, MediaDeviceInfo, MediaDeviceKind, MediaStream,
    MediaStreamTrack, StreamHandle, TrackKind, TrackSettings,
};
