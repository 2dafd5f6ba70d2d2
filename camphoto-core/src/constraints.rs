//! Constraint descriptors sent with a stream request
//!
//! The types here serialize to the W3C `MediaStreamConstraints` JSON shape so
//! a backend can hand them to the runtime unchanged:
//!
//! ```json
//! { "audio": false, "video": { "facingMode": "user", "deviceId": { "exact": "cam-1" } } }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Minimum widths tried by the max-resolution ladder, smallest first
pub const MIN_WIDTH_LADDER: [u32; 9] = [640, 800, 900, 1024, 1080, 1280, 1920, 2560, 3840];

/// Camera facing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera, facing the user
    User,
    /// Rear camera, facing away from the user
    Environment,
}

/// Facing modes the library will put into a constraint descriptor
pub const SUPPORTED_FACING_MODES: [FacingMode; 2] = [FacingMode::User, FacingMode::Environment];

impl FacingMode {
    /// Constraint value as the runtime expects it
    pub fn as_str(&self) -> &'static str {
        match self {
            FacingMode::User => "user",
            FacingMode::Environment => "environment",
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known facing mode
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown facing mode: {0}")]
pub struct UnknownFacingMode(pub String);

impl FromStr for FacingMode {
    type Err = UnknownFacingMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SUPPORTED_FACING_MODES
            .iter()
            .copied()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| UnknownFacingMode(s.to_string()))
    }
}

/// Preferred capture resolution; either side may be left open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdealResolution {
    /// Preferred width in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Preferred height in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl IdealResolution {
    /// Resolution with both sides set
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }

    /// True when neither side is set
    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none()
    }
}

/// Constraint keys the runtime reports it understands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SupportedConstraints {
    /// `aspectRatio`
    pub aspect_ratio: bool,
    /// `deviceId`
    pub device_id: bool,
    /// `facingMode`
    pub facing_mode: bool,
    /// `frameRate`
    pub frame_rate: bool,
    /// `height`
    pub height: bool,
    /// `width`
    pub width: bool,
}

impl SupportedConstraints {
    /// Every key supported
    pub const fn all() -> Self {
        Self {
            aspect_ratio: true,
            device_id: true,
            facing_mode: true,
            frame_rate: true,
            height: true,
            width: true,
        }
    }

    /// No key supported
    pub const fn none() -> Self {
        Self {
            aspect_ratio: false,
            device_id: false,
            facing_mode: false,
            frame_rate: false,
            height: false,
            width: false,
        }
    }
}

/// `{ "exact": value }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactConstraint<T> {
    /// Required value
    pub exact: T,
}

/// `{ "min": value }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinConstraint<T> {
    /// Lower bound
    pub min: T,
}

/// `{ "facingMode": value }` used as the ideal half of a ladder entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdealFacingMode {
    /// Preferred facing mode; omitted when the request carries none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facing_mode: Option<FacingMode>,
}

/// One entry of the `advanced` list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedConstraint {
    /// Minimum acceptable width
    pub width: MinConstraint<u32>,
    /// Facing mode the runtime should prefer while honouring `width`
    pub ideal: IdealFacingMode,
}

impl AdvancedConstraint {
    /// Entry requiring at least `min_width` pixels
    pub const fn min_width(min_width: u32, facing_mode: Option<FacingMode>) -> Self {
        Self {
            width: MinConstraint { min: min_width },
            ideal: IdealFacingMode { facing_mode },
        }
    }
}

/// Full ladder for a facing mode, in [`MIN_WIDTH_LADDER`] order
pub fn advanced_ladder(facing_mode: Option<FacingMode>) -> Vec<AdvancedConstraint> {
    MIN_WIDTH_LADDER
        .iter()
        .map(|&min| AdvancedConstraint::min_width(min, facing_mode))
        .collect()
}

/// Object form of the `video` member
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoTrackConstraints {
    /// Requested facing mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facing_mode: Option<FacingMode>,
    /// Requested width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Requested height
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Device that must be used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<ExactConstraint<String>>,
    /// Fallback descriptors tried in order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced: Option<Vec<AdvancedConstraint>>,
}

/// The `video` member: either a bare flag or a constraint object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VideoConstraints {
    /// `true` for "any camera" or `false` for no video
    Enabled(bool),
    /// Constrained request
    Track(VideoTrackConstraints),
}

impl Default for VideoConstraints {
    fn default() -> Self {
        VideoConstraints::Enabled(true)
    }
}

/// Descriptor passed to a stream request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaStreamConstraints {
    /// Audio is never requested
    pub audio: bool,
    /// Video request
    pub video: VideoConstraints,
}

impl MediaStreamConstraints {
    /// `{ audio: false, video: true }`
    pub fn minimum() -> Self {
        Self {
            audio: false,
            video: VideoConstraints::Enabled(true),
        }
    }

    /// Constrained video request with audio disabled
    pub fn video(track: VideoTrackConstraints) -> Self {
        Self {
            audio: false,
            video: VideoConstraints::Track(track),
        }
    }

    /// True for the fixed minimal descriptor
    pub fn is_minimum(&self) -> bool {
        *self == Self::minimum()
    }

    /// Video constraint object, if this is a constrained request
    pub fn video_track(&self) -> Option<&VideoTrackConstraints> {
        match &self.video {
            VideoConstraints::Track(track) => Some(track),
            VideoConstraints::Enabled(_) => None,
        }
    }

    /// Consume into the video object, turning a bare `video: true` into an empty object
    pub fn into_video_track(self) -> VideoTrackConstraints {
        match self.video {
            VideoConstraints::Track(track) => track,
            VideoConstraints::Enabled(_) => VideoTrackConstraints::default(),
        }
    }

    /// JSON value in the shape the runtime expects
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
