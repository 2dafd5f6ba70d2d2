//! Stream, track and device descriptors exposed by the capture runtime

use crate::constraints::FacingMode;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Kind of a media track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    /// Video track
    Video,
    /// Audio track
    Audio,
}

/// Settings the runtime applied to a live track
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSettings {
    /// Width divided by height
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f64>,
    /// Device backing the track
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Frames per second
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f64>,
    /// Frame height in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Frame width in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Facing mode, when the device reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facing_mode: Option<FacingMode>,
}

/// A single live track of a stream
pub trait MediaStreamTrack: fmt::Debug {
    /// Track identifier
    fn id(&self) -> String;

    /// Track kind
    fn kind(&self) -> TrackKind;

    /// Stop the track and release the underlying device
    fn stop(&self);

    /// Current settings, if the runtime exposes them
    fn get_settings(&self) -> Option<TrackSettings>;
}

/// A stream handed out by the capture runtime
pub trait MediaStream: fmt::Debug {
    /// Stream identifier
    fn id(&self) -> String;

    /// All tracks of the stream, in runtime order
    fn get_tracks(&self) -> Vec<Rc<dyn MediaStreamTrack>>;

    /// Concrete stream, for backends that need their own handle back
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a stream; the session and the caller hold the same one
pub type StreamHandle = Rc<dyn MediaStream>;

/// Kind of an enumerated device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaDeviceKind {
    /// Camera
    #[serde(rename = "videoinput")]
    VideoInput,
    /// Microphone
    #[serde(rename = "audioinput")]
    AudioInput,
    /// Speaker or headset
    #[serde(rename = "audiooutput")]
    AudioOutput,
}

impl MediaDeviceKind {
    /// Parse the runtime's kind string
    pub fn from_runtime(kind: &str) -> Option<Self> {
        match kind {
            "videoinput" => Some(MediaDeviceKind::VideoInput),
            "audioinput" => Some(MediaDeviceKind::AudioInput),
            "audiooutput" => Some(MediaDeviceKind::AudioOutput),
            _ => None,
        }
    }
}

/// Device descriptor returned by enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDeviceInfo {
    /// Device kind
    pub kind: MediaDeviceKind,
    /// Human readable label; empty until permission is granted
    pub label: String,
    /// Stable device identifier
    pub device_id: String,
    /// Identifier shared by devices on the same physical unit
    #[serde(default)]
    pub group_id: String,
}

impl MediaDeviceInfo {
    /// Video input descriptor
    pub fn video_input(device_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind: MediaDeviceKind::VideoInput,
            label: label.into(),
            device_id: device_id.into(),
            group_id: String::new(),
        }
    }

    /// True for cameras
    pub fn is_video_input(&self) -> bool {
        self.kind == MediaDeviceKind::VideoInput
    }
}

/// Settings of the first track of `stream`, if any
pub fn first_track_settings(stream: &dyn MediaStream) -> Option<TrackSettings> {
    stream
        .get_tracks()
        .first()
        .and_then(|track| track.get_settings())
}

/// Stop every track of `stream`
pub fn stop_all_tracks(stream: &dyn MediaStream) {
    for track in stream.get_tracks() {
        track.stop();
    }
}
