//! In-memory capture runtime
//!
//! Stands in for a browser on native targets: grants or refuses streams on
//! demand, records every request and renders a color-bar test pattern at the
//! bound stream's resolution.

use async_trait::async_trait;
use camphoto_core::{
    CameraError, CameraResult, ErrorCallback, LegacyGetUserMedia, MediaDeviceInfo,
    MediaDeviceKind, MediaDevices, MediaStream, MediaStreamConstraints, MediaStreamTrack,
    Navigator, StreamHandle, SuccessCallback, SupportedConstraints, TrackKind, TrackSettings,
};
use camphoto_media::{ObjectUrlRegistry, ObjectUrlSource, VideoElement, VideoFrame};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id(prefix: &str) -> String {
    format!("{}-{}", prefix, NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Default resolution of granted streams
pub const MOCK_RESOLUTION: (u32, u32) = (640, 480);

/// Colors of the test pattern, left to right
const COLOR_BARS: [[u8; 4]; 4] = [
    [255, 0, 0, 255],
    [0, 255, 0, 255],
    [0, 0, 255, 255],
    [255, 255, 255, 255],
];

/// Mock video track
#[derive(Debug)]
pub struct MockTrack {
    id: String,
    settings: TrackSettings,
    stopped: Cell<bool>,
}

impl MockTrack {
    /// Live video track with the given settings
    pub fn new(settings: TrackSettings) -> Self {
        Self {
            id: next_id("mock-track"),
            settings,
            stopped: Cell::new(false),
        }
    }

    /// True once [`MediaStreamTrack::stop`] was called
    pub fn is_stopped(&self) -> bool {
        self.stopped.get()
    }
}

impl MediaStreamTrack for MockTrack {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn kind(&self) -> TrackKind {
        TrackKind::Video
    }

    fn stop(&self) {
        self.stopped.set(true);
    }

    fn get_settings(&self) -> Option<TrackSettings> {
        Some(self.settings.clone())
    }
}

/// Mock stream with one video track
#[derive(Debug)]
pub struct MockStream {
    id: String,
    tracks: Vec<Rc<MockTrack>>,
}

impl MockStream {
    /// Stream with a single video track
    pub fn new(settings: TrackSettings) -> Self {
        Self {
            id: next_id("mock-stream"),
            tracks: vec![Rc::new(MockTrack::new(settings))],
        }
    }

    /// Concrete tracks
    pub fn tracks(&self) -> &[Rc<MockTrack>] {
        &self.tracks
    }

    /// True when every track was stopped
    pub fn all_tracks_stopped(&self) -> bool {
        self.tracks.iter().all(|track| track.is_stopped())
    }

    fn resolution(&self) -> (u32, u32) {
        self.tracks
            .first()
            .filter(|track| !track.is_stopped())
            .map(|track| {
                (
                    track.settings.width.unwrap_or(0),
                    track.settings.height.unwrap_or(0),
                )
            })
            .unwrap_or((0, 0))
    }
}

impl MediaStream for MockStream {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn get_tracks(&self) -> Vec<Rc<dyn MediaStreamTrack>> {
        self.tracks
            .iter()
            .map(|track| Rc::clone(track) as Rc<dyn MediaStreamTrack>)
            .collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Scriptable standard capture API
#[derive(Debug)]
pub struct MockMediaDevices {
    supported: SupportedConstraints,
    resolution: (u32, u32),
    devices: RefCell<Vec<MediaDeviceInfo>>,
    enumerate_failure: RefCell<Option<String>>,
    failures: RefCell<VecDeque<CameraError>>,
    fail_always: RefCell<Option<CameraError>>,
    requests: RefCell<Vec<MediaStreamConstraints>>,
    granted: RefCell<Vec<Rc<MockStream>>>,
}

impl Default for MockMediaDevices {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMediaDevices {
    /// Runtime supporting every constraint key, with two cameras and a microphone
    pub fn new() -> Self {
        Self::with_supported(SupportedConstraints::all())
    }

    /// Runtime supporting only the given constraint keys
    pub fn with_supported(supported: SupportedConstraints) -> Self {
        Self {
            supported,
            resolution: MOCK_RESOLUTION,
            devices: RefCell::new(vec![
                MediaDeviceInfo::video_input("mock-camera-0", "Mock Front Camera"),
                MediaDeviceInfo::video_input("mock-camera-1", "Mock Back Camera"),
                MediaDeviceInfo {
                    kind: MediaDeviceKind::AudioInput,
                    label: "Mock Microphone".to_string(),
                    device_id: "mock-mic-0".to_string(),
                    group_id: String::new(),
                },
            ]),
            enumerate_failure: RefCell::new(None),
            failures: RefCell::new(VecDeque::new()),
            fail_always: RefCell::new(None),
            requests: RefCell::new(Vec::new()),
            granted: RefCell::new(Vec::new()),
        }
    }

    /// Resolution of streams granted without an explicit width or height
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = (width, height);
        self
    }

    /// Replace the enumerated devices
    pub fn set_devices(&self, devices: Vec<MediaDeviceInfo>) {
        *self.devices.borrow_mut() = devices;
    }

    /// Make enumeration fail with `reason`
    pub fn fail_enumeration(&self, reason: impl Into<String>) {
        *self.enumerate_failure.borrow_mut() = Some(reason.into());
    }

    /// Refuse the next stream request with `error`; queued failures run in order
    pub fn push_failure(&self, error: CameraError) {
        self.failures.borrow_mut().push_back(error);
    }

    /// Refuse every stream request with `error`
    pub fn fail_always(&self, error: CameraError) {
        *self.fail_always.borrow_mut() = Some(error);
    }

    /// Every constraint set requested so far
    pub fn requests(&self) -> Vec<MediaStreamConstraints> {
        self.requests.borrow().clone()
    }

    /// Every stream granted so far
    pub fn granted(&self) -> Vec<Rc<MockStream>> {
        self.granted.borrow().clone()
    }

    /// Most recently granted stream
    pub fn last_granted(&self) -> Option<Rc<MockStream>> {
        self.granted.borrow().last().cloned()
    }

    /// Answer a stream request synchronously
    pub fn respond(&self, constraints: &MediaStreamConstraints) -> CameraResult<Rc<MockStream>> {
        self.requests.borrow_mut().push(constraints.clone());

        if let Some(error) = self.failures.borrow_mut().pop_front() {
            debug!("📹 Mock refusing request: {}", error);
            return Err(error);
        }
        if let Some(error) = self.fail_always.borrow().clone() {
            debug!("📹 Mock refusing request: {}", error);
            return Err(error);
        }

        let track = constraints.video_track();
        let device_id = track
            .and_then(|video| video.device_id.as_ref())
            .map(|exact| exact.exact.clone())
            .unwrap_or_else(|| "mock-camera-0".to_string());
        let width = track
            .and_then(|video| video.width)
            .unwrap_or(self.resolution.0);
        let height = track
            .and_then(|video| video.height)
            .unwrap_or(self.resolution.1);

        let settings = TrackSettings {
            aspect_ratio: (height > 0).then(|| f64::from(width) / f64::from(height)),
            device_id: Some(device_id),
            frame_rate: Some(30.0),
            height: Some(height),
            width: Some(width),
            facing_mode: track.and_then(|video| video.facing_mode),
        };

        let stream = Rc::new(MockStream::new(settings));
        self.granted.borrow_mut().push(Rc::clone(&stream));
        debug!("📹 Mock granted stream {} at {}x{}", stream.id(), width, height);
        Ok(stream)
    }
}

#[async_trait(?Send)]
impl MediaDevices for MockMediaDevices {
    async fn get_user_media(
        &self,
        constraints: &MediaStreamConstraints,
    ) -> CameraResult<StreamHandle> {
        let stream: StreamHandle = self.respond(constraints)?;
        Ok(stream)
    }

    async fn enumerate_devices(&self) -> CameraResult<Vec<MediaDeviceInfo>> {
        if let Some(reason) = self.enumerate_failure.borrow().clone() {
            return Err(CameraError::EnumerateDevicesFailed { reason });
        }
        Ok(self.devices.borrow().clone())
    }

    fn get_supported_constraints(&self) -> SupportedConstraints {
        self.supported
    }
}

/// Callback-style capture function backed by a [`MockMediaDevices`]
#[derive(Debug)]
pub struct MockLegacyGetUserMedia {
    devices: Rc<MockMediaDevices>,
}

impl MockLegacyGetUserMedia {
    /// Answer requests through `devices`
    pub fn new(devices: Rc<MockMediaDevices>) -> Self {
        Self { devices }
    }
}

impl LegacyGetUserMedia for MockLegacyGetUserMedia {
    fn get_user_media(
        &self,
        constraints: &MediaStreamConstraints,
        on_success: SuccessCallback,
        on_error: ErrorCallback,
    ) -> CameraResult<()> {
        match self.devices.respond(constraints) {
            Ok(stream) => on_success(stream as StreamHandle),
            Err(error) => on_error(error),
        }
        Ok(())
    }
}

/// Navigator exposing any combination of the mock APIs
#[derive(Debug, Default)]
pub struct MockNavigator {
    standard: Option<Rc<MockMediaDevices>>,
    legacy: Option<Rc<MockLegacyGetUserMedia>>,
}

impl MockNavigator {
    /// Navigator with the standard API
    pub fn standard(devices: Rc<MockMediaDevices>) -> Self {
        Self {
            standard: Some(devices),
            legacy: None,
        }
    }

    /// Navigator with only the legacy callback API
    pub fn legacy(devices: Rc<MockMediaDevices>) -> Self {
        Self {
            standard: None,
            legacy: Some(Rc::new(MockLegacyGetUserMedia::new(devices))),
        }
    }

    /// Navigator without any capture API
    pub fn unsupported() -> Self {
        Self::default()
    }
}

impl Navigator for MockNavigator {
    fn media_devices(&self) -> Option<Rc<dyn MediaDevices>> {
        self.standard
            .clone()
            .map(|devices| devices as Rc<dyn MediaDevices>)
    }

    fn legacy_get_user_media(&self) -> Option<Rc<dyn LegacyGetUserMedia>> {
        self.legacy
            .clone()
            .map(|legacy| legacy as Rc<dyn LegacyGetUserMedia>)
    }
}

/// Display element that plays mock streams
///
/// Without stream-object support the element resolves its `src` through the
/// registry it was given, the way a browser resolves a `blob:` URL.
#[derive(Debug)]
pub struct MockVideoElement {
    registry: Option<Rc<ObjectUrlRegistry>>,
    src_object: RefCell<Option<StreamHandle>>,
    src: RefCell<String>,
}

impl Default for MockVideoElement {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVideoElement {
    /// Element supporting stream objects
    pub fn new() -> Self {
        Self {
            registry: None,
            src_object: RefCell::new(None),
            src: RefCell::new(String::new()),
        }
    }

    /// Element limited to URL sources resolved through `registry`
    pub fn without_src_object(registry: Rc<ObjectUrlRegistry>) -> Self {
        Self {
            registry: Some(registry),
            ..Self::new()
        }
    }

    /// Bound stream object
    pub fn src_object(&self) -> Option<StreamHandle> {
        self.src_object.borrow().clone()
    }

    /// Current source URL
    pub fn src(&self) -> String {
        self.src.borrow().clone()
    }

    fn playing(&self) -> Option<(u32, u32)> {
        let stream = match self.src_object() {
            Some(stream) => stream,
            None => match self.registry.as_ref()?.resolve(&self.src())? {
                ObjectUrlSource::Stream(stream) => stream,
                _ => return None,
            },
        };
        let resolution = stream.as_any().downcast_ref::<MockStream>()?.resolution();
        Some(resolution)
    }
}

impl VideoElement for MockVideoElement {
    fn supports_src_object(&self) -> bool {
        self.registry.is_none()
    }

    fn set_src_object(&self, stream: Option<StreamHandle>) {
        *self.src_object.borrow_mut() = stream;
    }

    fn set_src(&self, src: &str) {
        *self.src.borrow_mut() = src.to_string();
    }

    fn video_width(&self) -> u32 {
        self.playing().map(|(width, _)| width).unwrap_or(0)
    }

    fn video_height(&self) -> u32 {
        self.playing().map(|(_, height)| height).unwrap_or(0)
    }

    fn current_frame(&self) -> VideoFrame {
        match self.playing() {
            Some((width, height)) if width > 0 && height > 0 => color_bars(width, height),
            _ => VideoFrame::empty(),
        }
    }
}

/// Vertical color bars, red on the left and white on the right
pub fn color_bars(width: u32, height: u32) -> VideoFrame {
    let bar_width = (width as usize).div_ceil(COLOR_BARS.len()).max(1);
    let mut row = Vec::with_capacity(width as usize * 4);
    for x in 0..width as usize {
        row.extend_from_slice(&COLOR_BARS[(x / bar_width).min(COLOR_BARS.len() - 1)]);
    }

    let mut data = Vec::with_capacity(row.len() * height as usize);
    for _ in 0..height {
        data.extend_from_slice(&row);
    }
    VideoFrame::new(width, height, data)
}
