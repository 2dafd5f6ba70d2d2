//! Browser backend over `web-sys`
//!
//! Only built for `wasm32`. Constraints and settings cross the JS boundary as
//! JSON so the serde model in `camphoto-core` stays the single source of truth.

use crate::session::CameraPhoto;
use async_trait::async_trait;
use camphoto_core::{
    CameraError, CameraResult, ErrorCallback, FacingMode, LegacyGetUserMedia, MediaDeviceInfo,
    MediaDeviceKind, MediaDevices, MediaStream, MediaStreamConstraints, MediaStreamTrack,
    Navigator, StreamHandle, SuccessCallback, SupportedConstraints, TrackKind, TrackSettings,
};
use camphoto_media::{ObjectUrlSource, ObjectUrls, VideoElement, VideoFrame};
use js_sys::{Array, Function, Promise, Reflect, Uint8Array, JSON};
use std::any::Any;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, DomException, HtmlCanvasElement, HtmlVideoElement, Url,
};

/// Vendor-prefixed names tried for the legacy capture function, in order
const LEGACY_GET_USER_MEDIA: [&str; 4] = [
    "getUserMedia",
    "webkitGetUserMedia",
    "mozGetUserMedia",
    "msGetUserMedia",
];

/// Map a rejected promise or thrown value to a [`CameraError`]
fn to_camera_error(value: JsValue) -> CameraError {
    if let Some(exception) = value.dyn_ref::<DomException>() {
        let constraint = Reflect::get(&value, &JsValue::from_str("constraint"))
            .ok()
            .and_then(|constraint| constraint.as_string())
            .filter(|constraint| !constraint.is_empty());
        return CameraError::GetUserMediaFailed {
            name: exception.name(),
            message: exception.message(),
            constraint,
        };
    }

    let name = Reflect::get(&value, &JsValue::from_str("name"))
        .ok()
        .and_then(|name| name.as_string())
        .unwrap_or_else(|| "Error".to_string());
    let message = Reflect::get(&value, &JsValue::from_str("message"))
        .ok()
        .and_then(|message| message.as_string())
        .or_else(|| value.as_string())
        .unwrap_or_default();
    CameraError::get_user_media(name, message)
}

fn stringify(value: &JsValue) -> Option<String> {
    JSON::stringify(value).ok().and_then(|json| json.as_string())
}

fn to_js_constraints(constraints: &MediaStreamConstraints) -> CameraResult<JsValue> {
    JSON::parse(&constraints.to_json().to_string()).map_err(to_camera_error)
}

/// Wait on the browser event loop
pub(crate) async fn sleep(delay: Duration) {
    let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
    let promise = Promise::new(&mut |resolve, _reject| {
        if let Some(window) = web_sys::window() {
            let _ = window
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis);
        }
    });
    let _ = JsFuture::from(promise).await;
}

/// Browser track
#[derive(Debug)]
pub struct WebMediaStreamTrack {
    inner: web_sys::MediaStreamTrack,
}

impl MediaStreamTrack for WebMediaStreamTrack {
    fn id(&self) -> String {
        self.inner.id()
    }

    fn kind(&self) -> TrackKind {
        match self.inner.kind().as_str() {
            "audio" => TrackKind::Audio,
            _ => TrackKind::Video,
        }
    }

    fn stop(&self) {
        self.inner.stop();
    }

    fn get_settings(&self) -> Option<TrackSettings> {
        let json = stringify(&self.inner.get_settings())?;
        let mut value: serde_json::Value = serde_json::from_str(&json).ok()?;

        // Devices may report facing modes we do not model
        if let Some(settings) = value.as_object_mut() {
            let known = settings
                .get("facingMode")
                .and_then(|mode| mode.as_str())
                .is_some_and(|mode| mode.parse::<FacingMode>().is_ok());
            if !known {
                settings.remove("facingMode");
            }
        }

        serde_json::from_value(value).ok()
    }
}

/// Browser stream
#[derive(Debug, Clone)]
pub struct WebMediaStream {
    inner: web_sys::MediaStream,
}

impl WebMediaStream {
    /// Wrap a browser stream
    pub fn new(inner: web_sys::MediaStream) -> Self {
        Self { inner }
    }

    /// Underlying browser stream
    pub fn inner(&self) -> &web_sys::MediaStream {
        &self.inner
    }
}

impl MediaStream for WebMediaStream {
    fn id(&self) -> String {
        self.inner.id()
    }

    fn get_tracks(&self) -> Vec<Rc<dyn MediaStreamTrack>> {
        self.inner
            .get_tracks()
            .iter()
            .map(|track| {
                Rc::new(WebMediaStreamTrack {
                    inner: track.unchecked_into(),
                }) as Rc<dyn MediaStreamTrack>
            })
            .collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn web_stream(stream: &StreamHandle) -> Option<&WebMediaStream> {
    stream.as_any().downcast_ref::<WebMediaStream>()
}

/// Standard `navigator.mediaDevices`
#[derive(Debug)]
pub struct WebMediaDevices {
    inner: web_sys::MediaDevices,
}

#[async_trait(?Send)]
impl MediaDevices for WebMediaDevices {
    async fn get_user_media(
        &self,
        constraints: &MediaStreamConstraints,
    ) -> CameraResult<StreamHandle> {
        let js_constraints: web_sys::MediaStreamConstraints =
            to_js_constraints(constraints)?.unchecked_into();
        let promise = self
            .inner
            .get_user_media_with_constraints(&js_constraints)
            .map_err(to_camera_error)?;
        let stream = JsFuture::from(promise).await.map_err(to_camera_error)?;

        Ok(Rc::new(WebMediaStream::new(stream.unchecked_into())))
    }

    async fn enumerate_devices(&self) -> CameraResult<Vec<MediaDeviceInfo>> {
        let enumeration_failed = |value: JsValue| CameraError::EnumerateDevicesFailed {
            reason: to_camera_error(value).to_string(),
        };
        let promise = self.inner.enumerate_devices().map_err(enumeration_failed)?;
        let devices = JsFuture::from(promise).await.map_err(enumeration_failed)?;

        Ok(Array::from(&devices)
            .iter()
            .filter_map(|device| {
                let device: web_sys::MediaDeviceInfo = device.unchecked_into();
                let kind = match device.kind() {
                    web_sys::MediaDeviceKind::Videoinput => MediaDeviceKind::VideoInput,
                    web_sys::MediaDeviceKind::Audioinput => MediaDeviceKind::AudioInput,
                    web_sys::MediaDeviceKind::Audiooutput => MediaDeviceKind::AudioOutput,
                    _ => return None,
                };
                Some(MediaDeviceInfo {
                    kind,
                    label: device.label(),
                    device_id: device.device_id(),
                    group_id: device.group_id(),
                })
            })
            .collect())
    }

    fn get_supported_constraints(&self) -> SupportedConstraints {
        stringify(&self.inner.get_supported_constraints())
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }
}

/// Vendor-prefixed callback `getUserMedia` bound to the navigator
#[derive(Debug)]
pub struct WebLegacyGetUserMedia {
    navigator: web_sys::Navigator,
    function: Function,
}

impl LegacyGetUserMedia for WebLegacyGetUserMedia {
    fn get_user_media(
        &self,
        constraints: &MediaStreamConstraints,
        on_success: SuccessCallback,
        on_error: ErrorCallback,
    ) -> CameraResult<()> {
        let js_constraints = to_js_constraints(constraints)?;

        // Each callback runs at most once; the runtime picks one of them
        let success = Closure::once_into_js(move |stream: JsValue| {
            on_success(Rc::new(WebMediaStream::new(stream.unchecked_into())));
        });
        let failure = Closure::once_into_js(move |error: JsValue| {
            on_error(to_camera_error(error));
        });

        self.function
            .call3(&self.navigator, &js_constraints, &success, &failure)
            .map_err(to_camera_error)?;
        Ok(())
    }
}

/// `window.navigator`
#[derive(Debug, Clone)]
pub struct WebNavigator {
    inner: web_sys::Navigator,
}

impl WebNavigator {
    /// Navigator of the current window
    pub fn from_window() -> CameraResult<Self> {
        let window = web_sys::window().ok_or(CameraError::UnsupportedEnvironment)?;
        Ok(Self {
            inner: window.navigator(),
        })
    }
}

impl Navigator for WebNavigator {
    fn media_devices(&self) -> Option<Rc<dyn MediaDevices>> {
        let devices = Reflect::get(&self.inner, &JsValue::from_str("mediaDevices")).ok()?;
        if devices.is_undefined() || devices.is_null() {
            return None;
        }
        let has_get_user_media =
            Reflect::has(&devices, &JsValue::from_str("getUserMedia")).unwrap_or(false);
        if !has_get_user_media {
            return None;
        }

        Some(Rc::new(WebMediaDevices {
            inner: devices.unchecked_into(),
        }))
    }

    fn legacy_get_user_media(&self) -> Option<Rc<dyn LegacyGetUserMedia>> {
        LEGACY_GET_USER_MEDIA.iter().find_map(|name| {
            let function = Reflect::get(&self.inner, &JsValue::from_str(name))
                .ok()?
                .dyn_into::<Function>()
                .ok()?;
            debug!("📷 Using legacy navigator.{}", name);
            Some(Rc::new(WebLegacyGetUserMedia {
                navigator: self.inner.clone(),
                function,
            }) as Rc<dyn LegacyGetUserMedia>)
        })
    }
}

/// `<video>` element plus a scratch canvas for sampling frames
#[derive(Debug)]
pub struct WebVideoElement {
    video: HtmlVideoElement,
    canvas: Option<(HtmlCanvasElement, CanvasRenderingContext2d)>,
}

impl WebVideoElement {
    /// Wrap a video element
    pub fn new(video: HtmlVideoElement) -> Self {
        let canvas = scratch_canvas();
        if canvas.is_none() {
            warn!("🖼️ No 2d canvas available, frames will be blank");
        }
        Self { video, canvas }
    }

    /// Underlying element
    pub fn inner(&self) -> &HtmlVideoElement {
        &self.video
    }
}

fn scratch_canvas() -> Option<(HtmlCanvasElement, CanvasRenderingContext2d)> {
    let document = web_sys::window()?.document()?;
    let canvas: HtmlCanvasElement = document.create_element("canvas").ok()?.dyn_into().ok()?;
    let context: CanvasRenderingContext2d =
        canvas.get_context("2d").ok()??.dyn_into().ok()?;
    Some((canvas, context))
}

impl VideoElement for WebVideoElement {
    fn supports_src_object(&self) -> bool {
        Reflect::has(&self.video, &JsValue::from_str("srcObject")).unwrap_or(false)
    }

    fn set_src_object(&self, stream: Option<StreamHandle>) {
        match stream {
            None => self.video.set_src_object(None),
            Some(stream) => match web_stream(&stream) {
                Some(web) => self.video.set_src_object(Some(web.inner())),
                None => warn!("📹 Stream {} is not a browser stream", stream.id()),
            },
        }
    }

    fn set_src(&self, src: &str) {
        self.video.set_src(src);
    }

    fn video_width(&self) -> u32 {
        self.video.video_width()
    }

    fn video_height(&self) -> u32 {
        self.video.video_height()
    }

    fn current_frame(&self) -> VideoFrame {
        let (width, height) = (self.video_width(), self.video_height());
        if width == 0 || height == 0 {
            return VideoFrame::empty();
        }
        let Some((canvas, context)) = &self.canvas else {
            return VideoFrame::blank(width, height);
        };

        canvas.set_width(width);
        canvas.set_height(height);
        let pixels = context
            .draw_image_with_html_video_element(&self.video, 0.0, 0.0)
            .and_then(|_| context.get_image_data(0.0, 0.0, f64::from(width), f64::from(height)));

        match pixels {
            Ok(image_data) => VideoFrame::new(width, height, image_data.data().0),
            Err(e) => {
                warn!("🖼️ Could not read video pixels: {:?}", e);
                VideoFrame::blank(width, height)
            }
        }
    }
}

/// `URL.createObjectURL` and `URL.revokeObjectURL`
#[derive(Debug, Default, Clone, Copy)]
pub struct WebObjectUrls;

impl WebObjectUrls {
    fn blob(data: &[u8], mime_type: &str) -> CameraResult<web_sys::Blob> {
        let parts = Array::of1(&Uint8Array::from(data));
        let options = web_sys::BlobPropertyBag::new();
        options.set_type(mime_type);
        web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(|e| {
            CameraError::EncodingFailed {
                format: mime_type.to_string(),
                reason: format!("{:?}", e),
            }
        })
    }

    /// Legacy browsers accept a stream in `createObjectURL`; `web-sys` only
    /// binds the blob overload, so the call goes through `Reflect`.
    fn stream_url(stream: &StreamHandle) -> CameraResult<String> {
        let binding_failed = |reason: String| CameraError::DisplayBindingFailed { reason };

        let web = web_stream(stream)
            .ok_or_else(|| binding_failed(format!("stream {} is not a browser stream", stream.id())))?;
        let url = Reflect::get(&js_sys::global(), &JsValue::from_str("URL"))
            .map_err(|e| binding_failed(format!("{:?}", e)))?;
        let create: Function = Reflect::get(&url, &JsValue::from_str("createObjectURL"))
            .map_err(|e| binding_failed(format!("{:?}", e)))?
            .dyn_into()
            .map_err(|_| binding_failed("URL.createObjectURL is missing".to_string()))?;

        create
            .call1(&url, web.inner())
            .map_err(|e| binding_failed(to_camera_error(e).to_string()))?
            .as_string()
            .ok_or_else(|| binding_failed("createObjectURL returned a non-string".to_string()))
    }
}

impl ObjectUrls for WebObjectUrls {
    fn create_object_url(&self, source: ObjectUrlSource) -> CameraResult<String> {
        let blob = match &source {
            ObjectUrlSource::Blob(blob) => Self::blob(blob.data(), blob.mime_type())?,
            ObjectUrlSource::File(file) => Self::blob(file.blob().data(), file.mime_type())?,
            ObjectUrlSource::Stream(stream) => return Self::stream_url(stream),
        };

        Url::create_object_url_with_blob(&blob).map_err(|e| CameraError::EncodingFailed {
            format: "blob".to_string(),
            reason: to_camera_error(e).to_string(),
        })
    }

    fn revoke_object_url(&self, url: &str) {
        if let Err(e) = Url::revoke_object_url(url) {
            debug!("🔗 Could not revoke {}: {:?}", url, e);
        }
    }
}

impl CameraPhoto {
    /// Session on a page `<video>` element using the window's navigator
    pub fn from_html_video_element(video: HtmlVideoElement) -> CameraResult<Self> {
        let navigator = WebNavigator::from_window()?;
        Ok(Self::builder(Rc::new(WebVideoElement::new(video)))
            .navigator(&navigator)
            .object_urls(Rc::new(WebObjectUrls))
            .build())
    }
}
