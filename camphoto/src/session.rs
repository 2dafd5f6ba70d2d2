//! Capture session bound to one display element
//!
//! A [`CameraPhoto`] is either idle (no stream) or active (one stream bound to
//! its element). Starting always releases the previous stream first; stopping
//! an idle session is an error.

use crate::config::CameraPhotoConfig;
use camphoto_core::{
    build_constraints, build_max_resolution_constraints, first_track_settings,
    resolve_capture_api, stop_all_tracks, CameraError, CameraResult, CaptureApi, FacingMode,
    IdealResolution, MediaDeviceInfo, MediaDevices, MediaStreamConstraints, Navigator,
    StreamHandle, TrackSettings,
};
use camphoto_media::{
    data_blob, data_uri, Blob, ExportConfig, File, ObjectUrlRegistry, ObjectUrlSource,
    ObjectUrls, UserConfig, VideoElement,
};
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Camera session: stream lifecycle plus still-image export
#[derive(Debug)]
pub struct CameraPhoto {
    video_element: Rc<dyn VideoElement>,
    capture_api: Option<CaptureApi>,
    object_urls: Rc<dyn ObjectUrls>,
    config: CameraPhotoConfig,
    stream: Option<StreamHandle>,
    stream_url: Option<String>,
    number_of_max_resolution_try: usize,
    settings: Option<TrackSettings>,
    input_video_device_infos: Vec<MediaDeviceInfo>,
}

/// Fluent builder for a [`CameraPhoto`]
#[derive(Debug)]
pub struct CameraPhotoBuilder {
    video_element: Rc<dyn VideoElement>,
    capture_api: Option<CaptureApi>,
    object_urls: Option<Rc<dyn ObjectUrls>>,
    config: CameraPhotoConfig,
}

impl CameraPhotoBuilder {
    fn new(video_element: Rc<dyn VideoElement>) -> Self {
        Self {
            video_element,
            capture_api: None,
            object_urls: None,
            config: CameraPhotoConfig::default(),
        }
    }

    /// Resolve the capture API from `navigator`
    pub fn navigator(mut self, navigator: &dyn Navigator) -> Self {
        self.capture_api = resolve_capture_api(navigator);
        self
    }

    /// Use an already resolved capture API
    pub fn capture_api(mut self, capture_api: CaptureApi) -> Self {
        self.capture_api = Some(capture_api);
        self
    }

    /// Use a specific object-URL factory
    pub fn object_urls(mut self, object_urls: Rc<dyn ObjectUrls>) -> Self {
        self.object_urls = Some(object_urls);
        self
    }

    /// Replace the configuration
    pub fn config(mut self, config: CameraPhotoConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the session; it starts idle
    pub fn build(self) -> CameraPhoto {
        let object_urls: Rc<dyn ObjectUrls> = match self.object_urls {
            Some(object_urls) => object_urls,
            None => Rc::new(ObjectUrlRegistry::new(self.config.object_url_origin.clone())),
        };

        if self.capture_api.is_none() {
            debug!("📷 Session created without a capture API");
        }

        CameraPhoto {
            video_element: self.video_element,
            capture_api: self.capture_api,
            object_urls,
            number_of_max_resolution_try: self.config.initial_max_resolution_try,
            config: self.config,
            stream: None,
            stream_url: None,
            settings: None,
            input_video_device_infos: Vec::new(),
        }
    }
}

impl CameraPhoto {
    /// Session on `video_element` using whatever capture API `navigator` offers
    pub fn new(video_element: Rc<dyn VideoElement>, navigator: &dyn Navigator) -> Self {
        Self::builder(video_element).navigator(navigator).build()
    }

    /// Builder for a session on `video_element`
    pub fn builder(video_element: Rc<dyn VideoElement>) -> CameraPhotoBuilder {
        CameraPhotoBuilder::new(video_element)
    }

    /// True while a stream is bound
    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Currently bound stream
    pub fn stream(&self) -> Option<&StreamHandle> {
        self.stream.as_ref()
    }

    /// Resolved capture API, `None` when capture is unsupported
    pub fn capture_api(&self) -> Option<&CaptureApi> {
        self.capture_api.as_ref()
    }

    /// Ladder attempt the next max-resolution start begins at
    pub fn number_of_max_resolution_try(&self) -> usize {
        self.number_of_max_resolution_try
    }

    /// Session configuration
    pub fn config(&self) -> &CameraPhotoConfig {
        &self.config
    }

    /// Settings of the first track of the active stream
    pub fn get_camera_settings(&self) -> Option<&TrackSettings> {
        self.settings.as_ref()
    }

    /// Video inputs seen after the last successful start
    pub fn get_input_video_device_infos(&self) -> &[MediaDeviceInfo] {
        &self.input_video_device_infos
    }

    /// Start the camera with optional preferences
    ///
    /// Any active stream is stopped first. On failure the session stays idle
    /// and the runtime's error is returned as is.
    pub async fn start_camera(
        &mut self,
        facing_mode: Option<FacingMode>,
        resolution: Option<IdealResolution>,
        exact_device_id: Option<&str>,
    ) -> CameraResult<StreamHandle> {
        self.release_previous_stream();
        let api = self.resolved_api()?;

        let constraints =
            build_constraints(&api, facing_mode, resolution.as_ref(), exact_device_id);
        self.acquire(&api, &constraints).await
    }

    /// Start the camera at the highest resolution the device accepts
    ///
    /// Walks the minimum-width ladder from the session's current attempt,
    /// waiting `retry_delay` between failures. Once the ladder is exhausted a
    /// single request without resolution constraints is made, and only its
    /// error is returned. The attempt counter is kept across calls.
    pub async fn start_camera_max_resolution(
        &mut self,
        facing_mode: Option<FacingMode>,
        exact_device_id: Option<&str>,
    ) -> CameraResult<StreamHandle> {
        self.release_previous_stream();
        let api = self.resolved_api()?;

        loop {
            let attempt = self.number_of_max_resolution_try;
            let Some(constraints) =
                build_max_resolution_constraints(&api, facing_mode, exact_device_id, attempt)
            else {
                debug!("📐 Resolution ladder exhausted, requesting without resolution");
                let constraints = build_constraints(
                    &api,
                    facing_mode,
                    Some(&IdealResolution::default()),
                    exact_device_id,
                );
                return self.acquire(&api, &constraints).await;
            };

            match api.get_user_media(&constraints).await {
                Ok(stream) => return self.accept(&api, stream).await,
                Err(e) => {
                    debug!("📐 Max resolution attempt {} failed: {}", attempt, e);
                    sleep(self.config.retry_delay()).await;
                    self.number_of_max_resolution_try += 1;
                }
            }
        }
    }

    /// Stop every track and clear the display element
    pub fn stop_camera(&mut self) -> CameraResult<()> {
        let stream = self.stream.take().ok_or(CameraError::NoActiveStream)?;

        stop_all_tracks(stream.as_ref());
        if self.video_element.supports_src_object() {
            self.video_element.set_src_object(None);
        }
        self.video_element.set_src("");
        if let Some(url) = self.stream_url.take() {
            self.object_urls.revoke_object_url(&url);
        }
        self.settings = None;

        info!("⏹️ Camera stopped: stream {}", stream.id());
        Ok(())
    }

    /// Current frame as a data URI
    pub fn get_data_uri(&self, config: &UserConfig) -> CameraResult<String> {
        data_uri(self.video_element.as_ref(), &self.export_config(config))
    }

    /// Current frame as an encoded blob
    pub async fn get_data_blob(&self, config: &UserConfig) -> CameraResult<Blob> {
        data_blob(self.video_element.as_ref(), &self.export_config(config)).await
    }

    /// Current frame as a named file with the blob's media type
    pub async fn get_data_file(&self, config: &UserConfig, filename: &str) -> CameraResult<File> {
        let blob = self.get_data_blob(config).await?;
        Ok(File::from_blob(blob, filename))
    }

    /// Object URL for a blob; the caller revokes it
    pub fn blob_to_url(&self, blob: &Blob) -> CameraResult<String> {
        self.object_urls
            .create_object_url(ObjectUrlSource::Blob(blob.clone()))
    }

    /// Object URL for a file; the caller revokes it
    pub fn file_to_url(&self, file: &File) -> CameraResult<String> {
        self.object_urls
            .create_object_url(ObjectUrlSource::File(file.clone()))
    }

    /// Revoke a URL from [`CameraPhoto::blob_to_url`] or [`CameraPhoto::file_to_url`]
    pub fn revoke_url(&self, url: &str) {
        self.object_urls.revoke_object_url(url);
    }

    fn export_config(&self, config: &UserConfig) -> ExportConfig {
        ExportConfig::resolve(&config.clone().or(&self.config.default_export))
    }

    fn resolved_api(&self) -> CameraResult<CaptureApi> {
        self.capture_api
            .clone()
            .ok_or(CameraError::UnsupportedEnvironment)
    }

    fn release_previous_stream(&mut self) {
        if let Err(e) = self.stop_camera() {
            debug!("⏹️ Nothing to release before start: {}", e);
        }
    }

    async fn acquire(
        &mut self,
        api: &CaptureApi,
        constraints: &MediaStreamConstraints,
    ) -> CameraResult<StreamHandle> {
        debug!("📹 Requesting stream with {}", constraints.to_json());
        let stream = api.get_user_media(constraints).await?;
        self.accept(api, stream).await
    }

    async fn accept(&mut self, api: &CaptureApi, stream: StreamHandle) -> CameraResult<StreamHandle> {
        self.bind(&stream)?;
        self.refresh_input_video_devices(api).await;

        info!("📹 Camera started: stream {}", stream.id());
        Ok(stream)
    }

    fn bind(&mut self, stream: &StreamHandle) -> CameraResult<()> {
        if self.video_element.supports_src_object() {
            self.video_element.set_src_object(Some(Rc::clone(stream)));
        } else {
            let url = self
                .object_urls
                .create_object_url(ObjectUrlSource::Stream(Rc::clone(stream)))
                .inspect_err(|_| {
                    // Nothing is bound, so the new stream must not stay live
                    stop_all_tracks(stream.as_ref());
                })?;
            self.video_element.set_src(&url);
            self.stream_url = Some(url);
        }

        self.settings = first_track_settings(stream.as_ref());
        self.stream = Some(Rc::clone(stream));
        Ok(())
    }

    async fn refresh_input_video_devices(&mut self, api: &CaptureApi) {
        match api.enumerate_devices().await {
            Ok(devices) => {
                self.input_video_device_infos = devices
                    .into_iter()
                    .filter(MediaDeviceInfo::is_video_input)
                    .collect();
                debug!(
                    "📋 Found {} video input device(s)",
                    self.input_video_device_infos.len()
                );
            }
            Err(e) => warn!("📋 Could not refresh video input devices: {}", e),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn sleep(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(target_arch = "wasm32")]
async fn sleep(delay: Duration) {
    if !delay.is_zero() {
        crate::web::sleep(delay).await;
    }
}
