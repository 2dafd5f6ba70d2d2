//! Tests for the capture session
//!
//! Runs a [`CameraPhoto`] against the in-memory runtime: start and stop
//! lifecycle, maximum-resolution retries, legacy callback capture, display
//! binding and still export.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use camphoto::mock::{MockMediaDevices, MockNavigator, MockVideoElement, MOCK_RESOLUTION};
use camphoto::*;
use image::GenericImageView;
use serde_json::json;
use std::rc::Rc;

struct Fixture {
    devices: Rc<MockMediaDevices>,
    element: Rc<MockVideoElement>,
    camera: CameraPhoto,
}

fn test_config() -> CameraPhotoConfig {
    CameraPhotoConfig {
        retry_delay_ms: 0,
        ..CameraPhotoConfig::default()
    }
}

fn standard_fixture() -> Fixture {
    let devices = Rc::new(MockMediaDevices::new());
    let element = Rc::new(MockVideoElement::new());
    let camera = CameraPhoto::builder(element.clone())
        .navigator(&MockNavigator::standard(devices.clone()))
        .config(test_config())
        .build();
    Fixture {
        devices,
        element,
        camera,
    }
}

fn overconstrained() -> CameraError {
    CameraError::GetUserMediaFailed {
        name: "OverconstrainedError".to_string(),
        message: "width too large".to_string(),
        constraint: Some("width".to_string()),
    }
}

fn decode_png(uri: &str) -> image::DynamicImage {
    let payload = uri
        .strip_prefix("data:image/png;base64,")
        .expect("png data uri");
    let bytes = STANDARD.decode(payload).expect("valid base64");
    image::load_from_memory(&bytes).expect("decodable png")
}

// ============================================================================
// LIFECYCLE TESTS
// ============================================================================

#[tokio::test]
async fn test_new_session_is_idle() {
    let fixture = standard_fixture();
    assert!(!fixture.camera.is_active());
    assert!(fixture.camera.get_camera_settings().is_none());
    assert!(fixture.camera.get_input_video_device_infos().is_empty());
    assert_eq!(fixture.camera.number_of_max_resolution_try(), 1);
}

#[tokio::test]
async fn test_stop_idle_session_fails() {
    let mut fixture = standard_fixture();

    let error = fixture.camera.stop_camera().unwrap_err();
    assert_eq!(error, CameraError::NoActiveStream);
    assert_eq!(error.to_string(), "no stream to stop!");
}

#[tokio::test]
async fn test_start_then_stop_twice() {
    let mut fixture = standard_fixture();

    fixture
        .camera
        .start_camera(None, None, None)
        .await
        .expect("stream");
    assert!(fixture.camera.is_active());
    assert!(fixture.element.src_object().is_some());

    fixture.camera.stop_camera().expect("first stop");
    let stream = fixture.devices.last_granted().unwrap();
    assert!(stream.all_tracks_stopped());
    assert!(fixture.element.src_object().is_none());
    assert_eq!(fixture.element.src(), "");
    assert!(fixture.camera.get_camera_settings().is_none());

    assert_eq!(
        fixture.camera.stop_camera(),
        Err(CameraError::NoActiveStream)
    );
}

#[tokio::test]
async fn test_start_without_preferences_sends_minimum_request() {
    let mut fixture = standard_fixture();

    fixture.camera.start_camera(None, None, None).await.unwrap();

    let requests = fixture.devices.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].is_minimum());
}

#[tokio::test]
async fn test_start_with_user_facing_mode() {
    let mut fixture = standard_fixture();

    fixture
        .camera
        .start_camera(Some(FacingMode::User), None, None)
        .await
        .unwrap();

    assert_eq!(
        fixture.devices.requests()[0].to_json(),
        json!({ "audio": false, "video": { "facingMode": "user" } })
    );
    let settings = fixture.camera.get_camera_settings().unwrap();
    assert_eq!(settings.facing_mode, Some(FacingMode::User));
}

#[tokio::test]
async fn test_start_with_resolution_and_device() {
    let mut fixture = standard_fixture();

    fixture
        .camera
        .start_camera(None, Some(IdealResolution::new(1280, 720)), Some("mock-camera-1"))
        .await
        .unwrap();

    let settings = fixture.camera.get_camera_settings().unwrap();
    assert_eq!(settings.width, Some(1280));
    assert_eq!(settings.height, Some(720));
    assert_eq!(settings.device_id.as_deref(), Some("mock-camera-1"));
}

#[tokio::test]
async fn test_start_stops_previous_stream() {
    let mut fixture = standard_fixture();

    let first = fixture.camera.start_camera(None, None, None).await.unwrap();
    let second = fixture
        .camera
        .start_camera(Some(FacingMode::Environment), None, None)
        .await
        .unwrap();

    let granted = fixture.devices.granted();
    assert_eq!(granted.len(), 2);
    assert!(granted[0].all_tracks_stopped());
    assert!(!granted[1].all_tracks_stopped());
    assert_ne!(first.id(), second.id());
    assert_eq!(fixture.camera.stream().unwrap().id(), second.id());
}

#[tokio::test]
async fn test_failed_start_leaves_session_idle() {
    let mut fixture = standard_fixture();
    fixture.camera.start_camera(None, None, None).await.unwrap();

    fixture
        .devices
        .push_failure(CameraError::get_user_media("NotAllowedError", "Permission denied"));
    let error = fixture
        .camera
        .start_camera(None, None, None)
        .await
        .unwrap_err();

    assert_eq!(
        error,
        CameraError::get_user_media("NotAllowedError", "Permission denied")
    );
    assert!(!error.is_recoverable());
    assert!(!fixture.camera.is_active());
    // The stream that was running before the failed start is released
    assert!(fixture.devices.granted()[0].all_tracks_stopped());
}

#[tokio::test]
async fn test_unsupported_environment() {
    let element = Rc::new(MockVideoElement::new());
    let mut camera = CameraPhoto::new(element, &MockNavigator::unsupported());

    assert!(camera.capture_api().is_none());
    assert_eq!(
        camera.start_camera(None, None, None).await.unwrap_err(),
        CameraError::UnsupportedEnvironment
    );
    assert_eq!(
        camera
            .start_camera_max_resolution(None, None)
            .await
            .unwrap_err(),
        CameraError::UnsupportedEnvironment
    );
}

// ============================================================================
// DEVICE REFRESH TESTS
// ============================================================================

#[tokio::test]
async fn test_device_refresh_keeps_only_cameras() {
    let mut fixture = standard_fixture();

    fixture.camera.start_camera(None, None, None).await.unwrap();

    let infos = fixture.camera.get_input_video_device_infos();
    assert_eq!(infos.len(), 2);
    assert!(infos.iter().all(MediaDeviceInfo::is_video_input));
    assert_eq!(infos[1].device_id, "mock-camera-1");
}

#[tokio::test]
async fn test_device_refresh_failure_is_swallowed() {
    let mut fixture = standard_fixture();
    fixture.devices.fail_enumeration("enumeration blocked");

    let result = fixture.camera.start_camera(None, None, None).await;

    assert!(result.is_ok());
    assert!(fixture.camera.is_active());
    assert!(fixture.camera.get_input_video_device_infos().is_empty());
}

// ============================================================================
// MAXIMUM RESOLUTION TESTS
// ============================================================================

#[tokio::test]
async fn test_max_resolution_first_attempt_succeeds() {
    let mut fixture = standard_fixture();

    fixture
        .camera
        .start_camera_max_resolution(Some(FacingMode::Environment), None)
        .await
        .unwrap();

    let requests = fixture.devices.requests();
    assert_eq!(requests.len(), 1);
    let advanced = requests[0].video_track().unwrap().advanced.clone().unwrap();
    assert_eq!(advanced.len(), MIN_WIDTH_LADDER.len() - 1);
    assert_eq!(fixture.camera.number_of_max_resolution_try(), 1);
}

#[tokio::test]
async fn test_max_resolution_retries_with_shorter_ladder() {
    let mut fixture = standard_fixture();
    for _ in 0..3 {
        fixture.devices.push_failure(overconstrained());
    }

    fixture
        .camera
        .start_camera_max_resolution(None, None)
        .await
        .unwrap();

    let requests = fixture.devices.requests();
    assert_eq!(requests.len(), 4);
    let lengths: Vec<usize> = requests
        .iter()
        .map(|request| request.video_track().unwrap().advanced.as_ref().unwrap().len())
        .collect();
    assert_eq!(lengths, vec![8, 7, 6, 5]);
    assert_eq!(fixture.camera.number_of_max_resolution_try(), 4);
    assert!(fixture.camera.is_active());
}

#[tokio::test]
async fn test_max_resolution_all_attempts_fail() {
    let mut fixture = standard_fixture();
    fixture.devices.fail_always(overconstrained());

    let error = fixture
        .camera
        .start_camera_max_resolution(Some(FacingMode::User), None)
        .await
        .unwrap_err();

    let requests = fixture.devices.requests();
    // Eight ladder attempts, then exactly one request without a ladder
    assert_eq!(requests.len(), 9);
    assert!(requests[..8]
        .iter()
        .all(|request| request.video_track().unwrap().advanced.is_some()));
    let last = requests[8].video_track().unwrap();
    assert!(last.advanced.is_none());
    assert_eq!(last.facing_mode, Some(FacingMode::User));

    assert_eq!(error, overconstrained());
    assert_eq!(error.category(), ErrorCategory::Acquisition);
    assert!(!fixture.camera.is_active());
}

#[tokio::test]
async fn test_max_resolution_counter_is_not_reset() {
    let mut fixture = standard_fixture();
    for _ in 0..MIN_WIDTH_LADDER.len() - 1 {
        fixture.devices.push_failure(overconstrained());
    }

    // Ladder exhausted, the final plain request succeeds
    fixture
        .camera
        .start_camera_max_resolution(None, None)
        .await
        .unwrap();
    assert_eq!(fixture.devices.requests().len(), 9);
    assert_eq!(
        fixture.camera.number_of_max_resolution_try(),
        MIN_WIDTH_LADDER.len()
    );

    // A later call goes straight to the plain request
    fixture
        .camera
        .start_camera_max_resolution(None, None)
        .await
        .unwrap();
    let requests = fixture.devices.requests();
    assert_eq!(requests.len(), 10);
    assert!(requests[9].is_minimum());
}

#[tokio::test]
async fn test_initial_attempt_from_config() {
    let devices = Rc::new(MockMediaDevices::new());
    let mut camera = CameraPhoto::builder(Rc::new(MockVideoElement::new()))
        .navigator(&MockNavigator::standard(devices.clone()))
        .config(CameraPhotoConfig {
            initial_max_resolution_try: 0,
            ..test_config()
        })
        .build();

    camera.start_camera_max_resolution(None, None).await.unwrap();

    let advanced = devices.requests()[0]
        .video_track()
        .unwrap()
        .advanced
        .clone()
        .unwrap();
    assert_eq!(advanced.len(), MIN_WIDTH_LADDER.len());
}

#[tokio::test(start_paused = true)]
async fn test_max_resolution_waits_between_attempts() {
    let devices = Rc::new(MockMediaDevices::new());
    devices.push_failure(overconstrained());
    devices.push_failure(overconstrained());
    let mut camera = CameraPhoto::builder(Rc::new(MockVideoElement::new()))
        .navigator(&MockNavigator::standard(devices.clone()))
        .build();

    let started = tokio::time::Instant::now();
    camera.start_camera_max_resolution(None, None).await.unwrap();

    assert!(started.elapsed() >= camera.config().retry_delay() * 2);
    assert_eq!(devices.requests().len(), 3);
}

// ============================================================================
// LEGACY API TESTS
// ============================================================================

#[tokio::test]
async fn test_legacy_api_start_and_export() {
    let devices = Rc::new(MockMediaDevices::new());
    let element = Rc::new(MockVideoElement::new());
    let mut camera = CameraPhoto::builder(element.clone())
        .navigator(&MockNavigator::legacy(devices.clone()))
        .config(test_config())
        .build();

    assert!(camera.capture_api().unwrap().is_legacy());

    camera
        .start_camera(Some(FacingMode::User), None, None)
        .await
        .unwrap();

    // The legacy API reports no supported keys, so preferences are dropped
    let requests = devices.requests();
    assert_eq!(requests[0].to_json(), json!({ "audio": false, "video": {} }));
    // Enumeration is unavailable and is not an error
    assert!(camera.get_input_video_device_infos().is_empty());

    let uri = camera.get_data_uri(&UserConfig::default()).unwrap();
    let image = decode_png(&uri);
    assert_eq!(image.dimensions(), MOCK_RESOLUTION);
}

#[tokio::test]
async fn test_legacy_refusal_is_surfaced() {
    let devices = Rc::new(MockMediaDevices::new());
    devices.push_failure(CameraError::get_user_media("NotFoundError", "no camera"));
    let mut camera = CameraPhoto::builder(Rc::new(MockVideoElement::new()))
        .navigator(&MockNavigator::legacy(devices))
        .config(test_config())
        .build();

    let error = camera.start_camera(None, None, None).await.unwrap_err();
    assert_eq!(
        error,
        CameraError::get_user_media("NotFoundError", "no camera")
    );
}

// ============================================================================
// DISPLAY BINDING TESTS
// ============================================================================

#[tokio::test]
async fn test_object_url_fallback_binding() {
    let devices = Rc::new(MockMediaDevices::new());
    let registry = Rc::new(ObjectUrlRegistry::new("test"));
    let element = Rc::new(MockVideoElement::without_src_object(registry.clone()));
    let mut camera = CameraPhoto::builder(element.clone())
        .navigator(&MockNavigator::standard(devices.clone()))
        .object_urls(registry.clone())
        .config(test_config())
        .build();

    camera.start_camera(None, None, None).await.unwrap();

    let src = element.src();
    assert!(src.starts_with("blob:test/"));
    assert!(matches!(
        registry.resolve(&src),
        Some(ObjectUrlSource::Stream(_))
    ));
    assert!(element.src_object().is_none());
    assert_eq!(element.video_width(), MOCK_RESOLUTION.0);

    camera.stop_camera().unwrap();
    assert_eq!(element.src(), "");
    assert!(registry.resolve(&src).is_none());
    assert!(registry.is_empty());
}

// ============================================================================
// EXPORT TESTS
// ============================================================================

#[tokio::test]
async fn test_data_uri_full_and_half_size() {
    let mut fixture = standard_fixture();
    fixture.camera.start_camera(None, None, None).await.unwrap();

    let full = decode_png(&fixture.camera.get_data_uri(&UserConfig::default()).unwrap());
    assert_eq!(full.dimensions(), (640, 480));

    let half = decode_png(
        &fixture
            .camera
            .get_data_uri(&UserConfig::new().size_factor(0.5))
            .unwrap(),
    );
    assert_eq!(half.dimensions(), (320, 240));
}

#[tokio::test]
async fn test_data_uri_jpeg() {
    let mut fixture = standard_fixture();
    fixture.camera.start_camera(None, None, None).await.unwrap();

    let uri = fixture
        .camera
        .get_data_uri(
            &UserConfig::new()
                .image_type(ImageType::Jpg)
                .image_compression(0.5),
        )
        .unwrap();
    assert!(uri.starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn test_mirrored_capture_flips_pattern() {
    let mut fixture = standard_fixture();
    fixture.camera.start_camera(None, None, None).await.unwrap();

    let plain = decode_png(&fixture.camera.get_data_uri(&UserConfig::default()).unwrap());
    let mirrored = decode_png(
        &fixture
            .camera
            .get_data_uri(&UserConfig::new().mirror(true))
            .unwrap(),
    );

    // Red bar on the left becomes the right edge once mirrored
    assert_eq!(plain.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(mirrored.get_pixel(639, 0).0, [255, 0, 0, 255]);
    assert_eq!(mirrored.get_pixel(0, 0).0, [255, 255, 255, 255]);
}

#[tokio::test]
async fn test_huge_size_factor_does_not_abort() {
    let mut fixture = standard_fixture();
    fixture.camera.start_camera(None, None, None).await.unwrap();

    let config = UserConfig::new().size_factor(1e6);
    assert_eq!(fixture.camera.get_data_uri(&config).unwrap(), "data:,");
    let blob = fixture.camera.get_data_blob(&config).await.unwrap();
    assert!(blob.is_empty());

    // The session keeps working afterwards
    let uri = fixture.camera.get_data_uri(&UserConfig::default()).unwrap();
    assert_eq!(decode_png(&uri).dimensions(), MOCK_RESOLUTION);
}

#[tokio::test]
async fn test_idle_capture_is_empty() {
    let fixture = standard_fixture();

    assert_eq!(
        fixture.camera.get_data_uri(&UserConfig::default()).unwrap(),
        "data:,"
    );
    let blob = fixture
        .camera
        .get_data_blob(&UserConfig::default())
        .await
        .unwrap();
    assert!(blob.is_empty());
}

#[tokio::test]
async fn test_data_file_name_and_type() {
    let mut fixture = standard_fixture();
    fixture.camera.start_camera(None, None, None).await.unwrap();

    let file = fixture
        .camera
        .get_data_file(&UserConfig::new().image_type(ImageType::Jpg), "photo.jpg")
        .await
        .unwrap();

    assert_eq!(file.name(), "photo.jpg");
    assert_eq!(file.mime_type(), "image/jpeg");
    assert!(file.size() > 0);
}

#[tokio::test]
async fn test_session_default_export_applies() {
    let devices = Rc::new(MockMediaDevices::new());
    let mut camera = CameraPhoto::builder(Rc::new(MockVideoElement::new()))
        .navigator(&MockNavigator::standard(devices))
        .config(CameraPhotoConfig {
            default_export: UserConfig::new().image_type(ImageType::Jpg),
            ..test_config()
        })
        .build();
    camera.start_camera(None, None, None).await.unwrap();

    let blob = camera.get_data_blob(&UserConfig::default()).await.unwrap();
    assert_eq!(blob.mime_type(), "image/jpeg");

    // Per-call settings win over the session default
    let blob = camera
        .get_data_blob(&UserConfig::new().image_type(ImageType::Png))
        .await
        .unwrap();
    assert_eq!(blob.mime_type(), "image/png");
}

#[tokio::test]
async fn test_blob_and_file_urls() {
    let registry = Rc::new(ObjectUrlRegistry::default());
    let devices = Rc::new(MockMediaDevices::new());
    let mut camera = CameraPhoto::builder(Rc::new(MockVideoElement::new()))
        .navigator(&MockNavigator::standard(devices))
        .object_urls(registry.clone())
        .config(test_config())
        .build();
    camera.start_camera(None, None, None).await.unwrap();

    let blob = camera.get_data_blob(&UserConfig::default()).await.unwrap();
    let blob_url = camera.blob_to_url(&blob).unwrap();
    let file_url = camera
        .file_to_url(&File::from_blob(blob.clone(), "photo.png"))
        .unwrap();

    assert_ne!(blob_url, file_url);
    assert_eq!(registry.len(), 2);

    // Stopping the camera leaves caller-owned URLs alone
    camera.stop_camera().unwrap();
    assert_eq!(registry.len(), 2);

    camera.revoke_url(&blob_url);
    camera.revoke_url(&file_url);
    assert!(registry.is_empty());
}
