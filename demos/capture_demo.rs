//! Camera Capture Demo
//!
//! Walks a capture session through the in-memory runtime: device discovery,
//! maximum-resolution negotiation, still export and shutdown.

use anyhow::Context;
use camphoto::mock::{MockMediaDevices, MockNavigator, MockVideoElement};
use camphoto::{
    init_logging, CameraError, CameraPhoto, CameraPhotoConfig, FacingMode, ImageType,
    IdealResolution, UserConfig,
};
use std::rc::Rc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = CameraPhotoConfig::default();
    init_logging(&config).context("failed to initialize logging")?;

    println!("📷 camphoto Capture Demo");
    println!("========================");

    let devices = Rc::new(MockMediaDevices::new().with_resolution(1920, 1080));
    // Pretend the camera tops out below 2560 wide
    for _ in 0..2 {
        devices.push_failure(CameraError::GetUserMediaFailed {
            name: "OverconstrainedError".to_string(),
            message: "minimum width not satisfiable".to_string(),
            constraint: Some("width".to_string()),
        });
    }

    let element = Rc::new(MockVideoElement::new());
    let mut camera = CameraPhoto::builder(element)
        .navigator(&MockNavigator::standard(devices.clone()))
        .config(config)
        .build();

    // Demo 1: Maximum resolution
    println!("\n📐 Demo 1: Maximum Resolution Start");
    camera
        .start_camera_max_resolution(Some(FacingMode::Environment), None)
        .await?;
    println!(
        "✅ Started after {} request(s), ladder attempt {}",
        devices.requests().len(),
        camera.number_of_max_resolution_try()
    );
    if let Some(settings) = camera.get_camera_settings() {
        println!(
            "   Settings: {}x{} @ {} fps",
            settings.width.unwrap_or(0),
            settings.height.unwrap_or(0),
            settings.frame_rate.unwrap_or(0.0)
        );
    }

    // Demo 2: Devices
    println!("\n📋 Demo 2: Video Input Devices");
    for (index, device) in camera.get_input_video_device_infos().iter().enumerate() {
        println!("   {}. {} (ID: {})", index + 1, device.label, device.device_id);
    }

    // Demo 3: Still export
    println!("\n🖼️  Demo 3: Still Export");
    let configs = vec![
        ("Full size PNG", UserConfig::default()),
        (
            "Half size JPEG",
            UserConfig::new()
                .size_factor(0.5)
                .image_type(ImageType::Jpg)
                .image_compression(0.8),
        ),
        ("Mirrored PNG", UserConfig::new().mirror(true)),
    ];
    for (name, user_config) in configs {
        let uri = camera.get_data_uri(&user_config)?;
        println!("   {}: {} chars, {}", name, uri.len(), &uri[..uri.len().min(30)]);
    }

    let file = camera
        .get_data_file(&UserConfig::new().image_type(ImageType::Jpg), "demo.jpg")
        .await?;
    let url = camera.file_to_url(&file)?;
    println!("   File {} ({} bytes, {}) at {}", file.name(), file.size(), file.mime_type(), url);
    camera.revoke_url(&url);

    // Demo 4: Switch camera
    println!("\n🔄 Demo 4: Switch To Front Camera");
    camera
        .start_camera(
            Some(FacingMode::User),
            Some(IdealResolution::new(1280, 720)),
            None,
        )
        .await?;
    let stopped = devices.granted().iter().filter(|s| s.all_tracks_stopped()).count();
    println!("✅ Front camera running, {} previous stream(s) stopped", stopped);

    camera.stop_camera()?;
    match camera.stop_camera() {
        Err(e) => println!("⚠️  Second stop rejected: {}", e),
        Ok(()) => println!("❌ Second stop unexpectedly succeeded"),
    }

    println!("\n✨ Capture demo completed!");
    Ok(())
}
