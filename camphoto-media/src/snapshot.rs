//! Still-image capture from a display element

use crate::blob::Blob;
use crate::canvas::{image_size, Canvas, Transform};
use crate::display::VideoElement;
use crate::export::ExportConfig;
use camphoto_core::{CameraError, CameraResult};
use futures::channel::oneshot;
use tracing::debug;

/// Draw the element's current frame onto a fresh canvas
///
/// The canvas is `video_width × size_factor` wide with the height scaled to
/// keep the aspect ratio. With `mirror` set the frame is flipped horizontally.
pub fn create_canvas(
    element: &dyn VideoElement,
    size_factor: f64,
    mirror: bool,
) -> CameraResult<Canvas> {
    let (image_width, image_height) =
        image_size(element.video_width(), element.video_height(), size_factor);

    let mut canvas = Canvas::new(image_width, image_height);
    if mirror {
        canvas.set_transform(Transform::mirror_horizontal(canvas.width()));
    }

    let frame = element.current_frame();
    let (width, height) = (canvas.width(), canvas.height());
    canvas.draw_frame(&frame, 0, 0, width, height)?;

    debug!(
        "🖼️ Captured {}x{} frame into {}x{} canvas (mirror: {})",
        frame.width, frame.height, width, height, mirror
    );
    Ok(canvas)
}

/// Capture and encode as a data URI
pub fn data_uri(element: &dyn VideoElement, config: &ExportConfig) -> CameraResult<String> {
    let canvas = create_canvas(element, config.size_factor, config.is_image_mirror)?;
    canvas.to_data_url(config.image_type, config.image_compression)
}

/// Capture and encode as a blob
pub async fn data_blob(element: &dyn VideoElement, config: &ExportConfig) -> CameraResult<Blob> {
    let canvas = create_canvas(element, config.size_factor, config.is_image_mirror)?;

    let (tx, rx) = oneshot::channel();
    canvas.to_blob(
        move |result| {
            let _ = tx.send(result);
        },
        config.image_type,
        config.image_compression,
    );

    rx.await.unwrap_or_else(|_| {
        Err(CameraError::EncodingFailed {
            format: config.image_type.mime_type().to_string(),
            reason: "encoder finished without a result".to_string(),
        })
    })
}
