//! Display element a stream is bound to

use crate::frame::VideoFrame;
use camphoto_core::StreamHandle;
use std::fmt;

/// Element that renders a stream and can be sampled for stills
///
/// Implementations are shared handles, so every method takes `&self`.
pub trait VideoElement: fmt::Debug {
    /// True when [`VideoElement::set_src_object`] is available
    fn supports_src_object(&self) -> bool;

    /// Bind or unbind a stream object
    fn set_src_object(&self, stream: Option<StreamHandle>);

    /// Set the source URL; the empty string clears it
    fn set_src(&self, src: &str);

    /// Intrinsic width of the current video, 0 when nothing plays
    fn video_width(&self) -> u32;

    /// Intrinsic height of the current video, 0 when nothing plays
    fn video_height(&self) -> u32;

    /// Frame currently shown, at intrinsic size
    fn current_frame(&self) -> VideoFrame;
}
