//! Capability facade: environment detection and constraint construction
//!
//! Everything here is stateless. The only runtime query is
//! [`MediaDevices::get_supported_constraints`], made when a request carries
//! preferences worth filtering.

use crate::constraints::{
    advanced_ladder, ExactConstraint, FacingMode, IdealResolution, MediaStreamConstraints,
    VideoTrackConstraints, MIN_WIDTH_LADDER,
};
use crate::devices::{CaptureApi, LegacyAdapter, MediaDevices, Navigator};
use tracing::debug;

/// Pick the capture API the environment offers
///
/// Returns `None` when capture is unsupported; callers surface that only when
/// a stream is actually requested.
pub fn resolve_capture_api(navigator: &dyn Navigator) -> Option<CaptureApi> {
    if let Some(devices) = navigator.media_devices() {
        debug!("📷 Using standard MediaDevices capture API");
        return Some(CaptureApi::Standard(devices));
    }

    if let Some(legacy) = navigator.legacy_get_user_media() {
        debug!("📷 Using legacy getUserMedia capture API");
        return Some(CaptureApi::Legacy(LegacyAdapter::new(legacy)));
    }

    debug!("📷 No capture API available");
    None
}

/// True when no preference is meaningfully set
pub fn is_minimum_request(
    facing_mode: Option<FacingMode>,
    resolution: Option<&IdealResolution>,
    exact_device_id: Option<&str>,
) -> bool {
    let has_device = exact_device_id.is_some_and(|id| !id.is_empty());
    let has_resolution = resolution.is_some_and(|res| !res.is_empty());
    facing_mode.is_none() && !has_device && !has_resolution
}

/// Build the descriptor for a plain stream request
///
/// Without preferences this is always [`MediaStreamConstraints::minimum`].
/// Otherwise each requested key is included only if the runtime reports it as
/// supported; anything else is dropped without error.
pub fn build_constraints(
    devices: &dyn MediaDevices,
    facing_mode: Option<FacingMode>,
    resolution: Option<&IdealResolution>,
    exact_device_id: Option<&str>,
) -> MediaStreamConstraints {
    if is_minimum_request(facing_mode, resolution, exact_device_id) {
        return MediaStreamConstraints::minimum();
    }

    let supports = devices.get_supported_constraints();
    let mut video = VideoTrackConstraints::default();

    if supports.facing_mode {
        video.facing_mode = facing_mode;
    }

    if let Some(resolution) = resolution {
        if supports.width {
            video.width = resolution.width;
        }
        if supports.height {
            video.height = resolution.height;
        }
    }

    if supports.device_id {
        video.device_id = exact_device_id
            .filter(|id| !id.is_empty())
            .map(|id| ExactConstraint {
                exact: id.to_string(),
            });
    }

    MediaStreamConstraints::video(video)
}

/// Build the descriptor for one step of the max-resolution ladder
///
/// Attempt `k` keeps the first `9 - k` ladder entries, so the largest minimum
/// widths are abandoned first. Returns `None` once `attempt` reaches the ladder
/// length: the caller should fall back to a request without resolution.
pub fn build_max_resolution_constraints(
    devices: &dyn MediaDevices,
    facing_mode: Option<FacingMode>,
    exact_device_id: Option<&str>,
    attempt: usize,
) -> Option<MediaStreamConstraints> {
    if attempt >= MIN_WIDTH_LADDER.len() {
        return None;
    }

    let mut video = build_constraints(devices, facing_mode, None, exact_device_id).into_video_track();

    let mut ladder = advanced_ladder(video.facing_mode);
    ladder.truncate(MIN_WIDTH_LADDER.len() - attempt);
    video.advanced = Some(ladder);

    Some(MediaStreamConstraints::video(video))
}
