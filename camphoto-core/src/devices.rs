//! Device-capture capability traits
//!
//! A runtime exposes camera access in one of two flavors: the current
//! promise-style `MediaDevices` object, or an older vendor-prefixed
//! `getUserMedia` taking success and error callbacks. [`CaptureApi`] puts both
//! behind the [`MediaDevices`] call shape; the choice is made once, when the
//! API is resolved from a [`Navigator`].

use crate::constraints::{MediaStreamConstraints, SupportedConstraints};
use crate::error::{CameraError, CameraResult};
use crate::stream::{MediaDeviceInfo, StreamHandle};
use async_trait::async_trait;
use futures::channel::oneshot;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Standard device-capture API
#[async_trait(?Send)]
pub trait MediaDevices: fmt::Debug {
    /// Request a stream matching `constraints`
    async fn get_user_media(
        &self,
        constraints: &MediaStreamConstraints,
    ) -> CameraResult<StreamHandle>;

    /// List input and output devices
    async fn enumerate_devices(&self) -> CameraResult<Vec<MediaDeviceInfo>>;

    /// Constraint keys the runtime understands
    fn get_supported_constraints(&self) -> SupportedConstraints;
}

/// Invoked once with the granted stream
pub type SuccessCallback = Box<dyn FnOnce(StreamHandle)>;

/// Invoked once with the runtime's refusal
pub type ErrorCallback = Box<dyn FnOnce(CameraError)>;

/// Legacy callback-style stream request
pub trait LegacyGetUserMedia: fmt::Debug {
    /// Request a stream; exactly one of the callbacks is expected to fire
    ///
    /// An `Err` means the request was never issued (the runtime threw
    /// synchronously) and neither callback will run.
    fn get_user_media(
        &self,
        constraints: &MediaStreamConstraints,
        on_success: SuccessCallback,
        on_error: ErrorCallback,
    ) -> CameraResult<()>;
}

/// Environment entry point exposing whichever capture API exists
pub trait Navigator {
    /// Standard API, if present
    fn media_devices(&self) -> Option<Rc<dyn MediaDevices>>;

    /// Vendor-prefixed legacy function, if present
    fn legacy_get_user_media(&self) -> Option<Rc<dyn LegacyGetUserMedia>> {
        None
    }
}

/// Adapts a [`LegacyGetUserMedia`] to the [`MediaDevices`] shape
#[derive(Debug, Clone)]
pub struct LegacyAdapter {
    inner: Rc<dyn LegacyGetUserMedia>,
}

impl LegacyAdapter {
    /// Wrap a legacy capture function
    pub fn new(inner: Rc<dyn LegacyGetUserMedia>) -> Self {
        Self { inner }
    }
}

#[async_trait(?Send)]
impl MediaDevices for LegacyAdapter {
    async fn get_user_media(
        &self,
        constraints: &MediaStreamConstraints,
    ) -> CameraResult<StreamHandle> {
        let (tx, rx) = oneshot::channel::<CameraResult<StreamHandle>>();
        // Both callbacks share the sender so only the first one to fire resolves
        let tx = Rc::new(RefCell::new(Some(tx)));
        let tx_err = Rc::clone(&tx);

        self.inner
            .get_user_media(
                constraints,
                Box::new(move |stream| {
                    if let Some(tx) = tx.borrow_mut().take() {
                        let _ = tx.send(Ok(stream));
                    }
                }),
                Box::new(move |error| {
                    if let Some(tx) = tx_err.borrow_mut().take() {
                        let _ = tx.send(Err(error));
                    }
                }),
            )
            .inspect_err(|e| debug!("Legacy getUserMedia threw: {}", e))?;

        match rx.await {
            Ok(result) => result,
            Err(_) => {
                debug!("Legacy getUserMedia dropped both callbacks");
                Err(CameraError::get_user_media(
                    "AbortError",
                    "legacy getUserMedia completed without a result",
                ))
            }
        }
    }

    async fn enumerate_devices(&self) -> CameraResult<Vec<MediaDeviceInfo>> {
        Err(CameraError::UnsupportedEnvironment)
    }

    fn get_supported_constraints(&self) -> SupportedConstraints {
        SupportedConstraints::none()
    }
}

/// The resolved capture API, fixed for the lifetime of a session
#[derive(Debug, Clone)]
pub enum CaptureApi {
    /// Standard promise-style API
    Standard(Rc<dyn MediaDevices>),
    /// Legacy callback API behind an adapter
    Legacy(LegacyAdapter),
}

impl CaptureApi {
    /// True when the legacy adapter is in use
    pub fn is_legacy(&self) -> bool {
        matches!(self, CaptureApi::Legacy(_))
    }

    fn devices(&self) -> &dyn MediaDevices {
        match self {
            CaptureApi::Standard(devices) => devices.as_ref(),
            CaptureApi::Legacy(adapter) => adapter,
        }
    }
}

#[async_trait(?Send)]
impl MediaDevices for CaptureApi {
    async fn get_user_media(
        &self,
        constraints: &MediaStreamConstraints,
    ) -> CameraResult<StreamHandle> {
        self.devices().get_user_media(constraints).await
    }

    async fn enumerate_devices(&self) -> CameraResult<Vec<MediaDeviceInfo>> {
        self.devices().enumerate_devices().await
    }

    fn get_supported_constraints(&self) -> SupportedConstraints {
        self.devices().get_supported_constraints()
    }
}
