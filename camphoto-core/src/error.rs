//! Error types for camera capture and still-image export
//!
//! Every fallible operation in the workspace returns [`CameraResult`]. Errors
//! are scoped to the call that produced them; none of them is fatal to the
//! process.

use thiserror::Error;

/// Main error type for camera capture operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    /// No capture API is available in the running environment
    #[error("Camera capture is not supported in this environment")]
    UnsupportedEnvironment,

    /// The runtime refused or failed a stream request
    #[error("getUserMedia failed: {name}: {message}")]
    GetUserMediaFailed {
        /// Runtime error name (e.g. `NotAllowedError`, `OverconstrainedError`)
        name: String,
        /// Runtime error message
        message: String,
        /// Constraint that could not be satisfied, if the runtime reported one
        constraint: Option<String>,
    },

    /// Device enumeration failed
    #[error("Device enumeration failed: {reason}")]
    EnumerateDevicesFailed {
        /// Failure reason
        reason: String,
    },

    /// Stop requested while no stream is bound
    #[error("no stream to stop!")]
    NoActiveStream,

    /// Export configuration rejected by validation
    #[error("Invalid export configuration: {message}")]
    InvalidExportConfig {
        /// Error message
        message: String,
    },

    /// Image encoder failed
    #[error("Encoding failed: {format} - {reason}")]
    EncodingFailed {
        /// Target media type
        format: String,
        /// Failure reason
        reason: String,
    },

    /// Display element could not be bound to a stream
    #[error("Display binding failed: {reason}")]
    DisplayBindingFailed {
        /// Failure reason
        reason: String,
    },
}

/// Result type alias for camera operations
pub type CameraResult<T> = Result<T, CameraError>;

impl CameraError {
    /// Build a stream-request failure without constraint detail
    pub fn get_user_media(name: impl Into<String>, message: impl Into<String>) -> Self {
        CameraError::GetUserMediaFailed {
            name: name.into(),
            message: message.into(),
            constraint: None,
        }
    }

    /// Get error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CameraError::UnsupportedEnvironment => "UNSUPPORTED_ENVIRONMENT",
            CameraError::GetUserMediaFailed { .. } => "GET_USER_MEDIA_FAILED",
            CameraError::EnumerateDevicesFailed { .. } => "ENUMERATE_DEVICES_FAILED",
            CameraError::NoActiveStream => "NO_ACTIVE_STREAM",
            CameraError::InvalidExportConfig { .. } => "INVALID_EXPORT_CONFIG",
            CameraError::EncodingFailed { .. } => "ENCODING_FAILED",
            CameraError::DisplayBindingFailed { .. } => "DISPLAY_BINDING_FAILED",
        }
    }

    /// Check if retrying the same call might succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            CameraError::GetUserMediaFailed { name, .. } => {
                // Permission and security refusals do not change on retry
                !matches!(name.as_str(), "NotAllowedError" | "SecurityError")
            }
            CameraError::EnumerateDevicesFailed { .. } => true,
            CameraError::InvalidExportConfig { .. } => true,
            CameraError::UnsupportedEnvironment => false,
            CameraError::NoActiveStream => false,
            CameraError::EncodingFailed { .. } => false,
            CameraError::DisplayBindingFailed { .. } => false,
        }
    }

    /// Get error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            CameraError::UnsupportedEnvironment => ErrorCategory::Environment,
            CameraError::GetUserMediaFailed { .. } => ErrorCategory::Acquisition,
            CameraError::EnumerateDevicesFailed { .. } => ErrorCategory::Device,
            CameraError::NoActiveStream => ErrorCategory::State,
            CameraError::InvalidExportConfig { .. } => ErrorCategory::Configuration,
            CameraError::EncodingFailed { .. } => ErrorCategory::Encoding,
            CameraError::DisplayBindingFailed { .. } => ErrorCategory::Display,
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Capture API missing from the environment
    Environment,
    /// Stream acquisition (permission, device, constraints)
    Acquisition,
    /// Device enumeration
    Device,
    /// Session state misuse
    State,
    /// Caller-supplied configuration
    Configuration,
    /// Image encoding
    Encoding,
    /// Display element binding
    Display,
}
