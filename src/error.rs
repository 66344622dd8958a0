//! Error types for voxrelay.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the capture session and its media source.
///
/// These are terminal for the attempt that produced them: the session
/// performs no automatic retry. `PermissionDenied` and
/// `DeviceUnavailable` come from acquiring the input stream;
/// `AlreadyRecording` is a usage error (the caller must `stop()` first).
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Microphone access denied: {message}")]
    PermissionDenied { message: String },

    #[error("Audio input device unavailable: {device}")]
    DeviceUnavailable { device: String },

    #[error("Capture session already recording")]
    AlreadyRecording,
}

/// Opaque failure payload from the recognition service.
///
/// The service's error body is carried verbatim and serialized as-is
/// for display; this crate never retries or interprets it. A production
/// consumer should map this into a structured contract of its own.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[error("Recognition service error{}: {message}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
pub struct ServiceError {
    /// HTTP status, when the failure came from a response.
    pub status: Option<u16>,
    /// Provider message or raw response body.
    pub message: String,
}

impl ServiceError {
    /// Failure that never reached the service (connect error, bad request
    /// construction). Carries no status.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// Non-2xx response: status plus the raw body.
    pub fn from_response(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: body.into(),
        }
    }

    /// Serialize the payload for verbatim display, mirroring how the
    /// demo surface shows failures to the user.
    pub fn to_display_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.message.clone())
    }
}

/// Top-level error for the composition layer (app/CLI).
#[derive(Error, Debug)]
pub enum VoxrelayError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Audio encoding failed: {message}")]
    AudioEncoding { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, VoxrelayError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn permission_denied_display() {
        let error = CaptureError::PermissionDenied {
            message: "user dismissed the prompt".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Microphone access denied: user dismissed the prompt"
        );
    }

    #[test]
    fn device_unavailable_display() {
        let error = CaptureError::DeviceUnavailable {
            device: "default".to_string(),
        };
        assert_eq!(error.to_string(), "Audio input device unavailable: default");
    }

    #[test]
    fn already_recording_display() {
        assert_eq!(
            CaptureError::AlreadyRecording.to_string(),
            "Capture session already recording"
        );
    }

    #[test]
    fn service_error_display_with_status() {
        let error = ServiceError::from_response(429, "rate exceeded");
        assert_eq!(
            error.to_string(),
            "Recognition service error (status 429): rate exceeded"
        );
    }

    #[test]
    fn service_error_display_without_status() {
        let error = ServiceError::transport("connection refused");
        assert_eq!(
            error.to_string(),
            "Recognition service error: connection refused"
        );
    }

    #[test]
    fn service_error_round_trips_through_json() {
        let error = ServiceError::from_response(500, "internal");
        let json = error.to_display_json();
        let back: ServiceError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, error);
    }

    #[test]
    fn service_error_display_json_contains_payload() {
        let error = ServiceError::from_response(403, "AccessDeniedException");
        let json = error.to_display_json();
        assert!(json.contains("403"));
        assert!(json.contains("AccessDeniedException"));
    }

    #[test]
    fn voxrelay_error_wraps_capture() {
        let error: VoxrelayError = CaptureError::AlreadyRecording.into();
        assert_eq!(error.to_string(), "Capture session already recording");
    }

    #[test]
    fn voxrelay_error_wraps_service() {
        let error: VoxrelayError = ServiceError::transport("timeout").into();
        assert!(error.to_string().contains("timeout"));
    }

    #[test]
    fn voxrelay_error_from_io() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: VoxrelayError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn errors_are_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<CaptureError>();
        assert_sync::<CaptureError>();
        assert_send::<ServiceError>();
        assert_sync::<ServiceError>();
        assert_send::<VoxrelayError>();
        assert_sync::<VoxrelayError>();
    }
}
