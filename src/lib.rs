//! voxrelay - Microphone capture and cloud recognition client
//!
//! Bridges local inputs (microphone audio, image files, text) to a
//! hosted recognition service: transcription, text identification,
//! speech synthesis, and translation.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod config;
pub mod defaults;
pub mod error;
pub mod predictions;

#[cfg(feature = "cli")]
pub mod cli;

// Composition root - needs the microphone backend and the CLI surface
#[cfg(all(feature = "mic", feature = "cli"))]
pub mod app;

// Core seams (capture source → session → recognition service)
pub use audio::session::{CaptureSession, SessionState};
pub use audio::source::{CaptureSource, ChunkHandler, MockCaptureSource, Sample, StreamHandle};
pub use predictions::client::HttpPredictionsClient;
pub use predictions::service::{
    IdentifiedText, MockRecognitionService, RecognitionService, SynthesizedSpeech, Transcript,
    Translation,
};

// Error handling
pub use error::{CaptureError, Result, ServiceError, VoxrelayError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.2+abc1234"` when git hash is available, `"0.1.2"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }

    #[test]
    fn version_string_contains_plus_when_git_hash_present() {
        let ver = version_string();
        if option_env!("GIT_HASH").is_some_and(|h| !h.is_empty()) {
            assert!(
                ver.contains('+'),
                "With GIT_HASH set, version should contain '+', got: {}",
                ver
            );
        } else {
            assert_eq!(ver, env!("CARGO_PKG_VERSION"));
        }
    }
}
