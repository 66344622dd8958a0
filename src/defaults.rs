//! Default configuration constants for voxrelay.
//!
//! Shared constants used across configuration types and request
//! construction, kept in one place so the library and CLI agree.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and keeps request
/// payloads small without hurting transcription quality.
pub const SAMPLE_RATE: u32 = 16000;

/// Channel count for captured audio. Voice input is always mono.
pub const CHANNELS: u16 = 1;

/// Default source language for conversion operations.
pub const SOURCE_LANGUAGE: &str = "en";

/// Default target language for translation.
pub const TARGET_LANGUAGE: &str = "es";

/// Default voice for speech synthesis.
pub const VOICE: &str = "Amy";

/// Default text identification format.
///
/// "plain" extracts running text; "form", "table", and "all" request
/// structured extraction where the service supports it.
pub const IDENTIFY_FORMAT: &str = "plain";

/// Default output path for synthesized speech.
pub const SPEECH_OUTPUT: &str = "speech.wav";

/// Connect timeout for service requests, in seconds.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Overall request timeout, in seconds.
///
/// Transcription of a long buffer can take a while on the service side;
/// 120s matches what hosted speech endpoints typically allow.
pub const REQUEST_TIMEOUT_SECS: u64 = 120;
