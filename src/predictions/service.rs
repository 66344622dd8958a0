use crate::audio::source::Sample;
use crate::error::ServiceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

/// Text identified in an image (OCR).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdentifiedText {
    pub full_text: String,
    #[serde(default)]
    pub lines: Vec<String>,
}

/// Transcription of an audio buffer (ASR).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transcript {
    pub full_text: String,
}

/// Synthesized speech audio (TTS). The bytes are opaque to this crate;
/// the service declares their format via `content_type`.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedSpeech {
    pub audio: Vec<u8>,
    pub content_type: String,
}

/// Translated text (MT).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Translation {
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
}

/// Trait for the external recognition service.
///
/// This trait allows swapping implementations (real HTTP client vs
/// mock). All operations are one-shot: callers hand over a complete
/// input and receive recognized content or the service's failure
/// payload verbatim. Nothing here retries.
#[async_trait]
pub trait RecognitionService: Send + Sync {
    /// Identify text in an image file.
    async fn identify_text(
        &self,
        image: &Path,
        format: &str,
    ) -> Result<IdentifiedText, ServiceError>;

    /// Transcribe a finished capture buffer.
    async fn transcribe(&self, audio: &[Sample]) -> Result<Transcript, ServiceError>;

    /// Synthesize speech from text.
    async fn synthesize(&self, text: &str, voice: &str) -> Result<SynthesizedSpeech, ServiceError>;

    /// Translate text between languages.
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<Translation, ServiceError>;
}

/// Mock recognition service for testing.
///
/// Returns scripted responses and records the audio buffers it was
/// handed, so tests can assert pass-through without a live endpoint.
#[derive(Clone)]
pub struct MockRecognitionService {
    transcript: String,
    identified: String,
    translated: String,
    speech: Vec<u8>,
    failure: Option<ServiceError>,
    transcribed: Arc<Mutex<Vec<Vec<Sample>>>>,
}

impl MockRecognitionService {
    /// Create a mock that succeeds with default responses.
    pub fn new() -> Self {
        Self {
            transcript: "mock transcript".to_string(),
            identified: "mock identified text".to_string(),
            translated: "mock translation".to_string(),
            speech: vec![0u8; 4],
            failure: None,
            transcribed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Configure the transcript returned by `transcribe`.
    pub fn with_transcript(mut self, text: &str) -> Self {
        self.transcript = text.to_string();
        self
    }

    /// Configure the text returned by `identify_text`.
    pub fn with_identified_text(mut self, text: &str) -> Self {
        self.identified = text.to_string();
        self
    }

    /// Configure the text returned by `translate`.
    pub fn with_translation(mut self, text: &str) -> Self {
        self.translated = text.to_string();
        self
    }

    /// Configure the audio bytes returned by `synthesize`.
    pub fn with_speech(mut self, audio: Vec<u8>) -> Self {
        self.speech = audio;
        self
    }

    /// Configure every operation to fail with the given payload.
    pub fn with_failure(mut self, failure: ServiceError) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Audio buffers handed to `transcribe`, in call order.
    pub fn transcribed_buffers(&self) -> Vec<Vec<Sample>> {
        self.transcribed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check_failure(&self) -> Result<(), ServiceError> {
        match &self.failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }
}

impl Default for MockRecognitionService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecognitionService for MockRecognitionService {
    async fn identify_text(
        &self,
        _image: &Path,
        _format: &str,
    ) -> Result<IdentifiedText, ServiceError> {
        self.check_failure()?;
        Ok(IdentifiedText {
            full_text: self.identified.clone(),
            lines: vec![self.identified.clone()],
        })
    }

    async fn transcribe(&self, audio: &[Sample]) -> Result<Transcript, ServiceError> {
        self.check_failure()?;
        self.transcribed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(audio.to_vec());
        Ok(Transcript {
            full_text: self.transcript.clone(),
        })
    }

    async fn synthesize(
        &self,
        _text: &str,
        _voice: &str,
    ) -> Result<SynthesizedSpeech, ServiceError> {
        self.check_failure()?;
        Ok(SynthesizedSpeech {
            audio: self.speech.clone(),
            content_type: "audio/wav".to_string(),
        })
    }

    async fn translate(
        &self,
        _text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<Translation, ServiceError> {
        self.check_failure()?;
        Ok(Translation {
            translated_text: self.translated.clone(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        })
    }
}
