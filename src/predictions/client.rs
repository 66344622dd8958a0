//! HTTP client for a hosted predictions gateway.
//!
//! Marshals local inputs into request shapes (multipart for files and
//! audio, JSON for text) and surfaces non-2xx bodies verbatim as
//! [`ServiceError`] payloads.

use crate::audio::source::Sample;
use crate::audio::wav;
use crate::config::ServiceConfig;
use crate::defaults;
use crate::error::ServiceError;
use crate::predictions::service::{
    IdentifiedText, RecognitionService, SynthesizedSpeech, Transcript, Translation,
};
use async_trait::async_trait;
use log::debug;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

#[derive(Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    voice: &'a str,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    source_language: &'a str,
    target_language: &'a str,
}

/// Recognition service client over HTTP.
#[derive(Debug)]
pub struct HttpPredictionsClient {
    http: reqwest::Client,
    endpoint: String,
    sample_rate: u32,
}

impl HttpPredictionsClient {
    /// Build a client from service configuration.
    ///
    /// Fails if no endpoint is configured or the HTTP client cannot be
    /// constructed. The API key, when present, is attached to every
    /// request as a bearer token.
    pub fn new(config: &ServiceConfig, sample_rate: u32) -> Result<Self, ServiceError> {
        if config.endpoint.trim().is_empty() {
            return Err(ServiceError::transport(
                "service endpoint is not configured",
            ));
        }

        let headers = build_headers(&config.api_key)?;
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(defaults::CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ServiceError::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            sample_rate,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error response".to_string());
        Err(ServiceError::from_response(status.as_u16(), body))
    }
}

fn build_headers(api_key: &str) -> Result<HeaderMap, ServiceError> {
    let mut headers = HeaderMap::new();

    if !api_key.is_empty() {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|e| {
                ServiceError::transport(format!("Invalid authorization header value: {}", e))
            })?,
        );
    }

    Ok(headers)
}

#[async_trait]
impl RecognitionService for HttpPredictionsClient {
    async fn identify_text(
        &self,
        image: &Path,
        format: &str,
    ) -> Result<IdentifiedText, ServiceError> {
        let bytes = tokio::fs::read(image)
            .await
            .map_err(|e| ServiceError::transport(format!("Failed to read {}: {}", image.display(), e)))?;

        let file_name = image
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();

        debug!(
            "identify request: {} ({} bytes, format: {})",
            file_name,
            bytes.len(),
            format
        );

        let image_part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| ServiceError::transport(format!("Failed to create image part: {}", e)))?;

        let form = Form::new()
            .part("image", image_part)
            .text("format", format.to_string());

        let response = self
            .http
            .post(self.url("identify/text"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ServiceError::transport(format!("HTTP request failed: {}", e)))?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::transport(format!("Failed to parse identify response: {}", e)))
    }

    async fn transcribe(&self, audio: &[Sample]) -> Result<Transcript, ServiceError> {
        if audio.is_empty() {
            return Err(ServiceError::transport(
                "No audio was recorded. Try speaking longer or check your microphone.",
            ));
        }

        let wav_data = wav::encode_wav(audio, self.sample_rate)
            .map_err(|e| ServiceError::transport(e.to_string()))?;
        debug!(
            "transcription request: {} samples ({} bytes as WAV)",
            audio.len(),
            wav_data.len()
        );

        let audio_part = Part::bytes(wav_data)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| ServiceError::transport(format!("Failed to create audio part: {}", e)))?;

        let form = Form::new().part("file", audio_part);

        let response = self
            .http
            .post(self.url("convert/transcription"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ServiceError::transport(format!("HTTP request failed: {}", e)))?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| {
                ServiceError::transport(format!("Failed to parse transcription response: {}", e))
            })
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<SynthesizedSpeech, ServiceError> {
        debug!("synthesis request: {} chars, voice {}", text.len(), voice);

        let response = self
            .http
            .post(self.url("convert/speech"))
            .json(&SpeechRequest { text, voice })
            .send()
            .await
            .map_err(|e| ServiceError::transport(format!("HTTP request failed: {}", e)))?;

        let response = Self::check(response).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("audio/wav")
            .to_string();

        let audio = response
            .bytes()
            .await
            .map_err(|e| ServiceError::transport(format!("Failed to read audio response: {}", e)))?
            .to_vec();

        debug!("synthesis response: {} bytes ({})", audio.len(), content_type);
        Ok(SynthesizedSpeech {
            audio,
            content_type,
        })
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<Translation, ServiceError> {
        debug!(
            "translate request: {} chars, {} -> {}",
            text.len(),
            source_language,
            target_language
        );

        let response = self
            .http
            .post(self.url("convert/translate"))
            .json(&TranslateRequest {
                text,
                source_language,
                target_language,
            })
            .send()
            .await
            .map_err(|e| ServiceError::transport(format!("HTTP request failed: {}", e)))?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::transport(format!("Failed to parse translate response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(endpoint: &str) -> ServiceConfig {
        ServiceConfig {
            endpoint: endpoint.to_string(),
            api_key: "key".to_string(),
        }
    }

    #[test]
    fn new_rejects_missing_endpoint() {
        let config = ServiceConfig {
            endpoint: "  ".to_string(),
            api_key: String::new(),
        };
        let result = HttpPredictionsClient::new(&config, 16000);
        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("endpoint"));
    }

    #[test]
    fn url_joins_without_duplicate_slashes() {
        let client =
            HttpPredictionsClient::new(&test_config("https://api.example.com/"), 16000).unwrap();
        assert_eq!(
            client.url("convert/transcription"),
            "https://api.example.com/convert/transcription"
        );
        assert_eq!(
            client.url("/identify/text"),
            "https://api.example.com/identify/text"
        );
    }

    #[test]
    fn build_headers_sets_bearer_token() {
        let headers = build_headers("secret").unwrap();
        assert_eq!(
            headers.get(AUTHORIZATION).unwrap().to_str().unwrap(),
            "Bearer secret"
        );
    }

    #[test]
    fn build_headers_empty_key_has_no_auth() {
        let headers = build_headers("").unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn build_headers_rejects_control_characters() {
        assert!(build_headers("bad\nkey").is_err());
    }

    #[tokio::test]
    async fn transcribe_rejects_empty_buffer_without_network() {
        let client =
            HttpPredictionsClient::new(&test_config("https://api.example.com"), 16000).unwrap();
        let err = client.transcribe(&[]).await.unwrap_err();
        assert!(err.status.is_none());
        assert!(err.message.contains("No audio was recorded"));
    }

    #[test]
    fn request_bodies_serialize_as_expected() {
        let speech = serde_json::to_value(SpeechRequest {
            text: "hello",
            voice: "Amy",
        })
        .unwrap();
        assert_eq!(speech["text"], "hello");
        assert_eq!(speech["voice"], "Amy");

        let translate = serde_json::to_value(TranslateRequest {
            text: "hello",
            source_language: "en",
            target_language: "es",
        })
        .unwrap();
        assert_eq!(translate["source_language"], "en");
        assert_eq!(translate["target_language"], "es");
    }
}
