use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure.
///
/// Loaded once at process start, before any capture or recognition
/// call, and passed by reference from there on. The capture session
/// never holds configuration state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub convert: ConvertConfig,
    pub identify: IdentifyConfig,
}

/// Recognition service endpoint and credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    pub endpoint: String,
    pub api_key: String,
}

/// Audio capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
}

/// Conversion (transcription/synthesis/translation) configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConvertConfig {
    pub source_language: String,
    pub target_language: String,
    pub voice: String,
}

/// Text identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IdentifyConfig {
    /// One of "plain", "form", "table", "all".
    pub format: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            source_language: defaults::SOURCE_LANGUAGE.to_string(),
            target_language: defaults::TARGET_LANGUAGE.to_string(),
            voice: defaults::VOICE.to_string(),
        }
    }
}

impl Default for IdentifyConfig {
    fn default() -> Self {
        Self {
            format: defaults::IDENTIFY_FORMAT.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file
    /// doesn't exist.
    ///
    /// Only a missing file yields defaults; invalid TOML is an error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Supported environment variables:
    /// - VOXRELAY_ENDPOINT → service.endpoint
    /// - VOXRELAY_API_KEY → service.api_key
    /// - VOXRELAY_AUDIO_DEVICE → audio.device
    /// - VOXRELAY_TARGET_LANGUAGE → convert.target_language
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(endpoint) = std::env::var("VOXRELAY_ENDPOINT")
            && !endpoint.is_empty()
        {
            self.service.endpoint = endpoint;
        }

        if let Ok(api_key) = std::env::var("VOXRELAY_API_KEY")
            && !api_key.is_empty()
        {
            self.service.api_key = api_key;
        }

        if let Ok(device) = std::env::var("VOXRELAY_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        if let Ok(lang) = std::env::var("VOXRELAY_TARGET_LANGUAGE")
            && !lang.is_empty()
        {
            self.convert.target_language = lang;
        }

        self
    }

    /// Get the default configuration file path.
    ///
    /// Returns ~/.config/voxrelay/config.toml on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voxrelay")
            .join("config.toml")
    }
}
