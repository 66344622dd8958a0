//! Microphone capture using CPAL (Cross-Platform Audio Library).

use crate::audio::source::{CaptureSource, ChunkHandler, Sample, StreamHandle};
use crate::audio::wav;
use crate::defaults;
use crate::error::CaptureError;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex, PoisonError};

/// Run a closure with stderr temporarily redirected to /dev/null.
///
/// Suppresses noisy ALSA/JACK/PipeWire messages that CPAL triggers when
/// probing audio backends. The messages are harmless but confusing.
///
/// # Safety
/// Uses `libc::dup`/`libc::dup2` to save and restore file descriptor 2
/// (stderr). Safe as long as no other thread is concurrently
/// manipulating fd 2.
fn with_suppressed_stderr<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    unsafe {
        let saved_fd = libc::dup(2);
        let devnull = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
        if saved_fd >= 0 && devnull >= 0 {
            libc::dup2(devnull, 2);
            libc::close(devnull);
        }

        let result = f();

        if saved_fd >= 0 {
            libc::dup2(saved_fd, 2);
            libc::close(saved_fd);
        }

        result
    }
}

/// Suppress noisy JACK/ALSA messages that occur during backend probing.
///
/// # Safety
/// Modifies environment variables, which is safe when called before
/// spawning threads.
pub fn suppress_audio_warnings() {
    // SAFETY: Called at startup before any threads are spawned
    unsafe {
        std::env::set_var("JACK_NO_START_SERVER", "1");
        std::env::set_var("ALSA_DEBUG", "0");
        std::env::set_var("PW_LOG", "0");
    }
}

/// Preferred device names for desktop PipeWire/PulseAudio environments.
const PREFERRED_DEVICES: &[&str] = &["pipewire", "pulse", "PulseAudio"];

/// Device name patterns to filter out (not useful for voice input).
const FILTERED_PATTERNS: &[&str] = &[
    "surround",
    "front:",
    "rear:",
    "center:",
    "side:",
    "Digital Output",
    "HDMI",
    "S/PDIF",
];

/// Check if a device name should be filtered out.
fn should_filter_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    FILTERED_PATTERNS
        .iter()
        .any(|pattern| lower.contains(&pattern.to_lowercase()))
}

/// Check if a device is a preferred device.
fn is_preferred_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    PREFERRED_DEVICES
        .iter()
        .any(|pref| lower.contains(&pref.to_lowercase()))
}

/// Map a backend failure onto the capture taxonomy.
///
/// Backends report a declined recording grant as a build/play error
/// with an access message; everything else means the device can't be
/// used for capture right now.
fn classify_stream_error(device: &str, message: &str) -> CaptureError {
    let lower = message.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("not authorized")
    {
        CaptureError::PermissionDenied {
            message: message.to_string(),
        }
    } else {
        log::warn!("capture stream error on '{}': {}", device, message);
        CaptureError::DeviceUnavailable {
            device: device.to_string(),
        }
    }
}

/// List available audio input devices, preferred ones marked.
///
/// Filters out obviously unusable endpoints (surround channels, HDMI).
///
/// # Errors
/// Returns `DeviceUnavailable` if device enumeration fails.
pub fn list_devices() -> Result<Vec<String>, CaptureError> {
    let devices = with_suppressed_stderr(|| {
        let host = cpal::default_host();
        host.input_devices()
    })
    .map_err(|e| classify_stream_error("default", &e.to_string()))?;

    let mut device_names = Vec::new();
    for device in devices {
        if let Ok(name) = device.name() {
            if should_filter_device(&name) {
                continue;
            }

            if is_preferred_device(&name) {
                device_names.push(format!("{} [recommended]", name));
            } else {
                device_names.push(name);
            }
        }
    }

    Ok(device_names)
}

/// Get the best default input device, preferring PipeWire/PulseAudio so
/// the desktop's device selection is respected.
fn get_best_default_device() -> Result<cpal::Device, CaptureError> {
    with_suppressed_stderr(|| {
        let host = cpal::default_host();

        if let Ok(devices) = host.input_devices() {
            for device in devices {
                if let Ok(name) = device.name()
                    && is_preferred_device(&name)
                {
                    return Ok(device);
                }
            }
        }

        host.default_input_device()
            .ok_or_else(|| CaptureError::DeviceUnavailable {
                device: "default".to_string(),
            })
    })
}

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: the stream is owned by a single `StreamHandle` release
/// closure and never accessed from two threads at once.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Microphone capture source.
///
/// Opens the configured (or best default) input device and delivers
/// i16 chunks to the session's handler from the backend callback
/// thread. Prefers the configured rate in mono i16, falls back to f32,
/// then to the device's native config with software conversion.
pub struct MicCaptureSource {
    device_name: Option<String>,
    sample_rate: u32,
}

impl MicCaptureSource {
    /// Create a microphone source.
    ///
    /// `device_name` of `None` selects the best default device at open
    /// time. No device access happens until `open`.
    pub fn new(device_name: Option<&str>, sample_rate: u32) -> Self {
        Self {
            device_name: device_name.map(str::to_string),
            sample_rate,
        }
    }

    fn find_device(&self) -> Result<cpal::Device, CaptureError> {
        with_suppressed_stderr(|| {
            if let Some(name) = self.device_name.as_deref() {
                let host = cpal::default_host();
                let devices =
                    host.input_devices()
                        .map_err(|e| classify_stream_error(name, &e.to_string()))?;

                for device in devices {
                    if let Ok(dev_name) = device.name()
                        && dev_name == name
                    {
                        return Ok(device);
                    }
                }

                Err(CaptureError::DeviceUnavailable {
                    device: name.to_string(),
                })
            } else {
                get_best_default_device()
            }
        })
    }

    /// Build the input stream, trying in order:
    /// 1. i16 at the configured rate, mono (zero-copy path)
    /// 2. f32 at the configured rate, mono (float-only devices)
    /// 3. Device native config, software channel mix + resample
    fn build_stream(
        &self,
        device: &cpal::Device,
        handler: Arc<Mutex<ChunkHandler>>,
    ) -> Result<cpal::Stream, CaptureError> {
        let preferred_config = cpal::StreamConfig {
            channels: defaults::CHANNELS,
            sample_rate: self.sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        let err_callback = |err| {
            log::error!("audio stream error: {}", err);
        };

        let sink = Arc::clone(&handler);
        if let Ok(stream) = device.build_input_stream(
            &preferred_config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let mut on_chunk = sink.lock().unwrap_or_else(PoisonError::into_inner);
                on_chunk(data);
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        let sink = Arc::clone(&handler);
        if let Ok(stream) = device.build_input_stream(
            &preferred_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let converted: Vec<Sample> = data
                    .iter()
                    .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as Sample)
                    .collect();
                let mut on_chunk = sink.lock().unwrap_or_else(PoisonError::into_inner);
                on_chunk(&converted);
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        self.build_stream_native(device, handler)
    }

    /// Build a stream at the device's native config, converting in
    /// software (channel mixdown + resampling) before delivery. Some
    /// PipeWire-ALSA setups accept non-native configs but never fire
    /// the data callback.
    fn build_stream_native(
        &self,
        device: &cpal::Device,
        handler: Arc<Mutex<ChunkHandler>>,
    ) -> Result<cpal::Stream, CaptureError> {
        use cpal::SampleFormat;

        let device_label = self.device_name.clone().unwrap_or_else(|| "default".to_string());

        let default_config = device
            .default_input_config()
            .map_err(|e| classify_stream_error(&device_label, &e.to_string()))?;

        let native_rate = default_config.sample_rate();
        let native_channels = default_config.channels() as usize;
        let target_rate = self.sample_rate;

        let stream_config: cpal::StreamConfig = default_config.clone().into();

        log::info!(
            "using native audio format ({}ch/{}Hz/{:?}), converting in software",
            native_channels,
            native_rate,
            default_config.sample_format(),
        );

        let err_callback = |err| {
            log::error!("audio stream error: {}", err);
        };

        match default_config.sample_format() {
            SampleFormat::I16 => device
                .build_input_stream(
                    &stream_config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        let converted =
                            convert_chunk(data, native_channels, native_rate, target_rate);
                        let mut on_chunk = handler.lock().unwrap_or_else(PoisonError::into_inner);
                        on_chunk(&converted);
                    },
                    err_callback,
                    None,
                )
                .map_err(|e| classify_stream_error(&device_label, &e.to_string())),
            SampleFormat::F32 => device
                .build_input_stream(
                    &stream_config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        let i16_data: Vec<Sample> = data
                            .iter()
                            .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as Sample)
                            .collect();
                        let converted =
                            convert_chunk(&i16_data, native_channels, native_rate, target_rate);
                        let mut on_chunk = handler.lock().unwrap_or_else(PoisonError::into_inner);
                        on_chunk(&converted);
                    },
                    err_callback,
                    None,
                )
                .map_err(|e| classify_stream_error(&device_label, &e.to_string())),
            fmt => Err(CaptureError::DeviceUnavailable {
                device: format!("{} (unsupported sample format {:?})", device_label, fmt),
            }),
        }
    }
}

/// Mix to mono and resample a native-format chunk to the target rate.
fn convert_chunk(
    samples: &[Sample],
    channels: usize,
    source_rate: u32,
    target_rate: u32,
) -> Vec<Sample> {
    let mono = wav::mix_to_mono(samples, channels);
    wav::resample(&mono, source_rate, target_rate)
}

impl CaptureSource for MicCaptureSource {
    fn open(&mut self, on_chunk: ChunkHandler) -> Result<StreamHandle, CaptureError> {
        let device = self.find_device()?;
        let device_label = self.device_name.clone().unwrap_or_else(|| "default".to_string());

        let handler = Arc::new(Mutex::new(on_chunk));
        let stream = self.build_stream(&device, handler)?;

        stream
            .play()
            .map_err(|e| classify_stream_error(&device_label, &e.to_string()))?;

        let sendable = SendableStream(stream);
        Ok(StreamHandle::new(move || {
            if let Err(e) = sendable.0.pause() {
                log::warn!("failed to pause audio stream on close: {}", e);
            }
            drop(sendable);
        }))
    }
}
