//! Application entry points.
//!
//! Wires the capture session and the recognition service together for
//! each command: transcribe (record → convert), identify, speak,
//! translate.

use crate::audio::mic::{MicCaptureSource, suppress_audio_warnings};
use crate::audio::session::CaptureSession;
use crate::audio::source::Sample;
use crate::config::Config;
use crate::defaults;
use crate::error::{Result, VoxrelayError};
use crate::predictions::client::HttpPredictionsClient;
use crate::predictions::service::RecognitionService;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Record from the microphone, then send the finished buffer for
/// transcription and print the result.
///
/// Recording stops on Enter, or after `duration` when given. An empty
/// buffer skips the service call entirely.
pub async fn run_transcribe_command(
    config: &Config,
    device: Option<String>,
    duration: Option<Duration>,
    quiet: bool,
) -> Result<()> {
    // Suppress noisy JACK/ALSA warnings before audio init
    suppress_audio_warnings();

    // Build the client first so a misconfigured endpoint fails before
    // the microphone is ever opened.
    let client = HttpPredictionsClient::new(&config.service, config.audio.sample_rate)?;

    let device_name = device.or_else(|| config.audio.device.clone());
    let source = MicCaptureSource::new(device_name.as_deref(), config.audio.sample_rate);
    let mut session = CaptureSession::new(source);

    session.start()?;
    if !quiet {
        match duration {
            Some(d) => eprintln!(
                "Recording for up to {}... press Enter to stop early.",
                humantime::format_duration(d)
            ),
            None => eprintln!("Recording... press Enter to stop."),
        }
    }

    wait_for_stop(duration).await?;
    let samples = session.stop();

    if !quiet {
        eprintln!(
            "Captured {:.1}s of audio.",
            samples.len() as f64 / config.audio.sample_rate as f64
        );
    }

    match transcribe_snapshot(&client, &samples).await? {
        Some(text) => println!("{}", text),
        None => {
            if !quiet {
                eprintln!("No audio captured; nothing to transcribe.");
            }
        }
    }
    Ok(())
}

/// Send a finished buffer for transcription.
///
/// Returns `None` without touching the service when the buffer is
/// empty (an idle stop or an all-discarded recording).
pub async fn transcribe_snapshot<R: RecognitionService>(
    service: &R,
    samples: &[Sample],
) -> Result<Option<String>> {
    if samples.is_empty() {
        return Ok(None);
    }
    let transcript = service.transcribe(samples).await?;
    Ok(Some(transcript.full_text))
}

/// Identify text in an image file and print it.
pub async fn run_identify_command(
    config: &Config,
    image: &Path,
    format: Option<String>,
) -> Result<()> {
    if !image.is_file() {
        return Err(VoxrelayError::InvalidInput {
            message: format!("{} is not a readable file", image.display()),
        });
    }

    let client = HttpPredictionsClient::new(&config.service, config.audio.sample_rate)?;
    let format = format.unwrap_or_else(|| config.identify.format.clone());
    let identified = client.identify_text(image, &format).await?;
    println!("{}", identified.full_text);
    Ok(())
}

/// Synthesize speech for the given text and write the returned audio
/// bytes to `output`.
pub async fn run_speak_command(
    config: &Config,
    text: &str,
    voice: Option<String>,
    output: &Path,
    quiet: bool,
) -> Result<()> {
    let client = HttpPredictionsClient::new(&config.service, config.audio.sample_rate)?;
    let voice = voice.unwrap_or_else(|| config.convert.voice.clone());

    let speech = client.synthesize(text, &voice).await?;
    tokio::fs::write(output, &speech.audio).await?;

    if !quiet {
        eprintln!(
            "Wrote {} bytes ({}) to {}",
            speech.audio.len(),
            speech.content_type,
            output.display()
        );
    }
    Ok(())
}

/// Translate text and print the result.
pub async fn run_translate_command(
    config: &Config,
    text: &str,
    from: Option<String>,
    to: Option<String>,
    quiet: bool,
) -> Result<()> {
    let client = HttpPredictionsClient::new(&config.service, config.audio.sample_rate)?;
    let source = from.unwrap_or_else(|| config.convert.source_language.clone());
    let target = to.unwrap_or_else(|| config.convert.target_language.clone());

    let translation = client.translate(text, &source, &target).await?;
    if !quiet {
        eprintln!(
            "{} -> {}",
            translation.source_language, translation.target_language
        );
    }
    println!("{}", translation.translated_text);
    Ok(())
}

/// Default output path for synthesized speech.
pub fn default_speech_output() -> &'static Path {
    Path::new(defaults::SPEECH_OUTPUT)
}

/// Wait for Enter on stdin, or until `duration` elapses when given.
async fn wait_for_stop(duration: Option<Duration>) -> Result<()> {
    let mut line = String::new();
    let mut reader = BufReader::new(tokio::io::stdin());
    match duration {
        Some(limit) => {
            tokio::select! {
                _ = tokio::time::sleep(limit) => {}
                result = reader.read_line(&mut line) => {
                    result?;
                }
            }
        }
        None => {
            reader.read_line(&mut line).await?;
        }
    }
    Ok(())
}
