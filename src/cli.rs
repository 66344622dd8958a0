//! Command-line interface for voxrelay
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

/// Microphone capture and cloud recognition client
#[derive(Parser, Debug)]
#[command(
    name = "voxrelay",
    version,
    about = "Capture, transcribe, identify, speak, and translate via a hosted recognition service"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress status output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: request info, -vv: full diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse a duration string into a `Duration`.
///
/// Supports any format accepted by `humantime`: bare numbers (seconds),
/// single-unit (`30s`, `5m`), and compound (`1m30s`).
fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record from the microphone and transcribe the result
    Transcribe {
        /// Audio input device (e.g., pipewire)
        #[arg(long, value_name = "DEVICE")]
        device: Option<String>,

        /// Stop recording after this long (e.g., 30s, 2m). Default: until Enter
        #[arg(long, short = 'd', value_name = "DURATION", value_parser = parse_duration)]
        duration: Option<Duration>,
    },

    /// Identify text in an image file
    Identify {
        /// Image file to read
        image: PathBuf,

        /// Extraction format: plain, form, table, or all
        #[arg(long, value_name = "FORMAT")]
        format: Option<String>,
    },

    /// Synthesize speech from text and write it to a file
    Speak {
        /// Text to synthesize
        text: String,

        /// Voice to use (default from config)
        #[arg(long, value_name = "VOICE")]
        voice: Option<String>,

        /// Output file (default: speech.wav)
        #[arg(long, short, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Translate text between languages
    Translate {
        /// Text to translate
        text: String,

        /// Source language code (default from config)
        #[arg(long, value_name = "LANG")]
        from: Option<String>,

        /// Target language code (default from config)
        #[arg(long, value_name = "LANG")]
        to: Option<String>,
    },

    /// List available audio input devices
    Devices,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_number_as_seconds() {
        assert_eq!(parse_duration("30").unwrap(), Duration::from_secs(30));
    }

    #[test]
    fn parse_single_unit() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
    }

    #[test]
    fn parse_compound_duration() {
        assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn cli_parses_transcribe_with_duration() {
        let cli = Cli::try_parse_from(["voxrelay", "transcribe", "--duration", "10s"]).unwrap();
        match cli.command {
            Commands::Transcribe { duration, device } => {
                assert_eq!(duration, Some(Duration::from_secs(10)));
                assert_eq!(device, None);
            }
            other => panic!("Expected Transcribe, got {:?}", other),
        }
    }

    #[test]
    fn cli_parses_translate_with_languages() {
        let cli =
            Cli::try_parse_from(["voxrelay", "translate", "hello", "--from", "en", "--to", "fr"])
                .unwrap();
        match cli.command {
            Commands::Translate { text, from, to } => {
                assert_eq!(text, "hello");
                assert_eq!(from.as_deref(), Some("en"));
                assert_eq!(to.as_deref(), Some("fr"));
            }
            other => panic!("Expected Translate, got {:?}", other),
        }
    }

    #[test]
    fn cli_global_flags_apply_after_subcommand() {
        let cli = Cli::try_parse_from(["voxrelay", "devices", "-q", "-vv"]).unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn cli_requires_a_subcommand() {
        assert!(Cli::try_parse_from(["voxrelay"]).is_err());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
