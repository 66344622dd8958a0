use anyhow::Result;
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use std::path::Path;
use voxrelay::app::{
    default_speech_output, run_identify_command, run_speak_command, run_transcribe_command,
    run_translate_command,
};
use voxrelay::audio::mic::list_devices;
use voxrelay::cli::{Cli, Commands};
use voxrelay::config::Config;
use voxrelay::error::VoxrelayError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Transcribe { device, duration } => {
            let config = load_config(cli.config.as_deref())?;
            run_transcribe_command(&config, device, duration, cli.quiet).await
        }
        Commands::Identify { image, format } => {
            let config = load_config(cli.config.as_deref())?;
            run_identify_command(&config, &image, format).await
        }
        Commands::Speak {
            text,
            voice,
            output,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let output = output.unwrap_or_else(|| default_speech_output().to_path_buf());
            run_speak_command(&config, &text, voice, &output, cli.quiet).await
        }
        Commands::Translate { text, from, to } => {
            let config = load_config(cli.config.as_deref())?;
            run_translate_command(&config, &text, from, to, cli.quiet).await
        }
        Commands::Devices => {
            list_audio_devices()?;
            Ok(())
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        match e {
            // The demo surface shows service failures verbatim, the way
            // the service serialized them.
            VoxrelayError::Service(payload) => {
                eprintln!("{}", "Request failed:".red());
                eprintln!("{}", payload.to_display_json());
                std::process::exit(1);
            }
            other => return Err(other.into()),
        }
    }
    Ok(())
}

/// Initialize the log facade from the -v count (default: warnings).
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Load configuration, apply env overrides.
fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(p) => Config::load(p)?,
        None => Config::load_or_default(&Config::default_path())?,
    };
    Ok(config.with_env_overrides())
}

fn list_audio_devices() -> Result<()> {
    let devices = list_devices()?;
    if devices.is_empty() {
        eprintln!("No audio input devices found.");
        return Ok(());
    }

    println!("Available input devices:");
    for device in devices {
        if device.ends_with("[recommended]") {
            println!("  {}", device.green());
        } else {
            println!("  {}", device);
        }
    }
    Ok(())
}
