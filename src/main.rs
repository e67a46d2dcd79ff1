use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use audio_dojo::api::ApiServerBuilder;
use audio_dojo::config::VoiceConfig;
use audio_dojo::voice::{self, models};
use audio_dojo::{AudioClip, Config, DeepgramClient, RoundTrip};

/// Audio Dojo - record, transcribe, echo, speak
#[derive(Parser)]
#[command(name = "dojo", version, about)]
struct Cli {
    /// Port to listen on (overrides config)
    #[arg(long, env = "DOJO_PORT")]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the recording page and voice API (default)
    Serve,
    /// Transcribe an audio file
    Transcribe {
        /// Audio file (wav, webm, ogg, mp3, ...)
        file: PathBuf,
    },
    /// Synthesize text to an MP3 file
    Speak {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
        /// Output file
        #[arg(short, long, default_value = "speech.mp3")]
        output: PathBuf,
    },
    /// Run the full round trip on an audio file
    RoundTrip {
        /// Audio file (wav, webm, ogg, mp3, ...)
        file: PathBuf,
        /// Instruction text (defaults to the configured system prompt)
        #[arg(short, long)]
        instruction: Option<String>,
        /// Output file for the synthesized reply
        #[arg(short, long, default_value = "reply.mp3")]
        output: PathBuf,
    },
    /// List available STT models and TTS voices
    Models,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,audio_dojo=info",
        1 => "info,audio_dojo=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(port) = cli.port {
        config.api_server.port = port;
    }
    tracing::debug!(?config, "loaded configuration");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Transcribe { file } => transcribe(&config, &file).await,
        Command::Speak { text, output } => speak(&config, &text, &output).await,
        Command::RoundTrip {
            file,
            instruction,
            output,
        } => round_trip(&config, &file, instruction, &output).await,
        Command::Models => {
            list_models(&config.voice);
            Ok(())
        }
    }
}

/// Build the process-wide orchestrator around one client handle
fn build_round_trip(config: &Config) -> audio_dojo::Result<RoundTrip> {
    let client = Arc::new(DeepgramClient::from_config(config)?);
    Ok(RoundTrip::deepgram(client, &config.voice))
}

/// Serve the page and voice API until interrupted
async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        port = config.api_server.port,
        stt_model = %config.voice.stt_model,
        tts_model = %config.voice.tts_model,
        "starting audio dojo"
    );

    let mut builder = ApiServerBuilder::new(config.api_server.port)
        .system_prompt(config.system_prompt.clone())
        .static_dir(config.api_server.static_dir.clone());

    builder = match build_round_trip(&config) {
        Ok(round_trip) => builder.round_trip(Arc::new(round_trip)),
        Err(e) => {
            tracing::error!(error = %e, "voice client unavailable");
            builder.configuration_error(e.to_string())
        }
    };

    let server = builder.build().spawn();

    tokio::select! {
        result = server => result??,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }

    Ok(())
}

fn read_clip(file: &Path) -> anyhow::Result<AudioClip> {
    let data = std::fs::read(file)?;
    if data.is_empty() {
        anyhow::bail!("audio file is empty: {}", file.display());
    }

    let content_type = file
        .extension()
        .and_then(|e| e.to_str())
        .map_or("audio/wav", voice::mime_from_extension);

    Ok(AudioClip::new(data, content_type))
}

/// Transcribe a file and print the transcript
async fn transcribe(config: &Config, file: &Path) -> anyhow::Result<()> {
    let round_trip = build_round_trip(config)?;
    let clip = read_clip(file)?;

    let transcript = round_trip
        .transcribe(clip, &round_trip.options().transcribe)
        .await?;
    println!("{transcript}");

    Ok(())
}

/// Synthesize text into a file
async fn speak(config: &Config, text: &str, output: &Path) -> anyhow::Result<()> {
    let round_trip = build_round_trip(config)?;

    println!("Synthesizing speech...");
    let audio = round_trip
        .speak(text, &round_trip.options().voice_model)
        .await?;
    std::fs::write(output, &audio)?;
    println!("Wrote {} bytes to {}", audio.len(), output.display());

    Ok(())
}

/// Full round trip on a file
async fn round_trip(
    config: &Config,
    file: &Path,
    instruction: Option<String>,
    output: &Path,
) -> anyhow::Result<()> {
    let round_trip = build_round_trip(config)?;
    let clip = read_clip(file)?;
    let instruction = instruction.unwrap_or_else(|| config.system_prompt.clone());

    match round_trip.handle_utterance(clip, &instruction).await {
        Ok(utterance) => {
            println!("You said:  {}", utterance.transcript);
            println!("Assistant: {}", utterance.response_text);
            std::fs::write(output, &utterance.audio)?;
            println!("Wrote {} bytes to {}", utterance.audio.len(), output.display());
            Ok(())
        }
        Err(e) => {
            if let Some(transcript) = e.transcript() {
                println!("You said:  {transcript}");
            }
            if let Some(response_text) = e.response_text() {
                println!("Assistant: {response_text}");
            }
            Err(e.into())
        }
    }
}

/// Print the model catalog, marking the configured models
fn list_models(configured: &VoiceConfig) {
    println!("STT models:");
    for m in models::STT_MODELS {
        println!("{}", models::catalog_line(m, &configured.stt_model));
    }

    println!("\nTTS voices:");
    for m in models::TTS_MODELS {
        println!("{}", models::catalog_line(m, &configured.tts_model));
    }
}
