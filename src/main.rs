use channel_audio::error::Result;
use channel_audio::{ChannelResolver, Config, Downloader, YtDlpService};
use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Download the audio of a channel's videos, with a JSON sidecar per video.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Channel id to enumerate, e.g. UC_x5XG1OV2P6uZZ5FSM9Ttw
    channel_id: String,

    /// Directory for audio and metadata files
    #[arg(long, default_value = "downloads")]
    output_dir: PathBuf,

    /// File that receives one line per failed video
    #[arg(long, default_value = "errors.txt")]
    error_log: PathBuf,

    /// Directory holding the yt-dlp and ffmpeg binaries
    #[arg(long, default_value = "libs")]
    libraries_dir: PathBuf,
}

/// Main entry point for the application.
///
/// # Steps
/// 1. Parses the channel id (usage and exit code 1 if absent)
/// 2. Initializes logging with file, line numbers and thread IDs
/// 3. Builds the configuration from `.env` and the environment
/// 4. Runs the channel download
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .init();

    info!("Starting application...");

    if let Err(e) = run_application(cli).await {
        error!("Application error: {}", e);
        std::process::exit(1);
    }

    println!("Done!");
}

/// Resolves the channel and downloads every video found.
///
/// # Errors
/// Returns error if:
/// - The API key is missing
/// - The output directory cannot be created
/// - The channel search fails
/// - The search returns no videos
async fn run_application(cli: Cli) -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(channel_audio::AppError::Config(format!(
                "failed to load .env: {}",
                e
            )));
        }
    }

    let config = Config {
        output_dir: cli.output_dir,
        error_log: cli.error_log,
        libraries_dir: cli.libraries_dir,
        ..Config::from_env()?
    };

    tokio::fs::create_dir_all(&config.output_dir).await?;

    let urls = ChannelResolver::new(&config).resolve(&cli.channel_id).await?;

    let service = YtDlpService::new(&config).await?;
    let downloader = Downloader::new(service, config);
    let report = downloader.process_urls(&urls).await?;

    info!(
        "Channel {}: {} saved, {} failed",
        cli.channel_id,
        report.downloaded.len(),
        report.failures.len()
    );
    Ok(())
}
