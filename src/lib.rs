/// A channel audio archiver.
///
/// This library lists the public videos of a channel through the search API,
/// then for each video saves an audio-only stream and a JSON sidecar with the
/// video's metadata. Videos are processed strictly one after another, and a
/// failure on one video is logged and skipped rather than ending the run.
///
/// # Architecture
///
/// The application is structured into several key components:
/// - `ChannelResolver`: turns a channel id into watch URLs
/// - `VideoService`: resolves video info and opens audio streams (`YtDlpService`)
/// - `select_audio_format`: first audio-only format wins
/// - `Downloader`: the batch driver, with per-item error isolation
/// - `DownloadProgress` / `FailureLog`: run accounting and the error log
///
/// # Example
/// ```no_run
/// use channel_audio::{ChannelResolver, Config, Downloader, YtDlpService};
///
/// async fn example() {
///     let config = Config::from_env().unwrap();
///     let urls = ChannelResolver::new(&config).resolve("UC123").await.unwrap();
///     let service = YtDlpService::new(&config).await.unwrap();
///     let downloader = Downloader::new(service, config);
///     let report = downloader.process_urls(&urls).await.unwrap();
///     println!("{} saved", report.downloaded.len());
/// }
/// ```
pub mod channel;
pub mod config;
pub mod downloader;
pub mod error;
pub mod filename;
pub mod format;
pub mod metadata;
pub mod model;
pub mod progress;
pub mod service;
pub mod ytdlp;

// Re-export commonly used items
pub use channel::ChannelResolver;
pub use config::Config;
pub use downloader::{BatchReport, Downloader, Stage};
pub use error::{AppError, FailureReason, ItemFailure};
pub use format::select_audio_format;
pub use model::{DownloadedFiles, Format, VideoInfo};
pub use progress::{DownloadProgress, FailureLog};
pub use service::{AudioStream, VideoService};
pub use ytdlp::YtDlpService;
