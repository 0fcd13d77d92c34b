use std::fmt;
use std::io;
use thiserror::Error;

/// Error types for the application.
///
/// Covers configuration problems that abort the whole run as well as the
/// per-video failures that the batch driver records and skips past.

/// Represents all possible errors that can occur in the application.
///
/// # Error Categories
///
/// - Config: missing argument, credential or output directory (fatal)
/// - Api: channel search or video info resolution failed
/// - NotFound: no audio-only format for a video
/// - Io: file system operations
/// - Stream: the audio byte stream could not be opened or broke off
#[derive(Error, Debug)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("Youtube error: {0}")]
    Youtube(#[from] yt_dlp::error::Error),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// The step of the per-video pipeline that failed.
///
/// Each variant renders as the leading phrase of an error-log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    VideoInfo,
    NoAudioFormat,
    OpenStream,
    CreateAudioFile,
    DownloadAudio,
    CreateMetadataFile,
    WriteMetadata,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureReason::VideoInfo => "Failed to get video info",
            FailureReason::NoAudioFormat => "No audio-only format found",
            FailureReason::OpenStream => "Failed to get audio stream",
            FailureReason::CreateAudioFile => "Failed to create file",
            FailureReason::DownloadAudio => "Failed to download audio",
            FailureReason::CreateMetadataFile => "Failed to create metadata file",
            FailureReason::WriteMetadata => "Failed to write metadata",
        };
        f.write_str(text)
    }
}

/// A single video that could not be processed, tagged with its URL.
///
/// `Display` produces the line appended to the error log:
/// `<reason> for <videoURL>: <errorDetail>`.
#[derive(Debug, Error)]
#[error("{reason} for {url}: {error}")]
pub struct ItemFailure {
    pub reason: FailureReason,
    pub url: String,
    #[source]
    pub error: AppError,
}

impl ItemFailure {
    pub fn new(reason: FailureReason, url: impl Into<String>, error: AppError) -> Self {
        Self {
            reason,
            url: url.into(),
            error,
        }
    }
}
