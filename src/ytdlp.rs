use crate::config::Config;
use crate::error::{AppError, Result};
use crate::model::{Format, VideoInfo};
use crate::service::{AudioStream, VideoService};
use async_trait::async_trait;
use futures::stream::{StreamExt, TryStreamExt};
use tracing::{debug, instrument};
use yt_dlp::fetcher::deps::Libraries;
use yt_dlp::model::Video;
use yt_dlp::Youtube;

/// `VideoService` backed by the yt-dlp binary.
///
/// Video info comes from `yt-dlp --dump-json`; audio bytes are streamed
/// straight from the format's direct media URL.
pub struct YtDlpService {
    fetcher: Youtube,
    http: reqwest::Client,
}

impl YtDlpService {
    /// Creates a new service, installing or updating the yt-dlp and ffmpeg
    /// binaries in `config.libraries_dir`.
    ///
    /// # Errors
    /// * If directory creation fails
    /// * If Youtube initialization fails
    #[instrument(skip(config))]
    pub async fn new(config: &Config) -> Result<Self> {
        tokio::fs::create_dir_all(&config.libraries_dir).await?;
        let fetcher = Self::initialize_youtube(config).await?;

        Ok(Self {
            fetcher,
            http: reqwest::Client::new(),
        })
    }

    /// Checks for existing yt-dlp and ffmpeg binaries. If not found,
    /// downloads new ones. Otherwise, uses existing binaries and updates the downloader.
    async fn initialize_youtube(config: &Config) -> Result<Youtube> {
        let yt_dlp = config.libraries_dir.join("yt-dlp");
        let ffmpeg = config.libraries_dir.join("ffmpeg");

        if !yt_dlp.exists() || !ffmpeg.exists() {
            debug!("Installing yt-dlp and ffmpeg into {:?}", config.libraries_dir);
            let youtube =
                Youtube::with_new_binaries(config.libraries_dir.clone(), config.output_dir.clone())
                    .await?;
            return Ok(youtube);
        }

        let libraries = Libraries::new(yt_dlp, ffmpeg);
        let youtube = Youtube::new(libraries, config.output_dir.clone())?;
        youtube.update_downloader().await?;

        Ok(youtube)
    }
}

#[async_trait(?Send)]
impl VideoService for YtDlpService {
    #[instrument(skip(self))]
    async fn resolve_video_info(&self, url: &str) -> Result<VideoInfo> {
        let video = self.fetcher.fetch_video_infos(url.to_string()).await?;
        video_info(&video)
    }

    #[instrument(skip(self, info, format), fields(video = %info.id, format = %format.id))]
    async fn open_audio_stream(&self, info: &VideoInfo, format: &Format) -> Result<AudioStream> {
        open_http_stream(&self.http, stream_url(format)?).await
    }
}

/// Converts the yt-dlp crate's `Video` into a `VideoInfo`, keeping the
/// serialized `Video` as the sidecar document.
pub fn video_info(video: &Video) -> Result<VideoInfo> {
    VideoInfo::from_upstream(serde_json::to_value(video)?)
}

/// The URL to GET for `format`'s bytes.
///
/// # Errors
/// `AppError::Stream` when the format is a manifest or storyboard, or has no URL.
pub fn stream_url(format: &Format) -> Result<&str> {
    if !format.is_direct() {
        return Err(AppError::Stream(format!(
            "format {} is served over {}, not a single file",
            format.id, format.protocol
        )));
    }
    format
        .url
        .as_deref()
        .ok_or_else(|| AppError::Stream(format!("format {} has no download URL", format.id)))
}

/// GETs `url` and exposes the response body as an `AudioStream`.
pub async fn open_http_stream(client: &reqwest::Client, url: &str) -> Result<AudioStream> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::Stream(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Stream(format!(
            "media request failed with status {}",
            status
        )));
    }

    Ok(response
        .bytes_stream()
        .map_err(|e| AppError::Stream(e.to_string()))
        .boxed())
}
