use crate::config::Config;
use crate::error::{AppError, FailureReason, ItemFailure, Result};
use crate::filename::OutputPaths;
use crate::format::select_audio_format;
use crate::metadata::write_metadata;
use crate::model::DownloadedFiles;
use crate::progress::{DownloadProgress, FailureLog};
use crate::service::{AudioStream, VideoService};
use futures::StreamExt;
use std::fmt;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, instrument, warn};

/// Where a single video is in its pipeline.
///
/// Any stage may end in a failure instead of advancing; see `FailureReason`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Pending,
    ResolvingInfo,
    SelectingFormat,
    Downloading,
    WritingMetadata,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FailureReason {
    pub fn stage(&self) -> Stage {
        match self {
            FailureReason::VideoInfo => Stage::ResolvingInfo,
            FailureReason::NoAudioFormat => Stage::SelectingFormat,
            FailureReason::OpenStream
            | FailureReason::CreateAudioFile
            | FailureReason::DownloadAudio => Stage::Downloading,
            FailureReason::CreateMetadataFile | FailureReason::WriteMetadata => {
                Stage::WritingMetadata
            }
        }
    }
}

/// Outcome of a whole batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub downloaded: Vec<DownloadedFiles>,
    pub failures: Vec<ItemFailure>,
}

impl BatchReport {
    pub fn attempted(&self) -> usize {
        self.downloaded.len() + self.failures.len()
    }
}

/// Copies every chunk of `stream` into `dest`, then flushes it.
///
/// On error the bytes already written stay in `dest`; a partially written
/// file is left on disk for the caller to deal with.
pub async fn download_stream<W>(mut stream: AudioStream, dest: &mut W) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        dest.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    dest.flush().await?;
    Ok(written)
}

/// Sequential batch driver that saves the audio and metadata of each video.
///
/// # Fields
/// * `service` - Resolves video info and opens audio streams
/// * `config` - Output locations
pub struct Downloader<S> {
    service: S,
    config: Config,
}

impl<S: VideoService> Downloader<S> {
    pub fn new(service: S, config: Config) -> Self {
        Self { service, config }
    }

    /// Processes a list of URLs one after another.
    ///
    /// # Returns
    /// * `Result<BatchReport>` - Files written and per-video failures
    ///
    /// # Errors
    /// Only structural problems fail the batch:
    /// * `Config` if `urls` is empty or the output directory is missing
    /// * `Io` if the error log cannot be created
    ///
    /// Every per-video failure is written to the error log and the loop
    /// moves on to the next URL.
    pub async fn process_urls(&self, urls: &[String]) -> Result<BatchReport> {
        if urls.is_empty() {
            return Err(AppError::Config("no video URLs provided".to_string()));
        }

        let output_dir = &self.config.output_dir;
        match tokio::fs::metadata(output_dir).await {
            Ok(meta) if meta.is_dir() => {}
            _ => {
                return Err(AppError::Config(format!(
                    "output directory {:?} does not exist",
                    output_dir
                )))
            }
        }

        let log = FailureLog::create(&self.config.error_log)?;
        let mut progress = DownloadProgress::with_log(urls.len(), log);
        let mut report = BatchReport::default();

        println!("Found {} videos to download", urls.len());

        for (index, url) in urls.iter().enumerate() {
            println!("Downloading {}", url);
            debug!(stage = %Stage::Pending, index = index + 1);
            let start = std::time::Instant::now();

            match self.download_video(url).await {
                Ok(files) => {
                    info!(
                        "Video {} saved to {:?} in {:.1}s",
                        index + 1,
                        files.audio,
                        start.elapsed().as_secs_f64()
                    );
                    progress.update(true);
                    report.downloaded.push(files);
                }
                Err(failure) => {
                    warn!(stage = %failure.reason.stage(), "{}", failure);
                    progress.record_failure(&failure);
                    report.failures.push(failure);
                }
            }
        }

        progress.print_summary();
        Ok(report)
    }

    /// Runs one video through every stage.
    ///
    /// The audio file is closed before the metadata file is opened, and
    /// metadata is only written once the audio copy has succeeded.
    #[instrument(skip(self))]
    async fn download_video(&self, url: &str) -> std::result::Result<DownloadedFiles, ItemFailure> {
        let fail = |reason: FailureReason| move |error: AppError| ItemFailure::new(reason, url, error);

        debug!(stage = %Stage::ResolvingInfo);
        let info = self
            .service
            .resolve_video_info(url)
            .await
            .map_err(fail(FailureReason::VideoInfo))?;

        debug!(stage = %Stage::SelectingFormat, formats = info.formats.len());
        let format = select_audio_format(&info.formats).map_err(fail(FailureReason::NoAudioFormat))?;

        debug!(stage = %Stage::Downloading, format = %format.id);
        let stream = self
            .service
            .open_audio_stream(&info, format)
            .await
            .map_err(fail(FailureReason::OpenStream))?;

        let paths = OutputPaths::new(&self.config.output_dir, &info, format);
        {
            let mut audio = File::create(&paths.audio)
                .await
                .map_err(AppError::from)
                .map_err(fail(FailureReason::CreateAudioFile))?;
            let bytes = download_stream(stream, &mut audio)
                .await
                .map_err(fail(FailureReason::DownloadAudio))?;
            debug!("Wrote {} bytes to {:?}", bytes, paths.audio);
        }

        debug!(stage = %Stage::WritingMetadata);
        {
            let mut metadata = File::create(&paths.metadata)
                .await
                .map_err(AppError::from)
                .map_err(fail(FailureReason::CreateMetadataFile))?;
            write_metadata(&info, &mut metadata)
                .await
                .map_err(fail(FailureReason::WriteMetadata))?;
        }

        debug!(stage = %Stage::Done);
        Ok(DownloadedFiles {
            audio: paths.audio,
            metadata: paths.metadata,
        })
    }

    pub fn service(&self) -> &S {
        &self.service
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::stream;

    fn chunks(parts: Vec<Result<&'static [u8]>>) -> AudioStream {
        stream::iter(parts.into_iter().map(|p| p.map(Bytes::from_static))).boxed()
    }

    #[tokio::test]
    async fn test_download_stream_copies_all_chunks() {
        let mut out = Vec::new();
        let written = download_stream(chunks(vec![Ok(&b"abc"[..]), Ok(&b""[..]), Ok(&b"defg"[..])]), &mut out)
            .await
            .unwrap();
        assert_eq!(written, 7);
        assert_eq!(out, b"abcdefg");
    }

    #[tokio::test]
    async fn test_download_stream_keeps_partial_bytes_on_error() {
        let mut out = Vec::new();
        let err = download_stream(
            chunks(vec![
                Ok(&b"abc"[..]),
                Err(AppError::Stream("reset".into())),
                Ok(&b"never"[..]),
            ]),
            &mut out,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Stream(_)));
        assert_eq!(out, b"abc");
    }

    #[test]
    fn test_failure_stages() {
        assert_eq!(FailureReason::VideoInfo.stage(), Stage::ResolvingInfo);
        assert_eq!(FailureReason::NoAudioFormat.stage(), Stage::SelectingFormat);
        assert_eq!(FailureReason::DownloadAudio.stage(), Stage::Downloading);
        assert_eq!(FailureReason::WriteMetadata.stage(), Stage::WritingMetadata);
    }

    #[test]
    fn test_report_attempted() {
        let report = BatchReport {
            downloaded: vec![DownloadedFiles {
                audio: "a.m4a".into(),
                metadata: "a.json".into(),
            }],
            failures: vec![ItemFailure::new(
                FailureReason::VideoInfo,
                "u",
                AppError::Api("gone".into()),
            )],
        };
        assert_eq!(report.attempted(), 2);
    }
}
