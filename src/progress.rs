use crate::error::ItemFailure;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::warn;

/// Progress tracking and failure reporting for a batch run.

/// Append-only error log shared by every item of a run.
///
/// The file is truncated when created. Each failure is written as one line
/// and flushed immediately, so the log is complete even if the process dies.
pub struct FailureLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FailureLog {
    pub fn create(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn append(&mut self, failure: &ItemFailure) -> std::io::Result<()> {
        writeln!(self.writer, "{}", failure)?;
        self.writer.flush()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Tracks and reports progress for a batch of videos.
///
/// # Examples
///
/// ```
/// use channel_audio::DownloadProgress;
///
/// let mut progress = DownloadProgress::new(2);
/// progress.update(true);
/// progress.update(false);
/// assert_eq!(progress.succeeded(), 1);
/// ```
pub struct DownloadProgress {
    pub total_videos: usize,
    pub completed: usize,
    pub start_time: Instant,
    pub errors: usize,
    log: Option<FailureLog>,
}

impl DownloadProgress {
    pub fn new(total_videos: usize) -> Self {
        Self {
            total_videos,
            completed: 0,
            start_time: Instant::now(),
            errors: 0,
            log: None,
        }
    }

    pub fn with_log(total_videos: usize, log: FailureLog) -> Self {
        Self {
            log: Some(log),
            ..Self::new(total_videos)
        }
    }

    pub fn update(&mut self, success: bool) {
        self.completed += 1;
        if !success {
            self.errors += 1;
        }
    }

    /// Counts the failure and appends it to the error log.
    ///
    /// A log write error is reported but never stops the batch.
    pub fn record_failure(&mut self, failure: &ItemFailure) {
        self.update(false);
        if let Some(log) = self.log.as_mut() {
            if let Err(e) = log.append(failure) {
                warn!("Could not write to error log {:?}: {}", log.path(), e);
            }
        }
    }

    pub fn succeeded(&self) -> usize {
        self.completed - self.errors
    }

    pub fn print_summary(&self) {
        println!("\nDownload Summary:");
        println!("Total time: {:.1}s", self.start_time.elapsed().as_secs_f64());
        println!("Processed: {}/{}", self.completed, self.total_videos);
        println!("Successfully downloaded: {}", self.succeeded());
        println!("Failed downloads: {}", self.errors);
        if let Some(log) = self.log.as_ref().filter(|_| self.errors > 0) {
            println!("Failures were written to {:?}", log.path());
        }
    }
}
