use crate::model::{Format, VideoInfo};
use std::path::{Path, PathBuf};

/// Filesystem-safe names for downloaded audio and sidecar metadata.

const DEFAULT_AUDIO_EXT: &str = "m4a";

/// Maps spaces to underscores and drops everything that is not a letter,
/// digit or underscore. Applying it twice gives the same result as once.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            c if c.is_alphanumeric() || c == '_' => Some(c),
            _ => None,
        })
        .collect()
}

/// `<YYYY-MM-DD>_<sanitized title>`, falling back to the video id when the
/// title sanitizes to nothing.
pub fn file_stem(info: &VideoInfo) -> String {
    let mut title = sanitize_title(&info.title);
    if title.is_empty() {
        title = sanitize_title(&info.id);
    }
    format!("{}_{}", info.published_at.format("%Y-%m-%d"), title)
}

pub fn audio_extension(format: &Format) -> String {
    let ext: String = format
        .ext
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if ext.is_empty() {
        DEFAULT_AUDIO_EXT.to_string()
    } else {
        ext
    }
}

/// Output paths for one video inside `dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub audio: PathBuf,
    pub metadata: PathBuf,
}

impl OutputPaths {
    pub fn new(dir: &Path, info: &VideoInfo, format: &Format) -> Self {
        let stem = file_stem(info);
        Self {
            audio: dir.join(format!("{}.{}", stem, audio_extension(format))),
            metadata: dir.join(format!("{}.json", stem)),
        }
    }
}
