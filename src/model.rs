use crate::error::{AppError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

/// Video description types shared by the resolver, selector and writers.
///
/// Formats are normalized from yt-dlp's JSON: missing tracks become empty
/// codec labels and only formats served as one plain HTTP(S) file are kept.

/// One encoding variant of a video.
///
/// An empty codec label means the track is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Format {
    pub id: String,
    pub audio_codec: String,
    pub video_codec: String,
    pub ext: String,
    pub protocol: String,
    pub url: Option<String>,
}

impl Format {
    /// Audio track present and no video track.
    pub fn is_audio_only(&self) -> bool {
        !self.audio_codec.is_empty() && self.video_codec.is_empty()
    }

    /// Served as a single file over HTTP(S) rather than as a manifest,
    /// fragment list or storyboard. A missing protocol counts as direct.
    pub fn is_direct(&self) -> bool {
        let protocol = self.protocol.replace('_', "");
        protocol.is_empty()
            || protocol.eq_ignore_ascii_case("https")
            || protocol.eq_ignore_ascii_case("http")
    }
}

/// Structured description of a single video.
#[derive(Debug, Clone, Serialize)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub formats: Vec<Format>,
    /// The document returned by the info service, written verbatim as the
    /// sidecar metadata when present.
    #[serde(skip)]
    pub upstream: Option<Value>,
}

impl VideoInfo {
    /// Maps a yt-dlp style JSON document into a `VideoInfo`.
    ///
    /// # Errors
    /// `AppError::Api` when the title or publish date is missing.
    pub fn from_upstream(doc: Value) -> Result<Self> {
        let id = str_field(&doc, &["id"]).unwrap_or_default();
        let title = str_field(&doc, &["title"])
            .ok_or_else(|| AppError::Api(format!("video {} has no title", id)))?;
        let published_at = publish_date(&doc)
            .ok_or_else(|| AppError::Api(format!("video {} has no publish date", id)))?;

        let formats = doc
            .get("formats")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(format_from_value)
                    .filter(Format::is_direct)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            id,
            title,
            published_at,
            formats,
            upstream: Some(doc),
        })
    }
}

/// Files written for one successfully processed video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFiles {
    pub audio: PathBuf,
    pub metadata: PathBuf,
}

fn str_field(doc: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| doc.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// yt-dlp reports a missing track as `"none"`.
fn codec_field(doc: &Value, keys: &[&str]) -> String {
    match str_field(doc, keys) {
        Some(codec) if !codec.eq_ignore_ascii_case("none") => codec,
        _ => String::new(),
    }
}

/// Container extension, skipping the placeholders the yt-dlp model writes
/// for extensions it has no variant for, then guessing from the audio codec.
///
/// The model's snake_case variant names split digits off (`m4_a`), so
/// underscores are dropped.
fn ext_field(doc: &Value, audio_codec: &str) -> String {
    ["ext", "audio_ext"]
        .iter()
        .filter_map(|key| doc.get(*key).and_then(Value::as_str))
        .map(|ext| ext.trim().replace('_', ""))
        .find(|ext| {
            !ext.is_empty()
                && !ext.eq_ignore_ascii_case("unknown")
                && !ext.eq_ignore_ascii_case("none")
        })
        .or_else(|| ext_for_codec(audio_codec).map(str::to_string))
        .unwrap_or_default()
}

fn ext_for_codec(codec: &str) -> Option<&'static str> {
    let codec = codec.to_ascii_lowercase();
    if codec.starts_with("mp4a") || codec.starts_with("aac") {
        Some("m4a")
    } else if codec.starts_with("opus") || codec.starts_with("vorbis") {
        Some("webm")
    } else if codec.starts_with("mp3") {
        Some("mp3")
    } else if codec.starts_with("flac") {
        Some("flac")
    } else {
        None
    }
}

fn format_from_value(doc: &Value) -> Format {
    let audio_codec = codec_field(doc, &["acodec", "audio_codec"]);
    Format {
        id: str_field(doc, &["format_id"]).unwrap_or_default(),
        ext: ext_field(doc, &audio_codec),
        video_codec: codec_field(doc, &["vcodec", "video_codec"]),
        protocol: str_field(doc, &["protocol"]).unwrap_or_default(),
        url: str_field(doc, &["url"]),
        audio_codec,
    }
}

fn publish_date(doc: &Value) -> Option<DateTime<Utc>> {
    ["timestamp", "release_timestamp", "upload_date"]
        .iter()
        .filter_map(|key| doc.get(*key))
        .find_map(parse_date)
}

fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let n = n.as_i64()?;
            // 8-digit integers are YYYYMMDD, anything larger is unix seconds
            if (10_000_000..=99_999_999).contains(&n) {
                compact_date(&n.to_string())
            } else {
                DateTime::from_timestamp(n, 0)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            compact_date(s).or_else(|| {
                DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc))
            })
        }
        _ => None,
    }
}

fn compact_date(s: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y%m%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}
