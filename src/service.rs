use crate::error::Result;
use crate::model::{Format, VideoInfo};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

/// Audio bytes for one format, delivered in chunks.
pub type AudioStream = BoxStream<'static, Result<Bytes>>;

/// Resolves videos and opens their media streams.
///
/// The batch driver only talks to this trait, so the library doing the
/// actual page parsing and format negotiation can be swapped out.
#[async_trait(?Send)]
pub trait VideoService {
    /// Fetches title, publish date and the available formats for `url`.
    async fn resolve_video_info(&self, url: &str) -> Result<VideoInfo>;

    /// Opens a byte stream for `format` of the given video.
    async fn open_audio_stream(&self, info: &VideoInfo, format: &Format) -> Result<AudioStream>;
}
