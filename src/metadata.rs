use crate::error::Result;
use crate::model::VideoInfo;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Writes the sidecar JSON document for a video and flushes `dest`.
///
/// The upstream document is written as received so field names match the
/// info service; a `VideoInfo` built without one is serialized directly.
pub async fn write_metadata<W>(info: &VideoInfo, dest: &mut W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut body = match &info.upstream {
        Some(doc) => serde_json::to_vec_pretty(doc)?,
        None => serde_json::to_vec_pretty(info)?,
    };
    body.push(b'\n');

    dest.write_all(&body).await?;
    dest.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Format;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};

    fn info() -> VideoInfo {
        VideoInfo {
            id: "abc".to_string(),
            title: "A title".to_string(),
            published_at: Utc.with_ymd_and_hms(2022, 2, 3, 4, 5, 6).unwrap(),
            formats: vec![Format {
                id: "140".to_string(),
                audio_codec: "mp4a.40.2".to_string(),
                ..Format::default()
            }],
            upstream: None,
        }
    }

    #[tokio::test]
    async fn test_writes_upstream_document_verbatim() {
        let mut video = info();
        video.upstream = Some(json!({"id": "abc", "title": "A title", "view_count": 42}));

        let mut out = Vec::new();
        write_metadata(&video, &mut out).await.unwrap();

        assert!(out.ends_with(b"\n"));
        let parsed: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed["view_count"], 42);
        assert!(parsed.get("published_at").is_none());
    }

    #[tokio::test]
    async fn test_falls_back_to_normalized_info() {
        let mut out = Vec::new();
        write_metadata(&info(), &mut out).await.unwrap();

        let parsed: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed["title"], "A title");
        assert_eq!(parsed["published_at"], "2022-02-03T04:05:06Z");
        assert_eq!(parsed["formats"][0]["audio_codec"], "mp4a.40.2");
        assert!(parsed.get("upstream").is_none());
    }
}
