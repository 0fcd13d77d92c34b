use crate::config::Config;
use crate::error::{AppError, Result};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::Url;

const WATCH_URL: &str = "https://www.youtube.com/watch";

#[derive(Debug, Default, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    id: ResourceId,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Canonical watch URL for a video id.
pub fn watch_url(video_id: &str) -> Result<String> {
    Ok(Url::parse_with_params(WATCH_URL, &[("v", video_id)])?.into())
}

/// Client for the channel search endpoint.
///
/// Only the first page of results is read, so at most `max_results` (50)
/// videos are returned per channel.
///
/// # Examples
///
/// ```no_run
/// use channel_audio::{ChannelResolver, Config};
///
/// async fn example() {
///     let config = Config::from_env().unwrap();
///     let resolver = ChannelResolver::new(&config);
///     let urls = resolver.resolve("UC_x5XG1OV2P6uZZ5FSM9Ttw").await;
/// }
/// ```
pub struct ChannelResolver {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    page_size: usize,
}

impl ChannelResolver {
    pub fn new(config: &Config) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            endpoint: config.search_endpoint.clone(),
            api_key: config.api_key.clone(),
            page_size: config.page_size(),
        }
    }

    /// Lists watch URLs for the channel's videos.
    ///
    /// An empty result page yields an empty list.
    ///
    /// # Errors
    /// - `Config` if the channel id is blank
    /// - `Api` on a non-success status (bad key, quota, unknown channel)
    /// - `Request` on network or decoding failures
    #[instrument(skip(self))]
    pub async fn resolve(&self, channel_id: &str) -> Result<Vec<String>> {
        let channel_id = channel_id.trim();
        if channel_id.is_empty() {
            return Err(AppError::Config("channel id is empty".to_string()));
        }

        let max_results = self.page_size.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("part", "id"),
                ("channelId", channel_id),
                ("maxResults", max_results.as_str()),
                ("type", "video"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(AppError::Api(format!(
                "search request failed with status {}: {}",
                status, detail
            )));
        }

        let page: SearchListResponse = response.json().await?;
        debug!("Search returned {} items", page.items.len());

        let urls = page
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .filter(|id| !id.is_empty())
            .take(self.page_size)
            .map(|id| watch_url(&id))
            .collect::<Result<Vec<_>>>()?;

        info!("Found {} videos for channel {}", urls.len(), channel_id);
        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn page(count: usize) -> serde_json::Value {
        let items: Vec<_> = (0..count)
            .map(|i| json!({"kind": "youtube#searchResult", "id": {"kind": "youtube#video", "videoId": format!("vid{:03}", i)}}))
            .collect();
        json!({"kind": "youtube#searchListResponse", "items": items})
    }

    async fn resolver_for(server: &MockServer) -> ChannelResolver {
        let config = Config {
            search_endpoint: format!("{}/youtube/v3/search", server.uri()),
            ..Config::default()
        }
        .with_api_key("test-key")
        .unwrap();
        ChannelResolver::new(&config)
    }

    async fn resolve_count(count: usize) -> Vec<String> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/v3/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(count)))
            .mount(&server)
            .await;
        resolver_for(&server).await.resolve("UCchannel").await.unwrap()
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            watch_url("dQw4w9WgXcQ").unwrap(),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[tokio::test]
    async fn test_sends_expected_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/v3/search"))
            .and(query_param("part", "id"))
            .and(query_param("channelId", "UCchannel"))
            .and(query_param("maxResults", "50"))
            .and(query_param("type", "video"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(1)))
            .expect(1)
            .mount(&server)
            .await;

        let urls = resolver_for(&server).await.resolve("UCchannel").await.unwrap();
        assert_eq!(urls, vec!["https://www.youtube.com/watch?v=vid000".to_string()]);
    }

    #[tokio::test]
    async fn test_page_boundaries() {
        assert!(resolve_count(0).await.is_empty());
        assert_eq!(resolve_count(1).await.len(), 1);
        assert_eq!(resolve_count(50).await.len(), 50);

        let capped = resolve_count(73).await;
        assert_eq!(capped.len(), 50);
        assert_eq!(capped[49], "https://www.youtube.com/watch?v=vid049");
    }

    #[tokio::test]
    async fn test_missing_items_field_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"kind": "youtube#searchListResponse"})))
            .mount(&server)
            .await;
        let urls = resolver_for(&server).await.resolve("UCchannel").await.unwrap();
        assert!(urls.is_empty());
    }

    #[tokio::test]
    async fn test_items_without_video_id_are_skipped() {
        let server = MockServer::start().await;
        let body = json!({"items": [
            {"id": {"kind": "youtube#channel", "channelId": "UCother"}},
            {"id": {"kind": "youtube#video", "videoId": "keep"}}
        ]});
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        let urls = resolver_for(&server).await.resolve("UCchannel").await.unwrap();
        assert_eq!(urls, vec!["https://www.youtube.com/watch?v=keep".to_string()]);
    }

    #[tokio::test]
    async fn test_quota_error_is_api_error() {
        let server = MockServer::start().await;
        let body = json!({"error": {"code": 403, "message": "quotaExceeded"}});
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(body))
            .mount(&server)
            .await;
        let err = resolver_for(&server).await.resolve("UCchannel").await.unwrap_err();
        assert!(matches!(err, AppError::Api(_)));
        assert!(err.to_string().contains("quotaExceeded"));
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn test_blank_channel_is_config_error() {
        let server = MockServer::start().await;
        let err = resolver_for(&server).await.resolve("  ").await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
