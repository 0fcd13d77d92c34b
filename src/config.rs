use crate::error::{AppError, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Configuration management for the application.
///
/// Every external collaborator receives its settings from this struct at
/// construction time; nothing reads the environment after startup.

/// Environment variable holding the API key for the search service.
pub const API_KEY_VAR: &str = "YOUTUBE_API_KEY";

/// The search API never returns more than this many items per page.
pub const MAX_SEARCH_RESULTS: usize = 50;

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/search";

/// Configuration for the channel audio downloader.
///
/// # Examples
///
/// ```
/// use channel_audio::Config;
///
/// let config = Config::default();
/// assert_eq!(config.max_results, 50);
/// assert!(config.api_key.is_empty());
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: String,
    pub output_dir: PathBuf,
    pub error_log: PathBuf,
    pub libraries_dir: PathBuf,
    pub search_endpoint: String,
    pub max_results: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            output_dir: PathBuf::from("downloads"),
            error_log: PathBuf::from("errors.txt"),
            libraries_dir: PathBuf::from("libs"),
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            max_results: MAX_SEARCH_RESULTS,
        }
    }
}

impl Config {
    /// Builds the default configuration with the API key taken from the
    /// process environment.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the key is missing or blank.
    pub fn from_env() -> Result<Self> {
        let key = std::env::var(API_KEY_VAR).ok();
        Self::default().with_api_key(key.as_deref().unwrap_or_default())
    }

    pub fn with_api_key(mut self, key: &str) -> Result<Self> {
        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::Config(format!("{} is not set", API_KEY_VAR)));
        }
        self.api_key = key.to_string();
        Ok(self)
    }

    /// Page size actually requested from the search API.
    pub fn page_size(&self) -> usize {
        self.max_results.min(MAX_SEARCH_RESULTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_is_config_error() {
        let err = Config::default().with_api_key("   ").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains(API_KEY_VAR));
    }

    #[test]
    fn test_key_is_trimmed() {
        let config = Config::default().with_api_key(" abc123\n").unwrap();
        assert_eq!(config.api_key, "abc123");
    }

    #[test]
    fn test_page_size_is_capped() {
        let config = Config {
            max_results: 500,
            ..Config::default()
        };
        assert_eq!(config.page_size(), MAX_SEARCH_RESULTS);

        let config = Config {
            max_results: 5,
            ..Config::default()
        };
        assert_eq!(config.page_size(), 5);
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"api_key":"k","output_dir":"out"}"#).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.error_log, PathBuf::from("errors.txt"));
        assert_eq!(config.search_endpoint, DEFAULT_SEARCH_ENDPOINT);
    }
}
