use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, Proxy};
use url::Url;

use super::models::{FeedSource, RawEntry};
use super::parser::{parse_feed, ParsedFeed};
use super::transport::EntrySource;
use crate::config::SyncConfig;
use crate::{Error, Result};

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// HTTP feed fetcher. One request per feed, no retries.
pub struct FeedFetcher {
    client: Client,
    max_feed_bytes: usize,
}

impl FeedFetcher {
    /// Create a new feed fetcher with configuration
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let client = Self::build_client(config.request_timeout_secs, &config.proxy_url)?;

        Ok(Self {
            client,
            max_feed_bytes: config.max_feed_bytes,
        })
    }

    /// Build HTTP client with optional proxy
    fn build_client(timeout_secs: u64, proxy_url: &Option<String>) -> Result<Client> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(10));

        if let Some(ref proxy) = proxy_url {
            let proxy = Proxy::all(proxy)
                .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?;
            builder = builder.proxy(proxy);
            tracing::info!("Using HTTP proxy for feed fetching");
        }

        builder.build().map_err(Error::Http)
    }

    /// Build browser-like headers for a request
    fn build_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "application/rss+xml,application/atom+xml,application/xml;q=0.9,text/xml;q=0.8,*/*;q=0.5"
            )
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7")
        );
        headers.insert(
            ACCEPT_ENCODING,
            HeaderValue::from_static("gzip, deflate, br")
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Bytes> {
        let url = Url::parse(url)?;

        tracing::debug!("Fetching feed from: {}", url);

        let response = self.client
            .get(url.clone())
            .headers(Self::build_headers())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::FeedParse(format!("HTTP {} for URL: {}", status, url)));
        }

        let bytes = response.bytes().await?;
        self.ensure_content_size(bytes.len(), url.as_str())?;

        if is_challenge_page(&bytes) {
            return Err(Error::FeedParse(format!(
                "Bot challenge page returned instead of a feed for URL: {}",
                url
            )));
        }

        Ok(bytes)
    }

    /// Fetch and parse a feed from URL
    pub async fn fetch(&self, url: &str) -> Result<ParsedFeed> {
        let content = self.fetch_bytes(url).await?;
        parse_feed(&content)
    }

    fn ensure_content_size(&self, size: usize, url: &str) -> Result<()> {
        if size > self.max_feed_bytes {
            return Err(Error::FeedParse(format!(
                "Feed too large ({} bytes) for URL: {}",
                size,
                url
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl EntrySource for FeedFetcher {
    async fn fetch_entries(&self, source: &FeedSource) -> Result<Vec<RawEntry>> {
        let parsed = self.fetch(&source.url).await?;
        tracing::info!(
            "Fetched {} entries from '{}'",
            parsed.entries.len(),
            parsed.title.as_deref().unwrap_or(&source.name)
        );
        Ok(parsed.entries)
    }
}

/// Check the first 2KB for interstitial challenge markers
fn is_challenge_page(content: &[u8]) -> bool {
    let check_len = content.len().min(2048);
    let preview = String::from_utf8_lossy(&content[..check_len]);

    preview.contains("Just a moment...")
        || preview.contains("cf-browser-verification")
        || preview.contains("_cf_chl_opt")
        || preview.contains("challenge-platform")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_detection() {
        assert!(is_challenge_page(b"<html><title>Just a moment...</title></html>"));
        assert!(!is_challenge_page(b"<?xml version=\"1.0\"?><rss></rss>"));
    }

    #[test]
    fn test_content_size_limit() {
        let config = SyncConfig {
            max_feed_bytes: 10,
            ..SyncConfig::default()
        };
        let fetcher = FeedFetcher::new(&config).unwrap();
        assert!(fetcher.ensure_content_size(10, "https://example.com/feed").is_ok());
        assert!(fetcher.ensure_content_size(11, "https://example.com/feed").is_err());
    }

    #[test]
    fn test_invalid_proxy_is_config_error() {
        let config = SyncConfig {
            proxy_url: Some("http://proxy.local:99999".to_string()),
            ..SyncConfig::default()
        };
        assert!(matches!(FeedFetcher::new(&config), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected_before_request() {
        let fetcher = FeedFetcher::new(&SyncConfig::default()).unwrap();
        let source = FeedSource::new("Broken", "not a url");
        assert!(matches!(
            fetcher.fetch_entries(&source).await,
            Err(Error::UrlParse(_))
        ));
    }
}
