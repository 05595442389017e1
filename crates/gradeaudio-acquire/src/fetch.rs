use crate::config::CrawlConfig;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, REFERER};
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid value for header {name}")]
    InvalidHeader { name: &'static str },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: StatusCode },

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// HTTP access for a crawl: one client for article pages, one for audio streams.
///
/// Both send the same fixed header set. They differ only in how timeouts
/// apply: pages get a whole-request limit, audio gets connect and per-read
/// limits so long files can keep streaming.
#[derive(Clone)]
pub struct HttpFetcher {
    page: reqwest::Client,
    audio: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self, FetchError> {
        let headers = default_headers(config)?;

        let page = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers.clone())
            .timeout(config.page_timeout)
            .build()
            .map_err(FetchError::Client)?;

        let audio = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .connect_timeout(config.download_timeout)
            .read_timeout(config.download_timeout)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { page, audio })
    }

    /// GET an article page and return its body text.
    pub async fn get_page(&self, url: &str) -> Result<String, FetchError> {
        let response = send(&self.page, url).await?;
        response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }

    /// GET an audio resource, returning the response for the caller to stream.
    pub async fn get_audio(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        send(&self.audio, url).await
    }
}

async fn send(client: &reqwest::Client, url: &str) -> Result<reqwest::Response, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    Ok(response)
}

fn default_headers(config: &CrawlConfig) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        REFERER,
        HeaderValue::from_str(&config.referer)
            .map_err(|_| FetchError::InvalidHeader { name: "Referer" })?,
    );
    if !config.cookie.trim().is_empty() {
        headers.insert(
            COOKIE,
            HeaderValue::from_str(config.cookie.trim())
                .map_err(|_| FetchError::InvalidHeader { name: "Cookie" })?,
        );
    }
    Ok(headers)
}
