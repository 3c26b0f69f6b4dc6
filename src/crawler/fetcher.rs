//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building HTTP clients with the configured headers and timeout
//! - GET requests to fetch page content
//! - Error classification into [`FetchError`]

use crate::config::Config;
use crate::crawler::traits::{FetchError, Fetcher, RawContent};
use crate::url::DocumentId;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// Every header from `[http.headers]` is sent as a default header. Redirects
/// are followed (reqwest's default policy), and responses may be gzip or
/// brotli encoded.
///
/// # Example
///
/// ```no_run
/// use tidemark::config::Config;
/// use tidemark::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.http.headers {
        // Validated when the configuration was loaded
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!("Skipping invalid header {}", name),
        }
    }

    Client::builder()
        .default_headers(headers)
        .timeout(config.fetch_timeout())
        .connect_timeout(Duration::from_secs(10).min(config.fetch_timeout()))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns its body
///
/// # Error Classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Ok(RawContent)` |
/// | Any other status | `FetchError::Status` |
/// | Client timeout | `FetchError::Timeout` |
/// | Connection/TLS failure | `FetchError::Network` |
/// | Body cannot be decoded | `FetchError::Body` |
pub async fn fetch_url(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<RawContent, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(e, timeout))?;

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout(timeout)
        } else {
            FetchError::Body(e.to_string())
        }
    })?;

    Ok(RawContent { final_url, body })
}

fn classify_error(e: reqwest::Error, timeout: Duration) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(timeout)
    } else if e.is_connect() {
        FetchError::Network(format!("Connection failed: {}", e))
    } else {
        FetchError::Network(e.to_string())
    }
}

/// A single HTTP browsing session
///
/// Cloning shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Builds a session from the configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?, config.fetch_timeout()))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&mut self, id: &DocumentId) -> Result<RawContent, FetchError> {
        tracing::debug!("GET {}", id);
        fetch_url(&self.client, id.as_str(), self.timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> Config {
        let mut config = Config::default();
        config.crawler.timeout_ms = 2_000;
        config
            .http
            .headers
            .insert("X-Harvest".to_string(), "yes".to_string());
        config
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&Config::default()).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_success_sends_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hc/articles/1"))
            .and(header("X-Harvest", "yes"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let mut fetcher = HttpFetcher::from_config(&test_config()).unwrap();
        let id = DocumentId::parse(&format!("{}/hc/articles/1", server.uri())).unwrap();
        let content = fetcher.fetch(&id).await.unwrap();

        assert_eq!(content.body, "<html>ok</html>");
        assert!(content.final_url.ends_with("/hc/articles/1"));
    }

    #[tokio::test]
    async fn test_fetch_maps_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let mut fetcher = HttpFetcher::from_config(&test_config()).unwrap();
        let id = DocumentId::parse(&format!("{}/missing", server.uri())).unwrap();
        let result = fetcher.fetch(&id).await;

        assert!(matches!(result, Err(FetchError::Status { status: 404 })));
    }

    #[tokio::test]
    async fn test_fetch_maps_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let mut config = test_config();
        config.crawler.timeout_ms = 200;
        let mut fetcher = HttpFetcher::from_config(&config).unwrap();
        let id = DocumentId::parse(&format!("{}/slow", server.uri())).unwrap();

        assert!(matches!(fetcher.fetch(&id).await, Err(FetchError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Port 9 (discard) is almost never listening locally
        let mut fetcher = HttpFetcher::from_config(&test_config()).unwrap();
        let id = DocumentId::parse("http://127.0.0.1:9/nothing").unwrap();
        assert!(fetcher.fetch(&id).await.is_err());
    }
}
