//! HTTP fetching for the scraper
//!
//! This module defines the `Fetcher` seam every component fetches pages through,
//! and `HttpClient`, its reqwest-backed implementation.

use std::future::Future;
use std::time::Instant;

use reqwest::Client as ReqwestClient;
use tracing::{debug, instrument, warn};

use crate::config::ScraperConfig;
use crate::error::{Error, Result};

/// A fetched document with its HTTP status
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL that was requested
    pub url: String,

    /// HTTP status code
    pub status: u16,

    /// Raw response body
    pub body: String,
}

impl FetchedPage {
    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can GET a URL.
///
/// Non-success statuses are returned as pages, not errors; only transport
/// failures are errors.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedPage>> + Send;
}

/// HTTP client for fetching Letterboxd pages
#[derive(Clone)]
pub struct HttpClient {
    /// The underlying reqwest client
    client: ReqwestClient,
}

impl HttpClient {
    /// Create a client honoring the configured timeout and user agent
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpClient {
    #[instrument(skip(self), level = "debug")]
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let started = Instant::now();

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                warn!("Request to {} timed out", url);
                Error::Timeout {
                    url: url.to_string(),
                }
            } else {
                Error::Http(e)
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    url: url.to_string(),
                }
            } else {
                Error::Http(e)
            }
        })?;

        debug!(
            status,
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fetched {}",
            url
        );

        Ok(FetchedPage {
            url: url.to_string(),
            status,
            body,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_fetch_success() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("GET", "/alice/films/page/1/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body>ok</body></html>")
            .expect(1)
            .create_async()
            .await;

        let config = ScraperConfig::builder()
            .base_url(server.url())
            .build()
            .unwrap();
        let client = HttpClient::new(&config).unwrap();

        let page = client.fetch(&config.listing_url("alice", 1)).await.unwrap();
        assert!(page.is_success());
        assert_eq!(page.status, 200);
        assert!(page.body.contains("ok"));

        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_is_returned_not_raised() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("GET", "/film/missing/")
            .with_status(404)
            .with_body("Not Found")
            .create_async()
            .await;

        let config = ScraperConfig::builder()
            .base_url(server.url())
            .build()
            .unwrap();
        let client = HttpClient::new(&config).unwrap();

        let page = client.fetch(&config.film_url("missing")).await.unwrap();
        assert!(!page.is_success());
        assert_eq!(page.status, 404);

        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_sends_user_agent() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("GET", "/film/dune-2021/")
            .match_header("user-agent", "test-agent/1.0")
            .with_status(200)
            .with_body("")
            .create_async()
            .await;

        let config = ScraperConfig::builder()
            .base_url(server.url())
            .user_agent("test-agent/1.0")
            .build()
            .unwrap();
        let client = HttpClient::new(&config).unwrap();

        client.fetch(&config.film_url("dune-2021")).await.unwrap();
        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        let config = ScraperConfig::builder()
            .base_url("http://127.0.0.1:9")
            .timeout_secs(2)
            .build()
            .unwrap();
        let client = HttpClient::new(&config).unwrap();

        let err = client.fetch(&config.film_url("x")).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Accept connections and hold them open without answering
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let config = ScraperConfig::builder()
            .base_url(format!("http://{}", addr))
            .timeout_secs(1)
            .build()
            .unwrap();
        let client = HttpClient::new(&config).unwrap();

        let url = config.film_url("x");
        let err = client.fetch(&url).await.unwrap_err();
        assert!(matches!(&err, Error::Timeout { url: timed_out } if *timed_out == url));
        assert!(err.is_transport());

        server.abort();
    }
}
