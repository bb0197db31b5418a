//! Page fetching
//!
//! The worker pulls pages through the [`Fetch`] trait so the HTTP layer can
//! be swapped out; [`HttpFetcher`] is the default implementation backed by
//! a shared reqwest client and the crawl's robots policy.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::robots::RobotsPolicy;
use crate::FetchError;

/// Fetches one page body.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Issues a GET for `url` and returns the response body.
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

/// The default fetcher: plain HTTP GET guarded by the robots policy.
pub struct HttpFetcher {
    client: Client,
    robots: RobotsPolicy,
}

impl HttpFetcher {
    /// Creates a fetcher from a prepared client and robots policy.
    pub fn new(client: Client, robots: RobotsPolicy) -> Self {
        Self { client, robots }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    /// Fetches `url`.
    ///
    /// # Preconditions
    ///
    /// * `url` must be absolute (have a host); otherwise
    ///   [`FetchError::NotAbsolute`].
    /// * The robots policy must allow it; otherwise
    ///   [`FetchError::RobotsDenied`].
    ///
    /// Transport errors are returned as-is. A non-200 status drains the
    /// body, so the connection can be reused, and returns
    /// [`FetchError::Status`].
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        if !url.has_host() {
            return Err(FetchError::NotAbsolute {
                url: url.to_string(),
            });
        }
        if !self.robots.allowed(url) {
            return Err(FetchError::RobotsDenied {
                url: url.to_string(),
            });
        }

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let _ = response.bytes().await;
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;
        Ok(body.to_vec())
    }
}

/// Builds the HTTP client shared by the fetcher and the startup requests
/// (robots.txt, sitemap).
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher_with(robots: RobotsPolicy) -> HttpFetcher {
        let client = build_http_client("TestBot/1.0").unwrap();
        HttpFetcher::new(client, robots)
    }

    #[tokio::test]
    async fn test_hostless_url_rejected() {
        let fetcher = fetcher_with(RobotsPolicy::allow_all("TestBot"));
        let url = Url::parse("mailto:me@example.com").unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::NotAbsolute { .. }));
    }

    #[tokio::test]
    async fn test_robots_denied_before_request() {
        let robots = RobotsPolicy::from_content("User-agent: *\nDisallow: /", "TestBot");
        let fetcher = fetcher_with(robots);
        // The host does not resolve; reaching the network would error
        // differently, proving the robots check runs first.
        let url = Url::parse("http://sumi-weir.invalid/page").unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::RobotsDenied { .. }));
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client("TestBot/1.0").is_ok());
    }
}
