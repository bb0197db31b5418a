use reqwest::{header, Client, StatusCode};
use robotstxt::DefaultMatcher;
use url::Url;

/// Robots.txt policy for the crawled host
///
/// Wraps the robotstxt crate behind a single `allowed` check. A policy is
/// fetched once at engine startup; when the file cannot be fetched or read,
/// the crawl proceeds with a permissive policy that allows every URL.
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    /// Raw robots.txt content; `None` means allow everything
    content: Option<String>,

    /// User agent the rules are evaluated for
    agent: String,
}

impl RobotsPolicy {
    /// Creates a permissive policy that allows every URL.
    pub fn allow_all(agent: impl Into<String>) -> Self {
        Self {
            content: None,
            agent: agent.into(),
        }
    }

    /// Creates a policy from raw robots.txt content.
    pub fn from_content(content: impl Into<String>, agent: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            agent: agent.into(),
        }
    }

    /// Checks whether the policy allows fetching `url`.
    pub fn allowed(&self, url: &Url) -> bool {
        let Some(content) = &self.content else {
            return true;
        };
        if content.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(content, &self.agent, url.as_str())
    }

    /// Fetches `host`'s robots.txt and builds a policy from it.
    ///
    /// The request carries `robots_agent` as its user agent. Any failure on
    /// the way (bad URL, network error, non-200 status, unreadable body)
    /// yields the permissive policy; missing robots never stop a crawl.
    pub async fn fetch(client: &Client, host: &Url, robots_agent: &str) -> Self {
        let robots_url = match host.join("/robots.txt") {
            Ok(robots_url) => robots_url,
            Err(e) => {
                tracing::debug!(host = %host, error = %e, "cannot form robots.txt URL");
                return Self::allow_all(robots_agent);
            }
        };

        let response = match client
            .get(robots_url)
            .header(header::USER_AGENT, robots_agent)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(host = %host, error = %e, "robots.txt unavailable, crawling permissively");
                return Self::allow_all(robots_agent);
            }
        };

        if response.status() != StatusCode::OK {
            tracing::debug!(
                host = %host,
                status = %response.status(),
                "robots.txt not served, crawling permissively"
            );
            return Self::allow_all(robots_agent);
        }

        match response.text().await {
            Ok(content) => Self::from_content(content, robots_agent),
            Err(e) => {
                tracing::debug!(host = %host, error = %e, "robots.txt body unreadable, crawling permissively");
                Self::allow_all(robots_agent)
            }
        }
    }
}
