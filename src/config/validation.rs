use std::time::Duration;

use regex::Regex;
use url::Url;

use super::types::{
    CrawlConfig, CrawlPlan, DEFAULT_ROBOTS_AGENT, DEFAULT_TIME_TO_LIVE, DEFAULT_USER_AGENT,
    DEFAULT_WORKER_COUNT,
};
use crate::url::CrawlScope;
use crate::{ConfigError, ConfigResult};

impl CrawlConfig {
    /// Validates the configuration and resolves it into a [`CrawlPlan`].
    ///
    /// # Validation Rules
    ///
    /// * `host` must parse as an absolute http(s) URL with a host.
    /// * Every accept/reject pattern must compile as a regular expression.
    /// * `max_enqueue` must be non-negative.
    /// * Invalid seed URLs are skipped with a warning, not an error; the
    ///   same goes for an invalid sitemap URL.
    ///
    /// # Defaults
    ///
    /// Empty user agents get the package defaults. A zero `ttl-ms` becomes
    /// three politeness delays, or the package constant when the delay is
    /// zero too. A zero worker count becomes the package default.
    pub fn resolve(&self) -> ConfigResult<CrawlPlan> {
        let host = Url::parse(&self.host).map_err(|source| ConfigError::InvalidHost {
            host: self.host.clone(),
            source,
        })?;
        if !host.has_host() {
            return Err(ConfigError::Validation(format!(
                "host URL {:?} has no host component",
                self.host
            )));
        }
        if host.scheme() != "http" && host.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "host URL {:?} must use http or https",
                self.host
            )));
        }

        if self.max_enqueue < 0 {
            return Err(ConfigError::Validation(format!(
                "max-enqueue must be non-negative, got {}",
                self.max_enqueue
            )));
        }

        let accept = compile_patterns(&self.accept)?;
        let reject = compile_patterns(&self.reject)?;

        let mut seeds = Vec::with_capacity(self.seeds.len());
        for seed in &self.seeds {
            match Url::parse(seed) {
                Ok(url) => seeds.push(url),
                Err(e) => tracing::warn!(seed = %seed, error = %e, "skipping invalid seed URL"),
            }
        }

        let sitemap = self.sitemap.as_ref().and_then(|raw| match Url::parse(raw) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(sitemap = %raw, error = %e, "ignoring invalid sitemap URL");
                None
            }
        });

        let user_agent = if self.user_agent.is_empty() {
            DEFAULT_USER_AGENT.to_string()
        } else {
            self.user_agent.clone()
        };
        let robots_agent = if self.robots_agent.is_empty() {
            DEFAULT_ROBOTS_AGENT.to_string()
        } else {
            self.robots_agent.clone()
        };

        let delay = Duration::from_millis(self.delay_ms);
        let ttl = if self.ttl_ms > 0 {
            Duration::from_millis(self.ttl_ms)
        } else if !delay.is_zero() {
            delay * 3
        } else {
            DEFAULT_TIME_TO_LIVE
        };

        let workers = if self.workers > 0 {
            self.workers
        } else {
            DEFAULT_WORKER_COUNT
        };

        Ok(CrawlPlan {
            scope: CrawlScope::new(host, accept, reject),
            seeds,
            sitemap,
            user_agent,
            robots_agent,
            delay,
            max_enqueue: self.max_enqueue,
            ttl,
            workers,
            dispatch: self.dispatch,
        })
    }
}

fn compile_patterns(sources: &[String]) -> ConfigResult<Vec<Regex>> {
    sources
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}
