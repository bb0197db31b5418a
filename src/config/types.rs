use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::url::CrawlScope;

/// Default user agent sent with page requests
pub const DEFAULT_USER_AGENT: &str = "sumi-weir/0.3";

/// Default user agent sent with the robots.txt request
pub const DEFAULT_ROBOTS_AGENT: &str = "sumi-weir-robots/0.3";

/// Default politeness delay between fetches by the same worker
pub const DEFAULT_CRAWL_DELAY: Duration = Duration::from_secs(3);

/// Default idle time-to-live of the frontier (three crawl delays)
pub const DEFAULT_TIME_TO_LIVE: Duration = Duration::from_secs(9);

/// Default number of concurrent crawl workers
pub const DEFAULT_WORKER_COUNT: usize = 8;

/// Raw crawl configuration as loaded from TOML
///
/// All fields except `host` are optional; `resolve` in the validation
/// module turns this into a [`CrawlPlan`] with defaults applied and
/// patterns compiled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrawlConfig {
    /// Absolute URL of the host to crawl
    pub host: String,

    /// Seed URLs pushed at startup (invalid entries are skipped)
    #[serde(default)]
    pub seeds: Vec<String>,

    /// Optional sitemap URL fetched before the seeds
    #[serde(default)]
    pub sitemap: Option<String>,

    /// Accept patterns (regular expressions; empty accepts everything)
    #[serde(default)]
    pub accept: Vec<String>,

    /// Reject patterns (regular expressions; rejects win over accepts)
    #[serde(default)]
    pub reject: Vec<String>,

    /// User agent for page requests
    #[serde(default, rename = "user-agent")]
    pub user_agent: String,

    /// User agent for the robots.txt request
    #[serde(default, rename = "robots-agent")]
    pub robots_agent: String,

    /// Politeness delay between fetches in milliseconds (0 disables)
    #[serde(default, rename = "delay-ms")]
    pub delay_ms: u64,

    /// Maximum number of URLs enqueued over the crawl (0 disables)
    #[serde(default, rename = "max-enqueue")]
    pub max_enqueue: i64,

    /// Frontier idle time-to-live in milliseconds (0 picks a default)
    #[serde(default, rename = "ttl-ms")]
    pub ttl_ms: u64,

    /// Number of concurrent workers (0 picks the default)
    #[serde(default)]
    pub workers: usize,

    /// Worker selection discipline
    #[serde(default)]
    pub dispatch: DispatchMode,
}

/// How the dispatcher picks a worker for each popped URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DispatchMode {
    /// Cycle through the workers in order
    #[default]
    RoundRobin,

    /// Route to the worker with the fewest URLs in flight
    LeastLoaded,
}

/// A validated crawl configuration, ready to drive an engine
#[derive(Debug, Clone)]
pub struct CrawlPlan {
    /// Crawl boundary: host plus compiled accept/reject patterns
    pub scope: CrawlScope,

    /// Parsed seed URLs
    pub seeds: Vec<Url>,

    /// Parsed sitemap URL, if one was configured and valid
    pub sitemap: Option<Url>,

    /// User agent for page requests
    pub user_agent: String,

    /// User agent for the robots.txt request
    pub robots_agent: String,

    /// Politeness delay between fetches
    pub delay: Duration,

    /// Enqueue cap (0 disables)
    pub max_enqueue: i64,

    /// Frontier idle time-to-live
    pub ttl: Duration,

    /// Number of concurrent workers
    pub workers: usize,

    /// Worker selection discipline
    pub dispatch: DispatchMode,
}
