//! Sumi-Weir: a single-host web crawl engine
//!
//! This crate implements a crawl engine for a single host: seed URLs flow
//! into a bounded, deduplicated frontier queue, a pool of concurrent workers
//! fetches and parses pages, and every accepted outbound link is fed back
//! into the frontier until the crawl runs out of work, hits its enqueue
//! limit, or sits idle for too long.

pub mod config;
pub mod crawler;
pub mod robots;
pub mod sitemap;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Weir operations
#[derive(Debug, Error)]
pub enum WeirError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("queue error: {0}")]
    Push(#[from] PushError),

    #[error("sitemap error: {0}")]
    Sitemap(#[from] SitemapError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid host URL {host:?}: {source}")]
    InvalidHost {
        host: String,
        source: ::url::ParseError,
    },

    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("validation error: {0}")]
    Validation(String),
}

/// Errors surfaced by the frontier queue push path
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PushError {
    #[error("queue is closed")]
    Closed,

    #[error("duplicate URL")]
    Duplicate,

    #[error("empty URL key")]
    Empty,

    #[error("enqueue limit reached")]
    LimitReached,
}

/// Errors surfaced by the page fetcher
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("not an absolute URL: {url}")]
    NotAbsolute { url: String },

    #[error("URL disallowed by robots.txt: {url}")]
    RobotsDenied { url: String },

    #[error("HTTP status {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("HTTP error for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },
}

/// Errors surfaced while fetching or decoding a sitemap
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("sitemap request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("sitemap returned HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("sitemap XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Result type alias for Sumi-Weir operations
pub type Result<T> = std::result::Result<T, WeirError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{CrawlConfig, CrawlPlan, DispatchMode};
pub use crawler::{Engine, Frontier, ParseCallback};
pub use robots::RobotsPolicy;
pub use crate::url::{dedup_key, normalize, CrawlScope};
