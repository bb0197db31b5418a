//! Configuration for the crawl engine
//!
//! Raw TOML configuration is loaded by [`load_config`], then resolved into
//! a validated [`CrawlPlan`] that compiles the accept/reject patterns and
//! fills in defaults.

mod parser;
mod types;
mod validation;

pub use parser::load_config;
pub use types::{
    CrawlConfig, CrawlPlan, DispatchMode, DEFAULT_CRAWL_DELAY, DEFAULT_ROBOTS_AGENT,
    DEFAULT_TIME_TO_LIVE, DEFAULT_USER_AGENT, DEFAULT_WORKER_COUNT,
};
