//! URL handling for the crawl engine
//!
//! This module resolves raw hrefs against their parent page, derives the
//! frontier's deduplication keys, and decides which URLs belong to a crawl.

mod filter;
mod normalize;

pub use filter::{accept, CrawlScope};
pub use normalize::{dedup_key, normalize};
