//! The crawl engine
//!
//! This module contains the moving parts of a crawl:
//! - The frontier queue that buffers, dedupes and meters URLs
//! - The fetcher that performs the HTTP requests
//! - The link extractor that feeds discovered URLs back in
//! - The workers and the dispatcher that drives them
//! - The engine that wires it all together

mod dispatcher;
mod engine;
mod extractor;
mod fetcher;
mod frontier;
mod worker;

pub use dispatcher::{Discipline, PendingHeap};
pub use engine::Engine;
pub use extractor::{collect_links, push_links, Walk};
pub use fetcher::{build_http_client, Fetch, HttpFetcher};
pub use frontier::{Frontier, QUEUE_CAPACITY};
pub use worker::ParseCallback;
