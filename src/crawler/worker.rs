//! Crawl workers
//!
//! Each worker owns a one-slot inbox fed by the dispatcher and loops:
//! fetch, parse, extract links back into the frontier, hand the page to the
//! user callback, then observe the politeness delay. Per-URL failures are
//! logged and skipped; the loop ends when the dispatcher closes the inbox.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use scraper::Html;
use tokio::sync::mpsc;
use url::Url;

use super::extractor::{collect_links, push_links, Walk};
use super::fetcher::Fetch;
use super::frontier::Frontier;
use crate::url::CrawlScope;

/// Capacity of a worker's inbox channel.
pub(crate) const INBOX_CAPACITY: usize = 1;

/// Callback invoked once per successfully fetched and parsed page.
///
/// Receives the page URL, the parsed document and the raw body bytes. An
/// error return is logged; it never stops the crawl.
pub type ParseCallback = Arc<
    dyn Fn(&Url, &Html, &[u8]) -> Result<(), Box<dyn Error + Send + Sync>> + Send + Sync,
>;

pub(crate) struct Worker {
    pub(crate) id: usize,
    pub(crate) inbox: mpsc::Receiver<Url>,
    pub(crate) frontier: Arc<Frontier>,
    pub(crate) fetcher: Arc<dyn Fetch>,
    pub(crate) scope: Arc<CrawlScope>,
    pub(crate) callback: Option<ParseCallback>,
    pub(crate) delay: Duration,
    pub(crate) completions: mpsc::UnboundedSender<usize>,
}

impl Worker {
    /// Runs the worker until its inbox is closed by the dispatcher.
    ///
    /// The politeness delay starts after the page is fully received and
    /// processed, not before the request.
    pub(crate) async fn run(mut self) {
        while let Some(url) = self.inbox.recv().await {
            self.visit(&url).await;

            // An error here means the dispatcher is already shutting down.
            let _ = self.completions.send(self.id);

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }
        tracing::debug!(worker = self.id, "worker shut down");
    }

    async fn visit(&self, url: &Url) {
        tracing::debug!(worker = self.id, url = %url, "visiting");

        let body = match self.fetcher.fetch(url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(worker = self.id, url = %url, error = %e, "fetch failed");
                return;
            }
        };

        let html = String::from_utf8_lossy(&body);
        let links = {
            // The parsed document must not outlive this block: it is not
            // Send, and the pushes below suspend.
            let document = Html::parse_document(&html);
            let links = collect_links(&document, url, &self.scope);
            if let Some(callback) = &self.callback {
                if let Err(e) = callback(url, &document, &body) {
                    tracing::warn!(worker = self.id, url = %url, error = %e, "page callback failed");
                }
            }
            links
        };

        match push_links(&self.frontier, links).await {
            Walk::Completed => {}
            Walk::LimitReached => {
                tracing::debug!(worker = self.id, url = %url, "enqueue limit reached while extracting");
            }
            Walk::Closed => {
                tracing::debug!(worker = self.id, url = %url, "queue closed while extracting");
            }
        }
    }
}
