//! Link extraction
//!
//! Walks a parsed page in document order, resolves every anchor's href
//! against the page URL, filters the results against the crawl scope, and
//! feeds the survivors to the frontier. The walk and the pushes are split
//! into two passes: the parsed document is not `Send`, so it must be gone
//! before the first push suspends.

use scraper::{Html, Selector};
use url::Url;

use super::frontier::Frontier;
use crate::url::{normalize, CrawlScope};
use crate::PushError;

/// How a push pass over a page's links ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Every link was offered to the frontier
    Completed,

    /// The enqueue limit tripped; remaining links were not pushed
    LimitReached,

    /// The queue closed; remaining links were not pushed
    Closed,
}

/// Collects the in-scope outbound links of a page, in document order.
///
/// Anchors with a missing or empty `href` are skipped, as are hrefs that do
/// not resolve and URLs outside the crawl scope.
pub fn collect_links(document: &Html, parent: &Url, scope: &CrawlScope) -> Vec<Url> {
    let Ok(anchor_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut links = Vec::new();
    for anchor in document.select(&anchor_selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if href.is_empty() {
            continue;
        }

        let url = match normalize(parent, href) {
            Ok(url) => url,
            Err(e) => {
                tracing::trace!(href, error = %e, "skipping unresolvable href");
                continue;
            }
        };
        if !scope.accept(&url) {
            tracing::trace!(url = %url, "link outside crawl scope");
            continue;
        }
        links.push(url);
    }
    links
}

/// Pushes collected links onto the frontier, in order.
///
/// Duplicate and empty-key URLs are logged and skipped. A limit or closed
/// error is terminal: no further links are pushed and the outcome is
/// reported to the caller.
pub async fn push_links(frontier: &Frontier, links: Vec<Url>) -> Walk {
    for url in links {
        match frontier.push(url.clone()).await {
            Ok(()) => {}
            Err(e @ (PushError::Duplicate | PushError::Empty)) => {
                tracing::debug!(url = %url, error = %e, "link not enqueued");
            }
            Err(PushError::LimitReached) => return Walk::LimitReached,
            Err(PushError::Closed) => return Walk::Closed,
        }
    }
    Walk::Completed
}
