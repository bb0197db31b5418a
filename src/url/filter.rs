use regex::Regex;
use url::Url;

/// The boundary of a crawl: the host it is pinned to and the accept/reject
/// patterns that trim it further.
///
/// Patterns are regular expressions matched unanchored against the URL's
/// full string form. Rejects take precedence over accepts; an empty accept
/// list accepts every same-host URL that is not rejected.
#[derive(Debug, Clone)]
pub struct CrawlScope {
    /// The host being crawled
    pub host: Url,

    /// Patterns a URL must match to be crawled (empty means "any")
    pub accept: Vec<Regex>,

    /// Patterns that exclude a URL from the crawl
    pub reject: Vec<Regex>,
}

impl CrawlScope {
    /// Creates a scope for `host` with the given pattern lists.
    pub fn new(host: Url, accept: Vec<Regex>, reject: Vec<Regex>) -> Self {
        Self {
            host,
            accept,
            reject,
        }
    }

    /// Returns whether `url` belongs to this crawl.
    pub fn accept(&self, url: &Url) -> bool {
        accept(url, &self.host, &self.reject, &self.accept)
    }
}

/// Decides whether a URL belongs to a crawl of `host`.
///
/// A URL is accepted when it is on the same host (including port), no
/// reject pattern matches it, and either the accept list is empty or at
/// least one accept pattern matches. The function is pure.
pub fn accept(url: &Url, host: &Url, reject: &[Regex], accept: &[Regex]) -> bool {
    if url.host_str() != host.host_str() || url.port_or_known_default() != host.port_or_known_default()
    {
        return false;
    }

    let candidate = url.as_str();
    if reject.iter().any(|pattern| pattern.is_match(candidate)) {
        return false;
    }
    if accept.is_empty() {
        return true;
    }
    accept.iter().any(|pattern| pattern.is_match(candidate))
}
