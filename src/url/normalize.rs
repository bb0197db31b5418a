use url::Url;

/// Resolves a raw `href` against its parent URL.
///
/// # Resolution Rules
///
/// Applied in order:
///
/// 1. If `href` already parses as an absolute URL, it is returned verbatim.
/// 2. Surrounding whitespace is stripped.
/// 3. `#fragment` links resolve against the parent's host and path.
/// 4. `//host/path` links inherit the parent's scheme.
/// 5. `/path` links resolve against the parent's host.
/// 6. Anything else is path-relative: it is joined below the parent's
///    cleaned path.
/// 7. The composed string is reparsed, which canonicalizes it.
///
/// # Arguments
///
/// * `parent` - The absolute URL of the page the href was found on
/// * `href` - The raw attribute value
///
/// # Returns
///
/// * `Ok(Url)` - The resolved absolute URL
/// * `Err(url::ParseError)` - The composed URL could not be parsed
pub fn normalize(parent: &Url, href: &str) -> Result<Url, url::ParseError> {
    if let Ok(absolute) = Url::parse(href) {
        return Ok(absolute);
    }

    let href = href.trim();
    let composed = if href.starts_with('#') {
        format!(
            "{}://{}{}",
            parent.scheme(),
            join(&authority(parent), parent.path()),
            href
        )
    } else if href.starts_with("//") {
        format!("{}:{}", parent.scheme(), href)
    } else if href.starts_with('/') {
        format!("{}://{}{}", parent.scheme(), authority(parent), href)
    } else {
        format!(
            "{}://{}/{}",
            parent.scheme(),
            join(&authority(parent), parent.path()),
            href
        )
    };

    Url::parse(&composed)
}

/// Derives the frontier's deduplication key from a URL.
///
/// The key is the cleaned path plus the raw query, with an empty path
/// mapping to `/`. Scheme, host and fragment are deliberately excluded: the
/// crawl is single-host, so the path and query identify a page, and
/// fragments are in-page anchors. URLs without a host produce an empty key.
pub fn dedup_key(url: &Url) -> String {
    if !url.has_host() {
        return String::new();
    }

    let mut name = url.path().to_string();
    if name == "." {
        name.clear();
    }
    if name.len() > 1 {
        name = clean_path(&name);
    }
    if !name.is_empty() && !name.starts_with('/') {
        name.insert(0, '/');
    }
    if name.is_empty() {
        name.push('/');
    }

    if let Some(query) = url.query() {
        if !query.is_empty() {
            name.push('?');
            name.push_str(query);
        }
    }
    name
}

/// Returns `host` or `host:port` for composing URL strings.
fn authority(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// Joins a host authority with a cleaned path.
///
/// Leading slashes are trimmed from `path`; an empty or `.` remainder
/// leaves just the authority.
fn join(authority: &str, path: &str) -> String {
    let name = path.trim_start_matches('/');
    if name.is_empty() || name == "." {
        return authority.to_string();
    }
    let cleaned = clean_path(name);
    if cleaned.is_empty() || cleaned == "." {
        return authority.to_string();
    }
    format!("{}/{}", authority, cleaned)
}

/// Lexically cleans a path: collapses `.` segments, resolves `..` segments
/// and removes redundant separators. A rooted input stays rooted.
pub(crate) fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                if !segments.is_empty() && segments.last() != Some(&"..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            _ => segments.push(segment),
        }
    }

    let joined = segments.join("/");
    if rooted {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parent() -> Url {
        Url::parse("http://example.com/docs/guide").unwrap()
    }

    #[test]
    fn test_absolute_href_passthrough() {
        let result = normalize(&parent(), "https://other.org/page?x=1").unwrap();
        assert_eq!(result.as_str(), "https://other.org/page?x=1");
    }

    #[test]
    fn test_normalize_parent_string_is_identity() {
        let base = parent();
        let result = normalize(&base, base.as_str()).unwrap();
        assert_eq!(result, base);
    }

    #[test]
    fn test_fragment_href() {
        let result = normalize(&parent(), "#section").unwrap();
        assert_eq!(result.fragment(), Some("section"));
        assert_eq!(result.host_str(), Some("example.com"));
        assert_eq!(result.path(), "/docs/guide");
    }

    #[test]
    fn test_scheme_relative_href() {
        let result = normalize(&parent(), "//cdn.example.net/lib.js").unwrap();
        assert_eq!(result.host_str(), Some("cdn.example.net"));
        assert_eq!(result.scheme(), "http");
    }

    #[test]
    fn test_root_relative_href() {
        let result = normalize(&parent(), "/about").unwrap();
        assert_eq!(result.as_str(), "http://example.com/about");
    }

    #[test]
    fn test_path_relative_href() {
        let result = normalize(&parent(), "chapter1").unwrap();
        assert_eq!(result.as_str(), "http://example.com/docs/guide/chapter1");
    }

    #[test]
    fn test_path_relative_href_from_root() {
        let base = Url::parse("http://example.com/").unwrap();
        let result = normalize(&base, "page").unwrap();
        assert_eq!(result.as_str(), "http://example.com/page");
    }

    #[test]
    fn test_preserves_port() {
        let base = Url::parse("http://127.0.0.1:8080/index").unwrap();
        let result = normalize(&base, "/page0001").unwrap();
        assert_eq!(result.as_str(), "http://127.0.0.1:8080/page0001");
    }

    #[test]
    fn test_whitespace_trimmed() {
        let result = normalize(&parent(), "  /about  ").unwrap();
        assert_eq!(result.as_str(), "http://example.com/about");
    }

    #[test]
    fn test_key_ignores_fragment() {
        let base = parent();
        let plain = normalize(&base, "/a/b").unwrap();
        let tagged = normalize(&base, "/a/b#part-2").unwrap();
        assert_eq!(dedup_key(&plain), dedup_key(&tagged));
    }

    #[test]
    fn test_key_ignores_host_and_scheme() {
        let a = Url::parse("http://one.example/a?x=1").unwrap();
        let b = Url::parse("https://two.example/a?x=1").unwrap();
        assert_eq!(dedup_key(&a), dedup_key(&b));
    }

    #[test]
    fn test_key_keeps_query() {
        let a = Url::parse("http://h/a").unwrap();
        let b = Url::parse("http://h/a?x=1").unwrap();
        assert_eq!(dedup_key(&a), "/a");
        assert_eq!(dedup_key(&b), "/a?x=1");
    }

    #[test]
    fn test_key_empty_path_is_root() {
        let url = Url::parse("http://example.com").unwrap();
        assert_eq!(dedup_key(&url), "/");
    }

    #[test]
    fn test_key_collapses_dot_segments() {
        let a = Url::parse("http://h/a/../b/./c").unwrap();
        let b = Url::parse("http://h/b/c").unwrap();
        assert_eq!(dedup_key(&a), dedup_key(&b));
    }

    #[test]
    fn test_key_trailing_slash_equivalence() {
        let a = Url::parse("http://h/a/").unwrap();
        let b = Url::parse("http://h/a").unwrap();
        assert_eq!(dedup_key(&a), dedup_key(&b));
    }

    #[test]
    fn test_key_hostless_url_is_empty() {
        let url = Url::parse("mailto:me@example.com").unwrap();
        assert_eq!(dedup_key(&url), "");
    }

    #[test]
    fn test_clean_path_rooted() {
        assert_eq!(clean_path("/a/b/../c"), "/a/c");
        assert_eq!(clean_path("/a//b///c"), "/a/b/c");
        assert_eq!(clean_path("/./a/./"), "/a");
        assert_eq!(clean_path("/../a"), "/a");
        assert_eq!(clean_path("/"), "/");
    }

    #[test]
    fn test_clean_path_relative() {
        assert_eq!(clean_path("a/b/../c"), "a/c");
        assert_eq!(clean_path("../a"), "../a");
        assert_eq!(clean_path("./"), ".");
    }
}
