use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::{header, Client, StatusCode};
use url::Url;

use crate::SitemapError;

/// Fetches a sitemap and returns its page URLs in document order.
///
/// The request carries `agent` as its user agent. Entries whose `<loc>`
/// does not parse as a URL are skipped with a log line.
pub async fn get(client: &Client, url: &Url, agent: &str) -> Result<Vec<Url>, SitemapError> {
    let response = client
        .get(url.clone())
        .header(header::USER_AGENT, agent)
        .send()
        .await?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(SitemapError::Status(status));
    }

    let body = response.bytes().await?;
    parse_urlset(&body)
}

/// Extracts the `<url><loc>` entries of a `<urlset>` document.
fn parse_urlset(xml: &[u8]) -> Result<Vec<Url>, SitemapError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut entries = Vec::new();
    let mut in_url = false;
    let mut in_loc = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"url" => in_url = true,
                b"loc" if in_url => in_loc = true,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"url" => in_url = false,
                b"loc" => in_loc = false,
                _ => {}
            },
            Event::Text(text) if in_loc => {
                let loc = text.unescape()?;
                let loc = loc.trim();
                match Url::parse(loc) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => {
                        tracing::debug!(loc, error = %e, "skipping invalid sitemap entry");
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(entries)
}
