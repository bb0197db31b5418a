//! End-to-end tests for the crawl engine
//!
//! These tests serve a small site from a wiremock server and run the full
//! engine against it: seeds in, pages fetched, links extracted, callback
//! invoked, clean shutdown out.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sumi_weir::config::CrawlConfig;
use sumi_weir::crawler::{Engine, ParseCallback};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// The fixture: four index pages each linking five pages, and forty pages
/// cross-linking each other in pairs, so every page is discoverable from
/// the indices.
async fn mount_site(server: &MockServer) {
    let base = server.uri();

    for i in 0..4 {
        let body: String = (0..5)
            .map(|j| {
                let n = i * 5 + j;
                format!("<a href=\"{base}/page{n:04}\">page{n:04}</a>\n")
            })
            .collect();
        mount_page(server, &format!("/index{i:04}"), body).await;
    }

    for n in 0..40usize {
        let partner = if n < 20 { n + 20 } else { n - 20 };
        let body = format!(
            r#"<html><head><title>page {n}</title></head>
<body>
    <a href="{base}/page{partner:04}">page{partner:04}</a>
    <a href="{base}/page{partner:04}">page{partner:04}</a>

    <a href="http://example.org">example.org</a>
    <a href="http://elsewhere.test">elsewhere</a>
</body>
</html>
"#
        );
        mount_page(server, &format!("/page{n:04}"), body).await;
    }
}

async fn mount_page(server: &MockServer, path_str: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(path_str))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn collecting_callback() -> (ParseCallback, Arc<Mutex<Vec<String>>>) {
    let visited = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&visited);
    let callback: ParseCallback = Arc::new(move |url, _document, _body| {
        seen.lock().unwrap().push(url.to_string());
        Ok(())
    });
    (callback, visited)
}

fn as_set(visited: &Arc<Mutex<Vec<String>>>) -> HashSet<String> {
    visited.lock().unwrap().iter().cloned().collect()
}

fn seed_urls(base: &str) -> Vec<Url> {
    (0..4)
        .map(|i| Url::parse(&format!("{base}/index{i:04}")).unwrap())
        .collect()
}

async fn wait_done(engine: &Engine) {
    tokio::time::timeout(Duration::from_secs(10), engine.done())
        .await
        .expect("crawl did not finish in time");
}

#[tokio::test]
async fn test_full_crawl_covers_every_page() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let base = server.uri();

    let config = CrawlConfig {
        host: base.clone(),
        accept: vec![base.clone()],
        ttl_ms: 50,
        workers: 5,
        ..CrawlConfig::default()
    };
    let plan = config.resolve().unwrap();

    let (callback, visited) = collecting_callback();
    let engine = Engine::new(plan, Some(callback)).await.unwrap();
    engine.start(None, &seed_urls(&base)).await.unwrap();
    wait_done(&engine).await;

    let mut want = HashSet::new();
    for i in 0..4 {
        want.insert(format!("{base}/index{i:04}"));
    }
    for n in 0..40 {
        want.insert(format!("{base}/page{n:04}"));
    }

    assert_eq!(as_set(&visited), want, "crawl should cover all 44 unique pages");
    // Dedup guarantees each page is fetched exactly once.
    assert_eq!(visited.lock().unwrap().len(), 44);
}

#[tokio::test]
async fn test_enqueue_cap_stops_the_crawl() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let base = server.uri();

    let config = CrawlConfig {
        host: base.clone(),
        accept: vec![base.clone()],
        max_enqueue: 3,
        ttl_ms: 50,
        workers: 5,
        ..CrawlConfig::default()
    };
    let plan = config.resolve().unwrap();

    let (callback, visited) = collecting_callback();
    let engine = Engine::new(plan, Some(callback)).await.unwrap();
    engine.start(None, &seed_urls(&base)).await.unwrap();
    wait_done(&engine).await;

    let mut want = HashSet::new();
    for i in 0..3 {
        want.insert(format!("{base}/index{i:04}"));
    }

    assert_eq!(
        as_set(&visited),
        want,
        "only the first three seeds fit under the cap"
    );
}

#[tokio::test]
async fn test_enqueue_cap_ignores_duplicate_links() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let base = server.uri();

    // Every fixture page links its partner twice, so the crawl rediscovers
    // duplicates constantly; only unique admissions may count toward the
    // cap.
    let config = CrawlConfig {
        host: base.clone(),
        accept: vec![base.clone()],
        max_enqueue: 10,
        ttl_ms: 50,
        workers: 5,
        ..CrawlConfig::default()
    };
    let plan = config.resolve().unwrap();

    let (callback, visited) = collecting_callback();
    let engine = Engine::new(plan, Some(callback)).await.unwrap();
    engine.start(None, &seed_urls(&base)).await.unwrap();
    wait_done(&engine).await;

    assert_eq!(
        as_set(&visited).len(),
        10,
        "the cap admits exactly ten unique pages"
    );
    assert_eq!(visited.lock().unwrap().len(), 10, "each page visited once");
}

#[tokio::test]
async fn test_idle_engine_shuts_down_cleanly() {
    let server = MockServer::start().await;
    let base = server.uri();

    let config = CrawlConfig {
        host: base.clone(),
        ttl_ms: 2,
        workers: 8,
        ..CrawlConfig::default()
    };
    let plan = config.resolve().unwrap();

    let (callback, visited) = collecting_callback();
    let engine = Engine::new(plan, Some(callback)).await.unwrap();
    engine.start(None, &[]).await.unwrap();
    wait_done(&engine).await;

    assert!(visited.lock().unwrap().is_empty());

    // The frontier closed itself on idle; explicit closes still follow the
    // once-only contract.
    assert!(engine.close().await.is_ok());
    assert!(engine.close().await.is_err());
}

#[tokio::test]
async fn test_least_loaded_dispatch_covers_every_page() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let base = server.uri();

    let config = CrawlConfig {
        host: base.clone(),
        accept: vec![base.clone()],
        ttl_ms: 50,
        workers: 5,
        dispatch: sumi_weir::config::DispatchMode::LeastLoaded,
        ..CrawlConfig::default()
    };
    let plan = config.resolve().unwrap();

    let (callback, visited) = collecting_callback();
    let engine = Engine::new(plan, Some(callback)).await.unwrap();
    engine.start(None, &seed_urls(&base)).await.unwrap();
    wait_done(&engine).await;

    assert_eq!(as_set(&visited).len(), 44);
}

#[tokio::test]
async fn test_robots_disallow_is_honored() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /admin"))
        .mount(&server)
        .await;

    mount_page(
        &server,
        "/",
        format!(
            r#"<html><body>
            <a href="{base}/allowed">allowed</a>
            <a href="{base}/admin">admin</a>
        </body></html>"#
        ),
    )
    .await;
    mount_page(&server, "/allowed", "<html><body>fine</body></html>".to_string()).await;

    // The crawler must never ask for the disallowed page.
    Mock::given(method("GET"))
        .and(path("/admin"))
        .respond_with(ResponseTemplate::new(200).set_body_string("secret"))
        .expect(0)
        .mount(&server)
        .await;

    let config = CrawlConfig {
        host: base.clone(),
        ttl_ms: 50,
        workers: 2,
        ..CrawlConfig::default()
    };
    let plan = config.resolve().unwrap();

    let (callback, visited) = collecting_callback();
    let engine = Engine::new(plan, Some(callback)).await.unwrap();
    let root = Url::parse(&format!("{base}/")).unwrap();
    engine.start(None, &[root]).await.unwrap();
    wait_done(&engine).await;

    let got = as_set(&visited);
    assert!(got.contains(&format!("{base}/")));
    assert!(got.contains(&format!("{base}/allowed")));
    assert!(!got.contains(&format!("{base}/admin")));
}

#[tokio::test]
async fn test_sitemap_seeds_the_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    let sitemap_xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>{base}/from-sitemap-a</loc></url>
  <url><loc>{base}/from-sitemap-b</loc></url>
</urlset>"#
    );
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(sitemap_xml)
                .insert_header("content-type", "application/xml"),
        )
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/from-sitemap-a",
        "<html><body>a</body></html>".to_string(),
    )
    .await;
    mount_page(
        &server,
        "/from-sitemap-b",
        "<html><body>b</body></html>".to_string(),
    )
    .await;

    let config = CrawlConfig {
        host: base.clone(),
        ttl_ms: 50,
        workers: 2,
        ..CrawlConfig::default()
    };
    let plan = config.resolve().unwrap();

    let (callback, visited) = collecting_callback();
    let engine = Engine::new(plan, Some(callback)).await.unwrap();
    let sitemap = Url::parse(&format!("{base}/sitemap.xml")).unwrap();
    engine.start(Some(sitemap), &[]).await.unwrap();
    wait_done(&engine).await;

    let got = as_set(&visited);
    assert!(got.contains(&format!("{base}/from-sitemap-a")));
    assert!(got.contains(&format!("{base}/from-sitemap-b")));
}

#[tokio::test]
async fn test_close_drains_accepted_work() {
    let server = MockServer::start().await;
    let base = server.uri();
    for i in 0..6 {
        mount_page(
            &server,
            &format!("/leaf{i}"),
            "<html><body>leaf</body></html>".to_string(),
        )
        .await;
    }

    let config = CrawlConfig {
        host: base.clone(),
        ttl_ms: 5_000,
        workers: 2,
        ..CrawlConfig::default()
    };
    let plan = config.resolve().unwrap();

    let (callback, visited) = collecting_callback();
    let engine = Engine::new(plan, Some(callback)).await.unwrap();

    let seeds: Vec<Url> = (0..6)
        .map(|i| Url::parse(&format!("{base}/leaf{i}")).unwrap())
        .collect();
    engine.start(None, &seeds).await.unwrap();
    engine.close().await.unwrap();
    wait_done(&engine).await;

    // Everything accepted before the close is still fetched.
    assert_eq!(visited.lock().unwrap().len(), 6);
}
