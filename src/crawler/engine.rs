//! Engine lifecycle
//!
//! `Engine::new` wires the whole machine together: it builds the HTTP
//! client, fetches the robots policy, opens the frontier, and spawns the
//! workers and the dispatcher. `start` feeds in the sitemap entries and
//! seeds, `done` resolves once the crawl has fully shut down, and `close`
//! asks the frontier to wind down early.

use std::sync::Arc;

use reqwest::Client;
use tokio::sync::{mpsc, watch};
use url::Url;

use super::dispatcher::{Discipline, WorkerPool};
use super::fetcher::{build_http_client, Fetch, HttpFetcher};
use super::frontier::Frontier;
use super::worker::{ParseCallback, Worker, INBOX_CAPACITY};
use crate::config::CrawlPlan;
use crate::robots::RobotsPolicy;
use crate::{sitemap, PushError, Result};

/// A running crawl.
///
/// Dropping the engine does not stop the crawl; call [`Engine::close`] for
/// an early, graceful shutdown, and await [`Engine::done`] for completion.
pub struct Engine {
    frontier: Arc<Frontier>,
    client: Client,
    user_agent: String,
    done: watch::Receiver<bool>,
}

impl Engine {
    /// Builds an engine from a resolved crawl plan.
    ///
    /// Fetches the host's robots.txt once; when that fails the crawl
    /// proceeds with a permissive policy. Workers and the dispatcher are
    /// spawned immediately and sit idle until [`Engine::start`] pushes the
    /// first URLs.
    pub async fn new(plan: CrawlPlan, callback: Option<ParseCallback>) -> Result<Engine> {
        let client = build_http_client(&plan.user_agent)?;
        let robots = RobotsPolicy::fetch(&client, &plan.scope.host, &plan.robots_agent).await;
        let fetcher: Arc<dyn Fetch> = Arc::new(HttpFetcher::new(client.clone(), robots));
        Ok(Self::assemble(plan, client, fetcher, callback))
    }

    /// Builds an engine around a caller-supplied fetcher.
    ///
    /// The robots handling, if any, is the fetcher's business here; the
    /// HTTP client is still built for the startup sitemap request.
    pub fn with_fetcher(
        plan: CrawlPlan,
        fetcher: Arc<dyn Fetch>,
        callback: Option<ParseCallback>,
    ) -> Result<Engine> {
        let client = build_http_client(&plan.user_agent)?;
        Ok(Self::assemble(plan, client, fetcher, callback))
    }

    fn assemble(
        plan: CrawlPlan,
        client: Client,
        fetcher: Arc<dyn Fetch>,
        callback: Option<ParseCallback>,
    ) -> Engine {
        let (frontier, pop) = Frontier::open(plan.max_enqueue, plan.ttl);
        let scope = Arc::new(plan.scope);
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        let mut inboxes = Vec::with_capacity(plan.workers);
        let mut handles = Vec::with_capacity(plan.workers);
        for id in 0..plan.workers {
            let (inbox_tx, inbox_rx) = mpsc::channel(INBOX_CAPACITY);
            let worker = Worker {
                id,
                inbox: inbox_rx,
                frontier: Arc::clone(&frontier),
                fetcher: Arc::clone(&fetcher),
                scope: Arc::clone(&scope),
                callback: callback.clone(),
                delay: plan.delay,
                completions: completion_tx.clone(),
            };
            handles.push(tokio::spawn(worker.run()));
            inboxes.push(inbox_tx);
        }
        drop(completion_tx);

        let (done_tx, done_rx) = watch::channel(false);
        let discipline = Discipline::for_mode(plan.dispatch, plan.workers);
        let pool = WorkerPool::new(inboxes, discipline, completion_rx, handles, done_tx);
        tokio::spawn(pool.run(pop));

        tracing::info!(
            host = %scope.host,
            workers = plan.workers,
            max_enqueue = plan.max_enqueue,
            ttl = ?plan.ttl,
            "crawl engine ready"
        );

        Engine {
            frontier,
            client,
            user_agent: plan.user_agent,
            done: done_rx,
        }
    }

    /// Bootstraps the crawl with an optional sitemap and the seed URLs.
    ///
    /// Sitemap entries are pushed before the seeds, in document order. A
    /// sitemap that cannot be fetched or parsed is logged and skipped, and
    /// individual push rejections (duplicates, limit, closed queue) are
    /// logged and skipped too; none of them fail the call.
    pub async fn start(&self, sitemap: Option<Url>, seeds: &[Url]) -> Result<()> {
        if let Some(sitemap_url) = sitemap {
            match sitemap::get(&self.client, &sitemap_url, &self.user_agent).await {
                Ok(entries) => {
                    tracing::info!(sitemap = %sitemap_url, entries = entries.len(), "sitemap loaded");
                    for url in entries {
                        self.push_startup_url(url, "sitemap entry").await;
                    }
                }
                Err(e) => {
                    tracing::warn!(sitemap = %sitemap_url, error = %e, "sitemap unavailable");
                }
            }
        }

        for seed in seeds {
            self.push_startup_url(seed.clone(), "seed").await;
        }
        Ok(())
    }

    async fn push_startup_url(&self, url: Url, kind: &'static str) {
        if let Err(e) = self.frontier.push(url.clone()).await {
            tracing::warn!(url = %url, error = %e, kind, "startup URL not enqueued");
        }
    }

    /// Waits until the crawl has fully shut down.
    ///
    /// Resolves strictly after the frontier has closed and drained, every
    /// worker has finished its last URL and exited, and the dispatcher has
    /// wound down. Any number of callers may wait concurrently.
    pub async fn done(&self) {
        let mut done = self.done.clone();
        // An error means the dispatcher is gone, which only happens after
        // it fired the signal or the runtime is tearing down.
        let _ = done.wait_for(|finished| *finished).await;
    }

    /// Closes the frontier, beginning a graceful shutdown.
    ///
    /// URLs already accepted still drain to the workers; `done` fires once
    /// they are processed. Returns [`PushError::Closed`] when called more
    /// than once.
    pub async fn close(&self) -> std::result::Result<(), PushError> {
        self.frontier.close().await
    }
}
