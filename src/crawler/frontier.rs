//! The frontier queue
//!
//! The frontier is four things in one structure: an unbounded FIFO of URLs
//! yet to crawl, a deduplication index over everything ever pushed, a
//! bounded enqueue counter, and an idle-timeout clock. It is fed by many
//! producers (the workers and the engine's seed push) and drained by one
//! consumer (the dispatcher).
//!
//! Internally a single coordinator task owns the FIFO. Producers reach it
//! through a bounded `in` channel, the dispatcher reads a bounded `out`
//! channel. The push path is serialized under one mutex which also owns the
//! `seen` set and the enqueue counter. There is exactly one closer of `in`
//! (the `close` call, or the push that trips the enqueue limit) and exactly
//! one closer of `out` (the coordinator, after draining the FIFO).

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::time::Instant;
use url::Url;

use crate::url::dedup_key;
use crate::PushError;

/// Capacity of the frontier's `in` and `out` channels.
pub const QUEUE_CAPACITY: usize = 64;

/// Push-side state, serialized under one lock.
struct Gate {
    /// Sender half of the `in` channel; `None` once the queue is closed
    sender: Option<mpsc::Sender<Url>>,

    /// Dedup keys of every URL ever pushed
    seen: HashSet<String>,

    /// URLs admitted onto the FIFO, ever
    enqueued: i64,
}

/// The bounded, deduped, idle-closing FIFO at the center of a crawl.
pub struct Frontier {
    gate: Mutex<Gate>,

    /// Enqueue cap; zero or negative disables the limit
    limit: i64,
}

impl Frontier {
    /// Opens a frontier and returns it with the receiving end of its output
    /// channel. Spawns the coordinator task, so this must be called from
    /// within a tokio runtime.
    ///
    /// `limit` caps the number of URLs admitted over the frontier's
    /// lifetime (0 disables the cap). `ttl` is the producer-silence
    /// timeout: if no push arrives for `ttl`, the frontier closes itself,
    /// drains, and the output channel ends.
    pub fn open(limit: i64, ttl: Duration) -> (Arc<Self>, mpsc::Receiver<Url>) {
        let (in_tx, in_rx) = mpsc::channel(QUEUE_CAPACITY);
        let (out_tx, out_rx) = mpsc::channel(QUEUE_CAPACITY);

        tokio::spawn(coordinate(in_rx, out_tx, ttl));

        let frontier = Arc::new(Self {
            gate: Mutex::new(Gate {
                sender: Some(in_tx),
                seen: HashSet::new(),
                enqueued: 0,
            }),
            limit,
        });
        (frontier, out_rx)
    }

    /// Pushes a URL onto the frontier.
    ///
    /// Returns an error when the queue is closed, the enqueue limit is
    /// reached (which also closes the queue), the URL's dedup key is empty,
    /// or the URL was pushed before. Concurrent pushes are serialized; the
    /// order in which pushes succeed is the order URLs come out the other
    /// end.
    pub async fn push(&self, url: Url) -> Result<(), PushError> {
        let mut gate = self.gate.lock().await;
        if gate.sender.is_none() {
            return Err(PushError::Closed);
        }

        let key = dedup_key(&url);
        if key.is_empty() {
            return Err(PushError::Empty);
        }
        if gate.seen.contains(&key) {
            return Err(PushError::Duplicate);
        }

        // Only admitted URLs count toward the cap; rediscovered duplicates
        // must not burn it down. The push that trips the limit closes the
        // queue.
        if self.limit > 0 && gate.enqueued >= self.limit {
            gate.sender = None;
            return Err(PushError::LimitReached);
        }
        gate.seen.insert(key);
        gate.enqueued += 1;

        // Forward under the lock so push order matches the dedup accounting.
        let Some(sender) = gate.sender.take() else {
            return Err(PushError::Closed);
        };
        if sender.send(url).await.is_err() {
            // The coordinator idled out; leave the queue closed.
            return Err(PushError::Closed);
        }
        gate.sender = Some(sender);
        Ok(())
    }

    /// Closes the frontier.
    ///
    /// The coordinator drains whatever is buffered onto the output channel
    /// and then ends it; nothing already accepted is lost. The first call
    /// returns `Ok`, every later call returns [`PushError::Closed`].
    pub async fn close(&self) -> Result<(), PushError> {
        let mut gate = self.gate.lock().await;
        match gate.sender.take() {
            Some(_) => Ok(()),
            None => Err(PushError::Closed),
        }
    }
}

/// The coordinator loop: sole reader of `in`, sole writer and closer of
/// `out`.
///
/// The idle timer is reset on push arrival only. Pop-side progress does not
/// touch it: the deadline measures producer silence, not consumer
/// idleness. On every termination path the buffer is drained onto `out`
/// before `out` closes.
async fn coordinate(mut in_rx: mpsc::Receiver<Url>, out_tx: mpsc::Sender<Url>, ttl: Duration) {
    let mut buffer: VecDeque<Url> = VecDeque::with_capacity(QUEUE_CAPACITY);
    let idle = tokio::time::sleep(ttl);
    tokio::pin!(idle);

    loop {
        if buffer.is_empty() {
            tokio::select! {
                received = in_rx.recv() => match received {
                    Some(url) => {
                        buffer.push_back(url);
                        idle.as_mut().reset(Instant::now() + ttl);
                    }
                    None => break,
                },
                () = &mut idle => {
                    tracing::debug!("frontier idle for {:?}, closing", ttl);
                    break;
                }
            }
        } else {
            tokio::select! {
                received = in_rx.recv() => match received {
                    Some(url) => {
                        buffer.push_back(url);
                        idle.as_mut().reset(Instant::now() + ttl);
                    }
                    None => break,
                },
                permit = out_tx.reserve() => match permit {
                    Ok(permit) => {
                        if let Some(url) = buffer.pop_front() {
                            permit.send(url);
                        }
                    }
                    // The consumer is gone; there is nothing to drain into.
                    Err(_) => return,
                },
                () = &mut idle => {
                    tracing::debug!("frontier idle for {:?}, closing", ttl);
                    break;
                }
            }
        }
    }

    while let Some(url) = buffer.pop_front() {
        if out_tx.send(url).await.is_err() {
            break;
        }
    }
    // Dropping out_tx here closes the output channel.
}
