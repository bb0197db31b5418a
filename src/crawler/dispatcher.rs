//! Dispatching popped URLs onto workers
//!
//! The dispatcher is the sole consumer of the frontier's output channel.
//! Two selection disciplines implement the same contract: round-robin
//! (cheap, the default) and least-loaded (a small binary heap over pending
//! counts with a position table, re-sorted as workers report completions).
//!
//! Shutdown order is load-bearing: the frontier's output must close first,
//! then the worker inboxes, then the pool waits for every worker to finish
//! its current URL before the done signal fires. Closing inboxes any
//! earlier would strand workers mid-push; skipping the wait would drop
//! in-flight work.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use url::Url;

use crate::config::DispatchMode;

/// Worker selection discipline.
pub enum Discipline {
    /// Cycle through workers in index order.
    RoundRobin { next: usize, count: usize },

    /// Pick the worker with the fewest URLs in flight.
    LeastLoaded { pool: PendingHeap },
}

impl Discipline {
    /// Creates the discipline for `mode` over `count` workers.
    pub fn for_mode(mode: DispatchMode, count: usize) -> Self {
        match mode {
            DispatchMode::RoundRobin => Discipline::RoundRobin { next: 0, count },
            DispatchMode::LeastLoaded => Discipline::LeastLoaded {
                pool: PendingHeap::new(count),
            },
        }
    }

    /// Picks the worker for the next URL and records the dispatch.
    pub fn select_worker(&mut self) -> usize {
        match self {
            Discipline::RoundRobin { next, count } => {
                let id = *next;
                *next = (*next + 1) % *count;
                id
            }
            Discipline::LeastLoaded { pool } => pool.take_least(),
        }
    }

    /// Records that worker `id` finished a URL.
    pub fn complete(&mut self, id: usize) {
        match self {
            Discipline::RoundRobin { .. } => {}
            Discipline::LeastLoaded { pool } => pool.complete(id),
        }
    }
}

/// A minimum binary heap of workers keyed by pending URL count.
///
/// `position` maps a worker id to its slot index so completions can re-sift
/// the right slot without scanning.
pub struct PendingHeap {
    slots: Vec<Slot>,
    position: Vec<usize>,
}

#[derive(Clone, Copy)]
struct Slot {
    id: usize,
    pending: u64,
}

impl PendingHeap {
    fn new(count: usize) -> Self {
        Self {
            slots: (0..count).map(|id| Slot { id, pending: 0 }).collect(),
            position: (0..count).collect(),
        }
    }

    /// Returns the least-loaded worker and counts the new dispatch.
    fn take_least(&mut self) -> usize {
        let id = self.slots[0].id;
        self.slots[0].pending += 1;
        self.sift_down(0);
        id
    }

    /// Decrements a worker's pending count and restores heap order.
    fn complete(&mut self, id: usize) {
        let Some(&index) = self.position.get(id) else {
            return;
        };
        let slot = &mut self.slots[index];
        slot.pending = slot.pending.saturating_sub(1);
        self.sift_up(index);
    }

    fn sift_down(&mut self, mut index: usize) {
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut smallest = index;
            if left < self.slots.len() && self.slots[left].pending < self.slots[smallest].pending {
                smallest = left;
            }
            if right < self.slots.len() && self.slots[right].pending < self.slots[smallest].pending
            {
                smallest = right;
            }
            if smallest == index {
                return;
            }
            self.swap(index, smallest);
            index = smallest;
        }
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.slots[parent].pending <= self.slots[index].pending {
                return;
            }
            self.swap(index, parent);
            index = parent;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.slots.swap(a, b);
        self.position[self.slots[a].id] = a;
        self.position[self.slots[b].id] = b;
    }
}

/// The worker pool plus the dispatch loop that feeds it.
pub(crate) struct WorkerPool {
    inboxes: Vec<mpsc::Sender<Url>>,
    discipline: Discipline,
    completions: mpsc::UnboundedReceiver<usize>,
    handles: Vec<JoinHandle<()>>,
    done: watch::Sender<bool>,
}

impl WorkerPool {
    pub(crate) fn new(
        inboxes: Vec<mpsc::Sender<Url>>,
        discipline: Discipline,
        completions: mpsc::UnboundedReceiver<usize>,
        handles: Vec<JoinHandle<()>>,
        done: watch::Sender<bool>,
    ) -> Self {
        Self {
            inboxes,
            discipline,
            completions,
            handles,
            done,
        }
    }

    /// Consumes the frontier output until it closes, then runs the
    /// shutdown sequence and fires the done signal.
    pub(crate) async fn run(self, mut pop: mpsc::Receiver<Url>) {
        let WorkerPool {
            inboxes,
            mut discipline,
            mut completions,
            handles,
            done,
        } = self;

        loop {
            tokio::select! {
                popped = pop.recv() => match popped {
                    Some(url) => dispatch(&inboxes, &mut discipline, url).await,
                    None => break,
                },
                Some(id) = completions.recv() => discipline.complete(id),
            }
        }

        // The frontier output is closed and fully drained. Close every
        // inbox, wait for the workers to finish their current URL, then
        // signal completion.
        drop(inboxes);
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "worker task failed");
            }
        }
        tracing::debug!("worker pool drained, crawl done");
        let _ = done.send(true);
    }
}

async fn dispatch(inboxes: &[mpsc::Sender<Url>], discipline: &mut Discipline, url: Url) {
    let id = discipline.select_worker();
    if inboxes[id].send(url).await.is_err() {
        tracing::error!(worker = id, "worker inbox closed before shutdown");
    }
}
