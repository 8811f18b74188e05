//! Scheduler for bounding the number of in-flight fetches
//!
//! This module handles:
//! - A FIFO queue of requests waiting for a fetch slot
//! - Promotion of queued requests into active jobs, never exceeding `max_calls`
//! - Fan-in over every active job, surfacing results in completion order
//!
//! The scheduler knows nothing about HTML, status codes or crawl policy. It
//! only ferries [`FetchResult`] values, error payloads included.

use crate::crawler::fetcher::{Fetch, FetchError, FetchedPage};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};
use tokio::task::JoinHandle;

/// One page to retrieve, with the BFS depth it was discovered at
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    /// Absolute URL to fetch
    pub url: String,

    /// Depth from the seed (the seed is depth 0)
    pub depth: u32,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// The outcome of one fetch, handed to whoever called [`Scheduler::next`]
#[derive(Debug)]
pub struct FetchResult {
    /// The request that produced this result
    pub request: FetchRequest,

    /// Either the response or the reason there is none
    pub outcome: Result<FetchedPage, FetchError>,
}

/// An in-flight fetch occupying one concurrency slot
///
/// Resolves to a [`FetchResult`] even if the fetch task panics, so a
/// dispatched request is never lost. Dropping the job aborts the task.
struct ActiveJob {
    request: FetchRequest,
    handle: JoinHandle<Result<FetchedPage, FetchError>>,
}

impl Future for ActiveJob {
    type Output = FetchResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let outcome = match ready!(Pin::new(&mut self.handle).poll(cx)) {
            Ok(outcome) => outcome,
            Err(e) => Err(FetchError::Aborted(e.to_string())),
        };

        Poll::Ready(FetchResult {
            request: self.request.clone(),
            outcome,
        })
    }
}

impl Drop for ActiveJob {
    fn drop(&mut self) {
        // No-op once the task has finished
        self.handle.abort();
    }
}

/// Scheduler admits requests and bounds concurrent fetches
///
/// Requests are admitted in FIFO order; results come back in whatever order
/// the fetches finish. Every enqueued request yields exactly one result
/// unless the scheduler is dropped first, in which case outstanding jobs
/// are aborted and their results discarded.
///
/// There is no per-job timeout here. A fetch that never completes keeps its
/// slot for the lifetime of the scheduler.
pub struct Scheduler {
    /// Performs the actual network fetch inside each job
    fetcher: Arc<dyn Fetch>,

    /// Upper bound on active jobs
    max_calls: usize,

    /// Requests waiting for a slot
    pending: VecDeque<FetchRequest>,

    /// In-flight jobs, unordered
    active: FuturesUnordered<ActiveJob>,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Performs the fetch for each active job
    /// * `max_calls` - Maximum number of simultaneously active jobs (at least 1)
    pub fn new(fetcher: Arc<dyn Fetch>, max_calls: usize) -> Self {
        Self {
            fetcher,
            max_calls: max_calls.max(1),
            pending: VecDeque::new(),
            active: FuturesUnordered::new(),
        }
    }

    /// Appends a request to the pending queue and promotes queued work
    ///
    /// Never blocks. Promotion spawns tasks, so this must be called from
    /// within a tokio runtime.
    pub fn enqueue(&mut self, request: FetchRequest) {
        tracing::trace!("Enqueue {} (depth {})", request.url, request.depth);
        self.pending.push_back(request);
        self.promote();
    }

    /// Waits for the next active job to complete
    ///
    /// # Returns
    ///
    /// * `Some(FetchResult)` - The first job to finish among all active jobs
    /// * `None` - Nothing is pending or active; returned immediately
    pub async fn next(&mut self) -> Option<FetchResult> {
        if self.is_idle() {
            return None;
        }

        let result = self.active.next().await?;
        tracing::trace!(
            "Completed {} ({} active, {} pending)",
            result.request.url,
            self.active.len(),
            self.pending.len()
        );

        self.promote();
        Some(result)
    }

    /// Moves requests from the head of the queue into free slots
    fn promote(&mut self) {
        while self.active.len() < self.max_calls {
            let Some(request) = self.pending.pop_front() else {
                break;
            };
            self.dispatch(request);
        }
    }

    /// Starts a fetch as an independent task
    fn dispatch(&mut self, request: FetchRequest) {
        let fetcher = Arc::clone(&self.fetcher);
        let url = request.url.clone();
        let handle = tokio::spawn(async move { fetcher.fetch(&url).await });

        tracing::debug!("Dispatched {} (depth {})", request.url, request.depth);
        self.active.push(ActiveJob { request, handle });
    }

    /// Returns the number of in-flight jobs
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Returns the number of requests waiting for a slot
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true when there is neither pending nor active work
    pub fn is_idle(&self) -> bool {
        self.active.is_empty() && self.pending.is_empty()
    }

    /// Returns the concurrency limit
    pub fn max_calls(&self) -> usize {
        self.max_calls
    }
}
