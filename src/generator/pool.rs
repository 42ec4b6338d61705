//! Worker pool for candidate searches.
//!
//! Generations are spread over a rayon pool sized by the configured worker
//! count, one search each. Results are collected in generation order, so
//! the output never depends on thread timing. Workers share only
//! read-only problem data.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

/// Cooperative cancellation flag shared with a running optimization.
///
/// # Example
/// ```
/// use timetable_optimizer::generator::CancelToken;
///
/// let token = CancelToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Running searches return their partial result.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Deadline plus cancellation, checked between search steps.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StopSignal<'a> {
    deadline: Instant,
    cancel: &'a CancelToken,
}

impl<'a> StopSignal<'a> {
    pub fn new(deadline: Instant, cancel: &'a CancelToken) -> Self {
        Self { deadline, cancel }
    }

    #[inline]
    pub fn should_stop(&self) -> bool {
        self.cancel.is_cancelled() || Instant::now() >= self.deadline
    }
}

/// Runs `job` for every index in `jobs` on a pool of up to `workers`
/// threads.
///
/// Indices not started before the stop signal fires are skipped. The
/// returned pairs are in index order.
pub(crate) fn run_indexed<T, F>(
    jobs: Range<usize>,
    workers: usize,
    stop: &StopSignal<'_>,
    job: F,
) -> Vec<(usize, T)>
where
    T: Send,
    F: Fn(usize) -> T + Sync,
{
    if jobs.is_empty() {
        return Vec::new();
    }
    let run = |i: usize| (!stop.should_stop()).then(|| (i, job(i)));

    let workers = workers.clamp(1, jobs.len());
    if workers == 1 {
        return jobs.filter_map(run).collect();
    }

    match ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(|| jobs.into_par_iter().filter_map(run).collect()),
        Err(e) => {
            tracing::warn!(error = %e, "worker pool unavailable; searching sequentially");
            jobs.filter_map(run).collect()
        }
    }
}
