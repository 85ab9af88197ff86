//! Runs one retrieval task over many inputs.
//!
//! The output always has one slot per input, in input order. A task that
//! fails, or panics, leaves `None` in its slot and never disturbs its
//! siblings.

use futures::FutureExt;
use std::{fmt::Display, future::Future, panic::AssertUnwindSafe, sync::Arc};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, warn};

/// Run `task` over `inputs`.
///
/// `concurrency <= 1` runs the inputs one after another on the caller's
/// task. Larger values run them on a pool of `min(concurrency, inputs)`
/// concurrently executing tokio tasks.
pub async fn run<I, T, E, F, Fut>(inputs: Vec<I>, task: F, concurrency: usize) -> Vec<Option<T>>
where
    I: Send + 'static,
    T: Send + 'static,
    E: Display + Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    if concurrency <= 1 {
        run_sequential(inputs, task).await
    } else {
        run_pooled(inputs, task, concurrency).await
    }
}

pub async fn run_sequential<I, T, E, F, Fut>(inputs: Vec<I>, task: F) -> Vec<Option<T>>
where
    E: Display,
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let task = &task;
    let mut slots = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.into_iter().enumerate() {
        slots.push(settle(index, async move { task(input).await }).await);
    }
    slots
}

pub async fn run_pooled<I, T, E, F, Fut>(
    inputs: Vec<I>,
    task: F,
    concurrency: usize,
) -> Vec<Option<T>>
where
    I: Send + 'static,
    T: Send + 'static,
    E: Display + Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    let total = inputs.len();
    let pool_size = concurrency.min(total).max(1);
    debug!(total, pool_size, "dispatching pooled tasks");

    let permits = Arc::new(Semaphore::new(pool_size));
    let task = Arc::new(task);
    let mut workers = JoinSet::new();

    for (index, input) in inputs.into_iter().enumerate() {
        let permits = Arc::clone(&permits);
        let task = Arc::clone(&task);
        workers.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return (index, None);
            };
            (index, settle(index, async move { task(input).await }).await)
        });
    }

    // Slot `i` is written only by the task that owns input `i`.
    let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(total).collect();
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok((index, outcome)) => slots[index] = outcome,
            Err(e) => warn!(error = %e, "dispatcher worker did not complete"),
        }
    }
    slots
}

/// Await one task, turning errors and panics into an absent slot. Callers
/// pass a lazy future so a task that panics while building its future is
/// caught here too.
async fn settle<T, E, Fut>(index: usize, fut: Fut) -> Option<T>
where
    E: Display,
    Fut: Future<Output = Result<T, E>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            warn!(index, error = %e, "task failed");
            None
        }
        Err(_) => {
            warn!(index, "task panicked");
            None
        }
    }
}

/// Success/failure tally over dispatcher output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_slots<T>(slots: &[Option<T>]) -> Self {
        let succeeded = slots.iter().filter(|s| s.is_some()).count();
        Self { succeeded, failed: slots.len() - succeeded }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}
