//! Pool-aware bounded concurrency.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

/// Concurrency actually used for `count` items.
///
/// One pool connection is left free for the caller:
/// `max(1, min(desired, count, pool_limit - 1))`.
pub fn effective_concurrency(desired: usize, count: usize, pool_limit: usize) -> usize {
    desired
        .min(count)
        .min(pool_limit.saturating_sub(1))
        .max(1)
}

/// Permits shared by `lanes` concurrent callers of one pool.
///
/// Each lane keeps one connection for its own writes:
/// `max(1, pool_limit - lanes)`.
pub fn shared_permits(pool_limit: usize, lanes: usize) -> usize {
    pool_limit.saturating_sub(lanes.max(1)).max(1)
}

/// Run `task` for every item with at most [`effective_concurrency`] tasks in
/// flight.
///
/// `None` results are dropped. A panicking task is logged and dropped. Results
/// come back in input order. There is no retry.
pub async fn run_bounded<T, R, F, Fut>(
    items: Vec<T>,
    desired: usize,
    pool_limit: usize,
    task: F,
) -> Vec<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Option<R>> + Send + 'static,
{
    run_gated(items, desired, pool_limit, None, task).await
}

/// Like [`run_bounded`], but every task also holds a permit of `shared`
/// while it runs, so concurrent callers never exceed its size together.
pub async fn run_bounded_shared<T, R, F, Fut>(
    items: Vec<T>,
    desired: usize,
    pool_limit: usize,
    shared: Arc<Semaphore>,
    task: F,
) -> Vec<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Option<R>> + Send + 'static,
{
    run_gated(items, desired, pool_limit, Some(shared), task).await
}

async fn run_gated<T, R, F, Fut>(
    items: Vec<T>,
    desired: usize,
    pool_limit: usize,
    shared: Option<Arc<Semaphore>>,
    task: F,
) -> Vec<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Option<R>> + Send + 'static,
{
    if items.is_empty() {
        return Vec::new();
    }

    let concurrency = effective_concurrency(desired, items.len(), pool_limit);
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut handles = Vec::with_capacity(items.len());

    for item in items {
        let semaphore = Arc::clone(&semaphore);
        let shared = shared.clone();
        let fut = task(item);

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok()?;
            let _shared_permit = match shared {
                Some(shared) => Some(shared.acquire_owned().await.ok()?),
                None => None,
            };
            fut.await
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(Some(result)) => results.push(result),
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = %e, "Bounded task failed");
            }
        }
    }
    results
}
